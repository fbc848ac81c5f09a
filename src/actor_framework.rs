use std::collections::HashMap;
use std::hash::Hash;
use std::fmt::{Debug, Display};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

use crate::concurrency::{check_precondition, ETag, StaleTag};

/// How many fresh ids the actor draws before giving up on a create.
const MAX_ID_ATTEMPTS: usize = 16;

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks, DTOs, and Actions)
// =============================================================================

/// Whether a hook actually altered the entity.
///
/// The actor only bumps the version for `Modified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Modified,
    Unchanged,
}

impl Change {
    pub fn from_flag(changed: bool) -> Self {
        if changed { Change::Modified } else { Change::Unchanged }
    }
}

/// Trait that any domain entity must implement to be managed by ResourceActor
pub trait Entity: Clone + Debug + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;
    type CreatePayload: Send + Sync + Debug;
    type Patch: Send + Sync + Debug;
    type Action: Send + Sync + Debug;
    type Error: Debug + Display + Clone + Send + Sync + 'static;

    /// Get the ID of the entity
    fn id(&self) -> &Self::Id;

    /// Construct the full Entity from the ID and Payload
    fn from_create(
        id: Self::Id,
        payload: Self::CreatePayload,
        now: DateTime<Utc>,
    ) -> Result<Self, Self::Error>;

    // --- Lifecycle Hooks ---

    /// Apply a partial update. Runs against a scratch copy: on `Err` the
    /// stored entity is left as it was, however far the hook got.
    fn on_update(&mut self, patch: Self::Patch, now: DateTime<Utc>) -> Result<Change, Self::Error>;

    /// Handle a custom domain-specific action. Same commit rules as `on_update`.
    fn handle_action(
        &mut self,
        action: Self::Action,
        now: DateTime<Utc>,
    ) -> Result<Change, Self::Error>;
}

/// A stored entity plus the bookkeeping the actor owns.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Versioned<T> {
    #[serde(flatten)]
    pub entity: T,
    /// Starts at 1, +1 per effective mutation.
    pub version: u64,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T: Entity> Versioned<T> {
    fn new(entity: T, now: DateTime<Utc>) -> Self {
        Self { entity, version: 1, created_at: now, updated_at: None }
    }

    pub fn id(&self) -> &T::Id {
        self.entity.id()
    }

    pub fn tag(&self) -> ETag {
        ETag::for_version(self.version)
    }
}

/// Store-level failures. Entity rejections are carried through as `Rejected`.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError<E> {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    PreconditionFailed(#[from] StaleTag),
    #[error("{0}")]
    Rejected(E),
    #[error("Could not allocate a unique id after {0} attempts")]
    IdExhausted(usize),
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped")]
    ActorDropped,
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T, E> = oneshot::Sender<Result<T, FrameworkError<E>>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    Create {
        payload: T::CreatePayload,
        respond_to: Response<Versioned<T>, T::Error>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<Versioned<T>>, T::Error>,
    },
    List {
        respond_to: Response<Vec<Versioned<T>>, T::Error>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        expected: Option<ETag>,
        respond_to: Response<Versioned<T>, T::Error>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<(), T::Error>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        expected: Option<ETag>,
        respond_to: Response<Versioned<T>, T::Error>,
    }
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

/// Owns every record of one entity type. Messages are handled one at a time,
/// so a tag check and the mutation it guards can never interleave with
/// another request.
pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, Versioned<T>>,
    insertion_order: Vec<T::Id>,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            insertion_order: Vec::new(),
            next_id_fn: Box::new(next_id_fn),
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    #[instrument(name = "resource_actor", skip(self), fields(entity = std::any::type_name::<T>()))]
    pub async fn run(mut self) {
        info!("ResourceActor starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { payload, respond_to } => {
                    let _ = respond_to.send(self.handle_create(payload));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.store.get(&id).cloned()));
                }
                ResourceRequest::List { respond_to } => {
                    let _ = respond_to.send(Ok(self.snapshot()));
                }
                ResourceRequest::Update { id, patch, expected, respond_to } => {
                    let result = self.mutate(&id, expected.as_ref(), |entity, now| {
                        entity.on_update(patch, now)
                    });
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Action { id, action, expected, respond_to } => {
                    let result = self.mutate(&id, expected.as_ref(), |entity, now| {
                        entity.handle_action(action, now)
                    });
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Delete { id, respond_to } => {
                    let _ = respond_to.send(self.handle_delete(&id));
                }
            }
        }
        info!("ResourceActor stopped");
    }

    fn allocate_id(&self) -> Result<T::Id, FrameworkError<T::Error>> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = (self.next_id_fn)();
            if !self.store.contains_key(&id) {
                return Ok(id);
            }
            warn!(id = %id, "Generated id collides with a live record, retrying");
        }
        Err(FrameworkError::IdExhausted(MAX_ID_ATTEMPTS))
    }

    fn handle_create(
        &mut self,
        payload: T::CreatePayload,
    ) -> Result<Versioned<T>, FrameworkError<T::Error>> {
        let id = self.allocate_id()?;
        let now = Utc::now();
        let entity = T::from_create(id.clone(), payload, now).map_err(FrameworkError::Rejected)?;
        let record = Versioned::new(entity, now);
        self.store.insert(id.clone(), record.clone());
        self.insertion_order.push(id.clone());
        debug!(id = %id, "Record created");
        Ok(record)
    }

    /// The single path through which stored records change.
    fn mutate<F>(
        &mut self,
        id: &T::Id,
        expected: Option<&ETag>,
        apply: F,
    ) -> Result<Versioned<T>, FrameworkError<T::Error>>
    where
        F: FnOnce(&mut T, DateTime<Utc>) -> Result<Change, T::Error>,
    {
        let record = self.store.get_mut(id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;

        check_precondition(&record.tag(), expected)?;

        let now = Utc::now();
        let mut draft = record.entity.clone();
        match apply(&mut draft, now).map_err(FrameworkError::Rejected)? {
            Change::Modified => {
                record.entity = draft;
                record.version += 1;
                record.updated_at = Some(now);
                debug!(id = %id, version = record.version, "Record mutated");
            }
            Change::Unchanged => debug!(id = %id, version = record.version, "Mutation was a no-op"),
        }
        Ok(record.clone())
    }

    fn handle_delete(&mut self, id: &T::Id) -> Result<(), FrameworkError<T::Error>> {
        if self.store.remove(id).is_none() {
            return Err(FrameworkError::NotFound(id.to_string()));
        }
        self.insertion_order.retain(|existing| existing != id);
        debug!(id = %id, "Record deleted");
        Ok(())
    }

    fn snapshot(&self) -> Vec<Versioned<T>> {
        self.insertion_order
            .iter()
            .filter_map(|id| self.store.get(id).cloned())
            .collect()
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Entity> ResourceClient<T> {
    pub(crate) fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn call<R>(
        &self,
        build: impl FnOnce(Response<R, T::Error>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError<T::Error>> {
        let (respond_to, response) = oneshot::channel();
        self.sender.send(build(respond_to))
            .await.map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn create(
        &self,
        payload: T::CreatePayload,
    ) -> Result<Versioned<T>, FrameworkError<T::Error>> {
        self.call(|respond_to| ResourceRequest::Create { payload, respond_to }).await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<Versioned<T>>, FrameworkError<T::Error>> {
        self.call(|respond_to| ResourceRequest::Get { id, respond_to }).await
    }

    pub async fn list(&self) -> Result<Vec<Versioned<T>>, FrameworkError<T::Error>> {
        self.call(|respond_to| ResourceRequest::List { respond_to }).await
    }

    pub async fn update(
        &self,
        id: T::Id,
        patch: T::Patch,
        expected: Option<ETag>,
    ) -> Result<Versioned<T>, FrameworkError<T::Error>> {
        self.call(|respond_to| ResourceRequest::Update { id, patch, expected, respond_to }).await
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), FrameworkError<T::Error>> {
        self.call(|respond_to| ResourceRequest::Delete { id, respond_to }).await
    }

    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
        expected: Option<ETag>,
    ) -> Result<Versioned<T>, FrameworkError<T::Error>> {
        self.call(|respond_to| ResourceRequest::Action { id, action, expected, respond_to })
            .await
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================

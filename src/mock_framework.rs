//! # Mock Framework
//!
//! Utilities for testing clients in isolation.
//!
//! Use [`create_mock_client`] to get a client and a receiver.
//! Then use helpers like [`expect_update`] or [`expect_action`] to assert behavior.

use crate::actor_framework::{Entity, Response, ResourceClient, ResourceRequest, Versioned};
use crate::concurrency::ETag;
use tokio::sync::mpsc;

/// The receiving end a test drains in place of the store actor.
pub type MockStore<T> = mpsc::Receiver<ResourceRequest<T>>;

/// Creates a mock client and a receiver for asserting requests.
///
/// The client sends to a channel the test controls, so the test plays the
/// store: it inspects each request and scripts the reply.
pub fn create_mock_client<T: Entity>(buffer_size: usize) -> (ResourceClient<T>, MockStore<T>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<T: Entity>(
    receiver: &mut MockStore<T>,
) -> Option<(T::CreatePayload, Response<Versioned<T>, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { payload, respond_to }) => Some((payload, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: Entity>(
    receiver: &mut MockStore<T>,
) -> Option<(T::Id, Response<Option<Versioned<T>>, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a List request
pub async fn expect_list<T: Entity>(
    receiver: &mut MockStore<T>,
) -> Option<Response<Vec<Versioned<T>>, T::Error>> {
    match receiver.recv().await {
        Some(ResourceRequest::List { respond_to }) => Some(respond_to),
        _ => None,
    }
}

/// Helper to verify that the next message is an Update request
pub async fn expect_update<T: Entity>(
    receiver: &mut MockStore<T>,
) -> Option<(T::Id, T::Patch, Option<ETag>, Response<Versioned<T>, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Update { id, patch, expected, respond_to }) => {
            Some((id, patch, expected, respond_to))
        }
        _ => None,
    }
}

/// Helper to verify that the next message is an Action request
pub async fn expect_action<T: Entity>(
    receiver: &mut MockStore<T>,
) -> Option<(T::Id, T::Action, Option<ETag>, Response<Versioned<T>, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action { id, action, expected, respond_to }) => {
            Some((id, action, expected, respond_to))
        }
        _ => None,
    }
}

/// Helper to verify that the next message is a Delete request
pub async fn expect_delete<T: Entity>(
    receiver: &mut MockStore<T>,
) -> Option<(T::Id, Response<(), T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Delete { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Order, OrderCreate, OrderStatus};
    use chrono::Utc;

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<Order>(10);

        let create_task = tokio::spawn(async move {
            client.create(OrderCreate::new("u1", 10.0)).await
        });

        let (payload, responder) =
            expect_create(&mut receiver).await.expect("Expected Create request");
        assert_eq!(payload.user_id, "u1");
        let record = Versioned {
            entity: Order {
                id: "o_1".to_string(),
                user_id: payload.user_id,
                amount: payload.amount,
                status: OrderStatus::Created,
                items: None,
                canceled_at: None,
            },
            version: 1,
            created_at: Utc::now(),
            updated_at: None,
        };
        responder.send(Ok(record.clone())).unwrap();

        let result = create_task.await.unwrap();
        assert_eq!(result, Ok(record));
    }
}

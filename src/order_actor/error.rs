use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::concurrency::StaleTag;

/// Errors that can occur during order operations.
///
/// Every variant is terminal: the store is unchanged and the caller decides
/// whether to re-read and resubmit.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order validation error: {0}")]
    ValidationError(String),
    #[error("Order not found: {0}")]
    NotFound(String),
    /// Illegal status transition for the order's current state.
    #[error("Order conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    PreconditionFailed(StaleTag),
    /// The store is reachable but could not complete the request.
    #[error("Order store error: {0}")]
    StoreError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl OrderError {
    pub fn conflict(reason: impl Into<String>) -> Self {
        OrderError::Conflict(reason.into())
    }
}

impl From<FrameworkError<OrderError>> for OrderError {
    fn from(err: FrameworkError<OrderError>) -> Self {
        match err {
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            FrameworkError::PreconditionFailed(stale) => OrderError::PreconditionFailed(stale),
            FrameworkError::Rejected(inner) => inner,
            exhausted @ FrameworkError::IdExhausted(_) => {
                OrderError::StoreError(exhausted.to_string())
            }
            other @ (FrameworkError::ActorClosed | FrameworkError::ActorDropped) => {
                OrderError::ActorCommunicationError(other.to_string())
            }
        }
    }
}

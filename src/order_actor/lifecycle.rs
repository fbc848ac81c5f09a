//! Status transition graph and field rules for orders.
//!
//! ```text
//! created ──► paid      (paid is final)
//!    │
//!    └──────► canceled  (canceled is final)
//! ```
//!
//! Every state may "transition" to itself so that re-submitting the current
//! status is accepted as a no-op.

use crate::domain::{OrderPatch, OrderStatus};
use super::OrderError;

/// Checks the requested status against the current one.
///
/// Rejections are conflicts, not validation failures: the value is well
/// formed but not legal from here.
pub fn check_transition(current: OrderStatus, requested: OrderStatus) -> Result<(), OrderError> {
    match (current, requested) {
        (current, requested) if current == requested => Ok(()),
        (OrderStatus::Created, _) => Ok(()),
        (OrderStatus::Paid, _) => Err(OrderError::conflict("cannot modify a paid order")),
        (OrderStatus::Canceled, _) => Err(OrderError::conflict("cannot reopen a canceled order")),
    }
}

pub fn validate_user_id(user_id: &str) -> Result<(), OrderError> {
    if user_id.trim().is_empty() {
        return Err(OrderError::ValidationError("userId must be a non-empty string".to_string()));
    }
    Ok(())
}

pub fn validate_amount(amount: f64) -> Result<(), OrderError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(OrderError::ValidationError("amount must be a number >= 0".to_string()));
    }
    Ok(())
}

pub fn parse_status(status: Option<&str>) -> Result<Option<OrderStatus>, OrderError> {
    status.map(str::parse).transpose()
}

/// A patch whose fields have all passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPatch {
    pub status: Option<OrderStatus>,
    pub amount: Option<f64>,
    pub user_id: Option<String>,
}

/// Validates every present field before anything is applied; the first
/// invalid field aborts the whole patch.
pub fn validate_patch(patch: OrderPatch) -> Result<ValidatedPatch, OrderError> {
    let status = parse_status(patch.status.as_deref())?;
    if let Some(amount) = patch.amount {
        validate_amount(amount)?;
    }
    if let Some(user_id) = &patch.user_id {
        validate_user_id(user_id)?;
    }
    Ok(ValidatedPatch {
        status,
        amount: patch.amount,
        user_id: patch.user_id,
    })
}

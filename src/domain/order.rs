use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::order_actor::OrderError;

/// Lifecycle state of an order. `Created` is the only initial state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Paid,
    Canceled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 3] =
        [OrderStatus::Created, OrderStatus::Paid, OrderStatus::Canceled];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Paid => "paid",
            OrderStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| {
                let allowed: Vec<_> = OrderStatus::ALL.iter().map(OrderStatus::as_str).collect();
                OrderError::ValidationError(format!(
                    "invalid status '{}' (allowed: {})",
                    value,
                    allowed.join(", ")
                ))
            })
    }
}

/// Represents a customer order.
///
/// Version and timestamps other than `canceled_at` are kept by the store,
/// see [`crate::actor_framework::Versioned`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<Value>>,
    /// Present exactly when `status` is `Canceled`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canceled_at: Option<DateTime<Utc>>,
}

/// Payload for creating a new order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreate {
    pub user_id: String,
    pub amount: f64,
    #[serde(default)]
    pub status: Option<String>,
    /// Kept only when it is an array; any other JSON value is ignored.
    #[serde(default, deserialize_with = "array_or_none")]
    pub items: Option<Vec<Value>>,
}

fn array_or_none<'de, D>(deserializer: D) -> Result<Option<Vec<Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => Some(items),
        _ => None,
    })
}

impl OrderCreate {
    pub fn new(user_id: impl Into<String>, amount: f64) -> Self {
        Self {
            user_id: user_id.into(),
            amount,
            status: None,
            items: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// Payload for a partial update. Absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPatch {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl OrderPatch {
    pub fn status(status: impl Into<String>) -> Self {
        Self { status: Some(status.into()), ..Self::default() }
    }

    pub fn amount(amount: f64) -> Self {
        Self { amount: Some(amount), ..Self::default() }
    }
}

use chrono::{DateTime, Utc};

use crate::actor_framework::{Change, Entity};
use crate::domain::{Order, OrderCreate, OrderPatch, OrderStatus};
use super::lifecycle::{
    check_transition, parse_status, validate_amount, validate_patch, validate_user_id,
};
use super::{OrderAction, OrderError};

impl Order {
    /// Moves to `status`, stamping `canceled_at` on the first entry into `Canceled`.
    /// Returns whether the status actually changed.
    fn transition_to(&mut self, status: OrderStatus, now: DateTime<Utc>) -> bool {
        if self.status == status {
            return false;
        }
        self.status = status;
        if status == OrderStatus::Canceled {
            self.canceled_at = Some(now);
        }
        true
    }
}

impl Entity for Order {
    type Id = String;
    type CreatePayload = OrderCreate;
    type Patch = OrderPatch;
    type Action = OrderAction;
    type Error = OrderError;

    fn id(&self) -> &String { &self.id }

    /// Creates a new Order from creation parameters.
    ///
    /// # Notes
    /// Status defaults to `created`. An order created directly as `canceled`
    /// gets its `canceled_at` stamped with the creation time.
    fn from_create(
        id: String,
        params: OrderCreate,
        now: DateTime<Utc>,
    ) -> Result<Self, OrderError> {
        validate_user_id(&params.user_id)?;
        validate_amount(params.amount)?;
        let status = parse_status(params.status.as_deref())?.unwrap_or(OrderStatus::Created);

        Ok(Self {
            id,
            user_id: params.user_id,
            amount: params.amount,
            status,
            items: params.items,
            canceled_at: (status == OrderStatus::Canceled).then_some(now),
        })
    }

    /// Applies a combined status/amount/userId change.
    ///
    /// All fields are validated first, then the status transition is checked,
    /// and only then is anything written. Reports `Unchanged` when every
    /// present field already holds the requested value.
    fn on_update(&mut self, patch: OrderPatch, now: DateTime<Utc>) -> Result<Change, OrderError> {
        let patch = validate_patch(patch)?;
        if let Some(status) = patch.status {
            check_transition(self.status, status)?;
        }

        let mut changed = false;
        if let Some(status) = patch.status {
            changed |= self.transition_to(status, now);
        }
        if let Some(amount) = patch.amount {
            if self.amount != amount {
                self.amount = amount;
                changed = true;
            }
        }
        if let Some(user_id) = patch.user_id {
            if self.user_id != user_id {
                self.user_id = user_id;
                changed = true;
            }
        }
        Ok(Change::from_flag(changed))
    }

    fn handle_action(
        &mut self,
        action: OrderAction,
        now: DateTime<Utc>,
    ) -> Result<Change, OrderError> {
        match action {
            OrderAction::Cancel => {
                check_transition(self.status, OrderStatus::Canceled)?;
                Ok(Change::from_flag(self.transition_to(OrderStatus::Canceled, now)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(status: OrderStatus) -> Order {
        let params = OrderCreate::new("u1", 100.0).with_status(status.as_str());
        Order::from_create("o_1".into(), params, Utc::now()).unwrap()
    }

    #[test]
    fn create_defaults_to_created() {
        let created =
            Order::from_create("o_1".into(), OrderCreate::new("u1", 100.0), Utc::now()).unwrap();
        assert_eq!(created.status, OrderStatus::Created);
        assert!(created.canceled_at.is_none());
    }

    #[test]
    fn create_as_canceled_stamps_canceled_at() {
        let now = Utc::now();
        let params = OrderCreate::new("u1", 1.0).with_status("canceled");
        let created = Order::from_create("o_1".into(), params, now).unwrap();
        assert_eq!(created.canceled_at, Some(now));
    }

    #[test]
    fn create_rejects_bad_fields() {
        let now = Utc::now();
        for params in [
            OrderCreate::new(" ", 1.0),
            OrderCreate::new("u1", -5.0),
            OrderCreate::new("u1", 1.0).with_status("refunded"),
        ] {
            assert!(matches!(
                Order::from_create("o_1".into(), params, now),
                Err(OrderError::ValidationError(_))
            ));
        }
    }

    #[test]
    fn combined_patch_reports_single_change() {
        let mut o = order(OrderStatus::Created);
        let patch = OrderPatch {
            status: Some("paid".into()),
            amount: Some(120.0),
            user_id: Some("u2".into()),
        };
        assert_eq!(o.on_update(patch, Utc::now()), Ok(Change::Modified));
        assert_eq!(o.status, OrderStatus::Paid);
        assert_eq!(o.amount, 120.0);
        assert_eq!(o.user_id, "u2");
    }

    #[test]
    fn same_values_are_a_noop() {
        let mut o = order(OrderStatus::Paid);
        let patch = OrderPatch {
            status: Some("paid".into()),
            amount: Some(100.0),
            user_id: Some("u1".into()),
        };
        assert_eq!(o.on_update(patch, Utc::now()), Ok(Change::Unchanged));
    }

    #[test]
    fn validation_runs_before_lifecycle() {
        // Paid -> canceled would conflict, but the bad amount is reported first.
        let mut o = order(OrderStatus::Paid);
        let patch =
            OrderPatch { status: Some("canceled".into()), amount: Some(-1.0), user_id: None };
        assert!(matches!(o.on_update(patch, Utc::now()), Err(OrderError::ValidationError(_))));
    }

    #[test]
    fn update_to_canceled_sets_canceled_at() {
        let mut o = order(OrderStatus::Created);
        let now = Utc::now();
        o.on_update(OrderPatch::status("canceled"), now).unwrap();
        assert_eq!(o.canceled_at, Some(now));
    }

    #[test]
    fn cancel_action() {
        let now = Utc::now();
        let mut o = order(OrderStatus::Created);
        assert_eq!(o.handle_action(OrderAction::Cancel, now), Ok(Change::Modified));
        assert_eq!(o.canceled_at, Some(now));

        // Second cancel keeps the original timestamp.
        assert_eq!(o.handle_action(OrderAction::Cancel, Utc::now()), Ok(Change::Unchanged));
        assert_eq!(o.canceled_at, Some(now));

        let mut paid = order(OrderStatus::Paid);
        assert!(matches!(
            paid.handle_action(OrderAction::Cancel, now),
            Err(OrderError::Conflict(_))
        ));
    }
}

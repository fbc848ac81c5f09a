use tracing::{debug, info, instrument, warn};

use crate::actor_framework::{ResourceClient, Versioned};
use crate::concurrency::{Conditional, ETag, Tagged};
use crate::domain::{Order, OrderCreate, OrderPatch};
use crate::order_actor::{OrderAction, OrderError};

pub type OrderRecord = Versioned<Order>;

/// Client for the order store, exposing the order operations.
///
/// Every mutation goes through the store actor, which performs the tag check
/// and the change as one step. This client only shapes requests and results.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self { inner }
    }

    pub fn location(id: &str) -> String {
        format!("/orders/{}", id)
    }

    #[instrument(skip(self, params), fields(user_id = %params.user_id))]
    pub async fn create_order(
        &self,
        params: OrderCreate,
    ) -> Result<Tagged<OrderRecord>, OrderError> {
        debug!("Sending request");
        let record = self.inner.create(params).await
            .inspect_err(|e| warn!(error = %e, "Order rejected"))?;
        info!(order_id = %record.id(), status = %record.entity.status, "Order created");
        let tag = record.tag();
        Ok(Tagged { body: record, tag })
    }

    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        if_none_match: Option<ETag>,
    ) -> Result<Conditional<Vec<OrderRecord>>, OrderError> {
        debug!("Sending request");
        let orders = self.inner.list().await?;
        let tag = ETag::for_collection(&orders);
        Ok(Conditional::evaluate(orders, tag, if_none_match.as_ref()))
    }

    #[instrument(skip(self))]
    pub async fn get_order(
        &self,
        id: String,
        if_none_match: Option<ETag>,
    ) -> Result<Conditional<OrderRecord>, OrderError> {
        debug!("Sending request");
        let record = self.inner.get(id.clone()).await?
            .ok_or(OrderError::NotFound(id))?;
        let tag = record.tag();
        Ok(Conditional::evaluate(record, tag, if_none_match.as_ref()))
    }

    #[instrument(skip(self, patch))]
    pub async fn update_order(
        &self,
        id: String,
        if_match: Option<ETag>,
        patch: OrderPatch,
    ) -> Result<Tagged<OrderRecord>, OrderError> {
        debug!(?patch, "Sending request");
        let record = self.inner.update(id, patch, if_match).await
            .inspect_err(|e| warn!(error = %e, "Update rejected"))?;
        info!(version = record.version, status = %record.entity.status, "Order updated");
        let tag = record.tag();
        Ok(Tagged { body: record, tag })
    }

    #[instrument(skip(self))]
    pub async fn cancel_order(
        &self,
        id: String,
        if_match: Option<ETag>,
    ) -> Result<Tagged<OrderRecord>, OrderError> {
        debug!("Sending request");
        let record = self.inner.perform_action(id, OrderAction::Cancel, if_match).await
            .inspect_err(|e| warn!(error = %e, "Cancel rejected"))?;
        info!(version = record.version, "Order canceled");
        let tag = record.tag();
        Ok(Tagged { body: record, tag })
    }

    #[instrument(skip(self))]
    pub async fn delete_order(&self, id: String) -> Result<(), OrderError> {
        debug!("Sending request");
        self.inner.delete(id).await?;
        info!("Order deleted");
        Ok(())
    }
}

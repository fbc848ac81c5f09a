use tracing::{info, error};
use uuid::Uuid;

use crate::actor_framework::ResourceActor;
use crate::clients::OrderClient;
use crate::domain::Order;

/// Fresh order id. Collisions are negligible; the store retries on one anyway.
pub fn next_order_id() -> String {
    format!("o_{}", Uuid::new_v4().simple())
}

/// The main application system that owns the order store actor.
///
/// Responsible for starting the actor, handing out its client, and shutdown.
pub struct OrderSystem {
    pub order_client: OrderClient,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl OrderSystem {
    pub fn new(mailbox_size: usize) -> Self {
        let (order_actor, order_resource_client) =
            ResourceActor::<Order>::new(mailbox_size, next_order_id);
        let order_client = OrderClient::new(order_resource_client);
        let order_handle = tokio::spawn(order_actor.run());

        info!(mailbox_size, "Order system started");
        Self {
            order_client,
            handles: vec![order_handle],
        }
    }

    /// Drops this system's client and waits for the actor to drain.
    ///
    /// Clones of the client handed out elsewhere (e.g. router state) must be
    /// dropped first, otherwise the actor keeps running.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");
        drop(self.order_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderCreate;

    #[test]
    fn order_ids_are_prefixed_and_distinct() {
        let a = next_order_id();
        let b = next_order_id();
        assert!(a.starts_with("o_"));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_system_round_trip_and_shutdown() -> Result<(), Box<dyn std::error::Error>> {
        let system = OrderSystem::new(8);
        let created = system.order_client.create_order(OrderCreate::new("u1", 10.0)).await?;
        assert!(created.body.id().starts_with("o_"));

        system.shutdown().await?;
        Ok(())
    }
}

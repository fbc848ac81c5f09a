mod domain;
mod clients;
mod concurrency;

mod api;
mod app_system;

#[cfg(test)]
mod mock_framework;

mod actor_framework;
mod order_actor;

use tracing::{error, info};
use crate::app_system::{Config, OrderSystem, setup_tracing};

#[tokio::main]
async fn main() -> Result<(), String> {
    let config = Config::from_env();
    setup_tracing(&config.log_level);

    info!(?config, "Starting order service");

    let system = OrderSystem::new(config.mailbox_size);
    let router = api::app(system.order_client.clone());

    let addr = config.bind_addr().map_err(|e| format!("Invalid bind address: {}", e))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind {}: {}", addr, e))?;
    info!(%addr, "Listening");

    // The router (and its client clone) is dropped when serving ends,
    // which lets the store actor drain during shutdown.
    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "Server error");
    }

    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

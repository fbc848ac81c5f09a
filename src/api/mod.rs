//! HTTP surface. Thin: maps requests onto [`OrderClient`] calls and results onto status codes.

pub mod error;
pub mod orders;

use axum::{Json, Router, http::StatusCode, response::IntoResponse};

use crate::clients::OrderClient;
pub use error::AppResult;

/// Builds the full application router.
pub fn app(order_client: OrderClient) -> Router {
    Router::new()
        .merge(orders::router())
        .fallback(not_found)
        .with_state(order_client)
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(error::ErrorBody { error: "Not Found".to_string() }))
}

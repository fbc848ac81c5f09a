//! Order API module

mod handler;

use axum::{Router, routing::{get, post}};

use crate::clients::OrderClient;

pub fn router() -> Router<OrderClient> {
    Router::new()
        .route("/orders", get(handler::list).post(handler::create))
        .route(
            "/orders/{id}",
            get(handler::get_by_id).patch(handler::update).delete(handler::delete),
        )
        .route("/orders/{id}/cancel", post(handler::cancel))
}

//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, HeaderName, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::api::AppResult;
use crate::clients::OrderClient;
use crate::concurrency::{Conditional, ETag, Tagged};
use crate::domain::{OrderCreate, OrderPatch};

/// Passes a conditional header through as an opaque tag.
///
/// A present header always yields a tag, even when its bytes are not visible
/// ASCII; such a tag never matches, so the request fails its precondition
/// instead of running unconditionally.
fn tag_header(headers: &HeaderMap, name: HeaderName) -> Option<ETag> {
    headers
        .get(name)
        .map(|value| ETag::opaque(String::from_utf8_lossy(value.as_bytes())))
}

fn tagged_response<T: Serialize>(status: StatusCode, tagged: Tagged<T>) -> Response {
    (status, [(header::ETAG, tagged.tag.to_string())], Json(tagged.body)).into_response()
}

fn conditional_response<T: Serialize>(result: Conditional<T>) -> Response {
    match result {
        Conditional::NotModified(tag) => {
            (StatusCode::NOT_MODIFIED, [(header::ETAG, tag.to_string())]).into_response()
        }
        Conditional::Fresh(tagged) => tagged_response(StatusCode::OK, tagged),
    }
}

/// POST /orders
pub async fn create(
    State(client): State<OrderClient>,
    payload: Result<Json<OrderCreate>, JsonRejection>,
) -> AppResult<Response> {
    let Json(params) = payload?;
    let created = client.create_order(params).await?;
    let location = OrderClient::location(created.body.id());
    let mut response = tagged_response(StatusCode::CREATED, created);
    if let Ok(value) = location.parse() {
        response.headers_mut().insert(header::LOCATION, value);
    }
    Ok(response)
}

/// GET /orders
pub async fn list(State(client): State<OrderClient>, headers: HeaderMap) -> AppResult<Response> {
    let result = client.list_orders(tag_header(&headers, header::IF_NONE_MATCH)).await?;
    Ok(conditional_response(result))
}

/// GET /orders/{id}
pub async fn get_by_id(
    State(client): State<OrderClient>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let result = client.get_order(id, tag_header(&headers, header::IF_NONE_MATCH)).await?;
    Ok(conditional_response(result))
}

/// PATCH /orders/{id}
pub async fn update(
    State(client): State<OrderClient>,
    Path(id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<OrderPatch>, JsonRejection>,
) -> AppResult<Response> {
    let Json(patch) = payload?;
    let updated = client.update_order(id, tag_header(&headers, header::IF_MATCH), patch).await?;
    Ok(tagged_response(StatusCode::OK, updated))
}

/// POST /orders/{id}/cancel
pub async fn cancel(
    State(client): State<OrderClient>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let canceled = client.cancel_order(id, tag_header(&headers, header::IF_MATCH)).await?;
    Ok(tagged_response(StatusCode::OK, canceled))
}

/// DELETE /orders/{id}
pub async fn delete(
    State(client): State<OrderClient>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    client.delete_order(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

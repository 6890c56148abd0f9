use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    http::StatusCode,
    Json,
};

use crate::database::Item;
use crate::error::ApiError;
use crate::server::AppState;
use crate::types::Operation;

use super::{object_body, ResourceName};

/// GET /{name} - All items in the bucket
pub async fn list(
    State(state): State<AppState>,
    Extension(ResourceName(name)): Extension<ResourceName>,
) -> Result<Json<Vec<Item>>, ApiError> {
    state
        .resources
        .list(&name)
        .await
        .map(Json)
        .map_err(|e| state.resource_error(e, Operation::List))
}

/// POST /{name} - Append an item under a fresh server-assigned id
pub async fn create(
    State(state): State<AppState>,
    Extension(ResourceName(name)): Extension<ResourceName>,
    payload: Result<Json<Item>, JsonRejection>,
) -> Result<Json<Item>, ApiError> {
    let body = object_body(payload)?;
    state
        .resources
        .create(&name, body)
        .await
        .map(Json)
        .map_err(|e| state.resource_error(e, Operation::Create))
}

/// DELETE /{name} - Remove every item, keeping the bucket
pub async fn clear(
    State(state): State<AppState>,
    Extension(ResourceName(name)): Extension<ResourceName>,
) -> Result<StatusCode, ApiError> {
    state
        .resources
        .clear(&name)
        .await
        .map(|_| StatusCode::OK)
        .map_err(|e| state.resource_error(e, Operation::Clear))
}

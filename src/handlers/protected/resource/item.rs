use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    http::StatusCode,
    Json,
};

use crate::database::Item;
use crate::error::ApiError;
use crate::server::AppState;
use crate::types::Operation;

use super::{object_body, ResourceName};

/// GET /{name}/:id - Single item by id
pub async fn show(
    State(state): State<AppState>,
    Extension(ResourceName(name)): Extension<ResourceName>,
    Path(id): Path<String>,
) -> Result<Json<Item>, ApiError> {
    state
        .resources
        .show(&name, &id)
        .await
        .map(Json)
        .map_err(|e| state.resource_error(e, Operation::Show))
}

/// PUT /{name}/:id - Replace the item wholesale, keeping its id
pub async fn replace(
    State(state): State<AppState>,
    Extension(ResourceName(name)): Extension<ResourceName>,
    Path(id): Path<String>,
    payload: Result<Json<Item>, JsonRejection>,
) -> Result<Json<Item>, ApiError> {
    let body = object_body(payload)?;
    state
        .resources
        .replace(&name, &id, body)
        .await
        .map(Json)
        .map_err(|e| state.resource_error(e, Operation::Replace))
}

/// PATCH /{name}/:id - Shallow merge, incoming keys win
pub async fn patch(
    State(state): State<AppState>,
    Extension(ResourceName(name)): Extension<ResourceName>,
    Path(id): Path<String>,
    payload: Result<Json<Item>, JsonRejection>,
) -> Result<Json<Item>, ApiError> {
    let changes = object_body(payload)?;
    state
        .resources
        .patch(&name, &id, changes)
        .await
        .map(Json)
        .map_err(|e| state.resource_error(e, Operation::Patch))
}

/// DELETE /{name}/:id - Remove the item
pub async fn delete(
    State(state): State<AppState>,
    Extension(ResourceName(name)): Extension<ResourceName>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .resources
        .delete(&name, &id)
        .await
        .map(|_| StatusCode::OK)
        .map_err(|e| state.resource_error(e, Operation::Delete))
}

// handlers/protected/resource - Generated CRUD routes for every declared resource
//
// One router per resource name, each carrying a `ResourceName` extension so the
// same handlers serve every bucket:
//
//   GET    /{name}       list      GET    /{name}/:id   show
//   POST   /{name}       create    PUT    /{name}/:id   replace
//   DELETE /{name}       clear     PATCH  /{name}/:id   patch
//                                  DELETE /{name}/:id   delete

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::database::Item;
use crate::error::{ApiError, ResourceError};
use crate::server::AppState;
use crate::types::Operation;

pub mod collection;
pub mod item;

pub use collection::{clear, create, list};
pub use item::{delete, patch, replace, show};

/// Resource a generated route is bound to
#[derive(Debug, Clone)]
pub struct ResourceName(pub String);

/// Accept only a JSON object body, reporting anything else as 400 with an error body
fn object_body(payload: Result<Json<Item>, JsonRejection>) -> Result<Item, ApiError> {
    payload
        .map(|Json(item)| item)
        .map_err(|rejection| {
            tracing::debug!("Rejected request body: {}", rejection.body_text());
            ApiError::bad_request("Request body must be a JSON object")
        })
}

impl AppState {
    fn resource_error(&self, err: ResourceError, op: Operation) -> ApiError {
        err.into_api_error(op, self.config.conventional_status_codes)
    }
}

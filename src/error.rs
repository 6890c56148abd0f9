// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use thiserror::Error;

use crate::auth::AuthError;
use crate::database::StorageError;
use crate::types::Operation;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 200 OK with an error body; read routes report lookup failures this way
    Reported(String),

    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Reported(_) => StatusCode::OK,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::Reported(msg) => msg,
            ApiError::BadRequest(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Every error body is an object with a single `error` string
    pub fn to_json(&self) -> Value {
        json!({ "error": self.message() })
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

/// Failures of a resource Load-mutate-Save cycle
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("resource '{0}' not found")]
    ResourceNotFound(String),

    #[error("item '{id}' not found in '{resource}'")]
    ItemNotFound { resource: String, id: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ResourceError {
    /// Map to an HTTP error for `op`.
    ///
    /// Legacy mode: read routes answer 200 with an error body, write routes 500,
    /// clearing a missing resource 404. Conventional mode: not-found is always
    /// 404 and storage failures are always 500.
    pub fn into_api_error(self, op: Operation, conventional: bool) -> ApiError {
        let message = match &self {
            ResourceError::ResourceNotFound(_) if op == Operation::Clear => "Resource name not found",
            ResourceError::ResourceNotFound(_) => "Resource not found",
            ResourceError::ItemNotFound { .. } => "Item not found",
            ResourceError::Storage(e) => {
                tracing::error!("{} failed: {}", op, e);
                match e {
                    StorageError::WriteFailed { .. } => "Failed to save resources",
                    StorageError::Malformed { .. } => "Resources format is incorrect",
                    StorageError::Unreadable { .. } => "Unable to find resources",
                }
            }
        };

        let not_found = !matches!(self, ResourceError::Storage(_));
        match (conventional, op.is_read(), not_found) {
            (true, _, true) => ApiError::not_found(message),
            (true, _, false) => ApiError::internal_server_error(message),
            (false, true, _) => ApiError::Reported(message.to_string()),
            (false, false, true) if op == Operation::Clear => ApiError::not_found(message),
            (false, false, _) => ApiError::internal_server_error(message),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        tracing::error!("Storage error: {}", err);
        match err {
            StorageError::Malformed { .. } => ApiError::internal_server_error("Database format is incorrect"),
            StorageError::Unreadable { .. } => ApiError::internal_server_error("Unable to read database"),
            StorageError::WriteFailed { .. } => ApiError::internal_server_error("Failed to save database"),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        // Don't expose signing or hashing internals to clients
        tracing::error!("Auth error: {}", err);
        ApiError::internal_server_error("An error occurred while processing your request")
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

// handlers/public/auth - Token acquisition and self-registration
//
// Mounted only when authorization is required. Both endpoints read the `users`
// collection of the document; neither is gated by a bearer token.

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::Deserialize;

use crate::error::ApiError;

pub mod login;
pub mod register;

pub use login::login;
pub use register::register;

/// Request body for both endpoints
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

fn credentials(payload: Result<Json<Credentials>, JsonRejection>) -> Result<Credentials, ApiError> {
    let Json(creds) = payload.map_err(|_| ApiError::bad_request("username and password are required"))?;
    if creds.username.trim().is_empty() || creds.password.is_empty() {
        return Err(ApiError::bad_request("username and password are required"));
    }
    Ok(creds)
}

fn missing_users() -> ApiError {
    tracing::error!("Document has no users collection");
    ApiError::internal_server_error("Unable to find users")
}

/// Run CPU-heavy password work off the async workers
async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|e| {
        tracing::error!("Password task failed: {}", e);
        ApiError::internal_server_error("An error occurred while processing your request")
    })
}

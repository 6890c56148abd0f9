use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::{json, Value};

use crate::auth::verify_password;
use crate::error::ApiError;
use crate::server::AppState;

use super::{blocking, credentials, missing_users, Credentials};

/// POST /login - Exchange credentials for a signed JWT
///
/// Expected Input:
/// ```json
/// { "username": "admin", "password": "password" }
/// ```
///
/// Expected Output (Success):
/// ```json
/// { "token": "eyJhbGciOiJIUzI1NiI..." }
/// ```
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let creds = credentials(payload)?;
    let jwt = state
        .jwt
        .clone()
        .ok_or_else(|| ApiError::internal_server_error("Authorization is not configured"))?;

    let doc = state.store.load().await?;
    if doc.users.is_none() {
        return Err(missing_users());
    }
    let stored_hash = doc.find_user(&creds.username).map(|u| u.password.clone());

    let verified = match stored_hash {
        Some(hash) => {
            let password = creds.password;
            blocking(move || verify_password(&hash, &password)).await?
        }
        None => false,
    };

    if !verified {
        tracing::warn!("Failed login for '{}'", creds.username);
        return Err(ApiError::unauthorized("Invalid username or password"));
    }

    let token = jwt.issue(&creds.username)?;
    tracing::info!("Issued token for '{}'", creds.username);
    Ok(Json(json!({ "token": token })))
}

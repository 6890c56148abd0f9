use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};

use crate::auth::hash_password;
use crate::database::User;
use crate::error::ApiError;
use crate::server::AppState;

use super::{blocking, credentials, missing_users, Credentials};

/// POST /register - Add a user with a hashed password
///
/// 400 when the username is taken; 500 when the document has no `users` collection.
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Credentials { username, password } = credentials(payload)?;
    let hashed = blocking(move || hash_password(&password)).await??;

    state
        .store
        .update(|doc| {
            let users = doc.users.as_mut().ok_or_else(missing_users)?;
            if users.iter().any(|u| u.username == username) {
                return Err(ApiError::bad_request("Username already exists"));
            }
            users.push(User {
                username: username.clone(),
                password: hashed,
            });
            Ok(())
        })
        .await?;

    tracing::info!("Registered user '{}'", username);
    Ok(StatusCode::OK)
}

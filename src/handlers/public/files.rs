use axum::{body::Bytes, extract::State, Json};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::server::AppState;

/// POST /upload - Store the raw request body under a fresh file name
///
/// The stored file is served back from `GET /files/{filename}`.
pub async fn upload(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>, ApiError> {
    let dir = state
        .config
        .storage
        .uploads_dir
        .as_ref()
        .ok_or_else(|| ApiError::not_found("Uploads are not enabled"))?;

    tokio::fs::create_dir_all(dir).await.map_err(upload_failed)?;
    let filename = Uuid::new_v4().to_string();
    tokio::fs::write(dir.join(&filename), &body)
        .await
        .map_err(upload_failed)?;

    tracing::info!("Stored upload {} ({} bytes)", filename, body.len());
    Ok(Json(json!({ "filename": filename })))
}

fn upload_failed(err: std::io::Error) -> ApiError {
    tracing::error!("Upload failed: {}", err);
    ApiError::internal_server_error("Failed to store upload")
}

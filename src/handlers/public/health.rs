use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::ApiError;
use crate::server::AppState;

/// GET /health - Liveness plus a document readability check
pub async fn health(State(state): State<AppState>) -> Response {
    let now = chrono::Utc::now();

    match state.store.load().await {
        Ok(doc) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "resources": doc.resources.iter().map(|b| b.resource.as_str()).collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            ApiError::service_unavailable("database unavailable").into_response()
        }
    }
}

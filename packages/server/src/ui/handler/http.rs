//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};

use crate::{domain::Identity, infrastructure::dto::http::HealthDto, ui::state::AppState};

/// Health check endpoint
pub async fn health_check() -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok".to_string(),
    })
}

/// Get the identities of all joined clients
pub async fn get_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, StatusCode> {
    match state.dispatcher.participants().await {
        Ok(identities) => Ok(Json(
            identities.into_iter().map(Identity::into_string).collect(),
        )),
        Err(e) => {
            tracing::error!("Failed to list users: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

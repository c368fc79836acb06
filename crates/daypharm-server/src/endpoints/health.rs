//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ai_configured: bool,
    pub sessions: usize,
    pub version: &'static str,
}

/// `GET /api/health`
pub async fn check(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    Ok(Json(HealthResponse {
        status: "ok",
        ai_configured: state.assistant.is_configured(),
        sessions: state.session_count(),
        version: crate::config::APP_VERSION,
    }))
}

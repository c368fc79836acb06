//! Session lifecycle and role selection.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use daypharm_core::session::Role;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub role: Role,
}

#[derive(Deserialize)]
pub struct RoleRequest {
    pub role: Role,
}

/// `POST /api/sessions`
pub async fn create(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let session_id = state.create_session()?;
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            session_id,
            role: Role::default(),
        }),
    ))
}

/// `DELETE /api/sessions/:session_id`
pub async fn delete(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.remove_session(&session_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /api/sessions/:session_id/role`
pub async fn set_role(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<RoleRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    state.with_session(&session_id, |session| {
        session.set_role(request.role);
        Ok(Json(SessionResponse {
            session_id: session.id().to_string(),
            role: session.role(),
        }))
    })
}

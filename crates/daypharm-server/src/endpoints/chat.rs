//! Patient chat with the pharmacy assistant.

use axum::extract::{Path, State};
use axum::Json;
use daypharm_core::models::ChatMessage;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ChatHistoryResponse {
    pub messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub messages: Vec<ChatMessage>,
}

/// `GET /api/sessions/:session_id/chat`
pub async fn history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ChatHistoryResponse>, ApiError> {
    state.with_session(&session_id, |session| {
        Ok(Json(ChatHistoryResponse {
            messages: session.chat_history().to_vec(),
        }))
    })
}

/// `POST /api/sessions/:session_id/chat`
///
/// Provider failures become the assistant's reply so the conversation keeps
/// going.
pub async fn send(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let question = request.question.trim().to_string();
    if question.is_empty() {
        return Err(ApiError::BadRequest("Question is empty".into()));
    }

    let (history, medications) = state.with_session(&session_id, |session| {
        let snapshot = (session.chat_history().to_vec(), session.medication_names());
        session.push_chat(ChatMessage::user(question.clone()));
        Ok(snapshot)
    })?;

    let reply = match state.assistant.chat(&history, &medications, &question).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::warn!(session = %session_id, error = %e, "Chat request failed");
            e.user_message()
        }
    };

    state.with_session(&session_id, |session| {
        session.push_chat(ChatMessage::assistant(reply.clone()));
        Ok(Json(ChatResponse {
            reply,
            messages: session.chat_history().to_vec(),
        }))
    })
}

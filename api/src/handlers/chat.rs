use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::handlers::{ApiResult, MessageResponse};
use crate::state::AppState;
use common::models::{ChatMessage, ChatSession, User};
use common::services::chat::SessionWithMessages;

#[derive(Debug, Default, Deserialize)]
pub struct CreateSession {
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SendMessage {
    pub content: String,
}

#[tracing::instrument(skip(state, user, req), fields(user_id = %user.id))]
pub async fn create_session(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(req): Json<CreateSession>,
) -> ApiResult<ChatSession> {
    Ok(Json(state.chat.create_session(user.id, req.title).await?))
}

/// Active sessions, most recently used first
#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<Vec<ChatSession>> {
    Ok(Json(state.chat.sessions(user.id).await?))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_session(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> ApiResult<SessionWithMessages> {
    Ok(Json(state.chat.session(user.id, id).await?))
}

/// Answer a user message; the stored assistant reply is returned
#[tracing::instrument(skip(state, user, req), fields(user_id = %user.id))]
pub async fn send_message(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(req): Json<SendMessage>,
) -> ApiResult<ChatMessage> {
    Ok(Json(
        state.chat.send_message(user.id, id, req.content).await?,
    ))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_session(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> ApiResult<MessageResponse> {
    state.chat.delete_session(user.id, id).await?;
    Ok(MessageResponse::new("Session deleted successfully"))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn suggestions(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<String>> {
    Ok(Json(state.chat.suggestions(user.id, id).await?))
}

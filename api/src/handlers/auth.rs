use axum::{extract::State, http::StatusCode, Extension, Json};

use crate::handlers::{ApiResult, ErrorResponse, MessageResponse};
use crate::state::AppState;
use common::auth::TokenPair;
use common::models::User;
use common::services::auth::{
    LoginRequest, OAuthLoginRequest, PasswordResetConfirm, PasswordResetRequest, RefreshRequest,
    RegisterRequest, RESET_REQUESTED_MESSAGE,
};

/// Register a new email/password account
#[tracing::instrument(skip(state, req), fields(email = %req.email))]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), ErrorResponse> {
    let user = state.auth.register(req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Exchange credentials for an access/refresh token pair
#[tracing::instrument(skip(state, req), fields(email = %req.email))]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<TokenPair> {
    Ok(Json(state.auth.login(req).await?))
}

#[tracing::instrument(skip(state, req))]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<TokenPair> {
    Ok(Json(state.auth.refresh(&req.refresh_token).await?))
}

/// Sign in with a Google or Apple identity token
#[tracing::instrument(skip(state, req), fields(provider = %req.provider))]
pub async fn oauth_login(
    State(state): State<AppState>,
    Json(req): Json<OAuthLoginRequest>,
) -> ApiResult<TokenPair> {
    Ok(Json(state.auth.oauth_login(req).await?))
}

/// Tokens are stateless, the client discards them
#[tracing::instrument(skip(user), fields(user_id = %user.id))]
pub async fn logout(Extension(user): Extension<User>) -> Json<MessageResponse> {
    MessageResponse::new("Successfully logged out")
}

#[tracing::instrument(skip(state, req))]
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetRequest>,
) -> ApiResult<MessageResponse> {
    state.auth.request_password_reset(&req.email).await?;
    Ok(MessageResponse::new(RESET_REQUESTED_MESSAGE))
}

#[tracing::instrument(skip(state, req))]
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetConfirm>,
) -> ApiResult<MessageResponse> {
    state.auth.confirm_password_reset(req).await?;
    Ok(MessageResponse::new("Password successfully reset"))
}

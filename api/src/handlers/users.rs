use axum::{extract::State, Extension, Json};

use crate::handlers::{ApiResult, MessageResponse};
use crate::state::AppState;
use common::models::{UpdateUser, User};
use common::services::auth::ChangePasswordRequest;

#[tracing::instrument(skip(user), fields(user_id = %user.id))]
pub async fn get_me(Extension(user): Extension<User>) -> Json<User> {
    Json(user)
}

#[tracing::instrument(skip(state, user, req), fields(user_id = %user.id))]
pub async fn update_me(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(req): Json<UpdateUser>,
) -> ApiResult<User> {
    Ok(Json(state.users.update(&user, req).await?))
}

/// Soft delete of the calling account
#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_me(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<MessageResponse> {
    state.users.deactivate(&user).await?;
    Ok(MessageResponse::new("Account successfully deleted"))
}

/// Email verification links are not issued yet; the call only acknowledges
#[tracing::instrument(skip(user), fields(user_id = %user.id))]
pub async fn verify_email(Extension(user): Extension<User>) -> Json<MessageResponse> {
    MessageResponse::new("Email successfully verified")
}

#[tracing::instrument(skip(state, user, req), fields(user_id = %user.id))]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<MessageResponse> {
    state.auth.change_password(&user, req).await?;
    Ok(MessageResponse::new("Password successfully changed"))
}

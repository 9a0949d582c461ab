use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::handlers::{ApiResult, ErrorResponse, MessageResponse};
use crate::state::AppState;
use common::models::{
    BankAccount, CreateBankAccount, FinancialData, SubscriptionType, UpdateBankAccount,
    UpdateFinancialData, UpdateProfile, User, UserProfile,
};
use common::services::profile::FullProfile;

#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<UserProfile> {
    Ok(Json(state.profiles.profile(user.id).await?))
}

#[tracing::instrument(skip(state, user, req), fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(req): Json<UpdateProfile>,
) -> ApiResult<UserProfile> {
    Ok(Json(state.profiles.update_profile(user.id, req).await?))
}

/// Switch plan; the subscription runs for 30 days from now
#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn update_subscription(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(subscription_type): Path<String>,
) -> ApiResult<UserProfile> {
    let subscription_type: SubscriptionType = subscription_type
        .parse()
        .map_err(|e: String| ErrorResponse::new("validation_error", e))?;
    Ok(Json(
        state
            .profiles
            .update_subscription(user.id, subscription_type)
            .await?,
    ))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_financial(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<FinancialData> {
    Ok(Json(state.profiles.financial(user.id).await?))
}

#[tracing::instrument(skip(state, user, req), fields(user_id = %user.id))]
pub async fn update_financial(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(req): Json<UpdateFinancialData>,
) -> ApiResult<FinancialData> {
    Ok(Json(state.profiles.update_financial(user.id, req).await?))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_accounts(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<Vec<BankAccount>> {
    Ok(Json(state.profiles.accounts(user.id).await?))
}

#[tracing::instrument(skip(state, user, req), fields(user_id = %user.id))]
pub async fn create_account(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(req): Json<CreateBankAccount>,
) -> Result<(StatusCode, Json<BankAccount>), ErrorResponse> {
    let account = state.profiles.create_account(user.id, req).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

#[tracing::instrument(skip(state, user, req), fields(user_id = %user.id))]
pub async fn update_account(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateBankAccount>,
) -> ApiResult<BankAccount> {
    Ok(Json(state.profiles.update_account(user.id, id, req).await?))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> ApiResult<MessageResponse> {
    state.profiles.delete_account(user.id, id).await?;
    Ok(MessageResponse::new("Bank account successfully deleted"))
}

/// Profile with financial data and bank accounts in one response
#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn full_profile(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<FullProfile> {
    Ok(Json(state.profiles.full(user.id).await?))
}

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Serialize;

use crate::handlers::{ApiResult, ErrorResponse, MessageResponse};
use crate::state::AppState;
use common::models::{Currency, Language, User};
use common::services::profile::{
    currency_options, language_options, NotificationSettings, SettingOption,
};

#[derive(Debug, Serialize)]
pub struct NotificationSettingsUpdated {
    pub message: &'static str,
    pub settings: NotificationSettings,
}

fn invalid_code(err: String) -> ErrorResponse {
    ErrorResponse::new("validation_error", err)
}

#[tracing::instrument]
pub async fn currencies() -> Json<Vec<SettingOption>> {
    Json(currency_options())
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn update_currency(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(code): Path<String>,
) -> ApiResult<MessageResponse> {
    let currency: Currency = code.parse().map_err(invalid_code)?;
    state.profiles.set_currency(user.id, currency).await?;
    Ok(MessageResponse::new(format!("Currency updated to {}", currency)))
}

#[tracing::instrument]
pub async fn languages() -> Json<Vec<SettingOption>> {
    Json(language_options())
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn update_language(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(code): Path<String>,
) -> ApiResult<MessageResponse> {
    let language: Language = code.parse().map_err(invalid_code)?;
    state.profiles.set_language(user.id, language).await?;
    Ok(MessageResponse::new(format!("Language updated to {}", language)))
}

/// Notification switches come in the query string; omitted ones turn on
#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn update_notifications(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(settings): Query<NotificationSettings>,
) -> ApiResult<NotificationSettingsUpdated> {
    let settings = state.profiles.set_notifications(user.id, settings).await?;
    Ok(Json(NotificationSettingsUpdated {
        message: "Notification settings updated",
        settings,
    }))
}

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::handlers::{check_page, ApiResult, ErrorResponse, MessageResponse};
use crate::state::AppState;
use common::db::repositories::NotificationFilter;
use common::models::{NotificationCategory, NotificationType, User};
use common::services::notifications::{NotificationList, NotificationSummary, NotificationView};

#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    pub category: Option<NotificationCategory>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub skip: i64,
    #[serde(default)]
    pub include_read: bool,
}

fn default_limit() -> i64 {
    50
}

impl TryFrom<NotificationQuery> for NotificationFilter {
    type Error = ErrorResponse;

    fn try_from(query: NotificationQuery) -> Result<Self, Self::Error> {
        check_page(query.skip, query.limit)?;
        Ok(NotificationFilter {
            category: query.category,
            include_read: query.include_read,
            skip: query.skip,
            limit: query.limit,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<NotificationCategory>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNotification {
    pub is_read: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct TestNotificationQuery {
    pub notification_type: NotificationType,
}

#[derive(Debug, Deserialize)]
pub struct TestDataQuery {
    #[serde(default = "default_test_count")]
    pub count: usize,
}

fn default_test_count() -> usize {
    10
}

/// Grouped notifications with unread counts per category
#[tracing::instrument(skip(state, user, query), fields(user_id = %user.id))]
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<NotificationQuery>,
) -> ApiResult<NotificationList> {
    let filter = NotificationFilter::try_from(query)?;
    Ok(Json(state.notifications.list(user.id, &filter).await?))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn summary(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<NotificationSummary> {
    Ok(Json(state.notifications.summary(user.id).await?))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_notification(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> ApiResult<NotificationView> {
    Ok(Json(state.notifications.get(user.id, id).await?))
}

#[tracing::instrument(skip(state, user, req), fields(user_id = %user.id))]
pub async fn update_notification(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateNotification>,
) -> ApiResult<NotificationView> {
    Ok(Json(
        state
            .notifications
            .set_read(user.id, id, req.is_read)
            .await?,
    ))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_notification(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> ApiResult<MessageResponse> {
    state.notifications.delete(user.id, id).await?;
    Ok(MessageResponse::new("Notification successfully deleted"))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<CategoryQuery>,
) -> ApiResult<MessageResponse> {
    let count = state
        .notifications
        .mark_all_read(user.id, query.category)
        .await?;
    Ok(MessageResponse::new(format!(
        "{} notifications marked as read",
        count
    )))
}

/// Development helper: one canned notification of the given type
#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn create_test_notification(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<TestNotificationQuery>,
) -> ApiResult<NotificationView> {
    Ok(Json(
        state
            .notifications
            .create_test(user.id, query.notification_type)
            .await?,
    ))
}

/// Development helper: random notifications spread over the last weeks
#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn generate_test_data(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<TestDataQuery>,
) -> Result<(StatusCode, Json<MessageResponse>), ErrorResponse> {
    let created = state
        .notifications
        .generate_test_data(user.id, query.count)
        .await?;
    Ok((
        StatusCode::CREATED,
        MessageResponse::new(format!(
            "Successfully generated {} test notifications",
            created
        )),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults() {
        let query: NotificationQuery = serde_json::from_str("{}").unwrap();
        let filter = NotificationFilter::try_from(query).unwrap();
        assert_eq!(filter.limit, 50);
        assert_eq!(filter.skip, 0);
        assert!(!filter.include_read);
        assert!(filter.category.is_none());
    }

    #[test]
    fn test_query_category() {
        let query: NotificationQuery =
            serde_json::from_str(r#"{"category": "bills", "include_read": true}"#).unwrap();
        let filter = NotificationFilter::try_from(query).unwrap();
        assert_eq!(filter.category, Some(NotificationCategory::Bills));
        assert!(filter.include_read);
    }

    #[test]
    fn test_negative_skip_is_a_bad_request() {
        let query: NotificationQuery = serde_json::from_str(r#"{"skip": -1}"#).unwrap();
        let err = NotificationFilter::try_from(query).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error, "validation_error");
    }
}

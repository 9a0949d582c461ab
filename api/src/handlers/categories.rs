use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::handlers::{ApiResult, ErrorResponse, MessageResponse, Pagination};
use crate::state::AppState;
use common::models::{Category, CreateCategory, UpdateCategory, User};
use common::services::categories::SystemCategories;

#[tracing::instrument(skip(state, user, req), fields(user_id = %user.id))]
pub async fn create_category(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(req): Json<CreateCategory>,
) -> Result<(StatusCode, Json<Category>), ErrorResponse> {
    let category = state.categories.create(user.id, req).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Top-level categories ordered by position then name
#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_categories(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(page): Query<Pagination>,
) -> ApiResult<Vec<Category>> {
    let page = page.checked()?;
    Ok(Json(
        state.categories.list(user.id, page.skip, page.limit).await?,
    ))
}

/// Default income and expense categories, created on first call
#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn system_categories(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<SystemCategories> {
    Ok(Json(state.categories.system(user.id).await?))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_category(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> ApiResult<Category> {
    Ok(Json(state.categories.get(user.id, id).await?))
}

#[tracing::instrument(skip(state, user, req), fields(user_id = %user.id))]
pub async fn update_category(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCategory>,
) -> ApiResult<Category> {
    Ok(Json(state.categories.update(user.id, id, req).await?))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> ApiResult<MessageResponse> {
    state.categories.delete(user.id, id).await?;
    Ok(MessageResponse::new("Category successfully deleted"))
}

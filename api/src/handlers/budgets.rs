use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::handlers::{ApiResult, ErrorResponse, MessageResponse};
use crate::state::AppState;
use common::budget::{BudgetStatus, MonthlyBudgetOverview};
use common::models::{CreateBudget, QuickBudgetSetup, UpdateBudget, User};

#[derive(Debug, Deserialize)]
pub struct PeriodRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Target month of a quick setup, defaulting to the current one
#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl MonthQuery {
    fn resolve(&self, today: NaiveDate) -> (i32, u32) {
        (
            self.year.unwrap_or(today.year()),
            self.month.unwrap_or(today.month()),
        )
    }
}

#[tracing::instrument(skip(state, user, req), fields(user_id = %user.id))]
pub async fn create_budget(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(req): Json<CreateBudget>,
) -> Result<(StatusCode, Json<BudgetStatus>), ErrorResponse> {
    let budget = state.budgets.create(user.id, req).await?;
    Ok((StatusCode::CREATED, Json(budget)))
}

/// Pro-rated spend of every active budget overlapping the month
#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn monthly_overview(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path((year, month)): Path<(i32, u32)>,
) -> ApiResult<MonthlyBudgetOverview> {
    Ok(Json(
        state.budgets.monthly_overview(user.id, year, month).await?,
    ))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn current_month(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<MonthlyBudgetOverview> {
    Ok(Json(state.budgets.current_month(user.id).await?))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn budgets_for_period(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(range): Query<PeriodRange>,
) -> ApiResult<Vec<BudgetStatus>> {
    Ok(Json(
        state
            .budgets
            .for_period(user.id, range.start_date, range.end_date)
            .await?,
    ))
}

#[tracing::instrument(skip(state, user, req), fields(user_id = %user.id))]
pub async fn quick_setup(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(target): Query<MonthQuery>,
    Json(req): Json<QuickBudgetSetup>,
) -> ApiResult<Vec<BudgetStatus>> {
    let (year, month) = target.resolve(Utc::now().date_naive());
    Ok(Json(
        state.budgets.quick_setup(user.id, req, year, month).await?,
    ))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_budget(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> ApiResult<BudgetStatus> {
    Ok(Json(state.budgets.get(user.id, id).await?))
}

#[tracing::instrument(skip(state, user, req), fields(user_id = %user.id))]
pub async fn update_budget(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateBudget>,
) -> ApiResult<BudgetStatus> {
    Ok(Json(state.budgets.update(user.id, id, req).await?))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_budget(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> ApiResult<MessageResponse> {
    state.budgets.delete(user.id, id).await?;
    Ok(MessageResponse::new("Budget successfully deleted"))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn deactivate_budget(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> ApiResult<MessageResponse> {
    state.budgets.deactivate(user.id, id).await?;
    Ok(MessageResponse::new("Budget deactivated successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_query_defaults_to_today() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 14).unwrap();
        assert_eq!(MonthQuery::default().resolve(today), (2024, 2));

        let query = MonthQuery {
            year: Some(2023),
            month: None,
        };
        assert_eq!(query.resolve(today), (2023, 2));
    }
}

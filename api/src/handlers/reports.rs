use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::handlers::{ApiResult, ErrorResponse, MessageResponse};
use crate::state::AppState;
use common::models::User;
use common::report::{
    ChartPeriod, FinancialReportSummary, IncomeVsExpensesChart, Insight, SpendingCategory,
    WeeklyTrend,
};
use common::services::reports::{ExportListItem, ExportRequest, ExportResponse};

#[derive(Debug, Default, Deserialize)]
pub struct MonthlySummaryQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    #[serde(default = "default_chart_period")]
    pub period: String,
    #[serde(default = "default_chart_days")]
    pub days: i64,
}

fn default_chart_period() -> String {
    "week".to_string()
}

fn default_chart_days() -> i64 {
    30
}

#[derive(Debug, Default, Deserialize)]
pub struct DateRangeQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    #[serde(default = "default_weeks")]
    pub weeks_count: u32,
}

fn default_weeks() -> u32 {
    4
}

#[derive(Debug, Deserialize)]
pub struct ExportListQuery {
    #[serde(default = "default_export_limit")]
    pub limit: i64,
}

fn default_export_limit() -> i64 {
    10
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn weekly_summary(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<FinancialReportSummary> {
    Ok(Json(state.reports.weekly_summary(user.id).await?))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn monthly_summary(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<MonthlySummaryQuery>,
) -> ApiResult<FinancialReportSummary> {
    let today = Utc::now().date_naive();
    let year = query.year.unwrap_or(today.year());
    let month = query.month.unwrap_or(today.month());
    Ok(Json(
        state.reports.monthly_summary(user.id, year, month).await?,
    ))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn income_vs_expenses(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<ChartQuery>,
) -> ApiResult<IncomeVsExpensesChart> {
    let period: ChartPeriod = query
        .period
        .parse()
        .map_err(|e: String| ErrorResponse::new("validation_error", e))?;
    Ok(Json(
        state
            .reports
            .income_vs_expenses(user.id, period, query.days)
            .await?,
    ))
}

/// Expense share per category, the last 30 days unless a range is given
#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn spending_categories(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(range): Query<DateRangeQuery>,
) -> ApiResult<Vec<SpendingCategory>> {
    Ok(Json(
        state
            .reports
            .spending_categories(user.id, range.start_date, range.end_date)
            .await?,
    ))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn weekly_trend(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<TrendQuery>,
) -> ApiResult<WeeklyTrend> {
    Ok(Json(
        state
            .reports
            .weekly_trend(user.id, query.weeks_count)
            .await?,
    ))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn insights(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<Vec<Insight>> {
    Ok(Json(state.reports.insights(user.id).await?))
}

/// Queue a report export; rendering continues in the background
#[tracing::instrument(skip(state, user, req), fields(user_id = %user.id))]
pub async fn export_report(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(req): Json<ExportRequest>,
) -> ApiResult<ExportResponse> {
    Ok(Json(
        state
            .reports
            .export(user.id, req, &state.config.storage)
            .await?,
    ))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn download_export(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Response, ErrorResponse> {
    let download = state.reports.download(user.id, id).await?;
    let contents = tokio::fs::read(&download.path).await.map_err(|e| {
        tracing::warn!(export_id = %id, error = %e, "Export file could not be read");
        ErrorResponse::new("not_found", "Export file not found or expired")
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, download.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", download.file_name),
            ),
        ],
        contents,
    )
        .into_response())
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn recent_exports(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<ExportListQuery>,
) -> ApiResult<Vec<ExportListItem>> {
    Ok(Json(
        state.reports.recent_exports(user.id, query.limit).await?,
    ))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_export(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> ApiResult<MessageResponse> {
    state.reports.delete_export(user.id, id).await?;
    Ok(MessageResponse::new("Export successfully deleted"))
}

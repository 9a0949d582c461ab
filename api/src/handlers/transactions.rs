use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::handlers::{ApiResult, ErrorResponse, MessageResponse, Pagination};
use crate::state::AppState;
use common::dates::Period;
use common::db::repositories::TransactionFilter;
use common::errors::ServiceError;
use common::models::{
    CategoryType, CreateTransaction, PaymentMethod, TransactionWithCategory, UpdateTransaction,
    User,
};
use common::services::transactions::{TransactionList, TransactionSection};

/// Filters accepted by the transaction listing
#[derive(Debug, Default, Deserialize)]
pub struct TransactionQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub transaction_type: Option<CategoryType>,
    /// Comma separated category ids
    pub category_ids: Option<String>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub skip: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl TransactionQuery {
    pub fn into_filter(self) -> Result<TransactionFilter, ErrorResponse> {
        let category_ids = parse_ids(self.category_ids.as_deref())?;
        let defaults = Pagination::default();
        let page = Pagination {
            skip: self.skip.unwrap_or(defaults.skip),
            limit: self.limit.unwrap_or(defaults.limit),
        }
        .checked()?;
        Ok(TransactionFilter {
            transaction_type: self.transaction_type,
            category_ids,
            min_amount: self.min_amount,
            max_amount: self.max_amount,
            payment_method: self.payment_method,
            skip: page.skip,
            limit: page.limit,
            ..TransactionFilter::default()
        }
        .with_days(self.start_date, self.end_date)
        .map_err(ServiceError::from)?)
    }
}

fn parse_ids(raw: Option<&str>) -> Result<Vec<Uuid>, ErrorResponse> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Uuid::parse_str(s).map_err(|_| {
                ErrorResponse::new("validation_error", format!("Invalid category id: {}", s))
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct ReceiptUploaded {
    pub message: &'static str,
    pub photo_url: String,
}

#[tracing::instrument(skip(state, user, req), fields(user_id = %user.id))]
pub async fn create_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(req): Json<CreateTransaction>,
) -> Result<(StatusCode, Json<TransactionWithCategory>), ErrorResponse> {
    let transaction = state.transactions.create(user.id, req).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Filtered, paginated transactions plus totals over all of the user's rows
#[tracing::instrument(skip(state, user, query), fields(user_id = %user.id))]
pub async fn list_transactions(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<TransactionQuery>,
) -> ApiResult<TransactionList> {
    let filter = query.into_filter()?;
    Ok(Json(state.transactions.list(user.id, &filter).await?))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_period(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(period): Path<String>,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<TransactionList> {
    let period: Period = period
        .parse()
        .map_err(|e: String| ErrorResponse::new("validation_error", e))?;
    Ok(Json(
        state
            .transactions
            .list_period(user.id, period, query.date)
            .await?,
    ))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn grouped_transactions(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(page): Query<Pagination>,
) -> ApiResult<Vec<TransactionSection>> {
    let page = page.checked()?;
    Ok(Json(
        state
            .transactions
            .grouped(user.id, page.skip, page.limit)
            .await?,
    ))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> ApiResult<TransactionWithCategory> {
    Ok(Json(state.transactions.get(user.id, id).await?))
}

#[tracing::instrument(skip(state, user, req), fields(user_id = %user.id))]
pub async fn update_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTransaction>,
) -> ApiResult<TransactionWithCategory> {
    Ok(Json(state.transactions.update(user.id, id, req).await?))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> ApiResult<MessageResponse> {
    state.transactions.delete(user.id, id).await?;
    Ok(MessageResponse::new("Transaction successfully deleted"))
}

/// Multipart upload of a receipt photo in the `file` field
#[tracing::instrument(skip(state, user, multipart), fields(user_id = %user.id))]
pub async fn upload_receipt(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> ApiResult<ReceiptUploaded> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let contents = field.bytes().await.map_err(multipart_error)?;

        let photo_url = state
            .transactions
            .upload_receipt(
                user.id,
                id,
                file_name.as_deref(),
                &contents,
                &state.config.storage,
            )
            .await?;

        return Ok(Json(ReceiptUploaded {
            message: "Receipt photo uploaded successfully",
            photo_url,
        }));
    }

    Err(ErrorResponse::new(
        "validation_error",
        "Missing file field in multipart body",
    ))
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ErrorResponse {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ErrorResponse::new("payload_too_large", err.body_text())
    } else {
        ErrorResponse::new("validation_error", err.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_maps_to_whole_day_filter() {
        let query: TransactionQuery = serde_json::from_value(serde_json::json!({
            "start_date": "2024-03-01",
            "end_date": "2024-03-31",
            "transaction_type": "expense",
            "payment_method": "card",
            "min_amount": 10.0,
        }))
        .unwrap();

        let filter = query.into_filter().unwrap();
        assert_eq!(
            filter.start.unwrap().to_rfc3339(),
            "2024-03-01T00:00:00+00:00"
        );
        assert_eq!(filter.end.unwrap().to_rfc3339(), "2024-04-01T00:00:00+00:00");
        assert_eq!(filter.transaction_type, Some(CategoryType::Expense));
        assert_eq!(filter.payment_method, Some(PaymentMethod::Card));
        assert_eq!(filter.min_amount, Some(10.0));
        assert_eq!(filter.skip, 0);
        assert_eq!(filter.limit, 100);
    }

    #[test]
    fn test_query_rejects_unrepresentable_end_date() {
        let query: TransactionQuery = serde_json::from_value(serde_json::json!({
            "end_date": "+262142-12-31",
        }))
        .unwrap();

        let err = query.into_filter().unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Date is out of range");
    }

    #[test]
    fn test_query_rejects_negative_skip() {
        let query: TransactionQuery =
            serde_json::from_value(serde_json::json!({ "skip": -10 })).unwrap();
        let err = query.into_filter().unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_category_ids_are_comma_separated() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let ids = parse_ids(Some(&format!("{}, {}", a, b))).unwrap();
        assert_eq!(ids, vec![a, b]);

        assert!(parse_ids(None).unwrap().is_empty());
        assert!(parse_ids(Some("not-a-uuid")).is_err());
    }
}

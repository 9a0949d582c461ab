// Transaction repository

use crate::db::DbPool;
use crate::errors::{DatabaseError, ValidationError};
use crate::models::{CategoryType, PaymentMethod, Transaction, TransactionWithCategory};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use tracing::instrument;
use uuid::Uuid;

const SELECT_WITH_CATEGORY: &str = r#"
    SELECT t.id, t.user_id, t.category_id, t.amount, t.transaction_type,
           t.description, t.transaction_date, t.payment_method, t.is_recurring,
           t.note, t.receipt_photo_url, t.created_at, t.updated_at,
           c.name AS category_name, c.icon AS category_icon, c.color AS category_color
    FROM transactions t
    LEFT JOIN budget_categories c ON c.id = t.category_id
"#;

/// Filter for listing a user's transactions
#[derive(Debug, Clone)]
pub struct TransactionFilter {
    pub start: Option<DateTime<Utc>>,
    /// Exclusive upper bound
    pub end: Option<DateTime<Utc>>,
    pub transaction_type: Option<CategoryType>,
    pub category_ids: Vec<Uuid>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub payment_method: Option<PaymentMethod>,
    pub skip: i64,
    pub limit: i64,
}

impl Default for TransactionFilter {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            transaction_type: None,
            category_ids: Vec::new(),
            min_amount: None,
            max_amount: None,
            payment_method: None,
            skip: 0,
            limit: 100,
        }
    }
}

impl TransactionFilter {
    /// Whole-day bounds: `start` at midnight, through the end of `end`
    pub fn with_days(
        mut self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Self, ValidationError> {
        self.start = start.map(crate::dates::day_start);
        self.end = end.map(crate::dates::day_end).transpose()?;
        Ok(self)
    }
}

/// Income and expense sums over a set of transactions
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, FromRow)]
pub struct TransactionTotals {
    pub income: f64,
    pub expense: f64,
    pub count: i64,
}

/// Expense total for one category
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CategorySpending {
    pub category_id: Uuid,
    pub category_name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub amount: f64,
    pub transaction_count: i64,
}

/// Income and expense sums for one calendar day
#[derive(Debug, Clone, Copy, Serialize, FromRow)]
pub struct DailyTotals {
    pub day: NaiveDate,
    pub income: f64,
    pub expenses: f64,
}

#[derive(Clone)]
pub struct TransactionRepository {
    pool: DbPool,
}

impl TransactionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, transaction), fields(transaction_id = %transaction.id))]
    pub async fn create(&self, transaction: &Transaction) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, user_id, category_id, amount, transaction_type, description,
                transaction_date, payment_method, is_recurring, note,
                receipt_photo_url, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(transaction.id)
        .bind(transaction.user_id)
        .bind(transaction.category_id)
        .bind(transaction.amount)
        .bind(transaction.transaction_type)
        .bind(&transaction.description)
        .bind(transaction.transaction_date)
        .bind(transaction.payment_method)
        .bind(transaction.is_recurring)
        .bind(&transaction.note)
        .bind(&transaction.receipt_photo_url)
        .bind(transaction.created_at)
        .bind(transaction.updated_at)
        .execute(self.pool.pool())
        .await?;

        tracing::info!(
            transaction_id = %transaction.id,
            transaction_type = %transaction.transaction_type,
            "Transaction created"
        );
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<TransactionWithCategory>, DatabaseError> {
        let transaction = sqlx::query_as::<_, TransactionWithCategory>(&format!(
            "{} WHERE t.id = $1 AND t.user_id = $2",
            SELECT_WITH_CATEGORY
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool.pool())
        .await?;

        Ok(transaction)
    }

    #[instrument(skip(self, transaction), fields(transaction_id = %transaction.id))]
    pub async fn update(&self, transaction: &Transaction) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET category_id = $3, amount = $4, transaction_type = $5,
                description = $6, transaction_date = $7, payment_method = $8,
                is_recurring = $9, note = $10, receipt_photo_url = $11,
                updated_at = $12
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(transaction.id)
        .bind(transaction.user_id)
        .bind(transaction.category_id)
        .bind(transaction.amount)
        .bind(transaction.transaction_type)
        .bind(&transaction.description)
        .bind(transaction.transaction_date)
        .bind(transaction.payment_method)
        .bind(transaction.is_recurring)
        .bind(&transaction.note)
        .bind(&transaction.receipt_photo_url)
        .bind(Utc::now())
        .execute(self.pool.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!(
                "Transaction not found: {}",
                transaction.id
            )));
        }

        tracing::info!(transaction_id = %transaction.id, "Transaction updated");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Transaction not found: {}", id)));
        }

        tracing::info!(transaction_id = %id, "Transaction deleted");
        Ok(())
    }

    /// List transactions newest first, joined with their category
    #[instrument(skip(self, filter))]
    pub async fn list(
        &self,
        user_id: Uuid,
        filter: &TransactionFilter,
    ) -> Result<Vec<TransactionWithCategory>, DatabaseError> {
        let mut query = format!("{} WHERE t.user_id = $1", SELECT_WITH_CATEGORY);
        let mut param_count = 2;

        if filter.start.is_some() {
            query.push_str(&format!(" AND t.transaction_date >= ${}", param_count));
            param_count += 1;
        }
        if filter.end.is_some() {
            query.push_str(&format!(" AND t.transaction_date < ${}", param_count));
            param_count += 1;
        }
        if filter.transaction_type.is_some() {
            query.push_str(&format!(" AND t.transaction_type = ${}", param_count));
            param_count += 1;
        }
        if !filter.category_ids.is_empty() {
            query.push_str(&format!(" AND t.category_id = ANY(${})", param_count));
            param_count += 1;
        }
        if filter.min_amount.is_some() {
            query.push_str(&format!(" AND t.amount >= ${}", param_count));
            param_count += 1;
        }
        if filter.max_amount.is_some() {
            query.push_str(&format!(" AND t.amount <= ${}", param_count));
            param_count += 1;
        }
        if filter.payment_method.is_some() {
            query.push_str(&format!(" AND t.payment_method = ${}", param_count));
        }

        query.push_str(&format!(
            " ORDER BY t.transaction_date DESC OFFSET {} LIMIT {}",
            filter.skip.max(0),
            filter.limit.max(0)
        ));

        let mut query_builder =
            sqlx::query_as::<_, TransactionWithCategory>(&query).bind(user_id);

        if let Some(start) = filter.start {
            query_builder = query_builder.bind(start);
        }
        if let Some(end) = filter.end {
            query_builder = query_builder.bind(end);
        }
        if let Some(transaction_type) = filter.transaction_type {
            query_builder = query_builder.bind(transaction_type);
        }
        if !filter.category_ids.is_empty() {
            query_builder = query_builder.bind(filter.category_ids.clone());
        }
        if let Some(min_amount) = filter.min_amount {
            query_builder = query_builder.bind(min_amount);
        }
        if let Some(max_amount) = filter.max_amount {
            query_builder = query_builder.bind(max_amount);
        }
        if let Some(payment_method) = filter.payment_method {
            query_builder = query_builder.bind(payment_method);
        }

        let transactions = query_builder.fetch_all(self.pool.pool()).await?;

        tracing::debug!(count = transactions.len(), "Found transactions with filter");
        Ok(transactions)
    }

    /// Income/expense sums over all of a user's transactions
    #[instrument(skip(self))]
    pub async fn totals(&self, user_id: Uuid) -> Result<TransactionTotals, DatabaseError> {
        let totals = sqlx::query_as::<_, TransactionTotals>(
            r#"
            SELECT
                COALESCE(SUM(amount) FILTER (WHERE transaction_type = 'income'), 0) AS income,
                COALESCE(SUM(amount) FILTER (WHERE transaction_type = 'expense'), 0) AS expense,
                COUNT(*) AS count
            FROM transactions
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(self.pool.pool())
        .await?;

        Ok(totals)
    }

    /// Income/expense sums for transactions in `[start, end)`
    #[instrument(skip(self))]
    pub async fn totals_between(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<TransactionTotals, DatabaseError> {
        let totals = sqlx::query_as::<_, TransactionTotals>(
            r#"
            SELECT
                COALESCE(SUM(amount) FILTER (WHERE transaction_type = 'income'), 0) AS income,
                COALESCE(SUM(amount) FILTER (WHERE transaction_type = 'expense'), 0) AS expense,
                COUNT(*) AS count
            FROM transactions
            WHERE user_id = $1 AND transaction_date >= $2 AND transaction_date < $3
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_one(self.pool.pool())
        .await?;

        Ok(totals)
    }

    /// Expense sum for one category over `[start, end)`
    #[instrument(skip(self))]
    pub async fn sum_category_expenses(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<f64, DatabaseError> {
        let (sum,): (f64,) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM transactions
            WHERE user_id = $1 AND category_id = $2 AND transaction_type = 'expense'
              AND transaction_date >= $3 AND transaction_date < $4
            "#,
        )
        .bind(user_id)
        .bind(category_id)
        .bind(start)
        .bind(end)
        .fetch_one(self.pool.pool())
        .await?;

        Ok(sum)
    }

    /// Expense totals per category over `[start, end)`, largest first
    #[instrument(skip(self))]
    pub async fn spending_by_category(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CategorySpending>, DatabaseError> {
        let rows = sqlx::query_as::<_, CategorySpending>(
            r#"
            SELECT c.id AS category_id, c.name AS category_name, c.icon, c.color,
                   SUM(t.amount) AS amount, COUNT(t.id) AS transaction_count
            FROM transactions t
            INNER JOIN budget_categories c ON c.id = t.category_id
            WHERE t.user_id = $1 AND t.transaction_type = 'expense'
              AND t.transaction_date >= $2 AND t.transaction_date < $3
            GROUP BY c.id, c.name, c.icon, c.color
            ORDER BY amount DESC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(rows)
    }

    /// Per-day income and expense sums over `[start, end)` (UTC days)
    #[instrument(skip(self))]
    pub async fn daily_totals(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<DailyTotals>, DatabaseError> {
        let rows = sqlx::query_as::<_, DailyTotals>(
            r#"
            SELECT (transaction_date AT TIME ZONE 'UTC')::date AS day,
                   COALESCE(SUM(amount) FILTER (WHERE transaction_type = 'income'), 0) AS income,
                   COALESCE(SUM(amount) FILTER (WHERE transaction_type = 'expense'), 0) AS expenses
            FROM transactions
            WHERE user_id = $1 AND transaction_date >= $2 AND transaction_date < $3
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(rows)
    }

    /// Largest single expense over `[start, end)`
    #[instrument(skip(self))]
    pub async fn largest_expense(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<TransactionWithCategory>, DatabaseError> {
        let transaction = sqlx::query_as::<_, TransactionWithCategory>(&format!(
            r#"
            {} WHERE t.user_id = $1 AND t.transaction_type = 'expense'
              AND t.transaction_date >= $2 AND t.transaction_date < $3
            ORDER BY t.amount DESC
            LIMIT 1
            "#,
            SELECT_WITH_CATEGORY
        ))
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_optional(self.pool.pool())
        .await?;

        Ok(transaction)
    }

    /// Latest occurrence of every recurring expense of active users
    #[instrument(skip(self))]
    pub async fn latest_recurring_expenses(&self) -> Result<Vec<Transaction>, DatabaseError> {
        let transactions = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT DISTINCT ON (t.user_id, t.category_id, t.description)
                   t.id, t.user_id, t.category_id, t.amount, t.transaction_type,
                   t.description, t.transaction_date, t.payment_method, t.is_recurring,
                   t.note, t.receipt_photo_url, t.created_at, t.updated_at
            FROM transactions t
            INNER JOIN users u ON u.id = t.user_id
            WHERE t.is_recurring = TRUE AND t.transaction_type = 'expense'
              AND u.is_active = TRUE
            ORDER BY t.user_id, t.category_id, t.description, t.transaction_date DESC
            "#,
        )
        .fetch_all(self.pool.pool())
        .await?;

        Ok(transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_defaults() {
        let filter = TransactionFilter::default();
        assert_eq!(filter.skip, 0);
        assert_eq!(filter.limit, 100);
        assert!(filter.category_ids.is_empty());
    }

    #[test]
    fn test_filter_days_cover_whole_end_day() {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
        let filter = TransactionFilter::default()
            .with_days(Some(start), Some(end))
            .unwrap();

        assert_eq!(filter.start.unwrap().to_rfc3339(), "2024-05-01T00:00:00+00:00");
        assert_eq!(filter.end.unwrap().to_rfc3339(), "2024-06-01T00:00:00+00:00");
    }

    #[test]
    fn test_filter_rejects_end_past_calendar() {
        let err = TransactionFilter::default()
            .with_days(None, Some(NaiveDate::MAX))
            .unwrap_err();
        assert_eq!(err.to_string(), "Date is out of range");
    }
}

// Budget repository

use crate::db::DbPool;
use crate::errors::DatabaseError;
use crate::models::{Budget, BudgetWithCategory};
use chrono::{NaiveDate, Utc};
use tracing::instrument;
use uuid::Uuid;

const SELECT_WITH_CATEGORY: &str = r#"
    SELECT b.id, b.user_id, b.category_id, b.amount, b.period, b.start_date,
           b.end_date, b.is_active, b.created_at, b.updated_at,
           c.name AS category_name, c.icon AS category_icon, c.color AS category_color
    FROM budgets b
    INNER JOIN budget_categories c ON c.id = b.category_id
"#;

#[derive(Clone)]
pub struct BudgetRepository {
    pool: DbPool,
}

impl BudgetRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, budget), fields(budget_id = %budget.id))]
    pub async fn create(&self, budget: &Budget) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO budgets (
                id, user_id, category_id, amount, period, start_date, end_date,
                is_active, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(budget.id)
        .bind(budget.user_id)
        .bind(budget.category_id)
        .bind(budget.amount)
        .bind(budget.period)
        .bind(budget.start_date)
        .bind(budget.end_date)
        .bind(budget.is_active)
        .bind(budget.created_at)
        .bind(budget.updated_at)
        .execute(self.pool.pool())
        .await?;

        tracing::info!(
            budget_id = %budget.id,
            category_id = %budget.category_id,
            amount = budget.amount,
            "Budget created"
        );
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<BudgetWithCategory>, DatabaseError> {
        let budget = sqlx::query_as::<_, BudgetWithCategory>(&format!(
            "{} WHERE b.id = $1 AND b.user_id = $2",
            SELECT_WITH_CATEGORY
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool.pool())
        .await?;

        Ok(budget)
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        user_id: Uuid,
        active_only: bool,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<BudgetWithCategory>, DatabaseError> {
        let budgets = sqlx::query_as::<_, BudgetWithCategory>(&format!(
            r#"
            {} WHERE b.user_id = $1 AND ($2 = FALSE OR b.is_active = TRUE)
            ORDER BY b.start_date DESC, b.amount DESC
            OFFSET $3 LIMIT $4
            "#,
            SELECT_WITH_CATEGORY
        ))
        .bind(user_id)
        .bind(active_only)
        .bind(skip.max(0))
        .bind(limit.max(0))
        .fetch_all(self.pool.pool())
        .await?;

        Ok(budgets)
    }

    /// Active budgets overlapping `[start, end]`, largest amount first
    #[instrument(skip(self))]
    pub async fn list_overlapping(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<BudgetWithCategory>, DatabaseError> {
        let budgets = sqlx::query_as::<_, BudgetWithCategory>(&format!(
            r#"
            {} WHERE b.user_id = $1 AND b.is_active = TRUE
              AND b.start_date <= $3 AND b.end_date >= $2
            ORDER BY b.amount DESC
            "#,
            SELECT_WITH_CATEGORY
        ))
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(budgets)
    }

    /// Active budgets of one category overlapping `[start, end]`
    #[instrument(skip(self))]
    pub async fn find_overlapping_for_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
        exclude: Option<Uuid>,
    ) -> Result<Vec<BudgetWithCategory>, DatabaseError> {
        let budgets = sqlx::query_as::<_, BudgetWithCategory>(&format!(
            r#"
            {} WHERE b.user_id = $1 AND b.category_id = $2 AND b.is_active = TRUE
              AND b.start_date <= $4 AND b.end_date >= $3
              AND ($5::uuid IS NULL OR b.id <> $5)
            ORDER BY b.start_date
            "#,
            SELECT_WITH_CATEGORY
        ))
        .bind(user_id)
        .bind(category_id)
        .bind(start)
        .bind(end)
        .bind(exclude)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(budgets)
    }

    #[instrument(skip(self, budget), fields(budget_id = %budget.id))]
    pub async fn update(&self, budget: &Budget) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE budgets
            SET amount = $3, period = $4, start_date = $5, end_date = $6,
                is_active = $7, updated_at = $8
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(budget.id)
        .bind(budget.user_id)
        .bind(budget.amount)
        .bind(budget.period)
        .bind(budget.start_date)
        .bind(budget.end_date)
        .bind(budget.is_active)
        .bind(Utc::now())
        .execute(self.pool.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!(
                "Budget not found: {}",
                budget.id
            )));
        }

        tracing::info!(budget_id = %budget.id, "Budget updated");
        Ok(())
    }

    /// Deactivate every active budget overlapping `[start, end]`
    #[instrument(skip(self))]
    pub async fn deactivate_overlapping(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE budgets
            SET is_active = FALSE, updated_at = NOW()
            WHERE user_id = $1 AND is_active = TRUE
              AND start_date <= $3 AND end_date >= $2
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .execute(self.pool.pool())
        .await?;

        tracing::info!(
            user_id = %user_id,
            deactivated = result.rows_affected(),
            "Overlapping budgets deactivated"
        );
        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM budgets WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Budget not found: {}", id)));
        }

        tracing::info!(budget_id = %id, "Budget deleted");
        Ok(())
    }
}

// Budget category repository

use crate::db::DbPool;
use crate::errors::DatabaseError;
use crate::models::{Category, CategoryType};
use chrono::Utc;
use tracing::instrument;
use uuid::Uuid;

const CATEGORY_COLUMNS: &str = r#"
    id, user_id, name, description, icon, color, category_type,
    is_system, parent_id, position, created_at, updated_at
"#;

#[derive(Clone)]
pub struct CategoryRepository {
    pool: DbPool,
}

impl CategoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, category), fields(category_id = %category.id))]
    pub async fn create(&self, category: &Category) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO budget_categories (
                id, user_id, name, description, icon, color, category_type,
                is_system, parent_id, position, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(category.id)
        .bind(category.user_id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(&category.icon)
        .bind(&category.color)
        .bind(category.category_type)
        .bind(category.is_system)
        .bind(category.parent_id)
        .bind(category.position)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(self.pool.pool())
        .await?;

        tracing::info!(category_id = %category.id, name = %category.name, "Category created");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Category>, DatabaseError> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM budget_categories WHERE id = $1 AND user_id = $2",
            CATEGORY_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool.pool())
        .await?;

        Ok(category)
    }

    /// Categories without a parent, ordered by position then name
    #[instrument(skip(self))]
    pub async fn list_top_level(
        &self,
        user_id: Uuid,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Category>, DatabaseError> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            r#"
            SELECT {} FROM budget_categories
            WHERE user_id = $1 AND parent_id IS NULL
            ORDER BY position, name
            OFFSET $2 LIMIT $3
            "#,
            CATEGORY_COLUMNS
        ))
        .bind(user_id)
        .bind(skip.max(0))
        .bind(limit.max(0))
        .fetch_all(self.pool.pool())
        .await?;

        Ok(categories)
    }

    #[instrument(skip(self))]
    pub async fn list_by_type(
        &self,
        user_id: Uuid,
        category_type: CategoryType,
    ) -> Result<Vec<Category>, DatabaseError> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            r#"
            SELECT {} FROM budget_categories
            WHERE user_id = $1 AND category_type = $2
            ORDER BY position, name
            "#,
            CATEGORY_COLUMNS
        ))
        .bind(user_id)
        .bind(category_type)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(categories)
    }

    #[instrument(skip(self))]
    pub async fn list_system(&self, user_id: Uuid) -> Result<Vec<Category>, DatabaseError> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            r#"
            SELECT {} FROM budget_categories
            WHERE user_id = $1 AND is_system = TRUE
            ORDER BY position, name
            "#,
            CATEGORY_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(categories)
    }

    /// First expense category whose name matches an ILIKE pattern
    #[instrument(skip(self))]
    pub async fn find_expense_by_name_like(
        &self,
        user_id: Uuid,
        pattern: &str,
    ) -> Result<Option<Category>, DatabaseError> {
        let category = sqlx::query_as::<_, Category>(&format!(
            r#"
            SELECT {} FROM budget_categories
            WHERE user_id = $1 AND category_type = 'expense' AND name ILIKE $2
            ORDER BY position, name
            LIMIT 1
            "#,
            CATEGORY_COLUMNS
        ))
        .bind(user_id)
        .bind(pattern)
        .fetch_optional(self.pool.pool())
        .await?;

        Ok(category)
    }

    #[instrument(skip(self, category), fields(category_id = %category.id))]
    pub async fn update(&self, category: &Category) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE budget_categories
            SET name = $3, description = $4, icon = $5, color = $6,
                category_type = $7, parent_id = $8, position = $9, updated_at = $10
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(category.id)
        .bind(category.user_id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(&category.icon)
        .bind(&category.color)
        .bind(category.category_type)
        .bind(category.parent_id)
        .bind(category.position)
        .bind(Utc::now())
        .execute(self.pool.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!(
                "Category not found: {}",
                category.id
            )));
        }

        tracing::info!(category_id = %category.id, "Category updated");
        Ok(())
    }

    /// Delete a category, moving its children up to `new_parent`
    #[instrument(skip(self))]
    pub async fn delete_and_reparent(
        &self,
        user_id: Uuid,
        id: Uuid,
        new_parent: Option<Uuid>,
    ) -> Result<(), DatabaseError> {
        let mut tx = self
            .pool
            .pool()
            .begin()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        let moved = sqlx::query(
            r#"
            UPDATE budget_categories
            SET parent_id = $3, updated_at = NOW()
            WHERE parent_id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(new_parent)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM budget_categories WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Category not found: {}", id)));
        }

        tx.commit()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        tracing::info!(
            category_id = %id,
            children_moved = moved.rows_affected(),
            "Category deleted"
        );
        Ok(())
    }
}

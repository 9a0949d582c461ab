// Notification repository

use crate::db::DbPool;
use crate::errors::DatabaseError;
use crate::models::{Notification, NotificationCategory};
use chrono::{DateTime, Utc};
use tracing::instrument;
use uuid::Uuid;

const NOTIFICATION_COLUMNS: &str = r#"
    id, user_id, title, message, notification_type, category, icon, is_read,
    is_actionable, action_url, transaction_id, created_at
"#;

/// Filter for listing a user's notifications
#[derive(Debug, Clone)]
pub struct NotificationFilter {
    pub category: Option<NotificationCategory>,
    pub include_read: bool,
    pub skip: i64,
    pub limit: i64,
}

impl Default for NotificationFilter {
    fn default() -> Self {
        Self {
            category: None,
            include_read: false,
            skip: 0,
            limit: 50,
        }
    }
}

#[derive(Clone)]
pub struct NotificationRepository {
    pool: DbPool,
}

impl NotificationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, notification), fields(notification_id = %notification.id))]
    pub async fn create(&self, notification: &Notification) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO notifications (
                id, user_id, title, message, notification_type, category, icon,
                is_read, is_actionable, action_url, transaction_id, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(notification.id)
        .bind(notification.user_id)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.notification_type)
        .bind(notification.category)
        .bind(&notification.icon)
        .bind(notification.is_read)
        .bind(notification.is_actionable)
        .bind(&notification.action_url)
        .bind(notification.transaction_id)
        .bind(notification.created_at)
        .execute(self.pool.pool())
        .await?;

        tracing::info!(
            notification_id = %notification.id,
            notification_type = %notification.notification_type,
            "Notification created"
        );
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Notification>, DatabaseError> {
        let notification = sqlx::query_as::<_, Notification>(&format!(
            "SELECT {} FROM notifications WHERE id = $1 AND user_id = $2",
            NOTIFICATION_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool.pool())
        .await?;

        Ok(notification)
    }

    /// Newest first; category `all` matches every notification
    #[instrument(skip(self, filter))]
    pub async fn list(
        &self,
        user_id: Uuid,
        filter: &NotificationFilter,
    ) -> Result<Vec<Notification>, DatabaseError> {
        let mut query = format!(
            "SELECT {} FROM notifications WHERE user_id = $1",
            NOTIFICATION_COLUMNS
        );
        let category = filter
            .category
            .filter(|c| *c != NotificationCategory::All);

        if category.is_some() {
            query.push_str(" AND category = $2");
        }
        if !filter.include_read {
            query.push_str(" AND is_read = FALSE");
        }
        query.push_str(&format!(
            " ORDER BY created_at DESC OFFSET {} LIMIT {}",
            filter.skip.max(0),
            filter.limit.max(0)
        ));

        let mut query_builder = sqlx::query_as::<_, Notification>(&query).bind(user_id);
        if let Some(category) = category {
            query_builder = query_builder.bind(category);
        }

        let notifications = query_builder.fetch_all(self.pool.pool()).await?;
        Ok(notifications)
    }

    /// `(category, is_read)` of every notification, for summary counts
    #[instrument(skip(self))]
    pub async fn read_states(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<(NotificationCategory, bool)>, DatabaseError> {
        let rows = sqlx::query_as::<_, (NotificationCategory, bool)>(
            "SELECT category, is_read FROM notifications WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(rows)
    }

    #[instrument(skip(self))]
    pub async fn set_read(
        &self,
        user_id: Uuid,
        id: Uuid,
        is_read: bool,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = $3 WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .bind(is_read)
        .execute(self.pool.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!(
                "Notification not found: {}",
                id
            )));
        }

        Ok(())
    }

    /// Mark unread notifications as read, optionally within one category
    #[instrument(skip(self))]
    pub async fn mark_all_read(
        &self,
        user_id: Uuid,
        category: Option<NotificationCategory>,
    ) -> Result<u64, DatabaseError> {
        let category = category.filter(|c| *c != NotificationCategory::All);
        let result = sqlx::query(
            r#"
            UPDATE notifications SET is_read = TRUE
            WHERE user_id = $1 AND is_read = FALSE
              AND ($2::text IS NULL OR category = $2)
            "#,
        )
        .bind(user_id)
        .bind(category)
        .execute(self.pool.pool())
        .await?;

        tracing::info!(
            user_id = %user_id,
            count = result.rows_affected(),
            "Notifications marked as read"
        );
        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!(
                "Notification not found: {}",
                id
            )));
        }

        Ok(())
    }

    /// Whether a notification of this kind was already raised for a transaction since `since`
    #[instrument(skip(self))]
    pub async fn exists_for_transaction(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
        title: &str,
        since: DateTime<Utc>,
    ) -> Result<bool, DatabaseError> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM notifications
                WHERE user_id = $1 AND transaction_id = $2 AND title = $3
                  AND created_at >= $4
            )
            "#,
        )
        .bind(user_id)
        .bind(transaction_id)
        .bind(title)
        .bind(since)
        .fetch_one(self.pool.pool())
        .await?;

        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_filter_default() {
        let filter = NotificationFilter::default();
        assert!(filter.category.is_none());
        assert!(!filter.include_read);
        assert_eq!(filter.limit, 50);
    }
}

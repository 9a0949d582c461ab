// Chat session and message repository

use crate::db::DbPool;
use crate::errors::DatabaseError;
use crate::models::{ChatMessage, ChatSession};
use tracing::instrument;
use uuid::Uuid;

#[derive(Clone)]
pub struct ChatRepository {
    pool: DbPool,
}

impl ChatRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, session), fields(session_id = %session.id))]
    pub async fn create_session(&self, session: &ChatSession) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO chat_sessions (id, user_id, title, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(session.id)
        .bind(session.user_id)
        .bind(&session.title)
        .bind(session.is_active)
        .bind(session.created_at)
        .bind(session.updated_at)
        .execute(self.pool.pool())
        .await?;

        tracing::info!(session_id = %session.id, "Chat session created");
        Ok(())
    }

    /// Active session owned by `user_id`
    #[instrument(skip(self))]
    pub async fn find_session(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<ChatSession>, DatabaseError> {
        let session = sqlx::query_as::<_, ChatSession>(
            r#"
            SELECT id, user_id, title, is_active, created_at, updated_at
            FROM chat_sessions
            WHERE id = $1 AND user_id = $2 AND is_active = TRUE
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool.pool())
        .await?;

        Ok(session)
    }

    #[instrument(skip(self))]
    pub async fn list_sessions(&self, user_id: Uuid) -> Result<Vec<ChatSession>, DatabaseError> {
        let sessions = sqlx::query_as::<_, ChatSession>(
            r#"
            SELECT id, user_id, title, is_active, created_at, updated_at
            FROM chat_sessions
            WHERE user_id = $1 AND is_active = TRUE
            ORDER BY updated_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(sessions)
    }

    #[instrument(skip(self))]
    pub async fn touch_session(&self, id: Uuid) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE chat_sessions SET updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(self.pool.pool())
            .await?;
        Ok(())
    }

    /// Soft delete
    #[instrument(skip(self))]
    pub async fn deactivate_session(&self, user_id: Uuid, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE chat_sessions SET is_active = FALSE, updated_at = NOW()
            WHERE id = $1 AND user_id = $2 AND is_active = TRUE
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(self.pool.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Chat session not found: {}", id)));
        }

        tracing::info!(session_id = %id, "Chat session deleted");
        Ok(())
    }

    #[instrument(skip(self, message), fields(session_id = %message.session_id))]
    pub async fn add_message(&self, message: &ChatMessage) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO chat_messages (id, session_id, role, content, function_call, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(message.id)
        .bind(message.session_id)
        .bind(message.role)
        .bind(&message.content)
        .bind(&message.function_call)
        .bind(message.created_at)
        .execute(self.pool.pool())
        .await?;

        Ok(())
    }

    /// All messages of a session in chronological order
    #[instrument(skip(self))]
    pub async fn messages(&self, session_id: Uuid) -> Result<Vec<ChatMessage>, DatabaseError> {
        let messages = sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT id, session_id, role, content, function_call, created_at
            FROM chat_messages
            WHERE session_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(session_id)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(messages)
    }

    /// The last `limit` messages of a session, oldest first
    #[instrument(skip(self))]
    pub async fn recent_messages(
        &self,
        session_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, DatabaseError> {
        let mut messages = sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT id, session_id, role, content, function_call, created_at
            FROM chat_messages
            WHERE session_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(session_id)
        .bind(limit)
        .fetch_all(self.pool.pool())
        .await?;

        messages.reverse();
        Ok(messages)
    }
}

// Exported report repository

use crate::db::DbPool;
use crate::errors::DatabaseError;
use crate::models::{ExportStatus, ExportedReport};
use tracing::instrument;
use uuid::Uuid;

const EXPORT_COLUMNS: &str = r#"
    id, user_id, report_type, format, status, file_path, file_size,
    error_message, created_at, expires_at
"#;

#[derive(Clone)]
pub struct ExportRepository {
    pool: DbPool,
}

impl ExportRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, report), fields(export_id = %report.id))]
    pub async fn create(&self, report: &ExportedReport) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO exported_reports (
                id, user_id, report_type, format, status, file_path, file_size,
                error_message, created_at, expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(report.id)
        .bind(report.user_id)
        .bind(report.report_type)
        .bind(report.format)
        .bind(report.status)
        .bind(&report.file_path)
        .bind(&report.file_size)
        .bind(&report.error_message)
        .bind(report.created_at)
        .bind(report.expires_at)
        .execute(self.pool.pool())
        .await?;

        tracing::info!(
            export_id = %report.id,
            report_type = %report.report_type,
            format = %report.format,
            "Export requested"
        );
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<ExportedReport>, DatabaseError> {
        let report = sqlx::query_as::<_, ExportedReport>(&format!(
            "SELECT {} FROM exported_reports WHERE id = $1 AND user_id = $2",
            EXPORT_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool.pool())
        .await?;

        Ok(report)
    }

    #[instrument(skip(self))]
    pub async fn list(&self, user_id: Uuid, limit: i64) -> Result<Vec<ExportedReport>, DatabaseError> {
        let reports = sqlx::query_as::<_, ExportedReport>(&format!(
            r#"
            SELECT {} FROM exported_reports
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
            EXPORT_COLUMNS
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(reports)
    }

    #[instrument(skip(self))]
    pub async fn mark_completed(
        &self,
        id: Uuid,
        file_path: &str,
        file_size: &str,
    ) -> Result<(), DatabaseError> {
        self.set_status(id, ExportStatus::Completed, Some(file_path), Some(file_size), None)
            .await
    }

    #[instrument(skip(self))]
    pub async fn mark_failed(&self, id: Uuid, error_message: &str) -> Result<(), DatabaseError> {
        self.set_status(id, ExportStatus::Failed, None, None, Some(error_message))
            .await
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: ExportStatus,
        file_path: Option<&str>,
        file_size: Option<&str>,
        error_message: Option<&str>,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE exported_reports
            SET status = $2, file_path = $3, file_size = $4, error_message = $5
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(file_path)
        .bind(file_size)
        .bind(error_message)
        .execute(self.pool.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Export not found: {}", id)));
        }

        tracing::info!(export_id = %id, status = %status, "Export status updated");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM exported_reports WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Export not found: {}", id)));
        }

        Ok(())
    }
}

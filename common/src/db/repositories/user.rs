// User repository

use crate::db::DbPool;
use crate::errors::DatabaseError;
use crate::models::{FinancialData, User, UserProfile};
use chrono::Utc;
use tracing::instrument;
use uuid::Uuid;

const USER_COLUMNS: &str = r#"
    id, email, full_name, hashed_password, is_active, is_verified,
    oauth_provider, oauth_id, phone_number, date_of_birth, address,
    tax_residence, reset_password_token, reset_password_token_expires,
    created_at, updated_at
"#;

/// Repository for user-related database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: DbPool,
}

impl UserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert a user together with its default profile and financial data
    #[instrument(skip(self, user, profile, financial), fields(user_id = %user.id))]
    pub async fn create_with_profile(
        &self,
        user: &User,
        profile: &UserProfile,
        financial: &FinancialData,
    ) -> Result<(), DatabaseError> {
        let mut tx = self
            .pool
            .pool()
            .begin()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, full_name, hashed_password, is_active, is_verified,
                oauth_provider, oauth_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.hashed_password)
        .bind(user.is_active)
        .bind(user.is_verified)
        .bind(&user.oauth_provider)
        .bind(&user.oauth_id)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO user_profiles (
                id, user_id, preferred_currency, preferred_language,
                email_notifications, push_notifications, transaction_alerts,
                subscription_type, subscription_expires, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(profile.id)
        .bind(profile.user_id)
        .bind(profile.preferred_currency)
        .bind(profile.preferred_language)
        .bind(profile.email_notifications)
        .bind(profile.push_notifications)
        .bind(profile.transaction_alerts)
        .bind(profile.subscription_type)
        .bind(profile.subscription_expires)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO financial_data (
                id, profile_id, balance, savings, credit_score, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(financial.id)
        .bind(financial.profile_id)
        .bind(financial.balance)
        .bind(financial.savings)
        .bind(financial.credit_score)
        .bind(financial.created_at)
        .bind(financial.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        tracing::info!(user_id = %user.id, email = %user.email, "User created");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool.pool())
        .await?;

        Ok(user)
    }

    /// Find a user by email (case-insensitive)
    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = LOWER($1)",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(self.pool.pool())
        .await?;

        Ok(user)
    }

    /// Find the user holding an unexpired reset token digest
    #[instrument(skip(self, token_digest))]
    pub async fn find_by_reset_token(
        &self,
        token_digest: &str,
    ) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {} FROM users
            WHERE reset_password_token = $1
              AND reset_password_token_expires > NOW()
            "#,
            USER_COLUMNS
        ))
        .bind(token_digest)
        .fetch_optional(self.pool.pool())
        .await?;

        Ok(user)
    }

    /// Active users whose profile allows email notifications
    #[instrument(skip(self))]
    pub async fn find_notifiable(&self) -> Result<Vec<User>, DatabaseError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.email, u.full_name, u.hashed_password, u.is_active,
                   u.is_verified, u.oauth_provider, u.oauth_id, u.phone_number,
                   u.date_of_birth, u.address, u.tax_residence,
                   u.reset_password_token, u.reset_password_token_expires,
                   u.created_at, u.updated_at
            FROM users u
            INNER JOIN user_profiles p ON p.user_id = u.id
            WHERE u.is_active = TRUE AND p.email_notifications = TRUE
            ORDER BY u.created_at
            "#,
        )
        .fetch_all(self.pool.pool())
        .await?;

        Ok(users)
    }

    /// Persist every mutable user column
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn update(&self, user: &User) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET full_name = $2,
                hashed_password = $3,
                is_active = $4,
                is_verified = $5,
                oauth_provider = $6,
                oauth_id = $7,
                phone_number = $8,
                date_of_birth = $9,
                address = $10,
                tax_residence = $11,
                reset_password_token = $12,
                reset_password_token_expires = $13,
                updated_at = $14
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.full_name)
        .bind(&user.hashed_password)
        .bind(user.is_active)
        .bind(user.is_verified)
        .bind(&user.oauth_provider)
        .bind(&user.oauth_id)
        .bind(&user.phone_number)
        .bind(user.date_of_birth)
        .bind(&user.address)
        .bind(&user.tax_residence)
        .bind(&user.reset_password_token)
        .bind(user.reset_password_token_expires)
        .bind(Utc::now())
        .execute(self.pool.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("User not found: {}", user.id)));
        }

        tracing::info!(user_id = %user.id, "User updated");
        Ok(())
    }
}

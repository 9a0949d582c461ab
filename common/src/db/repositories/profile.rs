// Profile, financial data and bank account repository

use crate::db::DbPool;
use crate::errors::DatabaseError;
use crate::models::{BankAccount, FinancialData, UserProfile};
use chrono::Utc;
use tracing::instrument;
use uuid::Uuid;

/// Repository for the per-user profile tree
#[derive(Clone)]
pub struct ProfileRepository {
    pool: DbPool,
}

impl ProfileRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Option<UserProfile>, DatabaseError> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT id, user_id, preferred_currency, preferred_language,
                   email_notifications, push_notifications, transaction_alerts,
                   subscription_type, subscription_expires, created_at, updated_at
            FROM user_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool.pool())
        .await?;

        Ok(profile)
    }

    #[instrument(skip(self, profile), fields(user_id = %profile.user_id))]
    pub async fn create(&self, profile: &UserProfile) -> Result<(), DatabaseError> {
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
        .execute(self.pool.pool())
        .await?;

        tracing::info!(user_id = %profile.user_id, "Profile created");
        Ok(())
    }

    #[instrument(skip(self, profile), fields(user_id = %profile.user_id))]
    pub async fn update(&self, profile: &UserProfile) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE user_profiles
            SET preferred_currency = $2,
                preferred_language = $3,
                email_notifications = $4,
                push_notifications = $5,
                transaction_alerts = $6,
                subscription_type = $7,
                subscription_expires = $8,
                updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(profile.id)
        .bind(profile.preferred_currency)
        .bind(profile.preferred_language)
        .bind(profile.email_notifications)
        .bind(profile.push_notifications)
        .bind(profile.transaction_alerts)
        .bind(profile.subscription_type)
        .bind(profile.subscription_expires)
        .bind(Utc::now())
        .execute(self.pool.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!(
                "Profile not found: {}",
                profile.id
            )));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn find_financial(
        &self,
        profile_id: Uuid,
    ) -> Result<Option<FinancialData>, DatabaseError> {
        let data = sqlx::query_as::<_, FinancialData>(
            r#"
            SELECT id, profile_id, balance, savings, credit_score, created_at, updated_at
            FROM financial_data
            WHERE profile_id = $1
            "#,
        )
        .bind(profile_id)
        .fetch_optional(self.pool.pool())
        .await?;

        Ok(data)
    }

    /// Financial data looked up through the owning user
    #[instrument(skip(self))]
    pub async fn find_financial_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<FinancialData>, DatabaseError> {
        let data = sqlx::query_as::<_, FinancialData>(
            r#"
            SELECT f.id, f.profile_id, f.balance, f.savings, f.credit_score,
                   f.created_at, f.updated_at
            FROM financial_data f
            INNER JOIN user_profiles p ON p.id = f.profile_id
            WHERE p.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool.pool())
        .await?;

        Ok(data)
    }

    #[instrument(skip(self, data), fields(profile_id = %data.profile_id))]
    pub async fn create_financial(&self, data: &FinancialData) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO financial_data (
                id, profile_id, balance, savings, credit_score, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(data.id)
        .bind(data.profile_id)
        .bind(data.balance)
        .bind(data.savings)
        .bind(data.credit_score)
        .bind(data.created_at)
        .bind(data.updated_at)
        .execute(self.pool.pool())
        .await?;

        Ok(())
    }

    #[instrument(skip(self, data), fields(profile_id = %data.profile_id))]
    pub async fn update_financial(&self, data: &FinancialData) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE financial_data
            SET balance = $2, savings = $3, credit_score = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(data.id)
        .bind(data.balance)
        .bind(data.savings)
        .bind(data.credit_score)
        .bind(Utc::now())
        .execute(self.pool.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!(
                "Financial data not found: {}",
                data.id
            )));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_accounts(
        &self,
        financial_data_id: Uuid,
    ) -> Result<Vec<BankAccount>, DatabaseError> {
        let accounts = sqlx::query_as::<_, BankAccount>(
            r#"
            SELECT id, financial_data_id, account_name, account_number, bank_name,
                   account_type, is_primary, created_at, updated_at
            FROM bank_accounts
            WHERE financial_data_id = $1
            ORDER BY is_primary DESC, created_at
            "#,
        )
        .bind(financial_data_id)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(accounts)
    }

    #[instrument(skip(self))]
    pub async fn find_account(&self, id: Uuid) -> Result<Option<BankAccount>, DatabaseError> {
        let account = sqlx::query_as::<_, BankAccount>(
            r#"
            SELECT id, financial_data_id, account_name, account_number, bank_name,
                   account_type, is_primary, created_at, updated_at
            FROM bank_accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.pool())
        .await?;

        Ok(account)
    }

    #[instrument(skip(self, account), fields(account_id = %account.id))]
    pub async fn create_account(&self, account: &BankAccount) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO bank_accounts (
                id, financial_data_id, account_name, account_number, bank_name,
                account_type, is_primary, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(account.id)
        .bind(account.financial_data_id)
        .bind(&account.account_name)
        .bind(&account.account_number)
        .bind(&account.bank_name)
        .bind(&account.account_type)
        .bind(account.is_primary)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(self.pool.pool())
        .await?;

        tracing::info!(account_id = %account.id, "Bank account created");
        Ok(())
    }

    #[instrument(skip(self, account), fields(account_id = %account.id))]
    pub async fn update_account(&self, account: &BankAccount) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE bank_accounts
            SET account_name = $2, bank_name = $3, account_type = $4,
                is_primary = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(account.id)
        .bind(&account.account_name)
        .bind(&account.bank_name)
        .bind(&account.account_type)
        .bind(account.is_primary)
        .bind(Utc::now())
        .execute(self.pool.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!(
                "Bank account not found: {}",
                account.id
            )));
        }

        Ok(())
    }

    /// Clear the primary flag on every account except `keep`
    #[instrument(skip(self))]
    pub async fn clear_primary(
        &self,
        financial_data_id: Uuid,
        keep: Uuid,
    ) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE bank_accounts
            SET is_primary = FALSE, updated_at = NOW()
            WHERE financial_data_id = $1 AND id <> $2 AND is_primary = TRUE
            "#,
        )
        .bind(financial_data_id)
        .bind(keep)
        .execute(self.pool.pool())
        .await?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    pub async fn delete_account(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM bank_accounts WHERE id = $1")
            .bind(id)
            .execute(self.pool.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Bank account not found: {}", id)));
        }

        tracing::info!(account_id = %id, "Bank account deleted");
        Ok(())
    }
}

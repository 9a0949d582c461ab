use crate::db::repositories::ProfileRepository;
use crate::db::DbPool;
use crate::errors::{DatabaseError, ServiceError};
use crate::models::{
    BankAccount, CreateBankAccount, Currency, FinancialData, Language, SubscriptionType,
    UpdateBankAccount, UpdateFinancialData, UpdateProfile, UserProfile,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

/// Length of a paid subscription period
pub const SUBSCRIPTION_DAYS: i64 = 30;

/// Profile with its financial data and bank accounts
#[derive(Debug, Clone, Serialize)]
pub struct FullProfile {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub financial_data: FinancialData,
    pub bank_accounts: Vec<BankAccount>,
}

/// Selectable currency or language
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingOption {
    pub code: &'static str,
    pub name: &'static str,
}

pub fn currency_options() -> Vec<SettingOption> {
    Currency::ALL
        .iter()
        .map(|c| SettingOption {
            code: c.as_str(),
            name: c.display_name(),
        })
        .collect()
}

pub fn language_options() -> Vec<SettingOption> {
    Language::ALL
        .iter()
        .map(|l| SettingOption {
            code: l.as_str(),
            name: l.as_str(),
        })
        .collect()
}

fn default_true() -> bool {
    true
}

/// Notification switches; missing values default to on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(default = "default_true")]
    pub email_notifications: bool,
    #[serde(default = "default_true")]
    pub push_notifications: bool,
    #[serde(default = "default_true")]
    pub transaction_alerts: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_notifications: true,
            push_notifications: true,
            transaction_alerts: true,
        }
    }
}

pub fn apply_profile_changes(profile: &mut UserProfile, changes: UpdateProfile) {
    if let Some(currency) = changes.preferred_currency {
        profile.preferred_currency = currency;
    }
    if let Some(language) = changes.preferred_language {
        profile.preferred_language = language;
    }
    if let Some(email) = changes.email_notifications {
        profile.email_notifications = email;
    }
    if let Some(push) = changes.push_notifications {
        profile.push_notifications = push;
    }
    if let Some(alerts) = changes.transaction_alerts {
        profile.transaction_alerts = alerts;
    }
}

#[derive(Clone)]
pub struct ProfileService {
    profiles: ProfileRepository,
}

impl ProfileService {
    pub fn new(pool: DbPool) -> Self {
        Self {
            profiles: ProfileRepository::new(pool),
        }
    }

    /// The user's profile, created with defaults on first access
    #[instrument(skip(self))]
    pub async fn profile(&self, user_id: Uuid) -> Result<UserProfile, ServiceError> {
        if let Some(profile) = self.profiles.find_by_user(user_id).await? {
            return Ok(profile);
        }
        let profile = UserProfile::new(user_id);
        self.profiles.create(&profile).await?;
        info!(user_id = %user_id, "Profile created");
        Ok(profile)
    }

    #[instrument(skip(self, changes))]
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        changes: UpdateProfile,
    ) -> Result<UserProfile, ServiceError> {
        let mut profile = self.profile(user_id).await?;
        apply_profile_changes(&mut profile, changes);
        profile.updated_at = Utc::now();
        self.profiles.update(&profile).await?;
        Ok(profile)
    }

    #[instrument(skip(self))]
    pub async fn update_subscription(
        &self,
        user_id: Uuid,
        subscription_type: SubscriptionType,
    ) -> Result<UserProfile, ServiceError> {
        let mut profile = self.profile(user_id).await?;
        let now = Utc::now();
        profile.subscription_type = subscription_type;
        profile.subscription_expires = Some(now + Duration::days(SUBSCRIPTION_DAYS));
        profile.updated_at = now;
        self.profiles.update(&profile).await?;
        Ok(profile)
    }

    /// The user's financial data, created zeroed on first access
    #[instrument(skip(self))]
    pub async fn financial(&self, user_id: Uuid) -> Result<FinancialData, ServiceError> {
        let profile = self.profile(user_id).await?;
        if let Some(data) = self.profiles.find_financial(profile.id).await? {
            return Ok(data);
        }
        let data = FinancialData::new(profile.id);
        self.profiles.create_financial(&data).await?;
        Ok(data)
    }

    #[instrument(skip(self, changes))]
    pub async fn update_financial(
        &self,
        user_id: Uuid,
        changes: UpdateFinancialData,
    ) -> Result<FinancialData, ServiceError> {
        let mut data = self.financial(user_id).await?;
        if let Some(balance) = changes.balance {
            data.balance = balance;
        }
        if let Some(savings) = changes.savings {
            data.savings = savings;
        }
        if let Some(credit_score) = changes.credit_score {
            data.credit_score = credit_score;
        }
        data.updated_at = Utc::now();
        self.profiles.update_financial(&data).await?;
        Ok(data)
    }

    pub async fn accounts(&self, user_id: Uuid) -> Result<Vec<BankAccount>, ServiceError> {
        let data = self.financial(user_id).await?;
        Ok(self.profiles.list_accounts(data.id).await?)
    }

    #[instrument(skip(self, request))]
    pub async fn create_account(
        &self,
        user_id: Uuid,
        request: CreateBankAccount,
    ) -> Result<BankAccount, ServiceError> {
        let data = self.financial(user_id).await?;
        let now = Utc::now();
        let account = BankAccount {
            id: Uuid::new_v4(),
            financial_data_id: data.id,
            account_name: request.account_name,
            account_number: request.account_number,
            bank_name: request.bank_name,
            account_type: request.account_type,
            is_primary: request.is_primary,
            created_at: now,
            updated_at: now,
        };
        self.profiles.create_account(&account).await?;
        if account.is_primary {
            self.profiles.clear_primary(data.id, account.id).await?;
        }
        Ok(account)
    }

    /// Load an account, rejecting accounts owned by other users
    async fn owned_account(&self, user_id: Uuid, id: Uuid) -> Result<BankAccount, ServiceError> {
        let data = self.financial(user_id).await?;
        let account = self
            .profiles
            .find_account(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Bank account not found"))?;
        if account.financial_data_id != data.id {
            return Err(ServiceError::forbidden("Access to this account is forbidden"));
        }
        Ok(account)
    }

    #[instrument(skip(self, changes))]
    pub async fn update_account(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: UpdateBankAccount,
    ) -> Result<BankAccount, ServiceError> {
        let mut account = self.owned_account(user_id, id).await?;
        if let Some(name) = changes.account_name {
            account.account_name = name;
        }
        if let Some(bank_name) = changes.bank_name {
            account.bank_name = bank_name;
        }
        if let Some(account_type) = changes.account_type {
            account.account_type = account_type;
        }
        if let Some(is_primary) = changes.is_primary {
            account.is_primary = is_primary;
        }
        account.updated_at = Utc::now();

        if account.is_primary {
            self.profiles
                .clear_primary(account.financial_data_id, account.id)
                .await?;
        }
        self.profiles.update_account(&account).await?;
        Ok(account)
    }

    #[instrument(skip(self))]
    pub async fn delete_account(&self, user_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let account = self.owned_account(user_id, id).await?;
        match self.profiles.delete_account(account.id).await {
            Err(DatabaseError::NotFound(_)) => Err(ServiceError::not_found("Bank account not found")),
            other => Ok(other?),
        }
    }

    pub async fn full(&self, user_id: Uuid) -> Result<FullProfile, ServiceError> {
        let profile = self.profile(user_id).await?;
        let financial_data = self.financial(user_id).await?;
        let bank_accounts = self.profiles.list_accounts(financial_data.id).await?;
        Ok(FullProfile {
            profile,
            financial_data,
            bank_accounts,
        })
    }

    pub async fn set_currency(&self, user_id: Uuid, currency: Currency) -> Result<(), ServiceError> {
        self.update_profile(
            user_id,
            UpdateProfile {
                preferred_currency: Some(currency),
                ..UpdateProfile::default()
            },
        )
        .await?;
        Ok(())
    }

    pub async fn set_language(&self, user_id: Uuid, language: Language) -> Result<(), ServiceError> {
        self.update_profile(
            user_id,
            UpdateProfile {
                preferred_language: Some(language),
                ..UpdateProfile::default()
            },
        )
        .await?;
        Ok(())
    }

    pub async fn set_notifications(
        &self,
        user_id: Uuid,
        settings: NotificationSettings,
    ) -> Result<NotificationSettings, ServiceError> {
        self.update_profile(
            user_id,
            UpdateProfile {
                email_notifications: Some(settings.email_notifications),
                push_notifications: Some(settings.push_notifications),
                transaction_alerts: Some(settings.transaction_alerts),
                ..UpdateProfile::default()
            },
        )
        .await?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_options_carry_display_names() {
        let options = currency_options();
        assert_eq!(options.len(), 5);
        assert!(options.contains(&SettingOption {
            code: "KZT",
            name: "Kazakhstani Tenge"
        }));
    }

    #[test]
    fn test_language_options_use_name_as_code() {
        assert!(language_options().iter().all(|o| o.code == o.name));
    }

    #[test]
    fn test_notification_settings_default_to_enabled() {
        let settings: NotificationSettings =
            serde_json::from_str(r#"{"push_notifications": false}"#).unwrap();
        assert!(settings.email_notifications);
        assert!(!settings.push_notifications);
        assert!(settings.transaction_alerts);
    }

    #[test]
    fn test_apply_profile_changes() {
        let mut profile = UserProfile::new(Uuid::new_v4());
        apply_profile_changes(
            &mut profile,
            UpdateProfile {
                preferred_currency: Some(Currency::Eur),
                transaction_alerts: Some(false),
                ..UpdateProfile::default()
            },
        );
        assert_eq!(profile.preferred_currency, Currency::Eur);
        assert_eq!(profile.preferred_language, Language::English);
        assert!(!profile.transaction_alerts);
        assert!(profile.email_notifications);
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// Declares a string-backed enum stored as TEXT.
///
/// Generates serde names, `Display`/`FromStr`/`TryFrom<String>` and the sqlx
/// `Type`/`Encode`/`Decode` impls so the enum binds and decodes directly.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(format!(concat!("Invalid ", stringify!($name), ": {}"), s)),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::from_str(&s)
            }
        }

        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <&str as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <&str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'q> sqlx::Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <&str as sqlx::Encode<sqlx::Postgres>>::encode(self.as_str(), buf)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let text = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                Ok(text.parse::<$name>()?)
            }
        }
    };
}

// ============================================================================
// Enumerations
// ============================================================================

text_enum! {
    /// Whether a category or transaction is money in or money out
    pub enum CategoryType {
        Income => "income",
        Expense => "expense",
    }
}

impl Default for CategoryType {
    fn default() -> Self {
        CategoryType::Expense
    }
}

text_enum! {
    pub enum PaymentMethod {
        Cash => "cash",
        Card => "card",
        BankTransfer => "bank_transfer",
        Other => "other",
    }
}

text_enum! {
    pub enum BudgetPeriod {
        Monthly => "monthly",
        Weekly => "weekly",
        Yearly => "yearly",
    }
}

impl Default for BudgetPeriod {
    fn default() -> Self {
        BudgetPeriod::Monthly
    }
}

text_enum! {
    pub enum Currency {
        Usd => "USD",
        Eur => "EUR",
        Rub => "RUB",
        Kzt => "KZT",
        Gbp => "GBP",
    }
}

impl Currency {
    pub fn display_name(&self) -> &'static str {
        match self {
            Currency::Usd => "US Dollar",
            Currency::Eur => "Euro",
            Currency::Rub => "Russian Ruble",
            Currency::Kzt => "Kazakhstani Tenge",
            Currency::Gbp => "British Pound",
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::Usd
    }
}

text_enum! {
    pub enum Language {
        English => "English",
        Russian => "Russian",
        Kazakh => "Kazakh",
        Spanish => "Spanish",
        German => "German",
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::English
    }
}

text_enum! {
    pub enum SubscriptionType {
        Free => "Free Member",
        Premium => "Premium Member",
        Business => "Business Member",
    }
}

impl Default for SubscriptionType {
    fn default() -> Self {
        SubscriptionType::Free
    }
}

text_enum! {
    pub enum NotificationType {
        LargeTransaction => "large_transaction",
        UpcomingBill => "upcoming_bill",
        NewDeviceLogin => "new_device_login",
        BudgetGoalAchieved => "budget_goal_achieved",
        WeeklySummary => "weekly_summary",
        SecurityAlert => "security_alert",
        SubscriptionRenewal => "subscription_renewal",
    }
}

impl NotificationType {
    /// Icon used when a notification is created without one
    pub fn default_icon(&self) -> &'static str {
        match self {
            NotificationType::LargeTransaction => "cash-outline",
            NotificationType::UpcomingBill => "calendar-outline",
            NotificationType::NewDeviceLogin => "lock-closed-outline",
            NotificationType::BudgetGoalAchieved => "checkmark-circle-outline",
            NotificationType::WeeklySummary => "stats-chart-outline",
            NotificationType::SecurityAlert => "warning-outline",
            NotificationType::SubscriptionRenewal => "refresh-outline",
        }
    }

    /// Category a notification of this type is filed under
    pub fn default_category(&self) -> NotificationCategory {
        match self {
            NotificationType::LargeTransaction => NotificationCategory::Transactions,
            NotificationType::UpcomingBill | NotificationType::SubscriptionRenewal => {
                NotificationCategory::Bills
            }
            NotificationType::NewDeviceLogin | NotificationType::SecurityAlert => {
                NotificationCategory::Security
            }
            NotificationType::BudgetGoalAchieved => NotificationCategory::Budget,
            NotificationType::WeeklySummary => NotificationCategory::All,
        }
    }
}

text_enum! {
    pub enum NotificationCategory {
        All => "all",
        Transactions => "transactions",
        Bills => "bills",
        Security => "security",
        Budget => "budget",
    }
}

text_enum! {
    pub enum MessageRole {
        User => "user",
        Assistant => "assistant",
        System => "system",
    }
}

text_enum! {
    pub enum ReportType {
        WeeklySummary => "weekly_summary",
        MonthlySummary => "monthly_summary",
        QuarterlySummary => "quarterly_summary",
        YearlySummary => "yearly_summary",
        CustomPeriod => "custom_period",
        TransactionDetails => "transaction_details",
        BudgetAnalysis => "budget_analysis",
        CategoryBreakdown => "category_breakdown",
    }
}

text_enum! {
    pub enum ExportFormat {
        Pdf => "pdf",
        Csv => "csv",
        Excel => "excel",
    }
}

impl ExportFormat {
    /// File extension of the rendered document
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xlsx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Csv => "text/csv",
            ExportFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

text_enum! {
    pub enum ExportStatus {
        Processing => "processing",
        Completed => "completed",
        Failed => "failed",
        Expired => "expired",
    }
}

// ============================================================================
// Users & profiles
// ============================================================================

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing)]
    pub hashed_password: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub oauth_provider: Option<String>,
    pub oauth_id: Option<String>,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub tax_residence: Option<String>,
    #[serde(skip_serializing)]
    pub reset_password_token: Option<String>,
    #[serde(skip_serializing)]
    pub reset_password_token_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// New email/password user, not yet persisted
    pub fn new_local(email: &str, full_name: &str, hashed_password: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: email.to_lowercase(),
            full_name: full_name.to_string(),
            hashed_password: Some(hashed_password),
            is_active: true,
            is_verified: false,
            oauth_provider: None,
            oauth_id: None,
            phone_number: None,
            date_of_birth: None,
            address: None,
            tax_residence: None,
            reset_password_token: None,
            reset_password_token_expires: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// New user created from a verified OAuth identity
    pub fn new_oauth(email: &str, full_name: &str, provider: &str, subject: &str) -> Self {
        let mut user = Self::new_local(email, full_name, String::new());
        user.hashed_password = None;
        user.is_verified = true;
        user.oauth_provider = Some(provider.to_string());
        user.oauth_id = Some(subject.to_string());
        user
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUser {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub tax_residence: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub preferred_currency: Currency,
    pub preferred_language: Language,
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub transaction_alerts: bool,
    pub subscription_type: SubscriptionType,
    pub subscription_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Default profile with a free subscription valid for a year
    pub fn new(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            preferred_currency: Currency::default(),
            preferred_language: Language::default(),
            email_notifications: true,
            push_notifications: true,
            transaction_alerts: true,
            subscription_type: SubscriptionType::Free,
            subscription_expires: Some(now + chrono::Duration::days(365)),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfile {
    pub preferred_currency: Option<Currency>,
    pub preferred_language: Option<Language>,
    pub email_notifications: Option<bool>,
    pub push_notifications: Option<bool>,
    pub transaction_alerts: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FinancialData {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub balance: f64,
    pub savings: f64,
    pub credit_score: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FinancialData {
    pub fn new(profile_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            profile_id,
            balance: 0.0,
            savings: 0.0,
            credit_score: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFinancialData {
    pub balance: Option<f64>,
    pub savings: Option<f64>,
    pub credit_score: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BankAccount {
    pub id: Uuid,
    pub financial_data_id: Uuid,
    pub account_name: String,
    pub account_number: String,
    pub bank_name: String,
    pub account_type: String,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBankAccount {
    pub account_name: String,
    pub account_number: String,
    pub bank_name: String,
    pub account_type: String,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBankAccount {
    pub account_name: Option<String>,
    pub bank_name: Option<String>,
    pub account_type: Option<String>,
    pub is_primary: Option<bool>,
}

// ============================================================================
// Categories, transactions & budgets
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub category_type: CategoryType,
    pub is_system: bool,
    pub parent_id: Option<Uuid>,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    #[serde(default)]
    pub category_type: CategoryType,
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub position: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub category_type: Option<CategoryType>,
    pub parent_id: Option<Uuid>,
    pub position: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Option<Uuid>,
    pub amount: f64,
    pub transaction_type: CategoryType,
    pub description: Option<String>,
    pub transaction_date: DateTime<Utc>,
    pub payment_method: Option<PaymentMethod>,
    pub is_recurring: bool,
    pub note: Option<String>,
    pub receipt_photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Transaction joined with its (optional) category presentation fields
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TransactionWithCategory {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub transaction: Transaction,
    pub category_name: Option<String>,
    pub category_icon: Option<String>,
    pub category_color: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTransaction {
    pub amount: f64,
    pub transaction_type: CategoryType,
    pub description: Option<String>,
    pub transaction_date: DateTime<Utc>,
    pub category_id: Option<Uuid>,
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub is_recurring: bool,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTransaction {
    pub amount: Option<f64>,
    pub transaction_type: Option<CategoryType>,
    pub description: Option<String>,
    pub transaction_date: Option<DateTime<Utc>>,
    pub category_id: Option<Uuid>,
    pub payment_method: Option<PaymentMethod>,
    pub is_recurring: Option<bool>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Budget {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub amount: f64,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    /// Number of calendar days covered, both bounds included
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

/// Budget joined with its category presentation fields
#[derive(Debug, Clone, FromRow)]
pub struct BudgetWithCategory {
    #[sqlx(flatten)]
    pub budget: Budget,
    pub category_name: String,
    pub category_icon: Option<String>,
    pub category_color: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBudget {
    pub category_id: Uuid,
    pub amount: f64,
    #[serde(default)]
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBudget {
    pub amount: Option<f64>,
    pub period: Option<BudgetPeriod>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuickBudgetSetup {
    pub total_monthly_budget: f64,
    #[serde(default = "default_true")]
    pub auto_distribute: bool,
}

// ============================================================================
// Notifications
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub category: NotificationCategory,
    pub icon: Option<String>,
    pub is_read: bool,
    pub is_actionable: bool,
    pub action_url: Option<String>,
    pub transaction_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Notification to be created on behalf of a user
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub category: NotificationCategory,
    pub icon: Option<String>,
    pub is_actionable: bool,
    pub action_url: Option<String>,
    pub transaction_id: Option<Uuid>,
}

impl NewNotification {
    pub fn new(
        user_id: Uuid,
        notification_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            title: title.into(),
            message: message.into(),
            notification_type,
            category: notification_type.default_category(),
            icon: None,
            is_actionable: false,
            action_url: None,
            transaction_id: None,
        }
    }

    pub fn with_category(mut self, category: NotificationCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_action(mut self, action_url: impl Into<String>) -> Self {
        self.is_actionable = true;
        self.action_url = Some(action_url.into());
        self
    }

    pub fn for_transaction(mut self, transaction_id: Uuid) -> Self {
        self.transaction_id = Some(transaction_id);
        self
    }

    /// Materialize into a row, filling the type's default icon
    pub fn into_notification(self, created_at: DateTime<Utc>) -> Notification {
        let icon = self
            .icon
            .or_else(|| Some(self.notification_type.default_icon().to_string()));
        Notification {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            title: self.title,
            message: self.message,
            notification_type: self.notification_type,
            category: self.category,
            icon,
            is_read: false,
            is_actionable: self.is_actionable,
            action_url: self.action_url,
            transaction_id: self.transaction_id,
            created_at,
        }
    }
}

// ============================================================================
// Chat
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatMessage {
    pub id: Uuid,
    pub session_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub function_call: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Exports
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExportedReport {
    pub id: Uuid,
    pub user_id: Uuid,
    pub report_type: ReportType,
    pub format: ExportFormat,
    pub status: ExportStatus,
    pub file_path: Option<String>,
    pub file_size: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ExportedReport {
    /// Download name shown to users, e.g. `monthly_summary_20240131.csv`
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}.{}",
            self.report_type,
            self.created_at.format("%Y%m%d"),
            self.format.extension()
        )
    }

    pub fn is_downloadable(&self, now: DateTime<Utc>) -> bool {
        self.status == ExportStatus::Completed && self.expires_at > now && self.file_path.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_text_enum_round_trip_through_strings() {
        for currency in Currency::ALL {
            assert_eq!(Currency::from_str(currency.as_str()), Ok(*currency));
        }
        assert_eq!(SubscriptionType::Premium.to_string(), "Premium Member");
        assert!(PaymentMethod::from_str("cheque").is_err());
    }

    #[test]
    fn test_text_enum_serde_names() {
        let json = serde_json::to_string(&NotificationType::LargeTransaction).unwrap();
        assert_eq!(json, "\"large_transaction\"");
        let language: Language = serde_json::from_str("\"Kazakh\"").unwrap();
        assert_eq!(language, Language::Kazakh);
    }

    #[test]
    fn test_notification_defaults_follow_type() {
        let user_id = Uuid::new_v4();
        let n = NewNotification::new(user_id, NotificationType::UpcomingBill, "t", "m")
            .into_notification(Utc::now());
        assert_eq!(n.category, NotificationCategory::Bills);
        assert_eq!(n.icon.as_deref(), Some("calendar-outline"));
        assert!(!n.is_read);
        assert!(!n.is_actionable);
    }

    #[test]
    fn test_notification_action_marks_actionable() {
        let n = NewNotification::new(Uuid::new_v4(), NotificationType::BudgetGoalAchieved, "t", "m")
            .with_action("/budgets/1");
        assert!(n.is_actionable);
        assert_eq!(n.action_url.as_deref(), Some("/budgets/1"));
    }

    #[test]
    fn test_budget_days_are_inclusive() {
        let now = Utc::now();
        let budget = Budget {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            amount: 100.0,
            period: BudgetPeriod::Monthly,
            start_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(budget.days(), 29);
    }

    #[test]
    fn test_export_file_name_and_availability() {
        let created = Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap();
        let mut report = ExportedReport {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            report_type: ReportType::MonthlySummary,
            format: ExportFormat::Excel,
            status: ExportStatus::Processing,
            file_path: None,
            file_size: None,
            error_message: None,
            created_at: created,
            expires_at: created + chrono::Duration::days(7),
        };
        assert_eq!(report.file_name(), "monthly_summary_20240305.xlsx");
        assert!(!report.is_downloadable(created));

        report.status = ExportStatus::Completed;
        report.file_path = Some("uploads/exports/x.xlsx".to_string());
        assert!(report.is_downloadable(created + chrono::Duration::days(1)));
        assert!(!report.is_downloadable(created + chrono::Duration::days(8)));
    }

    #[test]
    fn test_oauth_user_is_verified_without_password() {
        let user = User::new_oauth("A@Example.com", "Ann", "google", "sub-1");
        assert!(user.is_verified);
        assert!(user.hashed_password.is_none());
        assert_eq!(user.email, "a@example.com");
    }
}

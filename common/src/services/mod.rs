// Domain services used by the API handlers and scheduler jobs

pub mod auth;
pub mod budgets;
pub mod categories;
pub mod chat;
pub mod mailer;
pub mod notifications;
pub mod oauth;
pub mod profile;
pub mod reports;
pub mod transactions;
pub mod users;

pub use auth::AuthService;
pub use budgets::BudgetService;
pub use categories::CategoryService;
pub use chat::{ChatCompletionClient, ChatService, OpenAiClient};
pub use mailer::{LogMailer, Mailer};
pub use notifications::NotificationService;
pub use oauth::{HttpOAuthVerifier, OAuthVerifier};
pub use profile::ProfileService;
pub use reports::ReportService;
pub use transactions::TransactionService;
pub use users::UserService;

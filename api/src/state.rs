use std::sync::Arc;

use common::config::Settings;
use common::db::DbPool;
use common::services::{
    AuthService, BudgetService, CategoryService, ChatCompletionClient, ChatService, Mailer,
    NotificationService, OAuthVerifier, ProfileService, ReportService, TransactionService,
    UserService,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: DbPool,
    pub config: Arc<Settings>,
    pub auth: AuthService,
    pub users: UserService,
    pub categories: CategoryService,
    pub transactions: TransactionService,
    pub budgets: BudgetService,
    pub profiles: ProfileService,
    pub notifications: NotificationService,
    pub reports: ReportService,
    pub chat: ChatService,
}

impl AppState {
    /// Wire every service onto one pool; external seams are passed in
    pub fn new(
        db_pool: DbPool,
        config: Settings,
        mailer: Arc<dyn Mailer>,
        oauth: Arc<dyn OAuthVerifier>,
        completions: Arc<dyn ChatCompletionClient>,
    ) -> Self {
        let auth = AuthService::new(db_pool.clone(), &config.auth, mailer, oauth);

        Self {
            auth,
            users: UserService::new(db_pool.clone()),
            categories: CategoryService::new(db_pool.clone()),
            transactions: TransactionService::new(db_pool.clone()),
            budgets: BudgetService::new(db_pool.clone()),
            profiles: ProfileService::new(db_pool.clone()),
            notifications: NotificationService::new(db_pool.clone()),
            reports: ReportService::new(db_pool.clone()),
            chat: ChatService::new(db_pool.clone(), completions),
            config: Arc::new(config),
            db_pool,
        }
    }
}

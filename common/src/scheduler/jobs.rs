// Periodic notification jobs

use crate::db::repositories::UserRepository;
use crate::db::DbPool;
use crate::errors::ServiceError;
use crate::services::NotificationService;
use async_trait::async_trait;
use tracing::{info, instrument, warn};

pub const WEEKLY_REPORTS_JOB: &str = "weekly_reports";
pub const BILL_CHECK_JOB: &str = "check_upcoming_bills";

/// A unit of work the scheduler fires on a cron trigger
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    fn name(&self) -> &'static str;

    /// Run once; returns how many items were handled
    async fn run(&self) -> Result<usize, ServiceError>;
}

/// Weekly spending summary for every user with email notifications on
pub struct WeeklyReportJob {
    users: UserRepository,
    notifications: NotificationService,
}

impl WeeklyReportJob {
    pub fn new(pool: DbPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            notifications: NotificationService::new(pool),
        }
    }
}

#[async_trait]
impl ScheduledJob for WeeklyReportJob {
    fn name(&self) -> &'static str {
        WEEKLY_REPORTS_JOB
    }

    #[instrument(skip(self))]
    async fn run(&self) -> Result<usize, ServiceError> {
        let users = self.users.find_notifiable().await?;
        let mut sent = 0;
        for user in &users {
            match self.notifications.weekly_summary(user.id).await {
                Ok(_) => sent += 1,
                Err(e) => {
                    warn!(user_id = %user.id, error = %e, "Weekly summary failed for user");
                }
            }
        }
        info!(users = users.len(), sent, "Weekly summaries sent");
        Ok(sent)
    }
}

/// Reminders for recurring expenses coming due
pub struct BillCheckJob {
    notifications: NotificationService,
    lookahead_days: i64,
}

impl BillCheckJob {
    pub fn new(pool: DbPool, lookahead_days: i64) -> Self {
        Self {
            notifications: NotificationService::new(pool),
            lookahead_days,
        }
    }
}

#[async_trait]
impl ScheduledJob for BillCheckJob {
    fn name(&self) -> &'static str {
        BILL_CHECK_JOB
    }

    #[instrument(skip(self), fields(lookahead_days = self.lookahead_days))]
    async fn run(&self) -> Result<usize, ServiceError> {
        self.notifications.upcoming_bills(self.lookahead_days).await
    }
}

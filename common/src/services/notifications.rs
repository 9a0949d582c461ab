use crate::dates::{self, EARLIER_THIS_WEEK, TODAY, YESTERDAY};
use crate::db::repositories::{NotificationFilter, NotificationRepository, TransactionRepository};
use crate::db::DbPool;
use crate::errors::{DatabaseError, ServiceError};
use crate::models::{
    NewNotification, Notification, NotificationCategory, NotificationType, Transaction,
};
use crate::report::weekly_summary_message;
use crate::telemetry;
use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};
use uuid::Uuid;

pub const WEEKLY_SUMMARY_TITLE: &str = "Weekly Spending Summary";
pub const UPCOMING_BILL_TITLE: &str = "Upcoming Bill Payment";
pub const LARGE_TRANSACTION_TITLE: &str = "Large Transaction Detected";
pub const LARGE_TRANSACTION_THRESHOLD: f64 = 500.0;

/// Notification with its age rendered for display
#[derive(Debug, Clone, Serialize)]
pub struct NotificationView {
    #[serde(flatten)]
    pub notification: Notification,
    pub relative_time: String,
}

impl NotificationView {
    pub fn new(notification: Notification, now: DateTime<Utc>) -> Self {
        let relative_time = dates::relative_time(notification.created_at, now);
        Self {
            notification,
            relative_time,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationGroup {
    pub title: String,
    pub notifications: Vec<NotificationView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationSummary {
    pub total: usize,
    pub unread: usize,
    /// Unread count per category
    pub by_category: BTreeMap<&'static str, usize>,
}

impl NotificationSummary {
    pub fn from_states(states: &[(NotificationCategory, bool)]) -> Self {
        let mut by_category: BTreeMap<&'static str, usize> = NotificationCategory::ALL
            .iter()
            .map(|c| (c.as_str(), 0))
            .collect();
        let mut unread = 0;
        for (category, is_read) in states {
            if !is_read {
                unread += 1;
                *by_category.entry(category.as_str()).or_default() += 1;
            }
        }
        Self {
            total: states.len(),
            unread,
            by_category,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationList {
    pub groups: Vec<NotificationGroup>,
    pub summary: NotificationSummary,
}

/// Group newest-first notifications under "Today", "Yesterday",
/// "Earlier This Week" and then one group per month, dropping empty groups
pub fn group_notifications(
    notifications: Vec<Notification>,
    now: DateTime<Utc>,
) -> Vec<NotificationGroup> {
    let today = now.date_naive();
    let mut groups: Vec<NotificationGroup> = [TODAY, YESTERDAY, EARLIER_THIS_WEEK]
        .iter()
        .map(|title| NotificationGroup {
            title: title.to_string(),
            notifications: Vec::new(),
        })
        .collect();

    for notification in notifications {
        let title = dates::notification_section(notification.created_at.date_naive(), today);
        let view = NotificationView::new(notification, now);
        match groups.iter_mut().find(|g| g.title == title) {
            Some(group) => group.notifications.push(view),
            None => groups.push(NotificationGroup {
                title,
                notifications: vec![view],
            }),
        }
    }

    groups.retain(|g| !g.notifications.is_empty());
    groups
}

/// Fixed title and message used by the single test notification endpoint
pub fn test_notification_text(notification_type: NotificationType) -> (&'static str, &'static str) {
    match notification_type {
        NotificationType::LargeTransaction => (LARGE_TRANSACTION_TITLE, "$500 spent at Amazon"),
        NotificationType::UpcomingBill => (UPCOMING_BILL_TITLE, "Electric Bill due in 2 days"),
        NotificationType::NewDeviceLogin => ("New Device Login", "Login from iPhone 14"),
        NotificationType::SecurityAlert => {
            ("Suspicious Activity", "Password change attempt detected")
        }
        NotificationType::BudgetGoalAchieved => ("Budget Goal Achieved", "Savings goal reached"),
        NotificationType::WeeklySummary => (WEEKLY_SUMMARY_TITLE, "Your spending is on track"),
        NotificationType::SubscriptionRenewal => (
            "Subscription Renewal",
            "Netflix subscription will renew tomorrow",
        ),
    }
}

fn sample_text(notification_type: NotificationType) -> (&'static str, [&'static str; 3]) {
    match notification_type {
        NotificationType::LargeTransaction => (
            LARGE_TRANSACTION_TITLE,
            [
                "$500 spent at Amazon",
                "$750 spent at Apple Store",
                "$600 transfer to Savings Account",
            ],
        ),
        NotificationType::UpcomingBill => (
            UPCOMING_BILL_TITLE,
            [
                "Electric Bill due in 2 days",
                "Rent payment due tomorrow",
                "Internet subscription expires next week",
            ],
        ),
        NotificationType::NewDeviceLogin => (
            "New Device Login",
            [
                "Login from iPhone 14",
                "New login from Windows PC",
                "Access from unrecognized device",
            ],
        ),
        NotificationType::SecurityAlert => (
            "Security Alert",
            [
                "Password change attempt detected",
                "Suspicious login attempt blocked",
                "Email address verification required",
            ],
        ),
        NotificationType::BudgetGoalAchieved => (
            "Budget Goal Achieved",
            [
                "Savings goal reached",
                "Budget target achieved",
                "Monthly expense limit maintained",
            ],
        ),
        NotificationType::WeeklySummary => (
            WEEKLY_SUMMARY_TITLE,
            [
                "Your spending is on track",
                "You saved 15% more than last week",
                "Weekly spending report available",
            ],
        ),
        NotificationType::SubscriptionRenewal => (
            "Subscription Renewal",
            [
                "Netflix subscription will renew tomorrow",
                "Office 365 subscription renewed",
                "Spotify Premium membership expiring soon",
            ],
        ),
    }
}

/// Random notifications spread over the last ten days; older ones are
/// more likely to be read
pub fn sample_notifications<R: Rng>(
    rng: &mut R,
    user_id: Uuid,
    count: usize,
    now: DateTime<Utc>,
) -> Vec<Notification> {
    (0..count)
        .filter_map(|_| {
            let notification_type = *NotificationType::ALL.choose(rng)?;
            let (title, messages) = sample_text(notification_type);
            let message = *messages.choose(rng)?;

            let days_ago = rng.gen_range(0..=10);
            let created_at = now
                - Duration::days(days_ago)
                - Duration::hours(rng.gen_range(0..=23))
                - Duration::minutes(rng.gen_range(0..=59));

            let mut notification = NewNotification::new(user_id, notification_type, title, message)
                .into_notification(created_at);
            notification.is_read = rng.gen_bool(days_ago as f64 / 10.0);
            notification.is_actionable = rng.gen_bool(0.3);
            if rng.gen_bool(0.3) {
                notification.action_url = Some(format!("/actions/{}", notification_type));
            }
            Some(notification)
        })
        .collect()
}

/// "$512.00 spent" / "$512.00 received"
pub fn large_transaction_message(transaction: &Transaction) -> String {
    let verb = match transaction.transaction_type {
        crate::models::CategoryType::Income => "received",
        crate::models::CategoryType::Expense => "spent",
    };
    format!("${:.2} {}", transaction.amount, verb)
}

/// Next monthly due date of a recurring payment last made on `last`, on or after `today`
pub fn next_monthly_due(last: NaiveDate, today: NaiveDate) -> Option<NaiveDate> {
    let mut months = 0;
    loop {
        let due = last.checked_add_months(Months::new(months))?;
        if due >= today {
            return Some(due);
        }
        months += 1;
    }
}

/// "Rent of $1200.00 is due in 2 days"
pub fn upcoming_bill_message(description: Option<&str>, amount: f64, days_until: i64) -> String {
    let name = description.filter(|d| !d.is_empty()).unwrap_or("Recurring payment");
    let when = match days_until {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        n => format!("in {} days", n),
    };
    format!("{} of ${:.2} is due {}", name, amount, when)
}

#[derive(Clone)]
pub struct NotificationService {
    notifications: NotificationRepository,
    transactions: TransactionRepository,
}

impl NotificationService {
    pub fn new(pool: DbPool) -> Self {
        Self {
            notifications: NotificationRepository::new(pool.clone()),
            transactions: TransactionRepository::new(pool),
        }
    }

    #[instrument(skip(self, notification), fields(user_id = %notification.user_id))]
    pub async fn create(&self, notification: NewNotification) -> Result<Notification, ServiceError> {
        let notification = notification.into_notification(Utc::now());
        self.notifications.create(&notification).await?;
        telemetry::record_notification_created(notification.notification_type.as_str());
        Ok(notification)
    }

    #[instrument(skip(self, filter))]
    pub async fn list(
        &self,
        user_id: Uuid,
        filter: &NotificationFilter,
    ) -> Result<NotificationList, ServiceError> {
        let summary = self.summary(user_id).await?;
        let notifications = self.notifications.list(user_id, filter).await?;
        Ok(NotificationList {
            groups: group_notifications(notifications, Utc::now()),
            summary,
        })
    }

    pub async fn summary(&self, user_id: Uuid) -> Result<NotificationSummary, ServiceError> {
        let states = self.notifications.read_states(user_id).await?;
        Ok(NotificationSummary::from_states(&states))
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> Result<NotificationView, ServiceError> {
        let notification = self
            .notifications
            .find_by_id(user_id, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Notification not found"))?;
        Ok(NotificationView::new(notification, Utc::now()))
    }

    #[instrument(skip(self))]
    pub async fn set_read(
        &self,
        user_id: Uuid,
        id: Uuid,
        is_read: Option<bool>,
    ) -> Result<NotificationView, ServiceError> {
        if let Some(is_read) = is_read {
            match self.notifications.set_read(user_id, id, is_read).await {
                Err(DatabaseError::NotFound(_)) => {
                    return Err(ServiceError::not_found("Notification not found"))
                }
                other => other?,
            }
        }
        self.get(user_id, id).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        match self.notifications.delete(user_id, id).await {
            Err(DatabaseError::NotFound(_)) => Err(ServiceError::not_found("Notification not found")),
            other => Ok(other?),
        }
    }

    pub async fn mark_all_read(
        &self,
        user_id: Uuid,
        category: Option<NotificationCategory>,
    ) -> Result<u64, ServiceError> {
        Ok(self.notifications.mark_all_read(user_id, category).await?)
    }

    pub async fn create_test(
        &self,
        user_id: Uuid,
        notification_type: NotificationType,
    ) -> Result<NotificationView, ServiceError> {
        let (title, message) = test_notification_text(notification_type);
        let notification = self
            .create(NewNotification::new(user_id, notification_type, title, message))
            .await?;
        Ok(NotificationView::new(notification, Utc::now()))
    }

    #[instrument(skip(self))]
    pub async fn generate_test_data(&self, user_id: Uuid, count: usize) -> Result<usize, ServiceError> {
        let notifications = sample_notifications(&mut rand::thread_rng(), user_id, count, Utc::now());
        for notification in &notifications {
            self.notifications.create(notification).await?;
        }
        info!(user_id = %user_id, count = notifications.len(), "Test notifications generated");
        Ok(notifications.len())
    }

    /// Raise a large-transaction notification when the amount warrants one
    pub async fn notify_large_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Option<Notification>, ServiceError> {
        if transaction.amount <= LARGE_TRANSACTION_THRESHOLD {
            return Ok(None);
        }
        let notification = NewNotification::new(
            transaction.user_id,
            NotificationType::LargeTransaction,
            LARGE_TRANSACTION_TITLE,
            large_transaction_message(transaction),
        )
        .with_category(NotificationCategory::Transactions)
        .with_action(format!("/transactions/{}", transaction.id))
        .for_transaction(transaction.id);
        self.create(notification).await.map(Some)
    }

    /// Summarize the current Monday-Sunday week for one user
    #[instrument(skip(self))]
    pub async fn weekly_summary(&self, user_id: Uuid) -> Result<Notification, ServiceError> {
        let (monday, sunday) = dates::week_bounds(Utc::now().date_naive());
        let (start, end) = dates::day_range(monday, sunday)?;
        let totals = self.transactions.totals_between(user_id, start, end).await?;

        let notification = NewNotification::new(
            user_id,
            NotificationType::WeeklySummary,
            WEEKLY_SUMMARY_TITLE,
            weekly_summary_message(totals.count, totals.income, totals.expense),
        )
        .with_category(NotificationCategory::All);
        self.create(notification).await
    }

    /// Notify about recurring expenses falling due within `lookahead_days`.
    /// Returns the number of notifications created.
    #[instrument(skip(self))]
    pub async fn upcoming_bills(&self, lookahead_days: i64) -> Result<usize, ServiceError> {
        let today = Utc::now().date_naive();
        let horizon = today + Duration::days(lookahead_days);
        let mut created = 0;

        for transaction in self.transactions.latest_recurring_expenses().await? {
            let Some(due) = next_monthly_due(transaction.transaction_date.date_naive(), today) else {
                continue;
            };
            if due > horizon {
                continue;
            }

            let since = dates::day_start(due - Duration::days(lookahead_days));
            if self
                .notifications
                .exists_for_transaction(transaction.user_id, transaction.id, UPCOMING_BILL_TITLE, since)
                .await?
            {
                debug!(transaction_id = %transaction.id, "Bill reminder already sent");
                continue;
            }

            let notification = NewNotification::new(
                transaction.user_id,
                NotificationType::UpcomingBill,
                UPCOMING_BILL_TITLE,
                upcoming_bill_message(
                    transaction.description.as_deref(),
                    transaction.amount,
                    (due - today).num_days(),
                ),
            )
            .with_category(NotificationCategory::Bills)
            .with_action(format!("/transactions/{}", transaction.id))
            .for_transaction(transaction.id);
            self.create(notification).await?;
            created += 1;
        }

        Ok(created)
    }
}

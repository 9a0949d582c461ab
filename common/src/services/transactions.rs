use super::budgets::BudgetService;
use super::notifications::NotificationService;
use crate::config::StorageConfig;
use crate::dates::{self, Period};
use crate::db::repositories::{
    CategoryRepository, TransactionFilter, TransactionRepository, TransactionTotals,
};
use crate::db::DbPool;
use crate::errors::{DatabaseError, ServiceError, ValidationError};
use crate::models::{
    CategoryType, CreateTransaction, Transaction, TransactionWithCategory, UpdateTransaction,
};
use crate::telemetry;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Rows fetched for a named period
pub const PERIOD_LIMIT: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransactionSummary {
    pub total_income: f64,
    pub total_expense: f64,
    pub net_balance: f64,
}

impl From<TransactionTotals> for TransactionSummary {
    fn from(totals: TransactionTotals) -> Self {
        Self {
            total_income: totals.income,
            total_expense: totals.expense,
            net_balance: totals.income - totals.expense,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionList {
    pub transactions: Vec<TransactionWithCategory>,
    pub summary: TransactionSummary,
}

/// One titled block of the grouped transaction listing
#[derive(Debug, Clone, Serialize)]
pub struct TransactionSection {
    pub title: String,
    pub data: Vec<TransactionWithCategory>,
}

/// Split newest-first transactions into date sections ordered Today,
/// Yesterday, Earlier This Week, This Month, then months
pub fn group_by_date(
    transactions: Vec<TransactionWithCategory>,
    today: NaiveDate,
) -> Vec<TransactionSection> {
    let mut sections: Vec<TransactionSection> = Vec::new();
    for transaction in transactions {
        let title = dates::transaction_section(
            transaction.transaction.transaction_date.date_naive(),
            today,
        );
        match sections.iter_mut().find(|s| s.title == title) {
            Some(section) => section.data.push(transaction),
            None => sections.push(TransactionSection {
                title,
                data: vec![transaction],
            }),
        }
    }
    sections.sort_by_key(|s| dates::section_rank(&s.title));
    sections
}

/// Category/type compatibility message shared by create and update
fn type_mismatch(category_type: CategoryType, transaction_type: CategoryType) -> ServiceError {
    ServiceError::bad_request(format!(
        "Cannot use {} category for {} transaction",
        category_type, transaction_type
    ))
}

fn validate_amount(amount: f64) -> Result<(), ValidationError> {
    if amount <= 0.0 {
        return Err(ValidationError::invalid("amount", "Amount must be positive"));
    }
    Ok(())
}

/// Relative receipt URL and its location under `upload_dir`
pub fn receipt_location(
    upload_dir: &str,
    user_id: Uuid,
    original_name: Option<&str>,
) -> (String, PathBuf) {
    let extension = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default();
    let file_name = format!("{}{}", Uuid::new_v4(), extension);

    let url = format!("/receipts/{}/{}", user_id, file_name);
    let path = Path::new(upload_dir)
        .join("receipts")
        .join(user_id.to_string())
        .join(file_name);
    (url, path)
}

#[derive(Clone)]
pub struct TransactionService {
    transactions: TransactionRepository,
    categories: CategoryRepository,
    budgets: BudgetService,
    notifications: NotificationService,
}

impl TransactionService {
    pub fn new(pool: DbPool) -> Self {
        Self {
            transactions: TransactionRepository::new(pool.clone()),
            categories: CategoryRepository::new(pool.clone()),
            budgets: BudgetService::new(pool.clone()),
            notifications: NotificationService::new(pool),
        }
    }

    async fn check_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        transaction_type: CategoryType,
    ) -> Result<(), ServiceError> {
        let category = self
            .categories
            .find_by_id(user_id, category_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Category not found"))?;
        if category.category_type != transaction_type {
            return Err(type_mismatch(category.category_type, transaction_type));
        }
        Ok(())
    }

    pub async fn get(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<TransactionWithCategory, ServiceError> {
        self.transactions
            .find_by_id(user_id, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Transaction not found"))
    }

    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        user_id: Uuid,
        request: CreateTransaction,
    ) -> Result<TransactionWithCategory, ServiceError> {
        validate_amount(request.amount)?;
        if let Some(category_id) = request.category_id {
            self.check_category(user_id, category_id, request.transaction_type)
                .await?;
        }

        let now = Utc::now();
        let transaction = Transaction {
            id: Uuid::new_v4(),
            user_id,
            category_id: request.category_id,
            amount: request.amount,
            transaction_type: request.transaction_type,
            description: request.description,
            transaction_date: request.transaction_date,
            payment_method: request.payment_method,
            is_recurring: request.is_recurring,
            note: request.note,
            receipt_photo_url: None,
            created_at: now,
            updated_at: now,
        };
        self.transactions.create(&transaction).await?;
        telemetry::record_transaction_created(transaction.transaction_type.as_str());

        self.after_create(&transaction).await;
        self.get(user_id, transaction.id).await
    }

    /// Notifications raised by a new transaction; failures are logged only
    async fn after_create(&self, transaction: &Transaction) {
        if let Err(e) = self.notifications.notify_large_transaction(transaction).await {
            warn!(transaction_id = %transaction.id, error = %e, "Large transaction notification failed");
        }

        if transaction.transaction_type == CategoryType::Expense {
            if let Some(category_id) = transaction.category_id {
                if let Err(e) = self
                    .budgets
                    .check_alerts(transaction.user_id, category_id)
                    .await
                {
                    warn!(transaction_id = %transaction.id, error = %e, "Budget alert check failed");
                }
            }
        }
    }

    #[instrument(skip(self, changes))]
    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: UpdateTransaction,
    ) -> Result<TransactionWithCategory, ServiceError> {
        let mut transaction = self.get(user_id, id).await?.transaction;

        if let Some(amount) = changes.amount {
            validate_amount(amount)?;
            transaction.amount = amount;
        }
        let retyped = changes.transaction_type.is_some() || changes.category_id.is_some();
        if let Some(transaction_type) = changes.transaction_type {
            transaction.transaction_type = transaction_type;
        }
        if changes.category_id.is_some() {
            transaction.category_id = changes.category_id;
        }
        if retyped {
            if let Some(category_id) = transaction.category_id {
                self.check_category(user_id, category_id, transaction.transaction_type)
                    .await?;
            }
        }

        if changes.description.is_some() {
            transaction.description = changes.description;
        }
        if let Some(transaction_date) = changes.transaction_date {
            transaction.transaction_date = transaction_date;
        }
        if changes.payment_method.is_some() {
            transaction.payment_method = changes.payment_method;
        }
        if let Some(is_recurring) = changes.is_recurring {
            transaction.is_recurring = is_recurring;
        }
        if changes.note.is_some() {
            transaction.note = changes.note;
        }

        self.transactions.update(&transaction).await?;
        self.get(user_id, id).await
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        match self.transactions.delete(user_id, id).await {
            Err(DatabaseError::NotFound(_)) => Err(ServiceError::not_found("Transaction not found")),
            other => Ok(other?),
        }
    }

    /// Filtered page plus totals over all of the user's transactions
    #[instrument(skip(self, filter))]
    pub async fn list(
        &self,
        user_id: Uuid,
        filter: &TransactionFilter,
    ) -> Result<TransactionList, ServiceError> {
        let summary = self.transactions.totals(user_id).await?.into();
        let transactions = self.transactions.list(user_id, filter).await?;
        Ok(TransactionList {
            transactions,
            summary,
        })
    }

    pub async fn list_period(
        &self,
        user_id: Uuid,
        period: Period,
        date: Option<NaiveDate>,
    ) -> Result<TransactionList, ServiceError> {
        let date = date.unwrap_or_else(|| Utc::now().date_naive());
        let mut filter = TransactionFilter {
            limit: PERIOD_LIMIT,
            ..TransactionFilter::default()
        };
        match period.bounds(date) {
            Some((start, end)) => filter = filter.with_days(Some(start), Some(end))?,
            None if period != Period::All => {
                return Err(ValidationError::invalid("date", "Date is out of range").into());
            }
            None => {}
        }
        self.list(user_id, &filter).await
    }

    pub async fn grouped(
        &self,
        user_id: Uuid,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<TransactionSection>, ServiceError> {
        let filter = TransactionFilter {
            skip,
            limit,
            ..TransactionFilter::default()
        };
        let transactions = self.transactions.list(user_id, &filter).await?;
        Ok(group_by_date(transactions, Utc::now().date_naive()))
    }

    /// Store a receipt image and link it to the transaction; returns its URL
    #[instrument(skip(self, contents, storage))]
    pub async fn upload_receipt(
        &self,
        user_id: Uuid,
        id: Uuid,
        original_name: Option<&str>,
        contents: &[u8],
        storage: &StorageConfig,
    ) -> Result<String, ServiceError> {
        if contents.len() > storage.max_upload_size {
            return Err(ServiceError::PayloadTooLarge(format!(
                "File exceeds the maximum upload size of {} bytes",
                storage.max_upload_size
            )));
        }
        let mut transaction = self.get(user_id, id).await?.transaction;

        let (url, path) = receipt_location(&storage.upload_dir, user_id, original_name);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| ServiceError::Internal(format!("Could not store receipt: {}", e)))?;
        }
        tokio::fs::write(&path, contents)
            .await
            .map_err(|e| ServiceError::Internal(format!("Could not store receipt: {}", e)))?;

        transaction.receipt_photo_url = Some(url.clone());
        self.transactions.update(&transaction).await?;

        info!(transaction_id = %id, path = %path.display(), "Receipt stored");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone};

    fn dated(at: DateTime<Utc>) -> TransactionWithCategory {
        TransactionWithCategory {
            transaction: Transaction {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                category_id: None,
                amount: 10.0,
                transaction_type: CategoryType::Expense,
                description: None,
                transaction_date: at,
                payment_method: None,
                is_recurring: false,
                note: None,
                receipt_photo_url: None,
                created_at: at,
                updated_at: at,
            },
            category_name: None,
            category_icon: None,
            category_color: None,
        }
    }

    #[test]
    fn test_sections_are_ordered_by_rank() {
        let now = Utc.with_ymd_and_hms(2024, 3, 28, 12, 0, 0).unwrap();
        let transactions = vec![
            dated(now),
            dated(now - Duration::days(1)),
            dated(now - Duration::days(4)),
            dated(now - Duration::days(15)),
            dated(now - Duration::days(40)),
        ];

        let sections = group_by_date(transactions, now.date_naive());
        let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Today", "Yesterday", "Earlier This Week", "This Month", "February 2024"]
        );
    }

    #[test]
    fn test_sections_collect_same_day_rows() {
        let now = Utc.with_ymd_and_hms(2024, 3, 28, 12, 0, 0).unwrap();
        let sections = group_by_date(
            vec![dated(now), dated(now - Duration::hours(3))],
            now.date_naive(),
        );
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].data.len(), 2);
    }

    #[test]
    fn test_summary_net_balance() {
        let summary: TransactionSummary = TransactionTotals {
            income: 1500.0,
            expense: 400.0,
            count: 3,
        }
        .into();
        assert_eq!(summary.net_balance, 1100.0);
    }

    #[test]
    fn test_type_mismatch_message() {
        assert_eq!(
            type_mismatch(CategoryType::Income, CategoryType::Expense).to_string(),
            "Cannot use income category for expense transaction"
        );
    }

    #[test]
    fn test_receipt_location_keeps_extension() {
        let user_id = Uuid::new_v4();
        let (url, path) = receipt_location("uploads", user_id, Some("scan.final.JPG"));

        assert!(url.starts_with(&format!("/receipts/{}/", user_id)));
        assert!(url.ends_with(".JPG"));
        assert!(path.starts_with(Path::new("uploads").join("receipts")));

        let (url, _) = receipt_location("uploads", user_id, None);
        assert!(!url.contains('.'));
    }
}

// Budget arithmetic: pro-rated spend, usage figures, overview totals and
// quick-setup allocation

use crate::models::{Budget, BudgetWithCategory};
use crate::money::round_to;
use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

/// Suggested share of a monthly budget per category name, in percent
pub const DEFAULT_ALLOCATIONS: &[(&str, f64)] = &[
    ("Housing", 30.0),
    ("Food", 15.0),
    ("Transport", 15.0),
    ("Shopping", 10.0),
    ("Entertainment", 10.0),
    ("Health Care", 8.0),
    ("Bills", 7.0),
    ("Travel", 3.0),
    ("Subscription", 2.0),
];

/// Inclusive day count of `[start, end]`
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// Overlap of two inclusive date ranges
pub fn intersection(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> Option<(NaiveDate, NaiveDate)> {
    let start = a_start.max(b_start);
    let end = a_end.min(b_end);
    (start <= end).then_some((start, end))
}

/// Scale spend observed over `window_days` by the window's share of the budget's days
pub fn prorate(spent_in_window: f64, window_days: i64, budget_days: i64) -> f64 {
    if budget_days <= 0 {
        return 0.0;
    }
    spent_in_window * (window_days as f64 / budget_days as f64)
}

/// Spend, remaining and capped usage for a budget amount
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Usage {
    pub spent_amount: f64,
    pub remaining_amount: f64,
    pub usage_percentage: f64,
}

impl Usage {
    /// Rounded figures; usage capped at 100 and 0 when `amount` is 0
    pub fn compute(amount: f64, spent: f64) -> Self {
        let remaining = (amount - spent).max(0.0);
        let usage = if amount > 0.0 {
            (spent / amount * 100.0).min(100.0)
        } else {
            0.0
        };
        Self {
            spent_amount: round_to(spent, 2),
            remaining_amount: round_to(remaining, 2),
            usage_percentage: round_to(usage, 1),
        }
    }
}

/// Budget with its category and spend figures, as returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct BudgetStatus {
    #[serde(flatten)]
    pub budget: Budget,
    #[serde(flatten)]
    pub usage: Usage,
    pub category_name: String,
    pub category_icon: Option<String>,
    pub category_color: Option<String>,
}

impl BudgetStatus {
    pub fn new(row: BudgetWithCategory, spent: f64) -> Self {
        let usage = Usage::compute(row.budget.amount, spent);
        Self {
            budget: row.budget,
            usage,
            category_name: row.category_name,
            category_icon: row.category_icon,
            category_color: row.category_color,
        }
    }

    pub fn is_over_budget(&self) -> bool {
        self.usage.spent_amount > self.budget.amount
    }
}

/// Totals across the budgets of a period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetSummary {
    pub total_budget: f64,
    pub total_spent: f64,
    pub total_remaining: f64,
    pub overall_usage_percentage: f64,
    pub categories_count: usize,
    pub over_budget_count: usize,
}

impl BudgetSummary {
    pub fn from_statuses(statuses: &[BudgetStatus]) -> Self {
        let total_budget: f64 = statuses.iter().map(|s| s.budget.amount).sum();
        let total_spent: f64 = statuses.iter().map(|s| s.usage.spent_amount).sum();
        let total_remaining: f64 = statuses.iter().map(|s| s.usage.remaining_amount).sum();
        let overall = if total_budget > 0.0 {
            total_spent / total_budget * 100.0
        } else {
            0.0
        };

        Self {
            total_budget: round_to(total_budget, 2),
            total_spent: round_to(total_spent, 2),
            total_remaining: round_to(total_remaining, 2),
            overall_usage_percentage: round_to(overall, 1),
            categories_count: statuses.len(),
            over_budget_count: statuses.iter().filter(|s| s.is_over_budget()).count(),
        }
    }
}

/// Monthly budget overview
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyBudgetOverview {
    pub period: String,
    pub total_budget: f64,
    pub spent: f64,
    pub remaining: f64,
    pub usage_percentage: f64,
    pub budgets_by_category: Vec<BudgetStatus>,
    pub summary: BudgetSummary,
}

impl MonthlyBudgetOverview {
    pub fn new(period: String, budgets_by_category: Vec<BudgetStatus>) -> Self {
        let summary = BudgetSummary::from_statuses(&budgets_by_category);
        Self {
            period,
            total_budget: summary.total_budget,
            spent: summary.total_spent,
            remaining: summary.total_remaining,
            usage_percentage: summary.overall_usage_percentage,
            budgets_by_category,
            summary,
        }
    }
}

/// Split a monthly total across expense categories
///
/// With `auto_distribute`, categories named in [`DEFAULT_ALLOCATIONS`] get their
/// share and the rest split what is left evenly. Without it every category
/// gets an even share. Amounts are rounded to cents.
pub fn allocate(total: f64, categories: &[(Uuid, String)], auto_distribute: bool) -> Vec<(Uuid, f64)> {
    if categories.is_empty() {
        return Vec::new();
    }

    if !auto_distribute {
        let share = total / categories.len() as f64;
        return categories
            .iter()
            .map(|(id, _)| (*id, round_to(share, 2)))
            .collect();
    }

    let mut allocations = Vec::with_capacity(categories.len());
    let mut remaining_percentage = 100.0;
    let mut unmatched = Vec::new();

    for (id, name) in categories {
        match DEFAULT_ALLOCATIONS.iter().find(|(n, _)| n == name) {
            Some((_, percentage)) => {
                remaining_percentage -= percentage;
                allocations.push((*id, round_to(total * percentage / 100.0, 2)));
            }
            None => unmatched.push(*id),
        }
    }

    if !unmatched.is_empty() && remaining_percentage > 0.0 {
        let share = total * remaining_percentage / 100.0 / unmatched.len() as f64;
        allocations.extend(unmatched.into_iter().map(|id| (id, round_to(share, 2))));
    }

    allocations
}

/// Alert raised after an expense lands in a budgeted category
#[derive(Debug, Clone, PartialEq)]
pub enum BudgetAlert {
    Exceeded { over_by: f64 },
    Approaching { usage_percentage: f64 },
}

impl BudgetAlert {
    /// Uncapped usage at or past 100 % exceeds, at or past 80 % approaches
    pub fn evaluate(amount: f64, spent: f64) -> Option<Self> {
        if amount <= 0.0 {
            return None;
        }
        let usage = spent / amount * 100.0;
        if usage >= 100.0 {
            Some(BudgetAlert::Exceeded {
                over_by: spent - amount,
            })
        } else if usage >= 80.0 {
            Some(BudgetAlert::Approaching {
                usage_percentage: usage,
            })
        } else {
            None
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            BudgetAlert::Exceeded { .. } => "Budget Exceeded",
            BudgetAlert::Approaching { .. } => "Budget Alert",
        }
    }

    pub fn message(&self, category_name: &str) -> String {
        match self {
            BudgetAlert::Exceeded { over_by } => format!(
                "You've exceeded your {} budget by ${:.2}",
                category_name, over_by
            ),
            BudgetAlert::Approaching { usage_percentage } => format!(
                "You've used {:.0}% of your {} budget",
                usage_percentage, category_name
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BudgetPeriod;
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(amount: f64, start: NaiveDate, end: NaiveDate) -> BudgetWithCategory {
        let now = Utc::now();
        BudgetWithCategory {
            budget: Budget {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                category_id: Uuid::new_v4(),
                amount,
                period: BudgetPeriod::Monthly,
                start_date: start,
                end_date: end,
                is_active: true,
                created_at: now,
                updated_at: now,
            },
            category_name: "Food".to_string(),
            category_icon: Some("restaurant".to_string()),
            category_color: None,
        }
    }

    #[test]
    fn test_intersection() {
        assert_eq!(
            intersection(date(2024, 1, 15), date(2024, 2, 14), date(2024, 2, 1), date(2024, 2, 29)),
            Some((date(2024, 2, 1), date(2024, 2, 14)))
        );
        assert_eq!(
            intersection(date(2024, 1, 1), date(2024, 1, 31), date(2024, 2, 1), date(2024, 2, 29)),
            None
        );
    }

    #[test]
    fn test_prorate_by_window_share() {
        // 14 of 31 budget days fall in the month
        let spent = prorate(310.0, 14, 31);
        assert!((spent - 140.0).abs() < 1e-9);
        assert_eq!(prorate(100.0, 5, 0), 0.0);
    }

    #[test]
    fn test_usage_caps_and_rounds() {
        let usage = Usage::compute(200.0, 250.456);
        assert_eq!(usage.spent_amount, 250.46);
        assert_eq!(usage.remaining_amount, 0.0);
        assert_eq!(usage.usage_percentage, 100.0);

        let usage = Usage::compute(300.0, 100.0);
        assert_eq!(usage.remaining_amount, 200.0);
        assert_eq!(usage.usage_percentage, 33.3);

        assert_eq!(Usage::compute(0.0, 10.0).usage_percentage, 0.0);
    }

    #[test]
    fn test_summary_counts_uncapped_overspend() {
        let start = date(2024, 3, 1);
        let end = date(2024, 3, 31);
        let statuses = vec![
            BudgetStatus::new(row(100.0, start, end), 150.0),
            BudgetStatus::new(row(300.0, start, end), 100.0),
        ];
        let summary = BudgetSummary::from_statuses(&statuses);

        assert_eq!(summary.total_budget, 400.0);
        assert_eq!(summary.total_spent, 250.0);
        assert_eq!(summary.total_remaining, 200.0);
        assert_eq!(summary.overall_usage_percentage, 62.5);
        assert_eq!(summary.categories_count, 2);
        assert_eq!(summary.over_budget_count, 1);
    }

    #[test]
    fn test_overview_mirrors_summary() {
        let overview = MonthlyBudgetOverview::new(
            "March 2024".to_string(),
            vec![BudgetStatus::new(row(100.0, date(2024, 3, 1), date(2024, 3, 31)), 40.0)],
        );
        assert_eq!(overview.period, "March 2024");
        assert_eq!(overview.spent, 40.0);
        assert_eq!(overview.remaining, 60.0);
        assert_eq!(overview.usage_percentage, 40.0);
    }

    #[test]
    fn test_allocate_known_and_unmatched_categories() {
        let housing = Uuid::new_v4();
        let food = Uuid::new_v4();
        let pets = Uuid::new_v4();
        let gym = Uuid::new_v4();
        let categories = vec![
            (housing, "Housing".to_string()),
            (food, "Food".to_string()),
            (pets, "Pets".to_string()),
            (gym, "Gym".to_string()),
        ];

        let allocations = allocate(1000.0, &categories, true);
        let lookup = |id| allocations.iter().find(|(i, _)| *i == id).map(|(_, a)| *a);

        assert_eq!(lookup(housing), Some(300.0));
        assert_eq!(lookup(food), Some(150.0));
        assert_eq!(lookup(pets), Some(275.0));
        assert_eq!(lookup(gym), Some(275.0));
    }

    #[test]
    fn test_allocate_without_auto_distribution_splits_evenly() {
        let categories = vec![
            (Uuid::new_v4(), "Housing".to_string()),
            (Uuid::new_v4(), "Food".to_string()),
        ];
        let allocations = allocate(500.0, &categories, false);
        assert!(allocations.iter().all(|(_, a)| *a == 250.0));
    }

    #[test]
    fn test_budget_alert_thresholds() {
        assert_eq!(BudgetAlert::evaluate(100.0, 50.0), None);

        let alert = BudgetAlert::evaluate(100.0, 85.0).unwrap();
        assert_eq!(alert.title(), "Budget Alert");
        assert_eq!(alert.message("Food"), "You've used 85% of your Food budget");

        let alert = BudgetAlert::evaluate(100.0, 112.5).unwrap();
        assert_eq!(alert.title(), "Budget Exceeded");
        assert_eq!(
            alert.message("Food"),
            "You've exceeded your Food budget by $12.50"
        );
    }
}

// Financial report model and the pure calculations behind it

use crate::db::repositories::{CategorySpending, DailyTotals};
use crate::money::round_to;
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeVsExpensesChart {
    pub period: String,
    pub data_points: Vec<ChartPoint>,
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_balance: f64,
}

/// Bucket size of the income vs expenses chart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartPeriod {
    Day,
    Week,
}

impl ChartPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartPeriod::Day => "day",
            ChartPeriod::Week => "week",
        }
    }
}

impl FromStr for ChartPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(ChartPeriod::Day),
            "week" => Ok(ChartPeriod::Week),
            _ => Err("Period must be 'day' or 'week'".to_string()),
        }
    }
}

impl IncomeVsExpensesChart {
    /// Fill `[start, end]` with one point per day or per 7-day bucket
    pub fn build(period: ChartPeriod, start: NaiveDate, end: NaiveDate, daily: &[DailyTotals]) -> Self {
        let by_day: HashMap<NaiveDate, (f64, f64)> = daily
            .iter()
            .map(|d| (d.day, (d.income, d.expenses)))
            .collect();
        let step = match period {
            ChartPeriod::Day => 1,
            ChartPeriod::Week => 7,
        };

        let mut data_points = Vec::new();
        let mut bucket_start = start;
        while bucket_start <= end {
            let bucket_end = (bucket_start + Duration::days(step - 1)).min(end);
            let (mut income, mut expenses) = (0.0, 0.0);
            let mut day = bucket_start;
            while day <= bucket_end {
                if let Some((i, e)) = by_day.get(&day) {
                    income += i;
                    expenses += e;
                }
                day += Duration::days(1);
            }
            data_points.push(ChartPoint {
                date: bucket_start,
                income,
                expenses,
                net: income - expenses,
            });
            bucket_start += Duration::days(step);
        }

        let total_income: f64 = data_points.iter().map(|p| p.income).sum();
        let total_expenses: f64 = data_points.iter().map(|p| p.expenses).sum();
        Self {
            period: period.as_str().to_string(),
            data_points,
            total_income,
            total_expenses,
            net_balance: total_income - total_expenses,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendingCategory {
    pub category_id: Uuid,
    pub category_name: String,
    pub category_icon: Option<String>,
    pub category_color: Option<String>,
    pub amount: f64,
    pub percentage: f64,
    pub transaction_count: i64,
}

/// Attach each category's share of total spend (1 decimal)
pub fn spending_categories(rows: Vec<CategorySpending>) -> Vec<SpendingCategory> {
    let total: f64 = rows.iter().map(|r| r.amount).sum();
    rows.into_iter()
        .map(|r| SpendingCategory {
            percentage: if total > 0.0 {
                round_to(r.amount / total * 100.0, 1)
            } else {
                0.0
            },
            category_id: r.category_id,
            category_name: r.category_name,
            category_icon: r.icon,
            category_color: r.color,
            amount: r.amount,
            transaction_count: r.transaction_count,
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeekPoint {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub total_expenses: f64,
    pub week_number: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyTrend {
    pub weeks: Vec<WeekPoint>,
    pub average_weekly_spending: f64,
    pub trend_percentage: f64,
}

/// Monday-based windows for the last `count` weeks, newest first, capped at `today`
pub fn week_windows(today: NaiveDate, count: u32) -> Vec<(u32, NaiveDate, NaiveDate)> {
    let weekday = today.weekday().num_days_from_monday() as i64;
    (0..count)
        .map(|i| {
            let start = today - Duration::days(weekday + 7 * i as i64);
            let end = (start + Duration::days(6)).min(today);
            (i + 1, start, end)
        })
        .collect()
}

impl WeeklyTrend {
    /// Sort oldest first; trend compares the last week against the one before
    pub fn from_weeks(mut weeks: Vec<WeekPoint>) -> Self {
        weeks.sort_by_key(|w| w.week_start);

        let average = if weeks.is_empty() {
            0.0
        } else {
            weeks.iter().map(|w| w.total_expenses).sum::<f64>() / weeks.len() as f64
        };

        let trend = match weeks.as_slice() {
            [.., prev, last] if prev.total_expenses > 0.0 => {
                (last.total_expenses - prev.total_expenses) / prev.total_expenses * 100.0
            }
            _ => 0.0,
        };

        Self {
            weeks,
            average_weekly_spending: round_to(average, 2),
            trend_percentage: round_to(trend, 1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Positive,
    Warning,
    Alert,
    Info,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightKind::Positive => "positive",
            InsightKind::Warning => "warning",
            InsightKind::Alert => "alert",
            InsightKind::Info => "info",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Insight {
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub icon: String,
    pub action_url: Option<String>,
}

/// Facts the insight rules look at
#[derive(Debug, Clone, Default)]
pub struct InsightInputs {
    pub savings: f64,
    /// Food category and its spend over the last 30 days
    pub food_spending: Option<(Uuid, f64)>,
    /// Month-to-date budget usage in percent
    pub month_budget_percentage: f64,
}

pub const HIGH_FOOD_SPENDING: f64 = 500.0;
pub const BUDGET_ALERT_PERCENTAGE: f64 = 80.0;

pub fn insights(inputs: &InsightInputs) -> Vec<Insight> {
    let mut insights = Vec::new();

    if inputs.savings > 0.0 {
        insights.push(Insight {
            title: "Improved Savings".to_string(),
            message: "Your savings rate has improved by 23.4% since last week.".to_string(),
            kind: InsightKind::Positive,
            icon: "trending-up".to_string(),
            action_url: Some("/profile/financial".to_string()),
        });
    }

    if let Some((category_id, spent)) = inputs.food_spending {
        if spent > HIGH_FOOD_SPENDING {
            insights.push(Insight {
                title: "High Food Expenses".to_string(),
                message: "Food expenses are 15% higher than your average.".to_string(),
                kind: InsightKind::Warning,
                icon: "restaurant".to_string(),
                action_url: Some(format!("/categories/{}", category_id)),
            });
        }
    }

    if inputs.month_budget_percentage > BUDGET_ALERT_PERCENTAGE {
        insights.push(Insight {
            title: "Budget Alert".to_string(),
            message: format!(
                "Used {:.0}% of your monthly budget. Consider reducing expenses.",
                inputs.month_budget_percentage
            ),
            kind: InsightKind::Alert,
            icon: "warning".to_string(),
            action_url: Some("/budgets/current-month".to_string()),
        });
    }

    insights
}

/// Budget figures over a report period (no pro-rating)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetTotals {
    pub total: f64,
    pub used: f64,
    pub percentage: f64,
    pub remaining: f64,
}

impl BudgetTotals {
    pub fn new(total: f64, used: f64) -> Self {
        let percentage = if total > 0.0 { used / total * 100.0 } else { 0.0 };
        Self {
            total,
            used,
            percentage: round_to(percentage, 1),
            remaining: (total - used).max(0.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LargestExpense {
    pub amount: f64,
    pub description: String,
    pub category: String,
}

impl Default for LargestExpense {
    fn default() -> Self {
        Self {
            amount: 0.0,
            description: "No expenses".to_string(),
            category: "None".to_string(),
        }
    }
}

/// Everything a report page or export shows for one period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialReportSummary {
    pub period_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub income: f64,
    pub expenses: f64,
    pub net_balance: f64,
    pub savings: f64,
    pub savings_rate: f64,
    pub budget_total: f64,
    pub budget_used: f64,
    pub budget_percentage: f64,
    pub budget_remaining: f64,
    pub income_vs_expenses_chart: IncomeVsExpensesChart,
    pub spending_categories: Vec<SpendingCategory>,
    pub weekly_trend: WeeklyTrend,
    pub insights: Vec<Insight>,
    pub transaction_count: i64,
    pub average_transaction_amount: f64,
    pub largest_expense: LargestExpense,
    pub most_spending_category: String,
}

/// Net over income in percent, 0 without income
pub fn savings_rate(income: f64, expenses: f64) -> f64 {
    if income > 0.0 {
        round_to((income - expenses) / income * 100.0, 2)
    } else {
        0.0
    }
}

/// How a week's spending compares with its income
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpendingStatus {
    Overspending,
    SavingWell,
    OnTrack,
}

impl SpendingStatus {
    pub fn classify(income: f64, expense: f64) -> Self {
        if expense > income {
            SpendingStatus::Overspending
        } else if income > expense * 1.5 {
            SpendingStatus::SavingWell
        } else {
            SpendingStatus::OnTrack
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpendingStatus::Overspending => "overspending",
            SpendingStatus::SavingWell => "saving well",
            SpendingStatus::OnTrack => "on track",
        }
    }
}

/// Message body of the weekly spending summary notification
pub fn weekly_summary_message(count: i64, income: f64, expense: f64) -> String {
    format!(
        "This week: {} transactions, ${:.2} spent. You're {}.",
        count,
        expense,
        SpendingStatus::classify(income, expense).as_str()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_daily_chart_fills_missing_days() {
        let daily = vec![DailyTotals {
            day: date(2024, 5, 2),
            income: 100.0,
            expenses: 40.0,
        }];
        let chart =
            IncomeVsExpensesChart::build(ChartPeriod::Day, date(2024, 5, 1), date(2024, 5, 3), &daily);

        assert_eq!(chart.data_points.len(), 3);
        assert_eq!(chart.data_points[0].income, 0.0);
        assert_eq!(chart.data_points[1].net, 60.0);
        assert_eq!(chart.total_income, 100.0);
        assert_eq!(chart.net_balance, 60.0);
        assert_eq!(chart.period, "day");
    }

    #[test]
    fn test_weekly_chart_buckets_by_seven_days() {
        let daily = vec![
            DailyTotals { day: date(2024, 5, 1), income: 0.0, expenses: 10.0 },
            DailyTotals { day: date(2024, 5, 7), income: 0.0, expenses: 5.0 },
            DailyTotals { day: date(2024, 5, 8), income: 20.0, expenses: 0.0 },
        ];
        let chart =
            IncomeVsExpensesChart::build(ChartPeriod::Week, date(2024, 5, 1), date(2024, 5, 10), &daily);

        assert_eq!(chart.data_points.len(), 2);
        assert_eq!(chart.data_points[0].expenses, 15.0);
        assert_eq!(chart.data_points[1].date, date(2024, 5, 8));
        assert_eq!(chart.data_points[1].income, 20.0);
    }

    #[test]
    fn test_spending_category_percentages() {
        let rows = vec![
            CategorySpending {
                category_id: Uuid::new_v4(),
                category_name: "Food".to_string(),
                icon: None,
                color: None,
                amount: 200.0,
                transaction_count: 4,
            },
            CategorySpending {
                category_id: Uuid::new_v4(),
                category_name: "Transport".to_string(),
                icon: None,
                color: None,
                amount: 100.0,
                transaction_count: 2,
            },
        ];
        let categories = spending_categories(rows);
        assert_eq!(categories[0].percentage, 66.7);
        assert_eq!(categories[1].percentage, 33.3);
    }

    #[test]
    fn test_week_windows_cap_current_week_at_today() {
        // Wednesday
        let today = date(2024, 5, 15);
        let windows = week_windows(today, 2);
        assert_eq!(windows[0], (1, date(2024, 5, 13), date(2024, 5, 15)));
        assert_eq!(windows[1], (2, date(2024, 5, 6), date(2024, 5, 12)));
    }

    #[test]
    fn test_weekly_trend_compares_last_two_weeks() {
        let weeks = vec![
            WeekPoint { week_start: date(2024, 5, 13), week_end: date(2024, 5, 15), total_expenses: 150.0, week_number: 1 },
            WeekPoint { week_start: date(2024, 5, 6), week_end: date(2024, 5, 12), total_expenses: 100.0, week_number: 2 },
        ];
        let trend = WeeklyTrend::from_weeks(weeks);

        assert_eq!(trend.weeks[0].week_start, date(2024, 5, 6));
        assert_eq!(trend.average_weekly_spending, 125.0);
        assert_eq!(trend.trend_percentage, 50.0);
    }

    #[test]
    fn test_weekly_trend_without_previous_spend_is_flat() {
        let weeks = vec![
            WeekPoint { week_start: date(2024, 5, 6), week_end: date(2024, 5, 12), total_expenses: 0.0, week_number: 2 },
            WeekPoint { week_start: date(2024, 5, 13), week_end: date(2024, 5, 15), total_expenses: 80.0, week_number: 1 },
        ];
        assert_eq!(WeeklyTrend::from_weeks(weeks).trend_percentage, 0.0);
        assert_eq!(WeeklyTrend::from_weeks(Vec::new()).average_weekly_spending, 0.0);
    }

    #[test]
    fn test_insight_rules() {
        assert!(insights(&InsightInputs::default()).is_empty());

        let food = Uuid::new_v4();
        let all = insights(&InsightInputs {
            savings: 10.0,
            food_spending: Some((food, 600.0)),
            month_budget_percentage: 85.4,
        });
        let titles: Vec<_> = all.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Improved Savings", "High Food Expenses", "Budget Alert"]);
        assert_eq!(all[1].action_url, Some(format!("/categories/{}", food)));
        assert_eq!(
            all[2].message,
            "Used 85% of your monthly budget. Consider reducing expenses."
        );
    }

    #[test]
    fn test_insight_serializes_kind_as_type() {
        let json = serde_json::to_value(&insights(&InsightInputs {
            savings: 1.0,
            ..Default::default()
        })[0])
        .unwrap();
        assert_eq!(json["type"], "positive");
    }

    #[test]
    fn test_budget_totals() {
        let totals = BudgetTotals::new(1000.0, 1250.0);
        assert_eq!(totals.percentage, 125.0);
        assert_eq!(totals.remaining, 0.0);
        assert_eq!(BudgetTotals::new(0.0, 10.0).percentage, 0.0);
    }

    #[test]
    fn test_savings_rate() {
        assert_eq!(savings_rate(3000.0, 2000.0), 33.33);
        assert_eq!(savings_rate(0.0, 100.0), 0.0);
    }

    #[test]
    fn test_weekly_summary_status() {
        assert_eq!(SpendingStatus::classify(100.0, 150.0), SpendingStatus::Overspending);
        assert_eq!(SpendingStatus::classify(200.0, 100.0), SpendingStatus::SavingWell);
        assert_eq!(SpendingStatus::classify(120.0, 100.0), SpendingStatus::OnTrack);
        assert_eq!(SpendingStatus::classify(0.0, 0.0), SpendingStatus::OnTrack);
        assert_eq!(
            weekly_summary_message(3, 0.0, 42.5),
            "This week: 3 transactions, $42.50 spent. You're overspending."
        );
    }
}

// Report renderers: CSV, XLSX and PDF

mod delimited;
mod pdf;
mod spreadsheet;

pub use delimited::CsvRenderer;
pub use pdf::{PdfRenderer, ReportDocument};
pub use spreadsheet::ExcelRenderer;

use crate::config::StorageConfig;
use crate::errors::ExportError;
use crate::models::ExportFormat;
use crate::report::FinancialReportSummary;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

fn default_true() -> bool {
    true
}

/// Sections to include in an exported report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    #[serde(default = "default_true")]
    pub include_charts: bool,
    #[serde(default = "default_true")]
    pub include_transaction_details: bool,
    #[serde(default = "default_true")]
    pub include_categories_summary: bool,
    #[serde(default = "default_true")]
    pub include_budget_analysis: bool,
    #[serde(default = "default_true")]
    pub include_insights: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_charts: true,
            include_transaction_details: true,
            include_categories_summary: true,
            include_budget_analysis: true,
            include_insights: true,
        }
    }
}

/// Writes a financial report to a file in one format
pub trait ReportRenderer: Send + Sync {
    fn format(&self) -> ExportFormat;

    fn render(
        &self,
        report: &FinancialReportSummary,
        options: &ExportOptions,
        path: &Path,
    ) -> Result<(), ExportError>;
}

pub fn renderer_for(format: ExportFormat, storage: &StorageConfig) -> Box<dyn ReportRenderer> {
    match format {
        ExportFormat::Csv => Box::new(CsvRenderer),
        ExportFormat::Excel => Box::new(ExcelRenderer),
        ExportFormat::Pdf => Box::new(PdfRenderer::from_config(storage)),
    }
}

/// Render `report` into `dir` as `financial_report_{id}.{ext}`
pub fn render_to_dir(
    renderer: &dyn ReportRenderer,
    report: &FinancialReportSummary,
    options: &ExportOptions,
    dir: &Path,
    export_id: Uuid,
) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir)?;
    let format = renderer.format();
    let path = dir.join(format!(
        "financial_report_{}.{}",
        export_id,
        renderer.format().extension()
    ));
    renderer.render(report, options, &path)?;

    tracing::info!(
        export_id = %export_id,
        format = %format,
        path = %path.display(),
        "Report rendered"
    );
    Ok(path)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::report::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    pub fn sample_report() -> FinancialReportSummary {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
        FinancialReportSummary {
            period_name: "May 2024".to_string(),
            start_date: start,
            end_date: end,
            income: 5000.0,
            expenses: 3200.5,
            net_balance: 1799.5,
            savings: 1200.0,
            savings_rate: 35.99,
            budget_total: 4000.0,
            budget_used: 3200.5,
            budget_percentage: 80.0,
            budget_remaining: 799.5,
            income_vs_expenses_chart: IncomeVsExpensesChart {
                period: "day".to_string(),
                data_points: vec![ChartPoint {
                    date: start,
                    income: 5000.0,
                    expenses: 3200.5,
                    net: 1799.5,
                }],
                total_income: 5000.0,
                total_expenses: 3200.5,
                net_balance: 1799.5,
            },
            spending_categories: vec![SpendingCategory {
                category_id: Uuid::new_v4(),
                category_name: "Housing".to_string(),
                category_icon: Some("home".to_string()),
                category_color: Some("#f44336".to_string()),
                amount: 1500.0,
                percentage: 46.9,
                transaction_count: 1,
            }],
            weekly_trend: WeeklyTrend {
                weeks: vec![WeekPoint {
                    week_start: NaiveDate::from_ymd_opt(2024, 5, 27).unwrap(),
                    week_end: end,
                    total_expenses: 420.0,
                    week_number: 1,
                }],
                average_weekly_spending: 420.0,
                trend_percentage: 0.0,
            },
            insights: vec![Insight {
                title: "Budget Alert".to_string(),
                message: "Used 80% of your monthly budget.".to_string(),
                kind: InsightKind::Alert,
                icon: "warning".to_string(),
                action_url: None,
            }],
            transaction_count: 12,
            average_transaction_amount: 683.38,
            largest_expense: LargestExpense {
                amount: 1500.0,
                description: "Rent".to_string(),
                category: "Housing".to_string(),
            },
            most_spending_category: "Housing".to_string(),
        }
    }
}

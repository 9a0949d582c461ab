use super::{ExportOptions, ReportRenderer};
use crate::errors::ExportError;
use crate::models::ExportFormat;
use crate::report::FinancialReportSummary;
use chrono::Utc;
use std::path::Path;

/// Sectioned CSV report; rows have varying widths
pub struct CsvRenderer;

impl ReportRenderer for CsvRenderer {
    fn format(&self) -> ExportFormat {
        ExportFormat::Csv
    }

    fn render(
        &self,
        report: &FinancialReportSummary,
        options: &ExportOptions,
        path: &Path,
    ) -> Result<(), ExportError> {
        let mut writer = csv::WriterBuilder::new().flexible(true).from_path(path)?;
        let blank: [&str; 1] = [""];

        writer.write_record([format!("Financial Report - {}", report.period_name)])?;
        writer.write_record([format!(
            "Generated on {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S")
        )])?;
        writer.write_record(blank)?;

        writer.write_record(["FINANCIAL SUMMARY"])?;
        writer.write_record(["Metric", "Amount"])?;
        for (metric, value) in [
            ("Income", report.income),
            ("Expenses", report.expenses),
            ("Net Balance", report.net_balance),
            ("Savings", report.savings),
        ] {
            writer.write_record([metric.to_string(), format!("{:.2}", value)])?;
        }
        writer.write_record([
            "Savings Rate (%)".to_string(),
            format!("{:.1}", report.savings_rate),
        ])?;
        writer.write_record(blank)?;

        if options.include_budget_analysis {
            writer.write_record(["BUDGET ANALYSIS"])?;
            writer.write_record(["Metric", "Amount"])?;
            for (metric, value) in [
                ("Total Budget", report.budget_total),
                ("Used", report.budget_used),
                ("Remaining", report.budget_remaining),
            ] {
                writer.write_record([metric.to_string(), format!("{:.2}", value)])?;
            }
            writer.write_record([
                "Usage (%)".to_string(),
                format!("{:.1}", report.budget_percentage),
            ])?;
            writer.write_record(blank)?;
        }

        if options.include_categories_summary && !report.spending_categories.is_empty() {
            writer.write_record(["SPENDING BY CATEGORIES"])?;
            writer.write_record(["Category", "Amount", "Percentage", "Transactions"])?;
            for category in &report.spending_categories {
                writer.write_record([
                    category.category_name.clone(),
                    format!("{:.2}", category.amount),
                    format!("{:.1}", category.percentage),
                    category.transaction_count.to_string(),
                ])?;
            }
            writer.write_record(blank)?;
        }

        if options.include_charts {
            writer.write_record(["INCOME VS EXPENSES DATA"])?;
            writer.write_record(["Date", "Income", "Expenses", "Net"])?;
            for point in &report.income_vs_expenses_chart.data_points {
                writer.write_record([
                    point.date.format("%Y-%m-%d").to_string(),
                    format!("{:.2}", point.income),
                    format!("{:.2}", point.expenses),
                    format!("{:.2}", point.net),
                ])?;
            }
            writer.write_record(blank)?;
        }

        if !report.weekly_trend.weeks.is_empty() {
            writer.write_record(["WEEKLY TREND"])?;
            writer.write_record(["Week Start", "Week End", "Expenses"])?;
            for week in &report.weekly_trend.weeks {
                writer.write_record([
                    week.week_start.format("%Y-%m-%d").to_string(),
                    week.week_end.format("%Y-%m-%d").to_string(),
                    format!("{:.2}", week.total_expenses),
                ])?;
            }
            writer.write_record(blank)?;
        }

        if options.include_insights && !report.insights.is_empty() {
            writer.write_record(["FINANCIAL INSIGHTS"])?;
            writer.write_record(["Title", "Message", "Type"])?;
            for insight in &report.insights {
                writer.write_record([
                    insight.title.as_str(),
                    insight.message.as_str(),
                    insight.kind.as_str(),
                ])?;
            }
        }

        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::fixtures::sample_report;

    fn render(options: ExportOptions) -> String {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        CsvRenderer
            .render(&sample_report(), &options, &path)
            .unwrap();
        std::fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_csv_contains_every_section() {
        let text = render(ExportOptions::default());

        assert!(text.starts_with("Financial Report - May 2024"));
        for section in [
            "FINANCIAL SUMMARY",
            "BUDGET ANALYSIS",
            "SPENDING BY CATEGORIES",
            "INCOME VS EXPENSES DATA",
            "WEEKLY TREND",
            "FINANCIAL INSIGHTS",
        ] {
            assert!(text.contains(section), "missing section {}", section);
        }
        assert!(text.contains("Expenses,3200.50"));
        assert!(text.contains("Housing,1500.00,46.9,1"));
        assert!(text.contains("Budget Alert,Used 80% of your monthly budget.,alert"));
    }

    #[test]
    fn test_csv_honors_option_flags() {
        let text = render(ExportOptions {
            include_budget_analysis: false,
            include_insights: false,
            include_charts: false,
            ..ExportOptions::default()
        });

        assert!(text.contains("FINANCIAL SUMMARY"));
        assert!(!text.contains("BUDGET ANALYSIS"));
        assert!(!text.contains("FINANCIAL INSIGHTS"));
        assert!(!text.contains("INCOME VS EXPENSES DATA"));
        assert!(text.contains("WEEKLY TREND"));
    }
}

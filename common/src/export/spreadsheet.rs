use super::{ExportOptions, ReportRenderer};
use crate::errors::ExportError;
use crate::models::ExportFormat;
use crate::report::FinancialReportSummary;
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;

pub const SHEET_NAME: &str = "Financial Report";

/// Single-sheet XLSX report
pub struct ExcelRenderer;

impl ReportRenderer for ExcelRenderer {
    fn format(&self) -> ExportFormat {
        ExportFormat::Excel
    }

    fn render(
        &self,
        report: &FinancialReportSummary,
        options: &ExportOptions,
        path: &Path,
    ) -> Result<(), ExportError> {
        let title_format = Format::new().set_bold().set_font_size(16);
        let header_format = Format::new().set_bold().set_font_size(14);
        let bold = Format::new().set_bold();

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;
        sheet.set_column_width(0, 28)?;
        sheet.set_column_width(1, 16)?;

        let mut row: u32 = 0;
        sheet.write_string_with_format(
            row,
            0,
            format!("Financial Report - {}", report.period_name),
            &title_format,
        )?;
        row += 2;

        sheet.write_string_with_format(row, 0, "Financial Summary", &header_format)?;
        row += 1;
        for (metric, value) in [
            ("Income", report.income),
            ("Expenses", report.expenses),
            ("Net Balance", report.net_balance),
            ("Savings", report.savings),
            ("Savings Rate (%)", report.savings_rate),
        ] {
            sheet.write_string(row, 0, metric)?;
            sheet.write_number(row, 1, value)?;
            row += 1;
        }
        row += 2;

        if options.include_budget_analysis {
            sheet.write_string_with_format(row, 0, "Budget Analysis", &header_format)?;
            row += 1;
            for (metric, value) in [
                ("Total Budget", report.budget_total),
                ("Used", report.budget_used),
                ("Remaining", report.budget_remaining),
                ("Usage (%)", report.budget_percentage),
            ] {
                sheet.write_string(row, 0, metric)?;
                sheet.write_number(row, 1, value)?;
                row += 1;
            }
            row += 2;
        }

        if options.include_categories_summary && !report.spending_categories.is_empty() {
            sheet.write_string_with_format(row, 0, "Spending by Categories", &header_format)?;
            row += 1;
            for (col, header) in ["Category", "Amount", "Percentage", "Transactions"]
                .into_iter()
                .enumerate()
            {
                sheet.write_string_with_format(row, col as u16, header, &bold)?;
            }
            row += 1;
            for category in &report.spending_categories {
                sheet.write_string(row, 0, &category.category_name)?;
                sheet.write_number(row, 1, category.amount)?;
                sheet.write_number(row, 2, category.percentage)?;
                sheet.write_number(row, 3, category.transaction_count as f64)?;
                row += 1;
            }
            row += 2;
        }

        if options.include_insights && !report.insights.is_empty() {
            sheet.write_string_with_format(row, 0, "Financial Insights", &header_format)?;
            row += 1;
            for insight in &report.insights {
                sheet.write_string_with_format(row, 0, &insight.title, &bold)?;
                sheet.write_string(row, 1, &insight.message)?;
                row += 1;
            }
        }

        workbook.save(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::fixtures::sample_report;
    use calamine::{open_workbook, Reader, Xlsx};

    #[test]
    fn test_excel_sheet_has_summary_and_categories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xlsx");
        ExcelRenderer
            .render(&sample_report(), &ExportOptions::default(), &path)
            .unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let range = workbook.worksheet_range(SHEET_NAME).unwrap();
        let cells: Vec<String> = range
            .rows()
            .flat_map(|r| r.iter().map(|c| c.to_string()))
            .collect();

        assert_eq!(cells[0], "Financial Report - May 2024");
        assert!(cells.iter().any(|c| c == "Financial Summary"));
        assert!(cells.iter().any(|c| c == "Spending by Categories"));
        assert!(cells.iter().any(|c| c == "Housing"));
        assert!(cells.iter().any(|c| c == "Financial Insights"));
    }

    #[test]
    fn test_excel_skips_disabled_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xlsx");
        let options = ExportOptions {
            include_categories_summary: false,
            ..ExportOptions::default()
        };
        ExcelRenderer.render(&sample_report(), &options, &path).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let range = workbook.worksheet_range(SHEET_NAME).unwrap();
        assert!(!range
            .rows()
            .flat_map(|r| r.iter())
            .any(|c| c.to_string() == "Spending by Categories"));
    }
}

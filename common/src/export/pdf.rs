use super::{ExportOptions, ReportRenderer};
use crate::config::StorageConfig;
use crate::errors::ExportError;
use crate::models::ExportFormat;
use crate::money::with_thousands;
use crate::report::FinancialReportSummary;
use chrono::Utc;
use printpdf::{IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference, Pt};
use std::path::{Path, PathBuf};

// Letter, in points
const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 50.0;
const MAX_CATEGORIES: usize = 10;

fn mm(points: f32) -> Mm {
    Mm::from(Pt(points))
}

/// Text-only report laid out top to bottom on Letter pages, wrapping onto a
/// new page when the cursor reaches the bottom margin. Text is set in the
/// embedded TrueType faces so any script they cover is preserved.
pub struct ReportDocument {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    cursor: f32,
    pages: usize,
}

impl ReportDocument {
    pub fn new(title: &str, regular_font: &[u8], bold_font: &[u8]) -> Result<Self, ExportError> {
        let (doc, page, layer) =
            PdfDocument::new(title, mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Page 1");
        let regular = doc.add_external_font(regular_font)?;
        let bold = doc.add_external_font(bold_font)?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            cursor: PAGE_HEIGHT - MARGIN,
            pages: 1,
        })
    }

    pub fn title(&mut self, text: &str) -> &mut Self {
        self.text_at(MARGIN, text, true, 20.0);
        self.spacer(10.0)
    }

    pub fn heading(&mut self, text: &str) -> &mut Self {
        self.spacer(6.0);
        self.text_at(MARGIN, text, true, 14.0);
        self.spacer(4.0)
    }

    pub fn line(&mut self, text: &str) -> &mut Self {
        self.text_at(MARGIN, text, false, 11.0);
        self
    }

    /// One row of cells, each placed at its x offset from the left margin
    pub fn row(&mut self, cells: &[(f32, &str)], bold: bool) -> &mut Self {
        let size = 11.0;
        self.reserve(size * 1.4);
        for (offset, text) in cells {
            self.draw(MARGIN + offset, text, bold, size);
        }
        self.cursor -= size * 1.4;
        self
    }

    pub fn spacer(&mut self, height: f32) -> &mut Self {
        self.cursor -= height;
        self
    }

    pub fn page_count(&self) -> usize {
        self.pages
    }

    fn text_at(&mut self, x: f32, text: &str, bold: bool, size: f32) {
        self.reserve(size * 1.4);
        self.draw(x, text, bold, size);
        self.cursor -= size * 1.4;
    }

    fn reserve(&mut self, height: f32) {
        if self.cursor - height < MARGIN {
            self.break_page();
        }
    }

    fn break_page(&mut self) {
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            mm(PAGE_WIDTH),
            mm(PAGE_HEIGHT),
            format!("Page {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.cursor = PAGE_HEIGHT - MARGIN;
    }

    fn draw(&self, x: f32, text: &str, bold: bool, size: f32) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer
            .use_text(text, size, mm(x), mm(self.cursor - size), font);
    }

    /// Serialize into a complete PDF byte stream
    pub fn finish(self) -> Result<Vec<u8>, ExportError> {
        Ok(self.doc.save_to_bytes()?)
    }
}

fn money(value: f64) -> String {
    if value < 0.0 {
        format!("-${}", with_thousands(-value, 2))
    } else {
        format!("${}", with_thousands(value, 2))
    }
}

fn read_font(path: &Path) -> Result<Vec<u8>, ExportError> {
    std::fs::read(path)
        .map_err(|e| ExportError::Pdf(format!("cannot read font {}: {}", path.display(), e)))
}

/// Plain text financial report
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    regular_font: PathBuf,
    bold_font: PathBuf,
}

impl PdfRenderer {
    pub fn new(regular_font: impl Into<PathBuf>, bold_font: impl Into<PathBuf>) -> Self {
        Self {
            regular_font: regular_font.into(),
            bold_font: bold_font.into(),
        }
    }

    pub fn from_config(storage: &StorageConfig) -> Self {
        Self::new(&storage.pdf_font_path, &storage.pdf_bold_font_path)
    }

    pub fn document(
        &self,
        report: &FinancialReportSummary,
        options: &ExportOptions,
    ) -> Result<ReportDocument, ExportError> {
        let title = format!("Financial Report - {}", report.period_name);
        let regular = read_font(&self.regular_font)?;
        let bold = read_font(&self.bold_font)?;

        let mut doc = ReportDocument::new(&title, &regular, &bold)?;
        doc.title(&title);
        doc.line(&format!(
            "Period: {} to {}",
            report.start_date.format("%Y-%m-%d"),
            report.end_date.format("%Y-%m-%d")
        ));

        doc.heading("Financial Summary");
        for (label, value) in [
            ("Income", money(report.income)),
            ("Expenses", money(report.expenses)),
            ("Net Balance", money(report.net_balance)),
            ("Savings", money(report.savings)),
            ("Savings Rate", format!("{:.1}%", report.savings_rate)),
            ("Transactions", report.transaction_count.to_string()),
            ("Average Transaction", money(report.average_transaction_amount)),
        ] {
            doc.row(&[(0.0, label), (200.0, value.as_str())], false);
        }

        if options.include_budget_analysis {
            doc.heading("Budget Analysis");
            for (label, value) in [
                ("Total Budget", money(report.budget_total)),
                ("Used", money(report.budget_used)),
                ("Remaining", money(report.budget_remaining)),
                ("Usage", format!("{:.1}%", report.budget_percentage)),
            ] {
                doc.row(&[(0.0, label), (200.0, value.as_str())], false);
            }
        }

        if options.include_categories_summary && !report.spending_categories.is_empty() {
            doc.heading("Spending by Categories");
            doc.row(
                &[(0.0, "Category"), (200.0, "Amount"), (320.0, "Percentage")],
                true,
            );
            for category in report.spending_categories.iter().take(MAX_CATEGORIES) {
                let amount = money(category.amount);
                let share = format!("{:.1}%", category.percentage);
                doc.row(
                    &[
                        (0.0, category.category_name.as_str()),
                        (200.0, amount.as_str()),
                        (320.0, share.as_str()),
                    ],
                    false,
                );
            }
        }

        if options.include_insights && !report.insights.is_empty() {
            doc.heading("Financial Insights");
            for insight in &report.insights {
                doc.row(&[(0.0, insight.title.as_str())], true);
                doc.line(&insight.message);
            }
        }

        doc.spacer(20.0);
        doc.line(&format!(
            "Report generated on {}",
            Utc::now().format("%B %d, %Y at %I:%M %p")
        ));
        Ok(doc)
    }
}

impl ReportRenderer for PdfRenderer {
    fn format(&self) -> ExportFormat {
        ExportFormat::Pdf
    }

    fn render(
        &self,
        report: &FinancialReportSummary,
        options: &ExportOptions,
        path: &Path,
    ) -> Result<(), ExportError> {
        let bytes = self.document(report, options)?.finish()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::fixtures::sample_report;

    fn renderer() -> PdfRenderer {
        PdfRenderer::from_config(&StorageConfig::default())
    }

    fn extract(bytes: &[u8]) -> String {
        pdf_extract::extract_text_from_mem(bytes).unwrap()
    }

    fn rendered_text(report: &FinancialReportSummary) -> String {
        let bytes = renderer()
            .document(report, &ExportOptions::default())
            .unwrap()
            .finish()
            .unwrap();
        extract(&bytes)
    }

    #[test]
    fn test_pdf_report_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        renderer()
            .render(&sample_report(), &ExportOptions::default(), &path)
            .unwrap();

        let bytes = std::fs::read(path).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));

        let text = extract(&bytes);
        assert!(text.contains("Financial Report - May 2024"));
        assert!(text.contains("Financial Summary"));
        assert!(text.contains("Budget Analysis"));
        assert!(text.contains("Housing"));
        assert!(text.contains("$1,500.00"));
        assert!(text.contains("Financial Insights"));
        assert!(text.contains("Report generated on"));
    }

    #[test]
    fn test_cyrillic_category_names_survive() {
        let mut report = sample_report();
        report.spending_categories[0].category_name = "Еда и напитки".to_string();
        report.insights[0].message = "Потрачено 80% бюджета".to_string();

        let text = rendered_text(&report);
        assert!(text.contains("Еда и напитки"));
        assert!(text.contains("Потрачено 80% бюджета"));
        assert!(!text.contains("???"));
    }

    #[test]
    fn test_skipped_sections_are_absent() {
        let options = ExportOptions {
            include_budget_analysis: false,
            include_insights: false,
            ..ExportOptions::default()
        };
        let bytes = renderer()
            .document(&sample_report(), &options)
            .unwrap()
            .finish()
            .unwrap();

        let text = extract(&bytes);
        assert!(text.contains("Spending by Categories"));
        assert!(!text.contains("Budget Analysis"));
        assert!(!text.contains("Financial Insights"));
    }

    #[test]
    fn test_long_document_breaks_pages() {
        let fonts = StorageConfig::default();
        let regular = std::fs::read(&fonts.pdf_font_path).unwrap();
        let bold = std::fs::read(&fonts.pdf_bold_font_path).unwrap();

        let mut doc = ReportDocument::new("Long", &regular, &bold).unwrap();
        assert_eq!(doc.page_count(), 1);
        for i in 0..120 {
            doc.line(&format!("line {}", i));
        }
        assert!(doc.page_count() > 1);

        let text = extract(&doc.finish().unwrap());
        assert!(text.contains("line 0"));
        assert!(text.contains("line 119"));
    }

    #[test]
    fn test_pdf_caps_categories_at_ten() {
        let mut report = sample_report();
        let template = report.spending_categories[0].clone();
        report.spending_categories = (0..15)
            .map(|i| {
                let mut c = template.clone();
                c.category_name = format!("Category {:02}", i);
                c
            })
            .collect();

        let text = rendered_text(&report);
        assert!(text.contains("Category 09"));
        assert!(!text.contains("Category 10"));
    }

    #[test]
    fn test_missing_font_is_a_pdf_error() {
        let renderer = PdfRenderer::new("/nonexistent/Regular.ttf", "/nonexistent/Bold.ttf");
        let err = renderer
            .document(&sample_report(), &ExportOptions::default())
            .err()
            .unwrap();
        assert!(matches!(err, ExportError::Pdf(ref m) if m.contains("Regular.ttf")));
    }
}

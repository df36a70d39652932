//! Statistics aggregation and the plain-text extraction report.
//!
//! The report text is the exported artifact, so its layout is fixed:
//!
//! ```text
//! ============================================================
//! PDF TEXT EXTRACTION REPORT
//! ============================================================
//! Total Word Count: 4
//! ...
//! Hybrid Pages: 1
//! ============================================================
//!
//! PAGE 1 | Type: Hybrid | Confidence: 100.0%
//! ------------------------------------------------------------
//! Header
//! Body
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::models::page::{Page, PageType};

/// MIME type of the exported report.
pub const EXPORT_MIME: &str = "text/plain";

const RULE_WIDTH: usize = 60;

/// Totals over every page of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTotals {
    pub total_words: usize,
    pub total_chars_with_spaces: usize,
    pub total_chars_without_spaces: usize,
    pub total_pages: usize,
    pub editable_pages: usize,
    pub scanned_pages: usize,
    pub hybrid_pages: usize,
}

impl ReportTotals {
    fn add(&mut self, page: &Page) {
        let stats = page.stats();
        self.total_words += page.word_count;
        self.total_chars_with_spaces += stats.chars_with_spaces;
        self.total_chars_without_spaces += stats.chars_without_spaces;
        self.total_pages += 1;
        match page.page_type {
            PageType::Editable => self.editable_pages += 1,
            PageType::Scanned => self.scanned_pages += 1,
            PageType::Hybrid => self.hybrid_pages += 1,
        }
    }
}

/// A finished extraction report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionReport {
    totals: ReportTotals,
    rows: Vec<PageRow>,
    text: String,
}

/// One line of the page table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRow {
    pub page: u32,
    pub page_type: PageType,
    pub confidence: String,
    pub word_count: usize,
}

/// Fold pages, in order, into a report.
pub fn aggregate(pages: &[Page]) -> ExtractionReport {
    let mut totals = ReportTotals::default();
    let mut body = String::new();
    let mut rows = Vec::with_capacity(pages.len());

    for page in pages {
        totals.add(page);

        let confidence = page.confidence_label();
        body.push_str(&format!(
            "\nPAGE {} | Type: {} | Confidence: {}\n{}\n{}\n",
            page.number,
            page.page_type,
            confidence,
            "-".repeat(RULE_WIDTH),
            page.text
        ));

        rows.push(PageRow {
            page: page.number,
            page_type: page.page_type,
            confidence,
            word_count: page.word_count,
        });
    }

    let mut text = header(&totals);
    text.push_str(&body);

    ExtractionReport { totals, rows, text }
}

fn header(totals: &ReportTotals) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    format!(
        "{rule}\n\
         PDF TEXT EXTRACTION REPORT\n\
         {rule}\n\
         Total Word Count: {}\n\
         Total Character Count (with spaces): {}\n\
         Total Character Count (without spaces): {}\n\
         Total Pages Processed: {}\n\
         Editable Pages: {}\n\
         Scanned Pages: {}\n\
         Hybrid Pages: {}\n\
         {rule}\n",
        totals.total_words,
        totals.total_chars_with_spaces,
        totals.total_chars_without_spaces,
        totals.total_pages,
        totals.editable_pages,
        totals.scanned_pages,
        totals.hybrid_pages,
    )
}

impl ExtractionReport {
    /// Aggregated totals.
    pub fn totals(&self) -> &ReportTotals {
        &self.totals
    }

    /// Per-page summary rows.
    pub fn rows(&self) -> &[PageRow] {
        &self.rows
    }

    /// The exported report text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consume the report, keeping only its text.
    pub fn into_text(self) -> String {
        self.text
    }

    /// Fixed-width table of page, type, confidence and word count.
    pub fn page_table(&self) -> String {
        let mut table = format!("{:>6}  {:<8}  {:>10}  {:>10}\n", "Page", "Type", "Confidence", "Words");
        for row in &self.rows {
            table.push_str(&format!(
                "{:>6}  {:<8}  {:>10}  {:>10}\n",
                row.page,
                row.page_type.as_str(),
                row.confidence,
                row.word_count
            ));
        }
        table
    }
}

/// Default export file name: `<stem>_extracted.txt`.
pub fn export_file_name(source: &Path) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    format!("{}_extracted.txt", stem)
}

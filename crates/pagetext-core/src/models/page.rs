//! Per-page classification results.

use std::fmt;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// How a page's text was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageType {
    /// Enough embedded text; OCR never ran.
    Editable,
    /// No embedded text; text comes from OCR only.
    Scanned,
    /// Sparse embedded text followed by OCR text.
    Hybrid,
}

impl PageType {
    /// Label used in the report and page table.
    pub fn as_str(&self) -> &'static str {
        match self {
            PageType::Editable => "Editable",
            PageType::Scanned => "Scanned",
            PageType::Hybrid => "Hybrid",
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Word and character counts of a piece of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStats {
    /// Whitespace-delimited tokens.
    pub words: usize,
    /// Characters including all whitespace.
    pub chars_with_spaces: usize,
    /// Characters excluding `' '` and `'\n'` only. Tabs and other whitespace count.
    pub chars_without_spaces: usize,
}

impl TextStats {
    /// Count words and characters in `text`.
    pub fn of(text: &str) -> Self {
        Self {
            words: text.split_whitespace().count(),
            chars_with_spaces: text.chars().count(),
            chars_without_spaces: text.chars().filter(|c| *c != ' ' && *c != '\n').count(),
        }
    }
}

/// One classified page of a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed).
    pub number: u32,

    /// Classification of the page.
    pub page_type: PageType,

    /// Mean OCR confidence in [0, 1]; `None` when OCR did not run.
    pub confidence: Option<f64>,

    /// Text found in the page's content stream, empty if none or unreadable.
    pub embedded_text: String,

    /// Final merged text.
    pub text: String,

    /// Whitespace-delimited tokens in `text`.
    pub word_count: usize,

    /// OCR page render with detection outlines, for review only.
    #[serde(skip)]
    pub preview: Option<DynamicImage>,
}

impl Page {
    /// Confidence as shown in reports: `"85.0%"` or `"N/A"`.
    pub fn confidence_label(&self) -> String {
        match self.confidence {
            Some(confidence) => format!("{:.1}%", confidence * 100.0),
            None => "N/A".to_string(),
        }
    }

    /// Word and character counts of the merged text.
    pub fn stats(&self) -> TextStats {
        TextStats::of(&self.text)
    }
}

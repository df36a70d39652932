//! Core library for PDF page classification and text unification.
//!
//! This crate provides:
//! - Per-page embedded text extraction and rasterization
//! - Editable / scanned / hybrid page classification with OCR merging
//! - Aggregated word and character statistics with a fixed-format text report
//! - Annotated page previews showing OCR detections

pub mod annotate;
pub mod classify;
pub mod error;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;
pub mod report;

#[cfg(test)]
pub(crate) mod testing;

pub use annotate::annotate;
pub use classify::{classify_and_extract, PageClassifier};
pub use error::{PagetextError, Result};
pub use models::config::PagetextConfig;
pub use models::page::{Page, PageType, TextStats};
pub use ocr::{OcrDetection, OcrEngine, Point};
#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
pub use pdf::{PageSource, PdfDocument, PdftoppmRasterizer, Rasterizer};
pub use pipeline::{check_input_size, Extraction, Pipeline, Progress};
pub use report::{aggregate, export_file_name, ExtractionReport, EXPORT_MIME};

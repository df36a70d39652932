//! Document run driver: one page at a time, in order.

use std::ops::ControlFlow;

use image::DynamicImage;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::classify::{degraded_page, PageClassifier};
use crate::error::{PagetextError, Result};
use crate::models::config::{PageFailurePolicy, PipelineConfig};
use crate::models::page::Page;
use crate::ocr::OcrEngine;
use crate::pdf::{PageSource, PdfDocument, Rasterizer};
use crate::report::{aggregate, ExtractionReport};

/// Advisory progress emitted after each page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// Page just finished (1-indexed).
    pub page: u32,
    /// Pages in the document.
    pub total: u32,
    /// Human-readable status.
    pub message: String,
}

/// Everything one successful run produces.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    /// Every page of the document, in order.
    pub pages: Vec<Page>,
    /// Totals and report text.
    pub report: ExtractionReport,
}

impl Extraction {
    /// Annotated previews of OCR'd pages, with their page numbers.
    pub fn previews(&self) -> impl Iterator<Item = (u32, &DynamicImage)> {
        self.pages
            .iter()
            .filter_map(|page| page.preview.as_ref().map(|image| (page.number, image)))
    }
}

/// Reject inputs larger than `limit` bytes. A size equal to the limit passes.
pub fn check_input_size(size: u64, limit: u64) -> Result<()> {
    if size > limit {
        return Err(PagetextError::InputTooLarge { size, limit });
    }
    Ok(())
}

/// Runs page classification over whole documents.
///
/// The pipeline owns its OCR engine and rasterizer and keeps no state
/// between runs.
pub struct Pipeline<O, R> {
    config: PipelineConfig,
    ocr: O,
    rasterizer: R,
}

impl<O: OcrEngine, R: Rasterizer> Pipeline<O, R> {
    /// Create a pipeline from its collaborators.
    pub fn new(config: PipelineConfig, ocr: O, rasterizer: R) -> Self {
        Self {
            config,
            ocr,
            rasterizer,
        }
    }

    /// Pipeline settings.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The OCR engine in use.
    pub fn ocr(&self) -> &O {
        &self.ocr
    }

    /// Process PDF bytes without progress reporting.
    pub fn process(&self, data: &[u8]) -> Result<Extraction> {
        self.process_with_progress(data, |_| ControlFlow::Continue(()))
    }

    /// Process PDF bytes, reporting after each page.
    ///
    /// Returning `ControlFlow::Break` from `on_progress` cancels the run
    /// before the next page; no partial result is returned.
    pub fn process_with_progress<F>(&self, data: &[u8], on_progress: F) -> Result<Extraction>
    where
        F: FnMut(&Progress) -> ControlFlow<()>,
    {
        check_input_size(data.len() as u64, self.config.max_input_bytes)?;
        let document = PdfDocument::open(data)?;
        self.process_document(&document, on_progress)
    }

    /// Process an already opened document.
    pub fn process_document<D, F>(&self, document: &D, mut on_progress: F) -> Result<Extraction>
    where
        D: PageSource + ?Sized,
        F: FnMut(&Progress) -> ControlFlow<()>,
    {
        let total = document.page_count();
        info!("Processing {} pages at {} DPI", total, self.config.raster_dpi);

        let classifier = PageClassifier::from_config(&self.ocr, &self.rasterizer, &self.config);
        let mut pages = Vec::with_capacity(total as usize);

        for number in 1..=total {
            let page = match classifier.classify_and_extract(document, number) {
                Ok(page) => page,
                Err(source) => match self.config.page_failure {
                    PageFailurePolicy::Abort => {
                        return Err(PagetextError::Page {
                            page: number,
                            source,
                        });
                    }
                    PageFailurePolicy::Degrade => {
                        warn!("Page {} degraded to empty scanned page: {}", number, source);
                        degraded_page(number)
                    }
                },
            };
            pages.push(page);

            let progress = Progress {
                page: number,
                total,
                message: format!("Processed page {}/{}", number, total),
            };
            debug!("{}", progress.message);

            if on_progress(&progress).is_break() && number < total {
                info!("Run cancelled after page {}", number);
                return Err(PagetextError::Cancelled {
                    completed: number,
                    total,
                });
            }
        }

        let report = aggregate(&pages);
        let totals = report.totals();
        info!(
            "Extraction complete: {} pages ({} editable, {} scanned, {} hybrid), {} words",
            totals.total_pages,
            totals.editable_pages,
            totals.scanned_pages,
            totals.hybrid_pages,
            totals.total_words
        );

        Ok(Extraction { pages, report })
    }
}

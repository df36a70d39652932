//! Per-page classification and text merging.
//!
//! A page whose trimmed embedded text is shorter than the threshold is
//! rendered and passed through OCR. The page is Hybrid when it still had
//! some embedded text and Scanned when it had none; everything else is
//! Editable and never touches the rasterizer or the OCR engine.

use tracing::{debug, warn};

use crate::annotate::annotate;
use crate::error::PageFailure;
use crate::models::config::PipelineConfig;
use crate::models::page::{Page, PageType, TextStats};
use crate::ocr::{self, OcrDetection, OcrEngine};
use crate::pdf::{PageSource, Rasterizer};

/// Default render resolution for OCR.
pub const DEFAULT_RASTER_DPI: u32 = 200;

/// Default minimum trimmed embedded text length that skips OCR.
pub const DEFAULT_MIN_TEXT_CHARS: usize = 50;

/// Classifies pages, driving the rasterizer and OCR engine when needed.
pub struct PageClassifier<'a, O: ?Sized, R: ?Sized> {
    ocr: &'a O,
    rasterizer: &'a R,
    raster_dpi: u32,
    min_text_chars: usize,
    annotate_previews: bool,
}

impl<'a, O, R> PageClassifier<'a, O, R>
where
    O: OcrEngine + ?Sized,
    R: Rasterizer + ?Sized,
{
    /// Create a classifier with default settings.
    pub fn new(ocr: &'a O, rasterizer: &'a R) -> Self {
        Self {
            ocr,
            rasterizer,
            raster_dpi: DEFAULT_RASTER_DPI,
            min_text_chars: DEFAULT_MIN_TEXT_CHARS,
            annotate_previews: false,
        }
    }

    /// Create a classifier using pipeline settings.
    pub fn from_config(ocr: &'a O, rasterizer: &'a R, config: &PipelineConfig) -> Self {
        Self::new(ocr, rasterizer)
            .with_dpi(config.raster_dpi)
            .with_min_text_chars(config.min_text_chars)
            .with_previews(config.annotate_previews)
    }

    /// Set the render resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.raster_dpi = dpi;
        self
    }

    /// Set the OCR threshold.
    pub fn with_min_text_chars(mut self, min_text_chars: usize) -> Self {
        self.min_text_chars = min_text_chars;
        self
    }

    /// Attach annotated previews to OCR'd pages.
    pub fn with_previews(mut self, enabled: bool) -> Self {
        self.annotate_previews = enabled;
        self
    }

    /// Classify one page (1-indexed) and produce its merged text.
    ///
    /// Embedded text extraction failures are recovered as an empty string.
    /// Rasterization and OCR failures are returned to the caller.
    pub fn classify_and_extract<D: PageSource + ?Sized>(
        &self,
        document: &D,
        page: u32,
    ) -> Result<Page, PageFailure> {
        let embedded = match document.extract_page_text(page) {
            Ok(text) => text,
            Err(e) => {
                warn!("Text extraction failed on page {}, treating as empty: {}", page, e);
                String::new()
            }
        };

        if !needs_ocr(&embedded, self.min_text_chars) {
            debug!("Page {}: editable ({} chars embedded)", page, embedded.chars().count());
            return Ok(build_page(page, PageType::Editable, None, embedded.clone(), embedded, None));
        }

        let image = self
            .rasterizer
            .render_page(document.data(), page, self.raster_dpi)?;
        let detections = self.ocr.recognize(&image)?;

        let (page_type, text) = merge_text(&embedded, &detections);
        let confidence = ocr::mean_confidence(&detections);

        debug!(
            "Page {}: {} ({} detections, confidence {:.3})",
            page,
            page_type,
            detections.len(),
            confidence
        );

        let preview = self
            .annotate_previews
            .then(|| annotate(&image, &detections));

        Ok(build_page(page, page_type, Some(confidence), embedded, text, preview))
    }
}

/// Classify one page with default thresholds and no preview.
pub fn classify_and_extract<D, O, R>(
    document: &D,
    page: u32,
    ocr: &O,
    rasterizer: &R,
    raster_dpi: u32,
) -> Result<Page, PageFailure>
where
    D: PageSource + ?Sized,
    O: OcrEngine + ?Sized,
    R: Rasterizer + ?Sized,
{
    PageClassifier::new(ocr, rasterizer)
        .with_dpi(raster_dpi)
        .classify_and_extract(document, page)
}

/// Whether a page with this embedded text must go through OCR.
pub fn needs_ocr(embedded: &str, min_text_chars: usize) -> bool {
    embedded.trim().chars().count() < min_text_chars
}

/// Merge embedded text with OCR detections for a page that needed OCR.
///
/// Whitespace-only embedded text counts as none.
pub fn merge_text(embedded: &str, detections: &[OcrDetection]) -> (PageType, String) {
    let ocr_text = ocr::joined_text(detections);
    if embedded.trim().is_empty() {
        (PageType::Scanned, ocr_text)
    } else {
        (PageType::Hybrid, format!("{}\n{}", embedded, ocr_text))
    }
}

/// Empty Scanned page recorded when rasterization or OCR failed and the run keeps going.
///
/// Nothing from the failed page is kept, embedded text included.
pub fn degraded_page(page: u32) -> Page {
    build_page(page, PageType::Scanned, Some(0.0), String::new(), String::new(), None)
}

fn build_page(
    number: u32,
    page_type: PageType,
    confidence: Option<f64>,
    embedded_text: String,
    text: String,
    preview: Option<image::DynamicImage>,
) -> Page {
    let word_count = TextStats::of(&text).words;
    Page {
        number,
        page_type,
        confidence,
        embedded_text,
        text,
        word_count,
        preview,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{detection, BlankRasterizer, FailingOcr, FailingRasterizer, FixedPages, ScriptedOcr};
    use pretty_assertions::assert_eq;

    const LONG_TEXT: &str = "This page carries a full paragraph of embedded text, well past the threshold.";

    #[test]
    fn test_editable_page_skips_ocr() {
        let doc = FixedPages::new(&[LONG_TEXT]);
        let ocr = ScriptedOcr::repeating(vec![detection("ignored", 0.5)]);
        let raster = BlankRasterizer::new();

        let page = classify_and_extract(&doc, 1, &ocr, &raster, 200).unwrap();

        assert_eq!(page.page_type, PageType::Editable);
        assert_eq!(page.confidence, None);
        assert_eq!(page.confidence_label(), "N/A");
        assert_eq!(page.text, LONG_TEXT);
        assert_eq!(page.word_count, 13);
        assert_eq!(raster.calls.get(), 0);
        assert_eq!(ocr.calls.get(), 0);
        assert!(page.preview.is_none());
    }

    #[test]
    fn test_scanned_page_joins_detections() {
        let doc = FixedPages::new(&[""]);
        let ocr = ScriptedOcr::repeating(vec![detection("Scan", 0.9), detection("ned", 0.8)]);
        let raster = BlankRasterizer::new();

        let page = classify_and_extract(&doc, 1, &ocr, &raster, 200).unwrap();

        assert_eq!(page.page_type, PageType::Scanned);
        assert_eq!(page.text, "Scan ned");
        assert_eq!(page.confidence_label(), "85.0%");
        assert_eq!(page.word_count, 2);
    }

    #[test]
    fn test_hybrid_page_puts_embedded_text_first() {
        let doc = FixedPages::new(&["Header"]);
        let ocr = ScriptedOcr::repeating(vec![detection("Body", 1.0)]);
        let raster = BlankRasterizer::new();

        let page = classify_and_extract(&doc, 1, &ocr, &raster, 200).unwrap();

        assert_eq!(page.page_type, PageType::Hybrid);
        assert_eq!(page.text, "Header\nBody");
        assert_eq!(page.confidence, Some(1.0));
        assert_eq!(page.word_count, 2);
    }

    #[test]
    fn test_short_embedded_text_goes_through_ocr() {
        let doc = FixedPages::new(&["Hello world"]);
        let ocr = ScriptedOcr::empty();
        let raster = BlankRasterizer::new();

        let page = classify_and_extract(&doc, 1, &ocr, &raster, 200).unwrap();

        assert_eq!(page.page_type, PageType::Hybrid);
        assert_eq!(page.text, "Hello world\n");
        assert_eq!(page.word_count, 2);
        assert_eq!(page.confidence_label(), "0.0%");
    }

    #[test]
    fn test_empty_detections_on_scanned_page() {
        let doc = FixedPages::new(&[""]);
        let ocr = ScriptedOcr::empty();
        let raster = BlankRasterizer::new();

        let page = classify_and_extract(&doc, 1, &ocr, &raster, 200).unwrap();

        assert_eq!(page.page_type, PageType::Scanned);
        assert_eq!(page.text, "");
        assert_eq!(page.confidence, Some(0.0));
        assert_eq!(page.confidence_label(), "0.0%");
        assert_eq!(page.word_count, 0);
    }

    #[test]
    fn test_whitespace_only_embedded_text_is_scanned() {
        let doc = FixedPages::new(&["  \n "]);
        let ocr = ScriptedOcr::repeating(vec![detection("words", 0.6)]);
        let raster = BlankRasterizer::new();

        let page = classify_and_extract(&doc, 1, &ocr, &raster, 200).unwrap();

        assert_eq!(page.page_type, PageType::Scanned);
        assert_eq!(page.text, "words");
    }

    #[test]
    fn test_extraction_failure_is_recovered() {
        let doc = FixedPages::with_failures(vec![None]);
        let ocr = ScriptedOcr::repeating(vec![detection("recovered", 0.5)]);
        let raster = BlankRasterizer::new();

        let page = classify_and_extract(&doc, 1, &ocr, &raster, 200).unwrap();

        assert_eq!(page.page_type, PageType::Scanned);
        assert_eq!(page.embedded_text, "");
        assert_eq!(page.text, "recovered");
    }

    #[test]
    fn test_threshold_boundary() {
        let fifty = "x".repeat(50);
        let forty_nine = format!("  {}  ", "x".repeat(49));
        assert!(!needs_ocr(&fifty, 50));
        assert!(needs_ocr(&forty_nine, 50));

        let doc = FixedPages::new(&[fifty.as_str(), forty_nine.as_str()]);
        let ocr = ScriptedOcr::empty();
        let raster = BlankRasterizer::new();
        let classifier = PageClassifier::new(&ocr, &raster);

        assert_eq!(classifier.classify_and_extract(&doc, 1).unwrap().page_type, PageType::Editable);
        let hybrid = classifier.classify_and_extract(&doc, 2).unwrap();
        assert_eq!(hybrid.page_type, PageType::Hybrid);
        assert!(hybrid.text.starts_with(&format!("{}\n", forty_nine)));
    }

    #[test]
    fn test_dpi_and_page_reach_rasterizer() {
        let doc = FixedPages::new(&[LONG_TEXT, ""]);
        let ocr = ScriptedOcr::empty();
        let raster = BlankRasterizer::new();

        classify_and_extract(&doc, 2, &ocr, &raster, 300).unwrap();

        assert_eq!(raster.calls.get(), 1);
        assert_eq!(raster.last_dpi.get(), 300);
        assert_eq!(raster.last_page.get(), 2);
    }

    #[test]
    fn test_raster_failure_is_returned() {
        let doc = FixedPages::new(&[""]);
        let ocr = ScriptedOcr::empty();

        let result = classify_and_extract(&doc, 1, &ocr, &FailingRasterizer, 200);

        assert!(matches!(result, Err(PageFailure::Raster(_))));
    }

    #[test]
    fn test_ocr_failure_is_returned() {
        let doc = FixedPages::new(&["tiny"]);
        let raster = BlankRasterizer::new();

        let result = classify_and_extract(&doc, 1, &FailingOcr, &raster, 200);

        assert!(matches!(result, Err(PageFailure::Ocr(_))));
    }

    #[test]
    fn test_previews_only_for_ocr_pages() {
        let doc = FixedPages::new(&[LONG_TEXT, ""]);
        let ocr = ScriptedOcr::repeating(vec![detection("x", 0.5)]);
        let raster = BlankRasterizer::new();
        let classifier = PageClassifier::new(&ocr, &raster).with_previews(true);

        assert!(classifier.classify_and_extract(&doc, 1).unwrap().preview.is_none());
        let preview = classifier.classify_and_extract(&doc, 2).unwrap().preview.unwrap();
        assert_eq!((preview.width(), preview.height()), (40, 30));
    }

    #[test]
    fn test_degraded_page_is_empty_scanned() {
        let page = degraded_page(4);
        assert_eq!(page.number, 4);
        assert_eq!(page.page_type, PageType::Scanned);
        assert_eq!(page.text, "");
        assert_eq!(page.embedded_text, "");
        assert_eq!(page.word_count, 0);
        assert_eq!(page.confidence_label(), "0.0%");
        assert!(page.preview.is_none());
    }
}

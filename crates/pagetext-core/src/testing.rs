//! Deterministic collaborators for unit tests.

use std::cell::Cell;
use std::ops::RangeInclusive;

use image::{DynamicImage, RgbImage};

use crate::error::{OcrError, PdfError, RasterError};
use crate::ocr::{OcrDetection, OcrEngine, Point};
use crate::pdf::{self, PageSource, Rasterizer};

/// A document whose pages have fixed embedded text, or fail extraction.
pub struct FixedPages {
    pages: Vec<Option<String>>,
}

impl FixedPages {
    pub fn new(pages: &[&str]) -> Self {
        Self {
            pages: pages.iter().map(|p| Some(p.to_string())).collect(),
        }
    }

    /// Pages where `None` fails text extraction.
    pub fn with_failures(pages: Vec<Option<&str>>) -> Self {
        Self {
            pages: pages.into_iter().map(|p| p.map(str::to_string)).collect(),
        }
    }
}

impl PageSource for FixedPages {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn extract_page_text(&self, page: u32) -> pdf::Result<String> {
        match page.checked_sub(1).and_then(|i| self.pages.get(i as usize)) {
            Some(Some(text)) => Ok(text.clone()),
            Some(None) => Err(PdfError::TextExtraction("broken content stream".to_string())),
            None => Err(PdfError::InvalidPage(page)),
        }
    }

    fn data(&self) -> &[u8] {
        b"%PDF-1.5 fixed"
    }
}

/// Returns a white page and records what it was asked for.
pub struct BlankRasterizer {
    pub calls: Cell<usize>,
    pub last_dpi: Cell<u32>,
    pub last_page: Cell<u32>,
}

impl BlankRasterizer {
    pub fn new() -> Self {
        Self {
            calls: Cell::new(0),
            last_dpi: Cell::new(0),
            last_page: Cell::new(0),
        }
    }
}

impl Rasterizer for BlankRasterizer {
    fn render(
        &self,
        _pdf: &[u8],
        pages: RangeInclusive<u32>,
        dpi: u32,
    ) -> Result<Vec<DynamicImage>, RasterError> {
        self.calls.set(self.calls.get() + 1);
        self.last_dpi.set(dpi);
        self.last_page.set(*pages.start());
        Ok(pages
            .map(|_| DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 30, image::Rgb([255, 255, 255]))))
            .collect())
    }
}

/// Always fails to render.
pub struct FailingRasterizer;

impl Rasterizer for FailingRasterizer {
    fn render(
        &self,
        _pdf: &[u8],
        pages: RangeInclusive<u32>,
        _dpi: u32,
    ) -> Result<Vec<DynamicImage>, RasterError> {
        Err(RasterError::NoOutput {
            first: *pages.start(),
            last: *pages.end(),
        })
    }
}

/// Replays canned detections, cycling through them call by call.
pub struct ScriptedOcr {
    responses: Vec<Vec<OcrDetection>>,
    pub calls: Cell<usize>,
}

impl ScriptedOcr {
    pub fn new(responses: Vec<Vec<OcrDetection>>) -> Self {
        Self {
            responses,
            calls: Cell::new(0),
        }
    }

    /// Same detections on every call.
    pub fn repeating(detections: Vec<OcrDetection>) -> Self {
        Self::new(vec![detections])
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl OcrEngine for ScriptedOcr {
    fn recognize(&self, _image: &DynamicImage) -> Result<Vec<OcrDetection>, OcrError> {
        let call = self.calls.get();
        self.calls.set(call + 1);
        if self.responses.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.responses[call % self.responses.len()].clone())
    }
}

/// Always fails to recognize.
pub struct FailingOcr;

impl OcrEngine for FailingOcr {
    fn recognize(&self, _image: &DynamicImage) -> Result<Vec<OcrDetection>, OcrError> {
        Err(OcrError::Recognition("engine unavailable".to_string()))
    }
}

/// A detection with a small square box at (x, y).
pub fn detection(text: &str, confidence: f32) -> OcrDetection {
    boxed_detection(text, confidence, 2.0, 2.0)
}

pub fn boxed_detection(text: &str, confidence: f32, x: f32, y: f32) -> OcrDetection {
    OcrDetection::new(
        vec![
            Point::new(x, y),
            Point::new(x + 10.0, y),
            Point::new(x + 10.0, y + 8.0),
            Point::new(x, y + 8.0),
        ],
        text,
        confidence,
    )
}

//! PDF processing module.

mod extractor;
mod raster;

pub use extractor::PdfDocument;
pub use raster::PdftoppmRasterizer;

use std::ops::RangeInclusive;

use crate::error::{PdfError, RasterError};
use image::DynamicImage;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Page-level access to an opened PDF.
pub trait PageSource {
    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract embedded text from a specific page (1-indexed).
    fn extract_page_text(&self, page: u32) -> Result<String>;

    /// The bytes handed to the rasterizer for this document.
    fn data(&self) -> &[u8];
}

/// Renders PDF pages to raster images.
pub trait Rasterizer {
    /// Render an inclusive range of pages (1-indexed) at the given DPI.
    fn render(
        &self,
        pdf: &[u8],
        pages: RangeInclusive<u32>,
        dpi: u32,
    ) -> std::result::Result<Vec<DynamicImage>, RasterError>;

    /// Render a single page.
    fn render_page(
        &self,
        pdf: &[u8],
        page: u32,
        dpi: u32,
    ) -> std::result::Result<DynamicImage, RasterError> {
        self.render(pdf, page..=page, dpi)?
            .into_iter()
            .next()
            .ok_or(RasterError::NoOutput {
                first: page,
                last: page,
            })
    }
}

impl<R: Rasterizer + ?Sized> Rasterizer for &R {
    fn render(
        &self,
        pdf: &[u8],
        pages: RangeInclusive<u32>,
        dpi: u32,
    ) -> std::result::Result<Vec<DynamicImage>, RasterError> {
        (**self).render(pdf, pages, dpi)
    }
}

impl<R: Rasterizer + ?Sized> Rasterizer for Box<R> {
    fn render(
        &self,
        pdf: &[u8],
        pages: RangeInclusive<u32>,
        dpi: u32,
    ) -> std::result::Result<Vec<DynamicImage>, RasterError> {
        (**self).render(pdf, pages, dpi)
    }
}

//! Per-page embedded text extraction using lopdf.

use lopdf::Document;
use tracing::{debug, trace};

use super::{PageSource, Result};
use crate::error::PdfError;

/// A parsed PDF held for the duration of one run.
pub struct PdfDocument {
    document: Document,
    raw_data: Vec<u8>,
    page_count: u32,
}

impl PdfDocument {
    /// Parse a PDF from bytes.
    ///
    /// Documents encrypted with an empty user password are decrypted and
    /// re-serialized so the rasterizer sees the plain document.
    pub fn open(data: &[u8]) -> Result<Self> {
        let mut document = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        let raw_data = if document.is_encrypted() {
            if document.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            document
                .save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        let page_count = document.get_pages().len() as u32;
        debug!("Loaded PDF with {} pages", page_count);

        Ok(Self {
            document,
            raw_data,
            page_count,
        })
    }
}

impl PageSource for PdfDocument {
    fn page_count(&self) -> u32 {
        self.page_count
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        if page == 0 || page > self.page_count {
            return Err(PdfError::InvalidPage(page));
        }

        let text = self
            .document
            .extract_text(&[page])
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;

        trace!("Page {} embedded text: {} chars", page, text.chars().count());
        Ok(text)
    }

    fn data(&self) -> &[u8] {
        &self.raw_data
    }
}

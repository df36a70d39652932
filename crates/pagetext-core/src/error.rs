//! Error types for the pagetext-core library.

use thiserror::Error;

/// Main error type for the pagetext library.
///
/// Every variant is fatal to a document run. Recoverable embedded-text
/// failures never reach this type; the classifier replaces them with an
/// empty string.
#[derive(Error, Debug)]
pub enum PagetextError {
    /// The document could not be opened or parsed.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Rasterization or OCR failed for one page.
    #[error("page {page}: {source}")]
    Page {
        page: u32,
        #[source]
        source: PageFailure,
    },

    /// The input exceeds the configured size limit and was never processed.
    #[error("input is {size} bytes, exceeding the limit of {limit} bytes")]
    InputTooLarge { size: u64, limit: u64 },

    /// The caller cancelled the run between pages.
    #[error("cancelled after {completed} of {total} pages")]
    Cancelled { completed: u32, total: u32 },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Why a single page could not be processed.
#[derive(Error, Debug)]
pub enum PageFailure {
    #[error("rasterization failed: {0}")]
    Raster(#[from] RasterError),

    #[error("OCR failed: {0}")]
    Ocr(#[from] OcrError),
}

/// Errors related to PDF parsing and text extraction.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from a page.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to rendering PDF pages to raster images.
#[derive(Error, Debug)]
pub enum RasterError {
    /// The external renderer could not be started.
    #[error("failed to run {program}: {reason}")]
    Spawn { program: String, reason: String },

    /// The renderer ran but reported a failure.
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    /// The renderer produced no image for the requested pages.
    #[error("no image rendered for pages {first}-{last}")]
    NoOutput { first: u32, last: u32 },

    /// A rendered image could not be decoded.
    #[error("failed to decode rendered image: {0}")]
    Decode(#[from] image::ImageError),

    /// I/O error while staging renderer input or output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Result type for the pagetext library.
pub type Result<T> = std::result::Result<T, PagetextError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_error_names_page() {
        let err = PagetextError::Page {
            page: 3,
            source: PageFailure::Ocr(OcrError::Recognition("model crashed".to_string())),
        };
        assert_eq!(err.to_string(), "page 3: OCR failed: text recognition failed: model crashed");
    }

    #[test]
    fn test_input_too_large_message() {
        let err = PagetextError::InputTooLarge { size: 200, limit: 100 };
        assert_eq!(
            err.to_string(),
            "input is 200 bytes, exceeding the limit of 100 bytes"
        );
    }
}

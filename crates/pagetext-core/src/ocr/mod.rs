//! OCR capability and the detections it produces.

#[cfg(feature = "native")]
mod pure_engine;

#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// Languages the engine is configured for unless the configuration says otherwise.
pub const DEFAULT_LANGUAGES: [&str; 15] = [
    "en", "ch_sim", "ja", "ko", "hi", "bn", "th", "fr", "de", "es", "ru", "ar", "pt", "it", "nl",
];

/// A point in raster image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One recognized text fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrDetection {
    /// Bounding polygon, in drawing order.
    pub polygon: Vec<Point>,

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl OcrDetection {
    pub fn new(polygon: Vec<Point>, text: impl Into<String>, confidence: f32) -> Self {
        Self {
            polygon,
            text: text.into(),
            confidence,
        }
    }
}

/// A text recognizer for raster images.
///
/// Detections are returned in the engine's own reading order; callers do not
/// re-sort them.
pub trait OcrEngine {
    /// Recognize all text fragments in an image.
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<OcrDetection>, OcrError>;

    /// Language codes this engine was configured for.
    fn languages(&self) -> &[String] {
        &[]
    }
}

impl<E: OcrEngine + ?Sized> OcrEngine for &E {
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<OcrDetection>, OcrError> {
        (**self).recognize(image)
    }

    fn languages(&self) -> &[String] {
        (**self).languages()
    }
}

impl<E: OcrEngine + ?Sized> OcrEngine for Box<E> {
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<OcrDetection>, OcrError> {
        (**self).recognize(image)
    }

    fn languages(&self) -> &[String] {
        (**self).languages()
    }
}

/// Join detected texts with single spaces, keeping the engine's order.
pub fn joined_text(detections: &[OcrDetection]) -> String {
    detections
        .iter()
        .map(|d| d.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Mean detection confidence; 0.0 when there are no detections.
pub fn mean_confidence(detections: &[OcrDetection]) -> f64 {
    if detections.is_empty() {
        return 0.0;
    }
    let sum: f64 = detections.iter().map(|d| f64::from(d.confidence)).sum();
    sum / detections.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(text: &str, confidence: f32) -> OcrDetection {
        OcrDetection::new(vec![Point::new(0.0, 0.0)], text, confidence)
    }

    #[test]
    fn test_joined_text_keeps_order() {
        let detections = vec![detection("second", 0.5), detection("first", 0.5)];
        assert_eq!(joined_text(&detections), "second first");
        assert_eq!(joined_text(&[]), "");
    }

    #[test]
    fn test_mean_confidence() {
        let detections = vec![detection("Scan", 0.9), detection("ned", 0.8)];
        let mean = mean_confidence(&detections);
        assert!((mean - 0.85).abs() < 1e-6);
        assert_eq!(mean_confidence(&[]), 0.0);
    }

    #[test]
    fn test_default_languages() {
        assert_eq!(DEFAULT_LANGUAGES.len(), 15);
        assert_eq!(DEFAULT_LANGUAGES[0], "en");
    }
}

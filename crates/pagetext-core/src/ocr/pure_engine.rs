//! Pure Rust OCR engine wrapper using `pure-onnx-ocr`.

use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::{OcrConfig, PagetextConfig};

use super::{OcrDetection, OcrEngine, Point};

/// OCR engine backed by `pure-onnx-ocr` (pure Rust, CPU only).
pub struct PureOcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
    config: OcrConfig,
}

impl PureOcrEngine {
    /// Create an engine from the model files and OCR settings in `config`.
    pub fn from_config(config: &PagetextConfig) -> Result<Self, OcrError> {
        let models = &config.models;
        let det_path = config.model_path(&models.detection_model);
        let rec_path = config.model_path(&models.recognition_model);
        let dict_path = config.model_path(&models.dictionary);

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!(
                    "model file not found: {}",
                    path.display()
                )));
            }
        }

        let config = config.ocr.clone();
        if config.use_gpu {
            debug!("GPU requested but pure-onnx-ocr runs on CPU only");
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!(
            "Loaded pure-onnx-ocr engine from {} (languages: {})",
            models.model_dir.display(),
            config.languages.join(", ")
        );

        Ok(Self { engine, config })
    }
}

impl OcrEngine for PureOcrEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<OcrDetection>, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();

        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImage(format!("{}x{}", width, height)));
        }

        debug!("Recognizing image: {}x{}", width, height);

        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        let detections: Vec<OcrDetection> = results
            .iter()
            .map(|r| {
                let text = if self.config.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                };
                OcrDetection {
                    polygon: polygon_points(&r.bounding_box),
                    text,
                    confidence: r.confidence.clamp(0.0, 1.0),
                }
            })
            .collect();

        debug!(
            "OCR complete: {} detections in {}ms",
            detections.len(),
            start.elapsed().as_millis()
        );

        Ok(detections)
    }

    fn languages(&self) -> &[String] {
        &self.config.languages
    }
}

/// Convert a `Polygon<f64>` exterior ring into points, dropping the closing duplicate.
fn polygon_points(polygon: &pure_onnx_ocr::Polygon<f64>) -> Vec<Point> {
    let mut points: Vec<Point> = polygon
        .exterior()
        .coords()
        .map(|coord| Point::new(coord.x as f32, coord.y as f32))
        .collect();

    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

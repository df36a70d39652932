//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PagetextError, Result};
use crate::ocr::DEFAULT_LANGUAGES;

/// One mebibyte.
pub const MIB: u64 = 1024 * 1024;

/// Main configuration for the pagetext pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PagetextConfig {
    /// Page loop configuration.
    pub pipeline: PipelineConfig,

    /// OCR engine configuration.
    pub ocr: OcrConfig,

    /// Rasterizer configuration.
    pub raster: RasterConfig,

    /// Model configuration.
    pub models: ModelConfig,
}

/// What to do when rasterization or OCR fails for one page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFailurePolicy {
    /// Abort the whole run; no report is produced.
    #[default]
    Abort,
    /// Record the page as an empty Scanned page and keep going.
    Degrade,
}

/// Page loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// DPI for rendering pages that need OCR.
    pub raster_dpi: u32,

    /// Pages whose trimmed embedded text is shorter than this go through OCR.
    pub min_text_chars: usize,

    /// Inputs larger than this many bytes are rejected.
    pub max_input_bytes: u64,

    /// Behavior on a per-page rasterization or OCR failure.
    pub page_failure: PageFailurePolicy,

    /// Render annotated previews for OCR'd pages.
    pub annotate_previews: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raster_dpi: 200,
            min_text_chars: 50,
            max_input_bytes: 100 * MIB,
            page_failure: PageFailurePolicy::Abort,
            annotate_previews: true,
        }
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Language codes the engine is configured for.
    pub languages: Vec<String>,

    /// Use GPU if available.
    pub use_gpu: bool,

    /// Keep `[UNK]` markers emitted by the recognizer instead of blanking them.
    pub keep_unk: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            languages: DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect(),
            use_gpu: false,
            keep_unk: false,
        }
    }
}

/// Rasterizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    /// Poppler `pdftoppm` executable name or path.
    pub program: String,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            program: "pdftoppm".to_string(),
        }
    }
}

/// Model file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "rec.onnx".to_string(),
            dictionary: "dict.txt".to_string(),
        }
    }
}

impl PagetextConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Full path to a model file under `models.model_dir`.
    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.models.model_dir.join(model_name)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.raster_dpi == 0 {
            return Err(PagetextError::Config("raster_dpi must be positive".to_string()));
        }
        if self.pipeline.min_text_chars == 0 {
            return Err(PagetextError::Config(
                "min_text_chars must be positive".to_string(),
            ));
        }
        if self.pipeline.max_input_bytes == 0 {
            return Err(PagetextError::Config(
                "max_input_bytes must be positive".to_string(),
            ));
        }
        if self.ocr.languages.is_empty() {
            return Err(PagetextError::Config(
                "at least one OCR language is required".to_string(),
            ));
        }
        Ok(())
    }
}

//! CLI subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod extract;

use std::fs;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use pagetext_core::{
    check_input_size, Extraction, PagetextConfig, PdftoppmRasterizer, Pipeline, PureOcrEngine,
};

/// The pipeline every command runs.
pub type CliPipeline = Pipeline<PureOcrEngine, PdftoppmRasterizer>;

/// Load configuration from an explicit path, the default location, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<PagetextConfig> {
    let config = match config_path {
        Some(path) => PagetextConfig::from_file(Path::new(path))?,
        None => {
            let default_path = config::default_config_path();
            if default_path.exists() {
                debug!("Using config from {}", default_path.display());
                PagetextConfig::from_file(&default_path)?
            } else {
                PagetextConfig::default()
            }
        }
    };
    config.validate()?;
    Ok(config)
}

/// Construct the OCR engine and rasterizer once per invocation.
pub fn build_pipeline(config: &PagetextConfig, model_dir: Option<&Path>) -> anyhow::Result<CliPipeline> {
    let mut config = config.clone();
    if let Some(dir) = model_dir {
        config.models.model_dir = dir.to_path_buf();
    }

    let engine = PureOcrEngine::from_config(&config).map_err(|e| {
        anyhow::anyhow!(
            "Failed to load OCR models from {}: {}",
            config.models.model_dir.display(),
            e
        )
    })?;
    let rasterizer = PdftoppmRasterizer::new(config.raster.program.clone());

    Ok(Pipeline::new(config.pipeline.clone(), engine, rasterizer))
}

/// Reject missing or oversized inputs before any model is loaded.
pub fn check_input(path: &Path, config: &PagetextConfig) -> anyhow::Result<()> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }
    let size = fs::metadata(path)?.len();
    check_input_size(size, config.pipeline.max_input_bytes)?;
    Ok(())
}

/// Run one file through the pipeline with a page progress bar.
pub fn run_extraction(
    pipeline: &CliPipeline,
    path: &Path,
    pb: &ProgressBar,
) -> anyhow::Result<Extraction> {
    let data = fs::read(path)?;
    pb.set_message(format!("Processing {}", path.display()));

    let extraction = pipeline.process_with_progress(&data, |progress| {
        pb.set_length(u64::from(progress.total));
        pb.set_position(u64::from(progress.page));
        pb.set_message(progress.message.clone());
        ControlFlow::Continue(())
    })?;

    Ok(extraction)
}

/// Page progress bar in the style used by every command.
pub fn page_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );
    pb
}

/// Write annotated previews as `<stem>_page<N>.png`, returning the paths written.
pub fn save_previews(extraction: &Extraction, source: &Path, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());

    let mut written = Vec::new();
    for (number, image) in extraction.previews() {
        let path = dir.join(format!("{}_page{}.png", stem, number));
        image.save_with_format(&path, image::ImageFormat::Png)?;
        written.push(path);
    }
    Ok(written)
}

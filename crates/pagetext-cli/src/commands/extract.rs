//! Extract command - produce the text report for a single PDF.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use clap::Args;
use console::style;
use serde::Serialize;
use tracing::{debug, info};

use pagetext_core::models::config::PageFailurePolicy;
use pagetext_core::{export_file_name, Extraction, OcrEngine, EXPORT_MIME};

use super::{build_pipeline, check_input, load_config, page_progress_bar, run_extraction, save_previews};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Report file (default: <input-stem>_extracted.txt next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Summary format printed to stdout
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Render DPI for pages that need OCR
    #[arg(long)]
    dpi: Option<u32>,

    /// Directory for annotated previews of OCR'd pages
    #[arg(long)]
    previews: Option<PathBuf>,

    /// Record failed pages as empty scanned pages instead of aborting
    #[arg(long)]
    degrade: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Totals and page table
    Text,
    /// Full structured result
    Json,
    /// One row per page
    Csv,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    source: String,
    report_path: String,
    languages: &'a [String],
    processed_at: DateTime<Utc>,
    #[serde(flatten)]
    extraction: &'a Extraction,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(dpi) = args.dpi {
        config.pipeline.raster_dpi = dpi;
    }
    if args.degrade {
        config.pipeline.page_failure = PageFailurePolicy::Degrade;
    }
    config.pipeline.annotate_previews = args.previews.is_some();
    config.validate()?;

    check_input(&args.input, &config)?;

    info!("Processing file: {}", args.input.display());

    let pipeline = build_pipeline(&config, args.model_dir.as_deref())?;
    let pb = page_progress_bar();
    let extraction = run_extraction(&pipeline, &args.input, &pb)?;
    pb.finish_with_message("Done");

    let report_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_report_path(&args.input));
    fs::write(&report_path, extraction.report.text())?;
    debug!("Wrote {} report to {}", EXPORT_MIME, report_path.display());

    if let Some(dir) = &args.previews {
        let written = save_previews(&extraction, &args.input, dir)?;
        debug!("Wrote {} previews to {}", written.len(), dir.display());
    }

    let languages = pipeline.ocr().languages();
    let output = format_summary(&extraction, languages, &args.input, &report_path, args.format)?;
    println!("{}", output);

    eprintln!(
        "{} Report written to {}",
        style("✓").green(),
        report_path.display()
    );
    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// `<input dir>/<stem>_extracted.txt`.
fn default_report_path(input: &Path) -> PathBuf {
    let file_name = export_file_name(input);
    match input.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}

fn format_summary(
    extraction: &Extraction,
    languages: &[String],
    source: &Path,
    report_path: &Path,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(format_text(extraction, languages)),
        OutputFormat::Json => {
            let output = JsonOutput {
                source: source.display().to_string(),
                report_path: report_path.display().to_string(),
                languages,
                processed_at: Utc::now(),
                extraction,
            };
            Ok(serde_json::to_string_pretty(&output)?)
        }
        OutputFormat::Csv => format_csv(extraction),
    }
}

fn format_text(extraction: &Extraction, languages: &[String]) -> String {
    let totals = extraction.report.totals();
    let mut output = String::new();

    output.push_str(&format!("OCR Languages:       {}\n", languages.join(", ")));
    output.push_str(&format!("Total Pages:         {}\n", totals.total_pages));
    output.push_str(&format!("Total Words:         {}\n", totals.total_words));
    output.push_str(&format!("Chars (with spaces): {}\n", totals.total_chars_with_spaces));
    output.push_str(&format!("Chars (no spaces):   {}\n", totals.total_chars_without_spaces));
    output.push_str(&format!(
        "Editable / Scanned / Hybrid: {} / {} / {}\n",
        totals.editable_pages, totals.scanned_pages, totals.hybrid_pages
    ));
    output.push('\n');
    output.push_str(&extraction.report.page_table());

    output
}

fn format_csv(extraction: &Extraction) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for row in extraction.report.rows() {
        wtr.serialize(row)?;
    }
    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagetext_core::{aggregate, Page, PageType};

    fn extraction() -> Extraction {
        let pages = vec![
            Page {
                number: 1,
                page_type: PageType::Editable,
                confidence: None,
                embedded_text: "one two three".to_string(),
                text: "one two three".to_string(),
                word_count: 3,
                preview: None,
            },
            Page {
                number: 2,
                page_type: PageType::Scanned,
                confidence: Some(0.85),
                embedded_text: String::new(),
                text: "Scan ned".to_string(),
                word_count: 2,
                preview: None,
            },
        ];
        let report = aggregate(&pages);
        Extraction { pages, report }
    }

    #[test]
    fn test_default_report_path() {
        assert_eq!(
            default_report_path(Path::new("docs/scan.pdf")),
            PathBuf::from("docs/scan_extracted.txt")
        );
    }

    #[test]
    fn test_format_csv() {
        let csv = format_csv(&extraction()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "page,page_type,confidence,word_count");
        assert_eq!(lines[1], "1,Editable,N/A,3");
        assert_eq!(lines[2], "2,Scanned,85.0%,2");
    }

    #[test]
    fn test_format_text() {
        let languages = vec!["en".to_string(), "de".to_string()];
        let text = format_text(&extraction(), &languages);
        assert!(text.starts_with("OCR Languages:       en, de\n"));
        assert!(text.contains("Total Words:         5"));
        assert!(text.contains("Editable / Scanned / Hybrid: 1 / 1 / 0"));
    }
}

//! Batch command - extract reports for many PDFs with one engine.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use tracing::{debug, error};

use pagetext_core::models::config::PageFailurePolicy;
use pagetext_core::report::ReportTotals;
use pagetext_core::export_file_name;

use super::{build_pipeline, check_input, load_config, page_progress_bar, run_extraction, save_previews, CliPipeline};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory for reports (default: next to each input)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Directory for annotated previews of OCR'd pages
    #[arg(long)]
    previews: Option<PathBuf>,

    /// Record failed pages as empty scanned pages instead of aborting
    #[arg(long)]
    degrade: bool,
}

/// Result of processing a single file.
struct FileResult {
    path: PathBuf,
    totals: Option<ReportTotals>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if args.degrade {
        config.pipeline.page_failure = PageFailurePolicy::Degrade;
    }
    config.pipeline.annotate_previews = args.previews.is_some();

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            ext.eq_ignore_ascii_case("pdf")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching PDF files found for pattern: {}", args.input);
    }

    if let Some((first, second)) =
        find_name_collision(&files, args.output_dir.as_deref(), args.previews.is_some())
    {
        anyhow::bail!(
            "{} and {} would write to the same output files; use separate runs or drop --output-dir/--previews",
            first.display(),
            second.display()
        );
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pipeline = build_pipeline(&config, args.model_dir.as_deref())?;
    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let outcome = process_file(&pipeline, &path, &args, &config);
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match outcome {
            Ok(totals) => {
                results.push(FileResult {
                    path,
                    totals: Some(totals),
                    error: None,
                    processing_time_ms,
                });
            }
            Err(e) => {
                error!("Failed to process {}: {}", path.display(), e);
                let message = e.to_string();
                results.push(FileResult {
                    path,
                    totals: None,
                    error: Some(message),
                    processing_time_ms,
                });
                if !args.continue_on_error {
                    print_summary(&results);
                    anyhow::bail!("Stopping after first error (use --continue-on-error to keep going)");
                }
            }
        }
    }

    print_summary(&results);
    debug!("Batch finished in {:?}", start.elapsed());

    if results.iter().any(|r| r.error.is_some()) {
        anyhow::bail!("Some files failed to process");
    }

    Ok(())
}

fn process_file(
    pipeline: &CliPipeline,
    path: &Path,
    args: &BatchArgs,
    config: &pagetext_core::PagetextConfig,
) -> anyhow::Result<ReportTotals> {
    check_input(path, config)?;

    let pb = page_progress_bar();
    let extraction = run_extraction(pipeline, path, &pb)?;
    pb.finish_and_clear();

    let report_path = report_path(path, args.output_dir.as_deref());
    fs::write(&report_path, extraction.report.text())?;

    if let Some(dir) = &args.previews {
        save_previews(&extraction, path, dir)?;
    }

    Ok(*extraction.report.totals())
}

/// Where the report for `path` is written.
fn report_path(path: &Path, output_dir: Option<&Path>) -> PathBuf {
    let report_name = export_file_name(path);
    match (output_dir, path.parent()) {
        (Some(dir), _) => dir.join(report_name),
        (None, Some(parent)) => parent.join(report_name),
        (None, None) => PathBuf::from(report_name),
    }
}

/// First pair of inputs whose report or preview files would overwrite each other.
///
/// Previews all go to one directory, so they collide whenever file stems match.
fn find_name_collision<'a>(
    files: &'a [PathBuf],
    output_dir: Option<&Path>,
    previews: bool,
) -> Option<(&'a Path, &'a Path)> {
    let mut reports: HashMap<PathBuf, &'a Path> = HashMap::new();
    let mut stems: HashMap<String, &'a Path> = HashMap::new();

    for file in files.iter().map(PathBuf::as_path) {
        if let Some(previous) = reports.insert(report_path(file, output_dir), file) {
            return Some((previous, file));
        }
        if previews {
            let stem = file
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            if let Some(previous) = stems.insert(stem, file) {
                return Some((previous, file));
            }
        }
    }
    None
}

fn print_summary(results: &[FileResult]) {
    println!();
    for result in results {
        match (&result.totals, &result.error) {
            (Some(totals), _) => println!(
                "{} {} - {} pages ({} editable, {} scanned, {} hybrid), {} words [{}ms]",
                style("✓").green(),
                result.path.display(),
                totals.total_pages,
                totals.editable_pages,
                totals.scanned_pages,
                totals.hybrid_pages,
                totals.total_words,
                result.processing_time_ms
            ),
            (None, Some(error)) => println!(
                "{} {} - {} [{}ms]",
                style("✗").red(),
                result.path.display(),
                error,
                result.processing_time_ms
            ),
            (None, None) => {}
        }
    }

    let succeeded = results.iter().filter(|r| r.totals.is_some()).count();
    println!();
    println!(
        "{} {}/{} files processed",
        style("ℹ").blue(),
        succeeded,
        results.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(paths: &[&str]) -> Vec<PathBuf> {
        paths.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_report_path() {
        assert_eq!(
            report_path(Path::new("in/scan.pdf"), None),
            PathBuf::from("in/scan_extracted.txt")
        );
        assert_eq!(
            report_path(Path::new("in/scan.pdf"), Some(Path::new("out"))),
            PathBuf::from("out/scan_extracted.txt")
        );
    }

    #[test]
    fn test_same_stem_next_to_inputs_is_fine() {
        let files = files(&["a/scan.pdf", "b/scan.pdf"]);
        assert_eq!(find_name_collision(&files, None, false), None);
    }

    #[test]
    fn test_same_stem_in_output_dir_collides() {
        let files = files(&["a/scan.pdf", "b/other.pdf", "c/scan.pdf"]);
        assert_eq!(
            find_name_collision(&files, Some(Path::new("out")), false),
            Some((Path::new("a/scan.pdf"), Path::new("c/scan.pdf")))
        );
    }

    #[test]
    fn test_same_stem_with_previews_collides() {
        let files = files(&["a/scan.pdf", "b/scan.pdf"]);
        assert_eq!(
            find_name_collision(&files, None, true),
            Some((Path::new("a/scan.pdf"), Path::new("b/scan.pdf")))
        );
    }

    #[test]
    fn test_distinct_stems_never_collide() {
        let files = files(&["a/one.pdf", "a/two.pdf"]);
        assert_eq!(find_name_collision(&files, Some(Path::new("out")), true), None);
    }
}

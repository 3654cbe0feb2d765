//! Batch command - every PDF in a directory into one CSV and a run log.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Local;
use clap::Args;
use console::style;
use glob::{glob_with, MatchOptions};
use indicatif::ProgressBar;
use serde::Serialize;
use tracing::{debug, error, warn};

use probex_core::models::{ExtractionMethod, Field, FormType};
use probex_core::{ExtractionResult, PageTextProvider, PetitionExtractor, ReviewStatus};

use super::process::{acquire, header, write_rows};
use super::{bar_style, load_config, load_ocr};

/// Default CSV name; replaced by a timestamped name so runs do not overwrite each other.
const DEFAULT_OUT_CSV: &str = "output.csv";

/// Warning code for a name already extracted from an earlier file in the batch.
const BLEED_GUARD_TRIP: &str = "BLEED_GUARD_TRIP";

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Directory containing petition PDFs
    #[arg(required = true)]
    input_dir: PathBuf,

    /// Also search subdirectories
    #[arg(short, long)]
    recursive: bool,

    /// Output CSV (the default name gets a timestamp suffix)
    #[arg(long, default_value = DEFAULT_OUT_CSV)]
    out_csv: PathBuf,

    /// JSON run log
    #[arg(long, default_value = "run_log.json")]
    log_path: PathBuf,

    /// Stop at the first file that fails instead of logging it and continuing
    #[arg(long)]
    fail_fast: bool,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Write per-page text under the debug root
    #[arg(long)]
    debug: bool,
}

/// One run log entry: a case, or a file that failed as a whole.
#[derive(Debug, Serialize)]
struct RunLogEntry {
    file: String,
    case_id: usize,
    extraction_method: Option<ExtractionMethod>,
    form_type: Option<FormType>,
    confidence_score: Option<f32>,
    matched_markers: Vec<String>,
    missing_fields: Vec<Field>,
    pages_used: Vec<usize>,
    warnings: Vec<String>,
    status: Option<ReviewStatus>,
    error: String,
}

impl RunLogEntry {
    fn from_result(file: &str, result: &ExtractionResult) -> Self {
        let record = &result.record;
        Self {
            file: file.to_string(),
            case_id: result.case_id,
            extraction_method: Some(record.extraction_method()),
            form_type: Some(record.form_type()),
            confidence_score: Some(record.confidence_score()),
            matched_markers: record.matched_markers().to_vec(),
            missing_fields: record.missing_fields().to_vec(),
            pages_used: result.pages_used.clone(),
            warnings: result.warnings.clone(),
            status: Some(result.status),
            error: String::new(),
        }
    }

    fn failure(file: &str, error: String) -> Self {
        Self {
            file: file.to_string(),
            case_id: 1,
            extraction_method: None,
            form_type: None,
            confidence_score: None,
            matched_markers: Vec::new(),
            missing_fields: Vec::new(),
            pages_used: Vec::new(),
            warnings: Vec::new(),
            status: None,
            error,
        }
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files = find_pdfs(&args.input_dir, args.recursive)?;
    if files.is_empty() {
        anyhow::bail!("No PDFs found in {}", args.input_dir.display());
    }

    println!(
        "{} Found {} PDFs to process",
        style("ℹ").blue(),
        files.len()
    );

    let engine = load_ocr(&config, args.model_dir.as_deref());
    let mut provider =
        PageTextProvider::new(config.acquisition.clone()).with_debug(args.debug || config.acquisition.debug);
    if let Some(engine) = &engine {
        provider = provider.with_ocr(engine);
    }
    let extractor = PetitionExtractor::from_config(&config.extraction);

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(bar_style(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files",
    )?);

    let mut results: Vec<ExtractionResult> = Vec::new();
    let mut log: Vec<RunLogEntry> = Vec::new();
    let mut seen_names: HashSet<String> = HashSet::new();
    let mut failed: Vec<(String, String)> = Vec::new();

    for path in &files {
        let file = path.display().to_string();
        let outcome = acquire(&provider, path).map(|acquired| extractor.extract(&acquired));

        match outcome {
            Ok(cases) => {
                for mut result in cases {
                    bleed_guard(&mut result, &mut seen_names);
                    log.push(RunLogEntry::from_result(&file, &result));
                    results.push(result);
                }
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.fail_fast {
                    error!("Failed to process {}: {}", file, error_msg);
                    anyhow::bail!("Processing failed: {}", error_msg);
                }
                warn!("Failed to process {}: {}", file, error_msg);
                log.push(RunLogEntry::failure(&file, error_msg.clone()));
                failed.push((file, error_msg));
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    let out_csv = if args.out_csv == Path::new(DEFAULT_OUT_CSV) {
        timestamped(&args.out_csv)
    } else {
        args.out_csv.clone()
    };
    write_csv(&out_csv, &results)?;
    fs::write(&args.log_path, serde_json::to_string_pretty(&log)?)?;
    debug!("Wrote {} log entries to {}", log.len(), args.log_path.display());

    let review = results
        .iter()
        .filter(|r| r.status == ReviewStatus::NeedsReview)
        .count();

    println!();
    println!(
        "{} Processed {} files ({} cases) in {:?}",
        style("✓").green(),
        files.len(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} need review, {} failed",
        style(review).yellow(),
        style(failed.len()).red()
    );
    println!("{} CSV written to {}", style("✓").green(), out_csv.display());
    println!("{} Run log written to {}", style("✓").green(), args.log_path.display());

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for (file, error) in &failed {
            println!("  - {}: {}", file, error);
        }
    }

    Ok(())
}

fn find_pdfs(dir: &Path, recursive: bool) -> anyhow::Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("Input directory not found: {}", dir.display());
    }
    let pattern = dir.join(if recursive { "**/*.pdf" } else { "*.pdf" });
    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::new()
    };
    let mut files: Vec<PathBuf> = glob_with(&pattern.to_string_lossy(), options)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Blank names already extracted from an earlier file, then remember this file's names.
fn bleed_guard(result: &mut ExtractionResult, seen: &mut HashSet<String>) {
    for field in [Field::DeceasedName, Field::PetitionerName] {
        let value = result.record.get(field);
        if !value.is_empty() && seen.contains(value) {
            warn!("{} {:?} already seen in this batch", field, value);
            result.flag_field(field, BLEED_GUARD_TRIP);
        }
    }
    for field in [Field::DeceasedName, Field::PetitionerName] {
        let value = result.record.get(field);
        if !value.is_empty() {
            seen.insert(value.to_string());
        }
    }
}

/// `output.csv` becomes `output_<mon>_<year>_<h-MMam>.csv`.
fn timestamped(path: &Path) -> PathBuf {
    let now = Local::now();
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
    let time = now.format("%I-%M%p").to_string().to_lowercase();
    let name = format!(
        "{}_{}_{}_{}",
        stem,
        now.format("%b").to_string().to_lowercase(),
        now.format("%Y"),
        time.trim_start_matches('0')
    );
    let name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}.{}", name, ext),
        None => name,
    };
    path.with_file_name(name)
}

/// Always written, header included, even when no case was extracted.
fn write_csv(path: &Path, results: &[ExtractionResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(header())?;
    write_rows(&mut wtr, results)?;
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn result_for(text: &str) -> ExtractionResult {
        PetitionExtractor::new().extract_text(text, ExtractionMethod::Text)
    }

    #[test]
    fn test_bleed_guard_blanks_repeated_names() {
        let mut seen = HashSet::new();
        let mut first = result_for("ESTATE OF JOHN SMITH\nPetitioner Information\nName: Mary Smith");
        bleed_guard(&mut first, &mut seen);
        assert!(!first.warnings.iter().any(|w| w.starts_with(BLEED_GUARD_TRIP)));

        let mut second = result_for("ESTATE OF JOHN SMITH\nPetitioner Information\nName: Ann Lee");
        bleed_guard(&mut second, &mut seen);
        assert_eq!(second.record.get(Field::DeceasedName), "");
        assert_eq!(second.record.get(Field::PetitionerName), "Ann Lee");
        assert!(second.warnings.contains(&"BLEED_GUARD_TRIP:Deceased Name".to_string()));
    }

    #[test]
    fn test_timestamped_name() {
        let path = timestamped(Path::new("output.csv"));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("output_"));
        assert!(name.ends_with("m.csv"));
        assert!(!name.contains("_0"));
    }
}

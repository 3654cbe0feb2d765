//! Process command - extract the petition fields from a single file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::ProgressBar;
use tracing::{debug, info};

use probex_core::models::{Field, FormType};
use probex_core::{
    AcquiredText, ExtractionResult, PageTextProvider, PdfExtractor, PetitionExtractor,
    ProbexConfig, ReviewStatus,
};

use super::{bar_style, load_config, load_ocr};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or image)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Write per-page text and print classification details
    #[arg(long)]
    debug: bool,

    /// Parse as this layout instead of classifying (form-a, form-admin, b, c, d, unknown)
    #[arg(long)]
    form: Option<FormType>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(bar_style("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.set_message("Acquiring text...");

    let engine = load_ocr(&config, args.model_dir.as_deref());
    let mut provider =
        PageTextProvider::new(config.acquisition.clone()).with_debug(args.debug || config.acquisition.debug);
    if let Some(engine) = &engine {
        provider = provider.with_ocr(engine);
    }

    let acquired = acquire(&provider, &args.input)?;

    pb.set_message("Extracting fields...");
    let extractor = PetitionExtractor::from_config(&config.extraction).with_forced_form(args.form);
    let results = extractor.extract(&acquired);
    pb.finish_and_clear();

    if args.debug {
        print_detections(&results, &config);
    }

    let output = format_results(&results, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Text of a PDF or image file.
pub(crate) fn acquire(provider: &PageTextProvider<'_>, path: &Path) -> anyhow::Result<AcquiredText> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    let name = path.display().to_string();

    match extension.as_str() {
        "pdf" => {
            let data = fs::read(path)?;
            let pdf = PdfExtractor::from_bytes(&data)?;
            Ok(provider.get_document_text(&pdf, &name)?)
        }
        "png" | "jpg" | "jpeg" | "tiff" | "tif" | "bmp" => {
            let image = image::open(path)?;
            Ok(provider.image_text(&image, &name)?)
        }
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    }
}

fn print_detections(results: &[ExtractionResult], config: &ProbexConfig) {
    for result in results {
        let record = &result.record;
        eprintln!(
            "{} Case {} (pages {:?}): {} confidence {:.3} via {}",
            style("ℹ").blue(),
            result.case_id,
            result.pages_used,
            style(record.form_type()).bold(),
            record.confidence_score(),
            record.extraction_method()
        );
        eprintln!("   markers: {}", record.matched_markers().join(", "));
    }
    if config.acquisition.debug_root.exists() {
        eprintln!(
            "{} Page text written under {}",
            style("ℹ").blue(),
            config.acquisition.debug_root.display()
        );
    }
}

pub(crate) fn format_results(results: &[ExtractionResult], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(results)?),
        OutputFormat::Csv => format_csv(results),
        OutputFormat::Text => Ok(format_text(results)),
    }
}

/// Header plus one row per case, the nine columns in fixed order.
pub(crate) fn write_rows<W: std::io::Write>(
    wtr: &mut csv::Writer<W>,
    results: &[ExtractionResult],
) -> anyhow::Result<()> {
    for result in results {
        wtr.write_record(result.record.fields().as_row())?;
    }
    Ok(())
}

pub(crate) fn header() -> [&'static str; 9] {
    Field::ALL.map(Field::column_name)
}

fn format_csv(results: &[ExtractionResult]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(header())?;
    write_rows(&mut wtr, results)?;
    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(results: &[ExtractionResult]) -> String {
    let mut output = String::new();

    for result in results {
        let record = &result.record;
        output.push_str(&format!(
            "Case {} - {} ({:.0}% confidence, {})\n",
            result.case_id,
            record.form_type(),
            record.confidence_score() * 100.0,
            record.extraction_method()
        ));
        for (field, value) in record.fields().iter() {
            let value = if value.is_empty() { "-" } else { value };
            output.push_str(&format!("  {:<26} {}\n", field.column_name(), value));
        }
        if result.status == ReviewStatus::NeedsReview {
            output.push_str("  Needs review\n");
        }
        for warning in &result.warnings {
            output.push_str(&format!("  Warning: {}\n", warning));
        }
        output.push('\n');
    }

    output
}

//! CLI tool for translating PowerPoint presentations.

use anyhow::{Context, Result};
use clap::Parser;
use deck_core::{TextTranslator, TranslationReport, DEFAULT_MAX_WORKERS};
use deck_google::{GoogleConfig, GoogleTranslate, DEFAULT_ENDPOINT};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Translate the text of a PowerPoint presentation, keeping its formatting.
#[derive(Parser, Debug)]
#[command(name = "deck-translate")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input PowerPoint file (.pptx)
    input: PathBuf,

    /// Output file (default: <input>_<language>.pptx next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Target language code (e.g. uk, ru, en)
    #[arg(short, long, default_value = "uk")]
    language: String,

    /// Source language code
    #[arg(long, default_value = "auto")]
    source: String,

    /// Number of slides translated concurrently
    #[arg(
        short = 'j',
        long,
        default_value_t = DEFAULT_MAX_WORKERS as u32,
        value_parser = clap::value_parser!(u32).range(1..=30)
    )]
    threads: u32,

    /// Translation endpoint URL
    #[arg(long, env = "DECK_TRANSLATE_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Print the translation report as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let output_path = get_output_path(&args.input, args.output.as_ref(), &args.language);

    let service = GoogleTranslate::new(GoogleConfig {
        endpoint: args.endpoint.clone(),
        source_language: args.source.clone(),
        timeout: Duration::from_secs(args.timeout),
        ..GoogleConfig::default()
    })
    .context("Failed to set up translation client")?;
    let translator = TextTranslator::new(service, args.language.as_str());

    if args.verbose {
        eprintln!(
            "Translating {} to '{}' with {} threads",
            args.input.display(),
            args.language,
            args.threads
        );
    }

    let report = deck_pptx::translate_file(&args.input, &output_path, &translator, args.threads as usize)
        .with_context(|| format!("Failed to translate {}", args.input.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report, &output_path, args.verbose);
    }

    Ok(())
}

/// Print a human-readable summary of a finished run.
fn print_summary(report: &TranslationReport, output_path: &Path, verbose: bool) {
    println!("Translated presentation saved as: {}", output_path.display());

    if verbose {
        eprintln!(
            "  {} of {} slides, {} runs, {} service calls",
            report.translated_slides, report.slide_count, report.runs, report.service_calls
        );
    }
    if report.fallbacks > 0 {
        eprintln!(
            "  {} text runs could not be translated and were kept as-is",
            report.fallbacks
        );
    }
    for failure in &report.failures {
        eprintln!("  Slide {} left untranslated: {}", failure.number, failure.message);
    }
}

/// Determine the output path for a translated file.
fn get_output_path(input_path: &Path, output: Option<&PathBuf>, language: &str) -> PathBuf {
    if let Some(path) = output {
        return path.clone();
    }

    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    let output_filename = format!("{}_{}.pptx", stem, language);

    match input_path.parent() {
        Some(parent) => parent.join(output_filename),
        None => PathBuf::from(output_filename),
    }
}

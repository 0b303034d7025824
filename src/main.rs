use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use ephemeris_processor::cli::{Args, ProgressBarReporter, print_summary, setup_logging};
use ephemeris_processor::{BatchProcessor, BatchReport, ParquetEncoder};
use std::process;
use std::sync::Arc;

/// Exit status when some files failed but the batch ran to completion
const EXIT_PARTIAL_FAILURE: i32 = 2;

fn main() {
    let args = Args::parse();

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    match runtime.block_on(run(args)) {
        Ok(report) if report.has_failures() => process::exit(EXIT_PARTIAL_FAILURE),
        Ok(_) => process::exit(0),
        Err(error) => {
            eprintln!("{} {:#}", "Error:".bright_red().bold(), error);
            process::exit(1);
        }
    }
}

async fn run(args: Args) -> Result<BatchReport> {
    setup_logging(&args)?;
    let config = args.to_config().context("Invalid arguments")?;

    let encoder = Arc::new(ParquetEncoder::new(config.compression));
    let mut processor = BatchProcessor::new(config, encoder)?;
    if args.show_progress() {
        processor = processor.with_reporter(Arc::new(ProgressBarReporter::new()));
    }

    let report = processor.process().await.with_context(|| {
        format!(
            "Failed to convert ephemeris files in {}",
            args.input_dir.display()
        )
    })?;

    if !args.quiet {
        print_summary(&report);
    }

    Ok(report)
}

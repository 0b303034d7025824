//! Command-line interface components.

use crate::config::{CompressionAlgorithm, ConversionConfig};
use crate::constants::{DEFAULT_INPUT_PATTERN, DEFAULT_STEP_TOLERANCE_SECS, DEFAULT_WORKER_CAP};
use crate::error::{EphemerisError, FailureKind, Result};
use crate::models::BatchReport;
use crate::processor::progress::ProgressReporter;
use clap::Parser;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug, Clone)]
#[command(name = "ephemeris_processor")]
#[command(about = "Convert orbital ephemeris text files to Parquet documents")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Directory containing ephemeris text files (not searched recursively)
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Directory receiving one Parquet file per converted input
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Number of parallel workers (0 = one per CPU core)
    #[arg(short = 'j', long = "workers", value_name = "COUNT", default_value_t = 0)]
    pub workers: usize,

    /// Upper bound on the worker count
    #[arg(long = "worker-cap", value_name = "COUNT", default_value_t = DEFAULT_WORKER_CAP)]
    pub worker_cap: usize,

    /// Glob matched against input file names
    #[arg(long, value_name = "GLOB", default_value = DEFAULT_INPUT_PATTERN)]
    pub pattern: String,

    /// Allowed drift from the declared step size, in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_STEP_TOLERANCE_SECS)]
    pub tolerance: f64,

    /// Parquet compression algorithm (snappy, zstd, lz4, none)
    #[arg(long, default_value = "snappy")]
    pub compression: String,

    /// Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }

    /// Build and validate the run configuration
    pub fn to_config(&self) -> Result<ConversionConfig> {
        let config = ConversionConfig::new(self.input_dir.clone(), self.output_dir.clone())
            .with_workers(self.workers)
            .with_worker_cap(self.worker_cap)
            .with_input_pattern(self.pattern.clone())
            .with_step_tolerance(self.tolerance)
            .with_compression(CompressionAlgorithm::from_name(&self.compression)?);
        config.validate()?;
        Ok(config)
    }
}

/// Set up structured logging on stderr
pub fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ephemeris_processor={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| EphemerisError::Configuration {
            message: format!("failed to initialise logging: {}", e),
        })?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Terminal progress bar fed by the batch orchestrator
pub struct ProgressBarReporter {
    bar: ProgressBar,
}

impl ProgressBarReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} [{per_sec}] ETA: {eta}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        bar.set_message("Converting");
        Self { bar }
    }
}

impl Default for ProgressBarReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for ProgressBarReporter {
    fn start(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn report_progress(&self, completed: usize, _total: usize) {
        self.bar.set_position(completed as u64);
    }

    fn finish(&self, succeeded: usize, failed: usize) {
        self.bar
            .finish_with_message(format!("{} converted, {} failed", succeeded, failed));
    }
}

/// Format a byte count in human-readable units
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

/// Print the end-of-run summary to stdout
pub fn print_summary(report: &BatchReport) {
    println!();
    println!("{}", "Conversion summary".bright_green().bold());
    println!(
        "  {} {} found, {} converted, {} failed",
        "Files:".bright_white(),
        report.total_files,
        report.succeeded,
        report.failed()
    );
    println!(
        "  {} {} ({})",
        "Records:".bright_white(),
        report.records_written,
        format_size(report.bytes_written)
    );
    println!(
        "  {} {} started, {} lost",
        "Workers:".bright_white(),
        report.workers,
        report.workers_lost
    );
    println!(
        "  {} {:.2}s ({:.1} files/s)",
        "Duration:".bright_white(),
        report.elapsed.as_secs_f64(),
        report.files_per_second()
    );
    println!(
        "  {} {}",
        "Output:".bright_white(),
        report.output_dir.display()
    );

    if report.has_failures() {
        println!();
        println!(
            "{} structural, {} semantic, {} infrastructural, {} fatal",
            report.failures_of(FailureKind::Structural),
            report.failures_of(FailureKind::Semantic),
            report.failures_of(FailureKind::Infrastructural),
            report.failures_of(FailureKind::Fatal)
        );
        for failure in &report.failures {
            let name = failure
                .path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| failure.path.display().to_string());
            println!("  {} {}: {}", "✗".bright_red(), name, failure.reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["ephemeris_processor", "in", "out"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.input_dir, PathBuf::from("in"));
        assert_eq!(args.output_dir, PathBuf::from("out"));
        assert_eq!(args.workers, 0);
        assert_eq!(args.worker_cap, DEFAULT_WORKER_CAP);
        assert_eq!(args.pattern, "*.txt");
        assert_eq!(args.get_log_level(), "warn");
        assert!(args.show_progress());
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(parse(&["-v"]).get_log_level(), "info");
        assert_eq!(parse(&["-vv"]).get_log_level(), "debug");
        assert_eq!(parse(&["-vvvv"]).get_log_level(), "trace");
        let quiet = parse(&["-q"]);
        assert_eq!(quiet.get_log_level(), "error");
        assert!(!quiet.show_progress());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Args::try_parse_from(["ephemeris_processor", "in", "out", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_missing_output_dir_rejected() {
        assert!(Args::try_parse_from(["ephemeris_processor", "in"]).is_err());
    }

    #[test]
    fn test_to_config() {
        let config = parse(&["-j", "4", "--compression", "zstd", "--tolerance", "0.5"])
            .to_config()
            .unwrap();
        assert_eq!(config.workers, 4);
        assert_eq!(config.compression, CompressionAlgorithm::Zstd);
        assert_eq!(config.step_tolerance_secs, 0.5);
    }

    #[test]
    fn test_to_config_rejects_bad_values() {
        assert!(parse(&["--compression", "brotli"]).to_config().is_err());
        assert!(parse(&["--worker-cap", "0"]).to_config().is_err());
        assert!(parse(&["--worker-cap", "1000"]).to_config().is_err());
        assert!(parse(&["--pattern", "[unclosed"]).to_config().is_err());
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
    }
}

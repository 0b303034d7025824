//! Configuration management and validation.
//!
//! Provides the batch conversion configuration, output compression
//! selection, and system profiling used to size the worker pool.

use crate::constants::{
    DEFAULT_INPUT_PATTERN, DEFAULT_STEP_TOLERANCE_SECS, DEFAULT_WORKER_CAP, MAX_WORKER_CAP,
};
use crate::error::{EphemerisError, Result};
use polars::prelude::ParquetCompression;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Supported compression algorithms for encoded output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompressionAlgorithm {
    /// Snappy compression - good balance of speed and compression
    Snappy,
    /// ZSTD compression - better compression ratio, slower
    Zstd,
    /// LZ4 compression - fastest, lower compression ratio
    Lz4,
    /// No compression
    Uncompressed,
}

impl CompressionAlgorithm {
    /// Parse a command-line name (snappy, zstd, lz4, none)
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "snappy" => Ok(Self::Snappy),
            "zstd" => Ok(Self::Zstd),
            "lz4" => Ok(Self::Lz4),
            "none" | "uncompressed" => Ok(Self::Uncompressed),
            other => Err(EphemerisError::Configuration {
                message: format!("Unknown compression algorithm '{}'", other),
            }),
        }
    }

    /// Convert to polars ParquetCompression type
    pub fn to_polars_compression(&self) -> ParquetCompression {
        match self {
            CompressionAlgorithm::Snappy => ParquetCompression::Snappy,
            CompressionAlgorithm::Zstd => ParquetCompression::Zstd(None),
            CompressionAlgorithm::Lz4 => ParquetCompression::Lz4Raw,
            CompressionAlgorithm::Uncompressed => ParquetCompression::Uncompressed,
        }
    }
}

/// System profiling information for pool sizing
#[derive(Debug, Clone)]
pub struct SystemProfile {
    /// Number of logical CPU cores available
    pub cpu_cores: usize,
    /// Total memory in MB
    pub memory_mb: usize,
}

impl SystemProfile {
    /// Auto-detect system capabilities
    pub fn detect() -> Self {
        use sysinfo::System;

        let cpu_cores = num_cpus::get();

        let mut system = System::new();
        system.refresh_memory();
        let memory_mb = (system.total_memory() / 1024 / 1024) as usize;

        Self {
            cpu_cores,
            memory_mb,
        }
    }
}

/// Configuration for a batch conversion run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Directory scanned (non-recursively) for input files
    pub input_dir: PathBuf,

    /// Directory receiving one encoded file per converted input
    pub output_dir: PathBuf,

    /// Requested worker count; 0 = use all available cores
    pub workers: usize,

    /// Hard ceiling on worker count
    pub worker_cap: usize,

    /// Glob matched against input file names
    pub input_pattern: String,

    /// Allowed drift between actual and expected epochs, in seconds
    pub step_tolerance_secs: f64,

    /// Compression for encoded output
    pub compression: CompressionAlgorithm,
}

impl ConversionConfig {
    pub fn new(input_dir: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            input_dir,
            output_dir,
            workers: 0,
            worker_cap: DEFAULT_WORKER_CAP,
            input_pattern: DEFAULT_INPUT_PATTERN.to_string(),
            step_tolerance_secs: DEFAULT_STEP_TOLERANCE_SECS,
            compression: CompressionAlgorithm::Snappy,
        }
    }

    /// Create configuration with custom worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Lower or raise the hard worker ceiling
    pub fn with_worker_cap(mut self, worker_cap: usize) -> Self {
        self.worker_cap = worker_cap;
        self
    }

    /// Set the glob used to select input files
    pub fn with_input_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.input_pattern = pattern.into();
        self
    }

    /// Set epoch spacing tolerance in seconds
    pub fn with_step_tolerance(mut self, seconds: f64) -> Self {
        self.step_tolerance_secs = seconds;
        self
    }

    /// Set output compression
    pub fn with_compression(mut self, compression: CompressionAlgorithm) -> Self {
        self.compression = compression;
        self
    }

    /// Check values that would otherwise fail deep inside a run
    pub fn validate(&self) -> Result<()> {
        if self.worker_cap == 0 || self.worker_cap > MAX_WORKER_CAP {
            return Err(EphemerisError::Configuration {
                message: format!(
                    "worker cap must be between 1 and {}, got {}",
                    MAX_WORKER_CAP, self.worker_cap
                ),
            });
        }
        if !self.step_tolerance_secs.is_finite() || self.step_tolerance_secs < 0.0 {
            return Err(EphemerisError::Configuration {
                message: format!(
                    "step tolerance must be a non-negative number of seconds, got {}",
                    self.step_tolerance_secs
                ),
            });
        }
        if let Err(e) = glob::Pattern::new(&self.input_pattern) {
            return Err(EphemerisError::Configuration {
                message: format!("invalid input pattern '{}': {}", self.input_pattern, e),
            });
        }
        Ok(())
    }

    /// Pool size: min(requested or available cores, cap, file count), at least 1
    pub fn effective_workers(&self, profile: &SystemProfile, file_count: usize) -> usize {
        let requested = if self.workers > 0 {
            self.workers
        } else {
            profile.cpu_cores
        };

        let workers = requested.min(self.worker_cap).min(file_count).max(1);

        debug!(
            "Worker pool sizing: {} workers (requested {}, cap {}, {} files, {} cores, {}MB memory)",
            workers, requested, self.worker_cap, file_count, profile.cpu_cores, profile.memory_mb
        );

        workers
    }
}

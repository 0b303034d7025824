//! Ephemeris Processor Library
//!
//! Converts fixed-format orbital ephemeris text files (state vectors with
//! lower-triangular covariance) into one encoded Parquet document per input.
//!
//! This library provides tools for:
//! - Decoding object descriptors from structured file names
//! - Extracting header metadata and locating the data section
//! - Parsing four-line state/covariance records
//! - Checking epochs against the declared step size
//! - Encoding documents and writing them atomically
//! - Converting whole directories with a parallel worker pool

pub mod cli;
pub mod config;
pub mod constants;
pub mod document;
pub mod encoder;
pub mod error;
pub mod filename;
pub mod header;
pub mod models;
pub mod processor;
pub mod records;
pub mod validation;

// Re-export commonly used types
pub use config::{CompressionAlgorithm, ConversionConfig};
pub use document::{EphemerisDocument, parse_ephemeris_file};
pub use encoder::{DocumentEncoder, ParquetEncoder};
pub use error::{EphemerisError, FailureKind, Result};
pub use models::{BatchReport, EphemerisRecord, FileDescriptor, ReferenceFrame};
pub use processor::BatchProcessor;

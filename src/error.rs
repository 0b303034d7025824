//! Error handling for ephemeris conversion operations.
//!
//! Provides error types with enough context (line numbers, expected vs.
//! actual epochs) to diagnose a rejected file, plus a coarse classification
//! used by the batch report.

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EphemerisError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Malformed filename: {path} - {reason}")]
    MalformedFilename { path: PathBuf, reason: String },

    #[error("No reference frame marker found, data section start is unresolved")]
    MissingDataSection,

    #[error("Reference frame not found: '{token}' (line {line})")]
    UnknownReferenceFrame { token: String, line: usize },

    #[error("Missing header field: {field}")]
    MissingHeaderField { field: &'static str },

    #[error("Invalid value for header field {field}: '{value}'")]
    InvalidHeaderValue { field: &'static str, value: String },

    #[error("Malformed record line {line}: {field} = '{value}'")]
    MalformedRecordLine {
        line: usize,
        field: String,
        value: String,
    },

    #[error(
        "Step size inconsistency at record {index}: expected epoch {expected}, found {actual}"
    )]
    StepSizeInconsistency {
        index: usize,
        expected: DateTime<Utc>,
        actual: DateTime<Utc>,
    },

    #[error("Encoding failed: {reason}")]
    Encoding { reason: String },

    #[error("Failed to persist output file {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Input directory not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Worker {worker} exited unexpectedly")]
    WorkerLost { worker: usize },

    #[error("No surviving workers left to convert this file")]
    PoolExhausted,
}

/// Coarse failure classes used when summarising a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The file cannot be interpreted at all
    Structural,
    /// The file parses but violates a data invariant
    Semantic,
    /// Reading the input or writing the output failed
    Infrastructural,
    /// The worker converting the file was lost
    Fatal,
}

impl EphemerisError {
    /// Classify this error for batch reporting
    pub fn kind(&self) -> FailureKind {
        match self {
            EphemerisError::MalformedFilename { .. }
            | EphemerisError::MissingDataSection
            | EphemerisError::MissingHeaderField { .. } => FailureKind::Structural,
            EphemerisError::UnknownReferenceFrame { .. }
            | EphemerisError::InvalidHeaderValue { .. }
            | EphemerisError::MalformedRecordLine { .. }
            | EphemerisError::StepSizeInconsistency { .. } => FailureKind::Semantic,
            EphemerisError::Io(_)
            | EphemerisError::Polars(_)
            | EphemerisError::Encoding { .. }
            | EphemerisError::Persist { .. }
            | EphemerisError::InputNotFound { .. }
            | EphemerisError::Configuration { .. } => FailureKind::Infrastructural,
            EphemerisError::WorkerLost { .. } | EphemerisError::PoolExhausted => {
                FailureKind::Fatal
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, EphemerisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            EphemerisError::MissingDataSection.kind(),
            FailureKind::Structural
        );
        assert_eq!(
            EphemerisError::UnknownReferenceFrame {
                token: "XYZ".to_string(),
                line: 3
            }
            .kind(),
            FailureKind::Semantic
        );
        assert_eq!(
            EphemerisError::WorkerLost { worker: 2 }.kind(),
            FailureKind::Fatal
        );
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(EphemerisError::from(io).kind(), FailureKind::Infrastructural);
    }

    #[test]
    fn test_error_messages_carry_context() {
        let err = EphemerisError::MalformedRecordLine {
            line: 12,
            field: "X_DOT".to_string(),
            value: "abc".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("12"));
        assert!(message.contains("X_DOT"));
        assert!(message.contains("abc"));
    }
}

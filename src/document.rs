//! Ephemeris document assembly.
//!
//! Runs the per-file parsing pipeline (filename, header, records, validation)
//! and assembles the results into one immutable [`EphemerisDocument`].

use crate::error::Result;
use crate::filename::parse_file_descriptor;
use crate::header::{content_lines, parse_header};
use crate::models::{DocumentMetadata, EphemerisRecord, FileDescriptor};
use crate::records::parse_records;
use crate::validation::validate_records;
use std::path::Path;
use tracing::debug;

/// A fully parsed and validated ephemeris file
#[derive(Debug, Clone, PartialEq)]
pub struct EphemerisDocument {
    descriptor: FileDescriptor,
    metadata: DocumentMetadata,
    records: Vec<EphemerisRecord>,
}

impl EphemerisDocument {
    /// Combine validated parts into a document
    pub fn build(
        descriptor: FileDescriptor,
        metadata: DocumentMetadata,
        records: Vec<EphemerisRecord>,
    ) -> Self {
        Self {
            descriptor,
            metadata,
            records,
        }
    }

    pub fn descriptor(&self) -> &FileDescriptor {
        &self.descriptor
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    pub fn records(&self) -> &[EphemerisRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Read and convert one ephemeris file into a validated document
pub fn parse_ephemeris_file(path: &Path, tolerance_seconds: f64) -> Result<EphemerisDocument> {
    let content = std::fs::read_to_string(path)?;
    parse_ephemeris_str(path, &content, tolerance_seconds)
}

/// Convert in-memory file content; `path` supplies the descriptor fields
pub fn parse_ephemeris_str(
    path: &Path,
    content: &str,
    tolerance_seconds: f64,
) -> Result<EphemerisDocument> {
    let descriptor = parse_file_descriptor(path)?;

    let lines = content_lines(content);
    let (metadata, data_start_index) = parse_header(&lines)?;

    let records = parse_records(&lines[data_start_index..], metadata.reference_frame)?;
    validate_records(&records, metadata.step_size_seconds, tolerance_seconds)?;

    debug!(
        "Built document for {} with {} records",
        descriptor.object_name,
        records.len()
    );

    Ok(EphemerisDocument::build(descriptor, metadata, records))
}

//! Ephemeris header parsing and metadata extraction.
//!
//! Scans every content line for labelled header fields and for the bare
//! reference-frame marker whose position marks the start of the data section.

use crate::constants::{
    DEFAULT_ORIGINATOR, HEADER_LABELS, LABEL_CREATED, LABEL_EPHEMERIS_SOURCE,
    LABEL_EPHEMERIS_START, LABEL_EPHEMERIS_STOP, LABEL_STEP_SIZE,
};
use crate::error::{EphemerisError, Result};
use crate::models::{DocumentMetadata, ReferenceFrame};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// A single word of capitals and digits on its own line
static FRAME_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9]{1,15}$").expect("valid frame marker regex"));

/// A non-blank input line with its 1-based position in the original file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
    pub number: usize,
    pub text: &'a str,
}

/// Split file content into non-blank lines, keeping original line numbers
pub fn content_lines(content: &str) -> Vec<SourceLine<'_>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(index, text)| SourceLine {
            number: index + 1,
            text,
        })
        .collect()
}

type Extractor = fn(&mut MetadataBuilder, &str) -> Result<()>;

/// Header labels and the field each one fills, applied in order to every line
const EXTRACTORS: &[(&str, Extractor)] = &[
    (LABEL_CREATED, set_creation_date),
    (LABEL_EPHEMERIS_START, set_start_time),
    (LABEL_EPHEMERIS_STOP, set_stop_time),
    (LABEL_STEP_SIZE, set_step_size),
    (LABEL_EPHEMERIS_SOURCE, set_ephemeris_source),
];

fn set_creation_date(builder: &mut MetadataBuilder, value: &str) -> Result<()> {
    builder.creation_date = Some(value.to_string());
    Ok(())
}

fn set_start_time(builder: &mut MetadataBuilder, value: &str) -> Result<()> {
    builder.start_time = Some(value.to_string());
    Ok(())
}

fn set_stop_time(builder: &mut MetadataBuilder, value: &str) -> Result<()> {
    builder.stop_time = Some(value.to_string());
    Ok(())
}

fn set_step_size(builder: &mut MetadataBuilder, value: &str) -> Result<()> {
    builder.step_size_seconds = Some(parse_step_size(value)?);
    Ok(())
}

fn set_ephemeris_source(builder: &mut MetadataBuilder, value: &str) -> Result<()> {
    builder.ephemeris_source = Some(value.to_string());
    Ok(())
}

/// Extract document metadata and the index of the first data line.
///
/// The returned index points into `lines`, one past the reference-frame marker.
pub fn parse_header(lines: &[SourceLine<'_>]) -> Result<(DocumentMetadata, usize)> {
    let mut builder = MetadataBuilder::default();
    let mut data_start_index = None;

    for (index, line) in lines.iter().enumerate() {
        let trimmed = line.text.trim();

        if FRAME_MARKER.is_match(trimmed) {
            if data_start_index.is_none() {
                let frame = ReferenceFrame::from_token(trimmed).ok_or_else(|| {
                    EphemerisError::UnknownReferenceFrame {
                        token: trimmed.to_string(),
                        line: line.number,
                    }
                })?;
                builder.reference_frame = Some(frame);
                data_start_index = Some(index + 1);
            }
            continue;
        }

        for (label, extract) in EXTRACTORS {
            if let Some(value) = extract_labeled(trimmed, label) {
                extract(&mut builder, value)?;
            }
        }
    }

    let data_start_index = data_start_index.ok_or(EphemerisError::MissingDataSection)?;
    let metadata = builder.build()?;

    debug!(
        "Parsed header: frame={}, step_size={}s, data_start_index={}",
        metadata.reference_frame, metadata.step_size_seconds, data_start_index
    );

    Ok((metadata, data_start_index))
}

/// Value following `label`, up to the end of line or the next known label
fn extract_labeled<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let start = line.find(label)? + label.len();
    let rest = &line[start..];
    let end = HEADER_LABELS
        .iter()
        .filter_map(|other| rest.find(other))
        .min()
        .unwrap_or(rest.len());
    Some(rest[..end].trim())
}

fn parse_step_size(value: &str) -> Result<f64> {
    let invalid = || EphemerisError::InvalidHeaderValue {
        field: "step_size",
        value: value.to_string(),
    };
    let step = value.parse::<f64>().map_err(|_| invalid())?;
    if !step.is_finite() || step <= 0.0 {
        return Err(invalid());
    }
    Ok(step)
}

/// Accumulates header fields while lines are scanned
#[derive(Default)]
struct MetadataBuilder {
    creation_date: Option<String>,
    start_time: Option<String>,
    stop_time: Option<String>,
    step_size_seconds: Option<f64>,
    reference_frame: Option<ReferenceFrame>,
    ephemeris_source: Option<String>,
}

impl MetadataBuilder {
    fn build(self) -> Result<DocumentMetadata> {
        let step_size_seconds = self
            .step_size_seconds
            .ok_or(EphemerisError::MissingHeaderField { field: "step_size" })?;
        let reference_frame = self
            .reference_frame
            .ok_or(EphemerisError::MissingDataSection)?;

        Ok(DocumentMetadata {
            creation_date: self.creation_date,
            start_time: self.start_time,
            stop_time: self.stop_time,
            step_size_seconds,
            reference_frame,
            ephemeris_source: self.ephemeris_source,
            originator: DEFAULT_ORIGINATOR.to_string(),
        })
    }
}

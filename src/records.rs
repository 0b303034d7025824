//! Record stream parsing for the ephemeris data section.
//!
//! The data section is a fixed stride of four lines per epoch: a state line
//! `EPOCH X Y Z X_DOT Y_DOT Z_DOT` followed by three lines of seven
//! covariance terms each.

use crate::constants::{
    COVARIANCE_FIELD_NAMES, COVARIANCE_TERM_COUNT, COVARIANCE_TERMS_PER_LINE, LINES_PER_RECORD,
    STATE_COMPONENT_COUNT, STATE_FIELD_NAMES,
};
use crate::error::{EphemerisError, Result};
use crate::header::SourceLine;
use crate::models::{EphemerisRecord, ReferenceFrame};
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// `YYYYDDDHHMMSS` with optional fractional seconds
static EPOCH_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})(\d{3})(\d{2})(\d{2})(\d{2})(?:\.(\d{1,9}))?$")
        .expect("valid epoch token regex")
});

/// Decode the data section into records, preserving file order.
///
/// A trailing block with fewer than four lines is dropped.
pub fn parse_records(
    lines: &[SourceLine<'_>],
    reference_frame: ReferenceFrame,
) -> Result<Vec<EphemerisRecord>> {
    let mut blocks = lines.chunks_exact(LINES_PER_RECORD);
    let mut records = Vec::with_capacity(lines.len() / LINES_PER_RECORD);

    for block in blocks.by_ref() {
        records.push(parse_block(block, reference_frame)?);
    }

    let remainder = blocks.remainder();
    if let Some(first) = remainder.first() {
        warn!(
            "Dropping incomplete epoch block of {} line(s) starting at line {}",
            remainder.len(),
            first.number
        );
    }

    debug!("Parsed {} ephemeris records", records.len());
    Ok(records)
}

fn parse_block(block: &[SourceLine<'_>], reference_frame: ReferenceFrame) -> Result<EphemerisRecord> {
    let state_line = block[0];
    let fields: Vec<&str> = state_line.text.split_whitespace().collect();

    let epoch_token = fields.first().copied().unwrap_or_default();
    let epoch = decode_epoch(epoch_token).ok_or_else(|| EphemerisError::MalformedRecordLine {
        line: state_line.number,
        field: "EPOCH".to_string(),
        value: epoch_token.to_string(),
    })?;

    reject_extra_tokens(&fields, 1 + STATE_COMPONENT_COUNT, state_line.number)?;

    let mut state = [0.0; STATE_COMPONENT_COUNT];
    for (i, value) in state.iter_mut().enumerate() {
        *value = parse_field(&fields, i + 1, state_line.number, STATE_FIELD_NAMES[i])?;
    }

    let mut terms = [0.0; COVARIANCE_TERM_COUNT];
    for (line_offset, cov_line) in block[1..].iter().enumerate() {
        let fields: Vec<&str> = cov_line.text.split_whitespace().collect();
        reject_extra_tokens(&fields, COVARIANCE_TERMS_PER_LINE, cov_line.number)?;
        for column in 0..COVARIANCE_TERMS_PER_LINE {
            let term = line_offset * COVARIANCE_TERMS_PER_LINE + column;
            terms[term] = parse_field(
                &fields,
                column,
                cov_line.number,
                COVARIANCE_FIELD_NAMES[term],
            )?;
        }
    }

    let [x, y, z, vx, vy, vz] = state;
    Ok(EphemerisRecord::new(
        epoch,
        [x, y, z],
        [vx, vy, vz],
        reference_frame,
        terms,
    ))
}

/// A line carrying more columns than its layout allows is shifted or corrupt
fn reject_extra_tokens(fields: &[&str], expected: usize, line: usize) -> Result<()> {
    match fields.get(expected) {
        Some(extra) => Err(EphemerisError::MalformedRecordLine {
            line,
            field: format!("column {}", expected + 1),
            value: (*extra).to_string(),
        }),
        None => Ok(()),
    }
}

fn parse_field(fields: &[&str], index: usize, line: usize, name: &str) -> Result<f64> {
    let raw = fields.get(index).copied().unwrap_or_default();
    raw.parse::<f64>()
        .map_err(|_| EphemerisError::MalformedRecordLine {
            line,
            field: name.to_string(),
            value: raw.to_string(),
        })
}

/// Decode a `YYYYDDDHHMMSS[.fff]` epoch token into a UTC timestamp.
///
/// Day-of-year is added to January 1st arithmetically, so day 366 of a
/// non-leap year lands on January 1st of the next year. Leap seconds are not
/// representable.
pub fn decode_epoch(token: &str) -> Option<DateTime<Utc>> {
    let caps = EPOCH_TOKEN.captures(token)?;
    let number = |i: usize| caps[i].parse::<u32>().ok();

    let year = caps[1].parse::<i32>().ok()?;
    let day_of_year = number(2)?;
    let (hour, minute, second) = (number(3)?, number(4)?, number(5)?);

    if !(1..=366).contains(&day_of_year) {
        return None;
    }

    let nanos = match caps.get(6) {
        Some(fraction) => format!("{:0<9}", fraction.as_str()).parse::<u32>().ok()?,
        None => 0,
    };

    let date = NaiveDate::from_ymd_opt(year, 1, 1)?
        .checked_add_days(Days::new(u64::from(day_of_year - 1)))?;
    let time = NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)?;

    Some(date.and_time(time).and_utc())
}

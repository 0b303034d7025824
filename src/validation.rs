//! Temporal consistency checks for parsed ephemeris records.

use crate::error::{EphemerisError, Result};
use crate::models::EphemerisRecord;
use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

/// Check that epochs strictly increase by `step_size_seconds`.
///
/// Each record is compared with its predecessor; a gap that differs from the
/// step by more than `tolerance_seconds`, or an epoch that does not advance,
/// fails with the index of the later record.
pub fn validate_records(
    records: &[EphemerisRecord],
    step_size_seconds: f64,
    tolerance_seconds: f64,
) -> Result<()> {
    let step = seconds_to_delta(step_size_seconds);
    let tolerance = seconds_to_delta(tolerance_seconds);

    for (offset, pair) in records.windows(2).enumerate() {
        let previous = pair[0].epoch();
        let actual = pair[1].epoch();
        let expected = previous + step;

        if actual <= previous || (actual - expected).abs() > tolerance {
            return Err(step_size_inconsistency(offset + 1, expected, actual));
        }
    }

    debug!(
        "Validated {} records at {}s spacing",
        records.len(),
        step_size_seconds
    );
    Ok(())
}

fn step_size_inconsistency(
    index: usize,
    expected: DateTime<Utc>,
    actual: DateTime<Utc>,
) -> EphemerisError {
    EphemerisError::StepSizeInconsistency {
        index,
        expected,
        actual,
    }
}

fn seconds_to_delta(seconds: f64) -> TimeDelta {
    TimeDelta::nanoseconds((seconds * 1e9).round() as i64)
}

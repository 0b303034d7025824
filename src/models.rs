//! Core data structures for ephemeris conversion.
//!
//! Defines the filename descriptor, header metadata, state vectors,
//! covariance matrices, the assembled document, and batch statistics.

use crate::constants::COVARIANCE_TERM_COUNT;
use crate::error::FailureKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Operational status codes carried in input filenames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationalStatus {
    Operational,
    Nonoperational,
    PartiallyOperational,
    Backup,
    Spare,
    ExtendedMission,
    Decayed,
    Unknown,
}

impl OperationalStatus {
    /// Map a filename status token to a known code.
    ///
    /// Matching ignores case and `-`, `_` or space separators, so
    /// `Operational`, `non-operational` and `PARTIALLY_OPERATIONAL` all resolve.
    pub fn from_token(token: &str) -> Option<Self> {
        let normalized: String = token
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_uppercase();

        match normalized.as_str() {
            "OPERATIONAL" => Some(Self::Operational),
            "NONOPERATIONAL" => Some(Self::Nonoperational),
            "PARTIALLYOPERATIONAL" => Some(Self::PartiallyOperational),
            "BACKUP" => Some(Self::Backup),
            "SPARE" => Some(Self::Spare),
            "EXTENDEDMISSION" => Some(Self::ExtendedMission),
            "DECAYED" => Some(Self::Decayed),
            "UNKNOWN" => Some(Self::Unknown),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Operational => "OPERATIONAL",
            Self::Nonoperational => "NONOPERATIONAL",
            Self::PartiallyOperational => "PARTIALLY_OPERATIONAL",
            Self::Backup => "BACKUP",
            Self::Spare => "SPARE",
            Self::ExtendedMission => "EXTENDED_MISSION",
            Self::Decayed => "DECAYED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// Coordinate frames recognised on the reference-frame marker line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceFrame {
    Uvw,
    Ric,
    Rsw,
    Rtn,
    Tnw,
    Eme2000,
    Gcrf,
    Icrf,
    Itrf,
    Teme,
}

impl ReferenceFrame {
    /// Look up a marker token in the known frame table
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "UVW" => Some(Self::Uvw),
            "RIC" => Some(Self::Ric),
            "RSW" => Some(Self::Rsw),
            "RTN" => Some(Self::Rtn),
            "TNW" => Some(Self::Tnw),
            "EME2000" | "J2000" => Some(Self::Eme2000),
            "GCRF" => Some(Self::Gcrf),
            "ICRF" => Some(Self::Icrf),
            "ITRF" => Some(Self::Itrf),
            "TEME" => Some(Self::Teme),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uvw => "UVW",
            Self::Ric => "RIC",
            Self::Rsw => "RSW",
            Self::Rtn => "RTN",
            Self::Tnw => "TNW",
            Self::Eme2000 => "EME2000",
            Self::Gcrf => "GCRF",
            Self::Icrf => "ICRF",
            Self::Itrf => "ITRF",
            Self::Teme => "TEME",
        }
    }
}

impl fmt::Display for ReferenceFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifying fields decoded from an input filename
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub tag: String,
    pub catalog_id: String,
    pub object_name: String,
    pub satellite_id: String,
    pub operational_status: OperationalStatus,
    pub epoch_unix_seconds: i64,
    pub classification: String,
}

/// Document-level metadata extracted from header lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub creation_date: Option<String>,
    pub start_time: Option<String>,
    pub stop_time: Option<String>,
    pub step_size_seconds: f64,
    pub reference_frame: ReferenceFrame,
    pub ephemeris_source: Option<String>,
    pub originator: String,
}

/// Position (km) and velocity (km/s) at one epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateVector {
    pub epoch: DateTime<Utc>,
    pub position: [f64; 3],
    pub velocity: [f64; 3],
}

impl StateVector {
    /// Position followed by velocity, in file order
    pub fn components(&self) -> [f64; 6] {
        let [x, y, z] = self.position;
        let [vx, vy, vz] = self.velocity;
        [x, y, z, vx, vy, vz]
    }
}

/// Lower triangle of a symmetric 6x6 covariance over (x, y, z, x_dot, y_dot, z_dot)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CovarianceMatrix {
    pub epoch: DateTime<Utc>,
    pub reference_frame: ReferenceFrame,
    pub terms: [f64; COVARIANCE_TERM_COUNT],
}

impl CovarianceMatrix {
    /// Element at (row, col) of the full symmetric matrix
    pub fn get(&self, row: usize, col: usize) -> f64 {
        let (r, c) = if row >= col { (row, col) } else { (col, row) };
        self.terms[r * (r + 1) / 2 + c]
    }

    /// Expand the stored triangle into the full 6x6 matrix
    pub fn to_full(&self) -> [[f64; 6]; 6] {
        let mut full = [[0.0; 6]; 6];
        for (row, values) in full.iter_mut().enumerate() {
            for (col, value) in values.iter_mut().enumerate() {
                *value = self.get(row, col);
            }
        }
        full
    }
}

/// State vector and covariance sharing one epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EphemerisRecord {
    pub state: StateVector,
    pub covariance: CovarianceMatrix,
}

impl EphemerisRecord {
    /// Pair a state and covariance under a single epoch
    pub fn new(
        epoch: DateTime<Utc>,
        position: [f64; 3],
        velocity: [f64; 3],
        reference_frame: ReferenceFrame,
        terms: [f64; COVARIANCE_TERM_COUNT],
    ) -> Self {
        Self {
            state: StateVector {
                epoch,
                position,
                velocity,
            },
            covariance: CovarianceMatrix {
                epoch,
                reference_frame,
                terms,
            },
        }
    }

    pub fn epoch(&self) -> DateTime<Utc> {
        self.state.epoch
    }
}

/// One input file that could not be converted
#[derive(Debug, Clone)]
pub struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
    pub kind: FailureKind,
}

/// Aggregate outcome of a batch conversion
#[derive(Debug, Default)]
pub struct BatchReport {
    pub total_files: usize,
    pub succeeded: usize,
    pub failures: Vec<FileFailure>,
    pub records_written: usize,
    pub bytes_written: u64,
    pub workers: usize,
    pub workers_lost: usize,
    pub output_dir: PathBuf,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn attempted(&self) -> usize {
        self.succeeded + self.failures.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Percentage of attempted files that converted successfully
    pub fn success_rate(&self) -> f64 {
        if self.attempted() == 0 {
            0.0
        } else {
            self.succeeded as f64 / self.attempted() as f64 * 100.0
        }
    }

    pub fn files_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.attempted() as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Failures of a given class
    pub fn failures_of(&self, kind: FailureKind) -> usize {
        self.failures.iter().filter(|f| f.kind == kind).count()
    }

    /// Generate human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "Files: {} attempted, {} converted, {} failed ({:.1}% success rate)\n\
             Records: {} written ({} bytes)\n\
             Workers: {} started, {} lost\n\
             Duration: {:.2}s",
            self.attempted(),
            self.succeeded,
            self.failed(),
            self.success_rate(),
            self.records_written,
            self.bytes_written,
            self.workers,
            self.workers_lost,
            self.elapsed.as_secs_f64()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_terms() -> [f64; COVARIANCE_TERM_COUNT] {
        let mut terms = [0.0; COVARIANCE_TERM_COUNT];
        for (i, term) in terms.iter_mut().enumerate() {
            *term = i as f64;
        }
        terms
    }

    #[test]
    fn test_operational_status_tokens() {
        assert_eq!(
            OperationalStatus::from_token("Operational"),
            Some(OperationalStatus::Operational)
        );
        assert_eq!(
            OperationalStatus::from_token("non-operational"),
            Some(OperationalStatus::Nonoperational)
        );
        assert_eq!(
            OperationalStatus::from_token("PARTIALLY_OPERATIONAL"),
            Some(OperationalStatus::PartiallyOperational)
        );
        assert_eq!(OperationalStatus::from_token("Retired"), None);
    }

    #[test]
    fn test_reference_frame_table() {
        assert_eq!(ReferenceFrame::from_token("UVW"), Some(ReferenceFrame::Uvw));
        assert_eq!(
            ReferenceFrame::from_token("J2000"),
            Some(ReferenceFrame::Eme2000)
        );
        assert_eq!(ReferenceFrame::from_token("uvw"), None);
        assert_eq!(ReferenceFrame::from_token("XYZ"), None);
    }

    #[test]
    fn test_covariance_symmetric_access() {
        let epoch = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let cov = CovarianceMatrix {
            epoch,
            reference_frame: ReferenceFrame::Uvw,
            terms: sample_terms(),
        };

        // Row 0 has one term, row 1 two, row 5 six
        assert_eq!(cov.get(0, 0), 0.0);
        assert_eq!(cov.get(1, 0), 1.0);
        assert_eq!(cov.get(0, 1), 1.0);
        assert_eq!(cov.get(3, 2), 8.0);
        assert_eq!(cov.get(5, 5), 20.0);

        let full = cov.to_full();
        for row in 0..6 {
            for col in 0..6 {
                assert_eq!(full[row][col], full[col][row]);
            }
        }
    }

    #[test]
    fn test_record_shares_epoch() {
        let epoch = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap();
        let record = EphemerisRecord::new(
            epoch,
            [1.0, 2.0, 3.0],
            [4.0, 5.0, 6.0],
            ReferenceFrame::Uvw,
            sample_terms(),
        );
        assert_eq!(record.state.epoch, record.covariance.epoch);
        assert_eq!(record.state.components(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_batch_report_calculations() {
        let report = BatchReport {
            total_files: 10,
            succeeded: 8,
            failures: vec![
                FileFailure {
                    path: PathBuf::from("a.txt"),
                    reason: "bad".to_string(),
                    kind: FailureKind::Semantic,
                },
                FileFailure {
                    path: PathBuf::from("b.txt"),
                    reason: "lost".to_string(),
                    kind: FailureKind::Fatal,
                },
            ],
            elapsed: Duration::from_secs(5),
            ..Default::default()
        };

        assert_eq!(report.attempted(), 10);
        assert_eq!(report.success_rate(), 80.0);
        assert_eq!(report.files_per_second(), 2.0);
        assert_eq!(report.failures_of(FailureKind::Fatal), 1);
        assert!(report.summary().contains("80.0% success rate"));
    }

    #[test]
    fn test_empty_report() {
        let report = BatchReport::default();
        assert_eq!(report.success_rate(), 0.0);
        assert_eq!(report.files_per_second(), 0.0);
        assert!(!report.has_failures());
    }
}

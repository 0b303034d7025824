//! Application constants for the ephemeris processor
//!
//! Header labels, record layout, and default values used throughout the
//! parsing and conversion pipeline.

// =============================================================================
// Header Labels
// =============================================================================

/// Label for the document creation timestamp
pub const LABEL_CREATED: &str = "created:";

/// Label for the first epoch covered by the file
pub const LABEL_EPHEMERIS_START: &str = "ephemeris_start:";

/// Label for the last epoch covered by the file
pub const LABEL_EPHEMERIS_STOP: &str = "ephemeris_stop:";

/// Label for the nominal spacing between epochs, in seconds
pub const LABEL_STEP_SIZE: &str = "step_size:";

/// Label naming the upstream source of the ephemeris
pub const LABEL_EPHEMERIS_SOURCE: &str = "ephemeris_source:";

/// Every label that can terminate another label's value on the same line
pub const HEADER_LABELS: &[&str] = &[
    LABEL_CREATED,
    LABEL_EPHEMERIS_START,
    LABEL_EPHEMERIS_STOP,
    LABEL_STEP_SIZE,
    LABEL_EPHEMERIS_SOURCE,
];

// =============================================================================
// Record Layout
// =============================================================================

/// Lines per epoch block: one state line followed by three covariance lines
pub const LINES_PER_RECORD: usize = 4;

/// Covariance terms carried on each covariance line
pub const COVARIANCE_TERMS_PER_LINE: usize = 7;

/// Independent terms of a symmetric 6x6 covariance matrix
pub const COVARIANCE_TERM_COUNT: usize = 21;

/// Numeric fields on a state line after the epoch token
pub const STATE_COMPONENT_COUNT: usize = 6;

/// State line field names, in file order
pub const STATE_FIELD_NAMES: &[&str] = &["X", "Y", "Z", "X_DOT", "Y_DOT", "Z_DOT"];

/// Covariance column names, row-major lower triangle over (x, y, z, x_dot, y_dot, z_dot)
pub const COVARIANCE_FIELD_NAMES: [&str; COVARIANCE_TERM_COUNT] = [
    "cx_x",
    "cy_x",
    "cy_y",
    "cz_x",
    "cz_y",
    "cz_z",
    "cx_dot_x",
    "cx_dot_y",
    "cx_dot_z",
    "cx_dot_x_dot",
    "cy_dot_x",
    "cy_dot_y",
    "cy_dot_z",
    "cy_dot_x_dot",
    "cy_dot_y_dot",
    "cz_dot_x",
    "cz_dot_y",
    "cz_dot_z",
    "cz_dot_x_dot",
    "cz_dot_y_dot",
    "cz_dot_z_dot",
];

// =============================================================================
// Filename Layout
// =============================================================================

/// Underscore-delimited tokens in an input file stem (tag plus six fields)
pub const FILENAME_TOKEN_COUNT: usize = 7;

/// Extension of eligible input files
pub const INPUT_EXTENSION: &str = "txt";

/// Default glob applied to input file names
pub const DEFAULT_INPUT_PATTERN: &str = "*.txt";

/// Originator recorded on every converted document
pub const DEFAULT_ORIGINATOR: &str = "SPACEX";

// =============================================================================
// Processing Defaults
// =============================================================================

/// Hard ceiling on worker count regardless of available CPUs
pub const DEFAULT_WORKER_CAP: usize = 64;

/// Largest accepted worker cap; matches tokio's default blocking-thread limit
pub const MAX_WORKER_CAP: usize = 512;

/// Allowed drift between actual and expected epochs, in seconds
pub const DEFAULT_STEP_TOLERANCE_SECS: f64 = 1.0;

//! Fixed values of the candidate file format and the grid.

use std::f64::consts::{FRAC_PI_2, TAU};

/// Last line of every candidate file.
pub const DONE_MARKER: &str = "%DONE";

/// Slack allowed on the sky-angle range checks.
pub const ANGLE_EPSILON: f64 = 1.0e-5;

pub const RIGHT_ASCENSION_MAX: f64 = TAU;
pub const DECLINATION_MAX: f64 = FRAC_PI_2;

/// Number of fields on a record line.
pub const RECORD_FIELD_COUNT: usize = 6;

/// Two offsets per dimension over four dimensions.
pub const REPLICATION_FACTOR: usize = 16;

/// Ceiling on ingested records across all files.
pub const DEFAULT_MAX_CANDIDATES: usize = 8_000_000;

pub const DEFAULT_KAPPA: f64 = 4.3;
pub const DEFAULT_COUNT_THRESHOLD: u32 = 65_536;
pub const DEFAULT_SIGNIFICANCE_THRESHOLD: f64 = 1.0e5;
pub const DEFAULT_BASE_NAME: &str = "Test";

pub const SIGNIFICANT_OUTLIER_SERIES: &str = "polka_significant_outlier_2FofTime";
pub const SIGNIFICANT_OUTLIER_CELLS: &str = "polka_significant_outlier_CellData";
pub const COINCIDENT_OUTLIER_SERIES: &str = "polka_coincident_outlier_2FofTime";
pub const COINCIDENT_OUTLIER_CELLS: &str = "polka_coincident_outlier_CellData";
pub const SKY_MAXIMUM_PER_FREQUENCY: &str = "polka_maxcoincident_over_each_freqcell_and_allsky";

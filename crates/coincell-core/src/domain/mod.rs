pub mod errors;

pub use errors::{
    CoincError, CoincErrorCategory, CoincResult, ExitMapping, IngestResult,
};

use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// One detection claim read from a candidate file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateRecord {
    pub frequency: f64,
    pub right_ascension: f64,
    pub declination: f64,
    pub spin_down: f64,
    pub detection_statistic: f64,
    pub source_file_id: i32,
}

/// Quantized coordinate of a cell in the doubled 4-D grid.
///
/// Field order is the clustering sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GridIndex {
    pub freq: i32,
    pub dec: i32,
    pub ra: i32,
    pub spin: i32,
}

impl Display for GridIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {}, {})", self.freq, self.dec, self.ra, self.spin)
    }
}

/// A candidate copied into one of its 16 sub-cell variants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplicatedCandidate {
    pub record: CandidateRecord,
    pub index: GridIndex,
    pub candidate_id: u32,
}

/// Minimum of each parameter over every ingested record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterMinima {
    pub frequency: f64,
    pub spin_down: f64,
    pub right_ascension: f64,
    pub declination: f64,
    pub source_file_id: i32,
}

impl Default for ParameterMinima {
    fn default() -> Self {
        Self {
            frequency: f64::INFINITY,
            spin_down: f64::INFINITY,
            right_ascension: f64::INFINITY,
            declination: f64::INFINITY,
            source_file_id: i32::MAX,
        }
    }
}

impl ParameterMinima {
    pub fn observe(&mut self, record: &CandidateRecord) {
        self.frequency = self.frequency.min(record.frequency);
        self.spin_down = self.spin_down.min(record.spin_down);
        self.right_ascension = self.right_ascension.min(record.right_ascension);
        self.declination = self.declination.min(record.declination);
        self.source_file_id = self.source_file_id.min(record.source_file_id);
    }

    pub fn merge(&mut self, other: &ParameterMinima) {
        self.frequency = self.frequency.min(other.frequency);
        self.spin_down = self.spin_down.min(other.spin_down);
        self.right_ascension = self.right_ascension.min(other.right_ascension);
        self.declination = self.declination.min(other.declination);
        self.source_file_id = self.source_file_id.min(other.source_file_id);
    }
}

/// Aggregation bucket for every replica sharing one grid coordinate.
///
/// `members` holds candidate ids, one per distinct source file, so
/// `n_candidates == members.len()` once the scan has finished.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub index: GridIndex,
    pub n_candidates: u32,
    pub mean_frequency: f64,
    pub mean_declination: f64,
    pub mean_right_ascension: f64,
    pub mean_spin_down: f64,
    pub significance: f64,
    pub members: Vec<u32>,
}

impl Cell {
    pub fn open(index: GridIndex, first_member: u32) -> Self {
        Self {
            index,
            n_candidates: 1,
            mean_frequency: 0.0,
            mean_declination: 0.0,
            mean_right_ascension: 0.0,
            mean_spin_down: 0.0,
            significance: 0.0,
            members: vec![first_member],
        }
    }
}

/// A file written by a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunArtifact {
    pub path: PathBuf,
}

impl RunArtifact {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::{CandidateRecord, Cell, GridIndex, ParameterMinima};

    fn record(frequency: f64, spin_down: f64, source_file_id: i32) -> CandidateRecord {
        CandidateRecord {
            frequency,
            right_ascension: 1.0,
            declination: -0.3,
            spin_down,
            detection_statistic: 5.0,
            source_file_id,
        }
    }

    #[test]
    fn minima_track_the_smallest_observed_values() {
        let mut minima = ParameterMinima::default();
        minima.observe(&record(101.0, -1.0e-9, 4));
        minima.observe(&record(100.5, -2.0e-9, 7));

        assert_eq!(minima.frequency, 100.5);
        assert_eq!(minima.spin_down, -2.0e-9);
        assert_eq!(minima.declination, -0.3);
        assert_eq!(minima.source_file_id, 4);
    }

    #[test]
    fn grid_index_orders_by_frequency_first() {
        let low = GridIndex { freq: 1, dec: 9, ra: 9, spin: 9 };
        let high = GridIndex { freq: 2, dec: 0, ra: 0, spin: 0 };
        assert!(low < high);
        assert_eq!(low.to_string(), "(1, 9, 9, 9)");
    }

    #[test]
    fn opened_cell_counts_its_first_member() {
        let cell = Cell::open(GridIndex { freq: 0, dec: 0, ra: 0, spin: 0 }, 12);
        assert_eq!(cell.n_candidates, 1);
        assert_eq!(cell.members, vec![12]);
    }
}

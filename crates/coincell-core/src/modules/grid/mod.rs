//! Sixteen-way replication of candidates onto the doubled grid.
//!
//! Each dimension is quantized at half a cell width and every candidate is
//! copied once with the lower and once with the upper neighbouring index, so
//! two candidates closer than one cell width always share at least one cell
//! regardless of where the grid boundary falls.

use crate::common::constants::REPLICATION_FACTOR;
use crate::common::{CellWidths, GridShift};
use crate::domain::{
    CandidateRecord, CoincError, CoincResult, GridIndex, ParameterMinima, ReplicatedCandidate,
};
use tracing::info;

/// Everything replication needs from the configuration and from ingestion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub widths: CellWidths,
    pub shift: GridShift,
    pub kappa: f64,
    pub min_frequency: f64,
    pub min_spin_down: f64,
}

impl GridSpec {
    pub fn new(widths: CellWidths, shift: GridShift, kappa: f64, minima: &ParameterMinima) -> Self {
        Self {
            widths,
            shift,
            kappa,
            min_frequency: minima.frequency,
            min_spin_down: minima.spin_down,
        }
    }

    /// Declination width narrowed towards the poles by the Gaussian sky model.
    pub fn effective_declination_width(&self, declination: f64) -> f64 {
        self.widths.right_ascension
            + self.widths.declination * (-self.kappa * declination * declination).exp()
    }

    /// Lower-offset index of `record`; the 16 replicas add 0 or 1 per dimension.
    pub fn base_index(&self, record: &CandidateRecord) -> CoincResult<GridIndex> {
        let freq = (record.frequency - self.min_frequency) / self.widths.frequency
            + self.shift.frequency;
        let dec = record.declination / self.effective_declination_width(record.declination)
            + self.shift.declination;
        let ra = record.right_ascension * record.declination.cos() / self.widths.right_ascension
            + self.shift.right_ascension;
        let spin = (record.spin_down - self.min_spin_down) / self.widths.spin_down
            + self.shift.spin_down;

        Ok(GridIndex {
            freq: doubled_floor(freq, "frequency", record)?,
            dec: doubled_floor(dec, "declination", record)?,
            ra: doubled_floor(ra, "right ascension", record)?,
            spin: doubled_floor(spin, "spin-down", record)?,
        })
    }
}

fn doubled_floor(scaled: f64, dimension: &str, record: &CandidateRecord) -> CoincResult<i32> {
    let value = (2.0 * scaled).floor();
    // One below the maximum so the +1 offset still fits.
    if !value.is_finite() || value < f64::from(i32::MIN) || value >= f64::from(i32::MAX) {
        return Err(CoincError::resource(
            "RESOURCE.GRID_INDEX_RANGE",
            format!(
                "{} grid index {} of candidate at f={} from source {} does not fit the grid; \
                 increase the cell width",
                dimension, value, record.frequency, record.source_file_id
            ),
        ));
    }
    Ok(value as i32)
}

/// Offset of replica `variant` (0..16) along (freq, dec, ra, spin).
///
/// Frequency is the outermost bit so replicas of one candidate are laid out
/// in the same order as nested loops over the four dimensions.
pub const fn replica_offsets(variant: usize) -> [i32; 4] {
    [
        ((variant >> 3) & 1) as i32,
        ((variant >> 2) & 1) as i32,
        ((variant >> 1) & 1) as i32,
        (variant & 1) as i32,
    ]
}

/// Expands every candidate into its 16 replicas.
///
/// Consumes the input list; it is released as soon as the replicated list exists.
pub fn replicate(
    records: Vec<CandidateRecord>,
    spec: &GridSpec,
) -> CoincResult<Vec<ReplicatedCandidate>> {
    let replicated_len = records
        .len()
        .checked_mul(REPLICATION_FACTOR)
        .filter(|len| u32::try_from(*len).is_ok())
        .ok_or_else(|| {
            CoincError::resource(
                "RESOURCE.REPLICA_COUNT",
                format!(
                    "{} candidates replicated {} times exceed the candidate id range",
                    records.len(),
                    REPLICATION_FACTOR
                ),
            )
        })?;

    let mut replicas = Vec::new();
    replicas.try_reserve_exact(replicated_len).map_err(|source| {
        CoincError::resource(
            "RESOURCE.REPLICA_ALLOC",
            format!(
                "could not allocate memory for {} replicated candidates: {}",
                replicated_len, source
            ),
        )
    })?;

    let mut candidate_id = 0_u32;
    for record in &records {
        let base = spec.base_index(record)?;
        for variant in 0..REPLICATION_FACTOR {
            let [df, dd, da, ds] = replica_offsets(variant);
            replicas.push(ReplicatedCandidate {
                record: *record,
                index: GridIndex {
                    freq: base.freq + df,
                    dec: base.dec + dd,
                    ra: base.ra + da,
                    spin: base.spin + ds,
                },
                candidate_id,
            });
            candidate_id += 1;
        }
    }
    drop(records);

    info!(replicated = replicas.len(), "grid replication complete");
    Ok(replicas)
}

#[cfg(test)]
mod tests {
    use super::{GridSpec, replica_offsets, replicate};
    use crate::common::{CellWidths, GridShift};
    use crate::domain::{
        CandidateRecord, CoincErrorCategory, GridIndex, ParameterMinima, ReplicatedCandidate,
    };
    use std::collections::BTreeSet;

    fn widths() -> CellWidths {
        CellWidths {
            frequency: 0.01,
            right_ascension: 0.01,
            declination: 0.01,
            spin_down: 1.0e-10,
        }
    }

    fn record(frequency: f64, declination: f64) -> CandidateRecord {
        CandidateRecord {
            frequency,
            right_ascension: 1.0,
            declination,
            spin_down: -1.0e-9,
            detection_statistic: 20.0,
            source_file_id: 0,
        }
    }

    fn spec_for(records: &[CandidateRecord]) -> GridSpec {
        let mut minima = ParameterMinima::default();
        for record in records {
            minima.observe(record);
        }
        GridSpec::new(widths(), GridShift::default(), 4.3, &minima)
    }

    fn cells_of(replicas: &[ReplicatedCandidate], first_id: u32) -> BTreeSet<GridIndex> {
        replicas
            .iter()
            .filter(|replica| replica.candidate_id / 16 == first_id / 16)
            .map(|replica| replica.index)
            .collect()
    }

    #[test]
    fn offsets_enumerate_all_sixteen_combinations() {
        let all = (0..16).map(replica_offsets).collect::<BTreeSet<_>>();
        assert_eq!(all.len(), 16);
        assert_eq!(replica_offsets(0), [0, 0, 0, 0]);
        assert_eq!(replica_offsets(8), [1, 0, 0, 0]);
        assert_eq!(replica_offsets(15), [1, 1, 1, 1]);
    }

    #[test]
    fn each_candidate_yields_sixteen_distinct_replicas() {
        let records = vec![record(100.0, 0.2), record(100.5, -0.4)];
        let spec = spec_for(&records);
        let replicas = replicate(records, &spec).expect("replication should succeed");

        assert_eq!(replicas.len(), 32);
        let ids = replicas.iter().map(|replica| replica.candidate_id).collect::<Vec<_>>();
        assert_eq!(ids, (0..32).collect::<Vec<_>>());
        assert_eq!(cells_of(&replicas, 0).len(), 16);
        assert_eq!(cells_of(&replicas, 16).len(), 16);
    }

    #[test]
    fn frequency_index_uses_doubled_grid_from_minimum() {
        let records = vec![record(100.0, 0.2), record(100.026, 0.2)];
        let spec = spec_for(&records);
        let base = spec.base_index(&records[1]).expect("index should compute");
        // 2 * 0.026 / 0.01 = 5.2
        assert_eq!(base.freq, 5);
        assert_eq!(spec.base_index(&records[0]).expect("index").freq, 0);
    }

    #[test]
    fn negative_declination_rounds_down() {
        let records = vec![record(100.0, -0.0001)];
        let spec = spec_for(&records);
        let base = spec.base_index(&records[0]).expect("index should compute");
        assert_eq!(base.dec, -1);
    }

    #[test]
    fn declination_width_narrows_towards_the_poles() {
        let spec = spec_for(&[record(100.0, 0.0)]);
        let equator = spec.effective_declination_width(0.0);
        let pole = spec.effective_declination_width(1.5);
        assert!((equator - 0.02).abs() < 1.0e-15);
        assert!(pole < equator);
        assert!(pole > widths().right_ascension);
    }

    #[test]
    fn shift_moves_the_grid_origin() {
        let records = vec![record(100.0, 0.2)];
        let mut spec = spec_for(&records);
        let unshifted = spec.base_index(&records[0]).expect("index");
        spec.shift.frequency = 0.5;
        let shifted = spec.base_index(&records[0]).expect("index");
        assert_eq!(shifted.freq, unshifted.freq + 1);
    }

    #[test]
    fn candidates_straddling_a_boundary_share_a_cell() {
        let anchor = record(100.0, 0.2);
        let left = CandidateRecord {
            frequency: 100.0099,
            ..anchor
        };
        let right = CandidateRecord {
            frequency: 100.0101,
            ..anchor
        };
        let plain_cell = |candidate: &CandidateRecord| {
            ((candidate.frequency - anchor.frequency) / widths().frequency).floor()
        };
        assert_ne!(plain_cell(&left), plain_cell(&right));

        let records = vec![anchor, left, right];
        let spec = spec_for(&records);
        let replicas = replicate(records, &spec).expect("replication should succeed");
        let left_cells = cells_of(&replicas, 16);
        let right_cells = cells_of(&replicas, 32);
        assert!(
            left_cells.intersection(&right_cells).next().is_some(),
            "straddling candidates should share at least one replicated cell"
        );
    }

    #[test]
    fn unrepresentable_index_is_rejected() {
        let records = vec![record(100.0, 0.2), record(1.0e8, 0.2)];
        let mut spec = spec_for(&records);
        spec.widths.frequency = 1.0e-9;
        let error = replicate(records, &spec).expect_err("huge index should fail");
        assert_eq!(error.category(), CoincErrorCategory::ResourceError);
        assert_eq!(error.placeholder(), "RESOURCE.GRID_INDEX_RANGE");
    }
}

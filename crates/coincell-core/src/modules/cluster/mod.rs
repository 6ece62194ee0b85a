mod model;

use crate::domain::{Cell, CoincError, CoincResult, ReplicatedCandidate};
use std::cmp::Ordering;
use tracing::{debug, info};

pub use model::member_significance;

use model::finalize_cells;

/// Sorted replicas together with the populated cells that reference them.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterOutcome {
    candidates: Vec<ReplicatedCandidate>,
    positions: Vec<u32>,
    cells: Vec<Cell>,
}

impl ClusterOutcome {
    /// Replicas in clustering order.
    pub fn candidates(&self) -> &[ReplicatedCandidate] {
        &self.candidates
    }

    /// Cells in ascending grid-index order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn candidate(&self, candidate_id: u32) -> Option<&ReplicatedCandidate> {
        let position = *self.positions.get(candidate_id as usize)?;
        self.candidates.get(position as usize)
    }

    /// Member replicas of `cell`, in the order they joined it.
    pub fn members<'a>(
        &'a self,
        cell: &'a Cell,
    ) -> impl Iterator<Item = &'a ReplicatedCandidate> + 'a {
        cell.members
            .iter()
            .filter_map(move |candidate_id| self.candidate(*candidate_id))
    }
}

/// Order used by the scan: grid index, then source file, then strongest
/// detection statistic first.
pub fn cluster_order(left: &ReplicatedCandidate, right: &ReplicatedCandidate) -> Ordering {
    left.index
        .cmp(&right.index)
        .then_with(|| left.record.source_file_id.cmp(&right.record.source_file_id))
        .then_with(|| {
            right
                .record
                .detection_statistic
                .total_cmp(&left.record.detection_statistic)
        })
        .then_with(|| left.candidate_id.cmp(&right.candidate_id))
}

/// Groups replicas sharing a grid index into cells.
///
/// Replicas whose detection statistic does not exceed `two_f_threshold` join
/// no cell. Within a cell only the strongest replica of each source file is
/// kept.
pub fn cluster(
    mut replicas: Vec<ReplicatedCandidate>,
    two_f_threshold: f64,
) -> CoincResult<ClusterOutcome> {
    replicas.sort_unstable_by(cluster_order);
    let positions = position_lookup(&replicas)?;

    let mut cells: Vec<Cell> = Vec::new();
    let mut last_source = 0_i32;
    for replica in &replicas {
        if replica.record.detection_statistic <= two_f_threshold {
            continue;
        }
        let source = replica.record.source_file_id;

        match cells.last_mut() {
            Some(cell) if cell.index == replica.index => {
                if source == last_source {
                    continue;
                }
                cell.members.try_reserve(1).map_err(|error| {
                    CoincError::resource(
                        "RESOURCE.MEMBER_ALLOC",
                        format!(
                            "could not grow the member list of cell {}: {}",
                            cell.index, error
                        ),
                    )
                })?;
                cell.members.push(replica.candidate_id);
                cell.n_candidates += 1;
            }
            _ => {
                if cells.len() == cells.capacity() {
                    let additional = cells.capacity().max(1024);
                    cells.try_reserve(additional).map_err(|error| {
                        CoincError::resource(
                            "RESOURCE.CELL_ALLOC",
                            format!(
                                "could not grow the cell array beyond {} cells: {}",
                                cells.len(),
                                error
                            ),
                        )
                    })?;
                    debug!(cells = cells.len(), capacity = cells.capacity(), "grew cell array");
                }
                cells.push(Cell::open(replica.index, replica.candidate_id));
            }
        }
        last_source = source;
    }

    let mut outcome = ClusterOutcome {
        candidates: replicas,
        positions,
        cells,
    };
    finalize_cells(&mut outcome)?;

    info!(
        populated_cells = outcome.cells.len(),
        replicated = outcome.candidates.len(),
        "clustering complete"
    );
    Ok(outcome)
}

fn position_lookup(sorted: &[ReplicatedCandidate]) -> CoincResult<Vec<u32>> {
    let mut positions = Vec::new();
    positions.try_reserve_exact(sorted.len()).map_err(|error| {
        CoincError::resource(
            "RESOURCE.LOOKUP_ALLOC",
            format!(
                "could not allocate the candidate lookup for {} replicas: {}",
                sorted.len(),
                error
            ),
        )
    })?;
    positions.resize(sorted.len(), u32::MAX);

    for (position, replica) in sorted.iter().enumerate() {
        let slot = positions
            .get_mut(replica.candidate_id as usize)
            .ok_or_else(|| duplicate_or_sparse_id(replica.candidate_id, sorted.len()))?;
        if *slot != u32::MAX {
            return Err(duplicate_or_sparse_id(replica.candidate_id, sorted.len()));
        }
        // Bounded by the u32 id range enforced at replication.
        *slot = position as u32;
    }
    Ok(positions)
}

fn duplicate_or_sparse_id(candidate_id: u32, len: usize) -> CoincError {
    CoincError::internal(
        "SYS.CANDIDATE_ID",
        format!(
            "candidate id {} is repeated or outside 0..{}; ids must be dense",
            candidate_id, len
        ),
    )
}

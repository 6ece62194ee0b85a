use crate::domain::Cell;
use std::cmp::Ordering;

/// Read-only orderings over the finalized cell array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellView {
    /// Most corroborated first.
    ByCoincidence,
    /// Most significant first.
    BySignificance,
    /// Frequency index ascending, most corroborated first within a frequency.
    ByFrequency,
}

impl CellView {
    pub fn compare(self, left: &Cell, right: &Cell) -> Ordering {
        match self {
            Self::ByCoincidence => right
                .n_candidates
                .cmp(&left.n_candidates)
                .then_with(|| right.significance.total_cmp(&left.significance)),
            Self::BySignificance => right
                .significance
                .total_cmp(&left.significance)
                .then_with(|| right.n_candidates.cmp(&left.n_candidates)),
            Self::ByFrequency => left
                .index
                .freq
                .cmp(&right.index.freq)
                .then_with(|| right.n_candidates.cmp(&left.n_candidates)),
        }
    }
}

/// Positions into `cells` in `view` order. Ties keep their cell-array order.
pub fn sorted_view(cells: &[Cell], view: CellView) -> Vec<usize> {
    let mut order = (0..cells.len()).collect::<Vec<_>>();
    order.sort_by(|left, right| view.compare(&cells[*left], &cells[*right]));
    order
}

/// Leading run of `order` whose cells exceed both thresholds.
pub fn threshold_dump<'a>(
    cells: &[Cell],
    order: &'a [usize],
    significance_threshold: f64,
    count_threshold: u32,
) -> &'a [usize] {
    let end = order
        .iter()
        .position(|position| {
            let cell = &cells[*position];
            !(cell.significance > significance_threshold && cell.n_candidates > count_threshold)
        })
        .unwrap_or(order.len());
    &order[..end]
}

/// First cell of each frequency index in a [`CellView::ByFrequency`] order.
pub fn sky_maximum_rows(cells: &[Cell], by_frequency: &[usize]) -> Vec<usize> {
    let mut rows = Vec::new();
    let mut previous = None;
    for position in by_frequency {
        let freq = cells[*position].index.freq;
        if previous != Some(freq) {
            rows.push(*position);
        }
        previous = Some(freq);
    }
    rows
}

/// Number of cells holding each coincidence count, from 0 to the maximum.
pub fn coincidence_histogram(cells: &[Cell]) -> Vec<usize> {
    let max = cells.iter().map(|cell| cell.n_candidates).max().unwrap_or(0);
    let mut counts = vec![0_usize; max as usize + 1];
    for cell in cells {
        counts[cell.n_candidates as usize] += 1;
    }
    counts
}

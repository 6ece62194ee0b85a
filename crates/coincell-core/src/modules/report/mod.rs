mod model;

pub use model::{CellView, coincidence_histogram, sky_maximum_rows, sorted_view, threshold_dump};

use super::cluster::ClusterOutcome;
use super::serialization::{format_fixed_f64, format_scientific_f64};
use crate::common::OutputSelection;
use crate::common::constants::{
    COINCIDENT_OUTLIER_CELLS, COINCIDENT_OUTLIER_SERIES, SIGNIFICANT_OUTLIER_CELLS,
    SIGNIFICANT_OUTLIER_SERIES, SKY_MAXIMUM_PER_FREQUENCY,
};
use crate::domain::{Cell, GridIndex};
use serde::Serialize;
use std::fmt::Write as _;
use tracing::info;

const CELL_ROW_HEADER: &str = "freq [Hz]\tdec [rad]\tra [rad]\tF1dot [Hz/s]\t#[events]\tSig";
const MEMBER_ROW_HEADER: &str = "freq [Hz]\tdec [rad]\tra [rad]\tF1dot [Hz/s]\t2F";

/// An auxiliary artifact rendered in memory, written under the output directory.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedArtifact {
    pub file_name: &'static str,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterReport {
    /// Every cell in coincidence order.
    pub primary: String,
    pub auxiliary: Vec<RenderedArtifact>,
    pub summary: RunSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CellSummary {
    pub index: GridIndex,
    pub n_candidates: u32,
    pub mean_frequency: f64,
    pub mean_declination: f64,
    pub mean_right_ascension: f64,
    pub mean_spin_down: f64,
    pub significance: f64,
}

impl From<&Cell> for CellSummary {
    fn from(cell: &Cell) -> Self {
        Self {
            index: cell.index,
            n_candidates: cell.n_candidates,
            mean_frequency: cell.mean_frequency,
            mean_declination: cell.mean_declination,
            mean_right_ascension: cell.mean_right_ascension,
            mean_spin_down: cell.mean_spin_down,
            significance: cell.significance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MemberSummary {
    pub source_file_id: i32,
    pub frequency: f64,
    pub declination: f64,
    pub right_ascension: f64,
    pub spin_down: f64,
    pub detection_statistic: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub populated_cells: usize,
    pub replicated_candidates: usize,
    pub most_significant: Option<CellSummary>,
    pub most_coincident: Option<CellSummary>,
    pub most_coincident_members: Vec<MemberSummary>,
    /// Entry `n` counts the cells holding `n` coincident candidates.
    pub coincidence_histogram: Vec<usize>,
    /// Rows written to the coincident outlier files, `None` when they were not opened.
    pub coincident_outliers: Option<usize>,
    pub significant_outliers: Option<usize>,
    pub sky_maximum_rows: usize,
}

/// Renders every artifact and the run summary from the finalized cells.
pub fn build_report(outcome: &ClusterOutcome, selection: OutputSelection) -> ClusterReport {
    let cells = outcome.cells();
    let by_coincidence = sorted_view(cells, CellView::ByCoincidence);
    let by_significance = sorted_view(cells, CellView::BySignificance);
    let by_frequency = sorted_view(cells, CellView::ByFrequency);

    let most_coincident = by_coincidence.first().map(|position| &cells[*position]);
    let most_significant = by_significance.first().map(|position| &cells[*position]);

    let (coincident_rows, significant_rows) = match selection {
        OutputSelection::Auto => (
            Some(leading_row(&by_coincidence)),
            Some(leading_row(&by_significance)),
        ),
        OutputSelection::Thresholds {
            count,
            significance,
        } => (
            most_coincident
                .is_some_and(|cell| cell.n_candidates >= count)
                .then(|| threshold_dump(cells, &by_coincidence, 0.0, count)),
            most_significant
                .is_some_and(|cell| cell.significance > significance)
                .then(|| threshold_dump(cells, &by_significance, significance, 0)),
        ),
    };

    let mut auxiliary = Vec::new();
    if let Some(rows) = coincident_rows {
        auxiliary.push(RenderedArtifact {
            file_name: COINCIDENT_OUTLIER_CELLS,
            content: render_cell_rows(cells, rows),
        });
        auxiliary.push(RenderedArtifact {
            file_name: COINCIDENT_OUTLIER_SERIES,
            content: render_member_series(outcome, rows),
        });
    }
    if let Some(rows) = significant_rows {
        auxiliary.push(RenderedArtifact {
            file_name: SIGNIFICANT_OUTLIER_CELLS,
            content: render_cell_rows(cells, rows),
        });
        auxiliary.push(RenderedArtifact {
            file_name: SIGNIFICANT_OUTLIER_SERIES,
            content: render_member_series(outcome, rows),
        });
    }
    let sky_rows = sky_maximum_rows(cells, &by_frequency);
    auxiliary.push(RenderedArtifact {
        file_name: SKY_MAXIMUM_PER_FREQUENCY,
        content: render_cell_rows(cells, &sky_rows),
    });

    let most_coincident_members = most_coincident
        .map(|cell| {
            outcome
                .members(cell)
                .map(|member| MemberSummary {
                    source_file_id: member.record.source_file_id,
                    frequency: member.record.frequency,
                    declination: member.record.declination,
                    right_ascension: member.record.right_ascension,
                    spin_down: member.record.spin_down,
                    detection_statistic: member.record.detection_statistic,
                })
                .collect()
        })
        .unwrap_or_default();

    let summary = RunSummary {
        populated_cells: cells.len(),
        replicated_candidates: outcome.candidates().len(),
        most_significant: most_significant.map(CellSummary::from),
        most_coincident: most_coincident.map(CellSummary::from),
        most_coincident_members,
        coincidence_histogram: coincidence_histogram(cells),
        coincident_outliers: coincident_rows.map(<[usize]>::len),
        significant_outliers: significant_rows.map(<[usize]>::len),
        sky_maximum_rows: sky_rows.len(),
    };
    info!(
        populated_cells = summary.populated_cells,
        replicated = summary.replicated_candidates,
        auxiliary = auxiliary.len(),
        "report rendered"
    );

    ClusterReport {
        primary: render_cell_rows(cells, &by_coincidence),
        auxiliary,
        summary,
    }
}

/// Human-readable run summary in the `%`-prefixed layout of the cell dumps.
pub fn render_summary(summary: &RunSummary) -> String {
    let mut text = String::new();
    match (&summary.most_significant, &summary.most_coincident) {
        (Some(significant), Some(coincident)) => {
            let _ = writeln!(text, "% Most significant cell : {}", CELL_ROW_HEADER);
            let _ = write!(text, "%\t\t\t  {}", cell_row(significant));
            let _ = writeln!(text, "% Most coincident cell  : {}", CELL_ROW_HEADER);
            let _ = write!(text, "%\t\t\t  {}", cell_row(coincident));
        }
        _ => {
            let _ = writeln!(text, "% No cell holds a candidate above the detection threshold");
        }
    }

    let _ = writeln!(text, "% # of coincidences: ");
    for count in 0..summary.coincidence_histogram.len() {
        let _ = write!(text, "{:7}", count);
    }
    let _ = writeln!(text);
    let _ = writeln!(text, "% # of cells       : ");
    for cells in &summary.coincidence_histogram {
        let _ = write!(text, "{:7}", cells);
    }
    let _ = writeln!(text);

    let _ = writeln!(text, "%");
    let _ = writeln!(text, "% Candidates of most coincident cell : ");
    let _ = writeln!(text, "% {}", MEMBER_ROW_HEADER);
    for member in &summary.most_coincident_members {
        let _ = writeln!(
            text,
            "  {}\t{}\t{}\t{}\t{}",
            format_fixed_f64(member.frequency, 0, 8),
            format_fixed_f64(member.declination, 0, 6),
            format_fixed_f64(member.right_ascension, 0, 6),
            format_scientific_f64(member.spin_down, 6),
            format_fixed_f64(member.detection_statistic, 0, 4),
        );
    }
    let _ = writeln!(
        text,
        "% Number of populated cells: {} \t Length of replicated list: {}",
        summary.populated_cells, summary.replicated_candidates
    );
    text
}

fn leading_row(order: &[usize]) -> &[usize] {
    &order[..order.len().min(1)]
}

fn cell_row(cell: &CellSummary) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}\n",
        format_fixed_f64(cell.mean_frequency, 0, 8),
        format_fixed_f64(cell.mean_declination, 0, 6),
        format_fixed_f64(cell.mean_right_ascension, 0, 6),
        format_scientific_f64(cell.mean_spin_down, 6),
        cell.n_candidates,
        format_fixed_f64(cell.significance, 0, 6),
    )
}

fn render_cell_rows(cells: &[Cell], rows: &[usize]) -> String {
    rows.iter()
        .map(|position| cell_row(&CellSummary::from(&cells[*position])))
        .collect()
}

/// `rank sourceFileId 2F` per member, where rank is the cell's place in its view.
fn render_member_series(outcome: &ClusterOutcome, rows: &[usize]) -> String {
    let cells = outcome.cells();
    let mut text = String::new();
    for (rank, position) in rows.iter().enumerate() {
        for member in outcome.members(&cells[*position]) {
            let _ = writeln!(
                text,
                "{}\t{}\t{}",
                rank,
                member.record.source_file_id,
                format_fixed_f64(member.record.detection_statistic, 0, 6)
            );
        }
    }
    text
}

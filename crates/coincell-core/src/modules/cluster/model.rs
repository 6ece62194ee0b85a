use super::ClusterOutcome;
use crate::domain::{CoincError, CoincResult};

/// Contribution of one member with detection statistic `s` to the cell
/// significance, `s/2 - ln(1 + s/2)`.
pub fn member_significance(detection_statistic: f64) -> f64 {
    let half = 0.5 * detection_statistic;
    half - half.ln_1p()
}

/// Fills in significance and mean coordinates of every cell.
pub(super) fn finalize_cells(outcome: &mut ClusterOutcome) -> CoincResult<()> {
    let ClusterOutcome {
        candidates,
        positions,
        cells,
    } = outcome;

    for cell in cells.iter_mut() {
        let mut significance = 0.0;
        let mut sum_frequency = 0.0;
        let mut sum_declination = 0.0;
        let mut sum_right_ascension = 0.0;
        let mut sum_spin_down = 0.0;

        for candidate_id in &cell.members {
            let member = positions
                .get(*candidate_id as usize)
                .and_then(|position| candidates.get(*position as usize))
                .ok_or_else(|| {
                    CoincError::internal(
                        "SYS.CELL_MEMBER",
                        format!(
                            "cell {} references unknown candidate id {}",
                            cell.index, candidate_id
                        ),
                    )
                })?;
            let record = &member.record;
            significance += member_significance(record.detection_statistic);
            sum_frequency += record.frequency;
            sum_declination += record.declination;
            sum_right_ascension += record.right_ascension;
            sum_spin_down += record.spin_down;
        }

        if cell.members.len() != cell.n_candidates as usize {
            return Err(CoincError::internal(
                "SYS.CELL_COUNT",
                format!(
                    "cell {} counts {} candidates but lists {} members",
                    cell.index,
                    cell.n_candidates,
                    cell.members.len()
                ),
            ));
        }

        let count = f64::from(cell.n_candidates);
        cell.significance = significance;
        cell.mean_frequency = sum_frequency / count;
        cell.mean_declination = sum_declination / count;
        cell.mean_right_ascension = sum_right_ascension / count;
        cell.mean_spin_down = sum_spin_down / count;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::member_significance;

    #[test]
    fn member_significance_is_positive_and_increasing() {
        assert_eq!(member_significance(0.0), 0.0);
        let values = [0.5, 2.0, 20.0, 200.0].map(member_significance);
        assert!(values[0] > 0.0);
        assert!(values.windows(2).all(|pair| pair[1] > pair[0]));
    }

    #[test]
    fn member_significance_matches_closed_form() {
        let expected = 10.0 - 11.0_f64.ln();
        assert!((member_significance(20.0) - expected).abs() < 1.0e-12);
    }
}

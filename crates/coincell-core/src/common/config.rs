//! Run configuration passed explicitly into every phase.

use super::constants::{
    DEFAULT_COUNT_THRESHOLD, DEFAULT_KAPPA, DEFAULT_MAX_CANDIDATES,
    DEFAULT_SIGNIFICANCE_THRESHOLD,
};
use crate::domain::{CoincError, CoincResult};
use serde::{Deserialize, Serialize};

/// Cell width along each grid dimension, before the factor-two doubling.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CellWidths {
    pub frequency: f64,
    pub right_ascension: f64,
    pub declination: f64,
    pub spin_down: f64,
}

/// Parallel shift of the grid origin, in units of one cell width.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GridShift {
    pub frequency: f64,
    pub right_ascension: f64,
    pub declination: f64,
    pub spin_down: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum OutputSelection {
    /// Always emit the top cell of the coincidence and significance views.
    Auto,
    Thresholds { count: u32, significance: f64 },
}

impl Default for OutputSelection {
    fn default() -> Self {
        Self::Thresholds {
            count: DEFAULT_COUNT_THRESHOLD,
            significance: DEFAULT_SIGNIFICANCE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub widths: CellWidths,
    pub shift: GridShift,
    pub kappa: f64,
    pub two_f_threshold: f64,
    pub selection: OutputSelection,
    pub max_candidates: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            widths: CellWidths::default(),
            shift: GridShift::default(),
            kappa: DEFAULT_KAPPA,
            two_f_threshold: 0.0,
            selection: OutputSelection::default(),
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }
}

impl ClusterConfig {
    pub fn with_widths(widths: CellWidths) -> Self {
        Self {
            widths,
            ..Self::default()
        }
    }

    /// Rejects settings that would make the grid or the thresholds meaningless.
    pub fn validate(&self) -> CoincResult<()> {
        let widths = [
            ("frequency", self.widths.frequency),
            ("right ascension", self.widths.right_ascension),
            ("declination", self.widths.declination),
            ("spin-down", self.widths.spin_down),
        ];
        for (name, width) in widths {
            if !width.is_finite() || width <= 0.0 {
                return Err(CoincError::configuration(
                    "CONFIG.CELL_WIDTH",
                    format!("{} cell width must be a positive finite number, got {}", name, width),
                ));
            }
        }

        let shifts = [
            ("frequency", self.shift.frequency),
            ("right ascension", self.shift.right_ascension),
            ("declination", self.shift.declination),
            ("spin-down", self.shift.spin_down),
        ];
        for (name, shift) in shifts {
            if !shift.is_finite() {
                return Err(CoincError::configuration(
                    "CONFIG.GRID_SHIFT",
                    format!("{} grid shift must be finite, got {}", name, shift),
                ));
            }
        }

        if !self.kappa.is_finite() || self.kappa < 0.0 {
            return Err(CoincError::configuration(
                "CONFIG.KAPPA",
                format!(
                    "declination tuning exponent must be a non-negative finite number, got {}",
                    self.kappa
                ),
            ));
        }

        if !self.two_f_threshold.is_finite() || self.two_f_threshold < 0.0 {
            return Err(CoincError::configuration(
                "CONFIG.TWO_F_THRESHOLD",
                format!(
                    "detection-statistic threshold must be a non-negative finite number, got {}",
                    self.two_f_threshold
                ),
            ));
        }

        if let OutputSelection::Thresholds { significance, .. } = self.selection {
            if !significance.is_finite() {
                return Err(CoincError::configuration(
                    "CONFIG.SIGNIFICANCE_THRESHOLD",
                    format!("significance threshold must be finite, got {}", significance),
                ));
            }
        }

        if self.max_candidates == 0 {
            return Err(CoincError::configuration(
                "CONFIG.MAX_CANDIDATES",
                "candidate ceiling must be at least 1",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{CellWidths, ClusterConfig, OutputSelection};
    use crate::domain::CoincErrorCategory;

    fn widths() -> CellWidths {
        CellWidths {
            frequency: 0.01,
            right_ascension: 0.01,
            declination: 0.01,
            spin_down: 1.0e-10,
        }
    }

    #[test]
    fn default_thresholds_follow_legacy_values() {
        let config = ClusterConfig::default();
        assert_eq!(config.kappa, 4.3);
        assert_eq!(
            config.selection,
            OutputSelection::Thresholds {
                count: 65_536,
                significance: 1.0e5
            }
        );
        assert_eq!(config.max_candidates, 8_000_000);
    }

    #[test]
    fn default_widths_are_rejected() {
        let error = ClusterConfig::default()
            .validate()
            .expect_err("zero widths should be rejected");
        assert_eq!(error.category(), CoincErrorCategory::ConfigurationError);
        assert_eq!(error.placeholder(), "CONFIG.CELL_WIDTH");
    }

    #[test]
    fn explicit_widths_validate() {
        ClusterConfig::with_widths(widths())
            .validate()
            .expect("positive widths should validate");
    }

    #[test]
    fn non_finite_shift_is_rejected() {
        let mut config = ClusterConfig::with_widths(widths());
        config.shift.declination = f64::NAN;
        let error = config.validate().expect_err("NaN shift should fail");
        assert_eq!(error.placeholder(), "CONFIG.GRID_SHIFT");
    }

    #[test]
    fn negative_statistic_threshold_is_rejected() {
        let mut config = ClusterConfig::with_widths(widths());
        config.two_f_threshold = -1.0;
        let error = config.validate().expect_err("negative threshold should fail");
        assert_eq!(error.placeholder(), "CONFIG.TWO_F_THRESHOLD");
    }

    #[test]
    fn selection_serializes_with_mode_tag() {
        let json = serde_json::to_string(&OutputSelection::Auto).expect("selection serializes");
        assert_eq!(json, r#"{"mode":"auto"}"#);
    }
}

//! Typed delineation parameters.
//!
//! Defaults match a 1000 Hz vector-magnitude lead in microvolts. The flat,
//! string-keyed configuration table lives in `twave-config`, which converts into
//! [`DelineationParams`].

use serde::{Deserialize, Serialize};

/// How threshold crossings and true peaks are found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FinderMode {
    /// Sweep of moving zero-crossing lines over the derivative.
    #[default]
    MovingThreshold,
    /// Sign changes of the first and second derivative.
    DerivativeWalk,
}

impl FinderMode {
    /// Numeric code used in configuration files (1 or 2).
    pub fn code(self) -> i64 {
        match self {
            FinderMode::MovingThreshold => 1,
            FinderMode::DerivativeWalk => 2,
        }
    }

    /// Parses a configuration code.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(FinderMode::MovingThreshold),
            2 => Some(FinderMode::DerivativeWalk),
            _ => None,
        }
    }
}

/// Decision-tree thresholds of the slur classifier.
///
/// Row 0 holds the angle split, row 1 the keep rule for shallow slurs and row 2
/// the amplitude-ratio rule for steep slurs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureThresholds(pub [[f64; 3]; 3]);

impl FeatureThresholds {
    /// Threshold at `row`, `column`.
    pub fn get(&self, row: usize, column: usize) -> f64 {
        self.0[row][column]
    }
}

impl Default for FeatureThresholds {
    fn default() -> Self {
        Self([[20.0, 0.0, 0.0], [10.0, 10.0, 1.5], [0.0, 0.0, 1.7]])
    }
}

/// Parameters placing the T segment inside a record and pre-filtering the lead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentParams {
    /// Length of the T segment as a fraction of RR.
    pub approximate_range_of_t_segment: f64,
    /// Latest accepted offset, as a fraction of RR after the segment start.
    pub approximate_boundary_of_toff: f64,
    /// Butterworth order; zero disables the pre-filter.
    pub filter_order: usize,
    /// Butterworth cutoff in Hz.
    pub filter_high_cutoff: f64,
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self {
            approximate_range_of_t_segment: 0.4,
            approximate_boundary_of_toff: 0.75,
            filter_order: 5,
            filter_high_cutoff: 25.0,
        }
    }
}

/// Every threshold the pipeline consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelineationParams {
    /// Candidate discovery strategy.
    pub finder: FinderMode,
    /// Threshold lines per unit of derivative in the moving sweep.
    pub delta_step_slope: f64,
    /// Points examined when deciding whether a gap splits two candidates.
    pub loose_window: usize,
    /// Minimum rising-range width of a candidate.
    pub min_points: usize,
    /// Samples within this amplitude of the maximum form the peak.
    pub delta_amplitude: f64,
    /// Main peak amplitude below which weak candidates are dropped.
    pub min_voltage_main_peak: f64,
    /// Fraction of the main peak a candidate must reach when the main peak is weak.
    pub percent_main_peak: f64,
    /// Amplitude floor of the secondary-peak test.
    pub min_voltage: f64,
    /// Fraction of the main peak used by the secondary-peak test.
    pub percent_peak: f64,
    /// Largest accepted drop from the main peak to another peak.
    pub max_delta_amplitude_notches: f64,
    /// Valley depth below which adjacent candidates merge.
    pub min_amplitude_flatness: f64,
    /// Valley depth below which a secondary peak becomes a slurred peak.
    pub min_valid_amplitude_peak: f64,
    /// Main peak amplitude below which the signal is flagged non-measurable.
    pub measurable_voltage: f64,
    /// Slur classifier thresholds.
    pub feature_thresholds: FeatureThresholds,
    /// Record-level placement and pre-filter.
    pub segment: SegmentParams,
}

impl Default for DelineationParams {
    fn default() -> Self {
        Self {
            finder: FinderMode::MovingThreshold,
            delta_step_slope: 10.0,
            loose_window: 10,
            min_points: 10,
            delta_amplitude: 5.0,
            min_voltage_main_peak: 150.0,
            percent_main_peak: 0.8,
            min_voltage: 100.0,
            percent_peak: 0.3,
            max_delta_amplitude_notches: 50.0,
            min_amplitude_flatness: 7.0,
            min_valid_amplitude_peak: 7.0,
            measurable_voltage: 100.0,
            feature_thresholds: FeatureThresholds::default(),
            segment: SegmentParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finder_codes() {
        assert_eq!(FinderMode::from_code(1), Some(FinderMode::MovingThreshold));
        assert_eq!(FinderMode::from_code(2), Some(FinderMode::DerivativeWalk));
        assert_eq!(FinderMode::from_code(3), None);
        assert_eq!(FinderMode::DerivativeWalk.code(), 2);
    }

    #[test]
    fn default_feature_table() {
        let t = FeatureThresholds::default();
        assert_eq!(t.get(0, 0), 20.0);
        assert_eq!(t.get(1, 2), 1.5);
        assert_eq!(t.get(2, 2), 1.7);
    }
}

//! Candidate filtering, relabelling and merging rules.
//!
//! Every rule reads the candidate list as left by the previous one. Filtering
//! rules return the indices to drop and leave removal to the caller, so each
//! stage's hit count can be recorded before the list changes.

use crate::candidate::{Candidate, CandidateLabel, Span};
use crate::geometry::Bisector;
use crate::params::{DelineationParams, FeatureThresholds};

/// Margin a secondary peak must clear in the low-amplitude test.
const LOW_AMPLITUDE_MARGIN: f64 = 5e-3;

/// Radians to degrees with the rounded pi the classifier thresholds were fitted with.
const CLASSIFIER_DEGREES: f64 = 180.0 / 3.1415;

/// Slopes with a difference at or below this are treated as parallel.
const PARALLEL_SLOPES: f64 = 1e-10;

/// Thresholds consumed by the rule stages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleEngine {
    min_points: usize,
    min_voltage_main_peak: f64,
    percent_main_peak: f64,
    min_voltage: f64,
    percent_peak: f64,
    max_delta_amplitude_notches: f64,
    min_amplitude_flatness: f64,
    min_valid_amplitude_peak: f64,
    measurable_voltage: f64,
    feature_thresholds: FeatureThresholds,
}

impl RuleEngine {
    /// Takes the rule thresholds out of `params`.
    pub fn new(params: &DelineationParams) -> Self {
        Self {
            min_points: params.min_points,
            min_voltage_main_peak: params.min_voltage_main_peak,
            percent_main_peak: params.percent_main_peak,
            min_voltage: params.min_voltage,
            percent_peak: params.percent_peak,
            max_delta_amplitude_notches: params.max_delta_amplitude_notches,
            min_amplitude_flatness: params.min_amplitude_flatness,
            min_valid_amplitude_peak: params.min_valid_amplitude_peak,
            measurable_voltage: params.measurable_voltage,
            feature_thresholds: params.feature_thresholds,
        }
    }

    // --- filtering ---

    /// Candidates whose rising range is narrower than `min_points`.
    pub fn few_points(&self, candidates: &[Candidate]) -> Vec<usize> {
        indices_where(candidates, |c| c.rising.width() < self.min_points)
    }

    /// When the main peak is below `min_voltage_main_peak`, every candidate below
    /// `percent_main_peak` of it.
    pub fn low_amplitude_main_peak(&self, candidates: &[Candidate]) -> Vec<usize> {
        let main = main_peak_amplitude(candidates);
        if main >= self.min_voltage_main_peak {
            return Vec::new();
        }
        let floor = main * self.percent_main_peak;
        indices_where(candidates, |c| c.y < floor)
    }

    /// Peaks that fail the percentage test against the main peak.
    ///
    /// Above `min_voltage` both amplitudes are measured from that floor; below it
    /// the peak must reach `1 - percent_peak` of the main peak.
    pub fn low_amplitude_peaks(&self, candidates: &[Candidate]) -> Vec<usize> {
        let main = main_peak_amplitude(candidates);
        let floor = self.min_voltage;
        indices_where(candidates, |c| {
            if !c.is_peak() {
                return false;
            }
            let shortfall = if main > floor {
                (main - floor) * self.percent_peak - (c.y - floor)
            } else {
                main * (1.0 - self.percent_peak) - c.y
            };
            shortfall > LOW_AMPLITUDE_MARGIN
        })
    }

    /// Peaks more than `max_delta_amplitude_notches` below the main peak.
    pub fn inconsistent_peaks(&self, candidates: &[Candidate]) -> Vec<usize> {
        let main = main_peak_amplitude(candidates);
        indices_where(candidates, |c| {
            c.is_peak() && main - c.y > self.max_delta_amplitude_notches
        })
    }

    /// Slurs that are attached to no peak.
    pub fn unrelated_slurs(&self, candidates: &[Candidate]) -> Vec<usize> {
        indices_where(candidates, |c| c.label == CandidateLabel::SlurUnrelated)
    }

    /// Directional slurs the decision rules classify as spurious, in ascending order.
    ///
    /// Three features compare the slur with its peak neighbour: the angle between
    /// the slur's own edges, the angle between the slur's and the peak's facing
    /// edges, and the ratio of peak amplitude to the slur's bisector amplitude.
    pub fn slur_classifier(&self, candidates: &[Candidate]) -> Vec<usize> {
        let t = &self.feature_thresholds;
        let rising = indices_where(candidates, |c| c.label == CandidateLabel::SlurRising);
        let falling = indices_where(candidates, |c| c.label == CandidateLabel::SlurFalling);

        let mut spurious = Vec::new();
        for s in rising.into_iter().chain(falling) {
            let slur = &candidates[s];
            let neighbour = match slur.label {
                CandidateLabel::SlurRising => s + 1,
                _ => s.wrapping_sub(1),
            };
            let Some(peak) = candidates.get(neighbour) else {
                continue;
            };

            let own_angle =
                (degrees(slur.rising_edge.slope) - degrees(slur.falling_edge.slope)).abs();
            let facing_angle = if slur.label == CandidateLabel::SlurRising {
                (degrees(peak.rising_edge.slope) - degrees(slur.rising_edge.slope)).abs()
            } else {
                (degrees(peak.falling_edge.slope) - degrees(slur.falling_edge.slope)).abs()
            };
            let ratio = peak.y / slur.y_origin;

            let bad = if own_angle < t.get(0, 0) {
                !(own_angle > t.get(1, 0) && facing_angle > t.get(1, 1) && ratio < t.get(1, 2))
            } else {
                ratio > t.get(2, 2)
            };
            if bad {
                spurious.push(s);
            }
        }
        spurious.sort_unstable();
        spurious
    }

    // --- merging ---

    /// Merges adjacent candidates separated by a shallow valley.
    ///
    /// A pair merges when neither is an unrelated slur, they are not both
    /// directional slurs, and both the valley at their edge intersection and their
    /// amplitude difference are below `min_amplitude_flatness`. The merged peak
    /// takes the left rising edge and the right falling edge and can merge again
    /// with its right neighbour. Returns the new list and the number of merged pairs.
    pub fn merge_candidates(
        &self,
        wave: &[f64],
        candidates: Vec<Candidate>,
    ) -> (Vec<Candidate>, usize) {
        let mut merged: Vec<Candidate> = Vec::with_capacity(candidates.len());
        let mut pairs = 0;

        for right in candidates {
            let Some(left) = merged.last() else {
                merged.push(right);
                continue;
            };
            if self.should_merge(wave, left, &right) {
                let joined = merge_pair(wave, left, &right);
                merged.pop();
                merged.push(joined);
                pairs += 1;
            } else {
                merged.push(right);
            }
        }
        (merged, pairs)
    }

    fn should_merge(&self, wave: &[f64], left: &Candidate, right: &Candidate) -> bool {
        let unrelated = CandidateLabel::SlurUnrelated;
        if left.label == unrelated || right.label == unrelated {
            return false;
        }
        if left.label.is_directional_slur() && right.label.is_directional_slur() {
            return false;
        }
        let valley = wave.get(intersection(left, right)).copied().unwrap_or(0.0);
        left.y.max(right.y) - valley < self.min_amplitude_flatness
            && (left.y - right.y).abs() < self.min_amplitude_flatness
    }

    // --- relabelling ---

    /// Peaks beyond the main and second peaks, to be relabelled [`CandidateLabel::PeakUnrelated`].
    pub fn extra_peaks(&self, candidates: &[Candidate]) -> Vec<usize> {
        let peaks = indices_where(candidates, Candidate::is_peak);
        if peaks.is_empty() {
            return Vec::new();
        }
        let amplitudes: Vec<f64> = peaks.iter().map(|&i| candidates[i].y).collect();
        let main = first_max(&amplitudes);
        let second = second_peak(&amplitudes, main);

        peaks
            .into_iter()
            .enumerate()
            .filter(|(k, _)| *k != main && Some(*k) != second)
            .map(|(_, i)| i)
            .collect()
    }

    /// Secondary peaks with a flank shallower than `min_valid_amplitude_peak`, to be
    /// relabelled [`CandidateLabel::SluredPeak`].
    ///
    /// The left flank is tested first; the right flank only when the left passes.
    pub fn slurred_peaks(&self, wave: &[f64], candidates: &[Candidate]) -> Vec<usize> {
        let Some((main, _)) = main_peak(candidates) else {
            return Vec::new();
        };
        let depth = |p: usize, a: &Candidate, b: &Candidate| {
            let valley = wave.get(intersection(a, b)).copied().unwrap_or(0.0);
            candidates[p].y - valley
        };

        let mut slurred = Vec::new();
        for p in indices_where(candidates, Candidate::is_peak) {
            if p == main {
                continue;
            }
            if p > 0 && depth(p, &candidates[p - 1], &candidates[p]) < self.min_valid_amplitude_peak
            {
                slurred.push(p);
                continue;
            }
            if p + 1 < candidates.len()
                && depth(p, &candidates[p], &candidates[p + 1]) < self.min_valid_amplitude_peak
            {
                slurred.push(p);
            }
        }
        slurred
    }

    /// True when the main peak, or zero without peaks, is below `measurable_voltage`.
    pub fn is_non_measurable(&self, candidates: &[Candidate]) -> bool {
        main_peak_amplitude(candidates) < self.measurable_voltage
    }
}

/// Index and amplitude of the first tallest [`CandidateLabel::Peak`].
pub fn main_peak(candidates: &[Candidate]) -> Option<(usize, f64)> {
    let peaks = indices_where(candidates, Candidate::is_peak);
    if peaks.is_empty() {
        return None;
    }
    let amplitudes: Vec<f64> = peaks.iter().map(|&i| candidates[i].y).collect();
    let best = first_max(&amplitudes);
    Some((peaks[best], amplitudes[best]))
}

fn main_peak_amplitude(candidates: &[Candidate]) -> f64 {
    main_peak(candidates).map_or(0.0, |(_, y)| y)
}

/// Sample where the facing edges of two candidates meet.
///
/// The earlier candidate's falling edge is intersected with the later one's rising
/// edge. Parallel or diverging edges, and meetings outside
/// `[first.rising.end, second.rising.end]`, fall back to sample 0.
pub fn intersection(first: &Candidate, second: &Candidate) -> usize {
    let (gap, slope_gap) = if second.x > first.x {
        (
            first.falling_edge.intercept - second.rising_edge.intercept,
            second.rising_edge.slope - first.falling_edge.slope,
        )
    } else {
        (
            second.falling_edge.intercept - first.rising_edge.intercept,
            first.rising_edge.slope - second.falling_edge.slope,
        )
    };

    let x = if slope_gap > PARALLEL_SLOPES {
        (gap / slope_gap).abs().ceil()
    } else {
        -1.0
    };

    let lower = first.rising.end as f64;
    let upper = second.rising.end as f64;
    if x < lower || x > upper || x.is_nan() {
        0
    } else {
        x as usize
    }
}

/// Removes the candidates at `indices`; duplicates and out-of-range indices are ignored.
pub fn remove_indices(candidates: &mut Vec<Candidate>, indices: &[usize]) {
    if indices.is_empty() {
        return;
    }
    let mut position = 0;
    candidates.retain(|_| {
        let keep = !indices.contains(&position);
        position += 1;
        keep
    });
}

/// Sets the label of the candidates at `indices`.
pub fn relabel(candidates: &mut [Candidate], indices: &[usize], label: CandidateLabel) {
    for &i in indices {
        if let Some(c) = candidates.get_mut(i) {
            c.label = label;
        }
    }
}

fn merge_pair(wave: &[f64], left: &Candidate, right: &Candidate) -> Candidate {
    let x = (left.x + right.x) / 2;
    let half_flatness = ((left.flatness + right.flatness) as f64 / 2.0).round() as usize;

    let mut joined = Candidate {
        label: CandidateLabel::Peak,
        rising: Span::new(left.rising.start, right.rising.end),
        range: left.range.union(&right.range),
        rising_edge: left.rising_edge,
        falling_edge: right.falling_edge,
        x,
        y: wave.get(x).copied().unwrap_or(0.0),
        flatness: (right.x + 1).saturating_sub(left.x) + half_flatness,
        ..Candidate::default()
    };

    let bisector = Bisector::of(joined.rising_edge, joined.falling_edge);
    let end = joined.range.end.min(wave.len().saturating_sub(1));
    if joined.range.start <= end {
        let (x_origin, y_origin) =
            bisector.meet(&wave[joined.range.start..=end], joined.range.start);
        joined.x_origin = x_origin;
        joined.y_origin = y_origin;
    }
    joined.skewness = bisector.skewness;
    joined.update_distortion();
    joined
}

/// Second peak: the taller of the first maxima on either side of `main`.
fn second_peak(amplitudes: &[f64], main: usize) -> Option<usize> {
    let n = amplitudes.len();
    let left = (main > 0).then(|| first_max(&amplitudes[..main]));
    let right = (main + 1 < n).then(|| main + 1 + first_max(&amplitudes[main + 1..]));
    match (left, right) {
        (Some(l), Some(r)) => Some(if amplitudes[l] > amplitudes[r] { l } else { r }),
        (l, r) => l.or(r),
    }
}

fn first_max(values: &[f64]) -> usize {
    crate::stats::first_argmax(values)
}

fn degrees(slope: f64) -> f64 {
    slope.atan() * CLASSIFIER_DEGREES
}

fn indices_where(candidates: &[Candidate], predicate: impl Fn(&Candidate) -> bool) -> Vec<usize> {
    candidates
        .iter()
        .enumerate()
        .filter_map(|(i, c)| predicate(c).then_some(i))
        .collect()
}

//! Per-candidate geometry: edge fits, bisector peak and amplitude peak.
//!
//! Each candidate gets two least-squares lines, one around the steepest rise and
//! one around the steepest fall. The bisector of their angles, intersected with
//! the wave, gives the "origin" peak. Its angle against 89.5° is the skewness.
//! The amplitude peak is the middle of the samples near the maximum; the
//! distance between the two peaks is the distortion.

use crate::candidate::{Candidate, EdgeLine};
use crate::stats::{first_argmax, first_argmin};

/// Samples on each side of the steepest point used for an edge fit.
pub const FIT_HALF_WINDOW: usize = 5;

/// Regression denominators at or below this magnitude yield a flat line.
const MIN_DIVISOR: f64 = 1e-4;

/// Rounded pi used for the bisector angle; the classifier thresholds were tuned with it.
const BISECTOR_PI: f64 = 3.1416;

/// Fits the geometry of candidates.
#[derive(Debug, Clone, Copy)]
pub struct GeometryEngine {
    delta_amplitude: f64,
}

impl GeometryEngine {
    /// Creates an engine; samples within `delta_amplitude` of a maximum form its peak.
    pub fn new(delta_amplitude: f64) -> Self {
        Self { delta_amplitude }
    }

    /// Returns `candidate` with edges, peaks and shape metrics filled in.
    ///
    /// Label and spans are unchanged. Coordinates are those of `wave`.
    pub fn fit(&self, wave: &[f64], derivative: &[f64], candidate: &Candidate) -> Candidate {
        let mut fitted = candidate.clone();
        let start = candidate.range.start;
        let end = candidate.range.end;

        let segment = &wave[start..=end];
        let slopes = &derivative[start..end.min(derivative.len())];
        let rising_start = candidate.rising.start - start;
        let rising_end = candidate.rising.end - start;

        let (x, y, flatness) =
            amplitude_peak(&segment[rising_start..=rising_end], self.delta_amplitude);
        fitted.x = x + rising_start + start;
        fitted.y = y;
        fitted.flatness = flatness;

        if slopes.is_empty() {
            // Single-sample span: no edges to fit.
            fitted.rising_edge = EdgeLine::default();
            fitted.falling_edge = EdgeLine::default();
            fitted.x_origin = fitted.x;
            fitted.y_origin = fitted.y;
            fitted.skewness = 0.0;
            fitted.update_distortion();
            return fitted;
        }

        let turn = rising_end.min(slopes.len() - 1);
        let steepest_rise = first_argmax(&slopes[..=turn]);
        let steepest_fall = turn + first_argmin(&slopes[turn..]);

        let rising = fit_edge(segment, steepest_rise);
        let falling = fit_edge(segment, steepest_fall);

        let bisector = Bisector::of(rising, falling);
        let (x_origin, y_origin) =
            bisector.meet(&segment[steepest_rise..=steepest_fall], steepest_rise);

        fitted.rising_edge = rising.shifted(start);
        fitted.falling_edge = falling.shifted(start);
        fitted.x_origin = x_origin + start;
        fitted.y_origin = y_origin;
        fitted.skewness = bisector.skewness;
        fitted.update_distortion();
        fitted
    }
}

fn fit_edge(segment: &[f64], center: usize) -> EdgeLine {
    let lo = center.saturating_sub(FIT_HALF_WINDOW);
    let hi = (center + FIT_HALF_WINDOW).min(segment.len() - 1);
    linear_regression(&segment[lo..=hi], lo)
}

/// Ordinary least squares of `y` against `x = first_x, first_x + 1, ...`.
///
/// Degenerate fits (denominator magnitude at or below `1e-4`) return a zero line.
pub fn linear_regression(y: &[f64], first_x: usize) -> EdgeLine {
    let n = y.len() as f64;
    let mut sx = 0.0;
    let mut sxx = 0.0;
    let mut sy = 0.0;
    let mut sxy = 0.0;
    for (i, &value) in y.iter().enumerate() {
        let x = (first_x + i) as f64;
        sx += x;
        sxx += x * x;
        sy += value;
        sxy += x * value;
    }

    let divisor = n * sxx - sx * sx;
    if divisor.abs() > MIN_DIVISOR {
        EdgeLine::new((n * sxy - sx * sy) / divisor, (sxx * sy - sx * sxy) / divisor)
    } else {
        EdgeLine::default()
    }
}

/// Line bisecting the angle between a rising and a falling edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bisector {
    /// The bisecting line, through the edges' intersection.
    pub line: EdgeLine,
    /// `89.5° - bisector angle`.
    pub skewness: f64,
}

impl Bisector {
    /// Bisector of `rising` and `falling`.
    ///
    /// Parallel edges intersect at `x = 0`. A bisector of exactly 90° is replaced by
    /// `atan(100)` to keep the slope finite.
    pub fn of(rising: EdgeLine, falling: EdgeLine) -> Self {
        let slope_gap = rising.slope - falling.slope;
        let x = if slope_gap != 0.0 {
            (falling.intercept - rising.intercept) / slope_gap
        } else {
            0.0
        };
        let y = rising.slope * x + rising.intercept;

        let mut angle =
            90.0 + (rising.angle_deg(BISECTOR_PI) + falling.angle_deg(BISECTOR_PI)) / 2.0;
        if angle == 90.0 {
            angle = 100.0f64.atan() * 180.0 / BISECTOR_PI;
        }

        let slope = (angle * BISECTOR_PI / 180.0).tan();
        Self {
            line: EdgeLine::new(slope, y - slope * x),
            skewness: 89.5 - angle,
        }
    }

    /// Where the bisector meets `wave`, a slice starting at `shift` in the line's
    /// coordinates. Returns `(x, y)` with `x` in the same coordinates.
    ///
    /// The error is measured at one-based positions and the sample is read at the
    /// matching zero-based index clamped to the slice, so the result sits one sample
    /// right of the closest error.
    pub fn meet(&self, wave: &[f64], shift: usize) -> (usize, f64) {
        let n = wave.len();
        let mut best = 0;
        let mut best_error = f64::INFINITY;
        for (i, &value) in wave.iter().enumerate() {
            let x = (i + 1 + shift) as f64;
            let error = (self.line.slope * x + self.line.intercept - value).powi(2);
            if error < best_error {
                best_error = error;
                best = i;
            }
        }
        let x = (best + 1).min(n - 1);
        (x + shift, wave[x])
    }
}

/// Middle of the samples within `delta` of the maximum: `(index, value, count)`.
pub fn amplitude_peak(wave: &[f64], delta: f64) -> (usize, f64, usize) {
    let max = wave.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let near_max: Vec<usize> = wave
        .iter()
        .enumerate()
        .filter_map(|(i, &v)| (v >= max - delta).then_some(i))
        .collect();
    if near_max.is_empty() {
        return (0, wave.first().copied().unwrap_or(0.0), 0);
    }
    let middle = (near_max.len() as f64 / 2.0).round() as usize;
    let x = near_max[middle.saturating_sub(1)];
    (x, wave[x], near_max.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::Span;

    // --- regression ---

    #[test]
    fn regression_recovers_line() {
        let y: Vec<f64> = (4..10).map(|x| 3.0 * x as f64 - 2.0).collect();
        let line = linear_regression(&y, 4);
        assert!((line.slope - 3.0).abs() < 1e-9);
        assert!((line.intercept + 2.0).abs() < 1e-9);
    }

    #[test]
    fn single_point_regression_is_flat() {
        assert_eq!(linear_regression(&[5.0], 7), EdgeLine::default());
    }

    // --- bisector ---

    #[test]
    fn symmetric_edges_give_vertical_bisector() {
        // y = x and y = -x + 20 meet at (10, 10).
        let b = Bisector::of(EdgeLine::new(1.0, 0.0), EdgeLine::new(-1.0, 20.0));
        let expected = 100.0f64.atan() * 180.0 / BISECTOR_PI;
        assert!((b.skewness - (89.5 - expected)).abs() < 1e-9);
        // Steep line through (10, 10).
        assert!((b.line.slope * 10.0 + b.line.intercept - 10.0).abs() < 1e-6);
        assert!(b.line.slope > 50.0);
    }

    #[test]
    fn asymmetric_edges_tilt_bisector() {
        let b = Bisector::of(EdgeLine::new(2.0, 0.0), EdgeLine::new(-0.5, 10.0));
        // atan(2) = 63.4°, atan(-0.5) = -26.6° -> bisector ~108.4°
        assert!(b.skewness < -15.0 && b.skewness > -25.0, "{}", b.skewness);
    }

    #[test]
    fn meet_reads_one_past_closest_error() {
        let b = Bisector {
            line: EdgeLine::new(0.0, 4.0),
            skewness: 0.0,
        };
        let wave = [0.0, 1.0, 4.0, 9.0, 16.0];
        // Closest at one-based position 3 (value 4.0); sample read at index 3.
        assert_eq!(b.meet(&wave, 10), (13, 9.0));
        // Clamped to the last sample.
        let b = Bisector {
            line: EdgeLine::new(0.0, 16.0),
            skewness: 0.0,
        };
        assert_eq!(b.meet(&wave, 0), (4, 16.0));
    }

    // --- amplitude peak ---

    #[test]
    fn amplitude_peak_takes_middle_of_plateau() {
        let wave = [0.0, 8.0, 10.0, 9.0, 9.5, 2.0];
        // near max (>= 5.0): indices 1..=4, middle = round(4/2) - 1 = 1 -> index 2
        assert_eq!(amplitude_peak(&wave, 5.0), (2, 10.0, 4));
        assert_eq!(amplitude_peak(&[3.0], 1.0), (0, 3.0, 1));
    }

    // --- engine ---

    /// Rise with slope 5 to 100 at index 20, then fall with slope -5.
    fn triangle() -> Vec<f64> {
        (0..=40)
            .map(|i| {
                if i <= 20 {
                    5.0 * i as f64
                } else {
                    100.0 - 5.0 * (i - 20) as f64
                }
            })
            .collect()
    }

    #[test]
    fn fit_triangle() {
        let wave = triangle();
        let derivative = crate::stats::diff(&wave);
        let mut c = Candidate::new(Span::new(0, 40), Span::new(15, 25));
        c.label = crate::candidate::CandidateLabel::Peak;

        let fitted = GeometryEngine::new(5.0).fit(&wave, &derivative, &c);
        assert_eq!(fitted.label, c.label);
        assert!((fitted.rising_edge.slope - 5.0).abs() < 1e-9);
        assert!((fitted.falling_edge.slope + 5.0).abs() < 1e-9);
        assert_eq!(fitted.x, 20);
        assert_eq!(fitted.y, 100.0);
        assert_eq!(fitted.flatness, 3);
        assert!(fitted.rising_edge.zero_crossing().unwrap().abs() < 1e-9);
        assert!((fitted.falling_edge.zero_crossing().unwrap() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn fit_respects_segment_offset() {
        let mut wave = vec![0.0; 100];
        wave.extend(triangle());
        let derivative = crate::stats::diff(&wave);
        let c = Candidate::new(Span::new(100, 140), Span::new(115, 125));

        let fitted = GeometryEngine::new(5.0).fit(&wave, &derivative, &c);
        assert_eq!(fitted.x, 120);
        assert!((fitted.rising_edge.zero_crossing().unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn single_sample_span_is_flat() {
        let wave = [1.0, 2.0, 3.0];
        let derivative = crate::stats::diff(&wave);
        let c = Candidate::new(Span::new(1, 1), Span::new(1, 1));
        let fitted = GeometryEngine::new(5.0).fit(&wave, &derivative, &c);
        assert_eq!(fitted.x, 1);
        assert_eq!(fitted.rising_edge, EdgeLine::default());
        assert_eq!(fitted.distortion, 0.0);
    }
}

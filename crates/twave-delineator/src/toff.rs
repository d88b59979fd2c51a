//! Energy-based correction of the T-wave offset.
//!
//! The tail from the last candidate to the current offset is turned into a
//! running "energy": falling samples subtract their amplitude, rising samples add
//! it. Each local energy minimum proposes an offset, which is pulled back to the
//! strongest turn of the energy slope before it. The proposal with the lowest
//! `energy + distance` cost wins.

use crate::result::DelineationResult;
use crate::stats::{diff, first_argmin, smooth};

/// Half-width of the derivative smoothing window.
const DERIVATIVE_SMOOTHING: usize = 5;

/// Decimal resolution of the smoothed energy slope.
const SLOPE_RESOLUTION: f64 = 1e4;

/// Slope changes within this tolerance count as a turn.
const TURN_TOLERANCE: f64 = 1e-3;

/// Normalized energy range.
const ENERGY_SCALE: f64 = 100.0;

/// Corrects offsets found by the delineator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToffRefiner;

impl ToffRefiner {
    /// Creates a refiner.
    pub fn new() -> Self {
        Self
    }

    /// Refined offset of `result` on the full `wave`, or `None` when the
    /// delineation cannot be trusted.
    ///
    /// `rr` is the RR interval and `rpeak` the R-peak index, both in samples.
    /// No correction is made without peaks, when a peak lies past the offset,
    /// or when the first peak precedes the R peak.
    pub fn readjust(
        &self,
        wave: &[f64],
        result: &DelineationResult,
        rr: f64,
        rpeak: f64,
    ) -> Option<usize> {
        let first = result.peaks.first()?;
        let off = result.off?;
        let last = result.last_candidate?;
        if first.index as i64 > off || (first.index as f64) < rpeak || wave.is_empty() {
            return None;
        }
        let mut reference = *wave.get(first.index)?;
        if let Some(second) = result.peaks.get(1) {
            if second.index as i64 > off {
                return None;
            }
            reference = reference.max(*wave.get(second.index)?);
        }

        let toff = usize::try_from(off).ok()?.min(wave.len() - 1);
        if toff < last {
            return None;
        }

        let lower = last + (toff - last) / 2;
        let adjusted = wave[lower..=toff]
            .iter()
            .position(|&v| v > reference)
            .map_or(toff, |i| lower + i);

        let refined = self.new_offset(&wave[last..=adjusted], rr, rpeak, last);
        tracing::debug!(toff, adjusted, ?refined, "offset refinement");
        Some(refined.filter(|&t| t > 0).unwrap_or(adjusted))
    }

    /// Lowest-cost offset candidate in `segment`, which starts at sample `last`.
    ///
    /// Returns `None` for segments too short or too flat to carry an energy minimum.
    pub fn new_offset(&self, segment: &[f64], rr: f64, rpeak: f64, last: usize) -> Option<usize> {
        if segment.len() < 2 {
            return None;
        }
        let slopes = diff(segment);
        let slopes = smooth(&slopes, DERIVATIVE_SMOOTHING.min(slopes.len()));

        let (energy, minima) = energy_profile(segment, &slopes);
        let max = energy.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = energy.iter().copied().fold(f64::INFINITY, f64::min);
        if minima.is_empty() || max <= min {
            return None;
        }
        let normal: Vec<f64> = energy
            .iter()
            .map(|e| ENERGY_SCALE * (e - min) / (max - min))
            .collect();
        let energy_slope = diff(&normal);

        let start = normal
            .windows(2)
            .position(|w| w[0] > w[1])
            .unwrap_or(0);

        let mut candidates = Vec::with_capacity(minima.len());
        let mut from = start;
        for &minimum in &minima {
            let (lo, hi) = if from > minimum {
                (minimum, from)
            } else {
                (from, minimum)
            };
            let steepest = lo + first_argmin(&slopes[lo..=hi]);
            let (mut t1, t2) = if steepest > minimum {
                (minimum, steepest)
            } else {
                (steepest, minimum)
            };
            if t1 == t2 {
                t1 = t1.saturating_sub(1);
            }
            if t1 < t2 && t2 <= energy_slope.len() {
                candidates.push(t1 + strongest_turn(&energy_slope[t1..t2]));
            }
            from = minimum + 1;
        }

        let reference = last as f64 - rpeak;
        let span = rr - reference;
        let cost = |c: usize| {
            let distance = if span.abs() > f64::EPSILON {
                c as f64 / span
            } else {
                0.0
            };
            normal[c] / ENERGY_SCALE + distance
        };

        let mut best: Option<(usize, f64)> = None;
        for c in candidates {
            let value = cost(c);
            if best.is_none_or(|(_, b)| value < b) {
                best = Some((c, value));
            }
        }
        best.map(|(c, _)| last + c)
    }
}

/// Running energy of `segment` and the last index of each falling run.
fn energy_profile(segment: &[f64], slopes: &[f64]) -> (Vec<f64>, Vec<usize>) {
    let mut energy = vec![0.0; slopes.len()];
    let mut minima: Vec<usize> = Vec::new();
    energy[0] = segment[0];

    let mut after_rise = true;
    for i in 1..slopes.len() {
        if slopes[i] < 0.0 {
            energy[i] = energy[i - 1] - segment[i];
            match minima.last_mut() {
                Some(m) if !after_rise => *m = i,
                _ => minima.push(i),
            }
            after_rise = false;
        } else if slopes[i] > 0.0 {
            energy[i] = energy[i - 1] + segment[i];
            after_rise = true;
        } else {
            energy[i] = energy[i - 1];
        }
    }
    (energy, minima)
}

/// Index of the strongest turn of a smoothed, quantized energy slope.
///
/// Falls back to the last index when no turn beats the sample at index 1.
fn strongest_turn(slope: &[f64]) -> usize {
    let smoothed = smooth(slope, slope.len() / 10 + 1);
    let quantized: Vec<f64> = smoothed
        .iter()
        .map(|v| (v * SLOPE_RESOLUTION).floor() / SLOPE_RESOLUTION)
        .collect();

    let mut best = 1;
    let mut turning = false;
    for k in 1..quantized.len() {
        let change = quantized[k - 1] - quantized[k];
        if change < -TURN_TOLERANCE {
            turning = false;
        }
        if change > -TURN_TOLERANCE && !turning {
            turning = true;
            if quantized[k] > quantized[best] {
                best = k;
            }
        }
    }
    if best == 1 {
        quantized.len() - 1
    } else {
        best
    }
}

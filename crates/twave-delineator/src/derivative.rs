//! Candidate discovery on the first derivative of the T segment.
//!
//! Two strategies mark where the wave turns over:
//!
//! - [`FinderMode::MovingThreshold`] sweeps horizontal lines across the derivative
//!   at `1 / delta_step_slope` spacing and records every downward crossing. Only the
//!   three lines around zero slope mark true peaks.
//! - [`FinderMode::DerivativeWalk`] checks the derivative at three fixed offsets
//!   (0, 0.1, 0.2) and marks the falling stretches of the derivative itself.
//!
//! Differences are truncated after scaling, so values closer than one step to a
//! line count as flat. A flat run that directly precedes a downward crossing is
//! folded into that crossing; a flat run followed by a rise is discarded.

use crate::params::FinderMode;
use crate::stats::{diff, sign};

const WALK_OFFSETS: [f64; 3] = [0.0, 0.1, 0.2];
const WALK_SCALE: f64 = 100.0;

/// Output of one derivative scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivativeScan {
    /// First derivative of the wave (`wave[i+1] - wave[i]`).
    pub derivative: Vec<f64>,
    /// `wave[i+1]` where any line registered a crossing at `i`, zero elsewhere.
    pub crossing_amplitudes: Vec<f64>,
    /// Ascending indices of true local peaks.
    pub peak_positions: Vec<usize>,
}

/// Computes the derivative and scans it for crossings and peaks.
#[derive(Debug, Clone, Copy)]
pub struct DerivativeAnalyzer {
    mode: FinderMode,
    delta_step_slope: f64,
}

impl DerivativeAnalyzer {
    /// Creates an analyzer; `delta_step_slope` only affects the moving sweep.
    pub fn new(mode: FinderMode, delta_step_slope: f64) -> Self {
        Self {
            mode,
            delta_step_slope,
        }
    }

    /// Scans `wave`. Waves shorter than 3 samples produce an empty scan.
    pub fn analyze(&self, wave: &[f64]) -> DerivativeScan {
        let derivative = diff(wave);
        if derivative.len() < 2 {
            return DerivativeScan {
                derivative,
                ..DerivativeScan::default()
            };
        }

        let marks = match self.mode {
            FinderMode::MovingThreshold => moving_threshold(&derivative, self.delta_step_slope),
            FinderMode::DerivativeWalk => derivative_walk(&derivative),
        };

        let crossing_amplitudes = marks
            .crossed
            .iter()
            .enumerate()
            .map(|(i, &hit)| if hit { wave[i + 1] } else { 0.0 })
            .collect();
        let peak_positions = marks
            .peaks
            .iter()
            .enumerate()
            .filter_map(|(i, &hit)| hit.then_some(i))
            .collect();

        tracing::trace!(
            mode = ?self.mode,
            crossings = marks.crossed.iter().filter(|c| **c).count(),
            "derivative scan"
        );

        DerivativeScan {
            derivative,
            crossing_amplitudes,
            peak_positions,
        }
    }
}

/// Union of crossing and peak marks over every line, one slot per derivative pair.
struct Marks {
    crossed: Vec<bool>,
    peaks: Vec<bool>,
}

impl Marks {
    fn new(len: usize) -> Self {
        Self {
            crossed: vec![false; len],
            peaks: vec![false; len],
        }
    }
}

/// Threshold lines of the moving sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SweepGrid {
    /// Topmost line.
    starting: f64,
    /// Number of lines, top to bottom inclusive.
    lines: usize,
    /// Index of the zero-slope line.
    zero_line: i64,
}

impl SweepGrid {
    fn new(max: f64, min: f64, delta: f64) -> Self {
        let starting = (max * delta).trunc() / delta;
        let ending = (min * delta).trunc() / delta;
        // Both bounds sit on the line grid; rounding absorbs representation error.
        Self {
            starting,
            lines: ((starting - ending) * delta).round() as usize + 1,
            zero_line: (starting * delta).round() as i64,
        }
    }
}

fn moving_threshold(derivative: &[f64], delta: f64) -> Marks {
    let mut marks = Marks::new(derivative.len() - 1);

    let max = derivative.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = derivative.iter().copied().fold(f64::INFINITY, f64::min);
    let grid = SweepGrid::new(max, min, delta);
    let (starting, lines, zero_line) = (grid.starting, grid.lines, grid.zero_line);

    let quantize = |value: f64, origin: f64| sign(((value - origin) * delta).trunc());

    // Pending flat samples of the current line, resolved by the next non-flat sample.
    let mut flat_run: Vec<usize> = Vec::new();
    for j in 0..lines {
        let origin = starting - j as f64 / delta;
        let near_zero = (j as i64 - zero_line).abs() <= 1;
        let mut rising = true;
        flat_run.clear();

        for i in 1..derivative.len() {
            let current = quantize(derivative[i], origin);
            let previous = quantize(derivative[i - 1], origin);
            match current {
                1 => {
                    rising = true;
                    flat_run.clear();
                }
                0 => match previous {
                    1 => flat_run.push(i - 1),
                    0 if rising => flat_run.push(i - 1),
                    -1 => rising = false,
                    _ => {}
                },
                _ => {
                    let crossing = previous == 1 || (previous == 0 && rising);
                    if crossing {
                        marks.crossed[i - 1] = true;
                        if near_zero {
                            marks.peaks[i - 1] = true;
                        }
                        if previous == 0 {
                            for &k in &flat_run {
                                marks.crossed[k] = true;
                                if near_zero {
                                    marks.peaks[k] = true;
                                }
                            }
                        }
                    }
                    rising = false;
                    flat_run.clear();
                }
            }
        }
    }
    marks
}

fn derivative_walk(derivative: &[f64]) -> Marks {
    let mut marks = Marks::new(derivative.len() - 1);
    let mut flat_run: Vec<usize> = Vec::new();

    for offset in WALK_OFFSETS {
        let mut rising = true;
        let mut above = true;
        flat_run.clear();

        for i in 1..derivative.len() {
            let current = ((derivative[i] - offset) * WALK_SCALE).trunc();
            let previous = ((derivative[i - 1] - offset) * WALK_SCALE).trunc();
            let (sc, sp) = (sign(current), sign(previous));

            // Local maxima of the wave: derivative falls through the offset.
            match sc {
                1 => {
                    above = true;
                    flat_run.clear();
                }
                0 => {
                    if above {
                        flat_run.push(i - 1);
                    }
                }
                _ => {
                    if sp == 1 || (sp == 0 && above) {
                        marks.peaks[i - 1] = true;
                        for &k in &flat_run {
                            marks.peaks[k] = true;
                        }
                    }
                    above = false;
                    flat_run.clear();
                }
            }

            // Candidate extent: derivative non-increasing after a fall.
            match sign(current - previous) {
                1 => rising = true,
                0 => {
                    if !rising {
                        marks.crossed[i - 1] = true;
                    }
                }
                _ => {
                    if !rising {
                        marks.crossed[i - 1] = true;
                    }
                    rising = false;
                }
            }
        }
    }
    marks
}

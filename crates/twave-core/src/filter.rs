//! Butterworth low-pass filtering for ECG pre-processing.
//!
//! The designer cascades second-order sections, each using the RBJ cookbook
//! low-pass with the Q of one Butterworth pole pair, plus a first-order
//! bilinear section when the order is odd. [`filtfilt`] runs the cascade forward
//! and backward for a zero-phase response.

use crate::{Error, Result};
use std::f64::consts::PI;

/// Highest supported filter order.
pub const MAX_ORDER: usize = 8;

/// Second-order IIR section.
///
/// Implements the Direct Form I structure:
/// ```text
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2]
///                - a1*y[n-1] - a2*y[n-2]
/// ```
#[derive(Debug, Clone)]
pub struct Biquad {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,

    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

impl Biquad {
    /// Creates a passthrough section.
    pub fn new() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Sets coefficients, normalizing by `a0`.
    pub fn set_coefficients(&mut self, b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) {
        let a0_inv = 1.0 / a0;
        self.b0 = b0 * a0_inv;
        self.b1 = b1 * a0_inv;
        self.b2 = b2 * a0_inv;
        self.a1 = a1 * a0_inv;
        self.a2 = a2 * a0_inv;
    }

    /// Filters one sample.
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let output = self.b0 * input + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    /// Clears the delay lines.
    pub fn clear(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

impl Default for Biquad {
    fn default() -> Self {
        Self::new()
    }
}

/// RBJ cookbook low-pass coefficients `(b0, b1, b2, a0, a1, a2)`.
pub fn lowpass_coefficients(cutoff: f64, q: f64, fs: f64) -> (f64, f64, f64, f64, f64, f64) {
    let omega = 2.0 * PI * cutoff / fs;
    let cos_omega = omega.cos();
    let alpha = omega.sin() / (2.0 * q);

    let b0 = (1.0 - cos_omega) / 2.0;
    let b1 = 1.0 - cos_omega;
    let b2 = (1.0 - cos_omega) / 2.0;
    let a0 = 1.0 + alpha;
    let a1 = -2.0 * cos_omega;
    let a2 = 1.0 - alpha;

    (b0, b1, b2, a0, a1, a2)
}

/// Cascaded Butterworth low-pass filter.
#[derive(Debug, Clone)]
pub struct ButterworthLowpass {
    order: usize,
    sections: Vec<Biquad>,
}

impl ButterworthLowpass {
    /// Designs an `order`-pole low-pass at `cutoff` Hz for sample rate `fs`.
    pub fn new(order: usize, cutoff: f64, fs: f64) -> Result<Self> {
        if order == 0 || order > MAX_ORDER {
            return Err(Error::InvalidFilterOrder {
                order,
                max: MAX_ORDER,
            });
        }
        if !(fs.is_finite() && fs > 0.0) {
            return Err(Error::InvalidSamplingFrequency(fs));
        }
        let nyquist = fs / 2.0;
        if !(cutoff > 0.0 && cutoff < nyquist) {
            return Err(Error::InvalidCutoff { cutoff, nyquist });
        }

        let mut sections = Vec::with_capacity(order.div_ceil(2));
        for k in 0..order / 2 {
            let theta = PI * (2 * k + 1) as f64 / (2 * order) as f64;
            let q = 1.0 / (2.0 * theta.cos());
            let (b0, b1, b2, a0, a1, a2) = lowpass_coefficients(cutoff, q, fs);
            let mut section = Biquad::new();
            section.set_coefficients(b0, b1, b2, a0, a1, a2);
            sections.push(section);
        }
        if order % 2 == 1 {
            // Real pole via the bilinear transform.
            let k = (PI * cutoff / fs).tan();
            let mut section = Biquad::new();
            section.set_coefficients(k, k, 0.0, 1.0 + k, k - 1.0, 0.0);
            sections.push(section);
        }

        Ok(Self { order, sections })
    }

    /// Filter order.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Filters one sample through every section.
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        self.sections
            .iter_mut()
            .fold(input, |sample, section| section.process(sample))
    }

    /// Clears all section state.
    pub fn clear(&mut self) {
        for section in &mut self.sections {
            section.clear();
        }
    }

    /// Filters a whole signal forward from a cleared state.
    pub fn apply(&mut self, data: &[f64]) -> Vec<f64> {
        self.clear();
        data.iter().map(|&x| self.process(x)).collect()
    }
}

/// Zero-phase filtering: forward pass, reversed backward pass.
///
/// Both ends are extended by odd reflection before filtering so start-up
/// transients fall outside the returned samples.
pub fn filtfilt(filter: &ButterworthLowpass, data: &[f64]) -> Vec<f64> {
    let n = data.len();
    if n < 2 {
        return data.to_vec();
    }
    let pad = (3 * (filter.order() + 1)).min(n - 1);
    let first = data[0];
    let last = data[n - 1];

    let mut extended = Vec::with_capacity(n + 2 * pad);
    extended.extend((1..=pad).rev().map(|i| 2.0 * first - data[i]));
    extended.extend_from_slice(data);
    extended.extend((1..=pad).map(|i| 2.0 * last - data[n - 1 - i]));

    let mut stage = filter.clone();
    let mut forward = stage.apply(&extended);
    forward.reverse();
    let mut backward = stage.apply(&forward);
    backward.reverse();

    backward[pad..pad + n].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, fs: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f64 / fs).sin())
            .collect()
    }

    fn rms(data: &[f64]) -> f64 {
        (data.iter().map(|x| x * x).sum::<f64>() / data.len() as f64).sqrt()
    }

    // --- design ---

    #[test]
    fn rejects_invalid_design() {
        assert!(ButterworthLowpass::new(0, 25.0, 1000.0).is_err());
        assert!(ButterworthLowpass::new(MAX_ORDER + 1, 25.0, 1000.0).is_err());
        assert!(ButterworthLowpass::new(5, 600.0, 1000.0).is_err());
        assert!(ButterworthLowpass::new(5, 0.0, 1000.0).is_err());
    }

    #[test]
    fn odd_order_adds_first_order_section() {
        assert_eq!(ButterworthLowpass::new(5, 25.0, 1000.0).unwrap().sections.len(), 3);
        assert_eq!(ButterworthLowpass::new(4, 25.0, 1000.0).unwrap().sections.len(), 2);
    }

    // --- response ---

    #[test]
    fn unity_dc_gain() {
        let mut filter = ButterworthLowpass::new(5, 25.0, 1000.0).unwrap();
        let out = filter.apply(&vec![1.0; 2000]);
        assert!((out[1999] - 1.0).abs() < 1e-6, "settled to {}", out[1999]);
    }

    #[test]
    fn attenuates_above_cutoff() {
        let mut filter = ButterworthLowpass::new(5, 25.0, 1000.0).unwrap();
        let out = filter.apply(&sine(200.0, 1000.0, 2000));
        assert!(rms(&out[1000..]) < 1e-3);
    }

    #[test]
    fn filtfilt_preserves_slow_wave_without_lag() {
        let filter = ButterworthLowpass::new(5, 25.0, 1000.0).unwrap();
        let input = sine(2.0, 1000.0, 2000);
        let out = filtfilt(&filter, &input);
        assert_eq!(out.len(), input.len());
        for i in 500..1500 {
            assert!((out[i] - input[i]).abs() < 1e-2, "sample {i}");
        }
    }

    #[test]
    fn filtfilt_short_input_passthrough() {
        let filter = ButterworthLowpass::new(2, 25.0, 1000.0).unwrap();
        assert_eq!(filtfilt(&filter, &[3.0]), vec![3.0]);
        assert!(filtfilt(&filter, &[]).is_empty());
    }
}

//! Index helpers over sample slices.
//!
//! Comparisons are strict so NaN never wins; an empty slice yields index 0.

/// Index of the first maximum.
pub(crate) fn first_argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Index of the first minimum.
pub(crate) fn first_argmin(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v < values[best] {
            best = i;
        }
    }
    best
}

/// Index of the last minimum.
pub(crate) fn last_argmin(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v <= values[best] {
            best = i;
        }
    }
    best
}

/// Sign of `x` as -1, 0 or 1.
pub(crate) fn sign(x: f64) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

/// `values[i+1] - values[i]`.
pub(crate) fn diff(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Centered moving average over `[i - half_width, i + half_width]`, clipped at the ends.
pub(crate) fn smooth(values: &[f64], half_width: usize) -> Vec<f64> {
    let n = values.len();
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half_width);
            let hi = (i + half_width).min(n - 1);
            values[lo..=hi].iter().sum::<f64>() / (hi - lo + 1) as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_and_argmin_ties() {
        let v = [1.0, 3.0, 3.0, 0.0, 0.0];
        assert_eq!(first_argmax(&v), 1);
        assert_eq!(first_argmin(&v), 3);
        assert_eq!(last_argmin(&v), 4);
        assert_eq!(first_argmax(&[]), 0);
    }

    #[test]
    fn smoothing_clips_window() {
        let out = smooth(&[0.0, 3.0, 6.0], 1);
        assert_eq!(out, vec![1.5, 3.0, 4.5]);
        assert_eq!(smooth(&[2.0, 4.0], 0), vec![2.0, 4.0]);
        assert!(smooth(&[], 3).is_empty());
    }

    #[test]
    fn signs_and_differences() {
        assert_eq!(sign(-0.5), -1);
        assert_eq!(sign(0.0), 0);
        assert_eq!(sign(2.0), 1);
        assert_eq!(diff(&[1.0, 4.0, 2.0]), vec![3.0, -2.0]);
    }
}

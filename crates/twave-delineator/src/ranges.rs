//! Partitioning of threshold crossings into candidate spans.

use crate::candidate::{Candidate, Span};
use crate::stats::last_argmin;

/// Groups crossing points into [`Candidate`]s.
///
/// Crossing points within `loose_window` of each other belong to one candidate
/// unless a gap appears inside the window. At a gap the current candidate closes
/// on the steepest descent of the derivative between the two points, and the next
/// candidate opens there.
#[derive(Debug, Clone, Copy)]
pub struct CandidateRangeResolver {
    loose_window: usize,
}

impl CandidateRangeResolver {
    /// Creates a resolver.
    pub fn new(loose_window: usize) -> Self {
        Self { loose_window }
    }

    /// Resolves candidate spans. No crossing points yields no candidates.
    pub fn resolve(&self, derivative: &[f64], crossing_amplitudes: &[f64]) -> Vec<Candidate> {
        let points: Vec<usize> = crossing_amplitudes
            .iter()
            .enumerate()
            .filter_map(|(i, a)| (*a != 0.0).then_some(i))
            .collect();
        let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
            return Vec::new();
        };

        let window = self.loose_window;
        let contiguous_sum = window * (window + 1) / 2;

        let mut candidates = Vec::new();
        let mut range_start = last_argmin(&derivative[..=first]);
        let mut rising_start = first;

        let mut i = 1;
        while i < points.len() {
            let upper = (points.len() - 1).min(i + window);
            let offsets: Vec<usize> = points[i..=upper].iter().map(|p| p - points[i]).collect();

            if offsets.iter().sum::<usize>() > contiguous_sum {
                let gap = offsets
                    .windows(2)
                    .take(window)
                    .position(|w| w[0] + 1 != w[1])
                    .unwrap_or(0);
                i += gap;
                if i + 1 >= points.len() {
                    break;
                }

                let (left, right) = (points[i], points[i + 1]);
                let boundary = left + 1 + last_argmin(&derivative[left + 1..right]);
                candidates.push(Candidate::new(
                    Span::new(range_start, boundary),
                    Span::new(rising_start, left),
                ));
                range_start = boundary;
                rising_start = right;
            }
            i += 1;
        }

        let end = last + last_argmin(&derivative[last..]);
        candidates.push(Candidate::new(
            Span::new(range_start, end),
            Span::new(rising_start, last),
        ));

        tracing::trace!(
            points = points.len(),
            candidates = candidates.len(),
            "candidate ranges"
        );
        candidates
    }
}

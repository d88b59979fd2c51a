//! Peak and slur labelling.

use crate::candidate::{Candidate, CandidateLabel};

/// Samples a true peak may lie outside a rising range and still label it.
pub const PEAK_TOLERANCE: usize = 3;

/// Labels every candidate whose rising range holds a true peak as [`CandidateLabel::Peak`].
pub fn label_peaks(candidates: &mut [Candidate], peak_positions: &[usize]) {
    for candidate in candidates.iter_mut() {
        if peak_positions
            .iter()
            .any(|&p| candidate.rising.contains_within(p, PEAK_TOLERANCE))
        {
            candidate.label = CandidateLabel::Peak;
        }
    }
}

/// Turns slurs next to a peak into rising or falling slurs.
///
/// One left-to-right pass. A slur right after a peak becomes falling when both
/// edge slopes are non-positive; a slur right before a peak becomes rising when
/// both are non-negative. Each step sees the labels left by the previous steps.
pub fn relabel_slurs(candidates: &mut [Candidate]) {
    for i in 0..candidates.len() {
        let previous = i.saturating_sub(1);
        let label = candidates[i].label;
        let previous_label = candidates[previous].label;

        if label == CandidateLabel::SlurUnrelated && previous_label == CandidateLabel::Peak {
            let c = &mut candidates[i];
            if c.rising_edge.slope <= 0.0 && c.falling_edge.slope <= 0.0 {
                c.label = CandidateLabel::SlurFalling;
            }
        } else if label == CandidateLabel::Peak && previous_label == CandidateLabel::SlurUnrelated
        {
            let c = &mut candidates[previous];
            if c.rising_edge.slope >= 0.0 && c.falling_edge.slope >= 0.0 {
                c.label = CandidateLabel::SlurRising;
            }
        }
    }
}

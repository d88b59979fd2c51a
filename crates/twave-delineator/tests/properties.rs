//! Property-based tests for the delineation pipeline.
//!
//! Checks the offset refinement bound, monotonicity of the filtering rules, the
//! merge length invariant and that the pipeline never panics on finite input.

use proptest::prelude::*;
use twave_delineator::{
    Candidate, CandidateLabel, DelineationParams, DelineationResult, Delineator, EdgeLine,
    FinderMode, RuleEngine, Span, TPeak, ToffRefiner,
};

fn label_from(code: u8) -> CandidateLabel {
    match code % 4 {
        0 => CandidateLabel::Peak,
        1 => CandidateLabel::SlurRising,
        2 => CandidateLabel::SlurFalling,
        _ => CandidateLabel::SlurUnrelated,
    }
}

/// Back-to-back candidates of 20 samples each.
fn chained(specs: &[(u8, f64, f64, f64)]) -> Vec<Candidate> {
    specs
        .iter()
        .enumerate()
        .map(|(k, &(label, y, rise, fall))| {
            let base = 20 * k;
            let mut c = Candidate::new(Span::new(base, base + 20), Span::new(base + 5, base + 15));
            c.label = label_from(label);
            c.x = base + 10;
            c.y = y;
            c.rising_edge = EdgeLine::new(rise, y - rise * (base + 10) as f64);
            c.falling_edge = EdgeLine::new(-fall, y + fall * (base + 10) as f64);
            c
        })
        .collect()
}

fn peak_at(index: usize) -> TPeak {
    TPeak {
        index,
        flatness: 1,
        distortion: 0.0,
        skewness: 0.0,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// A refined offset never precedes the last candidate or leaves the wave.
    #[test]
    fn refined_offset_within_bounds(
        wave in prop::collection::vec(-200.0f64..600.0, 20..300),
        peak_frac in 0.0f64..1.0,
        last_frac in 0.0f64..1.0,
        off_extra in 0usize..400,
        rr in 100.0f64..1500.0,
    ) {
        let n = wave.len();
        let peak = ((n - 1) as f64 * peak_frac) as usize;
        let last = ((n - 1) as f64 * last_frac) as usize;
        let off = peak.max(last) + off_extra;
        let result = DelineationResult {
            on: Some(0),
            off: Some(off as i64),
            last_candidate: Some(last),
            peaks: vec![peak_at(peak)],
            ..DelineationResult::default()
        };

        if let Some(toff) = ToffRefiner::new().readjust(&wave, &result, rr, 0.0) {
            prop_assert!(toff >= last, "toff {} < last {}", toff, last);
            prop_assert!(toff < n, "toff {} outside {}", toff, n);
        }
    }

    /// Raising the minimum rising width never keeps more candidates.
    #[test]
    fn few_points_is_monotonic(
        widths in prop::collection::vec(0usize..40, 0..20),
        a in 0usize..30,
        b in 0usize..30,
    ) {
        let candidates: Vec<Candidate> = widths
            .iter()
            .enumerate()
            .map(|(k, w)| {
                let base = 100 * k;
                Candidate::new(Span::new(base, base + 60), Span::new(base, base + w))
            })
            .collect();
        let (low, high) = (a.min(b), a.max(b));
        let engine = |min_points| {
            RuleEngine::new(&DelineationParams { min_points, ..DelineationParams::default() })
        };
        let dropped_low = engine(low).few_points(&candidates);
        let dropped_high = engine(high).few_points(&candidates);
        prop_assert!(dropped_low.iter().all(|i| dropped_high.contains(i)));
    }

    /// Loosening the notch tolerance never drops more peaks.
    #[test]
    fn inconsistent_peaks_is_monotonic(
        specs in prop::collection::vec((0u8..4, 0.0f64..500.0, 0.1f64..5.0, 0.1f64..5.0), 1..12),
        a in 0.0f64..200.0,
        b in 0.0f64..200.0,
    ) {
        let candidates = chained(&specs);
        let engine = |max_delta_amplitude_notches| {
            RuleEngine::new(&DelineationParams {
                max_delta_amplitude_notches,
                ..DelineationParams::default()
            })
        };
        let strict = engine(a.min(b)).inconsistent_peaks(&candidates);
        let loose = engine(a.max(b)).inconsistent_peaks(&candidates);
        prop_assert!(loose.iter().all(|i| strict.contains(i)));
        prop_assert!(loose.iter().all(|&i| candidates[i].is_peak()));
    }

    /// Every merge replaces two candidates by one covering both ranges.
    #[test]
    fn merge_preserves_extent(
        specs in prop::collection::vec((0u8..4, 290.0f64..310.0, 0.1f64..5.0, 0.1f64..5.0), 1..12),
        valley in 280.0f64..310.0,
    ) {
        let candidates = chained(&specs);
        let wave = vec![valley; 20 * specs.len() + 21];
        let before = candidates.len();
        let first = candidates[0].range.start;
        let end = candidates[before - 1].range.end;

        let engine = RuleEngine::new(&DelineationParams::default());
        let (merged, pairs) = engine.merge_candidates(&wave, candidates);

        prop_assert_eq!(merged.len(), before - pairs);
        prop_assert_eq!(merged[0].range.start, first);
        prop_assert_eq!(merged[merged.len() - 1].range.end, end);
        for pair in merged.windows(2) {
            prop_assert!(pair[0].range.end <= pair[1].range.start);
        }
    }

    /// Arbitrary finite segments never panic and keep peaks inside the segment.
    #[test]
    fn pipeline_total_on_finite_input(
        wave in prop::collection::vec(-300.0f64..300.0, 3..160),
        start in 0usize..1000,
        walk in any::<bool>(),
    ) {
        let params = DelineationParams {
            finder: if walk { FinderMode::DerivativeWalk } else { FinderMode::MovingThreshold },
            ..DelineationParams::default()
        };
        let result = Delineator::new(&params).delineate(&wave, start).unwrap();
        prop_assert!(result.peaks.len() <= 2);
        for peak in &result.peaks {
            prop_assert!(peak.index >= start && peak.index < start + wave.len());
        }
        prop_assert_eq!(result.has_delineators(), result.on.is_some());
    }
}

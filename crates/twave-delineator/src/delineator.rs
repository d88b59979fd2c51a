//! The delineation pipeline.

use crate::candidate::{Candidate, CandidateLabel};
use crate::derivative::DerivativeAnalyzer;
use crate::error::{DelineationError, Result};
use crate::geometry::GeometryEngine;
use crate::labeling::{label_peaks, relabel_slurs};
use crate::params::DelineationParams;
use crate::ranges::CandidateRangeResolver;
use crate::result::{DelineationResult, Rule, RuleHits, TPeak};
use crate::rules::{RuleEngine, relabel, remove_indices};
use crate::toff::ToffRefiner;

/// Shortest segment the derivative sweep accepts.
pub const MIN_SEGMENT_LEN: usize = 3;

/// Delineates T waves with a fixed parameter set.
///
/// Holds no state between calls; one instance can serve any number of segments.
///
/// # Example
///
/// ```rust
/// use twave_delineator::{DelineationParams, Delineator};
///
/// let wave: Vec<f64> = (0..300)
///     .map(|i| {
///         let u = (i as f64 - 150.0) / 40.0;
///         400.0 * (-0.5 * u * u).exp()
///     })
///     .collect();
///
/// let delineator = Delineator::new(&DelineationParams::default());
/// let result = delineator.delineate(&wave, 1000).unwrap();
/// assert_eq!(result.peaks.len(), 1);
/// assert!(result.peaks[0].index > 1100 && result.peaks[0].index < 1200);
/// ```
#[derive(Debug, Clone)]
pub struct Delineator {
    params: DelineationParams,
    analyzer: DerivativeAnalyzer,
    resolver: CandidateRangeResolver,
    geometry: GeometryEngine,
    rules: RuleEngine,
    refiner: ToffRefiner,
}

impl Delineator {
    /// Builds the pipeline stages from `params`.
    pub fn new(params: &DelineationParams) -> Self {
        Self {
            params: params.clone(),
            analyzer: DerivativeAnalyzer::new(params.finder, params.delta_step_slope),
            resolver: CandidateRangeResolver::new(params.loose_window),
            geometry: GeometryEngine::new(params.delta_amplitude),
            rules: RuleEngine::new(params),
            refiner: ToffRefiner::new(),
        }
    }

    /// Parameters in use.
    pub fn params(&self) -> &DelineationParams {
        &self.params
    }

    /// Delineates `twave`, a segment of a lead that starts at sample `point_start`.
    ///
    /// Locations in the result are in lead coordinates. A segment without a
    /// surviving peak yields a result with no locations.
    ///
    /// # Errors
    ///
    /// [`DelineationError::WaveTooShort`] for segments under three samples.
    pub fn delineate(&self, twave: &[f64], point_start: usize) -> Result<DelineationResult> {
        if twave.len() < MIN_SEGMENT_LEN {
            return Err(DelineationError::WaveTooShort { len: twave.len() });
        }

        let mut hits = RuleHits::new();
        let candidates = self.candidates(twave, &mut hits);
        let candidates = self.post_process(twave, candidates, &mut hits);

        let result = assemble(&candidates, point_start, hits);
        tracing::debug!(
            point_start,
            candidates = candidates.len(),
            peaks = result.peaks.len(),
            on = ?result.on,
            off = ?result.off,
            "segment delineated"
        );
        Ok(result)
    }

    /// Energy-based correction of the offset in `result` over the full `wave`.
    ///
    /// See [`ToffRefiner::readjust`].
    pub fn refine_offset(
        &self,
        wave: &[f64],
        result: &DelineationResult,
        rr: f64,
        rpeak: f64,
    ) -> Option<usize> {
        self.refiner.readjust(wave, result, rr, rpeak)
    }

    /// Discovery, pre-filtering, labelling and geometry.
    fn candidates(&self, twave: &[f64], hits: &mut RuleHits) -> Vec<Candidate> {
        let scan = self.analyzer.analyze(twave);
        let mut candidates = self
            .resolver
            .resolve(&scan.derivative, &scan.crossing_amplitudes);

        let few = self.rules.few_points(&candidates);
        hits.record(Rule::FewPoints, few.len());
        remove_indices(&mut candidates, &few);

        label_peaks(&mut candidates, &scan.peak_positions);

        candidates
            .iter()
            .map(|c| self.geometry.fit(twave, &scan.derivative, c))
            .collect()
    }

    /// Rule stages, in order.
    fn post_process(
        &self,
        twave: &[f64],
        mut candidates: Vec<Candidate>,
        hits: &mut RuleHits,
    ) -> Vec<Candidate> {
        let rules = &self.rules;

        let drop = rules.low_amplitude_main_peak(&candidates);
        hits.record(Rule::LowAmplitudeMainPeak, drop.len());
        remove_indices(&mut candidates, &drop);

        let drop = rules.low_amplitude_peaks(&candidates);
        hits.record(Rule::LowAmplitudePeaks, drop.len());
        remove_indices(&mut candidates, &drop);

        let drop = rules.inconsistent_peaks(&candidates);
        hits.record(Rule::InconsistentPeaks, drop.len());
        remove_indices(&mut candidates, &drop);

        relabel_slurs(&mut candidates);

        let drop = rules.unrelated_slurs(&candidates);
        hits.record(Rule::UnrelatedSlur, drop.len());
        remove_indices(&mut candidates, &drop);

        let (mut candidates, pairs) = rules.merge_candidates(twave, candidates);
        hits.record(Rule::MergingCandidates, pairs);

        let drop = rules.slur_classifier(&candidates);
        hits.record(Rule::SlurClassifier, drop.len());
        remove_indices(&mut candidates, &drop);

        // Relabelled peaks stay in the list: their edges still bound on/off.
        let extra = rules.extra_peaks(&candidates);
        hits.record(Rule::KeepJustTwoPeaks, extra.len());
        relabel(&mut candidates, &extra, CandidateLabel::PeakUnrelated);

        let slurred = rules.slurred_peaks(twave, &candidates);
        hits.record(Rule::ConvertPeakToSlur, slurred.len());
        relabel(&mut candidates, &slurred, CandidateLabel::SluredPeak);

        let non_measurable = rules.is_non_measurable(&candidates);
        hits.record(Rule::NonMeasurable, usize::from(non_measurable));

        candidates
    }
}

impl Default for Delineator {
    fn default() -> Self {
        Self::new(&DelineationParams::default())
    }
}

/// Builds the result from the surviving candidates.
fn assemble(candidates: &[Candidate], point_start: usize, rules_hit: RuleHits) -> DelineationResult {
    let peaks: Vec<TPeak> = candidates
        .iter()
        .filter(|c| c.is_peak())
        .map(|c| TPeak {
            index: point_start + c.x,
            flatness: c.flatness,
            distortion: c.distortion,
            skewness: c.skewness,
        })
        .collect();

    let (Some(first), Some(last), false) =
        (candidates.first(), candidates.last(), peaks.is_empty())
    else {
        return DelineationResult {
            rules_hit,
            ..DelineationResult::default()
        };
    };

    let start = point_start as f64;
    let on = first
        .rising_edge
        .zero_crossing()
        .map_or((start + first.range.start as f64) as i64, |x| {
            (start + x).round() as i64
        });
    let off = last
        .falling_edge
        .zero_crossing()
        .map_or((start + last.range.end as f64) as i64, |x| {
            (start + x).round() as i64
        });

    DelineationResult {
        on: Some(on),
        off: Some(off),
        last_candidate: Some(point_start + last.x),
        peaks,
        rules_hit,
    }
}

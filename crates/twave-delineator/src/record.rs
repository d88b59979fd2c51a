//! Record-level T-wave delineation.
//!
//! Places the T segment after the QRS offset of an [`EcgRecord`], delineates the
//! vector-magnitude lead and writes TON, TPEAK, TPPEAK and TOFF back into a copy
//! of the caller's [`PointMap`].

use serde::Serialize;
use twave_core::{AnnotationKind, ButterworthLowpass, EcgRecord, Lead, PointMap, Scope, filtfilt};

use crate::delineator::Delineator;
use crate::error::{DelineationError, Result};
use crate::params::DelineationParams;
use crate::result::DelineationResult;

/// Sampling rate the thresholds were tuned for.
pub const REQUIRED_FS: f64 = 1000.0;

/// Samples skipped after the QRS offset to clear the J point.
pub const J_POINT_GUARD: usize = 25;

/// R-peak location assumed when neither annotations nor `precut` provide one.
pub const DEFAULT_RPEAK: f64 = 250.0;

/// Fraction of the record used as RR when no RR information exists.
pub const DEFAULT_RR_FRACTION: f64 = 0.8;

/// Lead the delineator works on.
pub const DELINEATED_LEAD: Lead = Lead::VcgMag;

const T_KINDS: [AnnotationKind; 4] = [
    AnnotationKind::Ton,
    AnnotationKind::Toff,
    AnnotationKind::Tpeak,
    AnnotationKind::Tppeak,
];

/// Outcome of delineating one record.
#[derive(Debug, Clone, Serialize)]
pub struct RecordDelineation {
    /// Input annotations with the T-wave points of the delineated lead replaced.
    #[serde(skip)]
    pub points: PointMap,
    /// Segment-level result in lead coordinates.
    pub result: DelineationResult,
    /// QRS offset the segment was placed after.
    pub qoff: usize,
    /// R-peak used by the offset refinement.
    pub rpeak: f64,
    /// RR interval in samples.
    pub rr: f64,
    /// First sample of the T segment.
    pub point_start: usize,
    /// Last sample of the T segment.
    pub point_end: usize,
    /// Offset from the last candidate's steepest fall, before refinement.
    pub max_slope_off: Option<i64>,
    /// Refined offset, whether or not it was written as TOFF.
    pub refined_off: Option<usize>,
}

impl RecordDelineation {
    /// True when at least one T peak was found.
    pub fn has_delineators(&self) -> bool {
        self.result.has_delineators()
    }

    /// Location of `kind` written for the delineated lead.
    pub fn location(&self, kind: AnnotationKind) -> Option<usize> {
        self.points
            .locations(Scope::Lead(DELINEATED_LEAD), kind)
            .first()
            .copied()
    }
}

/// Delineates the T wave of `record` using `annotations` for the fiducial points.
///
/// # Errors
///
/// - [`DelineationError::SamplingFrequency`] unless the record is at 1000 Hz
/// - [`DelineationError::MissingLead`] without a VCGMAG lead
/// - [`DelineationError::MissingAnnotation`] without any QRS offset
/// - [`DelineationError::SegmentOutOfRange`] when the segment starts past the lead
/// - [`DelineationError::Filter`] for an invalid pre-filter design
pub fn delineate_record(
    record: &EcgRecord,
    annotations: &PointMap,
    params: &DelineationParams,
) -> Result<RecordDelineation> {
    if (record.fs() - REQUIRED_FS).abs() > f64::EPSILON {
        return Err(DelineationError::SamplingFrequency {
            expected: REQUIRED_FS,
            found: record.fs(),
        });
    }
    let raw = record
        .lead(DELINEATED_LEAD)
        .ok_or(DelineationError::MissingLead(DELINEATED_LEAD))?;
    let lead = prefilter(raw, record.fs(), params)?;
    let n = lead.len();

    let qoff = qrs_offset(annotations)?;
    let rpeak = r_peak(record, annotations);
    let rr = rr_interval(record);

    let point_start = qoff + J_POINT_GUARD;
    if point_start >= n {
        return Err(DelineationError::SegmentOutOfRange {
            start: point_start,
            len: n,
        });
    }
    let extent = (rr * params.segment.approximate_range_of_t_segment).trunc().max(0.0) as usize;
    let point_end = (point_start + extent).min(n - 1);

    let delineator = Delineator::new(params);
    let result = delineator.delineate(&lead[point_start..=point_end], point_start)?;
    let refined_off = delineator.refine_offset(&lead, &result, rr, rpeak);

    let mut points = annotations.clone();
    let scope = Scope::Lead(DELINEATED_LEAD);
    for kind in T_KINDS {
        points.remove_kind(scope, kind);
    }

    if let Some(first) = result.peaks.first() {
        let lead_qoff = match annotations.locations(scope, AnnotationKind::Qoff).as_slice() {
            [only] => *only as i64,
            _ => -1,
        };
        if let Some(on) = result.on {
            if on == lead_qoff && on > 0 {
                points.insert(scope, on as usize + 1, AnnotationKind::Ton);
            } else if on > lead_qoff && on > 0 {
                points.insert(scope, on as usize, AnnotationKind::Ton);
            }
        }

        let toff = refined_off.unwrap_or(0);
        let boundary = point_start as f64 + rr * params.segment.approximate_boundary_of_toff;
        if toff != 0 && (toff as f64) < boundary {
            points.insert(scope, toff, AnnotationKind::Toff);
        }

        points.insert(scope, first.index, AnnotationKind::Tpeak);
        if let Some(second) = result.peaks.get(1) {
            points.insert(scope, second.index, AnnotationKind::Tppeak);
        }
    }

    tracing::info!(
        qoff,
        rr,
        rpeak,
        point_start,
        point_end,
        peaks = result.peaks.len(),
        toff = ?refined_off,
        "record delineated"
    );

    Ok(RecordDelineation {
        points,
        max_slope_off: result.off,
        result,
        qoff,
        rpeak,
        rr,
        point_start,
        point_end,
        refined_off,
    })
}

fn prefilter(lead: &[f64], fs: f64, params: &DelineationParams) -> Result<Vec<f64>> {
    let order = params.segment.filter_order;
    if order == 0 {
        return Ok(lead.to_vec());
    }
    let filter = ButterworthLowpass::new(order, params.segment.filter_high_cutoff, fs)?;
    Ok(filtfilt(&filter, lead))
}

/// The single global QRS offset, else the mean over every QRS offset.
fn qrs_offset(annotations: &PointMap) -> Result<usize> {
    if let [only] = annotations
        .locations(Scope::Global, AnnotationKind::Qoff)
        .as_slice()
    {
        return Ok(*only);
    }
    mean(&all_locations(annotations, AnnotationKind::Qoff))
        .map(|m| m.trunc() as usize)
        .ok_or(DelineationError::MissingAnnotation(AnnotationKind::Qoff))
}

/// The single global R peak, else the mean over every R peak, else derived from
/// `precut`, else [`DEFAULT_RPEAK`].
fn r_peak(record: &EcgRecord, annotations: &PointMap) -> f64 {
    if let [only] = annotations
        .locations(Scope::Global, AnnotationKind::Rpeak)
        .as_slice()
    {
        return *only as f64;
    }
    if let Some(m) = mean(&all_locations(annotations, AnnotationKind::Rpeak)) {
        return m.trunc();
    }
    if let Some(precut) = record.property("precut") {
        tracing::warn!(precut, "no R peak annotation, placing it from precut");
        return record.len() as f64 - precut;
    }
    tracing::warn!(rpeak = DEFAULT_RPEAK, "no R peak annotation or precut");
    DEFAULT_RPEAK
}

/// `meanrr`, else the samples after `precut`, else a fixed fraction of the record.
fn rr_interval(record: &EcgRecord) -> f64 {
    if let Some(rr) = record.property("meanrr") {
        return rr;
    }
    if let Some(precut) = record.property("precut") {
        tracing::warn!(precut, "no meanrr property, using samples after precut");
        return record.len() as f64 - precut;
    }
    let rr = DEFAULT_RR_FRACTION * record.len() as f64;
    tracing::warn!(rr, "no meanrr or precut property, estimating RR from length");
    rr
}

fn all_locations(annotations: &PointMap, kind: AnnotationKind) -> Vec<usize> {
    annotations
        .locations_everywhere(kind)
        .into_iter()
        .map(|(_, loc)| loc)
        .collect()
}

fn mean(values: &[usize]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<usize>() as f64 / values.len() as f64)
}

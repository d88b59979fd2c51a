//! Delineation errors.
//!
//! Only precondition violations are errors. A signal that yields no candidate,
//! no surviving peak or a non-measurable amplitude produces a normal
//! [`DelineationResult`](crate::DelineationResult) with unset fields.

use thiserror::Error;
use twave_core::{AnnotationKind, Lead};

/// Errors surfaced by the delineator.
#[derive(Debug, Error)]
pub enum DelineationError {
    /// The record is not sampled at the rate the thresholds were tuned for.
    #[error("sampling frequency must be {expected} Hz, found {found} Hz")]
    SamplingFrequency {
        /// Required rate.
        expected: f64,
        /// Rate of the record.
        found: f64,
    },

    /// The lead to delineate is not in the record.
    #[error("record has no {0} lead")]
    MissingLead(Lead),

    /// A fiducial point needed to place the T segment is absent.
    #[error("no {0} annotation available")]
    MissingAnnotation(AnnotationKind),

    /// Fewer samples than the derivative sweep needs.
    #[error("wave of {len} samples is too short to delineate (need at least 3)")]
    WaveTooShort {
        /// Samples supplied.
        len: usize,
    },

    /// The T segment would start beyond the end of the lead.
    #[error("T segment start {start} lies outside a lead of {len} samples")]
    SegmentOutOfRange {
        /// First sample of the segment.
        start: usize,
        /// Samples in the lead.
        len: usize,
    },

    /// Pre-filter design rejected the configured order or cutoff.
    #[error("pre-filter design failed")]
    Filter(#[from] twave_core::Error),
}

/// Result alias for delineation.
pub type Result<T> = std::result::Result<T, DelineationError>;

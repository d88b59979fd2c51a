//! Error types for record construction and filter design.

use crate::Lead;
use thiserror::Error;

/// Errors raised by [`EcgRecord`](crate::EcgRecord) and the filter designers.
#[derive(Debug, Error)]
pub enum Error {
    /// A lead name that is not part of the lead table.
    #[error("unknown lead: {0}")]
    UnknownLead(String),

    /// An annotation kind name that is not part of the kind table.
    #[error("unknown annotation kind: {0}")]
    UnknownAnnotation(String),

    /// Sampling frequency is not a positive finite number.
    #[error("invalid sampling frequency: {0} Hz")]
    InvalidSamplingFrequency(f64),

    /// A lead's sample count differs from the rest of the record.
    #[error("lead {lead} has {found} samples, expected {expected}")]
    LengthMismatch {
        /// Offending lead.
        lead: Lead,
        /// Sample count of the other leads.
        expected: usize,
        /// Sample count of this lead.
        found: usize,
    },

    /// The same lead was supplied twice.
    #[error("duplicate lead: {0}")]
    DuplicateLead(Lead),

    /// A lead required by an operation is absent.
    #[error("record has no {0} lead")]
    MissingLead(Lead),

    /// Filter order outside the supported range.
    #[error("filter order {order} out of range 1..={max}")]
    InvalidFilterOrder {
        /// Requested order.
        order: usize,
        /// Highest supported order.
        max: usize,
    },

    /// Cutoff must lie strictly between 0 and Nyquist.
    #[error("cutoff {cutoff} Hz must be between 0 and {nyquist} Hz")]
    InvalidCutoff {
        /// Requested cutoff.
        cutoff: f64,
        /// Nyquist frequency for the sample rate.
        nyquist: f64,
    },
}

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

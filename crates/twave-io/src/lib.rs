//! Plain-text I/O for the twave delineator.
//!
//! This crate provides:
//!
//! - **Records**: [`read_record`] and [`write_record`] for multi-lead sample tables
//! - **Annotations**: [`read_annotations`] and [`write_annotations`] for fiducial points
//!
//! ## Record format
//!
//! ```text
//! # fs: 1000
//! # meanrr: 912
//! I, II, VCGMAG
//! 12.0, 30.5, 41.2
//! 13.5, 31.0, 42.0
//! ```
//!
//! `#` lines of the form `key: value` carry metadata: `fs` is the sampling
//! frequency, any other numeric value becomes a record property. The first
//! other line names the leads; every following line is one sample per lead.
//! Commas and whitespace both separate values.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use twave_io::{ReadOptions, read_annotations, read_record};
//!
//! let record = read_record("beat.txt", &ReadOptions::default().with_scale(1000.0))?;
//! let points = read_annotations("beat.ann")?;
//! println!("{} samples, {} annotations", record.len(), points.len());
//! # Ok::<(), twave_io::Error>(())
//! ```

mod annotations;
mod record;

pub use annotations::{format_annotations, parse_annotations, read_annotations, write_annotations};
pub use record::{ReadOptions, format_record, parse_record, read_record, write_record};

/// Error types for record and annotation files.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A value that could not be parsed.
    #[error("line {line}: {message}")]
    Parse {
        /// One-based line number.
        line: usize,
        /// What failed to parse.
        message: String,
    },

    /// A lead or scope name outside the lead table.
    #[error("line {line}: unknown lead '{name}'")]
    UnknownLead {
        /// One-based line number.
        line: usize,
        /// Name as written.
        name: String,
    },

    /// An annotation kind outside the kind table.
    #[error("line {line}: unknown annotation kind '{name}'")]
    UnknownAnnotation {
        /// One-based line number.
        line: usize,
        /// Name as written.
        name: String,
    },

    /// Neither the file nor the caller gave a sampling frequency.
    #[error("no sampling frequency: add '# fs: <Hz>' or pass one explicitly")]
    MissingSamplingFrequency,

    /// The file has no lead header.
    #[error("no lead header found")]
    MissingHeader,

    /// A row with a different number of values than the header.
    #[error("line {line}: expected {expected} values, found {found}")]
    RaggedRow {
        /// One-based line number.
        line: usize,
        /// Leads in the header.
        expected: usize,
        /// Values in the row.
        found: usize,
    },

    /// The parsed data does not form a valid record.
    #[error("invalid record: {0}")]
    Record(#[from] twave_core::Error),
}

/// Convenience result type for record I/O.
pub type Result<T> = std::result::Result<T, Error>;

/// Splits a line on commas and whitespace, dropping empty tokens.
pub(crate) fn tokens(line: &str) -> impl Iterator<Item = &str> {
    line.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
}

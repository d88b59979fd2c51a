//! twave Core - ECG containers shared by the delineator, config and CLI crates
//!
//! # Modules
//!
//! - [`lead`] - The standard 12 leads plus the Frank X/Y/Z leads and their vector magnitude
//! - [`annotation`] - Fiducial point kinds, annotation scopes and the [`PointMap`]
//! - [`record`] - [`EcgRecord`], a multi-lead sample container with scalar properties
//! - [`filter`] - Butterworth low-pass design and zero-phase filtering
//!
//! Sample locations are plain `usize` indices into a lead. At the 1000 Hz rate the
//! delineator requires, a location is also a timestamp in milliseconds.
//!
//! # Example
//!
//! ```rust
//! use twave_core::{AnnotationKind, EcgRecord, Lead, PointMap, Scope};
//!
//! let record = EcgRecord::new(1000.0, vec![(Lead::VcgMag, vec![0.0; 600])]).unwrap();
//! assert_eq!(record.len(), 600);
//!
//! let mut points = PointMap::new();
//! points.insert(Scope::Global, 120, AnnotationKind::Qoff);
//! assert_eq!(points.locations(Scope::Global, AnnotationKind::Qoff), vec![120]);
//! ```

pub mod annotation;
pub mod error;
pub mod filter;
pub mod lead;
pub mod record;

pub use annotation::{AnnotationKind, PointMap, Scope};
pub use error::{Error, Result};
pub use filter::{Biquad, ButterworthLowpass, filtfilt};
pub use lead::Lead;
pub use record::EcgRecord;

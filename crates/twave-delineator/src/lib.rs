//! twave Delineator - T-wave onset, peak and offset detection
//!
//! The pipeline runs over one T segment of a vector-magnitude lead:
//!
//! 1. [`derivative`] - sweep the first derivative for threshold crossings and true peaks
//! 2. [`ranges`] - group crossings into candidate spans bounded by derivative minima
//! 3. [`labeling`] - mark peaks, then slurs attached to them
//! 4. [`geometry`] - fit edge lines, bisector and amplitude peaks per candidate
//! 5. [`rules`] - filter, merge and relabel candidates
//! 6. [`toff`] - correct the offset with an energy cost function
//!
//! [`Delineator`] drives the stages over a segment; [`delineate_record`] places the
//! segment inside an [`EcgRecord`](twave_core::EcgRecord) and writes the resulting
//! annotations back.
//!
//! # Example
//!
//! ```rust
//! use twave_core::{AnnotationKind, EcgRecord, Lead, PointMap, Scope};
//! use twave_delineator::{DelineationParams, delineate_record};
//!
//! // QRS offset at 100, T peak at 300.
//! let samples: Vec<f64> = (0..1000)
//!     .map(|i| {
//!         let u = (i as f64 - 300.0) / 40.0;
//!         400.0 * (-0.5 * u * u).exp()
//!     })
//!     .collect();
//! let mut record = EcgRecord::new(1000.0, vec![(Lead::VcgMag, samples)]).unwrap();
//! record.set_property("meanrr", 900.0);
//!
//! let mut points = PointMap::new();
//! points.insert(Scope::Global, 100, AnnotationKind::Qoff);
//! points.insert(Scope::Global, 60, AnnotationKind::Rpeak);
//!
//! let out = delineate_record(&record, &points, &DelineationParams::default()).unwrap();
//! let tpeak = out.location(AnnotationKind::Tpeak).unwrap();
//! assert!((290..=310).contains(&tpeak));
//! ```

pub mod candidate;
pub mod delineator;
pub mod derivative;
pub mod error;
pub mod geometry;
pub mod labeling;
pub mod params;
pub mod ranges;
pub mod record;
pub mod result;
pub mod rules;
mod stats;
pub mod toff;

pub use candidate::{Candidate, CandidateLabel, EdgeLine, Span};
pub use delineator::Delineator;
pub use derivative::{DerivativeAnalyzer, DerivativeScan};
pub use error::{DelineationError, Result};
pub use geometry::{Bisector, GeometryEngine};
pub use params::{DelineationParams, FeatureThresholds, FinderMode, SegmentParams};
pub use ranges::CandidateRangeResolver;
pub use record::{RecordDelineation, delineate_record};
pub use result::{DelineationResult, Rule, RuleHits, TPeak};
pub use rules::RuleEngine;
pub use toff::ToffRefiner;

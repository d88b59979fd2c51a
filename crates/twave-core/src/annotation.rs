//! Fiducial annotations and the point map that stores them.
//!
//! A [`PointMap`] groups annotations by [`Scope`]: either record-wide
//! ([`Scope::Global`]) or attached to a single [`Lead`]. Within a scope each sample
//! location holds at most one [`AnnotationKind`].

use crate::{Error, Lead};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Kind of fiducial point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AnnotationKind {
    /// P-wave onset.
    Pon,
    /// P-wave peak.
    Ppeak,
    /// P-wave offset.
    Poff,
    /// QRS onset.
    Qon,
    /// Q-wave peak.
    Qpeak,
    /// R-wave peak.
    Rpeak,
    /// Second R-wave peak.
    Rppeak,
    /// S-wave peak.
    Speak,
    /// QRS offset.
    Qoff,
    /// T-wave onset.
    Ton,
    /// T-wave peak.
    Tpeak,
    /// Second T-wave peak.
    Tppeak,
    /// T-wave offset.
    Toff,
    /// U-wave onset.
    Uon,
    /// U-wave peak.
    Upeak,
    /// U-wave offset.
    Uoff,
    /// Unclassified point.
    Unknown,
}

const KIND_TABLE: [(AnnotationKind, &str, &str); 17] = [
    (AnnotationKind::Pon, "PON", "P-wave onset"),
    (AnnotationKind::Ppeak, "PPEAK", "P-wave peak"),
    (AnnotationKind::Poff, "POFF", "P-wave offset"),
    (AnnotationKind::Qon, "QON", "QRS onset"),
    (AnnotationKind::Qpeak, "QPEAK", "Q-wave peak"),
    (AnnotationKind::Rpeak, "RPEAK", "R-wave peak"),
    (AnnotationKind::Rppeak, "RPPEAK", "second R-wave peak"),
    (AnnotationKind::Speak, "SPEAK", "S-wave peak"),
    (AnnotationKind::Qoff, "QOFF", "QRS offset"),
    (AnnotationKind::Ton, "TON", "T-wave onset"),
    (AnnotationKind::Tpeak, "TPEAK", "T-wave peak"),
    (AnnotationKind::Tppeak, "TPPEAK", "second T-wave peak"),
    (AnnotationKind::Toff, "TOFF", "T-wave offset"),
    (AnnotationKind::Uon, "UON", "U-wave onset"),
    (AnnotationKind::Upeak, "UPEAK", "U-wave peak"),
    (AnnotationKind::Uoff, "UOFF", "U-wave offset"),
    (AnnotationKind::Unknown, "UNKNOWN", "unclassified point"),
];

impl AnnotationKind {
    /// Every kind, in table order.
    pub fn all() -> impl Iterator<Item = AnnotationKind> {
        KIND_TABLE.iter().map(|(kind, _, _)| *kind)
    }

    /// Short upper-case name (`"TON"`).
    pub fn name(self) -> &'static str {
        self.entry().1
    }

    /// Human-readable description (`"T-wave onset"`).
    pub fn description(self) -> &'static str {
        self.entry().2
    }

    /// Looks a kind up by its short name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        KIND_TABLE
            .iter()
            .find(|(_, n, _)| n.eq_ignore_ascii_case(name))
            .map(|(kind, _, _)| *kind)
    }

    fn entry(self) -> &'static (AnnotationKind, &'static str, &'static str) {
        // Table order matches declaration order.
        &KIND_TABLE[self as usize]
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnnotationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| Error::UnknownAnnotation(s.to_string()))
    }
}

/// Where an annotation applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    /// Record-wide annotation, shared by all leads.
    Global,
    /// Annotation specific to one lead.
    Lead(Lead),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => f.write_str("GLOBAL"),
            Scope::Lead(lead) => write!(f, "{lead}"),
        }
    }
}

impl FromStr for Scope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("GLOBAL") {
            Ok(Scope::Global)
        } else {
            s.parse().map(Scope::Lead)
        }
    }
}

/// Annotations of a record, grouped by scope and ordered by location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointMap {
    scopes: BTreeMap<Scope, BTreeMap<usize, AnnotationKind>>,
}

impl PointMap {
    /// Creates an empty point map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an annotation, returning the kind previously stored at that location.
    pub fn insert(
        &mut self,
        scope: Scope,
        location: usize,
        kind: AnnotationKind,
    ) -> Option<AnnotationKind> {
        self.scopes.entry(scope).or_default().insert(location, kind)
    }

    /// Kind stored at `location` in `scope`, if any.
    pub fn get(&self, scope: Scope, location: usize) -> Option<AnnotationKind> {
        self.scopes.get(&scope)?.get(&location).copied()
    }

    /// Removes every annotation of `kind` in `scope`, returning how many were removed.
    pub fn remove_kind(&mut self, scope: Scope, kind: AnnotationKind) -> usize {
        let Some(points) = self.scopes.get_mut(&scope) else {
            return 0;
        };
        let before = points.len();
        points.retain(|_, k| *k != kind);
        let removed = before - points.len();
        if points.is_empty() {
            self.scopes.remove(&scope);
        }
        removed
    }

    /// Ascending locations of `kind` in `scope`.
    pub fn locations(&self, scope: Scope, kind: AnnotationKind) -> Vec<usize> {
        self.scopes
            .get(&scope)
            .map(|points| {
                points
                    .iter()
                    .filter(|(_, k)| **k == kind)
                    .map(|(loc, _)| *loc)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Locations of `kind` across every scope, global first.
    pub fn locations_everywhere(&self, kind: AnnotationKind) -> Vec<(Scope, usize)> {
        self.iter()
            .filter(|(_, _, k)| *k == kind)
            .map(|(scope, loc, _)| (scope, loc))
            .collect()
    }

    /// Scopes that hold at least one annotation.
    pub fn scopes(&self) -> impl Iterator<Item = Scope> + '_ {
        self.scopes.keys().copied()
    }

    /// Total number of annotations.
    pub fn len(&self) -> usize {
        self.scopes.values().map(BTreeMap::len).sum()
    }

    /// True when no annotation is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates `(scope, location, kind)` in scope then location order.
    pub fn iter(&self) -> impl Iterator<Item = (Scope, usize, AnnotationKind)> + '_ {
        self.scopes.iter().flat_map(|(scope, points)| {
            points.iter().map(move |(loc, kind)| (*scope, *loc, *kind))
        })
    }
}

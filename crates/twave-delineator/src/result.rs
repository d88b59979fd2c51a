//! Delineation output and rule diagnostics.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

/// A rule stage of the pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rule {
    /// Drops candidates with a narrow rising range.
    FewPoints,
    /// Drops weak candidates when the main peak itself is weak.
    LowAmplitudeMainPeak,
    /// Drops peaks failing the percentage test against the main peak.
    LowAmplitudePeaks,
    /// Drops peaks far below the main peak.
    InconsistentPeaks,
    /// Drops slurs not attached to a peak.
    UnrelatedSlur,
    /// Merges adjacent candidates separated by a shallow valley.
    MergingCandidates,
    /// Drops slurs the decision rules classify as bad.
    SlurClassifier,
    /// Relabels every peak beyond the two tallest.
    KeepJustTwoPeaks,
    /// Relabels secondary peaks with a shallow flank as slurred peaks.
    ConvertPeakToSlur,
    /// Flags a main peak below the measurable amplitude.
    NonMeasurable,
}

const RULE_NAMES: [(Rule, &str); 10] = [
    (Rule::FewPoints, "fewPointsCandidates"),
    (Rule::LowAmplitudeMainPeak, "lowAmplitudeMainPeak"),
    (Rule::LowAmplitudePeaks, "lowAmplitudePeaks"),
    (Rule::InconsistentPeaks, "inconsistentPeaks"),
    (Rule::UnrelatedSlur, "unrelatedSlure"),
    (Rule::MergingCandidates, "meargingCandidates"),
    (Rule::SlurClassifier, "slurClassifier"),
    (Rule::KeepJustTwoPeaks, "keepJustTwoPeaks"),
    (Rule::ConvertPeakToSlur, "convertPeakToSlur"),
    (Rule::NonMeasurable, "non-measurable"),
];

impl Rule {
    /// Every rule in execution order.
    pub fn all() -> impl Iterator<Item = Rule> {
        RULE_NAMES.iter().map(|(rule, _)| *rule)
    }

    /// Diagnostic key of the rule (`"fewPointsCandidates"`, ...).
    pub fn name(self) -> &'static str {
        RULE_NAMES[self as usize].1
    }
}

/// Per-rule counts of affected candidates.
///
/// Filtering rules count removed candidates, relabelling rules count relabelled
/// ones, the merge rule counts merged pairs and [`Rule::NonMeasurable`] is 0 or 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleHits(BTreeMap<Rule, usize>);

impl RuleHits {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the count of `rule`, replacing any earlier value.
    pub fn record(&mut self, rule: Rule, count: usize) {
        tracing::debug!(rule = rule.name(), count, "rule applied");
        self.0.insert(rule, count);
    }

    /// Count of `rule`, `None` if it did not run.
    pub fn get(&self, rule: Rule) -> Option<usize> {
        self.0.get(&rule).copied()
    }

    /// Rules that ran, with their counts, in execution order.
    pub fn iter(&self) -> impl Iterator<Item = (Rule, usize)> + '_ {
        self.0.iter().map(|(rule, count)| (*rule, *count))
    }

    /// Number of rules that ran.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no rule ran.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for RuleHits {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (rule, count) in &self.0 {
            map.serialize_entry(rule.name(), count)?;
        }
        map.end()
    }
}

/// One delineated T peak with its shape metrics.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TPeak {
    /// Sample index of the peak.
    pub index: usize,
    /// Near-maximal samples forming the peak.
    pub flatness: usize,
    /// Distance between amplitude and bisector peaks.
    pub distortion: f64,
    /// Bisector angle offset in degrees.
    pub skewness: f64,
}

/// Onset, peaks and offset of one T wave.
///
/// Indices are in the coordinates of the full lead (segment start added). With no
/// surviving peak every location is `None` and `peaks` is empty.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct DelineationResult {
    /// Zero crossing of the first candidate's rising edge.
    pub on: Option<i64>,
    /// Zero crossing of the last candidate's falling edge.
    pub off: Option<i64>,
    /// Amplitude peak of the last candidate.
    pub last_candidate: Option<usize>,
    /// Surviving peaks in ascending order, at most two.
    pub peaks: Vec<TPeak>,
    /// Rule diagnostics.
    pub rules_hit: RuleHits,
}

impl DelineationResult {
    /// True when at least one peak was found.
    pub fn has_delineators(&self) -> bool {
        !self.peaks.is_empty()
    }

    /// Peak indices in ascending order.
    pub fn peak_indices(&self) -> Vec<usize> {
        self.peaks.iter().map(|p| p.index).collect()
    }

    /// True when the main peak fell below the measurable amplitude.
    pub fn non_measurable(&self) -> bool {
        self.rules_hit.get(Rule::NonMeasurable) == Some(1)
    }
}

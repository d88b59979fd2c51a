//! Candidate spans and their labels.

use serde::Serialize;

/// Classification of a candidate span.
///
/// Each label has a signed code; slurs are `±1`, peaks `±2`, slurred peaks `±3`,
/// and the negative side marks the "unrelated" variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CandidateLabel {
    /// Slur not attached to any peak.
    #[default]
    SlurUnrelated,
    /// Slur on the rising flank of the following peak.
    SlurRising,
    /// Slur on the falling flank of the preceding peak.
    SlurFalling,
    /// Peak.
    Peak,
    /// Peak beyond the two tallest.
    PeakUnrelated,
    /// Peak reclassified as a slur because one flank is too shallow.
    SluredPeak,
    /// Slurred peak not attached to a main peak.
    SluredPeakUnrelated,
}

impl CandidateLabel {
    /// Signed code of the label.
    pub fn code(self) -> i8 {
        match self {
            CandidateLabel::SlurUnrelated => 0,
            CandidateLabel::SlurRising => 1,
            CandidateLabel::SlurFalling => -1,
            CandidateLabel::Peak => 2,
            CandidateLabel::PeakUnrelated => -2,
            CandidateLabel::SluredPeak => 3,
            CandidateLabel::SluredPeakUnrelated => -3,
        }
    }

    /// True for rising or falling slurs.
    pub fn is_directional_slur(self) -> bool {
        self.code().abs() == 1
    }
}

/// Inclusive sample span `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    /// First sample.
    pub start: usize,
    /// Last sample.
    pub end: usize,
}

impl Span {
    /// Creates a span.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// `end - start`, zero for inverted spans.
    pub fn width(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True when `position` lies within the span widened by `tolerance` on both sides.
    pub fn contains_within(&self, position: usize, tolerance: usize) -> bool {
        position + tolerance >= self.start && position <= self.end + tolerance
    }

    /// Smallest span covering both.
    pub fn union(&self, other: &Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// Straight line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct EdgeLine {
    /// Slope in amplitude units per sample.
    pub slope: f64,
    /// Value at `x = 0`.
    pub intercept: f64,
}

impl EdgeLine {
    /// Creates a line.
    pub fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }

    /// Re-expresses a line fitted on indices local to a sub-span starting at `offset`.
    pub fn shifted(&self, offset: usize) -> Self {
        Self::new(self.slope, self.intercept - self.slope * offset as f64)
    }

    /// Where the line crosses zero, `None` for a flat line.
    pub fn zero_crossing(&self) -> Option<f64> {
        let x = -self.intercept / self.slope;
        x.is_finite().then_some(x)
    }

    /// Angle of the line in degrees using the given value of pi.
    pub(crate) fn angle_deg(&self, pi: f64) -> f64 {
        self.slope.atan() * 180.0 / pi
    }
}

/// A provisional slur or peak within the T segment.
///
/// Sample indices are relative to the start of the segment being delineated.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Candidate {
    /// Current classification.
    pub label: CandidateLabel,
    /// Sub-span from the first to the last threshold crossing.
    pub rising: Span,
    /// Full extent, bounded by derivative minima.
    pub range: Span,
    /// Fit of the rising edge.
    pub rising_edge: EdgeLine,
    /// Fit of the falling edge.
    pub falling_edge: EdgeLine,
    /// Amplitude-based peak location.
    pub x: usize,
    /// Amplitude-based peak value.
    pub y: f64,
    /// Bisector-based peak location.
    pub x_origin: usize,
    /// Bisector-based peak value.
    pub y_origin: f64,
    /// Number of near-maximal samples forming the peak.
    pub flatness: usize,
    /// Bisector angle offset in degrees.
    pub skewness: f64,
    /// Distance between the amplitude and bisector peaks.
    pub distortion: f64,
}

impl Candidate {
    /// Creates an unfitted slur candidate.
    pub fn new(range: Span, rising: Span) -> Self {
        Self {
            range,
            rising,
            ..Self::default()
        }
    }

    /// True when labelled [`CandidateLabel::Peak`].
    pub fn is_peak(&self) -> bool {
        self.label == CandidateLabel::Peak
    }

    pub(crate) fn update_distortion(&mut self) {
        let dx = self.x as f64 - self.x_origin as f64;
        let dy = self.y - self.y_origin;
        self.distortion = (dx * dx + dy * dy).sqrt();
    }
}

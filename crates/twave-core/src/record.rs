//! Multi-lead ECG record.

use crate::{Error, Lead, Result};
use std::collections::BTreeMap;

/// Sampled ECG leads sharing one sampling frequency and length.
///
/// Scalar properties carry per-record metadata the delineator can fall back on,
/// such as `meanrr` (mean RR interval in samples) or `precut` (samples trimmed
/// before the beat of interest).
#[derive(Debug, Clone, PartialEq)]
pub struct EcgRecord {
    fs: f64,
    leads: Vec<Lead>,
    samples: Vec<Vec<f64>>,
    properties: BTreeMap<String, f64>,
}

impl EcgRecord {
    /// Builds a record from `(lead, samples)` pairs.
    ///
    /// All leads must have the same length and appear once.
    pub fn new(fs: f64, leads: Vec<(Lead, Vec<f64>)>) -> Result<Self> {
        if !(fs.is_finite() && fs > 0.0) {
            return Err(Error::InvalidSamplingFrequency(fs));
        }
        let mut record = Self {
            fs,
            leads: Vec::with_capacity(leads.len()),
            samples: Vec::with_capacity(leads.len()),
            properties: BTreeMap::new(),
        };
        for (lead, data) in leads {
            record.add_lead(lead, data)?;
        }
        Ok(record)
    }

    /// Appends a lead, validating its length against the existing leads.
    pub fn add_lead(&mut self, lead: Lead, data: Vec<f64>) -> Result<()> {
        if self.leads.contains(&lead) {
            return Err(Error::DuplicateLead(lead));
        }
        if let Some(first) = self.samples.first()
            && first.len() != data.len()
        {
            return Err(Error::LengthMismatch {
                lead,
                expected: first.len(),
                found: data.len(),
            });
        }
        self.leads.push(lead);
        self.samples.push(data);
        Ok(())
    }

    /// Sampling frequency in Hz.
    pub fn fs(&self) -> f64 {
        self.fs
    }

    /// Samples per lead.
    pub fn len(&self) -> usize {
        self.samples.first().map_or(0, Vec::len)
    }

    /// True when the record holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Leads in insertion order.
    pub fn leads(&self) -> &[Lead] {
        &self.leads
    }

    /// Samples of `lead`, if recorded.
    pub fn lead(&self, lead: Lead) -> Option<&[f64]> {
        let index = self.leads.iter().position(|l| *l == lead)?;
        Some(&self.samples[index])
    }

    /// Scales every sample of every lead by `factor`.
    pub fn scale(&mut self, factor: f64) {
        for data in &mut self.samples {
            for sample in data.iter_mut() {
                *sample *= factor;
            }
        }
    }

    /// Numeric property by name.
    pub fn property(&self, key: &str) -> Option<f64> {
        self.properties.get(key).copied()
    }

    /// Sets a numeric property, replacing any previous value.
    pub fn set_property(&mut self, key: impl Into<String>, value: f64) {
        self.properties.insert(key.into(), value);
    }

    /// All properties in key order.
    pub fn properties(&self) -> &BTreeMap<String, f64> {
        &self.properties
    }

    /// Derives the [`Lead::VcgMag`] lead as `sqrt(X² + Y² + Z²)`.
    ///
    /// Replaces an existing vector-magnitude lead.
    pub fn derive_vector_magnitude(&mut self) -> Result<()> {
        let x = self.lead(Lead::X).ok_or(Error::MissingLead(Lead::X))?;
        let y = self.lead(Lead::Y).ok_or(Error::MissingLead(Lead::Y))?;
        let z = self.lead(Lead::Z).ok_or(Error::MissingLead(Lead::Z))?;
        let magnitude: Vec<f64> = x
            .iter()
            .zip(y)
            .zip(z)
            .map(|((x, y), z)| (x * x + y * y + z * z).sqrt())
            .collect();

        if let Some(index) = self.leads.iter().position(|l| *l == Lead::VcgMag) {
            self.samples[index] = magnitude;
            Ok(())
        } else {
            self.add_lead(Lead::VcgMag, magnitude)
        }
    }
}

//! Multi-lead record files.

use std::fmt::Write as _;
use std::path::Path;

use twave_core::{EcgRecord, Lead};

use crate::{Error, Result, tokens};

/// Metadata key holding the sampling frequency.
const FS_KEY: &str = "fs";

/// Overrides applied while reading a record.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReadOptions {
    /// Sampling frequency to use instead of the file's `fs` entry.
    pub fs: Option<f64>,
    /// Factor every sample is multiplied by (e.g. 1000 for mV to µV).
    pub scale: Option<f64>,
}

impl ReadOptions {
    /// Sets the sampling frequency override.
    pub fn with_fs(mut self, fs: f64) -> Self {
        self.fs = Some(fs);
        self
    }

    /// Sets the amplitude scale.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }
}

/// Read a record file.
///
/// See the crate docs for the format.
pub fn read_record<P: AsRef<Path>>(path: P, options: &ReadOptions) -> Result<EcgRecord> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let record = parse_record(&text, options)?;
    tracing::debug!(
        path = %path.display(),
        leads = record.leads().len(),
        samples = record.len(),
        fs = record.fs(),
        "loaded record"
    );
    Ok(record)
}

/// Parse record text.
pub fn parse_record(text: &str, options: &ReadOptions) -> Result<EcgRecord> {
    let mut fs = None;
    let mut properties = Vec::new();
    let mut header: Option<Vec<Lead>> = None;
    let mut columns: Vec<Vec<f64>> = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(comment) = line.strip_prefix('#') {
            // Metadata only counts before the header; anything else is a comment.
            if header.is_none()
                && let Some((key, value)) = comment.split_once(':')
                && let Ok(value) = value.trim().parse::<f64>()
            {
                let key = key.trim();
                if key.eq_ignore_ascii_case(FS_KEY) {
                    fs = Some(value);
                } else {
                    properties.push((key.to_string(), value));
                }
            }
            continue;
        }

        let Some(leads) = &header else {
            let leads = tokens(line)
                .map(|name| {
                    Lead::from_name(name).ok_or_else(|| Error::UnknownLead {
                        line: line_no,
                        name: name.to_string(),
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            columns = vec![Vec::new(); leads.len()];
            header = Some(leads);
            continue;
        };

        let mut found = 0;
        for token in tokens(line) {
            let value: f64 = token.parse().map_err(|_| Error::Parse {
                line: line_no,
                message: format!("'{token}' is not a number"),
            })?;
            if let Some(column) = columns.get_mut(found) {
                column.push(value);
            }
            found += 1;
        }
        if found != leads.len() {
            return Err(Error::RaggedRow {
                line: line_no,
                expected: leads.len(),
                found,
            });
        }
    }

    let leads = header.ok_or(Error::MissingHeader)?;
    let fs = options.fs.or(fs).ok_or(Error::MissingSamplingFrequency)?;

    let mut record = EcgRecord::new(fs, leads.into_iter().zip(columns).collect())?;
    for (key, value) in properties {
        record.set_property(key, value);
    }
    if let Some(scale) = options.scale {
        record.scale(scale);
    }
    Ok(record)
}

/// Write a record file readable by [`read_record`].
pub fn write_record<P: AsRef<Path>>(path: P, record: &EcgRecord) -> Result<()> {
    std::fs::write(path, format_record(record))?;
    Ok(())
}

/// Render a record in the text format.
pub fn format_record(record: &EcgRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {FS_KEY}: {}", record.fs());
    for (key, value) in record.properties() {
        let _ = writeln!(out, "# {key}: {value}");
    }

    let names: Vec<&str> = record.leads().iter().map(|l| l.name()).collect();
    out.push_str(&names.join(","));
    out.push('\n');

    let leads: Vec<&[f64]> = record
        .leads()
        .iter()
        .filter_map(|&lead| record.lead(lead))
        .collect();
    for i in 0..record.len() {
        let row: Vec<String> = leads.iter().map(|samples| samples[i].to_string()).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# fs: 1000
# meanrr: 912
# recorded on a test bench
I, II, VCGMAG
1.0, 2.0, 3.0

4.0 5.0 6.0
";

    #[test]
    fn parses_metadata_header_and_rows() {
        let record = parse_record(SAMPLE, &ReadOptions::default()).unwrap();
        assert_eq!(record.fs(), 1000.0);
        assert_eq!(record.leads(), &[Lead::I, Lead::II, Lead::VcgMag]);
        assert_eq!(record.len(), 2);
        assert_eq!(record.lead(Lead::VcgMag), Some(&[3.0, 6.0][..]));
        assert_eq!(record.property("meanrr"), Some(912.0));
    }

    #[test]
    fn options_override_and_scale() {
        let options = ReadOptions::default().with_fs(500.0).with_scale(1000.0);
        let record = parse_record(SAMPLE, &options).unwrap();
        assert_eq!(record.fs(), 500.0);
        assert_eq!(record.lead(Lead::I), Some(&[1000.0, 4000.0][..]));
    }

    #[test]
    fn missing_fs() {
        let err = parse_record("I\n1\n", &ReadOptions::default()).unwrap_err();
        assert!(matches!(err, Error::MissingSamplingFrequency));
    }

    #[test]
    fn missing_header() {
        let err = parse_record("# fs: 1000\n", &ReadOptions::default()).unwrap_err();
        assert!(matches!(err, Error::MissingHeader));
    }

    #[test]
    fn unknown_lead_reports_line() {
        let err = parse_record("# fs: 1000\nI, V7\n", &ReadOptions::default()).unwrap_err();
        assert!(matches!(err, Error::UnknownLead { line: 2, ref name } if name == "V7"));
    }

    #[test]
    fn ragged_row() {
        let err = parse_record("# fs: 1000\nI,II\n1,2\n3\n", &ReadOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::RaggedRow { line: 4, expected: 2, found: 1 }
        ));
    }

    #[test]
    fn bad_number() {
        let err = parse_record("# fs: 1000\nI\nabc\n", &ReadOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 3, .. }));
    }

    #[test]
    fn format_then_parse_preserves_record() {
        let mut record =
            EcgRecord::new(1000.0, vec![(Lead::X, vec![0.25, -1.5]), (Lead::Y, vec![3.0, 7.125])])
                .unwrap();
        record.set_property("precut", 400.0);
        let text = format_record(&record);
        assert!(text.starts_with("# fs: 1000\n"));
        assert_eq!(parse_record(&text, &ReadOptions::default()).unwrap(), record);
    }
}

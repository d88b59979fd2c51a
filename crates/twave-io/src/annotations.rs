//! Annotation files: one `scope,kind,location` per line.
//!
//! `scope` is `GLOBAL` or a lead name, `kind` an annotation short name such as
//! `QOFF`, `location` a sample index. Lines starting with `#` are comments.

use std::fmt::Write as _;
use std::path::Path;

use twave_core::{AnnotationKind, PointMap, Scope};

use crate::{Error, Result, tokens};

/// Read an annotation file.
pub fn read_annotations<P: AsRef<Path>>(path: P) -> Result<PointMap> {
    let path = path.as_ref();
    let points = parse_annotations(&std::fs::read_to_string(path)?)?;
    tracing::debug!(path = %path.display(), count = points.len(), "loaded annotations");
    Ok(points)
}

/// Parse annotation text.
pub fn parse_annotations(text: &str) -> Result<PointMap> {
    let mut points = PointMap::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = tokens(trimmed).collect();
        let [scope, kind, location] = fields.as_slice() else {
            return Err(Error::Parse {
                line,
                message: format!("expected scope,kind,location, found {} fields", fields.len()),
            });
        };

        let scope: Scope = scope.parse().map_err(|_| Error::UnknownLead {
            line,
            name: (*scope).to_string(),
        })?;
        let kind = AnnotationKind::from_name(kind).ok_or_else(|| Error::UnknownAnnotation {
            line,
            name: (*kind).to_string(),
        })?;
        let location: usize = location.parse().map_err(|_| Error::Parse {
            line,
            message: format!("'{location}' is not a sample index"),
        })?;

        points.insert(scope, location, kind);
    }
    Ok(points)
}

/// Write an annotation file readable by [`read_annotations`].
pub fn write_annotations<P: AsRef<Path>>(path: P, points: &PointMap) -> Result<()> {
    std::fs::write(path, format_annotations(points))?;
    Ok(())
}

/// Render annotations in the text format, ordered by scope then location.
pub fn format_annotations(points: &PointMap) -> String {
    let mut out = String::new();
    for (scope, location, kind) in points.iter() {
        let _ = writeln!(out, "{scope},{kind},{location}");
    }
    out
}

//! Integration tests for twave-io record and annotation files.

use tempfile::{NamedTempFile, TempDir};
use twave_core::{AnnotationKind, EcgRecord, Lead, PointMap, Scope};
use twave_io::{
    Error, ReadOptions, read_annotations, read_record, write_annotations, write_record,
};

// ---------------------------------------------------------------------------
// Record files
// ---------------------------------------------------------------------------

/// Three-lead record with a T-like bump in every lead.
fn frank_record(len: usize) -> EcgRecord {
    let bump = |amp: f64| -> Vec<f64> {
        (0..len)
            .map(|i| {
                let u = (i as f64 - 300.0) / 40.0;
                amp * (-0.5 * u * u).exp()
            })
            .collect()
    };
    let mut record = EcgRecord::new(
        1000.0,
        vec![(Lead::X, bump(0.3)), (Lead::Y, bump(-0.2)), (Lead::Z, bump(0.1))],
    )
    .unwrap();
    record.set_property("meanrr", 880.0);
    record
}

#[test]
fn record_file_roundtrip() {
    let record = frank_record(600);
    let file = NamedTempFile::new().unwrap();
    write_record(file.path(), &record).unwrap();

    let loaded = read_record(file.path(), &ReadOptions::default()).unwrap();
    assert_eq!(loaded, record);
}

#[test]
fn scaled_read_feeds_vector_magnitude() {
    let record = frank_record(600);
    let file = NamedTempFile::new().unwrap();
    write_record(file.path(), &record).unwrap();

    let mut loaded = read_record(file.path(), &ReadOptions::default().with_scale(1000.0)).unwrap();
    loaded.derive_vector_magnitude().unwrap();

    let vcg = loaded.lead(Lead::VcgMag).unwrap();
    let expected = 1000.0 * (0.3f64.powi(2) + 0.2f64.powi(2) + 0.1f64.powi(2)).sqrt();
    assert!((vcg[300] - expected).abs() < 1e-9, "{} vs {expected}", vcg[300]);
}

#[test]
fn missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = read_record(dir.path().join("none.txt"), &ReadOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn invalid_fs_surfaces_record_error() {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(file.path(), "# fs: 0\nI\n1\n").unwrap();
    let err = read_record(file.path(), &ReadOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Record(_)));
}

// ---------------------------------------------------------------------------
// Annotation files
// ---------------------------------------------------------------------------

#[test]
fn annotation_file_roundtrip() {
    let mut points = PointMap::new();
    points.insert(Scope::Global, 120, AnnotationKind::Qoff);
    points.insert(Scope::Global, 60, AnnotationKind::Rpeak);
    points.insert(Scope::Lead(Lead::VcgMag), 118, AnnotationKind::Qoff);

    let file = NamedTempFile::new().unwrap();
    write_annotations(file.path(), &points).unwrap();
    assert_eq!(read_annotations(file.path()).unwrap(), points);
}

#[test]
fn annotation_error_names_line() {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(file.path(), "# header\nGLOBAL,QOFF,100\nGLOBAL,QOFF,x\n").unwrap();
    let err = read_annotations(file.path()).unwrap_err();
    assert!(err.to_string().starts_with("line 3:"), "{err}");
}

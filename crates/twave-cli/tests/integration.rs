//! Integration tests for twave-cli.
//!
//! Runs the built `twave` binary against synthetic record files.

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Helper to get the `twave` binary with an isolated config directory.
fn twave_bin(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_twave"));
    cmd.env("XDG_CONFIG_HOME", home).env_remove("RUST_LOG");
    cmd
}

/// Single VCGMAG lead with a T wave peaking at sample 300.
fn write_t_record(dir: &Path) -> std::path::PathBuf {
    let mut text = String::from("# fs: 1000\n# meanrr: 900\nVCGMAG\n");
    for i in 0..1000 {
        let u = (i as f64 - 300.0) / 40.0;
        text.push_str(&format!("{}\n", 400.0 * (-0.5 * u * u).exp()));
    }
    let path = dir.join("beat.txt");
    std::fs::write(&path, text).unwrap();
    path
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ---------------------------------------------------------------------------
// twave delineate
// ---------------------------------------------------------------------------

#[test]
fn delineate_prints_header_and_row() {
    let dir = TempDir::new().unwrap();
    let record = write_t_record(dir.path());

    let output = twave_bin(dir.path())
        .arg("delineate")
        .arg(&record)
        .args(["--qon", "20", "--qoff", "100", "--rpeak", "60", "--no-filter"])
        .output()
        .expect("failed to run twave delineate");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let text = stdout(&output);
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("RR,QON,RPEAK,QOFF,TPEAK,TPPEAK,TEND"));
    let row: Vec<&str> = lines.next().unwrap().split(',').collect();
    assert_eq!(row.len(), 7);
    assert_eq!(&row[..4], &["900", "20", "60", "100"]);

    let tpeak: usize = row[4].parse().unwrap();
    assert!((295..=305).contains(&tpeak), "tpeak {tpeak}");
    assert_eq!(row[5], "", "no secondary peak");
    let tend: usize = row[6].parse().unwrap();
    assert!(tend > tpeak, "tend {tend}");
}

#[test]
fn delineate_reads_annotation_file_and_writes_json() {
    let dir = TempDir::new().unwrap();
    let record = write_t_record(dir.path());
    let annotations = dir.path().join("beat.ann");
    std::fs::write(&annotations, "GLOBAL,QOFF,100\nGLOBAL,RPEAK,60\n").unwrap();
    let json = dir.path().join("out.json");

    let output = twave_bin(dir.path())
        .arg("delineate")
        .arg(&record)
        .arg("--annotations")
        .arg(&annotations)
        .arg("--json")
        .arg(&json)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
    let tpeak = value["tpeak"].as_u64().unwrap();
    assert!((290..=310).contains(&tpeak), "tpeak {tpeak}");
    assert_eq!(value["delineation"]["qoff"], 100);
    assert_eq!(value["delineation"]["point_start"], 125);
    let rules_hit = value["delineation"]["result"]["rules_hit"].as_object().unwrap();
    let mut keys: Vec<&str> = rules_hit.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        [
            "convertPeakToSlur",
            "fewPointsCandidates",
            "inconsistentPeaks",
            "keepJustTwoPeaks",
            "lowAmplitudeMainPeak",
            "lowAmplitudePeaks",
            "meargingCandidates",
            "non-measurable",
            "slurClassifier",
            "unrelatedSlure",
        ]
    );
    assert_eq!(rules_hit["non-measurable"], 0);
}

#[test]
fn delineate_without_qoff_fails() {
    let dir = TempDir::new().unwrap();
    let record = write_t_record(dir.path());

    let output = twave_bin(dir.path())
        .arg("delineate")
        .arg(&record)
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("QOFF"), "{stderr}");
}

#[test]
fn delineate_rejects_wrong_sampling_rate() {
    let dir = TempDir::new().unwrap();
    let record = write_t_record(dir.path());

    let output = twave_bin(dir.path())
        .arg("delineate")
        .arg(&record)
        .args(["--fs", "500", "--qoff", "100"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("1000"));
}

// ---------------------------------------------------------------------------
// twave info
// ---------------------------------------------------------------------------

#[test]
fn info_lists_leads_and_properties() {
    let dir = TempDir::new().unwrap();
    let record = write_t_record(dir.path());

    let output = twave_bin(dir.path()).arg("info").arg(&record).output().unwrap();
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("1000 Hz"), "{text}");
    assert!(text.contains("1000 samples"), "{text}");
    assert!(text.contains("VCGMAG"));
    assert!(text.contains("meanrr"));
}

#[test]
fn info_derives_vector_magnitude_on_export() {
    let dir = TempDir::new().unwrap();
    let record = dir.path().join("frank.txt");
    std::fs::write(&record, "# fs: 1000\nX Y Z\n3 4 0\n0 0 2\n").unwrap();
    let export = dir.path().join("export.txt");

    let output = twave_bin(dir.path())
        .arg("info")
        .arg(&record)
        .arg("--export")
        .arg(&export)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(stdout(&output).contains("VCGMAG"));

    let exported = std::fs::read_to_string(&export).unwrap();
    assert!(exported.contains("X,Y,Z,VCGMAG"), "{exported}");
    assert!(exported.contains("3,4,0,5"), "{exported}");
}

// ---------------------------------------------------------------------------
// twave config
// ---------------------------------------------------------------------------

#[test]
fn config_show_lists_properties() {
    let dir = TempDir::new().unwrap();
    let output = twave_bin(dir.path()).args(["config", "show"]).output().unwrap();
    assert!(output.status.success());
    let text = stdout(&output);
    for key in ["featursThreshold", "minPoints", "approximateBoundaryOfToff", "measurable"] {
        assert!(text.contains(key), "missing {key}");
    }
}

#[test]
fn config_init_then_check() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cfg").join("delineator.toml");

    let output = twave_bin(dir.path())
        .args(["config", "init"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(path.is_file());

    // Refuses to overwrite without --force.
    let output = twave_bin(dir.path())
        .args(["config", "init"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(!output.status.success());

    let output = twave_bin(dir.path())
        .args(["config", "check"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(stdout(&output).contains("OK"));
}

#[test]
fn config_check_rejects_bad_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "candidateFinder = 7\n").unwrap();

    let output = twave_bin(dir.path())
        .args(["config", "check"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("candidateFinder"));
}

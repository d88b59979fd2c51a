//! Delineate the T wave of a record.

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use twave_core::{AnnotationKind, PointMap, Scope};
use twave_delineator::{RecordDelineation, delineate_record};
use twave_io::read_annotations;

use super::common::{cell, load_params, load_record};

/// CSV header of the result row.
pub const HEADER: &str = "RR,QON,RPEAK,QOFF,TPEAK,TPPEAK,TEND";

/// Delineate the T wave of a record.
#[derive(Args)]
pub struct DelineateArgs {
    /// Record file (`# fs: 1000` metadata, lead header, one row per sample)
    pub record: PathBuf,

    /// Annotation file with `scope,kind,location` lines
    #[arg(short, long)]
    pub annotations: Option<PathBuf>,

    /// Global QRS onset in samples
    #[arg(long)]
    pub qon: Option<usize>,

    /// Global QRS offset in samples
    #[arg(long)]
    pub qoff: Option<usize>,

    /// Global R peak in samples
    #[arg(long)]
    pub rpeak: Option<usize>,

    /// Mean RR interval in samples
    #[arg(long)]
    pub meanrr: Option<f64>,

    /// Delineator configuration (TOML); defaults to the user config
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Sampling frequency override in Hz
    #[arg(long)]
    pub fs: Option<f64>,

    /// Amplitude scale applied on load (1000 converts mV to µV)
    #[arg(long)]
    pub scale: Option<f64>,

    /// Skip the Butterworth pre-filter
    #[arg(long)]
    pub no_filter: bool,

    /// Write the full diagnostic result as JSON
    #[arg(long)]
    pub json: Option<PathBuf>,
}

#[derive(Serialize)]
struct Report<'a> {
    record: String,
    qon: Option<usize>,
    ton: Option<usize>,
    tpeak: Option<usize>,
    tppeak: Option<usize>,
    toff: Option<usize>,
    non_measurable: bool,
    delineation: &'a RecordDelineation,
}

/// Run the delineate command.
pub fn run(args: DelineateArgs) -> anyhow::Result<()> {
    let params = load_params(args.config.as_deref(), args.no_filter)?;
    let mut record = load_record(&args.record, args.fs, args.scale)?;
    if let Some(rr) = args.meanrr {
        record.set_property("meanrr", rr);
    }

    let mut points = match &args.annotations {
        Some(path) => {
            read_annotations(path).with_context(|| format!("reading {}", path.display()))?
        }
        None => PointMap::new(),
    };
    for (location, kind) in [
        (args.qon, AnnotationKind::Qon),
        (args.qoff, AnnotationKind::Qoff),
        (args.rpeak, AnnotationKind::Rpeak),
    ] {
        if let Some(location) = location {
            points.remove_kind(Scope::Global, kind);
            points.insert(Scope::Global, location, kind);
        }
    }

    let out = delineate_record(&record, &points, &params)
        .with_context(|| format!("delineating {}", args.record.display()))?;

    if !out.has_delineators() {
        tracing::warn!("no T wave found");
    } else if out.result.non_measurable() {
        tracing::warn!("T wave amplitude below the measurable threshold");
    }

    let qon = points
        .locations(Scope::Global, AnnotationKind::Qon)
        .first()
        .copied();
    println!("{HEADER}");
    println!(
        "{},{},{},{},{},{},{}",
        out.rr,
        cell(qon),
        out.rpeak,
        out.qoff,
        cell(out.location(AnnotationKind::Tpeak)),
        cell(out.location(AnnotationKind::Tppeak)),
        cell(out.location(AnnotationKind::Toff)),
    );

    if let Some(path) = &args.json {
        let report = Report {
            record: args.record.display().to_string(),
            qon,
            ton: out.location(AnnotationKind::Ton),
            tpeak: out.location(AnnotationKind::Tpeak),
            tppeak: out.location(AnnotationKind::Tppeak),
            toff: out.location(AnnotationKind::Toff),
            non_measurable: out.result.non_measurable(),
            delineation: &out,
        };
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        eprintln!("Wrote {}", path.display());
    }

    Ok(())
}

//! Shared CLI helpers used across multiple commands.

use anyhow::Context;
use std::path::Path;
use twave_config::DelineatorConfig;
use twave_core::{EcgRecord, Lead};
use twave_delineator::DelineationParams;
use twave_io::{ReadOptions, read_record};

/// Load delineation parameters from `path`, or from the user config when absent.
pub fn load_params(path: Option<&Path>, no_filter: bool) -> anyhow::Result<DelineationParams> {
    let config = match path {
        Some(path) => DelineatorConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DelineatorConfig::load_default().context("loading user config")?,
    };
    let mut params = config.to_params().context("invalid configuration")?;
    if no_filter {
        params.segment.filter_order = 0;
    }
    Ok(params)
}

/// Load a record, deriving VCGMAG from X/Y/Z when the file lacks it.
pub fn load_record(path: &Path, fs: Option<f64>, scale: Option<f64>) -> anyhow::Result<EcgRecord> {
    let options = ReadOptions { fs, scale };
    let mut record =
        read_record(path, &options).with_context(|| format!("reading {}", path.display()))?;

    let has_frank = [Lead::X, Lead::Y, Lead::Z]
        .iter()
        .all(|&l| record.lead(l).is_some());
    if record.lead(Lead::VcgMag).is_none() && has_frank {
        record
            .derive_vector_magnitude()
            .context("deriving vector magnitude")?;
        tracing::debug!("derived VCGMAG from X/Y/Z");
    }
    Ok(record)
}

/// Empty for `None`, the value otherwise.
pub fn cell<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

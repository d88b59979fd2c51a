//! Display record metadata.

use clap::Args;
use std::path::PathBuf;
use twave_io::write_record;

use super::common::load_record;

/// Display record information.
#[derive(Args)]
pub struct InfoArgs {
    /// Path to the record file
    pub file: PathBuf,

    /// Sampling frequency override in Hz
    #[arg(long)]
    pub fs: Option<f64>,

    /// Write the loaded record, including any derived VCGMAG lead, to this file
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Run the info command.
pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    let record = load_record(&args.file, args.fs, None)?;

    let leads: Vec<&str> = record.leads().iter().map(|l| l.name()).collect();
    println!("File:        {}", args.file.display());
    println!("Sample Rate: {} Hz", record.fs());
    println!(
        "Duration:    {:.3}s ({} samples)",
        record.len() as f64 / record.fs(),
        record.len()
    );
    println!("Leads:       {}", leads.join(", "));
    if !record.properties().is_empty() {
        println!("Properties:");
        for (key, value) in record.properties() {
            println!("  {key:12} {value}");
        }
    }

    if let Some(path) = &args.export {
        write_record(path, &record)?;
        eprintln!("Wrote {}", path.display());
    }

    Ok(())
}

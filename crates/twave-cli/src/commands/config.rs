//! Delineator configuration commands.

use anyhow::Context;
use clap::{Args, Subcommand};
use std::path::PathBuf;
use twave_config::{DelineatorConfig, default_config_path, properties};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// List every property with its type, default and description
    Show,

    /// Write the default configuration as TOML
    Init {
        /// Destination (defaults to the user config file)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate a configuration file
    Check {
        /// File to validate
        path: PathBuf,
    },

    /// Show the default configuration path
    Path,
}

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => show(),
        ConfigCommand::Init { path, force } => init(path, force),
        ConfigCommand::Check { path } => check(&path),
        ConfigCommand::Path => {
            println!("{}", default_config_path().display());
            Ok(())
        }
    }
}

fn show() -> anyhow::Result<()> {
    println!("{:28} {:8} {:26} Description", "Key", "Type", "Default");
    println!("{}", "-".repeat(100));
    for spec in properties() {
        println!(
            "{:28} {:8} {:26} {}",
            spec.name,
            spec.ty.name(),
            spec.default.to_string(),
            spec.description
        );
    }
    Ok(())
}

fn init(path: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(default_config_path);
    if path.exists() && !force {
        anyhow::bail!("{} already exists. Use --force to overwrite.", path.display());
    }
    DelineatorConfig::default()
        .save(&path)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn check(path: &std::path::Path) -> anyhow::Result<()> {
    let config = DelineatorConfig::load(path)?;
    config
        .validate()
        .with_context(|| format!("{} is invalid", path.display()))?;
    println!("{}: OK", path.display());
    Ok(())
}

//! smdx-manifest - Write a checksum manifest for a directory of SMDX files
//!
//! Lists every definition file with its MD5 in `manifest.xml` and writes the
//! manifest's own hash to `manifest.xml.md5`.

use anyhow::{Context, Result};
use clap::Parser;
use smdx_cli::{config, logging};
use smdx_core::manifest;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "smdx-manifest")]
#[command(about = "Generate the SunSpec manifest for a directory of SMDX files")]
#[command(version)]
struct Args {
    /// Directory holding the SMDX files (overrides the configuration file)
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long, default_value = "smdx.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Print file hashes to stdout
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    logging::init(&args.log_level)?;

    let mut config = config::load_config(&args.config)?.manifest;
    if let Some(path) = args.path {
        config.path = path;
    }

    let manifest = manifest::scan(&config)
        .with_context(|| format!("Failed to scan {}", config.path.display()))?;

    if args.list {
        for entry in &manifest.file {
            println!("{}  :  {}", entry.name, entry.md5);
        }
    }

    manifest
        .write(&config)
        .with_context(|| format!("Failed to write {}", config.manifest_path().display()))?;

    Ok(())
}

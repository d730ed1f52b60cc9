//! smdx2model - Convert a SunSpec SMDX model definition to a .model layout
//!
//! Reads one SMDX document and writes the flat register layout used by the
//! SunSpec test tooling.

use anyhow::{Context, Result};
use clap::Parser;
use smdx_cli::config::{self, Config};
use smdx_cli::logging;
use smdx_core::{convert_file, SmdxError};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "smdx2model")]
#[command(about = "Convert a sunspec map in SMDX format to a base model file")]
#[command(version)]
struct Args {
    /// The location of the smdx file
    #[arg(short, long)]
    smdx: Option<PathBuf>,

    /// The name of the model file to write (default: output.model)
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Model name written in the layout header (default: model_test)
    #[arg(short, long)]
    name: Option<String>,

    /// Path to configuration file
    #[arg(short, long, default_value = "smdx.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// The `--smdx` flag wins over `[convert].input`; with neither there is
/// nothing to convert.
fn resolve_input(args: &Args, config: &Config) -> Result<PathBuf, SmdxError> {
    args.smdx
        .clone()
        .or_else(|| config.convert.input.clone())
        .ok_or(SmdxError::InputMissing)
}

fn resolve_output(args: &Args, config: &Config) -> PathBuf {
    args.model
        .clone()
        .unwrap_or_else(|| config.convert.output.clone())
}

fn main() -> Result<()> {
    let args = Args::parse();

    logging::init(&args.log_level)?;
    debug!("smdx2model v{}", env!("CARGO_PKG_VERSION"));

    let mut config = config::load_config(&args.config)?;

    // Command line flags override the configuration file
    if let Some(name) = &args.name {
        config.convert.model_name = name.clone();
    }
    let input = resolve_input(&args, &config).context("Must specify an smdx file to read")?;
    let output = resolve_output(&args, &config);

    let options = config.convert.to_options();
    let model = convert_file(&input, &output, &options)
        .with_context(|| format!("Failed to convert {}", input.display()))?;

    debug!("{}", model);
    info!(
        blocks = model.blocks().len(),
        registers = model.total_length(),
        "Conversion complete"
    );

    Ok(())
}

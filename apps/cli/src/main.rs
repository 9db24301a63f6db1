// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CGA-Lite batch runner
//!
//! Applies one rule program to every lot in a JSON file and writes one result
//! file per lot.
//!
//! Usage:
//!   cga-lite <program.json> <lots.json> [--output DIR] [--epsg CODE]
//!
//! Environment: `CGA_WORKER_THREADS`, `CGA_DEFAULT_EPSG`, `CGA_OUTPUT_DIR`,
//! `LOG_FORMAT` (`json` for structured logs), `RUST_LOG`.

use anyhow::Context;
use cga_lite_core::{BuiltinCrsCatalog, CrsCatalog};
use cga_lite_engine::{InterpreterConfig, RuleInterpreter, RuleProgram};
use std::env;
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

mod batch;
mod config;
mod error;
mod sink;

use config::{CliOptions, Config, LogFormat};
use error::CliError;
use sink::JsonFileSink;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return Ok(());
    }

    let mut config = Config::from_env();
    init_logging(config.log_format);

    let options = CliOptions::parse(&args[1..])?;
    config.apply(&options);

    let default_crs = BuiltinCrsCatalog::new()
        .lookup(config.default_epsg)
        .ok_or(CliError::UnknownCrs(config.default_epsg))?;

    tracing::info!(
        worker_threads = config.worker_threads,
        default_crs = %default_crs,
        output_dir = %config.output_dir.display(),
        "Starting CGA-Lite runner"
    );

    rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_threads)
        .build_global()
        .context("Failed to initialize worker pool")?;

    let program = RuleProgram::from_json(&read_json(&options.program)?).map_err(CliError::from)?;
    let lots = batch::parse_lots(read_json(&options.lots)?)
        .with_context(|| format!("Invalid lots file {}", options.lots.display()))?;
    let sink = JsonFileSink::create(&config.output_dir)?;

    let interpreter = RuleInterpreter::new(InterpreterConfig {
        default_crs,
        ..InterpreterConfig::default()
    });
    let summary = batch::run_batch(&interpreter, &program, &lots, &sink)?;

    println!(
        "{}: {} succeeded, {} failed -> {}",
        program.name,
        summary.succeeded,
        summary.failed,
        config.output_dir.display()
    );
    if summary.failed > 0 {
        std::process::exit(2);
    }
    Ok(())
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cga_lite_engine=debug"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

fn read_json(path: &Path) -> anyhow::Result<serde_json::Value> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn print_usage() {
    eprintln!("CGA-Lite: apply a rule program to lot polygons");
    eprintln!();
    eprintln!("Usage: cga-lite <program.json> <lots.json> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --output, -o DIR   Result directory (default: $CGA_OUTPUT_DIR or ./out)");
    eprintln!("  --epsg CODE        CRS for lots without one (default: $CGA_DEFAULT_EPSG or 3857)");
    eprintln!();
    eprintln!("Lots file: JSON array of {{\"id\", \"polygon\": [[x, y], ...], \"attributes\"?, \"crs\"?}}");
}

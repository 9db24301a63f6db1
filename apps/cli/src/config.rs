// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Runner configuration: environment variables, overridden by arguments.

use crate::error::CliError;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Runner configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Number of rayon worker threads.
    pub worker_threads: usize,
    /// EPSG code assumed for lots without a `crs`.
    pub default_epsg: u32,
    /// Directory receiving one result file per lot.
    pub output_dir: PathBuf,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            worker_threads: lookup("CGA_WORKER_THREADS")
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or_else(num_cpus::get),
            default_epsg: lookup("CGA_DEFAULT_EPSG")
                .and_then(|v| v.parse().ok())
                .unwrap_or(3857),
            output_dir: lookup("CGA_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./out")),
            log_format: match lookup("LOG_FORMAT").as_deref() {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        }
    }

    pub fn apply(&mut self, options: &CliOptions) {
        if let Some(dir) = &options.output_dir {
            self.output_dir = dir.clone();
        }
        if let Some(epsg) = options.epsg {
            self.default_epsg = epsg;
        }
    }
}

/// Parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub struct CliOptions {
    pub program: PathBuf,
    pub lots: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub epsg: Option<u32>,
}

impl CliOptions {
    /// Parse arguments, excluding the binary name.
    pub fn parse(args: &[String]) -> Result<Self, CliError> {
        let mut positional = Vec::new();
        let mut output_dir = None;
        let mut epsg = None;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--output" | "-o" => {
                    i += 1;
                    let value = args
                        .get(i)
                        .ok_or_else(|| CliError::MissingValue("--output".into()))?;
                    output_dir = Some(PathBuf::from(value));
                }
                "--epsg" => {
                    i += 1;
                    let value = args
                        .get(i)
                        .ok_or_else(|| CliError::MissingValue("--epsg".into()))?;
                    let code = value
                        .trim_start_matches("EPSG:")
                        .parse()
                        .map_err(|_| CliError::InvalidValue {
                            option: "--epsg".into(),
                            value: value.clone(),
                        })?;
                    epsg = Some(code);
                }
                other if other.starts_with('-') => {
                    return Err(CliError::UnknownOption(other.to_string()));
                }
                path => positional.push(PathBuf::from(path)),
            }
            i += 1;
        }

        let mut positional = positional.into_iter();
        match (positional.next(), positional.next(), positional.next()) {
            (Some(program), Some(lots), None) => Ok(Self {
                program,
                lots,
                output_dir,
                epsg,
            }),
            _ => Err(CliError::MissingInput),
        }
    }
}

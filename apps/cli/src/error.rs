// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the command-line runner.

use cga_lite_engine::SinkError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Missing value for option {0}")]
    MissingValue(String),

    #[error("Invalid value '{value}' for option {option}")]
    InvalidValue { option: String, value: String },

    #[error("Unknown option: {0}")]
    UnknownOption(String),

    #[error("Expected <program.json> <lots.json>")]
    MissingInput,

    #[error("Unknown EPSG code {0}")]
    UnknownCrs(u32),

    #[error("Invalid rule program ({code}): {message}")]
    Program { code: String, message: String },

    #[error("Duplicate lot id '{0}'")]
    DuplicateLot(String),

    #[error("Lot ids '{first}' and '{second}' would both be written to {stem}.json")]
    LotFileCollision {
        first: String,
        second: String,
        stem: String,
    },

    #[error("Lot file contains no lots")]
    NoLots,

    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl From<cga_lite_core::Error> for CliError {
    fn from(err: cga_lite_core::Error) -> Self {
        CliError::Program {
            code: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for massing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while validating input or applying rules
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed CRS record or rule program shape
    #[error("Schema error: {0}")]
    Schema(String),

    /// Too few vertices or invalid polygon topology
    #[error("Geometry error: {0}")]
    Geometry(String),

    /// Numeric parameter outside its allowed range
    #[error("Range error: {0}")]
    Range(String),

    /// Rule tag that is not part of the rule language
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// Polygon clipping produced an empty or degenerate result
    #[error("Boolean operation failed: {0}")]
    BooleanOp(String),
}

impl Error {
    pub fn schema(msg: impl Into<String>) -> Self {
        Error::Schema(msg.into())
    }

    pub fn geometry(msg: impl Into<String>) -> Self {
        Error::Geometry(msg.into())
    }

    pub fn range(msg: impl Into<String>) -> Self {
        Error::Range(msg.into())
    }

    /// Stable machine-readable code for this error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Schema(_) => "SCHEMA_ERROR",
            Error::Geometry(_) => "GEOMETRY_ERROR",
            Error::Range(_) => "RANGE_ERROR",
            Error::UnknownOperation(_) => "UNKNOWN_OPERATION",
            Error::BooleanOp(_) => "BOOLEAN_OP_ERROR",
        }
    }
}

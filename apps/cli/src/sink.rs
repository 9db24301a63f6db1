// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Writes one pretty-printed JSON result per lot.

use cga_lite_engine::{GeometrySink, RuleExecutionResult, SinkError};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    /// Create the output directory if needed.
    pub fn create(dir: impl AsRef<Path>) -> Result<Self, SinkError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, lot_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(lot_id)))
    }
}

impl GeometrySink for JsonFileSink {
    fn commit(&self, lot_id: &str, result: &RuleExecutionResult) -> Result<(), SinkError> {
        let stem = file_stem(lot_id);
        if stem.is_empty() {
            return Err(SinkError::Rejected {
                lot: lot_id.to_string(),
                reason: "lot id has no usable file name characters".to_string(),
            });
        }

        let mut writer = BufWriter::new(File::create(self.path_for(lot_id))?);
        serde_json::to_writer_pretty(&mut writer, result)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

/// Lot ids become file names: anything outside `[A-Za-z0-9._-]` maps to `_`
pub(crate) fn file_stem(lot_id: &str) -> String {
    lot_id
        .trim()
        .trim_start_matches('.')
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

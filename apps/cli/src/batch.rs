// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lot loading and parallel execution.

use crate::error::CliError;
use crate::sink::file_stem;
use cga_lite_engine::{GeometryContext, GeometrySink, RuleInterpreter, RuleProgram};
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;
use tracing::{info, warn};

/// One entry of the lots file: an id plus the execution context.
#[derive(Debug, Clone, Deserialize)]
pub struct LotRecord {
    pub id: String,
    #[serde(flatten)]
    pub context: GeometryContext,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Decode the lots file, a JSON array of [`LotRecord`]s with unique ids.
///
/// Ids must also stay distinct once mapped to output file names.
pub fn parse_lots(value: serde_json::Value) -> anyhow::Result<Vec<LotRecord>> {
    let lots: Vec<LotRecord> = serde_json::from_value(value)?;
    if lots.is_empty() {
        return Err(CliError::NoLots.into());
    }

    let mut seen = FxHashSet::default();
    let mut stems: FxHashMap<String, &str> = FxHashMap::default();
    for lot in &lots {
        if !seen.insert(lot.id.as_str()) {
            return Err(CliError::DuplicateLot(lot.id.clone()).into());
        }
        let stem = file_stem(&lot.id);
        if let Some(first) = stems.get(&stem) {
            return Err(CliError::LotFileCollision {
                first: first.to_string(),
                second: lot.id.clone(),
                stem,
            }
            .into());
        }
        stems.insert(stem, lot.id.as_str());
    }
    Ok(lots)
}

/// Run `program` over every lot on the rayon pool and commit each result.
///
/// Rule failures are part of the result and do not stop the batch; a sink
/// failure does.
pub fn run_batch(
    interpreter: &RuleInterpreter,
    program: &RuleProgram,
    lots: &[LotRecord],
    sink: &dyn GeometrySink,
) -> Result<BatchSummary, CliError> {
    let outcomes = lots
        .par_iter()
        .map(|lot| -> Result<bool, CliError> {
            let result = interpreter.execute(program, &lot.context);
            if let Some(error) = &result.error {
                warn!(lot = %lot.id, code = %error.code, "{}", error.message);
            }
            sink.commit(&lot.id, &result)?;
            Ok(result.success)
        })
        .collect::<Result<Vec<bool>, CliError>>()?;

    let succeeded = outcomes.iter().filter(|ok| **ok).count();
    let summary = BatchSummary {
        succeeded,
        failed: outcomes.len() - succeeded,
    };
    info!(
        program = %program.name,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "Batch complete"
    );
    Ok(summary)
}

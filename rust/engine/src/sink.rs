// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Commit targets for execution results
//!
//! Persisting results is the host's concern; the interpreter only produces
//! them. A sink receives one result per lot.

use crate::context::RuleExecutionResult;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Sink rejected result for lot '{lot}': {reason}")]
    Rejected { lot: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Destination for finished executions
pub trait GeometrySink: Send + Sync {
    fn commit(&self, lot_id: &str, result: &RuleExecutionResult) -> Result<(), SinkError>;
}

/// Keeps committed results in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    commits: Mutex<Vec<(String, RuleExecutionResult)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything committed so far, in commit order
    pub fn commits(&self) -> Vec<(String, RuleExecutionResult)> {
        match self.commits.lock() {
            Ok(commits) => commits.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.commits().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl GeometrySink for MemorySink {
    fn commit(&self, lot_id: &str, result: &RuleExecutionResult) -> Result<(), SinkError> {
        let mut commits = self.commits.lock().map_err(|_| SinkError::Rejected {
            lot: lot_id.to_string(),
            reason: "memory sink lock poisoned".to_string(),
        })?;
        commits.push((lot_id.to_string(), result.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ExecutionMetadata;
    use cga_lite_core::Attributes;

    fn empty_result() -> RuleExecutionResult {
        RuleExecutionResult {
            success: true,
            geometry: None,
            attributes: Attributes::default(),
            error: None,
            warnings: Vec::new(),
            metadata: ExecutionMetadata::default(),
        }
    }

    #[test]
    fn memory_sink_keeps_order() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());
        sink.commit("lot-b", &empty_result()).unwrap();
        sink.commit("lot-a", &empty_result()).unwrap();
        let ids: Vec<String> = sink.commits().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["lot-b", "lot-a"]);
    }

    #[test]
    fn sink_is_object_safe() {
        let sink: Box<dyn GeometrySink> = Box::new(MemorySink::new());
        assert!(sink.commit("lot", &empty_result()).is_ok());
    }
}

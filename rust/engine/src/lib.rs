// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # CGA-Lite Engine
//!
//! Executes declarative rule programs (extrude, offset, setback, split,
//! repeat, roof, texture tags, attributes) against validated lot polygons.
//!
//! ```no_run
//! use cga_lite_core::Point2;
//! use cga_lite_engine::{GeometryContext, RuleInterpreter};
//! use serde_json::json;
//!
//! let lot = GeometryContext::new(vec![
//!     Point2::new(0.0, 0.0),
//!     Point2::new(30.0, 0.0),
//!     Point2::new(30.0, 20.0),
//!     Point2::new(0.0, 20.0),
//! ]);
//! let program = json!({
//!     "name": "townhouse",
//!     "rules": [
//!         {"type": "setback", "distance": 3},
//!         {"type": "extrude", "height": 9},
//!         {"type": "roof", "kind": "gable"}
//!     ]
//! });
//!
//! let result = RuleInterpreter::default().execute_json(&program, &lot);
//! assert!(result.success);
//! ```

pub mod context;
pub mod interpreter;
pub mod program;
pub mod sink;
pub mod state;

pub use context::{
    ExecutionError, ExecutionMetadata, ExecutionPhase, GeometryContext, RuleExecutionResult,
};
pub use interpreter::{InterpreterConfig, RuleInterpreter};
pub use program::{Rule, RuleProgram, SetbackDistance, RULE_TAGS};
pub use sink::{GeometrySink, MemorySink, SinkError};
pub use state::ExecutionState;

pub use cga_lite_core::{Error, Result};

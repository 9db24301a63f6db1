// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rule interpreter
//!
//! An execution goes `Validating -> Running -> {Succeeded, Failed}`. The lot
//! polygon is validated against its CRS, normalized to counter-clockwise
//! winding and wrapped as a ground surface. Rules are then folded over
//! [`ExecutionState`] in order; the first failing rule stops the fold.

use crate::context::{
    ExecutionError, ExecutionMetadata, ExecutionPhase, GeometryContext, RuleExecutionResult,
};
use crate::program::RuleProgram;
use crate::state::ExecutionState;
use cga_lite_core::validation::DUPLICATE_VERTEX_EPSILON;
use cga_lite_core::{
    ensure_counter_clockwise, validate_crs, Attributes, Crs, Error, GeometryValidator,
};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, debug_span, warn};

/// Interpreter-wide settings
#[derive(Debug, Clone, PartialEq)]
pub struct InterpreterConfig {
    /// CRS assumed for lots that do not carry one
    pub default_crs: Crs,
    pub duplicate_vertex_epsilon: f64,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            default_crs: Crs::web_mercator(),
            duplicate_vertex_epsilon: DUPLICATE_VERTEX_EPSILON,
        }
    }
}

/// Executes rule programs against lot polygons
///
/// The interpreter holds no per-execution state, so one instance can serve
/// many lots concurrently.
#[derive(Debug, Clone, Default)]
pub struct RuleInterpreter {
    config: InterpreterConfig,
}

impl RuleInterpreter {
    pub fn new(config: InterpreterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Decode an untyped program and execute it
    ///
    /// Decoding failures (unknown rule tags included) are reported before any
    /// rule runs, with `operationCount` 0.
    pub fn execute_json(&self, program: &Value, context: &GeometryContext) -> RuleExecutionResult {
        let started = Instant::now();
        match RuleProgram::from_json(program) {
            Ok(program) => self.run(&program, context, started),
            Err(error) => {
                warn!(code = error.kind(), "Rejected rule program: {}", error);
                failure(
                    &error,
                    ExecutionPhase::Validating,
                    None,
                    context.attributes.clone(),
                    Vec::new(),
                    0,
                    started,
                )
            }
        }
    }

    pub fn execute(&self, program: &RuleProgram, context: &GeometryContext) -> RuleExecutionResult {
        self.run(program, context, Instant::now())
    }

    fn run(
        &self,
        program: &RuleProgram,
        context: &GeometryContext,
        started: Instant,
    ) -> RuleExecutionResult {
        let span = debug_span!("rule_program", name = %program.name, rules = program.rules.len());
        let _enter = span.enter();

        let lot_crs = match context.crs.as_ref().map(validate_crs).transpose() {
            Ok(crs) => crs,
            Err(error) => {
                warn!(code = error.kind(), "Lot CRS rejected: {}", error);
                return failure(
                    &error,
                    ExecutionPhase::Validating,
                    None,
                    context.attributes.clone(),
                    Vec::new(),
                    0,
                    started,
                );
            }
        };
        let crs: &Crs = lot_crs.as_ref().unwrap_or(&self.config.default_crs);
        let report = GeometryValidator::new(self.config.duplicate_vertex_epsilon)
            .validate_for_rules(&context.polygon, crs);
        for warning in &report.warnings {
            warn!(crs = %crs, "{}", warning);
        }
        if !report.valid {
            let error = Error::geometry(report.errors.join("; "));
            warn!(code = error.kind(), "Lot polygon rejected: {}", error);
            return failure(
                &error,
                ExecutionPhase::Validating,
                None,
                context.attributes.clone(),
                report.warnings,
                0,
                started,
            );
        }

        let footprint = ensure_counter_clockwise(&context.polygon);
        let initial = ExecutionState::initial(&footprint, &context.attributes, &program.attrs);

        let outcome = program
            .rules
            .iter()
            .enumerate()
            .try_fold(initial, |state, (index, rule)| match state.apply(rule) {
                Ok(next) => {
                    debug!(index, rule = rule.tag(), "Applied rule");
                    Ok(next)
                }
                Err(error) => Err((state, index, error)),
            });

        match outcome {
            Ok(state) => {
                let operation_count = state.operation_count;
                let attributes = state.attributes.clone();
                let geometry = state.into_geometry();
                debug!(
                    operations = operation_count,
                    polygons = geometry.polygons.len(),
                    "Rule program finished"
                );
                RuleExecutionResult {
                    success: true,
                    geometry: Some(geometry),
                    attributes,
                    error: None,
                    warnings: report.warnings,
                    metadata: ExecutionMetadata {
                        operation_count,
                        execution_time_ms: elapsed_ms(started),
                    },
                }
            }
            Err((state, index, error)) => {
                let tag = program.rules.get(index).map(|r| r.tag()).unwrap_or("?");
                warn!(
                    rule_index = index,
                    rule = tag,
                    code = error.kind(),
                    "Rule failed: {}",
                    error
                );
                failure(
                    &error,
                    ExecutionPhase::Running,
                    Some(index),
                    state.attributes,
                    report.warnings,
                    state.operation_count,
                    started,
                )
            }
        }
    }
}

fn failure(
    error: &Error,
    phase: ExecutionPhase,
    rule_index: Option<usize>,
    attributes: Attributes,
    warnings: Vec<String>,
    operation_count: usize,
    started: Instant,
) -> RuleExecutionResult {
    RuleExecutionResult {
        success: false,
        geometry: None,
        attributes,
        error: Some(ExecutionError::new(error, phase, rule_index)),
        warnings,
        metadata: ExecutionMetadata {
            operation_count,
            execution_time_ms: elapsed_ms(started),
        },
    }
}

#[inline]
fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

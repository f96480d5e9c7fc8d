//! Error types for the rule-evaluation core.
//!
//! Mirrors the "one enum per subsystem, `From` impls to bridge them" shape
//! used throughout this codebase's protocol layer: interpreter failures,
//! graph-construction failures, and rule-execution failures are distinct
//! types because callers react to them differently.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Failure produced by the interpreter (`interpreter::evaluate`) or the
/// streaming reducer (`streaming::evaluate_stream`).
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum Failure {
    /// An operator could not produce a value for the given shape (e.g. `find`
    /// with no match). Recoverable: the rule-engine layer skips the rule.
    #[error("operator produced no result")]
    NullResult,

    /// The expression was empty where a LogicExpr was required.
    #[error("expression is empty")]
    EmptyExpression,

    /// A single-key Obj named an operator that isn't registered.
    #[error("unknown operator: {operator}")]
    MissingOperation { operator: String },

    /// Malformed JSON, or a shape that isn't a valid LogicExpr (e.g. a
    /// multi-key Obj, or an operator argument that can't be parsed).
    #[error("invalid LogicExpr format: {message}")]
    InvalidFormat { message: String },

    /// The streaming parser hit an I/O error reading the byte stream.
    #[error("stream I/O error: {message}")]
    StreamIoError { message: String },
}

/// Result alias used across the interpreter and streaming reducer.
pub type EvalResult<T> = Result<T, Failure>;

/// Errors raised while building a `DependencyGraph`. Never caught
/// internally; surfaced to the caller with offending rule ids.
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum GraphError {
    /// A rule's `inputs` and `outputs` overlap.
    #[error("rule '{rule_id}' reads and writes the same path: {path}")]
    SameOutputAsInput { rule_id: String, path: String },

    /// Two rules claim the same output path.
    #[error("path '{path}' is produced by both '{first_rule_id}' and '{second_rule_id}'")]
    MultipleProducers {
        path: String,
        first_rule_id: String,
        second_rule_id: String,
    },

    /// The rule set's producer/consumer edges form a cycle.
    #[error("rule set contains a dependency cycle")]
    GraphContainsCycle { cycle_rule_ids: Vec<String> },
}

/// The cause wrapped by a fatal `RuleEngineError`.
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum RuleEngineCause {
    /// `rule.expression` failed to deserialize into a LogicExpr.
    #[error("failed to parse rule expression: {0}")]
    ExpressionParseError(String),

    /// The interpreter raised a non-recoverable `Failure` while evaluating
    /// the rule.
    #[error(transparent)]
    Evaluation(#[from] Failure),

    /// A rule's result could not be coerced into a `string -> Value` map.
    #[error("rule result is not a map: {0}")]
    NotAMap(String),

    /// A rule produced a context key that already existed.
    #[error("duplicate context key: {key}")]
    DuplicateContextKey { key: String },
}

/// Fatal execution error from `EvaluationEngine::evaluate`.
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[error("rule '{rule_id}' failed: {cause}")]
pub struct RuleEngineError {
    pub rule_id: String,
    pub cause: RuleEngineCause,
    pub params: HashMap<String, String>,
}

impl RuleEngineError {
    pub fn new(rule_id: impl Into<String>, cause: RuleEngineCause) -> Self {
        RuleEngineError {
            rule_id: rule_id.into(),
            cause,
            params: HashMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// Top-level error returned from `rule_evaluate`: either a graph-build
/// failure or a fatal execution failure.
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Execution(#[from] RuleEngineError),
}

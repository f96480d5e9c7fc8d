//! Operator Catalog
//!
//! Every LogicExpr operator the interpreter can dispatch to.
//! Each operator is either:
//!
//! - **Standard**: `fn(&EngineConfig, &Value, &Value) -> Result<Value, Failure>`.
//!   The interpreter reduces the payload (each list element, or the payload
//!   itself if it's an Obj) *before* calling the operator. Pure: no access to
//!   the evaluator, can't control whether sub-expressions run.
//! - **Functional**: `fn(&Value, &Value, &Interpreter) -> Result<Value, Failure>`.
//!   Receives the *raw*, unreduced payload plus a handle to the interpreter,
//!   so it can choose which sub-expressions to evaluate and against what
//!   data (`and`/`or` short-circuiting, `if` n-ary branching, `map`/`filter`
//!   per-element contexts).
//!
//! The registry (`registry::lookup`) is built once behind a `OnceLock`.

pub mod array_ops;
pub mod comparison;
pub mod data_access;
pub mod logic_ops;
pub mod numeric;
pub mod registry;
pub mod string_ops;
pub mod utility;

use crate::config::EngineConfig;
use crate::error::Failure;
use crate::value::Value;

pub type StandardOp = fn(&EngineConfig, &Value, &Value) -> Result<Value, Failure>;
pub type FunctionalOp = fn(&Value, &Value, &Interpreter<'_>) -> Result<Value, Failure>;

#[derive(Clone, Copy)]
pub enum OperatorKind {
    Standard(StandardOp),
    Functional(FunctionalOp),
}

/// Handle passed to functional operators so they can recursively evaluate
/// sub-expressions against data of their choosing.
#[derive(Clone, Copy)]
pub struct Interpreter<'a> {
    pub config: &'a EngineConfig,
}

impl<'a> Interpreter<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Interpreter { config }
    }

    pub fn evaluate(&self, expr: &Value, data: &Value) -> Result<Value, Failure> {
        crate::interpreter::evaluate(expr, data, self.config)
    }
}

/// A single argument, unwrapped from its list envelope if present.
/// `{"!": x}` and `{"!": [x]}` are equivalent; most unary/binary operators
/// accept either shape.
pub(crate) fn nth_arg(args: &Value, index: usize) -> Value {
    match args {
        Value::List(items) => items.get(index).cloned().unwrap_or(Value::Null),
        other if index == 0 => other.clone(),
        _ => Value::Null,
    }
}

pub(crate) fn single_arg(args: &Value) -> Value {
    nth_arg(args, 0)
}

//! Tree-walking interpreter: `evaluate(expr, data)` is the one function
//! everything else (the rule engine, the REPL, the streaming reducer once
//! it has produced a full subtree) calls to run a LogicExpr.

use crate::config::EngineConfig;
use crate::error::Failure;
use crate::operators::{registry, Interpreter, OperatorKind};
use crate::value::Value;

/// Evaluate `expr` against `data` under `config`.
///
/// - Lists map `evaluate` over their elements.
/// - A non-Obj, non-List value (including `Null`) passes through unchanged.
/// - An empty Obj evaluates to `data` itself (the "current context" shape).
/// - A single-key Obj dispatches to the named operator: its payload is
///   pre-reduced for a Standard operator, or passed raw to a Functional one.
/// - Any other Obj shape (zero keys is fine, 2+ keys is not) is
///   `Failure::InvalidFormat`; an unknown operator name is
///   `Failure::MissingOperation`.
pub fn evaluate(expr: &Value, data: &Value, config: &EngineConfig) -> Result<Value, Failure> {
    match expr {
        Value::List(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(evaluate(item, data, config)?);
            }
            Ok(Value::List(out))
        }
        Value::Obj(map) => {
            if map.is_empty() {
                return Ok(data.clone());
            }
            if map.len() != 1 {
                return Err(Failure::InvalidFormat {
                    message: format!(
                        "expression Obj must have exactly one operator key, found {}",
                        map.len()
                    ),
                });
            }
            let (op_name, payload) = map.iter().next().expect("checked len == 1 above");
            let kind = registry::lookup(op_name).ok_or_else(|| Failure::MissingOperation {
                operator: op_name.clone(),
            })?;
            match kind {
                OperatorKind::Functional(f) => {
                    let interp = Interpreter::new(config);
                    f(payload, data, &interp)
                }
                OperatorKind::Standard(f) => {
                    let reduced = reduce_payload(payload, data, config)?;
                    f(config, &reduced, data)
                }
            }
        }
        other => Ok(other.clone()),
    }
}

/// Standard operators receive their payload already evaluated: each list
/// element, or the payload-as-expression if it's an Obj.
fn reduce_payload(payload: &Value, data: &Value, config: &EngineConfig) -> Result<Value, Failure> {
    match payload {
        Value::List(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(evaluate(item, data, config)?);
            }
            Ok(Value::List(out))
        }
        Value::Obj(_) => evaluate(payload, data, config),
        other => Ok(other.clone()),
    }
}

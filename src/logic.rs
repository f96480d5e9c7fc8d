//! LogicExpr: the restricted shape of `Value` that the interpreter walks.
//! Not a separate Rust type — any `Value` may be handed to
//! `interpreter::evaluate`; this module only validates the invariant ahead
//! of time for callers (notably the rule engine) that want a clear
//! `InvalidFormat` error before execution rather than a generic
//! `MissingOperation` deep inside recursion.

use crate::error::Failure;
use crate::value::Value;

/// Parse a serialized LogicExpr (the rule's `expression` string) into a
/// `Value`.
pub fn parse(text: &str) -> Result<Value, Failure> {
    if text.trim().is_empty() {
        return Err(Failure::EmptyExpression);
    }
    let raw: serde_json::Value = serde_json::from_str(text).map_err(|e| Failure::InvalidFormat {
        message: e.to_string(),
    })?;
    Ok(crate::value::from_json(&raw))
}

/// Validate that `value` has the shape required of a LogicExpr: a
/// primitive, a list of LogicExprs, or an Obj with exactly one
/// string-named key (empty Obj is also valid — "evaluate to current data
/// context"). Validation is shallow; malformed sub-expressions surface as
/// `MissingOperation`/`InvalidFormat` during evaluation instead.
pub fn validate(value: &Value) -> Result<(), Failure> {
    match value {
        Value::List(items) => items.iter().try_for_each(validate),
        Value::Obj(map) => {
            if map.is_empty() {
                Ok(())
            } else if map.len() == 1 {
                Ok(())
            } else {
                Err(Failure::InvalidFormat {
                    message: format!(
                        "expression Obj must have exactly one operator key, found {}",
                        map.len()
                    ),
                })
            }
        }
        _ => Ok(()),
    }
}

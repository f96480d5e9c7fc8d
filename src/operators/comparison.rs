//! `< <= > >=`, including the 3-argument "between" form:
//! `{"<": [a, b, c]}` means `a < b && b < c`.

use crate::config::EngineConfig;
use crate::error::Failure;
use crate::value::Value;
use std::cmp::Ordering;

#[derive(Clone, Copy)]
enum CompareOp {
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    fn holds(self, ord: Ordering) -> bool {
        match self {
            CompareOp::Lt => ord == Ordering::Less,
            CompareOp::Le => ord != Ordering::Greater,
            CompareOp::Gt => ord == Ordering::Greater,
            CompareOp::Ge => ord != Ordering::Less,
        }
    }
}

/// Numeric comparison when both sides coerce to a decimal; otherwise
/// lexicographic string comparison. Exactly one side `Null` is always false.
fn compare(cfg: &EngineConfig, a: &Value, b: &Value, op: CompareOp) -> bool {
    if a.is_null() != b.is_null() {
        return false;
    }
    if let (Some(x), Some(y)) = (a.as_big_decimal(&cfg.math), b.as_big_decimal(&cfg.math)) {
        return x.partial_cmp(&y).is_some_and(|ord| op.holds(ord));
    }
    a.as_string()
        .partial_cmp(&b.as_string())
        .is_some_and(|ord| op.holds(ord))
}

fn chain(cfg: &EngineConfig, args: &Value, op: CompareOp) -> Result<Value, Failure> {
    let items = args.as_list();
    let result = match items.len() {
        2 => compare(cfg, &items[0], &items[1], op),
        3 => compare(cfg, &items[0], &items[1], op) && compare(cfg, &items[1], &items[2], op),
        _ => false,
    };
    Ok(Value::Bool(result))
}

pub fn less_than(cfg: &EngineConfig, args: &Value, _data: &Value) -> Result<Value, Failure> {
    chain(cfg, args, CompareOp::Lt)
}

pub fn less_than_or_equal(cfg: &EngineConfig, args: &Value, _data: &Value) -> Result<Value, Failure> {
    chain(cfg, args, CompareOp::Le)
}

pub fn greater_than(cfg: &EngineConfig, args: &Value, _data: &Value) -> Result<Value, Failure> {
    chain(cfg, args, CompareOp::Gt)
}

pub fn greater_than_or_equal(cfg: &EngineConfig, args: &Value, _data: &Value) -> Result<Value, Failure> {
    chain(cfg, args, CompareOp::Ge)
}

//! Array operators.
//!
//! `merge`/`in` are Standard (their arguments are plain values by the time
//! they run). `map`/`filter`/`reduce`/`all`/`some`/`none`/`find` are
//! Functional because each needs to evaluate a mapping expression against a
//! *different* data context per element. `sort`/`distinct`/`size`/`reverse`
//! don't strictly need per-element re-evaluation, but are wired as
//! Functional too so a direction/flag argument can itself be an expression.

use super::{logic_ops::loose_equals, nth_arg, Interpreter};
use crate::config::EngineConfig;
use crate::error::Failure;
use crate::value::Value;
use indexmap::IndexMap;
use std::cmp::Ordering;

pub fn merge(_cfg: &EngineConfig, args: &Value, _data: &Value) -> Result<Value, Failure> {
    let mut out = Vec::new();
    for item in args.as_list() {
        match item {
            Value::List(inner) => out.extend(inner),
            other => out.push(other),
        }
    }
    Ok(Value::List(out))
}

pub fn contains(_cfg: &EngineConfig, args: &Value, _data: &Value) -> Result<Value, Failure> {
    let needle = nth_arg(args, 0);
    let haystack = nth_arg(args, 1);
    let found = match &haystack {
        Value::List(items) => items.iter().any(|item| loose_equals(item, &needle)),
        Value::Str(s) => s.contains(&needle.as_string()),
        _ => false,
    };
    Ok(Value::Bool(found))
}

/// `Null` source means "nothing to iterate", not "one null element".
fn source_elems(source_val: &Value) -> Vec<Value> {
    if source_val.is_null() {
        vec![]
    } else {
        source_val.as_list()
    }
}

fn source_and_mapping(args: &Value, data: &Value, interp: &Interpreter<'_>) -> Result<(Value, Value), Failure> {
    let source_expr = nth_arg(args, 0);
    let mapping_expr = nth_arg(args, 1);
    let source_val = interp.evaluate(&source_expr, data)?;
    Ok((source_val, mapping_expr))
}

pub fn map(args: &Value, data: &Value, interp: &Interpreter<'_>) -> Result<Value, Failure> {
    let (source_val, mapping) = source_and_mapping(args, data, interp)?;
    if source_val.is_null() {
        return Ok(Value::Null);
    }
    let mut out = Vec::new();
    for elem in source_elems(&source_val) {
        out.push(interp.evaluate(&mapping, &elem)?);
    }
    Ok(Value::List(out))
}

pub fn filter(args: &Value, data: &Value, interp: &Interpreter<'_>) -> Result<Value, Failure> {
    let (source_val, mapping) = source_and_mapping(args, data, interp)?;
    if source_val.is_null() {
        return Ok(Value::Null);
    }
    let mut out = Vec::new();
    for elem in source_elems(&source_val) {
        if interp.evaluate(&mapping, &elem)?.as_bool() {
            out.push(elem);
        }
    }
    Ok(Value::List(out))
}

/// No match is "the operator cannot produce a value for this shape",
/// surfaced as `Failure::NullResult` rather than `Value::Null`.
pub fn find(args: &Value, data: &Value, interp: &Interpreter<'_>) -> Result<Value, Failure> {
    let (source_val, mapping) = source_and_mapping(args, data, interp)?;
    for elem in source_elems(&source_val) {
        if interp.evaluate(&mapping, &elem)?.as_bool() {
            return Ok(elem);
        }
    }
    Err(Failure::NullResult)
}

pub fn all(args: &Value, data: &Value, interp: &Interpreter<'_>) -> Result<Value, Failure> {
    let (source_val, mapping) = source_and_mapping(args, data, interp)?;
    let elems = source_elems(&source_val);
    if elems.is_empty() {
        return Ok(Value::Bool(false));
    }
    for elem in elems {
        if !interp.evaluate(&mapping, &elem)?.as_bool() {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
}

pub fn some(args: &Value, data: &Value, interp: &Interpreter<'_>) -> Result<Value, Failure> {
    let (source_val, mapping) = source_and_mapping(args, data, interp)?;
    for elem in source_elems(&source_val) {
        if interp.evaluate(&mapping, &elem)?.as_bool() {
            return Ok(Value::Bool(true));
        }
    }
    Ok(Value::Bool(false))
}

pub fn none(args: &Value, data: &Value, interp: &Interpreter<'_>) -> Result<Value, Failure> {
    match some(args, data, interp)? {
        Value::Bool(b) => Ok(Value::Bool(!b)),
        _ => unreachable!("some always returns Bool"),
    }
}

pub fn reduce(args: &Value, data: &Value, interp: &Interpreter<'_>) -> Result<Value, Failure> {
    let items = args.as_list();
    let source_expr = items.first().cloned().unwrap_or(Value::Null);
    let mapping = items.get(1).cloned().unwrap_or(Value::Null);
    let initial_expr = items.get(2).cloned().unwrap_or(Value::Null);

    let source_val = interp.evaluate(&source_expr, data)?;
    let mut accumulator = interp.evaluate(&initial_expr, data)?;
    for elem in source_elems(&source_val) {
        let mut ctx = IndexMap::new();
        ctx.insert("current".to_string(), elem);
        ctx.insert("accumulator".to_string(), accumulator);
        accumulator = interp.evaluate(&mapping, &Value::Obj(ctx))?;
    }
    Ok(accumulator)
}

/// Sorts a homogeneous list of numbers or strings; a heterogeneous list has
/// no well-defined order and yields `Null`. `{"sort": [source, "desc"]}`.
pub fn sort(args: &Value, data: &Value, interp: &Interpreter<'_>) -> Result<Value, Failure> {
    let items = args.as_list();
    let source_expr = items.first().cloned().unwrap_or(Value::Null);
    let direction_expr = items.get(1).cloned();

    let source_val = interp.evaluate(&source_expr, data)?;
    if source_val.is_null() {
        return Ok(Value::Null);
    }
    let descending = match direction_expr {
        Some(expr) => interp
            .evaluate(&expr, data)?
            .as_string()
            .eq_ignore_ascii_case("desc"),
        None => false,
    };

    let mut elems = source_val.as_list();
    let all_numeric = elems.iter().all(|v| matches!(v, Value::Num(_)));
    let all_stringy = elems.iter().all(|v| matches!(v, Value::Str(_)));
    let all_boolean = elems.iter().all(|v| matches!(v, Value::Bool(_)));

    if all_numeric {
        elems.sort_by(|a, b| match (a, b) {
            (Value::Num(x), Value::Num(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        });
    } else if all_stringy {
        elems.sort_by(|a, b| match (a, b) {
            (Value::Str(x), Value::Str(y)) => x.cmp(y),
            _ => Ordering::Equal,
        });
    } else if all_boolean {
        elems.sort_by(|a, b| match (a, b) {
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            _ => Ordering::Equal,
        });
    } else {
        return Ok(Value::Null);
    }

    if descending {
        elems.reverse();
    }
    Ok(Value::List(elems))
}

pub fn distinct(args: &Value, data: &Value, interp: &Interpreter<'_>) -> Result<Value, Failure> {
    let source_val = interp.evaluate(&nth_arg(args, 0), data)?;
    if source_val.is_null() {
        return Ok(Value::Null);
    }
    let mut out: Vec<Value> = Vec::new();
    for elem in source_val.as_list() {
        if !out.iter().any(|seen| seen == &elem) {
            out.push(elem);
        }
    }
    Ok(Value::List(out))
}

pub fn size(args: &Value, data: &Value, interp: &Interpreter<'_>) -> Result<Value, Failure> {
    let source_val = interp.evaluate(&nth_arg(args, 0), data)?;
    let n = match &source_val {
        Value::List(items) => items.len(),
        Value::Str(s) => s.chars().count(),
        Value::Obj(m) => m.len(),
        Value::Null => 0,
        _ => 1,
    };
    Ok(Value::num(n as i64))
}

pub fn reverse(args: &Value, data: &Value, interp: &Interpreter<'_>) -> Result<Value, Failure> {
    let source_val = interp.evaluate(&nth_arg(args, 0), data)?;
    if source_val.is_null() {
        return Ok(Value::Null);
    }
    let mut items = source_val.as_list();
    items.reverse();
    Ok(Value::List(items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::from_json;

    fn interp(cfg: &EngineConfig) -> Interpreter<'_> {
        Interpreter::new(cfg)
    }

    #[test]
    fn merge_flattens_one_level() {
        let cfg = EngineConfig::default();
        let args = Value::List(vec![
            Value::List(vec![Value::num(1), Value::num(2)]),
            Value::num(3),
        ]);
        assert_eq!(
            merge(&cfg, &args, &Value::Null).unwrap(),
            Value::List(vec![Value::num(1), Value::num(2), Value::num(3)])
        );
    }

    #[test]
    fn map_null_source_yields_null() {
        let cfg = EngineConfig::default();
        let args = Value::List(vec![Value::Null, Value::num(1)]);
        assert_eq!(map(&args, &Value::Null, &interp(&cfg)).unwrap(), Value::Null);
    }

    #[test]
    fn find_with_no_match_is_null_result() {
        let cfg = EngineConfig::default();
        let data = from_json(&serde_json::json!([0, 0, 0, 0]));
        let source_expr = Value::Obj([("var".to_string(), Value::str(""))].into_iter().collect());
        let mapping = Value::Obj(
            [(
                "!=".to_string(),
                Value::List(vec![
                    Value::Obj([("var".to_string(), Value::str(""))].into_iter().collect()),
                    Value::num(0),
                ]),
            )]
            .into_iter()
            .collect(),
        );
        let args = Value::List(vec![source_expr, mapping]);
        let result = find(&args, &data, &interp(&cfg));
        assert!(matches!(result, Err(Failure::NullResult)));
    }

    #[test]
    fn reduce_sums_with_accumulator_context() {
        let cfg = EngineConfig::default();
        let source = Value::List(vec![Value::num(1), Value::num(2), Value::num(3)]);
        let mapping = Value::Obj(
            [(
                "+".to_string(),
                Value::List(vec![
                    Value::Obj([("var".to_string(), Value::str("current"))].into_iter().collect()),
                    Value::Obj([("var".to_string(), Value::str("accumulator"))].into_iter().collect()),
                ]),
            )]
            .into_iter()
            .collect(),
        );
        let args = Value::List(vec![source, mapping, Value::num(0)]);
        assert_eq!(reduce(&args, &Value::Null, &interp(&cfg)).unwrap(), Value::num(6));
    }

    #[test]
    fn sort_heterogeneous_list_is_null() {
        let cfg = EngineConfig::default();
        let source = Value::List(vec![Value::num(1), Value::str("a")]);
        let args = Value::List(vec![source]);
        assert_eq!(sort(&args, &Value::Null, &interp(&cfg)).unwrap(), Value::Null);
    }

    #[test]
    fn sort_boolean_list_ascending() {
        let cfg = EngineConfig::default();
        let source = Value::List(vec![Value::Bool(true), Value::Bool(false), Value::Bool(true)]);
        let args = Value::List(vec![source]);
        assert_eq!(
            sort(&args, &Value::Null, &interp(&cfg)).unwrap(),
            Value::List(vec![Value::Bool(false), Value::Bool(true), Value::Bool(true)])
        );
    }

    #[test]
    fn distinct_preserves_first_occurrence_order() {
        let cfg = EngineConfig::default();
        let source = Value::List(vec![Value::num(1), Value::num(2), Value::num(1)]);
        let args = Value::List(vec![source]);
        assert_eq!(
            distinct(&args, &Value::Null, &interp(&cfg)).unwrap(),
            Value::List(vec![Value::num(1), Value::num(2)])
        );
    }
}

//! `==`, `!=`, `===`, `!==`, `!`, `!!`, `and`, `or`, `if`.

use super::{single_arg, Interpreter};
use crate::config::EngineConfig;
use crate::error::Failure;
use crate::value::Value;
use bigdecimal::BigDecimal;
use num_traits::{ToPrimitive, Zero};
use std::str::FromStr;

/// Collapse jsonLogic's single-element-list identification down to the
/// element, except when that element is a `Bool` (`[true] == true`, but
/// `[1] == 1`).
fn loose_unwrap(v: &Value) -> Value {
    if let Value::List(items) = v {
        if items.is_empty() {
            return Value::str("");
        }
        if items.len() == 1 {
            if matches!(items[0], Value::Null) {
                return Value::num(0);
            }
            if !matches!(items[0], Value::Bool(_)) {
                return loose_unwrap(&items[0]);
            }
        }
    }
    v.clone()
}

pub fn loose_equals(a: &Value, b: &Value) -> bool {
    let a = loose_unwrap(a);
    let b = loose_unwrap(b);
    match (&a, &b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), _) => loose_equals(&Value::num(i32::from(*x)), &b),
        (_, Value::Bool(y)) => loose_equals(&a, &Value::num(i32::from(*y))),
        (Value::Num(x), Value::Num(y)) => x == y,
        (Value::Num(x), Value::Str(s)) | (Value::Str(s), Value::Num(x)) => {
            if s.trim().is_empty() {
                x.is_zero()
            } else {
                BigDecimal::from_str(s.trim()).map(|y| &y == x).unwrap_or(false)
            }
        }
        (Value::Str(x), Value::Str(y)) => {
            match (BigDecimal::from_str(x.trim()), BigDecimal::from_str(y.trim())) {
                (Ok(nx), Ok(ny)) => nx == ny,
                _ => x == y,
            }
        }
        (Value::Null, Value::Str(s)) | (Value::Str(s), Value::Null) => s.is_empty(),
        (Value::Null, Value::Num(n)) | (Value::Num(n), Value::Null) => n.is_zero(),
        _ => a == b,
    }
}

pub fn strict_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Num(x), Value::Num(y)) => x.to_f64() == y.to_f64(),
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::List(x), Value::List(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(p, q)| strict_equals(p, q))
        }
        (Value::Obj(x), Value::Obj(y)) => {
            x.len() == y.len()
                && x.iter().all(|(k, v)| y.get(k).is_some_and(|w| strict_equals(v, w)))
        }
        _ => false,
    }
}

pub fn loose_eq(_cfg: &EngineConfig, args: &Value, _data: &Value) -> Result<Value, Failure> {
    let items = args.as_list();
    let (a, b) = (
        items.first().cloned().unwrap_or(Value::Null),
        items.get(1).cloned().unwrap_or(Value::Null),
    );
    Ok(Value::Bool(loose_equals(&a, &b)))
}

pub fn loose_ne(cfg: &EngineConfig, args: &Value, data: &Value) -> Result<Value, Failure> {
    match loose_eq(cfg, args, data)? {
        Value::Bool(b) => Ok(Value::Bool(!b)),
        _ => unreachable!("loose_eq always returns Bool"),
    }
}

pub fn strict_eq(_cfg: &EngineConfig, args: &Value, _data: &Value) -> Result<Value, Failure> {
    let items = args.as_list();
    let (a, b) = (
        items.first().cloned().unwrap_or(Value::Null),
        items.get(1).cloned().unwrap_or(Value::Null),
    );
    Ok(Value::Bool(strict_equals(&a, &b)))
}

pub fn strict_ne(cfg: &EngineConfig, args: &Value, data: &Value) -> Result<Value, Failure> {
    match strict_eq(cfg, args, data)? {
        Value::Bool(b) => Ok(Value::Bool(!b)),
        _ => unreachable!("strict_eq always returns Bool"),
    }
}

pub fn not(_cfg: &EngineConfig, args: &Value, _data: &Value) -> Result<Value, Failure> {
    Ok(Value::Bool(!single_arg(args).as_bool()))
}

pub fn double_not(_cfg: &EngineConfig, args: &Value, _data: &Value) -> Result<Value, Failure> {
    Ok(Value::Bool(single_arg(args).as_bool()))
}

/// Short-circuits left to right. When every operand evaluated so far is a
/// genuine `Bool`, the falsy stop returns `Bool(false)`; otherwise it returns
/// the raw falsy value, matching jsonLogic's truthy-passthrough behavior
/// rather than forcing everything to boolean.
pub fn and(args: &Value, data: &Value, interp: &Interpreter<'_>) -> Result<Value, Failure> {
    let items = args.as_list();
    if items.is_empty() {
        return Ok(Value::Null);
    }
    let mut all_bool = true;
    let mut last = Value::Null;
    for item in &items {
        let v = interp.evaluate(item, data)?;
        if !matches!(v, Value::Bool(_)) {
            all_bool = false;
        }
        if !v.as_bool() {
            return if all_bool { Ok(Value::Bool(false)) } else { Ok(v) };
        }
        last = v;
    }
    Ok(if all_bool { Value::Bool(true) } else { last })
}

pub fn or(args: &Value, data: &Value, interp: &Interpreter<'_>) -> Result<Value, Failure> {
    let items = args.as_list();
    if items.is_empty() {
        return Ok(Value::Null);
    }
    let mut all_bool = true;
    let mut last = Value::Null;
    for item in &items {
        let v = interp.evaluate(item, data)?;
        if !matches!(v, Value::Bool(_)) {
            all_bool = false;
        }
        if v.as_bool() {
            return if all_bool { Ok(Value::Bool(true)) } else { Ok(v) };
        }
        last = v;
    }
    Ok(if all_bool { Value::Bool(false) } else { last })
}

/// `{"if": [c1, v1, c2, v2, ..., else]}`. Each condition is evaluated only
/// until the first truthy one; its paired value is the only other branch
/// evaluated. Odd trailing element (no paired condition) is the final else.
pub fn if_op(args: &Value, data: &Value, interp: &Interpreter<'_>) -> Result<Value, Failure> {
    let items = args.as_list();
    match items.len() {
        0 => Ok(Value::Null),
        1 => interp.evaluate(&items[0], data),
        _ => {
            let mut i = 0;
            while i + 1 < items.len() {
                let cond = interp.evaluate(&items[i], data)?;
                if cond.as_bool() {
                    return interp.evaluate(&items[i + 1], data);
                }
                i += 2;
            }
            if i < items.len() {
                interp.evaluate(&items[i], data)
            } else {
                Ok(Value::Null)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_equals_implies_loose_equals() {
        let pairs = [
            (Value::num(1), Value::num(1)),
            (Value::str("a"), Value::str("a")),
            (Value::Bool(true), Value::Bool(true)),
        ];
        for (a, b) in pairs {
            assert!(strict_equals(&a, &b));
            assert!(loose_equals(&a, &b));
        }
    }

    #[test]
    fn loose_equals_empty_string_and_zero() {
        assert!(loose_equals(&Value::str(""), &Value::num(0)));
        assert!(!strict_equals(&Value::str(""), &Value::num(0)));
    }

    #[test]
    fn loose_equals_bool_and_string() {
        assert!(loose_equals(&Value::Bool(true), &Value::str("1")));
        assert!(loose_equals(&Value::Bool(false), &Value::str("")));
    }

    #[test]
    fn and_short_circuits_on_first_falsy() {
        let cfg = EngineConfig::default();
        let interp = Interpreter::new(&cfg);
        let args = Value::List(vec![
            Value::Bool(true),
            Value::Bool(false),
            Value::Obj(Default::default()), // would error if evaluated as "var"
        ]);
        // second element already Bool(false) so evaluation stops there
        let result = and(&args, &Value::Null, &interp).unwrap();
        assert_eq!(result, Value::Bool(false));
    }

    #[test]
    fn if_evaluates_only_matching_branch() {
        let cfg = EngineConfig::default();
        let interp = Interpreter::new(&cfg);
        let args = Value::List(vec![
            Value::Bool(false),
            Value::str("first"),
            Value::Bool(true),
            Value::str("second"),
            Value::str("else"),
        ]);
        assert_eq!(if_op(&args, &Value::Null, &interp).unwrap(), Value::str("second"));
    }

    #[test]
    fn if_falls_through_to_else() {
        let cfg = EngineConfig::default();
        let interp = Interpreter::new(&cfg);
        let args = Value::List(vec![Value::Bool(false), Value::str("a"), Value::str("else")]);
        assert_eq!(if_op(&args, &Value::Null, &interp).unwrap(), Value::str("else"));
    }
}

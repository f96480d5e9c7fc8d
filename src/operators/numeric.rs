//! `+ - * / % min max`.

use crate::config::EngineConfig;
use crate::error::Failure;
use crate::value::Value;
use bigdecimal::BigDecimal;
use num_traits::Zero;

fn coerce(cfg: &EngineConfig, v: &Value) -> BigDecimal {
    v.as_big_decimal(&cfg.math).unwrap_or_else(BigDecimal::zero)
}

pub fn add(cfg: &EngineConfig, args: &Value, _data: &Value) -> Result<Value, Failure> {
    let items = args.as_list();
    if items.is_empty() {
        return Ok(Value::Num(cfg.math.rescale(BigDecimal::zero())));
    }
    let mut acc = coerce(cfg, &items[0]);
    if items.len() == 1 {
        return Ok(Value::Num(cfg.math.rescale(acc)));
    }
    for item in &items[1..] {
        acc = cfg.math.add(&acc, &coerce(cfg, item));
    }
    Ok(Value::Num(acc))
}

pub fn subtract(cfg: &EngineConfig, args: &Value, _data: &Value) -> Result<Value, Failure> {
    let items = args.as_list();
    if items.is_empty() {
        return Ok(Value::Num(cfg.math.rescale(BigDecimal::zero())));
    }
    if items.len() == 1 {
        let n = coerce(cfg, &items[0]);
        return Ok(Value::Num(cfg.math.sub(&BigDecimal::zero(), &n)));
    }
    let mut acc = coerce(cfg, &items[0]);
    for item in &items[1..] {
        acc = cfg.math.sub(&acc, &coerce(cfg, item));
    }
    Ok(Value::Num(acc))
}

pub fn multiply(cfg: &EngineConfig, args: &Value, _data: &Value) -> Result<Value, Failure> {
    let items = args.as_list();
    if items.is_empty() {
        return Ok(Value::Num(cfg.math.rescale(BigDecimal::from(1))));
    }
    let mut acc = coerce(cfg, &items[0]);
    for item in &items[1..] {
        acc = cfg.math.mul(&acc, &coerce(cfg, item));
    }
    Ok(Value::Num(cfg.math.rescale(acc)))
}

/// Division or modulo by zero yields `Null`, never an error.
pub fn divide(cfg: &EngineConfig, args: &Value, _data: &Value) -> Result<Value, Failure> {
    let items = args.as_list();
    let a = coerce(cfg, items.first().unwrap_or(&Value::Null));
    let b = coerce(cfg, items.get(1).unwrap_or(&Value::Null));
    Ok(cfg.math.div(&a, &b).map(Value::Num).unwrap_or(Value::Null))
}

pub fn modulo(cfg: &EngineConfig, args: &Value, _data: &Value) -> Result<Value, Failure> {
    let items = args.as_list();
    let a = coerce(cfg, items.first().unwrap_or(&Value::Null));
    let b = coerce(cfg, items.get(1).unwrap_or(&Value::Null));
    Ok(cfg.math.rem(&a, &b).map(Value::Num).unwrap_or(Value::Null))
}

pub fn min(cfg: &EngineConfig, args: &Value, _data: &Value) -> Result<Value, Failure> {
    let items = args.as_list();
    let values: Vec<BigDecimal> = items
        .iter()
        .filter_map(|v| v.as_big_decimal(&cfg.math))
        .collect();
    Ok(values
        .into_iter()
        .min()
        .map(|n| Value::Num(cfg.math.rescale(n)))
        .unwrap_or(Value::Null))
}

pub fn max(cfg: &EngineConfig, args: &Value, _data: &Value) -> Result<Value, Failure> {
    let items = args.as_list();
    let values: Vec<BigDecimal> = items
        .iter()
        .filter_map(|v| v.as_big_decimal(&cfg.math))
        .collect();
    Ok(values
        .into_iter()
        .max()
        .map(|n| Value::Num(cfg.math.rescale(n)))
        .unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(vals: &[i64]) -> Value {
        Value::List(vals.iter().map(|n| Value::num(*n)).collect())
    }

    #[test]
    fn add_folds_left_to_right() {
        let cfg = EngineConfig::default();
        assert_eq!(add(&cfg, &list(&[1, 2, 3]), &Value::Null).unwrap(), Value::num(6));
    }

    #[test]
    fn divide_by_zero_is_null() {
        let cfg = EngineConfig::default();
        let args = Value::List(vec![Value::num(10), Value::num(0)]);
        assert_eq!(divide(&cfg, &args, &Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn modulo_by_zero_is_null() {
        let cfg = EngineConfig::default();
        let args = Value::List(vec![Value::num(10), Value::num(0)]);
        assert_eq!(modulo(&cfg, &args, &Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn min_max_over_mixed_list() {
        let cfg = EngineConfig::default();
        let args = list(&[5, 1, 9, 3]);
        assert_eq!(min(&cfg, &args, &Value::Null).unwrap(), Value::num(1));
        assert_eq!(max(&cfg, &args, &Value::Null).unwrap(), Value::num(9));
    }

    #[test]
    fn unary_minus_negates() {
        let cfg = EngineConfig::default();
        let args = Value::List(vec![Value::num(5)]);
        assert_eq!(subtract(&cfg, &args, &Value::Null).unwrap(), Value::num(-5));
    }
}

//! `var`, `missing`, `missing_some`.

use super::nth_arg;
use crate::config::EngineConfig;
use crate::error::Failure;
use crate::value::Value;
use num_traits::ToPrimitive;

/// `{"var": "a.b.c"}`, `{"var": ["a.b.c", default]}`, `{"var": ""}` /
/// `{"var": []}` / `{"var": null}` all mean "current data". A segment that
/// resolves to `Null` (missing key, out-of-range index, or a genuinely null
/// value) falls back to the supplied default, else `Null`.
pub fn var(cfg: &EngineConfig, args: &Value, data: &Value) -> Result<Value, Failure> {
    let (path_val, default) = match args {
        Value::List(items) => match items.len() {
            0 => return Ok(data.clone()),
            1 => (items[0].clone(), None),
            _ => (items[0].clone(), Some(items[1].clone())),
        },
        Value::Null => return Ok(data.clone()),
        Value::Obj(m) if m.is_empty() => return Ok(data.clone()),
        other => (other.clone(), None),
    };

    let path = path_val.as_string();
    if path.is_empty() {
        return Ok(data.clone());
    }

    let delim = cfg.var.path_delimiter;
    let mut current = data.clone();
    for segment in path.split(delim) {
        current = match &current {
            Value::Obj(map) => map.get(segment).cloned().unwrap_or(Value::Null),
            Value::List(items) => segment
                .parse::<usize>()
                .ok()
                .and_then(|i| items.get(i).cloned())
                .unwrap_or(Value::Null),
            _ => Value::Null,
        };
    }

    if current.is_null() {
        Ok(default.unwrap_or(Value::Null))
    } else {
        Ok(current)
    }
}

/// `{"missing": ["a", "b"]}` -> list of the given paths that are absent from
/// `data` (no default supplied).
pub fn missing(cfg: &EngineConfig, args: &Value, data: &Value) -> Result<Value, Failure> {
    let paths = args.as_list();
    let mut out = Vec::new();
    for path in paths {
        if var(cfg, &path, data)?.is_null() {
            out.push(path);
        }
    }
    Ok(Value::List(out))
}

/// `{"missing_some": [min_required, ["a", "b", "c"]]}` -> empty list if at
/// least `min_required` of the named paths are present, else the list of
/// missing ones.
pub fn missing_some(cfg: &EngineConfig, args: &Value, data: &Value) -> Result<Value, Failure> {
    let min_required = nth_arg(args, 0)
        .as_big_decimal(&cfg.math)
        .and_then(|d| d.to_i64())
        .unwrap_or(0)
        .max(0) as usize;
    let keys = nth_arg(args, 1).as_list();

    let mut missing_keys = Vec::new();
    let mut present = 0usize;
    for key in &keys {
        if var(cfg, key, data)?.is_null() {
            missing_keys.push(key.clone());
        } else {
            present += 1;
        }
    }

    if present >= min_required {
        Ok(Value::List(vec![]))
    } else {
        Ok(Value::List(missing_keys))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::from_json;

    #[test]
    fn var_resolves_dotted_path() {
        let cfg = EngineConfig::default();
        let data = from_json(&serde_json::json!({"a": {"b": {"c": 42}}}));
        let result = var(&cfg, &Value::str("a.b.c"), &data).unwrap();
        assert_eq!(result, Value::num(42));
    }

    #[test]
    fn var_falls_back_to_default_on_missing() {
        let cfg = EngineConfig::default();
        let data = from_json(&serde_json::json!({"a": 1}));
        let args = Value::List(vec![Value::str("nope"), Value::num(7)]);
        assert_eq!(var(&cfg, &args, &data).unwrap(), Value::num(7));
    }

    #[test]
    fn var_empty_path_returns_current_data() {
        let cfg = EngineConfig::default();
        let data = from_json(&serde_json::json!({"a": 1}));
        assert_eq!(var(&cfg, &Value::str(""), &data).unwrap(), data);
        assert_eq!(var(&cfg, &Value::Null, &data).unwrap(), data);
    }

    #[test]
    fn var_indexes_into_lists() {
        let cfg = EngineConfig::default();
        let data = from_json(&serde_json::json!({"a": [10, 20, 30]}));
        assert_eq!(var(&cfg, &Value::str("a.1"), &data).unwrap(), Value::num(20));
    }

    #[test]
    fn missing_some_reports_short_count() {
        let cfg = EngineConfig::default();
        let data = from_json(&serde_json::json!({"a": 1}));
        let args = Value::List(vec![
            Value::num(2),
            Value::List(vec![Value::str("a"), Value::str("b")]),
        ]);
        let result = missing_some(&cfg, &args, &data).unwrap();
        assert_eq!(result, Value::List(vec![Value::str("b")]));
    }
}

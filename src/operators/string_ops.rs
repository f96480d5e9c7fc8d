//! String operators.

use super::nth_arg;
use crate::config::EngineConfig;
use crate::error::Failure;
use crate::value::Value;

pub fn cat(_cfg: &EngineConfig, args: &Value, _data: &Value) -> Result<Value, Failure> {
    let joined: String = args.as_list().iter().map(Value::as_string).collect();
    Ok(Value::str(joined))
}

/// `{"substr": [s, start]}` / `{"substr": [s, start, length]}`. Negative
/// `start` counts from the end; negative `length` stops that many
/// characters before the end of the string.
pub fn substr(_cfg: &EngineConfig, args: &Value, _data: &Value) -> Result<Value, Failure> {
    let items = args.as_list();
    let chars: Vec<char> = items.first().map(Value::as_string).unwrap_or_default().chars().collect();
    let len = chars.len() as i64;

    let raw_start = items
        .get(1)
        .and_then(Value::as_big_decimal_lossy)
        .unwrap_or(0);
    let start = if raw_start < 0 {
        (len + raw_start).max(0)
    } else {
        raw_start.min(len)
    } as usize;

    let end = match items.get(2).and_then(Value::as_big_decimal_lossy) {
        None => len as usize,
        Some(n) if n < 0 => ((len + n).max(start as i64)) as usize,
        Some(n) => (start as i64 + n).clamp(start as i64, len) as usize,
    };

    Ok(Value::str(chars[start..end.max(start)].iter().collect::<String>()))
}

pub fn uppercase(_cfg: &EngineConfig, args: &Value, _data: &Value) -> Result<Value, Failure> {
    Ok(Value::str(super::single_arg(args).as_string().to_uppercase()))
}

pub fn lowercase(_cfg: &EngineConfig, args: &Value, _data: &Value) -> Result<Value, Failure> {
    Ok(Value::str(super::single_arg(args).as_string().to_lowercase()))
}

pub fn capitalize(_cfg: &EngineConfig, args: &Value, _data: &Value) -> Result<Value, Failure> {
    let s = super::single_arg(args).as_string();
    let mut chars = s.chars();
    let capitalized = match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    };
    Ok(Value::str(capitalized))
}

pub fn is_blank(_cfg: &EngineConfig, args: &Value, _data: &Value) -> Result<Value, Failure> {
    Ok(Value::Bool(super::single_arg(args).as_string().trim().is_empty()))
}

/// `{"replace": [s, search, replacement]}`, replacing every occurrence.
pub fn replace(_cfg: &EngineConfig, args: &Value, _data: &Value) -> Result<Value, Failure> {
    let source = nth_arg(args, 0).as_string();
    let search = nth_arg(args, 1).as_string();
    let replacement = nth_arg(args, 2).as_string();
    if search.is_empty() {
        return Ok(Value::str(source));
    }
    Ok(Value::str(source.replace(&search, &replacement)))
}

/// `{"to-array": [s, delimiter]}`, default delimiter `","`.
pub fn to_array(_cfg: &EngineConfig, args: &Value, _data: &Value) -> Result<Value, Failure> {
    let source = nth_arg(args, 0).as_string();
    let delim = match nth_arg(args, 1) {
        Value::Null => ",".to_string(),
        other => other.as_string(),
    };
    if source.is_empty() {
        return Ok(Value::List(vec![]));
    }
    let items = source.split(delim.as_str()).map(Value::str).collect();
    Ok(Value::List(items))
}

pub fn encode(_cfg: &EngineConfig, args: &Value, _data: &Value) -> Result<Value, Failure> {
    let s = super::single_arg(args).as_string();
    Ok(Value::str(urlencoding::encode(&s).into_owned()))
}

/// `{"format": [number, scale]}`, rescaling a decimal to a fixed number of
/// fractional digits for display (e.g. currency formatting).
pub fn format(cfg: &EngineConfig, args: &Value, _data: &Value) -> Result<Value, Failure> {
    let n = nth_arg(args, 0).as_big_decimal(&cfg.math).unwrap_or_default();
    let scale = nth_arg(args, 1)
        .as_big_decimal_lossy()
        .unwrap_or(cfg.math.scale);
    Ok(Value::str(n.with_scale(scale).to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cat_joins_stringified_args() {
        let cfg = EngineConfig::default();
        let args = Value::List(vec![Value::str("a"), Value::num(1), Value::Bool(true)]);
        assert_eq!(cat(&cfg, &args, &Value::Null).unwrap(), Value::str("a1true"));
    }

    #[test]
    fn substr_handles_negative_start() {
        let cfg = EngineConfig::default();
        let args = Value::List(vec![Value::str("jsonlogic"), Value::num(-5)]);
        assert_eq!(substr(&cfg, &args, &Value::Null).unwrap(), Value::str("logic"));
    }

    #[test]
    fn capitalize_upcases_first_char_only() {
        let cfg = EngineConfig::default();
        assert_eq!(
            capitalize(&cfg, &Value::str("hello world"), &Value::Null).unwrap(),
            Value::str("Hello world")
        );
    }

    #[test]
    fn replace_all_occurrences() {
        let cfg = EngineConfig::default();
        let args = Value::List(vec![Value::str("a.b.c"), Value::str("."), Value::str("-")]);
        assert_eq!(replace(&cfg, &args, &Value::Null).unwrap(), Value::str("a-b-c"));
    }

    #[test]
    fn to_array_splits_on_delimiter() {
        let cfg = EngineConfig::default();
        let args = Value::List(vec![Value::str("a,b,c")]);
        assert_eq!(
            to_array(&cfg, &args, &Value::Null).unwrap(),
            Value::List(vec![Value::str("a"), Value::str("b"), Value::str("c")])
        );
    }
}

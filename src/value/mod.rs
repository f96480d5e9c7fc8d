//! # Value Model
//!
//! The universal dynamic value the interpreter, operators, and rule engine
//! all speak: `Null | Bool | Num | Str | List | Obj`, plus the coercion
//! helpers every operator leans on.
//!
//! `Num` is backed by `BigDecimal` so arithmetic never silently loses
//! precision or drifts through `f64`; `Obj` is backed by `IndexMap` so
//! insertion order survives round-trips (required for `QueryInput`/`QueryOutput`
//! and for the "stringify with nested-flatten commas" rule below).

pub mod math;

pub use math::{MathContext, RoundingMode};

use bigdecimal::BigDecimal;
use indexmap::IndexMap;
use num_traits::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The universal dynamic value.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Num(BigDecimal),
    Str(String),
    List(Vec<Value>),
    Obj(IndexMap<String, Value>),
}

// `Value` is serialized through its JSON projection rather than via an
// `untagged` derive: bigdecimal's own `Deserialize` impl is happy to accept a
// JSON string, which would make an untagged enum swallow every `Str` as a
// `Num` attempt first. Routing through `serde_json::Value` keeps the tag
// decision anchored to the JSON type, matching the LogicExpr shape.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        to_json(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(from_json(&raw))
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Num(a), Value::Num(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Obj(a), Value::Obj(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    pub fn num(n: impl Into<BigDecimal>) -> Value {
        Value::Num(n.into())
    }

    pub fn str(s: impl Into<String>) -> Value {
        Value::Str(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// An Obj is an operator expression iff it is non-empty (its keys are
    /// already guaranteed to be strings by construction). Anything else is
    /// not an expression.
    pub fn is_expression(&self) -> bool {
        matches!(self, Value::Obj(m) if !m.is_empty())
    }

    /// Wrap a singleton into a one-element list unless it's already a list.
    pub fn as_list(&self) -> Vec<Value> {
        match self {
            Value::List(items) => items.clone(),
            other => vec![other.clone()],
        }
    }

    /// Truthiness rules.
    pub fn as_bool(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Num(n) => !n.is_zero(),
            Value::Str(s) => !s.is_empty() && s != "[]" && s != "null",
            Value::List(items) => !items.is_empty(),
            Value::Obj(m) => !m.is_empty(),
        }
    }

    /// Coerce to a `BigDecimal` under the given context's numeric parsing
    /// rules. `Null`, non-numeric strings, lists, and objects don't coerce.
    pub fn as_big_decimal(&self, _ctx: &MathContext) -> Option<BigDecimal> {
        match self {
            Value::Num(n) => Some(n.clone()),
            Value::Bool(b) => Some(BigDecimal::from(if *b { 1 } else { 0 })),
            Value::Str(s) => BigDecimal::from_str(s.trim()).ok(),
            _ => None,
        }
    }

    /// Coerce to `i64` under default numeric parsing rules, for operators
    /// (`substr`, `format`) that need a plain integer offset rather than a
    /// full `BigDecimal`.
    pub fn as_big_decimal_lossy(&self) -> Option<i64> {
        self.as_big_decimal(&MathContext::default()).and_then(|n| n.to_i64())
    }

    /// Stringify: integers print without a trailing decimal point, and
    /// nested lists/objects flatten with comma separators.
    pub fn as_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Num(n) => format_number(n),
            Value::Str(s) => s.clone(),
            Value::List(items) => items
                .iter()
                .map(Value::as_string)
                .collect::<Vec<_>>()
                .join(","),
            Value::Obj(_) => serde_json::to_string(&to_json(self)).unwrap_or_default(),
        }
    }
}

fn format_number(n: &BigDecimal) -> String {
    let normalized = n.normalized();
    if normalized.fractional_digit_count() <= 0 {
        normalized.with_scale(0).to_string()
    } else {
        normalized.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

/// Convert our `Value` into a `serde_json::Value`, e.g. to hand a rule's
/// result map back to a caller, or to feed `serde_json::to_string`.
pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Num(n) => {
            serde_json::Number::from_str(&n.to_string())
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null)
        }
        Value::Str(s) => serde_json::Value::String(s.clone()),
        Value::List(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Obj(map) => {
            let mut out = serde_json::Map::new();
            for (k, v) in map {
                out.insert(k.clone(), to_json(v));
            }
            serde_json::Value::Object(out)
        }
    }
}

/// Convert a `serde_json::Value` (parsed rule expression, config literal,
/// external data context) into our `Value`.
pub fn from_json(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => BigDecimal::from_str(&n.to_string())
            .map(Value::Num)
            .unwrap_or(Value::Null),
        serde_json::Value::String(s) => Value::Str(s.clone()),
        serde_json::Value::Array(items) => Value::List(items.iter().map(from_json).collect()),
        serde_json::Value::Object(map) => {
            let mut out = IndexMap::with_capacity(map.len());
            for (k, v) in map {
                out.insert(k.clone(), from_json(v));
            }
            Value::Obj(out)
        }
    }
}

//! Streaming Reducer: parses a LogicExpr from raw JSON bytes
//! with an explicit-stack parser (never recurses natively, so input depth
//! can't overflow the Rust call stack) and eagerly evaluates any operator
//! subtree whose nesting depth crosses `stream.max_stack` into its reduced
//! `Value` before continuing to assemble its parent. Nesting beneath an
//! operator named in `stream.reduction_ineligible` (default `{"if"}`) is
//! exempt for as long as that ancestor stays open, since eagerly evaluating
//! one of its branches would run a side of the conditional the interpreter
//! is supposed to skip.
//!
//! This achieves the same goal as the "doubly-linked token buffer with fast
//! splicing" design note — bound how much unreduced structure is ever held
//! at once — by collapsing a deep operator subtree to its evaluated `Value`
//! the moment it closes, rather than literally splicing a token list.

pub mod token;

use crate::config::EngineConfig;
use crate::error::Failure;
use crate::value::Value;
use bigdecimal::BigDecimal;
use indexmap::IndexMap;
use logos::Logos;
use std::str::FromStr;
use token::JsonToken;

enum Frame {
    Array(Vec<Value>),
    Object(IndexMap<String, Value>, Option<String>),
}

/// Parse `source` as a LogicExpr and evaluate it against `data`, reducing
/// deeply-nested operator subtrees as they close rather than only after a
/// full parse.
pub fn evaluate_stream(source: &str, data: &Value, config: &EngineConfig) -> Result<Value, Failure> {
    let value = parse_and_reduce(source, data, config)?;
    crate::interpreter::evaluate(&value, data, config)
}

fn parse_and_reduce(source: &str, data: &Value, config: &EngineConfig) -> Result<Value, Failure> {
    if source.trim().is_empty() {
        return Err(Failure::EmptyExpression);
    }

    let mut lexer = JsonToken::lexer(source);
    let mut stack: Vec<Frame> = Vec::new();
    // Parallel to `stack`: whether this frame is nested under an
    // ineligible-for-reduction operator. Inherited from the parent frame at
    // open time, then flipped true on an Object frame once its own key is
    // known to name an ineligible operator.
    let mut suppressed: Vec<bool> = Vec::new();
    let mut completed: Option<Value> = None;

    while let Some(token) = lexer.next() {
        let token = token.map_err(|()| Failure::StreamIoError {
            message: format!("invalid token at byte {}", lexer.span().start),
        })?;

        let inherited = suppressed.last().copied().unwrap_or(false);

        match token {
            JsonToken::LBrace => {
                stack.push(Frame::Object(IndexMap::new(), None));
                suppressed.push(inherited);
            }
            JsonToken::LBracket => {
                stack.push(Frame::Array(Vec::new()));
                suppressed.push(inherited);
            }
            JsonToken::RBrace => {
                let depth = stack.len();
                let was_suppressed = suppressed.pop().unwrap_or(false);
                let frame = stack.pop().ok_or_else(unbalanced)?;
                let map = match frame {
                    Frame::Object(map, _) => map,
                    Frame::Array(_) => return Err(mismatched()),
                };
                let value = maybe_reduce(Value::Obj(map), depth, was_suppressed, data, config)?;
                push_value(&mut stack, &mut completed, value)?;
            }
            JsonToken::RBracket => {
                let _depth = stack.len();
                suppressed.pop();
                let frame = stack.pop().ok_or_else(unbalanced)?;
                let items = match frame {
                    Frame::Array(items) => items,
                    Frame::Object(..) => return Err(mismatched()),
                };
                // Plain array closes are never eagerly reduced: a list is
                // either inert data or an operator's payload, and in the
                // latter case reduction happens when the *enclosing* Obj
                // closes, once the whole payload is known.
                push_value(&mut stack, &mut completed, Value::List(items))?;
            }
            JsonToken::Str => {
                let s = unescape(lexer.slice())?;
                let mut became_key = false;
                if let Some(Frame::Object(_, pending_key)) = stack.last_mut() {
                    if pending_key.is_none() {
                        *pending_key = Some(s.clone());
                        became_key = true;
                    }
                }
                if became_key {
                    if config.stream.reduction_ineligible.contains(s.as_str()) {
                        if let Some(flag) = suppressed.last_mut() {
                            *flag = true;
                        }
                    }
                } else {
                    push_value(&mut stack, &mut completed, Value::Str(s))?;
                }
            }
            JsonToken::Number => {
                let n = BigDecimal::from_str(lexer.slice()).map_err(|e| Failure::InvalidFormat {
                    message: e.to_string(),
                })?;
                push_value(&mut stack, &mut completed, Value::Num(n))?;
            }
            JsonToken::True => push_value(&mut stack, &mut completed, Value::Bool(true))?,
            JsonToken::False => push_value(&mut stack, &mut completed, Value::Bool(false))?,
            JsonToken::Null => push_value(&mut stack, &mut completed, Value::Null)?,
            JsonToken::Colon | JsonToken::Comma => {}
        }
    }

    if !stack.is_empty() {
        return Err(unbalanced());
    }
    completed.ok_or(Failure::EmptyExpression)
}

/// Depth is the number of containers open *including* the one just closed
/// (`stack.len()` before the pop that produced `value`).
fn maybe_reduce(
    value: Value,
    depth: usize,
    suppressed: bool,
    data: &Value,
    config: &EngineConfig,
) -> Result<Value, Failure> {
    if suppressed || depth <= config.stream.max_stack {
        return Ok(value);
    }
    crate::interpreter::evaluate(&value, data, config)
}

fn push_value(stack: &mut [Frame], completed: &mut Option<Value>, value: Value) -> Result<(), Failure> {
    match stack.last_mut() {
        Some(Frame::Array(items)) => {
            items.push(value);
            Ok(())
        }
        Some(Frame::Object(map, pending_key)) => {
            let key = pending_key.take().ok_or_else(|| Failure::InvalidFormat {
                message: "object value without a preceding key".to_string(),
            })?;
            map.insert(key, value);
            Ok(())
        }
        None => {
            *completed = Some(value);
            Ok(())
        }
    }
}

fn unescape(raw: &str) -> Result<String, Failure> {
    serde_json::from_str::<String>(raw).map_err(|e| Failure::InvalidFormat {
        message: e.to_string(),
    })
}

fn unbalanced() -> Failure {
    Failure::InvalidFormat {
        message: "unbalanced brackets in stream".to_string(),
    }
}

fn mismatched() -> Failure {
    Failure::InvalidFormat {
        message: "mismatched bracket type in stream".to_string(),
    }
}

//! `log`, `currentTime`. Both are ambient/observability operators threaded
//! through `EngineConfig` rather than hardcoded to a global sink or the
//! wall clock, so evaluation stays deterministic and testable.

use crate::config::EngineConfig;
use crate::error::Failure;
use crate::value::Value;
use bigdecimal::BigDecimal;

/// Identity function with a side effect: pipes the reduced argument through
/// `cfg.log_sink` and returns it unchanged.
pub fn log(cfg: &EngineConfig, args: &Value, _data: &Value) -> Result<Value, Failure> {
    let value = super::single_arg(args);
    (cfg.log_sink)(&value);
    Ok(value)
}

/// Current time in epoch milliseconds, read from `cfg.clock` rather than
/// `SystemTime::now()` directly, so tests can inject a fixed clock.
pub fn current_time(cfg: &EngineConfig, _args: &Value, _data: &Value) -> Result<Value, Failure> {
    Ok(Value::Num(BigDecimal::from(cfg.clock.now_millis())))
}

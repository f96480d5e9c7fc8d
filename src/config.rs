//! Configuration System
//!
//! Hierarchical configuration loading, the same shape as this codebase's own
//! `Config::load()`: merge `farm.toml` (defaults), then `farm.local.toml`
//! (git-ignored local overrides), then `FARM_`-prefixed environment
//! variables.
//!
//! ## Example
//!
//! ```toml
//! # farm.toml
//! [math]
//! scale = 64
//! rounding = "half_up"
//!
//! [cache]
//! policy = "lru"
//! max_graph = 64
//! ```
//!
//! Environment variable overrides:
//! ```bash
//! FARM_MATH__SCALE=32
//! FARM_CACHE__POLICY=disabled
//! ```

use crate::value::{MathContext, Value};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Injectable wall clock for the `currentTime` operator, so tests don't
/// depend on real time passing.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Default clock backed by `chrono::Utc::now()`.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Side-effect sink for the `log` operator; defaults to a `tracing::debug!`
/// emission when the caller supplies none.
pub type LogSink = Arc<dyn Fn(&Value) + Send + Sync>;

fn default_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}

fn default_log_sink() -> LogSink {
    Arc::new(|value: &Value| {
        tracing::debug!(value = %value, "log operator");
    })
}

/// `var.path_delimiter`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarConfig {
    #[serde(default = "default_path_delimiter")]
    pub path_delimiter: char,
}

fn default_path_delimiter() -> char {
    '.'
}

impl Default for VarConfig {
    fn default() -> Self {
        VarConfig {
            path_delimiter: default_path_delimiter(),
        }
    }
}

/// `stream.*` settings governing the streaming reducer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    #[serde(default = "default_max_stack")]
    pub max_stack: usize,
    #[serde(default = "default_reduction_ineligible")]
    pub reduction_ineligible: HashSet<String>,
}

fn default_max_stack() -> usize {
    100
}

fn default_reduction_ineligible() -> HashSet<String> {
    std::iter::once("if".to_string()).collect()
}

impl Default for StreamConfig {
    fn default() -> Self {
        StreamConfig {
            max_stack: default_max_stack(),
            reduction_ineligible: default_reduction_ineligible(),
        }
    }
}

/// `cache.policy`: which caching strategy the engine's two cache tiers use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CachePolicy {
    Disabled,
    Lru,
}

impl Default for CachePolicy {
    fn default() -> Self {
        CachePolicy::Lru
    }
}

/// `cache.*`. `max_graph`/`max_query` <= 0 means unbounded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub policy: CachePolicy,
    #[serde(default = "default_max_graph")]
    pub max_graph: i64,
    #[serde(default = "default_max_query")]
    pub max_query: i64,
}

fn default_max_graph() -> i64 {
    64
}

fn default_max_query() -> i64 {
    256
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            policy: CachePolicy::default(),
            max_graph: default_max_graph(),
            max_query: default_max_query(),
        }
    }
}

/// Ambient logging configuration, carried the same way this codebase's
/// `Config` always ships a `LoggingConfig` regardless of which subsystem is
/// in play. Governs `tracing_subscriber` setup in the `farm-repl` binary;
/// the library itself never installs a global subscriber.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Top-level engine configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub math: MathContext,
    #[serde(default)]
    pub var: VarConfig,
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(skip, default = "default_clock")]
    pub clock: Arc<dyn Clock>,
    #[serde(skip, default = "default_log_sink")]
    pub log_sink: LogSink,
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("math", &self.math)
            .field("var", &self.var)
            .field("stream", &self.stream)
            .field("cache", &self.cache)
            .field("logging", &self.logging)
            .finish_non_exhaustive()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            math: MathContext::default(),
            var: VarConfig::default(),
            stream: StreamConfig::default(),
            cache: CacheConfig::default(),
            logging: LoggingConfig::default(),
            clock: default_clock(),
            log_sink: default_log_sink(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from default locations, defaults merged first so
    /// a partial TOML file or a handful of env vars are enough to override.
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(EngineConfig::default()))
            .merge(Toml::file("farm.toml"))
            .merge(Toml::file("farm.local.toml"))
            .merge(Env::prefixed("FARM_").split("__"))
            .extract()
    }

    /// Load configuration from a specific file path.
    pub fn from_file(path: &str) -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(EngineConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("FARM_").split("__"))
            .extract()
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_log_sink(mut self, sink: LogSink) -> Self {
        self.log_sink = sink;
        self
    }
}

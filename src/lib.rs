//! Rule-evaluation core for Product-FARM: a JSON logic-expression
//! interpreter plus a dependency-graph rule engine that selects and
//! topologically evaluates rules against caller-supplied queries.
//!
//! The Product/Attribute domain model, HTTP layer, persistence, and the
//! FarmScript DSL front-end are explicitly out of scope — this crate is
//! the substrate they're built on.

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod interpreter;
pub mod logic;
pub mod operators;
pub mod rule;
pub mod streaming;
pub mod value;

pub use config::EngineConfig;
pub use engine::{EvaluateRequest, EvaluationEngine};
pub use error::{EngineError, Failure, GraphError, RuleEngineCause, RuleEngineError};
pub use graph::DependencyGraph;
pub use interpreter::evaluate;
pub use rule::{Query, QueryContext, QueryInput, QueryKind, QueryOutput, Rule, StaticRule};
pub use streaming::evaluate_stream;
pub use value::Value;

//! EvaluationEngine: the public orchestration surface. Resolves queries to
//! an ordered rule list via a two-tier cache, then threads each rule's
//! output back into a shared context for the next rule.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::cache::BoundedCache;
use crate::config::EngineConfig;
use crate::error::{EngineError, Failure, GraphError, RuleEngineCause, RuleEngineError};
use crate::graph::DependencyGraph;
use crate::rule::{Query, QueryContext, QueryInput, QueryOutput, Rule};
use crate::value::Value;

/// One `rule_evaluate` call. `trace_token`, when set, is attached to every
/// `tracing` span the engine opens for this call — an explicit field
/// replacing a thread-local correlation id, so it's traceable across
/// threads and reusable in concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct EvaluateRequest {
    pub queries: Vec<Query>,
    pub input: QueryInput,
    pub trace_token: Option<Uuid>,
}

pub struct EvaluationEngine<R: Rule + Clone> {
    config: EngineConfig,
    graph_cache: BoundedCache<String, Arc<DependencyGraph<R>>>,
    query_cache: BoundedCache<(String, Vec<Query>), Arc<Vec<usize>>>,
}

impl<R: Rule + Clone> EvaluationEngine<R> {
    pub fn new(config: EngineConfig) -> Self {
        let policy = config.cache.policy;
        let max_graph = config.cache.max_graph;
        let max_query = config.cache.max_query;
        EvaluationEngine {
            config,
            graph_cache: BoundedCache::new(policy, max_graph),
            query_cache: BoundedCache::new(policy, max_query),
        }
    }

    /// `evaluate(ctx, queries, input) -> output`.
    #[instrument(skip(self, ctx, request), fields(identifier = %ctx.identifier, trace_token = ?request.trace_token))]
    pub fn evaluate(&self, ctx: &QueryContext<R>, request: EvaluateRequest) -> Result<QueryOutput, EngineError> {
        let graph = self.graph_for(ctx)?;
        let indices = self.indices_for(&ctx.identifier, &request.queries, &graph);

        let mut context = request.input.attributes.clone();
        let mut all_outputs: IndexMap<String, Value> = IndexMap::new();

        for &idx in indices.iter() {
            let rule = graph.rule(idx);
            let expr = crate::logic::parse(rule.expression()).map_err(|e| {
                RuleEngineError::new(
                    rule.id().to_string(),
                    RuleEngineCause::ExpressionParseError(e.to_string()),
                )
            })?;

            let data = Value::Obj(context.clone());
            match crate::interpreter::evaluate(&expr, &data, &self.config) {
                Ok(value) => {
                    let produced = as_output_map(&value, rule.outputs()).map_err(|e| {
                        RuleEngineError::new(rule.id().to_string(), RuleEngineCause::NotAMap(e))
                    })?;
                    for (key, val) in produced {
                        if context.contains_key(&key) {
                            return Err(EngineError::Execution(RuleEngineError::new(
                                rule.id().to_string(),
                                RuleEngineCause::DuplicateContextKey { key },
                            )));
                        }
                        context.insert(key.clone(), val.clone());
                        all_outputs.insert(key, val);
                    }
                }
                Err(Failure::NullResult) => {
                    debug!(rule_id = rule.id(), "rule produced no result, skipping");
                }
                Err(other) => {
                    return Err(EngineError::Execution(RuleEngineError::new(
                        rule.id().to_string(),
                        RuleEngineCause::Evaluation(other),
                    )));
                }
            }
        }

        Ok(QueryOutput { attributes: all_outputs })
    }

    fn graph_for(&self, ctx: &QueryContext<R>) -> Result<Arc<DependencyGraph<R>>, GraphError> {
        self.graph_cache
            .get_or_try_insert_with(ctx.identifier.clone(), || {
                DependencyGraph::build(ctx.rules.clone()).map(Arc::new)
            })
            .inspect_err(|e| warn!(identifier = %ctx.identifier, error = %e, "graph build failed"))
    }

    fn indices_for(&self, identifier: &str, queries: &[Query], graph: &DependencyGraph<R>) -> Arc<Vec<usize>> {
        let key = (identifier.to_string(), queries.to_vec());
        self.query_cache
            .get_or_insert_with(key, || Arc::new(graph.select_indices(queries)))
    }
}

/// Coerce a rule's result `Value` into an insertion-ordered `string ->
/// Value` map. An `Obj` result is used as-is. A rule declaring exactly one
/// output path may instead return that output's value directly (the common
/// case — a rule's LogicExpr has no way to construct a multi-key object
/// literal, so a single-output rule like `{"*": [{"var": "a"}, 2]}`
/// naturally evaluates to a bare scalar) — it is wrapped as a single-entry
/// map keyed by that output path. Anything else is "not a map".
fn as_output_map(value: &Value, outputs: &[String]) -> Result<IndexMap<String, Value>, String> {
    match value {
        Value::Obj(map) => Ok(map.clone()),
        other if outputs.len() == 1 => {
            let mut map = IndexMap::new();
            map.insert(outputs[0].clone(), other.clone());
            Ok(map)
        }
        other => Err(format!("expected an object result, got {other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CachePolicy;
    use crate::rule::StaticRule;

    fn rule(id: &str, inputs: &[&str], outputs: &[&str], expr: &str) -> StaticRule {
        StaticRule::new(
            id,
            "generic",
            inputs.iter().map(|s| s.to_string()).collect(),
            outputs.iter().map(|s| s.to_string()).collect(),
            vec![],
            expr,
        )
    }

    fn input(pairs: &[(&str, Value)]) -> QueryInput {
        let mut attributes = IndexMap::new();
        for (k, v) in pairs {
            attributes.insert(k.to_string(), v.clone());
        }
        QueryInput::new(attributes)
    }

    #[test]
    fn chains_rule_outputs_through_context() {
        let rules = vec![
            rule("r1", &["a"], &["b"], r#"{"*": [{"var": "a"}, 2]}"#),
            rule("r2", &["b"], &["c"], r#"{"+": [{"var": "b"}, 1]}"#),
        ];
        let ctx = QueryContext::new("ctx-1", rules);
        let engine: EvaluationEngine<StaticRule> = EvaluationEngine::new(EngineConfig::default());
        let request = EvaluateRequest {
            queries: vec![Query::attribute_path("c")],
            input: input(&[("a", Value::num(3))]),
            trace_token: None,
        };
        let output = engine.evaluate(&ctx, request).unwrap();
        assert_eq!(output.attributes.get("b"), Some(&Value::num(6)));
        assert_eq!(output.attributes.get("c"), Some(&Value::num(7)));
    }

    #[test]
    fn duplicate_context_key_is_fatal() {
        let rules = vec![rule("r1", &[], &["a"], "5")];
        let ctx = QueryContext::new("ctx-2", rules);
        let engine: EvaluationEngine<StaticRule> = EvaluationEngine::new(EngineConfig::default());
        let request = EvaluateRequest {
            queries: vec![Query::rule_type("generic")],
            input: input(&[("a", Value::num(1))]),
            trace_token: None,
        };
        assert!(matches!(engine.evaluate(&ctx, request), Err(EngineError::Execution(_))));
    }

    #[test]
    fn null_result_skips_rule_silently() {
        let rules = vec![rule(
            "r1",
            &[],
            &["found"],
            r#"{"find": [[0, 0], {"!=": [{"var": ""}, 0]}]}"#,
        )];
        let ctx = QueryContext::new("ctx-3", rules);
        let engine: EvaluationEngine<StaticRule> = EvaluationEngine::new(EngineConfig::default());
        let request = EvaluateRequest {
            queries: vec![Query::rule_type("generic")],
            input: QueryInput::default(),
            trace_token: None,
        };
        let output = engine.evaluate(&ctx, request).unwrap();
        assert!(output.attributes.is_empty());
    }

    #[test]
    fn cache_disabled_vs_lru_returns_equal_output() {
        let rules = vec![rule("r1", &["a"], &["b"], r#"{"*": [{"var": "a"}, 2]}"#)];
        let request = || EvaluateRequest {
            queries: vec![Query::attribute_path("b")],
            input: input(&[("a", Value::num(5))]),
            trace_token: None,
        };

        let mut disabled_cfg = EngineConfig::default();
        disabled_cfg.cache.policy = CachePolicy::Disabled;
        let disabled_engine: EvaluationEngine<StaticRule> = EvaluationEngine::new(disabled_cfg);
        let disabled_ctx = QueryContext::new("ctx-4", rules.clone());
        let disabled_out = disabled_engine.evaluate(&disabled_ctx, request()).unwrap();

        let mut lru_cfg = EngineConfig::default();
        lru_cfg.cache.policy = CachePolicy::Lru;
        let lru_engine: EvaluationEngine<StaticRule> = EvaluationEngine::new(lru_cfg);
        let lru_ctx = QueryContext::new("ctx-4", rules);
        let lru_out = lru_engine.evaluate(&lru_ctx, request()).unwrap();

        assert_eq!(disabled_out.attributes, lru_out.attributes);
    }
}

//! End-to-end scenarios exercising the interpreter, streaming reducer, and
//! rule engine together, the way a caller assembling the whole crate would.

use farm_core::{
    evaluate, evaluate_stream, logic, EngineConfig, EvaluateRequest, EvaluationEngine, GraphError, Query,
    QueryContext, QueryInput, StaticRule, Value,
};
use indexmap::IndexMap;

fn obj(pairs: &[(&str, Value)]) -> Value {
    let mut map = IndexMap::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    Value::Obj(map)
}

fn nested_pie(filling: &str) -> Value {
    obj(&[("filling", Value::Str(filling.to_string()))])
}

#[test]
fn boolean_and_comparison_composition() {
    let config = EngineConfig::default();
    let expr = logic::parse(
        r#"{"and": [{"<": [{"var": "temp"}, 110]}, {"==": [{"var": "pie.filling"}, "apple"]}]}"#,
    )
    .unwrap();
    let data = obj(&[("temp", Value::num(100)), ("pie", nested_pie("apple"))]);

    let result = evaluate(&expr, &data, &config).unwrap();
    assert_eq!(result, Value::Bool(true));
}

#[test]
fn nary_if_age_bracket() {
    let config = EngineConfig::default();
    let expr = logic::parse(
        r#"{"if": [
            {"<": [{"var": "age"}, 25]}, {"*": [{"var": "base"}, 1.5]},
            {"<": [{"var": "age"}, 35]}, {"*": [{"var": "base"}, 1.2]},
            {"var": "base"}
        ]}"#,
    )
    .unwrap();
    let data = obj(&[("age", Value::num(30)), ("base", Value::num(100))]);

    let result = evaluate(&expr, &data, &config).unwrap();
    assert_eq!(result, Value::num(120));
}

#[test]
fn cat_concatenates_strings() {
    let config = EngineConfig::default();
    let expr = logic::parse(r#"{"cat": ["I love ", {"var": "filling"}, " pie"]}"#).unwrap();
    let data = obj(&[("filling", Value::Str("apple".to_string()))]);

    let result = evaluate(&expr, &data, &config).unwrap();
    assert_eq!(result, Value::Str("I love apple pie".to_string()));
}

#[test]
fn find_returns_first_match_or_null_result() {
    let config = EngineConfig::default();
    let data = Value::Null;

    let positive = logic::parse(r#"{"find": [[-1, 1, 2, 3], {">": [{"var": ""}, 0]}]}"#).unwrap();
    assert_eq!(evaluate(&positive, &data, &config).unwrap(), Value::num(1));

    let negative = logic::parse(r#"{"find": [[-1, 1, 2, 3], {"<": [{"var": ""}, 0]}]}"#).unwrap();
    assert_eq!(evaluate(&negative, &data, &config).unwrap(), Value::num(-1));

    let none = logic::parse(r#"{"find": [[0, 0, 0, 0], {"!=": [{"var": ""}, 0]}]}"#).unwrap();
    assert!(matches!(
        evaluate(&none, &data, &config),
        Err(farm_core::Failure::NullResult)
    ));
}

#[test]
fn rule_chain_produces_ordered_outputs() {
    let rules = vec![
        StaticRule::new(
            "r1",
            "pricing",
            vec!["a".to_string()],
            vec!["b".to_string()],
            vec![],
            r#"{"*": [{"var": "a"}, 2]}"#,
        ),
        StaticRule::new(
            "r2",
            "pricing",
            vec!["b".to_string()],
            vec!["c".to_string()],
            vec![],
            r#"{"+": [{"var": "b"}, 1]}"#,
        ),
    ];
    let ctx = QueryContext::new("scenario-5", rules);
    let engine: EvaluationEngine<StaticRule> = EvaluationEngine::new(EngineConfig::default());

    let mut attributes = IndexMap::new();
    attributes.insert("a".to_string(), Value::num(3));
    let request = EvaluateRequest {
        queries: vec![Query::attribute_path("c")],
        input: QueryInput::new(attributes),
        trace_token: None,
    };

    let output = engine.evaluate(&ctx, request).unwrap();
    assert_eq!(output.attributes.get("b"), Some(&Value::num(6)));
    assert_eq!(output.attributes.get("c"), Some(&Value::num(7)));
    assert_eq!(output.attributes.keys().collect::<Vec<_>>(), vec!["b", "c"]);
}

#[test]
fn multiple_producers_rejected_at_build() {
    let rules = vec![
        StaticRule::new("r1", "pricing", vec![], vec!["x".to_string()], vec![], "1"),
        StaticRule::new("r2", "pricing", vec![], vec!["x".to_string()], vec![], "2"),
    ];
    let err = farm_core::DependencyGraph::build(rules).unwrap_err();
    assert!(matches!(err, GraphError::MultipleProducers { .. }));
}

#[test]
fn cyclic_rule_set_rejected_at_build() {
    let rules = vec![
        StaticRule::new("r1", "pricing", vec!["y".to_string()], vec!["x".to_string()], vec![], "1"),
        StaticRule::new("r2", "pricing", vec!["x".to_string()], vec!["y".to_string()], vec![], "2"),
    ];
    let err = farm_core::DependencyGraph::build(rules).unwrap_err();
    assert!(matches!(err, GraphError::GraphContainsCycle { .. }));
}

#[test]
fn associativity_holds_under_half_up_scale() {
    let config = EngineConfig::default();
    let data = Value::Null;

    let left_first = logic::parse(r#"{"+": [{"+": [1.1, 2.2]}, 3.3]}"#).unwrap();
    let right_first = logic::parse(r#"{"+": [1.1, {"+": [2.2, 3.3]}]}"#).unwrap();

    assert_eq!(
        evaluate(&left_first, &data, &config).unwrap(),
        evaluate(&right_first, &data, &config).unwrap()
    );
}

#[test]
fn zero_identities_and_division_by_zero() {
    let config = EngineConfig::default();
    let data = Value::Null;

    let mul_zero = logic::parse(r#"{"*": [7, 0]}"#).unwrap();
    assert_eq!(evaluate(&mul_zero, &data, &config).unwrap(), Value::num(0));

    let add_zero = logic::parse(r#"{"+": [7, 0]}"#).unwrap();
    assert_eq!(evaluate(&add_zero, &data, &config).unwrap(), Value::num(7));

    let div_by_zero = logic::parse(r#"{"/": [7, 0]}"#).unwrap();
    assert_eq!(evaluate(&div_by_zero, &data, &config).unwrap(), Value::Null);

    let mod_by_zero = logic::parse(r#"{"%": [7, 0]}"#).unwrap();
    assert_eq!(evaluate(&mod_by_zero, &data, &config).unwrap(), Value::Null);
}

#[test]
fn strict_equality_implies_loose_equality() {
    let config = EngineConfig::default();
    let data = Value::Null;

    let strict = logic::parse(r#"{"===": [1, 1]}"#).unwrap();
    let loose = logic::parse(r#"{"==": [1, 1]}"#).unwrap();

    assert_eq!(evaluate(&strict, &data, &config).unwrap(), Value::Bool(true));
    assert_eq!(evaluate(&loose, &data, &config).unwrap(), Value::Bool(true));
}

#[test]
fn round_trip_on_primitives() {
    let config = EngineConfig::default();
    let data = Value::Null;

    for primitive in [Value::Null, Value::Bool(true), Value::num(42), Value::Str("hi".to_string())] {
        assert_eq!(evaluate(&primitive, &data, &config).unwrap(), primitive);
    }
}

#[test]
fn streaming_evaluation_matches_tree_walking_evaluation() {
    let config = EngineConfig::default();
    let source = r#"{"and": [{"<": [{"var": "temp"}, 110]}, {"==": [{"var": "pie.filling"}, "apple"]}]}"#;
    let data = obj(&[("temp", Value::num(100)), ("pie", nested_pie("apple"))]);

    let expr = logic::parse(source).unwrap();
    let tree_result = evaluate(&expr, &data, &config).unwrap();
    let stream_result = evaluate_stream(source, &data, &config).unwrap();

    assert_eq!(tree_result, stream_result);
}

#[test]
fn cache_disabled_and_lru_agree_on_output() {
    let rules = vec![StaticRule::new(
        "r1",
        "pricing",
        vec!["a".to_string()],
        vec!["b".to_string()],
        vec![],
        r#"{"*": [{"var": "a"}, 2]}"#,
    )];

    let mut disabled_cfg = EngineConfig::default();
    disabled_cfg.cache.policy = farm_core::config::CachePolicy::Disabled;
    let mut lru_cfg = EngineConfig::default();
    lru_cfg.cache.policy = farm_core::config::CachePolicy::Lru;

    let make_request = || {
        let mut attributes = IndexMap::new();
        attributes.insert("a".to_string(), Value::num(5));
        EvaluateRequest {
            queries: vec![Query::attribute_path("b")],
            input: QueryInput::new(attributes),
            trace_token: None,
        }
    };

    let disabled_engine: EvaluationEngine<StaticRule> = EvaluationEngine::new(disabled_cfg);
    let disabled_ctx = QueryContext::new("cache-scenario", rules.clone());
    let disabled_out = disabled_engine.evaluate(&disabled_ctx, make_request()).unwrap();

    let lru_engine: EvaluationEngine<StaticRule> = EvaluationEngine::new(lru_cfg);
    let lru_ctx = QueryContext::new("cache-scenario", rules);
    let lru_out = lru_engine.evaluate(&lru_ctx, make_request()).unwrap();

    assert_eq!(disabled_out.attributes, lru_out.attributes);
}

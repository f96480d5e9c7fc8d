//! Rule, Query, and QueryContext types.
//!
//! `Rule` is a trait rather than a struct because the core never constructs
//! rules itself — the out-of-scope Product/Attribute layer owns that, and
//! hands the core its own type. `StaticRule` is a ready-made implementation
//! so the crate (and its tests) can be used without writing one first,
//! a concrete default shipped alongside the trait-based extension point.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::value::Value;

/// An opaque unit of evaluation: a LogicExpr plus the attribute paths it
/// reads and writes. The core treats every `Rule` as read-only.
pub trait Rule {
    fn id(&self) -> &str;
    fn rule_type(&self) -> &str;
    fn inputs(&self) -> &[String];
    fn outputs(&self) -> &[String];
    fn tags(&self) -> &[String];
    fn expression(&self) -> &str;
}

/// A plain-struct `Rule`, built from owned fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticRule {
    pub id: String,
    pub rule_type: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub tags: Vec<String>,
    pub expression: String,
}

impl StaticRule {
    pub fn new(
        id: impl Into<String>,
        rule_type: impl Into<String>,
        inputs: Vec<String>,
        outputs: Vec<String>,
        tags: Vec<String>,
        expression: impl Into<String>,
    ) -> Self {
        StaticRule {
            id: id.into(),
            rule_type: rule_type.into(),
            inputs,
            outputs,
            tags,
            expression: expression.into(),
        }
    }
}

impl Rule for StaticRule {
    fn id(&self) -> &str {
        &self.id
    }

    fn rule_type(&self) -> &str {
        &self.rule_type
    }

    fn inputs(&self) -> &[String] {
        &self.inputs
    }

    fn outputs(&self) -> &[String] {
        &self.outputs
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn expression(&self) -> &str {
        &self.expression
    }
}

/// An identified bundle of rules forming one dependency graph. `identifier`
/// scopes the graph cache key; two contexts sharing an identifier must have
/// identical rule sets — the core does not validate this, the caller must.
pub struct QueryContext<R: Rule> {
    pub identifier: String,
    pub rules: Vec<R>,
}

impl<R: Rule> QueryContext<R> {
    pub fn new(identifier: impl Into<String>, rules: Vec<R>) -> Self {
        QueryContext {
            identifier: identifier.into(),
            rules,
        }
    }
}

/// Which field of a `Rule` a `Query` selects on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryKind {
    RuleType,
    AttributePath,
    AttributeTag,
}

/// Selects rules from a `QueryContext` whose corresponding field equals
/// `key`: rule type, an output path, or a tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query {
    pub key: String,
    pub kind: QueryKind,
}

impl Query {
    pub fn rule_type(key: impl Into<String>) -> Self {
        Query {
            key: key.into(),
            kind: QueryKind::RuleType,
        }
    }

    pub fn attribute_path(key: impl Into<String>) -> Self {
        Query {
            key: key.into(),
            kind: QueryKind::AttributePath,
        }
    }

    pub fn attribute_tag(key: impl Into<String>) -> Self {
        Query {
            key: key.into(),
            kind: QueryKind::AttributeTag,
        }
    }
}

/// Read-only input context: insertion-ordered `string -> Value`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryInput {
    pub attributes: IndexMap<String, Value>,
}

impl QueryInput {
    pub fn new(attributes: IndexMap<String, Value>) -> Self {
        QueryInput { attributes }
    }
}

/// Output context: only the keys produced by rules during one call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QueryOutput {
    pub attributes: IndexMap<String, Value>,
}

/// The set of query kinds a rule's tags are indexed under, deduplicated
/// (a rule listing the same tag twice should still index once).
pub fn distinct_tags(tags: &[String]) -> BTreeSet<&str> {
    tags.iter().map(String::as_str).collect()
}

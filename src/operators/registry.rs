//! Operator name -> implementation table, built once.

use super::{array_ops, comparison, data_access, logic_ops, numeric, string_ops, utility, OperatorKind};
use std::collections::HashMap;
use std::sync::OnceLock;

static REGISTRY: OnceLock<HashMap<&'static str, OperatorKind>> = OnceLock::new();

pub fn lookup(name: &str) -> Option<OperatorKind> {
    REGISTRY.get_or_init(build).get(name).copied()
}

fn build() -> HashMap<&'static str, OperatorKind> {
    let mut m: HashMap<&'static str, OperatorKind> = HashMap::new();

    // Data access
    m.insert("var", OperatorKind::Standard(data_access::var));
    m.insert("missing", OperatorKind::Standard(data_access::missing));
    m.insert("missing_some", OperatorKind::Standard(data_access::missing_some));

    // Logic
    m.insert("==", OperatorKind::Standard(logic_ops::loose_eq));
    m.insert("!=", OperatorKind::Standard(logic_ops::loose_ne));
    m.insert("===", OperatorKind::Standard(logic_ops::strict_eq));
    m.insert("!==", OperatorKind::Standard(logic_ops::strict_ne));
    m.insert("!", OperatorKind::Standard(logic_ops::not));
    m.insert("!!", OperatorKind::Standard(logic_ops::double_not));
    m.insert("and", OperatorKind::Functional(logic_ops::and));
    m.insert("or", OperatorKind::Functional(logic_ops::or));
    m.insert("if", OperatorKind::Functional(logic_ops::if_op));

    // Numeric
    m.insert("+", OperatorKind::Standard(numeric::add));
    m.insert("-", OperatorKind::Standard(numeric::subtract));
    m.insert("*", OperatorKind::Standard(numeric::multiply));
    m.insert("/", OperatorKind::Standard(numeric::divide));
    m.insert("%", OperatorKind::Standard(numeric::modulo));
    m.insert("min", OperatorKind::Standard(numeric::min));
    m.insert("max", OperatorKind::Standard(numeric::max));

    // Comparison
    m.insert("<", OperatorKind::Standard(comparison::less_than));
    m.insert("<=", OperatorKind::Standard(comparison::less_than_or_equal));
    m.insert(">", OperatorKind::Standard(comparison::greater_than));
    m.insert(">=", OperatorKind::Standard(comparison::greater_than_or_equal));

    // String
    m.insert("cat", OperatorKind::Standard(string_ops::cat));
    m.insert("substr", OperatorKind::Standard(string_ops::substr));
    m.insert("uppercase", OperatorKind::Standard(string_ops::uppercase));
    m.insert("lowercase", OperatorKind::Standard(string_ops::lowercase));
    m.insert("capitalize", OperatorKind::Standard(string_ops::capitalize));
    m.insert("is-blank", OperatorKind::Standard(string_ops::is_blank));
    m.insert("replace", OperatorKind::Standard(string_ops::replace));
    m.insert("to-array", OperatorKind::Standard(string_ops::to_array));
    m.insert("encode", OperatorKind::Standard(string_ops::encode));
    m.insert("format", OperatorKind::Standard(string_ops::format));

    // Array
    m.insert("merge", OperatorKind::Standard(array_ops::merge));
    m.insert("in", OperatorKind::Standard(array_ops::contains));
    m.insert("map", OperatorKind::Functional(array_ops::map));
    m.insert("filter", OperatorKind::Functional(array_ops::filter));
    m.insert("reduce", OperatorKind::Functional(array_ops::reduce));
    m.insert("all", OperatorKind::Functional(array_ops::all));
    m.insert("some", OperatorKind::Functional(array_ops::some));
    m.insert("none", OperatorKind::Functional(array_ops::none));
    m.insert("find", OperatorKind::Functional(array_ops::find));
    m.insert("sort", OperatorKind::Functional(array_ops::sort));
    m.insert("distinct", OperatorKind::Functional(array_ops::distinct));
    m.insert("size", OperatorKind::Functional(array_ops::size));
    m.insert("reverse", OperatorKind::Functional(array_ops::reverse));

    // Utility
    m.insert("log", OperatorKind::Standard(utility::log));
    m.insert("currentTime", OperatorKind::Standard(utility::current_time));

    m
}

// Spec compliance tests
//
// Each test exercises one concrete scenario from the specification: the
// worked examples for operator precedence, string interpolation, and each
// `$`-operator's documented behavior.

use chrono::{DateTime, Utc};
use jsone::value::Value;
use jsone::{render_at, Context};
use std::collections::BTreeMap;

fn obj(pairs: Vec<(&str, Value)>) -> Value {
    Value::Object(pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

fn render(template: &Value, context: Value) -> Result<Value, String> {
    let ctx = match context {
        Value::Object(map) => Context::from_object(map),
        Value::Null => Context::new(),
        _ => panic!("test context must be an object"),
    };
    let now: DateTime<Utc> = DateTime::parse_from_rfc3339("2021-01-01T00:00:00Z").unwrap().with_timezone(&Utc);
    render_at(template, &ctx, now).map_err(|e| e.to_string())
}

fn eval(expr: &str) -> Result<Value, String> {
    let ctx = Context::new();
    jsone::interpreter::eval_str(expr, &ctx).map_err(|e| e.to_string())
}

// ----------------------------------------------------------------------
// Expression language worked examples
// ----------------------------------------------------------------------

#[test]
fn unary_minus_binds_looser_than_pow() {
    assert_eq!(eval("-2 ** 2").unwrap(), Value::integer(-4));
}

#[test]
fn pow_is_right_associative() {
    assert_eq!(eval("2 ** 3 ** 2").unwrap(), Value::integer(512));
}

#[test]
fn division_always_produces_a_float() {
    match eval("4 / 2").unwrap() {
        Value::Number(n) => assert!(!n.is_integer()),
        other => panic!("expected a number, got {:?}", other),
    }
    assert_eq!(eval("4 / 2").unwrap(), Value::float(2.0));
}

#[test]
fn addition_preserves_integer_type() {
    assert_eq!(eval("2 + 3").unwrap(), Value::integer(5));
    match eval("2 + 3").unwrap() {
        Value::Number(n) => assert!(n.is_integer()),
        _ => unreachable!(),
    }
}

#[test]
fn comparisons_require_matching_scalar_types() {
    assert!(eval("1 < \"a\"").is_err());
    assert_eq!(eval("1 < 2").unwrap(), Value::Bool(true));
}

#[test]
fn dot_access_raises_on_missing_key() {
    assert!(eval("{}.missing").is_err());
}

#[test]
fn bracket_access_returns_null_for_missing_key() {
    assert_eq!(eval("{}[\"missing\"]").unwrap(), Value::Null);
}

// ----------------------------------------------------------------------
// Rendering / interpolation
// ----------------------------------------------------------------------

#[test]
fn renders_flat_interpolation() {
    let template = obj(vec![("msg", Value::String("hello, ${name}!".into()))]);
    let context = obj(vec![("name", Value::String("taskcluster".into()))]);
    let out = render(&template, context).unwrap();
    assert_eq!(out, obj(vec![("msg", Value::String("hello, taskcluster!".into()))]));
}

#[test]
fn exact_interpolation_always_stringifies() {
    let template = obj(vec![("count", Value::String("${1 + 2}".into()))]);
    let out = render(&template, Value::Null).unwrap();
    assert_eq!(out, obj(vec![("count", Value::String("3".into()))]));
}

#[test]
fn escaped_dollar_brace_is_literal_text() {
    let template = Value::String("price: $${amount}".into());
    let out = render(&template, Value::Null).unwrap();
    assert_eq!(out, Value::String("price: ${amount}".into()));
}

// ----------------------------------------------------------------------
// Operators
// ----------------------------------------------------------------------

#[test]
fn if_selects_then_or_else_branch() {
    let template = obj(vec![("$if", Value::String("x > 0".into())), ("then", Value::String("pos".into())), ("else", Value::String("non-pos".into()))]);
    let ctx_pos = obj(vec![("x", Value::integer(1))]);
    assert_eq!(render(&template, ctx_pos).unwrap(), Value::String("pos".into()));
    let ctx_neg = obj(vec![("x", Value::integer(-1))]);
    assert_eq!(render(&template, ctx_neg).unwrap(), Value::String("non-pos".into()));
}

#[test]
fn if_with_no_matching_branch_deletes_the_key() {
    let template = obj(vec![
        ("kept", Value::integer(1)),
        ("dropped", obj(vec![("$if", Value::String("false".into())), ("then", Value::integer(2))])),
    ]);
    let out = render(&template, Value::Null).unwrap();
    assert_eq!(out, obj(vec![("kept", Value::integer(1))]));
}

#[test]
fn let_binds_local_names_for_in_clause() {
    let template = obj(vec![("$let", obj(vec![("x", Value::integer(10))])), ("in", Value::String("${x * 2}".into()))]);
    assert_eq!(render(&template, Value::Null).unwrap(), Value::integer(20));
}

#[test]
fn map_applies_each_template_over_an_array() {
    let template = obj(vec![
        ("$map", Value::Array(vec![Value::integer(1), Value::integer(2), Value::integer(3)])),
        ("each(x)", Value::String("${x * 2}".into())),
    ]);
    let out = render(&template, Value::Null).unwrap();
    assert_eq!(out, Value::Array(vec![Value::integer(2), Value::integer(4), Value::integer(6)]));
}

#[test]
fn sort_orders_numbers_ascending() {
    let template = obj(vec![("$sort", Value::Array(vec![Value::integer(3), Value::integer(1), Value::integer(2)]))]);
    let out = render(&template, Value::Null).unwrap();
    assert_eq!(out, Value::Array(vec![Value::integer(1), Value::integer(2), Value::integer(3)]));
}

#[test]
fn sort_by_uses_a_derived_key() {
    let template = obj(vec![
        (
            "$sort",
            Value::Array(vec![
                obj(vec![("name", Value::String("b".into()))]),
                obj(vec![("name", Value::String("a".into()))]),
            ]),
        ),
        ("by(x)", Value::String("x.name".into())),
    ]);
    let out = render(&template, Value::Null).unwrap();
    assert_eq!(
        out,
        Value::Array(vec![obj(vec![("name", Value::String("a".into()))]), obj(vec![("name", Value::String("b".into()))])])
    );
}

#[test]
fn merge_combines_objects_left_to_right() {
    let a = obj(vec![("x", Value::integer(1)), ("y", Value::integer(1))]);
    let b = obj(vec![("y", Value::integer(2))]);
    let template = obj(vec![("$merge", Value::Array(vec![a, b]))]);
    let out = render(&template, Value::Null).unwrap();
    assert_eq!(out, obj(vec![("x", Value::integer(1)), ("y", Value::integer(2))]));
}

#[test]
fn flatten_deep_flattens_all_nesting_levels() {
    let nested = Value::Array(vec![Value::Array(vec![Value::integer(1), Value::Array(vec![Value::integer(2)])]), Value::integer(3)]);
    let template = obj(vec![("$flattenDeep", nested)]);
    let out = render(&template, Value::Null).unwrap();
    assert_eq!(out, Value::Array(vec![Value::integer(1), Value::integer(2), Value::integer(3)]));
}

#[test]
fn reverse_reverses_array_order() {
    let template = obj(vec![("$reverse", Value::Array(vec![Value::integer(1), Value::integer(2), Value::integer(3)]))]);
    let out = render(&template, Value::Null).unwrap();
    assert_eq!(out, Value::Array(vec![Value::integer(3), Value::integer(2), Value::integer(1)]));
}

#[test]
fn json_serializes_the_rendered_payload() {
    let template = obj(vec![("$json", obj(vec![("a", Value::integer(1))]))]);
    let out = render(&template, Value::Null).unwrap();
    assert_eq!(out, Value::String("{\"a\":1}".into()));
}

#[test]
fn eval_parses_and_runs_its_rendered_payload() {
    let template = obj(vec![("$eval", Value::String("1 + 2".into()))]);
    let out = render(&template, Value::Null).unwrap();
    assert_eq!(out, Value::integer(3));
}

#[test]
fn from_now_defaults_reference_to_context_now() {
    let template = obj(vec![("$fromNow", Value::String("1 day".into()))]);
    let out = render(&template, Value::Null).unwrap();
    assert_eq!(out, Value::String("2021-01-02T00:00:00.000Z".into()));
}

#[test]
fn from_now_accepts_an_explicit_from() {
    let template = obj(vec![("$fromNow", Value::String("1 day".into())), ("from", Value::String("2020-06-01T00:00:00.000Z".into()))]);
    let out = render(&template, Value::Null).unwrap();
    assert_eq!(out, Value::String("2020-06-02T00:00:00.000Z".into()));
}

// ----------------------------------------------------------------------
// Error taxonomy / location
// ----------------------------------------------------------------------

#[test]
fn unknown_operator_is_a_template_error() {
    let template = obj(vec![("$bogus", Value::integer(1))]);
    let err = render(&template, Value::Null).unwrap_err();
    assert!(err.contains("not a supported operator"));
}

#[test]
fn nested_failure_reports_its_path() {
    let template = obj(vec![("steps", Value::Array(vec![obj(vec![("bad", Value::String("${missing}".into()))])]))]);
    let err = render(&template, Value::Null).unwrap_err();
    assert!(err.contains("steps"));
}

#[test]
fn two_registered_operators_in_one_mapping_fails() {
    let template = obj(vec![("$eval", Value::String("1".into())), ("$reverse", Value::Array(vec![]))]);
    let err = render(&template, Value::Null).unwrap_err();
    assert!(err.contains("only one operator allowed"));
}

#[test]
fn object_literal_rejects_trailing_comma() {
    assert!(eval("{\"a\": 1,}").is_err());
}

#[test]
fn malformed_context_key_is_rejected() {
    let mut ctx = BTreeMap::new();
    ctx.insert("bad-key".to_string(), Value::integer(1));
    let template = Value::integer(1);
    let err = render(&template, Value::Object(ctx)).unwrap_err();
    assert!(err.contains("a-zA-Z"));
}

#[test]
fn from_now_accepts_whitespace_separated_compound_offset() {
    let template = obj(vec![("$fromNow", Value::String("1 year 2 days".into()))]);
    let out = render(&template, Value::Null).unwrap();
    assert_eq!(out, Value::String("2022-01-03T00:00:00.000Z".into()));
}

#[test]
fn double_dollar_key_is_unescaped_literally() {
    let template = obj(vec![("$$if", Value::integer(1))]);
    let out = render(&template, Value::Null).unwrap();
    let mut expected = BTreeMap::new();
    expected.insert("$if".to_string(), Value::integer(1));
    assert_eq!(out, Value::Object(expected));
}

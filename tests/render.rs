// tests/render.rs

use jsone::value::Value;
use jsone::{render, Context};

fn obj(pairs: Vec<(&str, Value)>) -> Value {
    Value::Object(pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

// ============================================================================
// Plain values and interpolation
// ============================================================================

#[test]
fn plain_values_pass_through() {
    let ctx = Context::new();
    let template = obj(vec![("a", Value::integer(1)), ("b", Value::String("x".into()))]);
    assert_eq!(render(&template, &ctx).unwrap(), template);
}

#[test]
fn interpolates_nested_strings() {
    let mut ctx = Context::new();
    ctx.insert_value("name", Value::String("world".into()));
    let template = obj(vec![("greeting", Value::String("hello ${name}".into()))]);
    let out = render(&template, &ctx).unwrap();
    assert_eq!(out, obj(vec![("greeting", Value::String("hello world".into()))]));
}

// ============================================================================
// `$`-key handling
// ============================================================================

#[test]
fn unknown_dollar_key_is_an_error() {
    let ctx = Context::new();
    let template = obj(vec![("$bogus", Value::integer(1))]);
    assert!(render(&template, &ctx).is_err());
}

#[test]
fn dollar_escaped_key_is_kept_literal() {
    let ctx = Context::new();
    let template = obj(vec![("$$if", Value::integer(1))]);
    let out = render(&template, &ctx).unwrap();
    assert_eq!(out, obj(vec![("$if", Value::integer(1))]));
}

#[test]
fn two_operator_keys_in_one_mapping_is_an_error() {
    let ctx = Context::new();
    let template = obj(vec![("$eval", Value::String("1".into())), ("$json", Value::integer(2))]);
    let err = render(&template, &ctx).unwrap_err();
    assert!(err.to_string().contains("only one operator allowed"));
}

// ============================================================================
// DeleteMarker pruning
// ============================================================================

#[test]
fn delete_marker_prunes_object_key() {
    let ctx = Context::new();
    let template = obj(vec![
        ("kept", Value::integer(1)),
        ("dropped", obj(vec![("$if", Value::String("false".into())), ("then", Value::integer(2))])),
    ]);
    let out = render(&template, &ctx).unwrap();
    assert_eq!(out, obj(vec![("kept", Value::integer(1))]));
}

#[test]
fn delete_marker_prunes_array_element() {
    let ctx = Context::new();
    let deleted = obj(vec![("$if", Value::String("false".into())), ("then", Value::integer(1))]);
    let template = Value::Array(vec![Value::integer(1), deleted, Value::integer(2)]);
    let out = render(&template, &ctx).unwrap();
    assert_eq!(out, Value::Array(vec![Value::integer(1), Value::integer(2)]));
}

#[test]
fn delete_marker_at_top_level_is_an_error() {
    let ctx = Context::new();
    let template = obj(vec![("$if", Value::String("false".into())), ("then", Value::integer(1))]);
    assert!(render(&template, &ctx).is_err());
}

// ============================================================================
// Context validation
// ============================================================================

#[test]
fn malformed_top_level_context_key_is_rejected() {
    let mut ctx = Context::new();
    ctx.insert_value("not-an-identifier", Value::integer(1));
    let template = Value::integer(1);
    assert!(render(&template, &ctx).is_err());
}

// ============================================================================
// Error location paths
// ============================================================================

#[test]
fn error_location_points_at_the_failing_path() {
    let ctx = Context::new();
    let template = obj(vec![("steps", Value::Array(vec![obj(vec![("bad", Value::String("${nope}".into()))])]))]);
    let err = render(&template, &ctx).unwrap_err();
    let text = err.to_string();
    assert!(text.contains("steps"));
}

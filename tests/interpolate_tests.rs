// tests/interpolate_tests.rs

use jsone::context::Context;
use jsone::interpolate::interpolate;
use jsone::value::Value;

// ============================================================================
// Stringification
// ============================================================================

#[test]
fn exact_interpolation_always_stringifies() {
    let ctx = Context::new();
    assert_eq!(interpolate("${[1, 2, 3]}", &ctx).unwrap(), Value::String("1,2,3".into()));
}

#[test]
fn mixed_text_stringifies() {
    let mut ctx = Context::new();
    ctx.insert_value("name", Value::String("world".into()));
    assert_eq!(interpolate("hello, ${name}!", &ctx).unwrap(), Value::String("hello, world!".into()));
}

#[test]
fn escaped_dollar_brace_is_literal() {
    let ctx = Context::new();
    assert_eq!(interpolate("cost: $${amount}", &ctx).unwrap(), Value::String("cost: ${amount}".into()));
}

#[test]
fn nested_object_literal_in_interpolation() {
    let ctx = Context::new();
    let out = interpolate("${ {a: 1}.a }", &ctx).unwrap();
    assert_eq!(out, Value::String("1".into()));
}

#[test]
fn array_of_objects_cannot_interpolate() {
    let mut ctx = Context::new();
    ctx.insert_value("items", Value::Array(vec![Value::Object(Default::default())]));
    assert!(interpolate("${items}", &ctx).is_err());
}

// tests/interpreter_tests.rs

use jsone::context::Context;
use jsone::interpreter::eval_str;
use jsone::value::Value;

fn eval(src: &str, ctx: &Context) -> Value {
    eval_str(src, ctx).unwrap()
}

// ============================================================================
// Arithmetic
// ============================================================================

#[test]
fn booleans_are_never_numeric() {
    let ctx = Context::new();
    let err = eval_str("true + 1", &ctx).unwrap_err();
    assert!(matches!(err.kind, jsone::ErrorKind::Interpreter(_)));
}

#[test]
fn division_is_always_float() {
    let ctx = Context::new();
    assert_eq!(eval("4 / 2", &ctx), Value::float(2.0));
    match eval("4 / 2", &ctx) {
        Value::Number(n) => assert!(!n.is_integer()),
        _ => panic!("expected number"),
    }
}

#[test]
fn pow_is_right_associative_and_integer_preserving() {
    let ctx = Context::new();
    assert_eq!(eval("2 ** 3 ** 2", &ctx), Value::integer(512));
}

#[test]
fn unary_minus_binds_loosely_around_pow() {
    let ctx = Context::new();
    assert_eq!(eval("-2 ** 2", &ctx), Value::integer(-4));
}

// ============================================================================
// Access
// ============================================================================

#[test]
fn dot_access_raises_on_missing_key_bracket_returns_null() {
    let mut ctx = Context::new();
    ctx.insert_value("x", Value::Object(std::collections::BTreeMap::new()));
    assert!(eval_str("x.missing", &ctx).is_err());
    assert_eq!(eval("x[\"missing\"]", &ctx), Value::Null);
}

#[test]
fn negative_array_index() {
    let ctx = Context::new();
    assert_eq!(eval("[1, 2, 3][-1]", &ctx), Value::integer(3));
}

// ============================================================================
// Membership and boolean coercion
// ============================================================================

#[test]
fn in_checks_membership() {
    let ctx = Context::new();
    assert_eq!(eval("\"a\" in \"cat\"", &ctx), Value::Bool(true));
    assert_eq!(eval("2 in [1, 2, 3]", &ctx), Value::Bool(true));
}

#[test]
fn or_and_coerce_to_bool() {
    let ctx = Context::new();
    assert_eq!(eval("\"a\" || \"b\"", &ctx), Value::Bool(true));
}

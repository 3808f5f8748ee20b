// tests/builtins_tests.rs

use chrono::{DateTime, Utc};

use jsone::builtins::install;
use jsone::context::Context;
use jsone::interpreter::eval_str;
use jsone::value::Value;

fn ctx_with_builtins() -> Context {
    let mut ctx = Context::new();
    install(&mut ctx, DateTime::parse_from_rfc3339("2021-01-01T00:00:00Z").unwrap().with_timezone(&Utc));
    ctx
}

// ============================================================================
// Numeric built-ins
// ============================================================================

#[test]
fn min_max_preserve_integer_tag() {
    let ctx = ctx_with_builtins();
    assert_eq!(eval_str("min(3, 1, 2)", &ctx).unwrap(), Value::integer(1));
    assert_eq!(eval_str("max(3, 1, 2)", &ctx).unwrap(), Value::integer(3));
}

#[test]
fn sqrt_is_always_float() {
    let ctx = ctx_with_builtins();
    match eval_str("sqrt(4)", &ctx).unwrap() {
        Value::Number(n) => assert!(!n.is_integer()),
        _ => panic!("expected number"),
    }
}

#[test]
fn ceil_floor_return_integers() {
    let ctx = ctx_with_builtins();
    assert_eq!(eval_str("ceil(1.2)", &ctx).unwrap(), Value::integer(2));
    assert_eq!(eval_str("floor(1.8)", &ctx).unwrap(), Value::integer(1));
}

// ============================================================================
// fromNow()
// ============================================================================

#[test]
fn from_now_defaults_to_context_now() {
    let ctx = ctx_with_builtins();
    assert_eq!(eval_str("fromNow(\"1 day\")", &ctx).unwrap(), Value::String("2021-01-02T00:00:00.000Z".into()));
}

// ============================================================================
// str()
// ============================================================================

#[test]
fn str_rejects_objects() {
    let ctx = ctx_with_builtins();
    assert!(eval_str("str({a: 1})", &ctx).is_err());
}

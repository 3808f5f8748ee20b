// tests/value_tests.rs

use std::collections::BTreeMap;

use jsone::value::{format_number, Number, Value};

#[test]
fn integer_and_float_compare_equal() {
    assert_eq!(Value::integer(2), Value::float(2.0));
}

#[test]
fn truthiness_matches_reference_semantics() {
    assert!(!Value::Array(vec![]).is_truthy());
    assert!(!Value::integer(0).is_truthy());
    assert!(Value::String("x".into()).is_truthy());
    assert!(!Value::Object(BTreeMap::new()).is_truthy());
}

#[test]
fn format_number_keeps_integers_bare() {
    assert_eq!(format_number(&Number::integer(7)), "7");
    assert_eq!(format_number(&Number::float(7.0)), "7.0");
}

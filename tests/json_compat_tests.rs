// tests/json_compat_tests.rs

use std::collections::BTreeMap;

use jsone::value::Value;
use jsone::json_compat::{from_serde, to_json_string, to_serde};

#[test]
fn round_trips_nested_structures() {
    let mut obj = BTreeMap::new();
    obj.insert("a".to_string(), Value::integer(1));
    obj.insert("b".to_string(), Value::Array(vec![Value::String("x".into()), Value::Bool(true)]));
    let value = Value::Object(obj);
    let back = from_serde(to_serde(&value));
    assert_eq!(value, back);
}

#[test]
fn to_json_string_keeps_integers_bare() {
    assert_eq!(to_json_string(&Value::integer(7)), "7");
}

//! The `$`-operator registry. Each operator's payload-rendering rule is
//! grounded verbatim on `jsone/render.py`'s dispatch table (`$eval`,
//! `$flatten`, `$flattenDeep`, `$fromNow`, `$if`, `$json`, `$let`, `$map`,
//! `$merge`, `$mergeDeep`, `$reverse`, `$sort`), including the quirks that
//! are easy to get wrong by analogy: `$if`'s condition and `$sort`'s
//! `by(..)` are raw expression source (never pre-rendered), while `$eval`'s
//! payload and `$fromNow`'s offset/`from` are rendered like ordinary
//! template text before being used.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::context::{is_valid_identifier, Context};
use crate::error::Error;
use crate::fromnow::{self, format_iso};
use crate::interpreter;
use crate::render::{render_value, Rendered};
use crate::value::Value;

type OperatorFn = fn(&BTreeMap<String, Value>, &Context) -> Result<Rendered, Error>;

/// Names of every operator this crate understands, for render.rs's
/// unknown-operator diagnostics.
pub fn known_operators() -> &'static [&'static str] {
    &[
        "$eval", "$flatten", "$flattenDeep", "$fromNow", "$if", "$json", "$let", "$map", "$merge", "$mergeDeep",
        "$reverse", "$sort",
    ]
}

fn registry() -> &'static BTreeMap<&'static str, OperatorFn> {
    static REGISTRY: OnceLock<BTreeMap<&'static str, OperatorFn>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut m: BTreeMap<&'static str, OperatorFn> = BTreeMap::new();
        m.insert("$eval", eval_op);
        m.insert("$flatten", flatten_op);
        m.insert("$flattenDeep", flatten_deep_op);
        m.insert("$fromNow", from_now_op);
        m.insert("$if", if_op);
        m.insert("$json", json_op);
        m.insert("$let", let_op);
        m.insert("$map", map_op);
        m.insert("$merge", merge_op);
        m.insert("$mergeDeep", merge_deep_op);
        m.insert("$reverse", reverse_op);
        m.insert("$sort", sort_op);
        m
    })
}

pub fn dispatch(name: &str, map: &BTreeMap<String, Value>, ctx: &Context) -> Result<Rendered, Error> {
    let f = registry().get(name).expect("caller already checked this is a known operator");
    f(map, ctx)
}

fn only_key(map: &BTreeMap<String, Value>, op: &str) -> Result<(), Error> {
    if map.len() != 1 {
        return Err(Error::template(format!("{} does not accept any other properties", op)));
    }
    Ok(())
}

fn rendered_value(v: Rendered) -> Result<Value, Error> {
    match v {
        Rendered::Value(v) => Ok(v),
        Rendered::Delete => Err(Error::template("cannot use a deleteMarker here")),
    }
}

fn require_array(v: Value, op: &str) -> Result<Vec<Value>, Error> {
    match v {
        Value::Array(items) => Ok(items),
        other => Err(Error::template(format!("{} requires an array, found {}", op, other.type_name()))),
    }
}

fn require_string(v: Value, op: &str) -> Result<String, Error> {
    match v {
        Value::String(s) => Ok(s),
        other => Err(Error::template(format!("{} requires a string, found {}", op, other.type_name()))),
    }
}

fn eval_op(map: &BTreeMap<String, Value>, ctx: &Context) -> Result<Rendered, Error> {
    only_key(map, "$eval")?;
    let rendered = rendered_value(render_value(&map["$eval"], ctx)?)?;
    let src = require_string(rendered, "$eval")?;
    Ok(Rendered::Value(interpreter::eval_str(&src, ctx)?))
}

fn flatten_op(map: &BTreeMap<String, Value>, ctx: &Context) -> Result<Rendered, Error> {
    only_key(map, "$flatten")?;
    let rendered = rendered_value(render_value(&map["$flatten"], ctx)?)?;
    let items = require_array(rendered, "$flatten")?;
    let mut out = Vec::new();
    for item in items {
        match item {
            Value::Array(inner) => out.extend(inner),
            other => out.push(other),
        }
    }
    Ok(Rendered::Value(Value::Array(out)))
}

fn flatten_deep_op(map: &BTreeMap<String, Value>, ctx: &Context) -> Result<Rendered, Error> {
    only_key(map, "$flattenDeep")?;
    let rendered = rendered_value(render_value(&map["$flattenDeep"], ctx)?)?;
    let items = require_array(rendered, "$flattenDeep")?;
    let mut out = Vec::new();
    flatten_deep_into(items, &mut out);
    Ok(Rendered::Value(Value::Array(out)))
}

fn flatten_deep_into(items: Vec<Value>, out: &mut Vec<Value>) {
    for item in items {
        match item {
            Value::Array(inner) => flatten_deep_into(inner, out),
            other => out.push(other),
        }
    }
}

fn from_now_op(map: &BTreeMap<String, Value>, ctx: &Context) -> Result<Rendered, Error> {
    let extra: Vec<&String> = map.keys().filter(|k| k.as_str() != "$fromNow" && k.as_str() != "from").collect();
    if !extra.is_empty() {
        return Err(Error::template("$fromNow does not accept any other properties besides 'from'"));
    }
    let offset = require_string(rendered_value(render_value(&map["$fromNow"], ctx)?)?, "$fromNow")?;
    let reference = match map.get("from") {
        Some(from_template) => {
            let rendered = require_string(rendered_value(render_value(from_template, ctx)?)?, "$fromNow's from")?;
            fromnow::parse_iso(&rendered)?
        }
        None => {
            let now = ctx.get("now").and_then(|e| match e {
                crate::context::ContextEntry::Value(Value::String(s)) => Some(s.clone()),
                _ => None,
            });
            let now = now.ok_or_else(|| Error::template("$fromNow requires 'now' in context or an explicit 'from'"))?;
            fromnow::parse_iso(&now)?
        }
    };
    let duration = fromnow::parse_offset(&offset)?;
    Ok(Rendered::Value(Value::String(format_iso(reference + duration))))
}

fn if_op(map: &BTreeMap<String, Value>, ctx: &Context) -> Result<Rendered, Error> {
    let condition_src = require_string(map["$if"].clone(), "$if")?;
    let condition = interpreter::eval_str(&condition_src, ctx)?;
    let branch = if condition.is_truthy() { map.get("then") } else { map.get("else") };
    match branch {
        Some(template) => render_value(template, ctx),
        None => Ok(Rendered::Delete),
    }
}

fn json_op(map: &BTreeMap<String, Value>, ctx: &Context) -> Result<Rendered, Error> {
    only_key(map, "$json")?;
    let rendered = rendered_value(render_value(&map["$json"], ctx)?)?;
    Ok(Rendered::Value(Value::String(crate::json_compat::to_json_string(&rendered))))
}

fn let_op(map: &BTreeMap<String, Value>, ctx: &Context) -> Result<Rendered, Error> {
    let in_template = map.get("in").ok_or_else(|| Error::template("$let requires an 'in' clause"))?;
    let rendered = rendered_value(render_value(&map["$let"], ctx)?)?;
    let bindings = match rendered {
        Value::Object(o) => o,
        other => return Err(Error::template(format!("$let requires an object, found {}", other.type_name()))),
    };
    let mut inner = ctx.clone();
    for (key, value) in bindings {
        if !is_valid_identifier(&key) {
            return Err(Error::template(format!("top level keys of $let must follow /[a-zA-Z_][a-zA-Z0-9_]*/: {}", key)));
        }
        inner.insert_value(key, value);
    }
    render_value(in_template, &inner)
}

fn map_op(map: &BTreeMap<String, Value>, ctx: &Context) -> Result<Rendered, Error> {
    let each_key = map
        .keys()
        .find(|k| k.starts_with("each(") && k.ends_with(')'))
        .ok_or_else(|| Error::template("$map requires an 'each(x)' clause"))?;
    let var_name = each_key["each(".len()..each_key.len() - 1].to_string();
    if !is_valid_identifier(&var_name) {
        return Err(Error::template(format!("invalid identifier in each(): {}", var_name)));
    }
    let each_template = map[each_key].clone();
    let rendered = rendered_value(render_value(&map["$map"], ctx)?)?;

    match rendered {
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                let inner = ctx.with_value(var_name.clone(), item);
                if let Rendered::Value(v) = render_value(&each_template, &inner)? {
                    out.push(v);
                }
            }
            Ok(Rendered::Value(Value::Array(out)))
        }
        Value::Object(entries) => {
            let mut out = BTreeMap::new();
            for (key, value) in entries {
                let item = Value::Object(BTreeMap::from([("key".to_string(), Value::String(key.clone())), ("val".to_string(), value)]));
                let inner = ctx.with_value(var_name.clone(), item);
                if let Rendered::Value(Value::Object(entry)) = render_value(&each_template, &inner)? {
                    if entry.len() != 1 {
                        return Err(Error::template("$map over an object requires each() to produce a single-key object"));
                    }
                    let (k, v) = entry.into_iter().next().unwrap();
                    out.insert(k, v);
                } else {
                    return Err(Error::template("$map over an object requires each() to produce an object"));
                }
            }
            Ok(Rendered::Value(Value::Object(out)))
        }
        other => Err(Error::template(format!("$map requires an array or object, found {}", other.type_name()))),
    }
}

fn merge_op(map: &BTreeMap<String, Value>, ctx: &Context) -> Result<Rendered, Error> {
    only_key(map, "$merge")?;
    let rendered = rendered_value(render_value(&map["$merge"], ctx)?)?;
    let items = require_array(rendered, "$merge")?;
    let mut out = BTreeMap::new();
    for item in items {
        match item {
            Value::Object(o) => out.extend(o),
            other => return Err(Error::template(format!("$merge requires an array of objects, found {}", other.type_name()))),
        }
    }
    Ok(Rendered::Value(Value::Object(out)))
}

fn merge_deep_op(map: &BTreeMap<String, Value>, ctx: &Context) -> Result<Rendered, Error> {
    only_key(map, "$mergeDeep")?;
    let rendered = rendered_value(render_value(&map["$mergeDeep"], ctx)?)?;
    let items = require_array(rendered, "$mergeDeep")?;
    let mut iter = items.into_iter();
    let mut acc = match iter.next() {
        Some(Value::Object(o)) => Value::Object(o),
        Some(other) => return Err(Error::template(format!("$mergeDeep requires an array of objects, found {}", other.type_name()))),
        None => Value::Object(BTreeMap::new()),
    };
    for item in iter {
        let obj = match item {
            Value::Object(o) => o,
            other => return Err(Error::template(format!("$mergeDeep requires an array of objects, found {}", other.type_name()))),
        };
        acc = merge_deep_values(acc, Value::Object(obj));
    }
    Ok(Rendered::Value(acc))
}

fn merge_deep_values(left: Value, right: Value) -> Value {
    match (left, right) {
        (Value::Object(mut a), Value::Object(b)) => {
            for (k, v) in b {
                let merged = match a.remove(&k) {
                    Some(existing) => merge_deep_values(existing, v),
                    None => v,
                };
                a.insert(k, merged);
            }
            Value::Object(a)
        }
        (Value::Array(mut a), Value::Array(b)) => {
            a.extend(b);
            Value::Array(a)
        }
        (_, right) => right,
    }
}

fn reverse_op(map: &BTreeMap<String, Value>, ctx: &Context) -> Result<Rendered, Error> {
    only_key(map, "$reverse")?;
    let rendered = rendered_value(render_value(&map["$reverse"], ctx)?)?;
    let mut items = require_array(rendered, "$reverse")?;
    items.reverse();
    Ok(Rendered::Value(Value::Array(items)))
}

fn sort_op(map: &BTreeMap<String, Value>, ctx: &Context) -> Result<Rendered, Error> {
    let by_key = map.keys().find(|k| k.starts_with("by(") && k.ends_with(')'));

    let rendered = rendered_value(render_value(&map["$sort"], ctx)?)?;
    let items = require_array(rendered, "$sort")?;
    if items.is_empty() {
        return Ok(Rendered::Value(Value::Array(items)));
    }

    let keyed: Vec<(Value, Value)> = match by_key {
        Some(key) => {
            let var_name = key["by(".len()..key.len() - 1].to_string();
            if !is_valid_identifier(&var_name) {
                return Err(Error::template(format!("invalid identifier in by(): {}", var_name)));
            }
            let by_src = require_string(map[key].clone(), "$sort's by()")?;
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                let inner = ctx.with_value(var_name.clone(), item.clone());
                let key_value = interpreter::eval_str(&by_src, &inner)?;
                out.push((key_value, item));
            }
            out
        }
        None => items.into_iter().map(|v| (v.clone(), v)).collect(),
    };

    validate_uniform_sort_keys(&keyed)?;

    let mut keyed = keyed;
    keyed.sort_by(|(a, _), (b, _)| compare_sort_keys(a, b));
    Ok(Rendered::Value(Value::Array(keyed.into_iter().map(|(_, v)| v).collect())))
}

fn validate_uniform_sort_keys(keyed: &[(Value, Value)]) -> Result<(), Error> {
    let first_kind = keyed[0].0.type_name();
    if first_kind != "number" && first_kind != "string" {
        return Err(Error::template("$sort requires sort keys to be all numbers or all strings"));
    }
    if keyed.iter().any(|(k, _)| k.type_name() != first_kind) {
        return Err(Error::template("$sort requires sort keys to be all numbers or all strings"));
    }
    Ok(())
}

fn compare_sort_keys(a: &Value, b: &Value) -> std::cmp::Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => std::cmp::Ordering::Equal,
    }
}

//! The built-in function table installed into every render's context,
//! grounded on `jsone/builtins.py`. Each function's numeric subtyping rule
//! (preserve vs. always-float vs. always-integer) mirrors Python's own
//! `math`/`min`/`max` behavior on `int`/`float` rather than inventing a
//! uniform rule.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::context::Context;
use crate::error::InterpreterError;
use crate::fromnow::{self, format_iso};
use crate::value::{Number, Value};

fn numeric_args(name: &str, args: &[Value]) -> Result<Vec<Number>, InterpreterError> {
    args.iter()
        .map(|v| match v {
            Value::Number(n) => Ok(*n),
            other => Err(InterpreterError::type_error(format!(
                "{}: expected a number, found {}",
                name,
                other.type_name()
            ))),
        })
        .collect()
}

fn one_string_arg<'a>(name: &str, args: &'a [Value]) -> Result<&'a str, InterpreterError> {
    match args {
        [Value::String(s)] => Ok(s.as_str()),
        [other] => Err(InterpreterError::type_error(format!(
            "{}: expected a string, found {}",
            name,
            other.type_name()
        ))),
        _ => Err(InterpreterError::type_error(format!("{}: expected exactly one argument", name))),
    }
}

/// Installs every built-in into `ctx`. `now` is the instant captured once
/// at the start of a render, so `fromNow()` without a `from` argument and
/// `context.now` always agree.
pub fn install(ctx: &mut Context, now: DateTime<Utc>) {
    ctx.insert_value("now", Value::String(format_iso(now)));

    ctx.insert_function(
        "min",
        Arc::new(|args| {
            if args.is_empty() {
                return Err(InterpreterError::type_error("min: expected at least one argument"));
            }
            let nums = numeric_args("min", args)?;
            let best = nums.iter().copied().min_by(|a, b| a.as_f64().partial_cmp(&b.as_f64()).unwrap()).unwrap();
            Ok(Value::Number(best))
        }),
    );

    ctx.insert_function(
        "max",
        Arc::new(|args| {
            if args.is_empty() {
                return Err(InterpreterError::type_error("max: expected at least one argument"));
            }
            let nums = numeric_args("max", args)?;
            let best = nums.iter().copied().max_by(|a, b| a.as_f64().partial_cmp(&b.as_f64()).unwrap()).unwrap();
            Ok(Value::Number(best))
        }),
    );

    ctx.insert_function(
        "sqrt",
        Arc::new(|args| {
            let nums = numeric_args("sqrt", args)?;
            match nums.as_slice() {
                [n] => Ok(Value::float(n.as_f64().sqrt())),
                _ => Err(InterpreterError::type_error("sqrt: expected exactly one argument")),
            }
        }),
    );

    ctx.insert_function(
        "ceil",
        Arc::new(|args| {
            let nums = numeric_args("ceil", args)?;
            match nums.as_slice() {
                [n] => Ok(Value::integer(n.as_f64().ceil() as i64)),
                _ => Err(InterpreterError::type_error("ceil: expected exactly one argument")),
            }
        }),
    );

    ctx.insert_function(
        "floor",
        Arc::new(|args| {
            let nums = numeric_args("floor", args)?;
            match nums.as_slice() {
                [n] => Ok(Value::integer(n.as_f64().floor() as i64)),
                _ => Err(InterpreterError::type_error("floor: expected exactly one argument")),
            }
        }),
    );

    ctx.insert_function(
        "abs",
        Arc::new(|args| {
            let nums = numeric_args("abs", args)?;
            match nums.as_slice() {
                [n] if n.is_integer() => Ok(Value::integer(n.as_i64().unwrap().abs())),
                [n] => Ok(Value::float(n.as_f64().abs())),
                _ => Err(InterpreterError::type_error("abs: expected exactly one argument")),
            }
        }),
    );

    ctx.insert_function(
        "lowercase",
        Arc::new(|args| Ok(Value::String(one_string_arg("lowercase", args)?.to_lowercase()))),
    );

    ctx.insert_function(
        "uppercase",
        Arc::new(|args| Ok(Value::String(one_string_arg("uppercase", args)?.to_uppercase()))),
    );

    ctx.insert_function(
        "len",
        Arc::new(|args| match args {
            [Value::String(s)] => Ok(Value::integer(s.chars().count() as i64)),
            [Value::Array(a)] => Ok(Value::integer(a.len() as i64)),
            [other] => Err(InterpreterError::type_error(format!(
                "len: expected a string or array, found {}",
                other.type_name()
            ))),
            _ => Err(InterpreterError::type_error("len: expected exactly one argument")),
        }),
    );

    ctx.insert_function(
        "str",
        Arc::new(|args| match args {
            [v] => stringify_builtin(v).map(Value::String),
            _ => Err(InterpreterError::type_error("str: expected exactly one argument")),
        }),
    );

    ctx.insert_function(
        "fromNow",
        Arc::new(move |args| {
            let (offset, reference) = match args {
                [Value::String(offset)] => (offset.as_str(), now),
                [Value::String(offset), Value::String(from)] => {
                    let reference = fromnow::parse_iso(from).map_err(|e| match e.kind {
                        crate::error::ErrorKind::Interpreter(i) => i,
                        other => InterpreterError::type_error(other.to_string()),
                    })?;
                    (offset.as_str(), reference)
                }
                _ => return Err(InterpreterError::type_error("fromNow: expected (offset) or (offset, from)")),
            };
            let duration = fromnow::parse_offset(offset).map_err(|e| match e.kind {
                crate::error::ErrorKind::Interpreter(i) => i,
                other => InterpreterError::type_error(other.to_string()),
            })?;
            Ok(Value::String(format_iso(reference + duration)))
        }),
    );
}

fn stringify_builtin(v: &Value) -> Result<String, InterpreterError> {
    match v {
        Value::Null => Ok("null".to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(crate::value::format_number(n)),
        Value::String(s) => Ok(s.clone()),
        Value::Array(items) => {
            let mut parts = Vec::with_capacity(items.len());
            for item in items {
                parts.push(stringify_builtin(item)?);
            }
            Ok(parts.join(","))
        }
        Value::Object(_) => Err(InterpreterError::type_error("str: cannot stringify an object")),
    }
}

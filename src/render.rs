//! Orchestrates rendering a JSON-shaped template against a context: walks
//! objects/arrays, dispatches `$`-operator mappings to `operators.rs`,
//! interpolates strings via `interpolate.rs`, and augments any error that
//! bubbles up with the `.key`/`[index]` path it occurred at.

use std::collections::BTreeMap;

use chrono::Utc;

use crate::context::{is_valid_identifier, Context};
use crate::error::Error;
use crate::fromnow::Clock;
use crate::interpolate;
use crate::operators;
use crate::value::Value;

/// A rendered node, distinguishing an ordinary value from the `$if`/`$map`
/// "delete this key/element" marker. Never escapes this module: callers only
/// ever see `render`'s `Result<Value, Error>`.
pub(crate) enum Rendered {
    Value(Value),
    Delete,
}

/// Renders `template` against `context`, using the system clock for `now`
/// and `$fromNow`.
pub fn render(template: &Value, context: &Context) -> Result<Value, Error> {
    render_with_clock(template, context, &crate::fromnow::SystemClock)
}

/// Renders `template` against `context` with an explicit clock, so tests and
/// callers that need reproducible `$fromNow`/`now` output can pin the time.
pub fn render_with_clock(template: &Value, context: &Context, clock: &dyn Clock) -> Result<Value, Error> {
    if let Some(bad) = context.keys().find(|k| !is_valid_identifier(k)) {
        return Err(Error::template(format!(
            "top level keys of context must follow /[a-zA-Z_][a-zA-Z0-9_]*/: {}",
            bad
        )));
    }

    let mut ctx = Context::new();
    crate::builtins::install(&mut ctx, clock.now());
    ctx.overlay(context);

    match render_value(template, &ctx)? {
        Rendered::Value(v) => Ok(v),
        Rendered::Delete => Err(Error::template("template evaluated to a deleteMarker at the top level")),
    }
}

pub(crate) fn render_value(template: &Value, ctx: &Context) -> Result<Rendered, Error> {
    match template {
        Value::Object(map) => render_object(map, ctx),
        Value::Array(items) => render_array(items, ctx),
        Value::String(s) => {
            if interpolate::has_interpolation(s) {
                Ok(Rendered::Value(interpolate::interpolate(s, ctx)?))
            } else {
                Ok(Rendered::Value(Value::String(s.clone())))
            }
        }
        other => Ok(Rendered::Value(other.clone())),
    }
}

fn render_object(map: &BTreeMap<String, Value>, ctx: &Context) -> Result<Rendered, Error> {
    let dollar_keys: Vec<&String> = map.keys().filter(|k| k.starts_with('$') && !k.starts_with("$$")).collect();
    let registered: Vec<&&String> = dollar_keys.iter().filter(|k| operators::known_operators().contains(&k.as_str())).collect();

    if registered.len() > 1 {
        return Err(Error::template("only one operator allowed"));
    }
    if let Some(key) = registered.first() {
        return operators::dispatch(key, map, ctx).map_err(|e| e.with_location(format!(".{}", key)));
    }
    if let Some(unknown) = dollar_keys.first() {
        return Err(Error::template(format!("{} is not a supported operator", unknown)));
    }

    let mut out = BTreeMap::new();
    for (key, value) in map {
        let rendered_key = if key.starts_with("$$") { key[1..].to_string() } else { key.clone() };
        match render_value(value, ctx).map_err(|e| e.with_location(format!(".{}", rendered_key)))? {
            Rendered::Value(v) => {
                out.insert(rendered_key, v);
            }
            Rendered::Delete => {}
        }
    }
    Ok(Rendered::Value(Value::Object(out)))
}

fn render_array(items: &[Value], ctx: &Context) -> Result<Rendered, Error> {
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match render_value(item, ctx).map_err(|e| e.with_location(format!("[{}]", i)))? {
            Rendered::Value(v) => out.push(v),
            Rendered::Delete => {}
        }
    }
    Ok(Rendered::Value(Value::Array(out)))
}

/// Convenience used by the CLI and tests: renders with a fixed instant so
/// `$fromNow`/`now` output is reproducible.
pub fn render_at(template: &Value, context: &Context, now: chrono::DateTime<Utc>) -> Result<Value, Error> {
    render_with_clock(template, context, &crate::fromnow::FixedClock(now))
}

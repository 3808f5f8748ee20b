//! Programmatic support for the `jsone-cli` binary, kept separate from
//! `main` so the render/eval/check logic is unit-testable without going
//! through `clap`'s argument parsing — mirrors the teacher's split between
//! its `cli` module and its `main.rs` binary shell.

use std::io::{self, Read};

use crate::context::Context;
use crate::error::Error;
use crate::value::Value;

#[derive(Debug)]
pub enum CliError {
    Json(serde_json::Error),
    Render(Error),
    Io(io::Error),
    NoInput,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Json(e) => write!(f, "invalid JSON: {}", e),
            CliError::Render(e) => write!(f, "{}", e),
            CliError::Io(e) => write!(f, "{}", e),
            CliError::NoInput => write!(f, "no input provided"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<Error> for CliError {
    fn from(e: Error) -> Self {
        CliError::Render(e)
    }
}

/// Reads all of stdin as a string, erroring if it is empty.
pub fn read_stdin() -> Result<String, CliError> {
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    if buf.trim().is_empty() {
        return Err(CliError::NoInput);
    }
    Ok(buf)
}

/// Parses a JSON document into this crate's `Value`.
pub fn parse_json(input: &str) -> Result<Value, CliError> {
    let serde_value: serde_json::Value = serde_json::from_str(input)?;
    Ok(crate::json_compat::from_serde(serde_value))
}

/// Renders `template_json` against `context_json` and returns the result as
/// a `Value`, ready for the caller to serialize.
pub fn render_json(template_json: &str, context_json: &str) -> Result<Value, CliError> {
    let template = parse_json(template_json)?;
    let context_value = parse_json(context_json)?;
    let context = match context_value {
        Value::Object(map) => Context::from_object(map),
        Value::Null => Context::new(),
        _ => return Err(CliError::Render(Error::template("context must be a JSON object"))),
    };
    Ok(crate::render::render(&template, &context)?)
}

/// Evaluates a bare expression string against a context and returns the
/// result, used by the `eval` subcommand.
pub fn eval_expression(expr: &str, context_json: &str) -> Result<Value, CliError> {
    let context_value = parse_json(context_json)?;
    let context = match context_value {
        Value::Object(map) => Context::from_object(map),
        Value::Null => Context::new(),
        _ => return Err(CliError::Render(Error::template("context must be a JSON object"))),
    };
    let mut ctx = Context::new();
    crate::builtins::install(&mut ctx, chrono::Utc::now());
    ctx.overlay(&context);
    Ok(crate::interpreter::eval_str(expr, &ctx)?)
}

/// Checks that `template_json` is syntactically valid JSON without rendering
/// it against any context.
pub fn check_syntax(template_json: &str) -> Result<(), CliError> {
    parse_json(template_json)?;
    Ok(())
}

pub fn to_json_string(value: &Value, pretty: bool) -> String {
    let serde_value = crate::json_compat::to_serde(value);
    if pretty {
        serde_json::to_string_pretty(&serde_value).expect("Value never contains non-finite numbers")
    } else {
        serde_json::to_string(&serde_value).expect("Value never contains non-finite numbers")
    }
}

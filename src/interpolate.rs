//! Scans a string for `${...}` interpolations and `$${` (literal `${`)
//! escapes, evaluating each expression against a context. Reuses the real
//! `Lexer`/`Parser` rather than hand-rolling brace-depth counting, so an
//! object literal inside an interpolation (`${ {a: 1} }`) is handled for
//! free by the parser's own recursive-descent brace matching: it consumes
//! its own nested `{`/`}` pair before ever handing control back to us.

use crate::context::Context;
use crate::error::{Error, SyntaxError};
use crate::interpreter::Interpreter;
use crate::lexer::{Lexer, TokenKind};
use crate::parser::Parser;
use crate::value::Value;

enum Segment {
    Literal(String),
    Value(Value),
}

/// True if `s` contains at least one `${` that isn't escaped by a preceding
/// `$`. Lets the renderer skip the scan for ordinary strings.
pub fn has_interpolation(s: &str) -> bool {
    let mut rest = s;
    while let Some(idx) = rest.find("${") {
        if idx > 0 && rest.as_bytes()[idx - 1] == b'$' {
            rest = &rest[idx + 2..];
            continue;
        }
        return true;
    }
    false
}

/// Renders every interpolation in `s`, stringifying each `${...}` result and
/// splicing it back into the surrounding text — even when `s` is nothing but
/// one interpolation. Matches `jsone/render.py`'s `renderString`, which
/// always joins through `to_str` and never hands back a typed value; only
/// operators like `$eval` produce typed output from a template string.
pub fn interpolate(s: &str, ctx: &Context) -> Result<Value, Error> {
    let segments = scan(s, ctx)?;
    let mut out = String::new();
    for segment in &segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Value(v) => out.push_str(&stringify(v)?),
        }
    }
    Ok(Value::String(out))
}

fn scan(s: &str, ctx: &Context) -> Result<Vec<Segment>, Error> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = s;

    loop {
        match rest.find("${") {
            None => {
                literal.push_str(rest);
                break;
            }
            Some(idx) => {
                if idx > 0 && rest.as_bytes()[idx - 1] == b'$' {
                    literal.push_str(&rest[..idx - 1]);
                    literal.push_str("${");
                    rest = &rest[idx + 2..];
                    continue;
                }
                literal.push_str(&rest[..idx]);
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                let after = &rest[idx + 2..];
                let (value, consumed) = eval_prefix(after, ctx)?;
                segments.push(Segment::Value(value));
                rest = &after[consumed + 1..]; // +1 skips the closing '}'
            }
        }
    }

    if !literal.is_empty() || segments.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

/// Parses one expression starting at `src`, requires it to be followed
/// immediately by `}` (the interpolation's own terminator, left unconsumed
/// by `parse_expression`), and returns the evaluated value plus the byte
/// offset of that `}` within `src`.
fn eval_prefix(src: &str, ctx: &Context) -> Result<(Value, usize), Error> {
    let lexer = Lexer::new(src);
    let mut parser = Parser::new(lexer)?;
    let expr = parser.parse_expression()?;
    let tok = parser.current_token();
    if tok.kind != TokenKind::RBrace {
        return Err(Error::syntax(SyntaxError::UnexpectedToken {
            found: tok.kind.to_string(),
            expected: vec!["}".to_string()],
            position: tok.position,
        }));
    }
    let consumed = tok.start;
    let value = Interpreter::new(ctx).eval(&expr)?;
    Ok((value, consumed))
}

/// Converts a rendered value to the string spliced into an interpolation's
/// surrounding text. Matches the reference stringification table: objects
/// are never allowed here, even nested inside an array.
fn stringify(v: &Value) -> Result<String, Error> {
    match v {
        Value::Null => Ok(String::new()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(crate::value::format_number(n)),
        Value::String(s) => Ok(s.clone()),
        Value::Array(items) => {
            let mut parts = Vec::with_capacity(items.len());
            for item in items {
                if matches!(item, Value::Object(_)) {
                    return Err(Error::template("cannot interpolate an object into a string"));
                }
                parts.push(stringify(item)?);
            }
            Ok(parts.join(","))
        }
        Value::Object(_) => Err(Error::template("cannot interpolate an object into a string")),
    }
}

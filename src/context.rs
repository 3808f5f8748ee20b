use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::InterpreterError;
use crate::value::Value;

pub type BuiltinFn = Arc<dyn Fn(&[Value]) -> Result<Value, InterpreterError> + Send + Sync>;

#[derive(Clone)]
pub enum ContextEntry {
    Value(Value),
    Function(BuiltinFn),
}

impl fmt::Debug for ContextEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextEntry::Value(v) => write!(f, "Value({:?})", v),
            ContextEntry::Function(_) => write!(f, "Function(..)"),
        }
    }
}

/// The bindings an expression is evaluated against: context values plus any
/// callables (built-ins or user-provided functions).
#[derive(Clone, Debug, Default)]
pub struct Context(BTreeMap<String, ContextEntry>);

impl Context {
    pub fn new() -> Self {
        Context(BTreeMap::new())
    }

    pub fn get(&self, name: &str) -> Option<&ContextEntry> {
        self.0.get(name)
    }

    pub fn insert_value(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), ContextEntry::Value(value));
    }

    pub fn insert_function(&mut self, name: impl Into<String>, f: BuiltinFn) {
        self.0.insert(name.into(), ContextEntry::Function(f));
    }

    /// A copy of this context with one extra/overridden binding — used by
    /// `$let`, `$map`'s `each()`, and `$sort`'s `by()`.
    pub fn with_value(&self, name: impl Into<String>, value: Value) -> Context {
        let mut clone = self.clone();
        clone.insert_value(name, value);
        clone
    }

    /// Overlays `other`'s bindings on top of this context (`other` wins).
    pub fn overlay(&mut self, other: &Context) {
        for (k, v) in other.0.iter() {
            self.0.insert(k.clone(), v.clone());
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Builds a context from a flat JSON object, each key bound to its value.
    pub fn from_object(map: BTreeMap<String, Value>) -> Context {
        let mut ctx = Context::new();
        for (k, v) in map {
            ctx.insert_value(k, v);
        }
        ctx
    }
}

/// True if `s` matches `[A-Za-z_][A-Za-z0-9_]*`, the identifier shape
/// required of context keys, `$let` bindings, and `each(x)`/`by(x)` variable
/// names.
pub fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

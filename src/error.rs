use std::fmt;

use crate::lexer::Position;

/// A path of `.key` / `[index]` fragments built up as the renderer descends
/// into nested templates, so an error deep in a document reads like
/// `.steps[2].payload: "foo" not found in {...}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Location(Vec<String>);

impl Location {
    pub fn new() -> Self {
        Location(Vec::new())
    }

    /// Called by each enclosing mapping/array as an error bubbles up; the
    /// immediate parent's fragment is pushed on, so the vector ends up
    /// deepest-first and is reversed for display.
    pub fn push(&mut self, fragment: String) {
        self.0.push(fragment);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for fragment in self.0.iter().rev() {
            write!(f, "{}", fragment)?;
        }
        Ok(())
    }
}

/// Failures from the tokenizer or parser: malformed expression source.
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxError {
    UnexpectedChar { ch: char, position: Position },
    UnterminatedString { position: Position },
    UnexpectedEof,
    UnexpectedToken { found: String, expected: Vec<String>, position: Position },
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxError::UnexpectedChar { ch, position } => {
                write!(f, "unexpected character '{}' at {}", ch, position)
            }
            SyntaxError::UnterminatedString { position } => {
                write!(f, "unterminated string at {}", position)
            }
            SyntaxError::UnexpectedEof => write!(f, "unexpected end of expression"),
            SyntaxError::UnexpectedToken { found, expected, position } => {
                write!(f, "unexpected {} at {}, expected one of: {}", found, position, expected.join(", "))
            }
        }
    }
}

impl std::error::Error for SyntaxError {}

/// Failures evaluating a well-formed expression against a context: wrong
/// operand types, unknown identifiers, bad indices.
#[derive(Debug, Clone, PartialEq)]
pub enum InterpreterError {
    TypeError(String),
    UnknownContextValue(String),
    DivisionByZero,
    IndexOutOfBounds,
    NotCallable(String),
}

impl fmt::Display for InterpreterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterpreterError::TypeError(msg) => write!(f, "{}", msg),
            InterpreterError::UnknownContextValue(name) => {
                write!(f, "unknown context value {}", name)
            }
            InterpreterError::DivisionByZero => write!(f, "division by zero"),
            InterpreterError::IndexOutOfBounds => write!(f, "index out of bounds"),
            InterpreterError::NotCallable(name) => write!(f, "{} is not callable", name),
        }
    }
}

impl std::error::Error for InterpreterError {}

impl InterpreterError {
    pub fn type_error(msg: impl Into<String>) -> Self {
        InterpreterError::TypeError(msg.into())
    }
}

/// Failures specific to template rendering: operator misuse, reserved keys,
/// missing mapping keys accessed via `.`.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateError(pub String);

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for TemplateError {}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    Syntax(SyntaxError),
    Interpreter(InterpreterError),
    Template(TemplateError),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Syntax(e) => write!(f, "{}", e),
            ErrorKind::Interpreter(e) => write!(f, "{}", e),
            ErrorKind::Template(e) => write!(f, "{}", e),
        }
    }
}

/// The single error type `render`/`evaluate_expression` return: a failure
/// kind plus the template path it occurred at (empty outside of rendering).
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub kind: ErrorKind,
    pub location: Location,
}

impl Error {
    pub fn syntax(e: SyntaxError) -> Self {
        Error { kind: ErrorKind::Syntax(e), location: Location::new() }
    }

    pub fn interpreter(e: InterpreterError) -> Self {
        Error { kind: ErrorKind::Interpreter(e), location: Location::new() }
    }

    pub fn template(msg: impl Into<String>) -> Self {
        Error { kind: ErrorKind::Template(TemplateError(msg.into())), location: Location::new() }
    }

    pub fn with_location(mut self, fragment: String) -> Self {
        self.location.push(fragment);
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.location.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.location, self.kind)
        }
    }
}

impl std::error::Error for Error {}

impl From<SyntaxError> for Error {
    fn from(e: SyntaxError) -> Self {
        Error::syntax(e)
    }
}

impl From<InterpreterError> for Error {
    fn from(e: InterpreterError) -> Self {
        Error::interpreter(e)
    }
}

impl From<TemplateError> for Error {
    fn from(e: TemplateError) -> Self {
        Error { kind: ErrorKind::Template(e), location: Location::new() }
    }
}

//! The expression-language AST. JSON-e expressions (the `${...}` language and
//! the payload of `$eval`/`$if`/etc.) parse down to this tree; `interpreter.rs`
//! walks it against a `Context`.

use crate::value::Value;

/// Unary prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Arithmetic negation (`-`)
    Neg,
    /// Unary plus (`+`), a no-op that still requires a numeric operand
    Pos,
    /// Boolean negation (`!`)
    Not,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Logical
    /// Logical OR (`||`), short-circuiting, coerces to bool
    Or,
    /// Logical AND (`&&`), short-circuiting, coerces to bool
    And,
    // Membership
    /// Substring/array/object-key membership (`in`)
    In,
    // Comparison
    /// Equal (`==`)
    Eq,
    /// Not equal (`!=`)
    NotEq,
    /// Less than (`<`)
    Lt,
    /// Less than or equal (`<=`)
    Le,
    /// Greater than (`>`)
    Gt,
    /// Greater than or equal (`>=`)
    Ge,
    // Arithmetic
    /// Addition, or string/array concatenation (`+`)
    Add,
    /// Subtraction (`-`)
    Sub,
    /// Multiplication (`*`)
    Mul,
    /// Division (`/`), always produces a float
    Div,
    /// Exponentiation (`**`), right-associative
    Pow,
    // Access
    /// Property access (`.name`); the right side is always a string primitive
    Dot,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal null/bool/number/string. Also used for the right-hand side
    /// of `.name` access, so the interpreter never re-resolves it as an
    /// identifier.
    Primitive(Value),
    ContextValue(String),
    Unary { op: UnaryOp, expr: Box<Expr> },
    Binary { op: BinOp, left: Box<Expr>, right: Box<Expr> },
    /// `target[left:right]` when `is_interval`, else plain `target[index]`.
    Access {
        target: Box<Expr>,
        is_interval: bool,
        index: Option<Box<Expr>>,
        left: Option<Box<Expr>>,
        right: Option<Box<Expr>>,
    },
    FunctionCall { callee: Box<Expr>, args: Vec<Expr> },
    List(Vec<Expr>),
    Object(Vec<(String, Expr)>),
}

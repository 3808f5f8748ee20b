//! Recursive-descent, precedence-climbing parser for the expression language.
//!
//! Unlike the reference Python parser (which threads unary operators through
//! the lowest grammar level, beneath property access), this parser places
//! unary `!`/`+`/`-` *above* `**`, so a leading `-` applies to the whole
//! power chain it prefixes rather than just its immediate operand. That
//! choice is what makes `-2 ** 2` evaluate to `-4` as the specification
//! requires; see DESIGN.md for the reasoning.

use crate::ast::{BinOp, Expr, UnaryOp};
use crate::error::SyntaxError;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::value::Value;

pub struct Parser {
    lexer: Lexer,
    current: Token,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, SyntaxError> {
        let current = lexer.next_token()?;
        Ok(Parser { lexer, current })
    }

    pub fn current_token(&self) -> &Token {
        &self.current
    }

    fn advance(&mut self) -> Result<(), SyntaxError> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn unexpected(&self, expected: &[&str]) -> SyntaxError {
        SyntaxError::UnexpectedToken {
            found: self.current.kind.to_string(),
            expected: expected.iter().map(|s| s.to_string()).collect(),
            position: self.current.position,
        }
    }

    fn eat(&mut self, kind: TokenKind, expected: &str) -> Result<(), SyntaxError> {
        if self.current.kind != kind {
            return Err(self.unexpected(&[expected]));
        }
        self.advance()
    }

    /// Parses a full expression and requires the token stream to be exhausted.
    pub fn parse_expression_to_end(&mut self) -> Result<Expr, SyntaxError> {
        let expr = self.parse_expression()?;
        if self.current.kind != TokenKind::Eof {
            return Err(self.unexpected(&["end of expression"]));
        }
        Ok(expr)
    }

    /// Parses a single expression, leaving whatever follows (used by the
    /// interpolator, which must stop at the `}` terminator).
    pub fn parse_expression(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, SyntaxError> {
        let mut node = self.parse_and()?;
        while self.current.kind == TokenKind::OrOr {
            self.advance()?;
            let rhs = self.parse_and()?;
            node = Expr::Binary { op: BinOp::Or, left: Box::new(node), right: Box::new(rhs) };
        }
        Ok(node)
    }

    fn parse_and(&mut self) -> Result<Expr, SyntaxError> {
        let mut node = self.parse_in()?;
        while self.current.kind == TokenKind::AndAnd {
            self.advance()?;
            let rhs = self.parse_in()?;
            node = Expr::Binary { op: BinOp::And, left: Box::new(node), right: Box::new(rhs) };
        }
        Ok(node)
    }

    fn parse_in(&mut self) -> Result<Expr, SyntaxError> {
        let mut node = self.parse_equality()?;
        while self.current.kind == TokenKind::In {
            self.advance()?;
            let rhs = self.parse_equality()?;
            node = Expr::Binary { op: BinOp::In, left: Box::new(node), right: Box::new(rhs) };
        }
        Ok(node)
    }

    fn parse_equality(&mut self) -> Result<Expr, SyntaxError> {
        let mut node = self.parse_comparison()?;
        loop {
            let op = match self.current.kind {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::NotEq => BinOp::NotEq,
                _ => break,
            };
            self.advance()?;
            let rhs = self.parse_comparison()?;
            node = Expr::Binary { op, left: Box::new(node), right: Box::new(rhs) };
        }
        Ok(node)
    }

    fn parse_comparison(&mut self) -> Result<Expr, SyntaxError> {
        let mut node = self.parse_additive()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Lt => BinOp::Lt,
                TokenKind::Le => BinOp::Le,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::Ge => BinOp::Ge,
                _ => break,
            };
            self.advance()?;
            let rhs = self.parse_additive()?;
            node = Expr::Binary { op, left: Box::new(node), right: Box::new(rhs) };
        }
        Ok(node)
    }

    fn parse_additive(&mut self) -> Result<Expr, SyntaxError> {
        let mut node = self.parse_multiplicative()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance()?;
            let rhs = self.parse_multiplicative()?;
            node = Expr::Binary { op, left: Box::new(node), right: Box::new(rhs) };
        }
        Ok(node)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, SyntaxError> {
        let mut node = self.parse_unary()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                _ => break,
            };
            self.advance()?;
            let rhs = self.parse_unary()?;
            node = Expr::Binary { op, left: Box::new(node), right: Box::new(rhs) };
        }
        Ok(node)
    }

    fn parse_unary(&mut self) -> Result<Expr, SyntaxError> {
        let op = match self.current.kind {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Plus => Some(UnaryOp::Pos),
            TokenKind::Bang => Some(UnaryOp::Not),
            _ => None,
        };
        match op {
            Some(op) => {
                self.advance()?;
                let expr = self.parse_unary()?;
                Ok(Expr::Unary { op, expr: Box::new(expr) })
            }
            None => self.parse_pow(),
        }
    }

    /// Right-associative: `self.parse_unary()` on the right lets it recurse
    /// back into another `**` and also accept a unary-prefixed exponent
    /// (`2 ** -2`).
    fn parse_pow(&mut self) -> Result<Expr, SyntaxError> {
        let base = self.parse_postfix()?;
        if self.current.kind == TokenKind::Pow {
            self.advance()?;
            let exponent = self.parse_unary()?;
            Ok(Expr::Binary { op: BinOp::Pow, left: Box::new(base), right: Box::new(exponent) })
        } else {
            Ok(base)
        }
    }

    fn parse_postfix(&mut self) -> Result<Expr, SyntaxError> {
        let mut node = self.parse_primary()?;
        loop {
            match self.current.kind {
                TokenKind::LBracket => {
                    node = self.parse_bracket_access(node)?;
                    if self.current.kind == TokenKind::LParen {
                        node = self.parse_call(node)?;
                    }
                }
                TokenKind::Dot => {
                    self.advance()?;
                    let name = match &self.current.kind {
                        TokenKind::Identifier(s) => s.clone(),
                        _ => return Err(self.unexpected(&["identifier"])),
                    };
                    self.advance()?;
                    node = Expr::Binary {
                        op: BinOp::Dot,
                        left: Box::new(node),
                        right: Box::new(Expr::Primitive(Value::String(name))),
                    };
                }
                _ => break,
            }
        }
        Ok(node)
    }

    fn parse_bracket_access(&mut self, target: Expr) -> Result<Expr, SyntaxError> {
        self.eat(TokenKind::LBracket, "[")?;
        let mut left = None;
        let mut is_interval = false;
        if self.current.kind != TokenKind::Colon {
            left = Some(Box::new(self.parse_expression()?));
        }
        if self.current.kind == TokenKind::Colon {
            is_interval = true;
            self.advance()?;
        }
        let mut right = None;
        if self.current.kind != TokenKind::RBracket {
            right = Some(Box::new(self.parse_expression()?));
        }
        self.eat(TokenKind::RBracket, "]")?;
        if is_interval {
            Ok(Expr::Access { target: Box::new(target), is_interval: true, index: None, left, right })
        } else {
            let index = left.ok_or_else(|| self.unexpected(&["expression"]))?;
            Ok(Expr::Access { target: Box::new(target), is_interval: false, index: Some(index), left: None, right: None })
        }
    }

    fn parse_call(&mut self, callee: Expr) -> Result<Expr, SyntaxError> {
        self.eat(TokenKind::LParen, "(")?;
        let mut args = Vec::new();
        if self.current.kind != TokenKind::RParen {
            args.push(self.parse_expression()?);
            while self.current.kind == TokenKind::Comma {
                self.advance()?;
                args.push(self.parse_expression()?);
            }
        }
        self.eat(TokenKind::RParen, ")")?;
        Ok(Expr::FunctionCall { callee: Box::new(callee), args })
    }

    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        match self.current.kind.clone() {
            TokenKind::Number(v, is_float) => {
                self.advance()?;
                Ok(Expr::Primitive(if is_float { Value::float(v) } else { Value::integer(v as i64) }))
            }
            TokenKind::String(s) => {
                self.advance()?;
                Ok(Expr::Primitive(Value::String(s)))
            }
            TokenKind::True => { self.advance()?; Ok(Expr::Primitive(Value::Bool(true))) }
            TokenKind::False => { self.advance()?; Ok(Expr::Primitive(Value::Bool(false))) }
            TokenKind::Null => { self.advance()?; Ok(Expr::Primitive(Value::Null)) }
            TokenKind::Identifier(name) => {
                self.advance()?;
                let node = Expr::ContextValue(name);
                if self.current.kind == TokenKind::LParen {
                    self.parse_call(node)
                } else {
                    Ok(node)
                }
            }
            TokenKind::LParen => {
                self.advance()?;
                let expr = self.parse_expression()?;
                self.eat(TokenKind::RParen, ")")?;
                Ok(expr)
            }
            TokenKind::LBracket => self.parse_list(),
            TokenKind::LBrace => self.parse_object(),
            _ => Err(self.unexpected(&[
                "!", "(", "+", "-", "[", "false", "identifier", "null", "number", "string", "true", "{",
            ])),
        }
    }

    fn parse_list(&mut self) -> Result<Expr, SyntaxError> {
        self.eat(TokenKind::LBracket, "[")?;
        let mut items = Vec::new();
        if self.current.kind != TokenKind::RBracket {
            items.push(self.parse_expression()?);
            while self.current.kind == TokenKind::Comma {
                self.advance()?;
                items.push(self.parse_expression()?);
            }
        }
        self.eat(TokenKind::RBracket, "]")?;
        Ok(Expr::List(items))
    }

    fn parse_object(&mut self) -> Result<Expr, SyntaxError> {
        self.eat(TokenKind::LBrace, "{")?;
        let mut entries = Vec::new();
        if self.current.kind != TokenKind::RBrace {
            loop {
                let key = match self.current.kind.clone() {
                    TokenKind::String(s) => { self.advance()?; s }
                    TokenKind::Identifier(s) => { self.advance()?; s }
                    _ => return Err(self.unexpected(&["string", "identifier"])),
                };
                self.eat(TokenKind::Colon, ":")?;
                let value = self.parse_expression()?;
                entries.push((key, value));
                if self.current.kind == TokenKind::Comma {
                    self.advance()?;
                } else {
                    break;
                }
            }
        }
        self.eat(TokenKind::RBrace, "}")?;
        Ok(Expr::Object(entries))
    }
}

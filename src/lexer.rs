use crate::error::SyntaxError;

/// Position in source code for error reporting, grounded on the teacher's
/// char-cursor lexer style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Position {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Position { line, column, offset }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// `(value, has_fractional_part)` — the fraction flag lets the parser
    /// tag whole-number literals like `2` as integers and `2.0` as floats.
    Number(f64, bool),
    Identifier(String),
    String(String),
    True,
    False,
    Null,
    In,

    Plus,
    Minus,
    Star,
    Slash,
    Pow,
    Bang,
    AndAnd,
    OrOr,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,

    Dot,
    Comma,
    Colon,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,

    Eof,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Number(n, _) => write!(f, "number {}", n),
            TokenKind::Identifier(s) => write!(f, "identifier '{}'", s),
            TokenKind::String(s) => write!(f, "string {:?}", s),
            TokenKind::Eof => write!(f, "end of expression"),
            other => write!(f, "'{:?}'", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the token's first character, relative to the source
    /// this lexer was constructed over.
    pub start: usize,
    pub position: Position,
}

/// Hand-written scanner for the expression language: no regex crate is used
/// here, matching the teacher's own char-cursor lexer even though `regex`
/// happens to be in its dependency tree for an unrelated feature.
pub struct Lexer {
    input: Vec<char>,
    byte_offsets: Vec<usize>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let mut chars = Vec::new();
        let mut byte_offsets = Vec::new();
        for (byte_idx, ch) in input.char_indices() {
            byte_offsets.push(byte_idx);
            chars.push(ch);
        }
        byte_offsets.push(input.len());
        Lexer { input: chars, byte_offsets, position: 0, line: 1, column: 1 }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn byte_offset(&self) -> usize {
        self.byte_offsets[self.position]
    }

    fn current_position(&self) -> Position {
        Position::new(self.line, self.column, self.position)
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    /// Strings have no escapes: a backslash is a literal backslash, and the
    /// only way to include the delimiter is to use the other quote style.
    fn read_string(&mut self, quote: char) -> Result<String, SyntaxError> {
        let start_pos = self.current_position();
        let mut result = String::new();
        self.advance();
        loop {
            match self.current_char() {
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                Some(c) => {
                    result.push(c);
                    self.advance();
                }
                None => return Err(SyntaxError::UnterminatedString { position: start_pos }),
            }
        }
    }

    fn read_number(&mut self) -> (f64, bool) {
        let mut number = String::new();
        let mut is_float = false;
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        if self.current_char() == Some('.') && self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            number.push('.');
            self.advance();
            while let Some(ch) = self.current_char() {
                if ch.is_ascii_digit() {
                    number.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }
        }
        (number.parse::<f64>().expect("number regex already validated this"), is_float)
    }

    pub fn next_token(&mut self) -> Result<Token, SyntaxError> {
        self.skip_whitespace();
        let start = self.byte_offset();
        let position = self.current_position();

        let kind = match self.current_char() {
            None => TokenKind::Eof,
            Some('*') => {
                self.advance();
                if self.current_char() == Some('*') {
                    self.advance();
                    TokenKind::Pow
                } else {
                    TokenKind::Star
                }
            }
            Some('+') => { self.advance(); TokenKind::Plus }
            Some('-') => { self.advance(); TokenKind::Minus }
            Some('/') => { self.advance(); TokenKind::Slash }
            Some('[') => { self.advance(); TokenKind::LBracket }
            Some(']') => { self.advance(); TokenKind::RBracket }
            Some('.') => { self.advance(); TokenKind::Dot }
            Some('(') => { self.advance(); TokenKind::LParen }
            Some(')') => { self.advance(); TokenKind::RParen }
            Some('{') => { self.advance(); TokenKind::LBrace }
            Some('}') => { self.advance(); TokenKind::RBrace }
            Some(':') => { self.advance(); TokenKind::Colon }
            Some(',') => { self.advance(); TokenKind::Comma }
            Some('>') => {
                self.advance();
                if self.current_char() == Some('=') { self.advance(); TokenKind::Ge } else { TokenKind::Gt }
            }
            Some('<') => {
                self.advance();
                if self.current_char() == Some('=') { self.advance(); TokenKind::Le } else { TokenKind::Lt }
            }
            Some('=') => {
                self.advance();
                if self.current_char() == Some('=') {
                    self.advance();
                    TokenKind::EqEq
                } else {
                    return Err(SyntaxError::UnexpectedChar { ch: '=', position });
                }
            }
            Some('!') => {
                self.advance();
                if self.current_char() == Some('=') { self.advance(); TokenKind::NotEq } else { TokenKind::Bang }
            }
            Some('&') => {
                self.advance();
                if self.current_char() == Some('&') {
                    self.advance();
                    TokenKind::AndAnd
                } else {
                    return Err(SyntaxError::UnexpectedChar { ch: '&', position });
                }
            }
            Some('|') => {
                self.advance();
                if self.current_char() == Some('|') {
                    self.advance();
                    TokenKind::OrOr
                } else {
                    return Err(SyntaxError::UnexpectedChar { ch: '|', position });
                }
            }
            Some('"') => TokenKind::String(self.read_string('"')?),
            Some('\'') => TokenKind::String(self.read_string('\'')?),
            Some(ch) if ch.is_ascii_digit() => {
                let (value, is_float) = self.read_number();
                TokenKind::Number(value, is_float)
            }
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                let ident = self.read_identifier();
                match ident.as_str() {
                    "true" => TokenKind::True,
                    "false" => TokenKind::False,
                    "null" => TokenKind::Null,
                    "in" => TokenKind::In,
                    _ => TokenKind::Identifier(ident),
                }
            }
            Some(ch) => return Err(SyntaxError::UnexpectedChar { ch, position }),
        };

        Ok(Token { kind, start, position })
    }
}

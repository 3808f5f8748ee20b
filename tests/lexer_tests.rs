// tests/lexer_tests.rs

use jsone::error::SyntaxError;
use jsone::lexer::{Lexer, TokenKind};

fn tokens(src: &str) -> Vec<TokenKind> {
    let mut lexer = Lexer::new(src);
    let mut out = Vec::new();
    loop {
        let tok = lexer.next_token().unwrap();
        let done = tok.kind == TokenKind::Eof;
        out.push(tok.kind);
        if done {
            break;
        }
    }
    out
}

// ============================================================================
// Keywords and operators
// ============================================================================

#[test]
fn keywords_and_operators() {
    assert_eq!(
        tokens("true false null in"),
        vec![TokenKind::True, TokenKind::False, TokenKind::Null, TokenKind::In, TokenKind::Eof]
    );
}

#[test]
fn double_star_is_pow_not_two_stars() {
    assert_eq!(
        tokens("2**3"),
        vec![TokenKind::Number(2.0, false), TokenKind::Pow, TokenKind::Number(3.0, false), TokenKind::Eof]
    );
}

// ============================================================================
// String literals
// ============================================================================

#[test]
fn strings_have_no_escapes() {
    assert_eq!(tokens(r#""a\b""#), vec![TokenKind::String("a\\b".into()), TokenKind::Eof]);
}

#[test]
fn unterminated_string_reports_position() {
    let mut lexer = Lexer::new("\"abc");
    let err = lexer.next_token().unwrap_err();
    assert!(matches!(err, SyntaxError::UnterminatedString { .. }));
}

// tests/parser_tests.rs

use jsone::ast::{BinOp, Expr, UnaryOp};
use jsone::lexer::Lexer;
use jsone::parser::Parser;
use jsone::value::Value;

fn parse(src: &str) -> Expr {
    let lexer = Lexer::new(src);
    let mut parser = Parser::new(lexer).unwrap();
    parser.parse_expression_to_end().unwrap()
}

// ============================================================================
// Precedence and associativity
// ============================================================================

#[test]
fn pow_is_right_associative() {
    // 2 ** 3 ** 2 should parse as 2 ** (3 ** 2)
    let expr = parse("2 ** 3 ** 2");
    match expr {
        Expr::Binary { op: BinOp::Pow, right, .. } => {
            assert!(matches!(*right, Expr::Binary { op: BinOp::Pow, .. }));
        }
        other => panic!("expected Pow, got {:?}", other),
    }
}

#[test]
fn unary_minus_wraps_whole_pow_chain() {
    // -2 ** 2 should parse as -(2 ** 2), per the spec's worked example.
    let expr = parse("-2 ** 2");
    match expr {
        Expr::Unary { op: UnaryOp::Neg, expr } => {
            assert!(matches!(*expr, Expr::Binary { op: BinOp::Pow, .. }));
        }
        other => panic!("expected Unary(Neg, Pow), got {:?}", other),
    }
}

// ============================================================================
// Postfix chains
// ============================================================================

#[test]
fn dot_access_wraps_identifier_as_primitive() {
    let expr = parse("x.y");
    match expr {
        Expr::Binary { op: BinOp::Dot, right, .. } => {
            assert_eq!(*right, Expr::Primitive(Value::String("y".into())));
        }
        other => panic!("expected Dot, got {:?}", other),
    }
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn integer_and_float_literals_are_tagged() {
    assert_eq!(parse("2"), Expr::Primitive(Value::integer(2)));
    assert_eq!(parse("2.5"), Expr::Primitive(Value::float(2.5)));
}

#[test]
fn object_literal_rejects_trailing_comma() {
    let lexer = Lexer::new("{\"a\": 1,}");
    let mut parser = Parser::new(lexer).unwrap();
    assert!(parser.parse_expression_to_end().is_err());
}

#[test]
fn list_literal_rejects_trailing_comma() {
    let lexer = Lexer::new("[1, 2,]");
    let mut parser = Parser::new(lexer).unwrap();
    assert!(parser.parse_expression_to_end().is_err());
}

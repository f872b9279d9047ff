use super::*;
use goose_ir::Op;
use num_bigint::BigInt;
use pretty_assertions::assert_eq;

fn kinds(source: &str) -> Vec<TokenKind> {
    let (tokens, errors) = lex(source);
    assert_eq!(errors, vec![]);
    tokens.into_iter().map(|t| t.kind).collect()
}

fn ident(name: &str) -> TokenKind {
    TokenKind::Ident(name.into())
}

#[test]
fn test_lex_let_statement() {
    assert_eq!(
        kinds("let x = 42"),
        vec![
            TokenKind::Let,
            ident("x"),
            TokenKind::Op(Op::Assign),
            TokenKind::Int(BigInt::from(42)),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_lex_newlines_and_comments_are_skipped() {
    assert_eq!(
        kinds("x // trailing\n/* block\n comment */ y"),
        vec![ident("x"), ident("y"), TokenKind::Eof]
    );
}

#[test]
fn test_lex_number_forms() {
    assert_eq!(
        kinds("0xFF 0o17 0b101 1_000 2.5 1e3"),
        vec![
            TokenKind::Int(BigInt::from(255)),
            TokenKind::Int(BigInt::from(15)),
            TokenKind::Int(BigInt::from(5)),
            TokenKind::Int(BigInt::from(1000)),
            TokenKind::Float(2.5),
            TokenKind::Float(1000.0),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_lex_big_integer_literal() {
    let kinds = kinds("123456789012345678901234567890");
    let expected: BigInt = "123456789012345678901234567890".parse().unwrap_or_default();
    assert_eq!(kinds[0], TokenKind::Int(expected));
}

#[test]
fn test_lex_method_call_on_integer_is_not_a_float() {
    assert_eq!(
        kinds("1.toString()"),
        vec![
            TokenKind::Int(BigInt::from(1)),
            TokenKind::Period,
            ident("toString"),
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_lex_longest_operator_wins() {
    assert_eq!(
        kinds("a **= b <=> c ?? d ??= e ... ::"),
        vec![
            ident("a"),
            TokenKind::Op(Op::PowAssign),
            ident("b"),
            TokenKind::Op(Op::Compare),
            ident("c"),
            TokenKind::Op(Op::LogNull),
            ident("d"),
            TokenKind::Op(Op::LogNullAssign),
            ident("e"),
            TokenKind::Ellipsis,
            TokenKind::Bind,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_lex_prefixed_names() {
    assert_eq!(
        kinds("#name #[k] $bound"),
        vec![
            TokenKind::ThisProp("name".into()),
            TokenKind::HashLBracket,
            ident("k"),
            TokenKind::RBracket,
            TokenKind::MatchBind("bound".into()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_lex_plain_string_with_escapes() {
    assert_eq!(
        kinds(r#""a\tb\n\x41é\$""#),
        vec![
            TokenKind::Str(vec![StrPiece::Text("a\tb\nAé$".to_string())]),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_lex_string_interpolation_pieces() {
    let (tokens, errors) = lex(r#""hi $name, ${a + "}"}!""#);
    assert_eq!(errors, vec![]);
    let TokenKind::Str(pieces) = &tokens[0].kind else {
        panic!("expected string token, got {:?}", tokens[0].kind);
    };
    assert_eq!(
        pieces,
        &vec![
            StrPiece::Text("hi ".to_string()),
            StrPiece::Ident {
                name: "name".into(),
                span: Span::new(5, 9),
            },
            StrPiece::Text(", ".to_string()),
            StrPiece::Expr {
                source: r#"a + "}""#.to_string(),
                offset: 13,
            },
            StrPiece::Text("!".to_string()),
        ]
    );
    assert_eq!(tokens[1].kind, TokenKind::Eof);
}

#[test]
fn test_lex_this_prop_interpolation() {
    let kinds = kinds(r#""x=$#x""#);
    assert_eq!(
        kinds[0],
        TokenKind::Str(vec![
            StrPiece::Text("x=".to_string()),
            StrPiece::ThisProp {
                name: "x".into(),
                span: Span::new(3, 6),
            },
        ])
    );
}

#[test]
fn test_lex_unterminated_string_reports_error() {
    let (tokens, errors) = lex("\"abc");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "unterminated string literal");
    assert_eq!(tokens[0].kind, TokenKind::Error);
}

#[test]
fn test_lex_unknown_escape_reports_error() {
    let (_, errors) = lex(r#""\q""#);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("unknown escape"));
}

#[test]
fn test_lex_at_offsets_spans() {
    let (tokens, _) = lex_at("x", 40);
    assert_eq!(tokens[0].span, Span::new(40, 41));
    assert_eq!(tokens[1].span, Span::point(41));
}

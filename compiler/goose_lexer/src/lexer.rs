//! Logos-driven tokenizer.
//!
//! Newlines are ordinary whitespace in goose: statements end where the
//! grammar says they end, and blocks close with `end`. Comments are
//! skipped, so the token stream holds only significant tokens.

use std::sync::Arc;

use goose_ir::{Op, Span};
use logos::Logos;
use num_bigint::BigInt;

use crate::string;
use crate::{LexError, Token, TokenKind};

/// Raw token from logos (before literal decoding).
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum RawToken {
    #[regex(r"//[^\n]*", logos::skip)]
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/", logos::skip)]
    Comment,

    // === Keywords ===
    #[token("as")]
    As,
    #[token("async")]
    Async,
    #[token("await")]
    Await,
    #[token("break")]
    Break,
    #[token("catch")]
    Catch,
    #[token("const")]
    Const,
    #[token("continue")]
    Continue,
    #[token("do")]
    Do,
    #[token("else")]
    Else,
    #[token("end")]
    End,
    #[token("export")]
    Export,
    #[token("false")]
    False,
    #[token("finally")]
    Finally,
    #[token("fn")]
    Fn,
    #[token("for")]
    For,
    #[token("forever")]
    Forever,
    #[token("frozen")]
    Frozen,
    #[token("generator")]
    Generator,
    #[token("if")]
    If,
    #[token("import")]
    Import,
    #[token("in")]
    In,
    #[token("init")]
    Init,
    #[token("is")]
    Is,
    #[token("let")]
    Let,
    #[token("match")]
    Match,
    #[token("memo")]
    Memo,
    #[token("native")]
    Native,
    #[token("not")]
    Not,
    #[token("null")]
    Null,
    #[token("operator")]
    Operator,
    #[token("repeat")]
    Repeat,
    #[token("return")]
    Return,
    #[token("show")]
    Show,
    #[token("step")]
    Step,
    #[token("struct")]
    Struct,
    #[token("symbol")]
    Symbol,
    #[token("then")]
    Then,
    #[token("throw")]
    Throw,
    #[token("times")]
    Times,
    #[token("to")]
    To,
    #[token("true")]
    True,
    #[token("try")]
    Try,
    #[token("while")]
    While,
    #[token("yield")]
    Yield,

    // === Operators ===
    #[token("=")]
    Assign,
    #[token("+")]
    Add,
    #[token("-")]
    Sub,
    #[token("*")]
    Mul,
    #[token("/")]
    Quo,
    #[token("%")]
    Rem,
    #[token("**")]
    Pow,
    #[token(">")]
    Gt,
    #[token("<")]
    Lt,
    #[token("<=")]
    Lte,
    #[token(">=")]
    Gte,
    #[token("==")]
    Eq,
    #[token("!=")]
    Neq,
    #[token("<=>")]
    Compare,
    #[token("++")]
    Inc,
    #[token("--")]
    Dec,
    #[token("?")]
    Question,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("~")]
    BitNot,
    #[token("&")]
    BitAnd,
    #[token("|")]
    BitOr,
    #[token("^")]
    BitXor,
    #[token("&&")]
    LogAnd,
    #[token("||")]
    LogOr,
    #[token("!")]
    LogNot,
    #[token("??")]
    LogNull,
    #[token("+=")]
    AddAssign,
    #[token("-=")]
    SubAssign,
    #[token("*=")]
    MulAssign,
    #[token("/=")]
    QuoAssign,
    #[token("%=")]
    RemAssign,
    #[token("**=")]
    PowAssign,
    #[token("&&=")]
    LogAndAssign,
    #[token("||=")]
    LogOrAssign,
    #[token("??=")]
    LogNullAssign,
    #[token("&=")]
    BitAndAssign,
    #[token("|=")]
    BitOrAssign,
    #[token("^=")]
    BitXorAssign,
    #[token("<<=")]
    ShlAssign,
    #[token(">>=")]
    ShrAssign,

    // === Punctuation ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token(".")]
    Period,
    #[token("->")]
    Arrow,
    #[token("...")]
    Ellipsis,
    #[token("#[")]
    HashLBracket,
    #[token("::")]
    Bind,

    // === Literals ===
    #[regex(r"0[xX][0-9a-fA-F][0-9a-fA-F_]*", |lex| parse_int(&lex.slice()[2..], 16))]
    #[regex(r"0[oO][0-7][0-7_]*", |lex| parse_int(&lex.slice()[2..], 8))]
    #[regex(r"0[bB][01][01_]*", |lex| parse_int(&lex.slice()[2..], 2))]
    #[regex(r"[0-9][0-9_]*", |lex| parse_int(lex.slice(), 10))]
    Int(BigInt),

    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?", |lex| parse_float(lex.slice()))]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9]+", |lex| parse_float(lex.slice()))]
    Float(f64),

    #[token("\"", string_extent)]
    Str,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[regex(r"#[a-zA-Z_][a-zA-Z0-9_]*")]
    ThisProp,

    #[regex(r"\$[a-zA-Z_][a-zA-Z0-9_]*")]
    MatchBind,
}

fn parse_int(digits: &str, radix: u32) -> Option<BigInt> {
    BigInt::parse_bytes(digits.replace('_', "").as_bytes(), radix)
}

fn parse_float(text: &str) -> Option<f64> {
    text.replace('_', "").parse::<f64>().ok()
}

/// Extend the current token over the rest of a string literal.
fn string_extent(lex: &mut logos::Lexer<'_, RawToken>) -> bool {
    match string::literal_len(lex.remainder()) {
        Some(len) => {
            lex.bump(len);
            true
        }
        None => {
            lex.bump(lex.remainder().len());
            false
        }
    }
}

/// Tokenize `source`.
///
/// Always returns a token list ending in [`TokenKind::Eof`]; problems are
/// reported alongside as [`LexError`]s and leave an [`TokenKind::Error`]
/// token in the stream so the parser can resynchronize.
pub fn lex(source: &str) -> (Vec<Token>, Vec<LexError>) {
    lex_at(source, 0)
}

/// Tokenize a fragment that starts at byte `base` of its file.
pub fn lex_at(source: &str, base: u32) -> (Vec<Token>, Vec<LexError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut logos = RawToken::lexer(source);

    while let Some(result) = logos.next() {
        let span = Span::from_range(logos.span()).offset_by(base);
        let slice = logos.slice();
        let kind = match result {
            Ok(raw) => match convert(raw, slice, span) {
                Ok(kind) => kind,
                Err(err) => {
                    errors.push(err);
                    TokenKind::Error
                }
            },
            Err(()) => {
                let message = if slice.starts_with('"') {
                    "unterminated string literal".to_string()
                } else {
                    format!("unexpected character {slice:?}")
                };
                errors.push(LexError::new(message, span));
                TokenKind::Error
            }
        };
        tokens.push(Token::new(kind, span));
    }

    let end = u32::try_from(source.len()).unwrap_or(u32::MAX);
    tokens.push(Token::new(TokenKind::Eof, Span::point(end).offset_by(base)));
    (tokens, errors)
}

fn convert(raw: RawToken, slice: &str, span: Span) -> Result<TokenKind, LexError> {
    let kind = match raw {
        RawToken::Comment => TokenKind::Error,
        RawToken::Int(n) => TokenKind::Int(n),
        RawToken::Float(f) => TokenKind::Float(f),
        RawToken::Str => TokenKind::Str(string::decode(slice, span.start)?),
        RawToken::Ident => TokenKind::Ident(Arc::from(slice)),
        RawToken::ThisProp => TokenKind::ThisProp(Arc::from(&slice[1..])),
        RawToken::MatchBind => TokenKind::MatchBind(Arc::from(&slice[1..])),

        RawToken::As => TokenKind::As,
        RawToken::Async => TokenKind::Async,
        RawToken::Await => TokenKind::Await,
        RawToken::Break => TokenKind::Break,
        RawToken::Catch => TokenKind::Catch,
        RawToken::Const => TokenKind::Const,
        RawToken::Continue => TokenKind::Continue,
        RawToken::Do => TokenKind::Do,
        RawToken::Else => TokenKind::Else,
        RawToken::End => TokenKind::End,
        RawToken::Export => TokenKind::Export,
        RawToken::False => TokenKind::False,
        RawToken::Finally => TokenKind::Finally,
        RawToken::Fn => TokenKind::Fn,
        RawToken::For => TokenKind::For,
        RawToken::Forever => TokenKind::Forever,
        RawToken::Frozen => TokenKind::Frozen,
        RawToken::Generator => TokenKind::Generator,
        RawToken::If => TokenKind::If,
        RawToken::Import => TokenKind::Import,
        RawToken::In => TokenKind::In,
        RawToken::Init => TokenKind::Init,
        RawToken::Is => TokenKind::Is,
        RawToken::Let => TokenKind::Let,
        RawToken::Match => TokenKind::Match,
        RawToken::Memo => TokenKind::Memo,
        RawToken::Native => TokenKind::Native,
        RawToken::Not => TokenKind::Not,
        RawToken::Null => TokenKind::Null,
        RawToken::Operator => TokenKind::Operator,
        RawToken::Repeat => TokenKind::Repeat,
        RawToken::Return => TokenKind::Return,
        RawToken::Show => TokenKind::Show,
        RawToken::Step => TokenKind::Step,
        RawToken::Struct => TokenKind::Struct,
        RawToken::Symbol => TokenKind::Symbol,
        RawToken::Then => TokenKind::Then,
        RawToken::Throw => TokenKind::Throw,
        RawToken::Times => TokenKind::Times,
        RawToken::To => TokenKind::To,
        RawToken::True => TokenKind::True,
        RawToken::Try => TokenKind::Try,
        RawToken::While => TokenKind::While,
        RawToken::Yield => TokenKind::Yield,

        RawToken::Assign => TokenKind::Op(Op::Assign),
        RawToken::Add => TokenKind::Op(Op::Add),
        RawToken::Sub => TokenKind::Op(Op::Sub),
        RawToken::Mul => TokenKind::Op(Op::Mul),
        RawToken::Quo => TokenKind::Op(Op::Quo),
        RawToken::Rem => TokenKind::Op(Op::Rem),
        RawToken::Pow => TokenKind::Op(Op::Pow),
        RawToken::Gt => TokenKind::Op(Op::Gt),
        RawToken::Lt => TokenKind::Op(Op::Lt),
        RawToken::Lte => TokenKind::Op(Op::Lte),
        RawToken::Gte => TokenKind::Op(Op::Gte),
        RawToken::Eq => TokenKind::Op(Op::Eq),
        RawToken::Neq => TokenKind::Op(Op::Neq),
        RawToken::Compare => TokenKind::Op(Op::Compare),
        RawToken::Inc => TokenKind::Op(Op::Inc),
        RawToken::Dec => TokenKind::Op(Op::Dec),
        RawToken::Question => TokenKind::Op(Op::Question),
        RawToken::Shl => TokenKind::Op(Op::Shl),
        RawToken::Shr => TokenKind::Op(Op::Shr),
        RawToken::BitNot => TokenKind::Op(Op::BitNot),
        RawToken::BitAnd => TokenKind::Op(Op::BitAnd),
        RawToken::BitOr => TokenKind::Op(Op::BitOr),
        RawToken::BitXor => TokenKind::Op(Op::BitXor),
        RawToken::LogAnd => TokenKind::Op(Op::LogAnd),
        RawToken::LogOr => TokenKind::Op(Op::LogOr),
        RawToken::LogNot => TokenKind::Op(Op::LogNot),
        RawToken::LogNull => TokenKind::Op(Op::LogNull),
        RawToken::AddAssign => TokenKind::Op(Op::AddAssign),
        RawToken::SubAssign => TokenKind::Op(Op::SubAssign),
        RawToken::MulAssign => TokenKind::Op(Op::MulAssign),
        RawToken::QuoAssign => TokenKind::Op(Op::QuoAssign),
        RawToken::RemAssign => TokenKind::Op(Op::RemAssign),
        RawToken::PowAssign => TokenKind::Op(Op::PowAssign),
        RawToken::LogAndAssign => TokenKind::Op(Op::LogAndAssign),
        RawToken::LogOrAssign => TokenKind::Op(Op::LogOrAssign),
        RawToken::LogNullAssign => TokenKind::Op(Op::LogNullAssign),
        RawToken::BitAndAssign => TokenKind::Op(Op::BitAndAssign),
        RawToken::BitOrAssign => TokenKind::Op(Op::BitOrAssign),
        RawToken::BitXorAssign => TokenKind::Op(Op::BitXorAssign),
        RawToken::ShlAssign => TokenKind::Op(Op::ShlAssign),
        RawToken::ShrAssign => TokenKind::Op(Op::ShrAssign),

        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Semi => TokenKind::Semi,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Period => TokenKind::Period,
        RawToken::Arrow => TokenKind::Arrow,
        RawToken::Ellipsis => TokenKind::Ellipsis,
        RawToken::HashLBracket => TokenKind::HashLBracket,
        RawToken::Bind => TokenKind::Bind,
    };
    Ok(kind)
}

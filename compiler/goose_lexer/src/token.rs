//! Token types handed to the parser.

use std::sync::Arc;

use goose_ir::{Op, Span};
use num_bigint::BigInt;

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}

/// One decoded piece of a string literal.
#[derive(Clone, Debug, PartialEq)]
pub enum StrPiece {
    Text(String),
    /// `$name`
    Ident { name: Arc<str>, span: Span },
    /// `$#name`
    ThisProp { name: Arc<str>, span: Span },
    /// `${...}`: raw source of the embedded expression and the byte offset
    /// of its first character in the enclosing file.
    Expr { source: String, offset: u32 },
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Int(BigInt),
    Float(f64),
    Str(Vec<StrPiece>),
    Ident(Arc<str>),
    /// `#name`
    ThisProp(Arc<str>),
    /// `$name` in a match pattern.
    MatchBind(Arc<str>),
    Op(Op),

    // Punctuation
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Colon,
    Semi,
    Comma,
    Period,
    Arrow,
    Ellipsis,
    HashLBracket,
    Bind,

    // Keywords
    As,
    Async,
    Await,
    Break,
    Catch,
    Const,
    Continue,
    Do,
    Else,
    End,
    Export,
    False,
    Finally,
    Fn,
    For,
    Forever,
    Frozen,
    Generator,
    If,
    Import,
    In,
    Init,
    Is,
    Let,
    Match,
    Memo,
    Native,
    Not,
    Null,
    Operator,
    Repeat,
    Return,
    Show,
    Step,
    Struct,
    Symbol,
    Then,
    Throw,
    Times,
    To,
    True,
    Try,
    While,
    Yield,

    /// A character no token starts with.
    Error,
    Eof,
}

impl TokenKind {
    /// Short human-readable description used in "expected X, found Y" errors.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Int(n) => format!("integer {n}"),
            TokenKind::Float(f) => format!("float {f}"),
            TokenKind::Str(_) => "string".to_string(),
            TokenKind::Ident(name) => format!("identifier {name}"),
            TokenKind::ThisProp(name) => format!("#{name}"),
            TokenKind::MatchBind(name) => format!("${name}"),
            TokenKind::Op(op) => format!("'{op}'"),
            TokenKind::Error => "invalid character".to_string(),
            TokenKind::Eof => "end of file".to_string(),
            other => format!("'{}'", other.fixed_text().unwrap_or("?")),
        }
    }

    /// Source text of punctuation and keyword tokens.
    pub fn fixed_text(&self) -> Option<&'static str> {
        Some(match self {
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Colon => ":",
            TokenKind::Semi => ";",
            TokenKind::Comma => ",",
            TokenKind::Period => ".",
            TokenKind::Arrow => "->",
            TokenKind::Ellipsis => "...",
            TokenKind::HashLBracket => "#[",
            TokenKind::Bind => "::",
            TokenKind::As => "as",
            TokenKind::Async => "async",
            TokenKind::Await => "await",
            TokenKind::Break => "break",
            TokenKind::Catch => "catch",
            TokenKind::Const => "const",
            TokenKind::Continue => "continue",
            TokenKind::Do => "do",
            TokenKind::Else => "else",
            TokenKind::End => "end",
            TokenKind::Export => "export",
            TokenKind::False => "false",
            TokenKind::Finally => "finally",
            TokenKind::Fn => "fn",
            TokenKind::For => "for",
            TokenKind::Forever => "forever",
            TokenKind::Frozen => "frozen",
            TokenKind::Generator => "generator",
            TokenKind::If => "if",
            TokenKind::Import => "import",
            TokenKind::In => "in",
            TokenKind::Init => "init",
            TokenKind::Is => "is",
            TokenKind::Let => "let",
            TokenKind::Match => "match",
            TokenKind::Memo => "memo",
            TokenKind::Native => "native",
            TokenKind::Not => "not",
            TokenKind::Null => "null",
            TokenKind::Operator => "operator",
            TokenKind::Repeat => "repeat",
            TokenKind::Return => "return",
            TokenKind::Show => "show",
            TokenKind::Step => "step",
            TokenKind::Struct => "struct",
            TokenKind::Symbol => "symbol",
            TokenKind::Then => "then",
            TokenKind::Throw => "throw",
            TokenKind::Times => "times",
            TokenKind::To => "to",
            TokenKind::True => "true",
            TokenKind::Try => "try",
            TokenKind::While => "while",
            TokenKind::Yield => "yield",
            _ => return None,
        })
    }
}

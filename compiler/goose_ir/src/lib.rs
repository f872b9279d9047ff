//! Shared syntax definitions for goose.
//!
//! This crate sits below both the parser and the runtime:
//!
//! - [`Span`] and [`SourceFile`] for source positions
//! - [`Op`] for operator tokens and precedence
//! - [`ast`] for the syntax tree
//! - [`SourceParser`], the seam through which the runtime's module loader
//!   parses imported files without depending on a concrete parser

pub mod ast;
mod op;
mod source;
mod span;

pub use op::{Op, PIPELINE_PRECEDENCE};
pub use source::{LineCol, SourceFile};
pub use span::{Span, SpanError};

/// A syntax error with the location it was found at.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        ParseError {
            message: message.into(),
            span,
        }
    }
}

/// Parses goose source text into a module.
///
/// `name` is the canonical module name and is only used for diagnostics.
/// All syntax errors found are returned together, in source order.
pub trait SourceParser: Send + Sync {
    fn parse_module(&self, name: &str, source: &str) -> Result<ast::Module, Vec<ParseError>>;
}

/// Whether `name` is usable as a binding name (identifier shaped and not a
/// reserved word).
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
        && !KEYWORDS.contains(&name)
}

/// Reserved words of the language.
pub const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "catch", "const", "continue", "do", "else", "end", "export",
    "false", "finally", "fn", "for", "forever", "frozen", "generator", "if", "import", "in",
    "init", "is", "let", "match", "memo", "native", "not", "null", "operator", "repeat",
    "return", "show", "step", "struct", "symbol", "then", "throw", "times", "to", "true", "try",
    "while", "yield",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("math"));
        assert!(is_identifier("_private"));
        assert!(is_identifier("snake_case2"));
        assert!(!is_identifier("2fast"));
        assert!(!is_identifier("kebab-case"));
        assert!(!is_identifier("return"));
        assert!(!is_identifier(""));
    }
}

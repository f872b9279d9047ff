//! Tokenizer for goose source text.
//!
//! [`lex`] turns source into a flat [`Token`] list for the parser.
//! String literals come out pre-split into [`StrPiece`]s so the parser can
//! build interpolation nodes directly.

mod lexer;
mod string;
mod token;

pub use lexer::{lex, lex_at};
pub use token::{StrPiece, Token, TokenKind};

use goose_ir::{ParseError, Span};

/// A problem found while tokenizing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct LexError {
    pub message: String,
    pub span: Span,
}

impl LexError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        LexError {
            message: message.into(),
            span,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::new(err.message, err.span)
    }
}

#[cfg(test)]
mod tests;

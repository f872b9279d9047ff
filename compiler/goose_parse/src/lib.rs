//! Recursive descent parser for goose.
//!
//! Produces the boxed syntax tree defined in `goose_ir::ast`. The entry
//! points are [`parse_module`] for whole files and [`parse_expression`] for
//! single expressions. [`GooseParser`] adapts them to the
//! [`SourceParser`] seam the runtime's module loader uses.
//!
//! # Error recovery
//!
//! A syntax error inside a statement is recorded and the parser skips
//! ahead to the next token that can begin a statement, so one run reports
//! every independent error in the file.

mod cursor;
mod grammar;

pub use cursor::{Checkpoint, Cursor};

use goose_ir::{ast, Op, ParseError, SourceParser, Span};
use goose_lexer::{lex_at, Token, TokenKind};
use tracing::debug;

type PResult<T> = Result<T, ParseError>;

/// Parser state.
pub(crate) struct Parser {
    cursor: Cursor,
    errors: Vec<ParseError>,
    /// Number of enclosing statement blocks; zero at module level.
    block_depth: u32,
}

impl Parser {
    fn from_source(source: &str, base: u32) -> Self {
        let (tokens, lex_errors) = lex_at(source, base);
        Parser {
            cursor: Cursor::new(tokens),
            errors: lex_errors.into_iter().map(ParseError::from).collect(),
            block_depth: 0,
        }
    }

    #[inline]
    fn current_kind(&self) -> &TokenKind {
        self.cursor.current_kind()
    }

    #[inline]
    fn current_span(&self) -> Span {
        self.cursor.current_span()
    }

    #[inline]
    fn previous_span(&self) -> Span {
        self.cursor.previous_span()
    }

    #[inline]
    fn check(&self, kind: &TokenKind) -> bool {
        self.cursor.check(kind)
    }

    #[inline]
    fn check_op(&self, op: Op) -> bool {
        self.cursor.check_op(op)
    }

    #[inline]
    fn advance(&mut self) -> Token {
        self.cursor.advance()
    }

    #[inline]
    fn eat(&mut self, kind: &TokenKind) -> bool {
        self.cursor.eat(kind)
    }

    #[inline]
    fn eat_op(&mut self, op: Op) -> bool {
        self.cursor.eat_op(op)
    }

    fn is_at_end(&self) -> bool {
        self.cursor.is_at_end()
    }

    /// "expected X, found Y" at the current token.
    fn error_expected(&self, what: &str) -> ParseError {
        ParseError::new(
            format!("expected {what}, found {}", self.current_kind().describe()),
            self.current_span(),
        )
    }

    /// Consume a token of variant `kind` or fail, returning its span.
    fn expect(&mut self, kind: &TokenKind, what: &str) -> PResult<Span> {
        if self.check(kind) {
            Ok(self.advance().span)
        } else {
            Err(self.error_expected(what))
        }
    }

    fn expect_ident(&mut self, what: &str) -> PResult<ast::Ident> {
        if let TokenKind::Ident(name) = self.current_kind() {
            let ident = ast::Ident::new(name.clone(), self.current_span());
            self.advance();
            Ok(ident)
        } else {
            Err(self.error_expected(what))
        }
    }
}

/// Parse a complete module.
pub fn parse_module(source: &str) -> Result<ast::Module, Vec<ParseError>> {
    let mut parser = Parser::from_source(source, 0);
    let module = parser.parse_module_body();
    debug!(
        stmts = module.stmts.len(),
        errors = parser.errors.len(),
        "parsed module"
    );
    if parser.errors.is_empty() {
        Ok(module)
    } else {
        Err(parser.errors)
    }
}

/// Parse a single expression; trailing tokens are an error.
pub fn parse_expression(source: &str) -> Result<ast::Expr, Vec<ParseError>> {
    parse_expression_at(source, 0)
}

/// Parse an expression fragment that starts at byte `base` of its file.
pub(crate) fn parse_expression_at(source: &str, base: u32) -> Result<ast::Expr, Vec<ParseError>> {
    let mut parser = Parser::from_source(source, base);
    let result = parser.parse_expr().and_then(|expr| {
        if parser.is_at_end() {
            Ok(expr)
        } else {
            Err(parser.error_expected("end of expression"))
        }
    });
    match result {
        Ok(expr) if parser.errors.is_empty() => Ok(expr),
        Ok(_) => Err(parser.errors),
        Err(err) => {
            parser.errors.push(err);
            Err(parser.errors)
        }
    }
}

/// [`SourceParser`] backed by this crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct GooseParser;

impl SourceParser for GooseParser {
    fn parse_module(&self, name: &str, source: &str) -> Result<ast::Module, Vec<ParseError>> {
        debug!(module = name, "parsing");
        parse_module(source)
    }
}

#[cfg(test)]
mod tests;

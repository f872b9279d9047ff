//! Grammar productions.
//!
//! - `mod.rs`: module body, statement lists, block bodies, recovery
//! - `stmt.rs`: statements
//! - `expr.rs`: binary/unary/postfix expressions
//! - `primary.rs`: operands and literals
//! - `decl.rs`: functions, structs, operators, natives
//! - `module.rs`: import and export
//! - `pattern.rs`: match arms and patterns

mod decl;
mod expr;
mod module;
mod pattern;
mod primary;
mod stmt;

use goose_ir::{ast, Span};
use goose_lexer::TokenKind;

use crate::{Checkpoint, PResult, Parser};

impl Parser {
    pub(crate) fn parse_module_body(&mut self) -> ast::Module {
        let start = self.current_span();
        let stmts = self.parse_stmts_until(&[]);
        ast::Module {
            stmts,
            span: start.merge(self.current_span()),
        }
    }

    /// Parse statements until one of `terminators` (or end of input) is the
    /// current token. The terminator is left unconsumed.
    ///
    /// Errors are recorded and parsing resumes at the next statement start.
    pub(crate) fn parse_stmts_until(&mut self, terminators: &[TokenKind]) -> Vec<ast::Stmt> {
        let nested = !terminators.is_empty();
        if nested {
            self.block_depth += 1;
        }
        let mut stmts = Vec::new();
        loop {
            while self.eat(&TokenKind::Semi) {}
            if self.is_at_end() || terminators.iter().any(|t| self.check(t)) {
                if nested {
                    self.block_depth -= 1;
                }
                return stmts;
            }
            let before = self.cursor.checkpoint();
            match self.parse_stmt() {
                Ok(stmt) => stmts.push(stmt),
                Err(err) => {
                    self.errors.push(err);
                    self.synchronize(before, terminators);
                }
            }
        }
    }

    /// Skip to the next token that can start a statement, always making
    /// progress past the statement that failed.
    fn synchronize(&mut self, failed_at: Checkpoint, terminators: &[TokenKind]) {
        if self.cursor.is_at(failed_at) {
            self.advance();
        }
        while !self.is_at_end() {
            if terminators.iter().any(|t| self.check(t)) || starts_statement(self.current_kind()) {
                return;
            }
            self.advance();
        }
    }

    /// Body of a block construct: either `{ stmts }` or `stmts end`.
    /// Returns the statements and the span of the closing token.
    pub(crate) fn parse_body(&mut self) -> PResult<(Vec<ast::Stmt>, Span)> {
        if self.eat(&TokenKind::LBrace) {
            let stmts = self.parse_stmts_until(&[TokenKind::RBrace]);
            let close = self.expect(&TokenKind::RBrace, "'}'")?;
            Ok((stmts, close))
        } else {
            let stmts = self.parse_stmts_until(&[TokenKind::End]);
            let close = self.expect(&TokenKind::End, "'end'")?;
            Ok((stmts, close))
        }
    }

    /// Statements up to (not including) `end`, then the `end` itself.
    pub(crate) fn parse_end_block(&mut self) -> PResult<(Vec<ast::Stmt>, Span)> {
        let stmts = self.parse_stmts_until(&[TokenKind::End]);
        let close = self.expect(&TokenKind::End, "'end'")?;
        Ok((stmts, close))
    }
}

/// Tokens that begin a statement and never continue an expression.
fn starts_statement(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Let
            | TokenKind::Const
            | TokenKind::Symbol
            | TokenKind::Return
            | TokenKind::Break
            | TokenKind::Continue
            | TokenKind::Yield
            | TokenKind::If
            | TokenKind::For
            | TokenKind::Repeat
            | TokenKind::Struct
            | TokenKind::Operator
            | TokenKind::Try
            | TokenKind::Import
            | TokenKind::Export
            | TokenKind::Native
            | TokenKind::Fn
            | TokenKind::Memo
            | TokenKind::Generator
            | TokenKind::End
            | TokenKind::Semi
    )
}

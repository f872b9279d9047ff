//! Token cursor for navigating the token stream.

use goose_ir::{Op, Span};
use goose_lexer::{Token, TokenKind};

/// A saved cursor position for speculative parses.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// Position in a token list that always ends with [`TokenKind::Eof`].
pub struct Cursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl Cursor {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        let needs_eof = tokens.last().is_none_or(|t| t.kind != TokenKind::Eof);
        if needs_eof {
            let end = tokens.last().map_or(0, |t| t.span.end);
            tokens.push(Token::new(TokenKind::Eof, Span::point(end)));
        }
        Cursor { tokens, pos: 0 }
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.pos)
    }

    pub fn rewind(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.0.min(self.tokens.len() - 1);
    }

    /// Whether nothing was consumed since `checkpoint`.
    pub fn is_at(&self, checkpoint: Checkpoint) -> bool {
        self.pos == checkpoint.0
    }

    #[inline]
    pub fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    #[inline]
    pub fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    #[inline]
    pub fn current_span(&self) -> Span {
        self.current().span
    }

    /// Span of the last consumed token, for closing a node's span.
    pub fn previous_span(&self) -> Span {
        self.pos
            .checked_sub(1)
            .map_or(Span::DUMMY, |prev| self.tokens[prev].span)
    }

    /// Kind of the token `n` places ahead; `Eof` past the end.
    pub fn peek_kind_at(&self, n: usize) -> &TokenKind {
        let index = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[index].kind
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        *self.current_kind() == TokenKind::Eof
    }

    /// Variant comparison: `Ident("a")` checks equal to `Ident("b")`.
    #[inline]
    pub fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    #[inline]
    pub fn check_op(&self, op: Op) -> bool {
        matches!(self.current_kind(), TokenKind::Op(current) if *current == op)
    }

    /// Consume and return the current token. `Eof` is never consumed.
    pub fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    pub fn eat(&mut self, kind: &TokenKind) -> bool {
        let hit = self.check(kind);
        if hit {
            self.advance();
        }
        hit
    }

    pub fn eat_op(&mut self, op: Op) -> bool {
        let hit = self.check_op(op);
        if hit {
            self.advance();
        }
        hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goose_lexer::lex_at;
    use pretty_assertions::assert_eq;

    fn cursor(source: &str) -> Cursor {
        let (tokens, errors) = lex_at(source, 0);
        assert!(errors.is_empty());
        Cursor::new(tokens)
    }

    #[test]
    fn eof_is_sticky() {
        let mut c = cursor("x");
        c.advance();
        assert!(c.is_at_end());
        assert_eq!(c.advance().kind, TokenKind::Eof);
        assert!(c.is_at_end());
        assert_eq!(*c.peek_kind_at(5), TokenKind::Eof);
    }

    #[test]
    fn rewind_restores_a_checkpoint() {
        let mut c = cursor("a + b");
        let start = c.checkpoint();
        c.advance();
        assert!(c.eat_op(Op::Add));
        assert!(!c.is_at(start));
        c.rewind(start);
        assert!(c.is_at(start));
        assert!(c.check(&TokenKind::Ident("other".into())));
    }
}

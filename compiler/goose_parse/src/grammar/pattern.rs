//! `match` expressions and their patterns.

use goose_ir::ast::{Expr, ExprKind, Ident, MatchArm, Pattern};
use goose_ir::PIPELINE_PRECEDENCE;
use goose_lexer::TokenKind;

use crate::{PResult, Parser};

impl Parser {
    /// `match subject (pattern -> expr)* [else -> expr] end`
    pub(crate) fn parse_match(&mut self) -> PResult<Expr> {
        let start = self.expect(&TokenKind::Match, "'match'")?;
        let subject = self.parse_expr()?;

        let mut arms = Vec::new();
        while !self.check(&TokenKind::End) && !self.is_at_end() {
            arms.push(self.parse_match_arm()?);
            self.eat(&TokenKind::Comma);
        }
        let end = self.expect(&TokenKind::End, "'end' after match arms")?;

        Ok(Expr::new(
            ExprKind::Match {
                subject: Box::new(subject),
                arms,
            },
            start.merge(end),
        ))
    }

    fn parse_match_arm(&mut self) -> PResult<MatchArm> {
        let start = self.current_span();
        let pattern = if self.eat(&TokenKind::Else) {
            None
        } else {
            Some(self.parse_pattern()?)
        };
        self.expect(&TokenKind::Arrow, "'->' after pattern")?;
        let body = self.parse_expr()?;
        Ok(MatchArm {
            pattern,
            span: start.merge(body.span),
            body,
        })
    }

    fn parse_pattern(&mut self) -> PResult<Pattern> {
        let start = self.current_span();
        match self.current_kind().clone() {
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_pattern()?;
                self.expect(&TokenKind::RParen, "')'")?;
                Ok(Pattern::Paren(Box::new(inner)))
            }
            TokenKind::LBracket => {
                self.advance();
                let mut items = Vec::new();
                while !self.check(&TokenKind::RBracket) && !self.is_at_end() {
                    items.push(self.parse_pattern()?);
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
                let end = self.expect(&TokenKind::RBracket, "']'")?;
                Ok(Pattern::Tuple(items, start.merge(end)))
            }
            TokenKind::LBrace => {
                self.advance();
                let mut fields = Vec::new();
                while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
                    let key = self.parse_composite_key()?;
                    self.expect(&TokenKind::Colon, "':' after key")?;
                    fields.push((key, self.parse_pattern()?));
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
                let end = self.expect(&TokenKind::RBrace, "'}'")?;
                Ok(Pattern::Composite(fields, start.merge(end)))
            }
            TokenKind::MatchBind(name) => {
                self.advance();
                Ok(Pattern::Binding(Ident::new(name, start)))
            }
            _ => Ok(Pattern::Value(self.parse_binary(PIPELINE_PRECEDENCE + 1)?)),
        }
    }
}

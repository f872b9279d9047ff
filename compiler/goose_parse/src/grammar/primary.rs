//! Operands: literals, names, bracketed forms and keyword-led expressions.

use std::sync::Arc;

use goose_ir::ast::{CompositeField, CompositeKey, Expr, ExprKind, Ident, StringPart};
use goose_ir::{ParseError, Span};
use goose_lexer::{StrPiece, TokenKind};

use crate::{parse_expression_at, PResult, Parser};

impl Parser {
    pub(crate) fn parse_operand(&mut self) -> PResult<Expr> {
        let start = self.current_span();
        let kind = match self.current_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                ExprKind::Ident(Ident::new(name, start))
            }
            TokenKind::ThisProp(name) => {
                self.advance();
                ExprKind::ThisProp(Ident::new(name, start))
            }
            TokenKind::Int(value) => {
                self.advance();
                ExprKind::Int(value)
            }
            TokenKind::Float(value) => {
                self.advance();
                ExprKind::Float(value)
            }
            TokenKind::Null => {
                self.advance();
                ExprKind::Null
            }
            TokenKind::True => {
                self.advance();
                ExprKind::Bool(true)
            }
            TokenKind::False => {
                self.advance();
                ExprKind::Bool(false)
            }
            TokenKind::Str(pieces) => {
                self.advance();
                ExprKind::Str(self.convert_string(pieces)?)
            }
            TokenKind::LBracket => self.parse_array()?,
            TokenKind::HashLBracket => {
                self.advance();
                let key = self.parse_expr()?;
                self.expect(&TokenKind::RBracket, "']'")?;
                ExprKind::ThisIndex(Box::new(key))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::RParen, "')'")?;
                ExprKind::Paren(Box::new(inner))
            }
            TokenKind::LBrace => self.parse_composite()?,
            TokenKind::Fn | TokenKind::Memo | TokenKind::Generator | TokenKind::Async => {
                return self.parse_func_expr();
            }
            TokenKind::Throw => {
                self.advance();
                ExprKind::Throw(Box::new(self.parse_expr()?))
            }
            TokenKind::Frozen => {
                self.advance();
                ExprKind::Frozen(Box::new(self.parse_expr()?))
            }
            TokenKind::If => {
                self.advance();
                let cond = self.parse_expr()?;
                return self.parse_if_expr_tail(start, cond);
            }
            TokenKind::Do => {
                self.advance();
                let (stmts, _) = self.parse_end_block()?;
                ExprKind::Do(stmts)
            }
            TokenKind::Match => return self.parse_match(),
            _ => return Err(self.error_expected("expression")),
        };
        Ok(Expr::new(kind, start.merge(self.previous_span())))
    }

    /// Turn lexed string pieces into syntax, parsing each `${...}` as an
    /// expression positioned inside the file.
    fn convert_string(&mut self, pieces: Vec<StrPiece>) -> PResult<Vec<StringPart>> {
        let mut parts = Vec::with_capacity(pieces.len());
        for piece in pieces {
            parts.push(match piece {
                StrPiece::Text(text) => StringPart::Text(text.into()),
                StrPiece::Ident { name, span } => StringPart::Ident(Ident::new(name, span)),
                StrPiece::ThisProp { name, span } => StringPart::ThisProp(Ident::new(name, span)),
                StrPiece::Expr { source, offset } => match parse_expression_at(&source, offset) {
                    Ok(expr) => StringPart::Expr(expr),
                    Err(mut errors) => {
                        let last = errors.pop().unwrap_or_else(|| {
                            ParseError::new("invalid interpolation", Span::point(offset))
                        });
                        self.errors.extend(errors);
                        return Err(last);
                    }
                },
            });
        }
        Ok(parts)
    }

    /// Plain string literal with no interpolation, as used for import
    /// specifiers and composite keys.
    pub(crate) fn expect_plain_string(&mut self, what: &str) -> PResult<(Arc<str>, Span)> {
        let span = self.current_span();
        let TokenKind::Str(pieces) = self.current_kind() else {
            return Err(self.error_expected(what));
        };
        let mut text = String::new();
        for piece in pieces {
            match piece {
                StrPiece::Text(t) => text.push_str(t),
                _ => {
                    return Err(ParseError::new(
                        format!("{what} cannot contain interpolation"),
                        span,
                    ))
                }
            }
        }
        self.advance();
        Ok((text.into(), span))
    }

    /// `[a, b, ...]` or `[value; count]`.
    fn parse_array(&mut self) -> PResult<ExprKind> {
        self.expect(&TokenKind::LBracket, "'['")?;
        if self.eat(&TokenKind::RBracket) {
            return Ok(ExprKind::Array(Vec::new()));
        }

        let first = self.parse_expr()?;
        if self.eat(&TokenKind::Semi) {
            let count = self.parse_expr()?;
            self.expect(&TokenKind::RBracket, "']'")?;
            return Ok(ExprKind::ArrayInit {
                value: Box::new(first),
                count: Box::new(count),
            });
        }

        let mut elements = vec![first];
        while self.eat(&TokenKind::Comma) {
            if self.check(&TokenKind::RBracket) {
                break;
            }
            elements.push(self.parse_expr()?);
        }
        self.expect(&TokenKind::RBracket, "']' or ','")?;
        Ok(ExprKind::Array(elements))
    }

    fn parse_composite(&mut self) -> PResult<ExprKind> {
        self.expect(&TokenKind::LBrace, "'{'")?;
        let mut fields = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let key = self.parse_composite_key()?;
            self.expect(&TokenKind::Colon, "':' after key")?;
            let value = self.parse_expr()?;
            fields.push(CompositeField { key, value });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace, "'}'")?;
        Ok(ExprKind::Composite(fields))
    }

    /// Key of a composite literal or composite pattern.
    pub(crate) fn parse_composite_key(&mut self) -> PResult<CompositeKey> {
        match self.current_kind().clone() {
            TokenKind::LBracket => {
                self.advance();
                let key = self.parse_expr()?;
                self.expect(&TokenKind::RBracket, "']'")?;
                Ok(CompositeKey::Computed(key))
            }
            TokenKind::Str(_) => {
                let (text, span) = self.expect_plain_string("key")?;
                Ok(CompositeKey::Str(text, span))
            }
            TokenKind::Int(value) => {
                let span = self.advance().span;
                Ok(CompositeKey::Int(value, span))
            }
            _ => Ok(CompositeKey::Ident(self.expect_member_name()?)),
        }
    }
}

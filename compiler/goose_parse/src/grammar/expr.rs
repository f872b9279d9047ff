//! Binary, unary and postfix expressions.
//!
//! Binary operators use precedence climbing over [`Op::binary_precedence`].
//! Pipelines (`->`) bind loosest, ranges (`a to b step c`) sit with the
//! comparisons.

use goose_ir::ast::{Expr, ExprKind, Ident};
use goose_ir::{Op, ParseError, PIPELINE_PRECEDENCE};
use goose_lexer::TokenKind;
use goose_stack::ensure_sufficient_stack;

use crate::{PResult, Parser};

/// Precedence of `to`; its bounds are parsed one level tighter.
const RANGE_PRECEDENCE: u8 = 5;

/// What the current token does when it appears between two operands.
enum Infix {
    Binary(Op),
    Pipeline,
    Range,
}

impl Parser {
    pub(crate) fn parse_expr(&mut self) -> PResult<Expr> {
        self.parse_binary(PIPELINE_PRECEDENCE)
    }

    pub(crate) fn parse_binary(&mut self, min_prec: u8) -> PResult<Expr> {
        ensure_sufficient_stack(|| self.parse_binary_inner(min_prec))
    }

    fn parse_binary_inner(&mut self, min_prec: u8) -> PResult<Expr> {
        let mut left = self.parse_unary()?;

        while let Some((infix, prec)) = self.current_infix() {
            if prec < min_prec {
                break;
            }
            self.advance();

            left = match infix {
                Infix::Pipeline => {
                    let right = self.parse_binary(prec + 1)?;
                    let span = left.span.merge(right.span);
                    Expr::new(
                        ExprKind::Pipeline {
                            left: Box::new(left),
                            right: Box::new(right),
                        },
                        span,
                    )
                }
                Infix::Range => {
                    let stop = self.parse_binary(RANGE_PRECEDENCE + 1)?;
                    let step = if self.eat(&TokenKind::Step) {
                        Some(Box::new(self.parse_binary(RANGE_PRECEDENCE + 1)?))
                    } else {
                        None
                    };
                    let span = left.span.merge(self.previous_span());
                    Expr::new(
                        ExprKind::Range {
                            start: Box::new(left),
                            stop: Box::new(stop),
                            step,
                        },
                        span,
                    )
                }
                Infix::Binary(op) => {
                    if op == Op::IsNot {
                        // `is` was consumed above; `not` follows.
                        self.advance();
                    }
                    let next_min = if op.is_right_associative() { prec } else { prec + 1 };
                    let right = self.parse_binary(next_min)?;
                    let span = left.span.merge(right.span);
                    Expr::new(
                        ExprKind::Binary {
                            op,
                            left: Box::new(left),
                            right: Box::new(right),
                        },
                        span,
                    )
                }
            };
        }

        Ok(left)
    }

    fn current_infix(&self) -> Option<(Infix, u8)> {
        match self.current_kind() {
            TokenKind::Arrow => Some((Infix::Pipeline, PIPELINE_PRECEDENCE)),
            TokenKind::To => Some((Infix::Range, RANGE_PRECEDENCE)),
            TokenKind::Is => {
                let op = if matches!(self.cursor.peek_kind_at(1), TokenKind::Not) {
                    Op::IsNot
                } else {
                    Op::Is
                };
                op.binary_precedence().map(|p| (Infix::Binary(op), p))
            }
            TokenKind::Op(op) => op.binary_precedence().map(|p| (Infix::Binary(*op), p)),
            _ => None,
        }
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        let start = self.current_span();
        let kind = match *self.current_kind() {
            TokenKind::Op(op @ (Op::Add | Op::Sub | Op::LogNot | Op::BitNot)) => {
                self.advance();
                let operand = self.parse_unary()?;
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                }
            }
            TokenKind::Ellipsis => {
                self.advance();
                ExprKind::Spread(Box::new(self.parse_unary()?))
            }
            TokenKind::Await => {
                self.advance();
                ExprKind::Await(Box::new(self.parse_unary()?))
            }
            _ => {
                let operand = self.parse_operand()?;
                return self.parse_postfix(operand);
            }
        };
        Ok(Expr::new(kind, start.merge(self.previous_span())))
    }

    /// Calls, indexing, slicing, member access, `::` binding and the `?`
    /// debug suffix, applied left to right.
    fn parse_postfix(&mut self, mut expr: Expr) -> PResult<Expr> {
        loop {
            let kind = match self.current_kind() {
                TokenKind::LParen => {
                    let args = self.parse_call_args()?;
                    ExprKind::Call {
                        callee: Box::new(expr),
                        args,
                    }
                }
                TokenKind::LBracket => self.parse_index_or_slice(expr)?,
                TokenKind::Period => {
                    self.advance();
                    let name = self.expect_member_name()?;
                    ExprKind::Selector {
                        object: Box::new(expr),
                        name,
                    }
                }
                TokenKind::Bind => {
                    self.advance();
                    let func = self.parse_bind_target()?;
                    ExprKind::Bind {
                        object: Box::new(expr),
                        func: Box::new(func),
                    }
                }
                TokenKind::Op(Op::Question) => {
                    self.advance();
                    ExprKind::Debug(Box::new(expr))
                }
                _ => return Ok(expr),
            };
            let span = kind_start(&kind).merge(self.previous_span());
            expr = Expr::new(kind, span);
        }
    }

    fn parse_call_args(&mut self) -> PResult<Vec<Expr>> {
        self.expect(&TokenKind::LParen, "'('")?;
        let mut args = Vec::new();
        while !self.check(&TokenKind::RParen) && !self.is_at_end() {
            args.push(self.parse_expr()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen, "')' after arguments")?;
        Ok(args)
    }

    /// `[i]`, `[a:b]`, `[a:]` or `[:b]`.
    fn parse_index_or_slice(&mut self, object: Expr) -> PResult<ExprKind> {
        let open = self.expect(&TokenKind::LBracket, "'['")?;
        let low = if self.check(&TokenKind::Colon) {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };

        if !self.eat(&TokenKind::Colon) {
            self.expect(&TokenKind::RBracket, "']'")?;
            return match low {
                Some(index) => Ok(ExprKind::Index {
                    object: Box::new(object),
                    index,
                }),
                None => Err(ParseError::new("expected index", open)),
            };
        }

        let high = if self.check(&TokenKind::RBracket) {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };
        let close = self.expect(&TokenKind::RBracket, "']'")?;
        if low.is_none() && high.is_none() {
            return Err(ParseError::new(
                "slice needs a start or an end",
                open.merge(close),
            ));
        }
        Ok(ExprKind::Slice {
            object: Box::new(object),
            low,
            high,
        })
    }

    /// Right side of `obj::target`: a parenthesized expression or a name
    /// with an optional `.member` chain.
    fn parse_bind_target(&mut self) -> PResult<Expr> {
        if self.check(&TokenKind::LParen) {
            return self.parse_operand();
        }
        let mut target = match self.current_kind() {
            TokenKind::Ident(_) => {
                let ident = self.expect_ident("function name")?;
                Expr::new(ExprKind::Ident(ident.clone()), ident.span)
            }
            TokenKind::ThisProp(_) => self.parse_operand()?,
            _ => return Err(self.error_expected("function after '::'")),
        };
        while self.eat(&TokenKind::Period) {
            let name = self.expect_member_name()?;
            let span = target.span.merge(name.span);
            target = Expr::new(
                ExprKind::Selector {
                    object: Box::new(target),
                    name,
                },
                span,
            );
        }
        Ok(target)
    }

    /// Property name after `.`; keywords are allowed (`gen.next`, `x.end`).
    pub(crate) fn expect_member_name(&mut self) -> PResult<Ident> {
        let span = self.current_span();
        let name = match self.current_kind() {
            TokenKind::Ident(name) => name.clone(),
            kind => match kind.fixed_text() {
                Some(text) if text.starts_with(|c: char| c.is_ascii_alphabetic()) => text.into(),
                _ => return Err(self.error_expected("property name")),
            },
        };
        self.advance();
        Ok(Ident::new(name, span))
    }

    /// Finish `if cond then a [else b]` once `cond` has been parsed.
    pub(crate) fn parse_if_expr_tail(
        &mut self,
        start: goose_ir::Span,
        cond: Expr,
    ) -> PResult<Expr> {
        self.expect(&TokenKind::Then, "'then'")?;
        let then = self.parse_expr()?;
        let else_ = if self.eat(&TokenKind::Else) {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        Ok(Expr::new(
            ExprKind::If {
                cond: Box::new(cond),
                then: Box::new(then),
                else_,
            },
            start.merge(self.previous_span()),
        ))
    }
}

/// Start of the span of a postfix node: that of its leftmost operand.
fn kind_start(kind: &ExprKind) -> goose_ir::Span {
    match kind {
        ExprKind::Call { callee: inner, .. }
        | ExprKind::Index { object: inner, .. }
        | ExprKind::Slice { object: inner, .. }
        | ExprKind::Selector { object: inner, .. }
        | ExprKind::Bind { object: inner, .. }
        | ExprKind::Debug(inner) => inner.span,
        _ => goose_ir::Span::DUMMY,
    }
}

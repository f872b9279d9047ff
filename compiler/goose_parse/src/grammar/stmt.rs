//! Statement parsing.

use goose_ir::ast::{CatchClause, Expr, ExprKind, Stmt, StmtKind};
use goose_ir::{Op, ParseError};
use goose_lexer::TokenKind;
use goose_stack::ensure_sufficient_stack;

use crate::{PResult, Parser};

impl Parser {
    pub(crate) fn parse_stmt(&mut self) -> PResult<Stmt> {
        ensure_sufficient_stack(|| self.parse_stmt_inner())
    }

    fn parse_stmt_inner(&mut self) -> PResult<Stmt> {
        let start = self.current_span();
        let kind = match self.current_kind() {
            TokenKind::Let => self.parse_let()?,
            TokenKind::Const => self.parse_const()?,
            TokenKind::Symbol => {
                self.advance();
                StmtKind::Symbol {
                    name: self.expect_ident("symbol name")?,
                }
            }
            TokenKind::Return => {
                self.advance();
                if return_has_value(self.current_kind()) {
                    StmtKind::Return(Some(self.parse_expr()?))
                } else {
                    StmtKind::Return(None)
                }
            }
            TokenKind::Break => {
                self.advance();
                StmtKind::Break
            }
            TokenKind::Continue => {
                self.advance();
                StmtKind::Continue
            }
            TokenKind::Yield => {
                self.advance();
                StmtKind::Yield(self.parse_expr()?)
            }
            TokenKind::If => return self.parse_if_stmt(),
            TokenKind::For => self.parse_for()?,
            TokenKind::Repeat => self.parse_repeat()?,
            TokenKind::Try => self.parse_try()?,
            TokenKind::Struct => StmtKind::Struct(self.parse_struct_decl()?),
            TokenKind::Operator => StmtKind::Operator(self.parse_operator_decl(false)?),
            TokenKind::Async if matches!(self.cursor.peek_kind_at(1), TokenKind::Operator) => {
                self.advance();
                StmtKind::Operator(self.parse_operator_decl(true)?)
            }
            TokenKind::Import => self.parse_import()?,
            TokenKind::Export => self.parse_export()?,
            TokenKind::Native => StmtKind::Native(self.parse_native_decl()?),
            TokenKind::Fn | TokenKind::Memo | TokenKind::Generator | TokenKind::Async => {
                if let Some(decl) = self.try_parse_named_func()? {
                    StmtKind::Expr(decl)
                } else {
                    self.parse_simple_stmt()?
                }
            }
            _ => self.parse_simple_stmt()?,
        };
        Ok(Stmt {
            kind,
            span: start.merge(self.previous_span()),
        })
    }

    /// Named function and generator declarations are statements on their
    /// own: `fn f() ... end` followed by `(x)` on the next line must not
    /// parse as a call. Anonymous literals fall back to expression parsing.
    fn try_parse_named_func(&mut self) -> PResult<Option<Expr>> {
        let checkpoint = self.cursor.checkpoint();
        let errors = self.errors.len();
        let func = self.parse_func_expr()?;
        if matches!(&func.kind, ExprKind::Func(lit) if lit.name.is_some()) {
            Ok(Some(func))
        } else {
            self.cursor.rewind(checkpoint);
            self.errors.truncate(errors);
            Ok(None)
        }
    }

    /// Expression statement, assignment, or `x++`/`x--`.
    fn parse_simple_stmt(&mut self) -> PResult<StmtKind> {
        let target = self.parse_expr()?;
        match *self.current_kind() {
            TokenKind::Op(op) if op.is_assignment() => {
                let op_span = self.advance().span;
                check_assign_target(&target)?;
                let value = self.parse_expr()?;
                Ok(StmtKind::Assign {
                    target,
                    op,
                    op_span,
                    value,
                })
            }
            TokenKind::Op(op @ (Op::Inc | Op::Dec)) => {
                self.advance();
                check_assign_target(&target)?;
                Ok(StmtKind::IncDec { target, op })
            }
            _ => Ok(StmtKind::Expr(target)),
        }
    }

    fn parse_let(&mut self) -> PResult<StmtKind> {
        self.advance();
        let name = self.expect_ident("variable name")?;
        let value = if self.eat_op(Op::Assign) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(StmtKind::Let { name, value })
    }

    fn parse_const(&mut self) -> PResult<StmtKind> {
        self.advance();
        let name = self.expect_ident("constant name")?;
        if !self.eat_op(Op::Assign) {
            return Err(ParseError::new(
                "const declaration must be followed by an assignment",
                self.current_span(),
            ));
        }
        let value = self.parse_expr()?;
        Ok(StmtKind::Const { name, value })
    }

    /// `if cond body [else if ... | else body] end`, `if cond { } else { }`,
    /// or (as a statement) the expression form `if c then a else b`.
    pub(crate) fn parse_if_stmt(&mut self) -> PResult<Stmt> {
        let start = self.expect(&TokenKind::If, "'if'")?;
        let cond = self.parse_expr()?;

        if self.check(&TokenKind::Then) {
            let expr = self.parse_if_expr_tail(start, cond)?;
            let span = expr.span;
            return Ok(Stmt {
                kind: StmtKind::Expr(expr),
                span,
            });
        }

        let braced = self.eat(&TokenKind::LBrace);
        let body = if braced {
            let stmts = self.parse_stmts_until(&[TokenKind::RBrace]);
            self.expect(&TokenKind::RBrace, "'}'")?;
            stmts
        } else {
            self.parse_stmts_until(&[TokenKind::End, TokenKind::Else])
        };

        let else_body = if self.eat(&TokenKind::Else) {
            if self.check(&TokenKind::If) {
                Some(vec![self.parse_if_stmt()?])
            } else {
                let (stmts, _) = self.parse_body()?;
                Some(stmts)
            }
        } else {
            if !braced {
                self.expect(&TokenKind::End, "'end' or 'else'")?;
            }
            None
        };

        Ok(Stmt {
            kind: StmtKind::If {
                cond,
                body,
                else_body,
            },
            span: start.merge(self.previous_span()),
        })
    }

    fn parse_for(&mut self) -> PResult<StmtKind> {
        self.advance();
        let is_await = self.eat(&TokenKind::Await);
        let binding = self.expect_ident("loop variable")?;
        self.expect(&TokenKind::In, "'in'")?;
        let iterable = self.parse_expr()?;
        let (body, _) = self.parse_body()?;
        Ok(StmtKind::For {
            binding,
            iterable,
            body,
            is_await,
        })
    }

    fn parse_repeat(&mut self) -> PResult<StmtKind> {
        self.advance();
        if self.eat(&TokenKind::While) {
            let cond = self.parse_expr()?;
            let (body, _) = self.parse_body()?;
            Ok(StmtKind::RepeatWhile { cond, body })
        } else if self.eat(&TokenKind::Forever) {
            let (body, _) = self.parse_body()?;
            Ok(StmtKind::RepeatForever { body })
        } else {
            let count = self.parse_expr()?;
            self.expect(&TokenKind::Times, "'times'")?;
            let (body, _) = self.parse_body()?;
            Ok(StmtKind::RepeatCount { count, body })
        }
    }

    fn parse_try(&mut self) -> PResult<StmtKind> {
        let start = self.advance().span;
        let body = self.parse_stmts_until(&[TokenKind::Catch, TokenKind::Finally, TokenKind::End]);

        let catch = if self.eat(&TokenKind::Catch) {
            let binding = if self.eat(&TokenKind::As) {
                Some(self.expect_ident("name after 'as'")?)
            } else {
                None
            };
            let body = self.parse_stmts_until(&[TokenKind::Finally, TokenKind::End]);
            Some(CatchClause { binding, body })
        } else {
            None
        };

        let finally = if self.eat(&TokenKind::Finally) {
            Some(self.parse_stmts_until(&[TokenKind::End]))
        } else {
            None
        };

        if catch.is_none() && finally.is_none() {
            return Err(ParseError::new(
                "expected catch or finally",
                start.merge(self.current_span()),
            ));
        }
        self.expect(&TokenKind::End, "'end'")?;
        Ok(StmtKind::Try {
            body,
            catch,
            finally,
        })
    }
}

/// Whether the token after `return` begins its value.
fn return_has_value(kind: &TokenKind) -> bool {
    !matches!(
        kind,
        TokenKind::End
            | TokenKind::RBrace
            | TokenKind::Semi
            | TokenKind::Eof
            | TokenKind::Else
            | TokenKind::Catch
            | TokenKind::Finally
            | TokenKind::Let
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
    )
}

fn check_assign_target(target: &Expr) -> PResult<()> {
    match &target.kind {
        ExprKind::Ident(_)
        | ExprKind::ThisProp(_)
        | ExprKind::ThisIndex(_)
        | ExprKind::Selector { .. }
        | ExprKind::Index { .. } => Ok(()),
        ExprKind::Paren(inner) => check_assign_target(inner),
        _ => Err(ParseError::new("cannot assign to this expression", target.span)),
    }
}

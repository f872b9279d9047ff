//! Function literals, struct and operator declarations, native bindings.

use std::sync::Arc;

use goose_ir::ast::{
    Expr, ExprKind, FuncBody, FuncKind, FuncLit, Ident, NativeDecl, OperatorDecl, Param,
    StructDecl, StructField,
};
use goose_ir::{Op, ParseError};
use goose_lexer::TokenKind;

use crate::{PResult, Parser};

impl Parser {
    /// `[async] [memo] fn [Recv.]name?(params) (-> expr | body end)` or
    /// `[async] generator [Recv.]name?(params) body end`.
    pub(crate) fn parse_func_expr(&mut self) -> PResult<Expr> {
        let start = self.current_span();
        let is_async = self.eat(&TokenKind::Async);
        let memo = self.eat(&TokenKind::Memo);

        let kind = if self.eat(&TokenKind::Fn) {
            FuncKind::Function
        } else if self.eat(&TokenKind::Generator) {
            FuncKind::Generator
        } else {
            return Err(self.error_expected("'fn' or 'generator'"));
        };
        if memo && kind == FuncKind::Generator {
            return Err(ParseError::new(
                "generators cannot be memoized",
                start.merge(self.previous_span()),
            ));
        }

        let (receiver, name) = self.parse_func_name()?;
        let params = self.parse_params()?;
        let body = if kind == FuncKind::Function && self.eat(&TokenKind::Arrow) {
            FuncBody::Arrow(self.parse_expr()?)
        } else {
            FuncBody::Block(self.parse_end_block()?.0)
        };

        let span = start.merge(self.previous_span());
        let lit = FuncLit {
            kind,
            name,
            receiver,
            params,
            body,
            memo,
            is_async,
            span,
        };
        Ok(Expr::new(ExprKind::Func(Arc::new(lit)), span))
    }

    /// Optional `name` or `Recv.name`.
    fn parse_func_name(&mut self) -> PResult<(Option<Ident>, Option<Ident>)> {
        if !matches!(self.current_kind(), TokenKind::Ident(_)) {
            return Ok((None, None));
        }
        let first = self.expect_ident("function name")?;
        if self.eat(&TokenKind::Period) {
            let name = self.expect_member_name()?;
            Ok((Some(first), Some(name)))
        } else {
            Ok((None, Some(first)))
        }
    }

    /// `(a, b = default, ...rest)`
    pub(crate) fn parse_params(&mut self) -> PResult<Vec<Param>> {
        self.expect(&TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        while !self.check(&TokenKind::RParen) && !self.is_at_end() {
            let rest = self.eat(&TokenKind::Ellipsis);
            let name = self.expect_ident("parameter name")?;
            let default = if self.eat_op(Op::Assign) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            params.push(Param {
                name,
                default,
                rest,
            });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen, "')' after parameters")?;
        Ok(params)
    }

    /// `struct Name(field [= default], ...) [init body end]`.
    ///
    /// At module level a struct without `init` may be closed with `end`.
    pub(crate) fn parse_struct_decl(&mut self) -> PResult<Arc<StructDecl>> {
        let start = self.expect(&TokenKind::Struct, "'struct'")?;
        let name = self.expect_ident("struct name")?;

        self.expect(&TokenKind::LParen, "'(' after struct name")?;
        let mut fields = Vec::new();
        while !self.check(&TokenKind::RParen) && !self.is_at_end() {
            let name = self.expect_ident("field name")?;
            let default = if self.eat_op(Op::Assign) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            fields.push(StructField { name, default });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen, "')' after fields")?;

        let init = if self.eat(&TokenKind::Init) {
            Some(self.parse_end_block()?.0)
        } else {
            if self.block_depth == 0 {
                self.eat(&TokenKind::End);
            }
            None
        };

        Ok(Arc::new(StructDecl {
            name,
            fields,
            init,
            span: start.merge(self.previous_span()),
        }))
    }

    /// `operator Recv OP(params) (-> expr | body end)`; a leading `async`
    /// has already been consumed when `is_async` is set.
    pub(crate) fn parse_operator_decl(&mut self, is_async: bool) -> PResult<Arc<OperatorDecl>> {
        let start = self.expect(&TokenKind::Operator, "'operator'")?;
        let receiver = self.expect_ident("receiver type")?;
        let op = self.expect_overloadable_op()?;
        let params = self.parse_params()?;
        let body = if self.eat(&TokenKind::Arrow) {
            FuncBody::Arrow(self.parse_expr()?)
        } else {
            FuncBody::Block(self.parse_end_block()?.0)
        };
        let span = start.merge(self.previous_span());
        let func = Arc::new(FuncLit {
            kind: FuncKind::Function,
            name: None,
            receiver: Some(receiver.clone()),
            params,
            body,
            memo: false,
            is_async,
            span,
        });
        Ok(Arc::new(OperatorDecl {
            receiver,
            op,
            func,
            span,
        }))
    }

    fn expect_overloadable_op(&mut self) -> PResult<Op> {
        match *self.current_kind() {
            TokenKind::Op(op) if op.is_overloadable() => {
                self.advance();
                Ok(op)
            }
            _ => Err(self.error_expected("overloadable operator")),
        }
    }

    /// Declarations whose implementation the host supplies.
    pub(crate) fn parse_native_decl(&mut self) -> PResult<NativeDecl> {
        self.expect(&TokenKind::Native, "'native'")?;
        match self.current_kind() {
            TokenKind::Const => {
                self.advance();
                Ok(NativeDecl::Const(self.expect_ident("constant name")?))
            }
            TokenKind::Struct => {
                self.advance();
                let name = self.expect_ident("struct name")?;
                self.expect(&TokenKind::LParen, "'('")?;
                let mut fields = Vec::new();
                while !self.check(&TokenKind::RParen) && !self.is_at_end() {
                    fields.push(self.expect_ident("field name")?);
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(&TokenKind::RParen, "')'")?;
                Ok(NativeDecl::Struct { name, fields })
            }
            TokenKind::Operator => self.parse_native_operator(false),
            TokenKind::Async if matches!(self.cursor.peek_kind_at(1), TokenKind::Operator) => {
                self.advance();
                self.parse_native_operator(true)
            }
            _ => {
                let is_async = self.eat(&TokenKind::Async);
                let memo = self.eat(&TokenKind::Memo);
                self.expect(&TokenKind::Fn, "'fn', 'const', 'struct' or 'operator'")?;
                let (receiver, name) = self.parse_func_name()?;
                let Some(name) = name else {
                    return Err(self.error_expected("function name"));
                };
                let params = self.parse_params()?;
                Ok(NativeDecl::Func {
                    name,
                    receiver,
                    params,
                    memo,
                    is_async,
                })
            }
        }
    }

    fn parse_native_operator(&mut self, is_async: bool) -> PResult<NativeDecl> {
        self.expect(&TokenKind::Operator, "'operator'")?;
        let receiver = self.expect_ident("receiver type")?;
        let op = self.expect_overloadable_op()?;
        let params = self.parse_params()?;
        Ok(NativeDecl::Operator {
            receiver,
            op,
            params,
            is_async,
        })
    }
}

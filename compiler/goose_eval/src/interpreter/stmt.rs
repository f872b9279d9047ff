//! Statement execution.

use goose_ir::ast::{CatchClause, ExprKind, Stmt, StmtKind};
use goose_stack::ensure_sufficient_stack;

use super::{Completion, Interpreter};
use crate::environment::{ScopeId, ScopeOwner, Variable};
use crate::errors::{ControlFlow, EvalError};
use crate::value::{Symbol, Value};

impl Interpreter {
    /// Run `stmts` in order, stopping at the first `return`, `break` or
    /// `continue`. Otherwise the block finishes with its last statement's
    /// completion.
    pub(crate) fn exec_block(
        &mut self,
        stmts: &[Stmt],
        scope: ScopeId,
    ) -> Result<Completion, EvalError> {
        let mut last = Completion::Void;
        for stmt in stmts {
            last = self.exec_stmt(stmt, scope)?;
            if matches!(last, Completion::Control(_)) {
                break;
            }
        }
        Ok(last)
    }

    /// Run `stmts` in a fresh child frame of `parent`.
    pub(crate) fn exec_scoped_block(
        &mut self,
        stmts: &[Stmt],
        parent: ScopeId,
        owner: ScopeOwner,
    ) -> Result<Completion, EvalError> {
        self.with_scope(parent, owner, |frame, scope| {
            frame.exec_block(stmts, scope).map(Completion::nested)
        })
    }

    #[tracing::instrument(level = "trace", skip_all)]
    pub(crate) fn exec_stmt(&mut self, stmt: &Stmt, scope: ScopeId) -> Result<Completion, EvalError> {
        if self.trace {
            self.trace_stmt(stmt);
        }
        ensure_sufficient_stack(|| self.exec_stmt_inner(stmt, scope))
            .map_err(|err| err.or_span(stmt.span))
    }

    fn trace_stmt(&self, stmt: &Stmt) {
        if let Some(source) = &self.source {
            let pos = source.line_col(stmt.span.start);
            tracing::trace!(
                file = source.name(),
                line = pos.line,
                col = pos.col,
                code = source.snippet(stmt.span),
                "exec"
            );
        }
    }

    fn exec_stmt_inner(&mut self, stmt: &Stmt, scope: ScopeId) -> Result<Completion, EvalError> {
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                let value = self.eval_expr(expr, scope)?;
                match &expr.kind {
                    ExprKind::Func(lit) if lit.receiver.is_none() => match &lit.name {
                        Some(name) => Ok(Completion::Decl(name.name.clone(), value)),
                        None => Ok(Completion::LoneValue(value)),
                    },
                    ExprKind::Func(_) => Ok(Completion::Void),
                    _ => Ok(Completion::LoneValue(value)),
                }
            }
            StmtKind::Let { name, value } => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr, scope)?,
                    None => Value::Null,
                };
                self.declare(scope, name, value.clone(), false)?;
                Ok(Completion::Decl(name.name.clone(), value))
            }
            StmtKind::Const { name, value } => {
                let value = self.eval_expr(value, scope)?;
                self.declare(scope, name, value.clone(), true)?;
                Ok(Completion::Decl(name.name.clone(), value))
            }
            StmtKind::Symbol { name } => {
                let value = Value::Symbol(Symbol::new(name.name.clone()));
                self.declare(scope, name, value.clone(), true)?;
                Ok(Completion::Decl(name.name.clone(), value))
            }
            StmtKind::Assign {
                target, op, value, ..
            } => {
                self.exec_assign(target, *op, value, scope, stmt.span)?;
                Ok(Completion::Void)
            }
            StmtKind::IncDec { target, op } => {
                self.exec_inc_dec(target, *op, scope, stmt.span)?;
                Ok(Completion::Void)
            }
            StmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr, scope)?,
                    None => Value::Null,
                };
                Ok(Completion::Control(ControlFlow::Return(value)))
            }
            StmtKind::Break => Ok(Completion::Control(ControlFlow::Break)),
            StmtKind::Continue => Ok(Completion::Control(ControlFlow::Continue)),
            StmtKind::Yield(expr) => {
                let value = self.eval_expr(expr, scope)?;
                self.exec_yield(value, scope)?;
                Ok(Completion::Void)
            }
            StmtKind::If {
                cond,
                body,
                else_body,
            } => {
                if self.eval_expr(cond, scope)?.is_truthy() {
                    self.exec_scoped_block(body, scope, ScopeOwner::If)
                } else if let Some(else_body) = else_body {
                    self.exec_scoped_block(else_body, scope, ScopeOwner::If)
                } else {
                    Ok(Completion::Void)
                }
            }
            StmtKind::For {
                binding,
                iterable,
                body,
                ..
            } => self.exec_for(binding, iterable, body, scope),
            StmtKind::RepeatWhile { cond, body } => self.exec_repeat_while(cond, body, scope),
            StmtKind::RepeatForever { body } => self.exec_repeat_forever(body, scope),
            StmtKind::RepeatCount { count, body } => self.exec_repeat_count(count, body, scope),
            StmtKind::Struct(decl) => self.exec_struct(decl, scope),
            StmtKind::Operator(decl) => {
                self.exec_operator(decl, scope)?;
                Ok(Completion::Void)
            }
            StmtKind::Try {
                body,
                catch,
                finally,
            } => self.exec_try(body, catch.as_ref(), finally.as_deref(), scope),
            StmtKind::Import(decl) => {
                self.exec_import(decl, scope)?;
                Ok(Completion::Void)
            }
            StmtKind::ExportDecl(inner) => {
                self.exec_export_decl(inner, scope)?;
                Ok(Completion::Void)
            }
            StmtKind::ExportList(names) => {
                self.exec_export_list(names, scope)?;
                Ok(Completion::Void)
            }
            StmtKind::ExportSpec(decl) => {
                self.exec_export_spec(decl, scope)?;
                Ok(Completion::Void)
            }
            StmtKind::Native(decl) => self.exec_native(decl, scope),
        }
    }

    /// Hand `value` to the consumer of the running generator.
    fn exec_yield(&mut self, value: Value, scope: ScopeId) -> Result<(), EvalError> {
        if !self.in_generator_body(scope) {
            return Err(EvalError::new("yield outside of generator"));
        }
        match &self.yielder {
            Some(yielder) => yielder.yield_value(value),
            None => Err(EvalError::new("yield outside of generator")),
        }
    }

    /// Whether the nearest enclosing function frame is a generator body.
    fn in_generator_body(&self, scope: ScopeId) -> bool {
        let scopes = self.scopes.read();
        let mut current = Some(scope);
        while let Some(id) = current {
            match scopes.owner(id) {
                Some(ScopeOwner::Generator) => return true,
                Some(ScopeOwner::Function | ScopeOwner::Struct | ScopeOwner::Module) | None => {
                    return false
                }
                Some(_) => current = scopes.parent(id),
            }
        }
        false
    }

    /// `try ... catch [as name] ... finally ... end`
    ///
    /// Only catchable faults reach `catch`; control flow, `exit` and
    /// internal errors pass through after `finally` has run. A `finally`
    /// that returns, breaks or continues overrides everything else.
    fn exec_try(
        &mut self,
        body: &[Stmt],
        catch: Option<&CatchClause>,
        finally: Option<&[Stmt]>,
        scope: ScopeId,
    ) -> Result<Completion, EvalError> {
        let mut result = self.exec_scoped_block(body, scope, ScopeOwner::Block);

        let handler = match (&result, catch) {
            (Err(err), Some(clause)) if err.is_catchable() => {
                tracing::debug!(error = %err.message, "caught");
                let caught = err
                    .thrown
                    .clone()
                    .unwrap_or_else(|| Value::string(err.message.as_str()));
                Some((clause, caught))
            }
            _ => None,
        };
        if let Some((clause, caught)) = handler {
            result = self.with_scope(scope, ScopeOwner::Block, |frame, catch_scope| {
                if let Some(binding) = &clause.binding {
                    frame.define(catch_scope, binding.name.clone(), Variable::mutable(caught))?;
                }
                frame.exec_block(&clause.body, catch_scope).map(Completion::nested)
            });
        }

        if let Some(finally) = finally {
            let completion = self.exec_scoped_block(finally, scope, ScopeOwner::Block)?;
            if matches!(completion, Completion::Control(_)) {
                return Ok(completion);
            }
        }
        result
    }
}

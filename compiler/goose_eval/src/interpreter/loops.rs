//! `for` and `repeat` loops.
//!
//! Every iteration runs in a fresh frame. The innermost loop consumes
//! `break` and `continue`; `return` leaves the loop with the completion
//! unchanged.

use goose_ir::ast::{Expr, Ident, Stmt};
use num_traits::ToPrimitive;

use super::{Completion, Interpreter};
use crate::environment::{ScopeId, ScopeOwner, Variable};
use crate::errors::{type_mismatch, ControlFlow, EvalError};
use crate::generator::ValueStream;
use crate::value::Value;

/// What the loop does after one iteration.
enum Step {
    Next,
    Exit(Completion),
}

fn step(completion: Completion) -> Step {
    match completion {
        Completion::Control(ControlFlow::Break) => Step::Exit(Completion::Void),
        Completion::Control(flow @ ControlFlow::Return(_)) => Step::Exit(Completion::Control(flow)),
        _ => Step::Next,
    }
}

impl Interpreter {
    /// `for x in e ... end`. The source is closed whenever the loop ends
    /// before it is exhausted.
    pub(crate) fn exec_for(
        &mut self,
        binding: &Ident,
        iterable: &Expr,
        body: &[Stmt],
        scope: ScopeId,
    ) -> Result<Completion, EvalError> {
        let source = self.eval_expr(iterable, scope)?;
        let Some(mut stream) = ValueStream::open(&source)? else {
            return Err(type_mismatch(format!("cannot iterate over {}", source.type_name()))
                .with_span(iterable.span));
        };
        let outcome = self.drain(&mut stream, binding, body, scope);
        stream.close();
        outcome
    }

    fn drain(
        &mut self,
        stream: &mut ValueStream,
        binding: &Ident,
        body: &[Stmt],
        scope: ScopeId,
    ) -> Result<Completion, EvalError> {
        while let Some(item) = stream.next()? {
            let completion = self.with_scope(scope, ScopeOwner::For, |frame, iteration| {
                frame.define(iteration, binding.name.clone(), Variable::mutable(item))?;
                frame.exec_block(body, iteration)
            })?;
            if let Step::Exit(completion) = step(completion) {
                return Ok(completion);
            }
        }
        Ok(Completion::Void)
    }

    pub(crate) fn exec_repeat_while(
        &mut self,
        cond: &Expr,
        body: &[Stmt],
        scope: ScopeId,
    ) -> Result<Completion, EvalError> {
        while self.eval_expr(cond, scope)?.is_truthy() {
            if let Step::Exit(completion) = self.repeat_iteration(body, scope)? {
                return Ok(completion);
            }
        }
        Ok(Completion::Void)
    }

    pub(crate) fn exec_repeat_forever(
        &mut self,
        body: &[Stmt],
        scope: ScopeId,
    ) -> Result<Completion, EvalError> {
        loop {
            if let Step::Exit(completion) = self.repeat_iteration(body, scope)? {
                return Ok(completion);
            }
        }
    }

    /// `repeat n times ... end`; a Float count is truncated, a negative
    /// one runs no iterations.
    pub(crate) fn exec_repeat_count(
        &mut self,
        count: &Expr,
        body: &[Stmt],
        scope: ScopeId,
    ) -> Result<Completion, EvalError> {
        let times = match self.eval_expr(count, scope)? {
            Value::Integer(n) => n.to_u64().unwrap_or(0),
            Value::Float(x) if x > 0.0 => x.trunc().to_u64().unwrap_or(u64::MAX),
            Value::Float(_) => 0,
            _ => {
                return Err(type_mismatch("repeat count must be numeric").with_span(count.span))
            }
        };
        for _ in 0..times {
            if let Step::Exit(completion) = self.repeat_iteration(body, scope)? {
                return Ok(completion);
            }
        }
        Ok(Completion::Void)
    }

    fn repeat_iteration(&mut self, body: &[Stmt], scope: ScopeId) -> Result<Step, EvalError> {
        let completion = self.exec_scoped_block(body, scope, ScopeOwner::Repeat)?;
        Ok(step(completion))
    }
}

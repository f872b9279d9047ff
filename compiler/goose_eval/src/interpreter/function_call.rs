//! Closures and calls.
//!
//! Every call goes through [`Interpreter::call_function`], whatever the
//! callee: user closures get a fresh frame forked from the scope they
//! captured, natives get a [`FuncContext`], struct constructors build an
//! instance, and generator functions hand their body to a worker thread.

use std::sync::Arc;

use goose_ir::ast::{FuncBody, FuncKind, FuncLit};
use goose_ir::Span;
use rustc_hash::FxHashSet;

use super::{Completion, Interpreter};
use crate::environment::{ScopeId, ScopeOwner, Variable};
use crate::errors::{not_callable, stray_control_flow, type_mismatch, ControlFlow, EvalError, EvalResult};
use crate::generator::{GeneratorHandle, GeneratorJob};
use crate::value::{Callable, FuncContext, Function, MemoCache, UserFunc, Value};

impl Interpreter {
    /// Evaluate a function or generator literal into a closure over
    /// `scope`. Named literals bind themselves; receiver functions are
    /// added to their struct's prototype instead.
    pub(crate) fn eval_func_lit(&mut self, lit: &Arc<FuncLit>, scope: ScopeId) -> EvalResult {
        let mut seen = FxHashSet::default();
        for param in &lit.params {
            if !seen.insert(&*param.name.name) {
                return Err(type_mismatch(format!("duplicate parameter {}", param.name.name))
                    .with_span(param.name.span));
            }
        }

        let mut defaults = Vec::with_capacity(lit.params.len());
        for param in &lit.params {
            defaults.push(match &param.default {
                Some(expr) => Some(self.eval_expr(expr, scope)?),
                None => None,
            });
        }

        let captured = self.capture_scope(scope)?;
        let func = Value::func(Function::user(
            lit.name.as_ref().map(|n| n.name.clone()),
            UserFunc {
                lit: Arc::clone(lit),
                scope: captured,
                defaults,
                source: self.source.clone(),
            },
        ));

        match (&lit.name, &lit.receiver) {
            (Some(name), Some(receiver)) => self.add_receiver_method(receiver, name, func.clone(), scope)?,
            (Some(name), None) => self.declare(scope, name, func.clone(), true)?,
            (None, _) => {}
        }
        Ok(func)
    }

    /// Call `func` with an optional receiver. A receiver fixed by `::` or
    /// `bind` takes precedence over `this`.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn call_function(
        &mut self,
        func: &Value,
        this: Option<Value>,
        args: Vec<Value>,
        scope: ScopeId,
        span: Span,
    ) -> EvalResult {
        let Value::Func(f) = func else {
            return Err(not_callable(func.type_name()).with_span(span));
        };
        let this = f.this().cloned().or(this).unwrap_or(Value::Null);
        match f.callable() {
            Callable::Native(native) => {
                let mut ctx = FuncContext {
                    interp: self,
                    scope,
                    this,
                    args,
                    span,
                };
                native(&mut ctx).map_err(|err| err.or_span(span))
            }
            Callable::User(user) if user.lit.kind == FuncKind::Generator => {
                let job = GeneratorJob {
                    func: func.clone(),
                    this: Some(this),
                    args,
                    span,
                };
                GeneratorHandle::spawn(self, job).map(Value::Generator)
            }
            Callable::User(user) => match f.memo() {
                Some(cache) => self.call_memoized(cache, user, this, args, span),
                None => self.invoke_user(user, this, args, ScopeOwner::Function),
            },
            Callable::Constructor(def) => self.construct(def, args),
        }
    }

    /// Memoized call: results are cached per argument list, keyed by each
    /// argument's `TYPE|hash`.
    fn call_memoized(
        &mut self,
        cache: &MemoCache,
        user: &Arc<UserFunc>,
        this: Value,
        args: Vec<Value>,
        span: Span,
    ) -> EvalResult {
        let key = args
            .iter()
            .map(|arg| format!("{}|{}", arg.type_name(), arg.hash_key()))
            .collect::<Vec<_>>()
            .join(",");
        if let Some(hit) = cache.lock().get(&key) {
            tracing::trace!(key, "memo hit");
            return Ok(hit.clone());
        }
        let result = self
            .invoke_user(user, this, args, ScopeOwner::Function)
            .map_err(|err| err.or_span(span))?;
        cache.lock().insert(key, result.clone());
        Ok(result)
    }

    /// Run a user closure's body in a fresh frame under its captured scope.
    pub(crate) fn invoke_user(
        &mut self,
        user: &UserFunc,
        this: Value,
        args: Vec<Value>,
        owner: ScopeOwner,
    ) -> EvalResult {
        self.with_source(user.source.clone(), |interp| {
            interp.with_scope(user.scope.id(), owner, |frame, scope| {
                frame.bind_params(user, scope, args)?;
                frame.define(scope, "this", Variable::constant(this))?;
                match &user.lit.body {
                    FuncBody::Arrow(expr) => frame.eval_expr(expr, scope),
                    FuncBody::Block(stmts) => match frame.exec_block(stmts, scope)? {
                        Completion::Control(ControlFlow::Return(value)) => Ok(value),
                        Completion::Control(flow) => Err(stray_control_flow(&flow, "function")),
                        Completion::Void | Completion::Decl(..) | Completion::LoneValue(_) => {
                            Ok(Value::Null)
                        }
                    },
                }
            })
        })
    }

    /// Positional binding with per-call copies of the defaults; a rest
    /// parameter collects what is left into an Array.
    fn bind_params(
        &mut self,
        user: &UserFunc,
        scope: ScopeId,
        args: Vec<Value>,
    ) -> Result<(), EvalError> {
        let mut args = args.into_iter();
        for (param, default) in user.lit.params.iter().zip(&user.defaults) {
            let value = if param.rest {
                Value::array(args.by_ref().map(|arg| arg.clone_shallow()).collect())
            } else {
                match args.next() {
                    Some(arg) => arg.clone_shallow(),
                    None => default.as_ref().map_or(Value::Null, Value::clone_shallow),
                }
            };
            self.define(scope, param.name.name.clone(), Variable::mutable(value))?;
        }
        Ok(())
    }

    /// Body of a generator function, run on its worker thread.
    pub(crate) fn run_generator_body(&mut self, job: &GeneratorJob) -> EvalResult {
        let Value::Func(f) = &job.func else {
            return Err(not_callable(job.func.type_name()).with_span(job.span));
        };
        let Callable::User(user) = f.callable() else {
            return Err(not_callable(job.func.type_name()).with_span(job.span));
        };
        let this = job.this.clone().unwrap_or(Value::Null);
        self.invoke_user(user, this, job.args.clone(), ScopeOwner::Generator)
    }
}

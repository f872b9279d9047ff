//! Tree-walking interpreter for goose.
//!
//! # Architecture
//!
//! Statements are executed by `exec_stmt` (`stmt.rs`) and produce a
//! [`Completion`]; expressions are evaluated by `eval_expr` (`expr.rs`)
//! and produce a [`Value`]. The remaining files split out the larger
//! pieces:
//!
//! - `assign.rs` - `=`, compound assignment, `++`/`--`
//! - `function_call.rs` - closures, calls, memoization, parameter binding
//! - `structs.rs` - struct constructors, receiver functions, operators
//! - `matching.rs` - `match` patterns
//! - `loops.rs` - `for` and `repeat`
//! - `natives.rs` - `native` declarations
//!
//! # Shared state
//!
//! An interpreter owns nothing the program can observe. Scopes, the module
//! cache and the native registry are shared handles, so a generator worker
//! gets its own `Interpreter` (see [`Interpreter::fork_for_worker`]) that
//! sees the same bindings. Locks on the scope arena are only held for the
//! duration of one arena call, never across evaluation.
//!
//! # Source tracking
//!
//! `source` is the file whose nodes are currently being evaluated. Calls
//! into a closure and module loads swap it for the callee's file and
//! stamp escaping errors with the file their span belongs to.

mod assign;
mod builder;
mod expr;
mod function_call;
mod loops;
mod matching;
mod natives;
mod scope_guard;
mod stmt;
mod structs;

pub use builder::{InterpreterBuilder, SharedInput};
pub use scope_guard::ScopedFrame;

use std::path::PathBuf;
use std::sync::Arc;

use goose_ir::ast::{self, Ident};
use goose_ir::{Op, SourceFile, SourceParser, Span};

use crate::environment::{CapturedScope, ScopeArena, ScopeId, ScopeOwner, Variable};
use crate::errors::{
    invalid_variable_name, operator_not_defined, stray_control_flow,
    variable_redefinition, ControlFlow, EvalError, EvalResult, RunOutcome, PANIC_EXIT_CODE,
};
use crate::generator::Yielder;
use crate::modules::ModuleCache;
use crate::natives::NativeRegistry;
use crate::operators::{get_operator, DerivedOp, Operator};
use crate::print_handler::SharedPrintHandler;
use crate::property::lookup_property;
use crate::value::{PropertyKey, Value};
use crate::{SharedMutableRegistry, SharedRegistry};

/// `toString` results that are not strings are stringified again, at most
/// this many times.
const MAX_TO_STRING_DEPTH: usize = 16;

/// How a statement finished.
#[derive(Clone, Debug)]
pub(crate) enum Completion {
    Void,
    /// A declaration bound `name`; only these may follow `export`.
    Decl(Arc<str>, Value),
    /// Value of an expression statement, the result of a `do` block.
    LoneValue(Value),
    /// `return`, `break` or `continue` on its way to the construct that
    /// consumes it.
    Control(ControlFlow),
}

impl Completion {
    /// Inside a nested block a declaration is just a statement.
    fn nested(self) -> Completion {
        match self {
            Completion::Decl(..) => Completion::Void,
            other => other,
        }
    }
}

pub struct Interpreter {
    pub(crate) scopes: SharedMutableRegistry<ScopeArena>,
    pub(crate) modules: SharedMutableRegistry<ModuleCache>,
    pub(crate) natives: SharedRegistry<NativeRegistry>,
    pub(crate) parser: Arc<dyn SourceParser>,
    pub(crate) print_handler: SharedPrintHandler,
    pub(crate) error_handler: SharedPrintHandler,
    pub(crate) stdin: SharedInput,
    pub(crate) trace: bool,
    pub(crate) goose_root: Option<PathBuf>,
    /// File of the nodes currently being evaluated.
    pub(crate) source: Option<Arc<SourceFile>>,
    /// Set only inside a generator worker.
    pub(crate) yielder: Option<Yielder>,
    main: Arc<ast::Module>,
    main_scope: ScopeId,
}

impl Interpreter {
    /// Run the main module to completion.
    pub fn run(&mut self) -> RunOutcome {
        let module = Arc::clone(&self.main);
        let scope = self.main_scope;
        tracing::debug!(module = self.source_name(), "running main module");
        match self.exec_module_body(&module.stmts, scope) {
            Ok(()) => RunOutcome::success(),
            Err(err) => match err.control_flow {
                Some(ControlFlow::Exit(code)) => RunOutcome {
                    exit_code: code,
                    error: None,
                },
                _ => RunOutcome {
                    exit_code: PANIC_EXIT_CODE,
                    error: Some(err.or_source(self.source.as_ref())),
                },
            },
        }
    }

    /// Evaluate a standalone expression in an existing scope, e.g. for a
    /// REPL line.
    pub fn evaluate_expression(&mut self, expr: &ast::Expr, scope: ScopeId) -> EvalResult {
        self.eval_expr(expr, scope)
            .map_err(|err| err.or_source(self.source.as_ref()))
    }

    pub fn global_scope(&self) -> ScopeId {
        self.scopes.read().global()
    }

    pub fn main_scope(&self) -> ScopeId {
        self.main_scope
    }

    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.print_handler
    }

    pub fn error_handler(&self) -> &SharedPrintHandler {
        &self.error_handler
    }

    /// Value bound to `name` as seen from `scope`.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> EvalResult {
        self.lookup_var(scope, name)
    }

    fn source_name(&self) -> &str {
        self.source.as_ref().map_or("<unknown>", |s| s.name())
    }

    /// Interpreter for a generator worker: same scopes, modules and
    /// handlers, no yielder of its own yet.
    pub(crate) fn fork_for_worker(&self) -> Interpreter {
        Interpreter {
            scopes: self.scopes.clone(),
            modules: self.modules.clone(),
            natives: self.natives.clone(),
            parser: Arc::clone(&self.parser),
            print_handler: self.print_handler.clone(),
            error_handler: self.error_handler.clone(),
            stdin: self.stdin.clone(),
            trace: self.trace,
            goose_root: self.goose_root.clone(),
            source: self.source.clone(),
            yielder: None,
            main: Arc::clone(&self.main),
            main_scope: self.main_scope,
        }
    }

    /// Run `f` with `source` as the current file, restoring the previous
    /// one afterwards and stamping escaping errors with `source`.
    pub(crate) fn with_source<T>(
        &mut self,
        source: Option<Arc<SourceFile>>,
        f: impl FnOnce(&mut Self) -> Result<T, EvalError>,
    ) -> Result<T, EvalError> {
        let previous = std::mem::replace(&mut self.source, source);
        let result = f(self);
        let source = std::mem::replace(&mut self.source, previous);
        result.map_err(|err| err.or_source(source.as_ref()))
    }

    /// Execute a module's top-level statements. A stray `return`, `break`
    /// or `continue` at this level is an internal error.
    pub(crate) fn exec_module_body(
        &mut self,
        stmts: &[ast::Stmt],
        scope: ScopeId,
    ) -> Result<(), EvalError> {
        for stmt in stmts {
            if let Completion::Control(flow) = self.exec_stmt(stmt, scope)? {
                return Err(stray_control_flow(&flow, "top-level").with_span(stmt.span));
            }
        }
        Ok(())
    }

    // Scope helpers. Each takes the arena lock for a single call.

    pub(crate) fn fork_scope(
        &mut self,
        parent: ScopeId,
        owner: ScopeOwner,
    ) -> Result<ScopeId, EvalError> {
        Ok(self.scopes.with_write(|arena| arena.fork(parent, owner))?)
    }

    pub(crate) fn release_scope(&mut self, scope: ScopeId) {
        let released = self.scopes.with_write(|arena| arena.release(scope));
        if !released.is_empty() {
            tracing::trace!(frames = released.len(), "frames freed");
        }
    }

    /// Counted reference to `scope` for a closure or constructor.
    pub(crate) fn capture_scope(&mut self, scope: ScopeId) -> Result<CapturedScope, EvalError> {
        Ok(self.scopes.with_write(|arena| arena.capture(scope))?)
    }

    pub(crate) fn pin_scope(&mut self, scope: ScopeId) {
        self.scopes.with_write(|arena| arena.pin(scope));
    }

    pub(crate) fn lookup_var(&self, scope: ScopeId, name: &str) -> EvalResult {
        Ok(self.scopes
            .with_read(|arena| arena.get(scope, name).map(|var| var.value.clone()))?)
    }

    pub(crate) fn owner_of(&self, scope: ScopeId) -> Option<ScopeOwner> {
        self.scopes.with_read(|arena| arena.owner(scope))
    }

    /// Bind `name` in `scope` without the checks a source-level
    /// declaration gets.
    pub(crate) fn define(
        &mut self,
        scope: ScopeId,
        name: impl Into<Arc<str>>,
        var: Variable,
    ) -> Result<(), EvalError> {
        let name = name.into();
        Ok(self.scopes.with_write(|arena| arena.set(scope, name, var))?)
    }

    /// Source-level declaration of `name`: rejects `_` and names already
    /// bound in the same frame.
    pub(crate) fn declare(
        &mut self,
        scope: ScopeId,
        name: &Ident,
        value: Value,
        constant: bool,
    ) -> Result<(), EvalError> {
        if &*name.name == "_" {
            return Err(invalid_variable_name().with_span(name.span));
        }
        let mut scopes = self.scopes.write();
        if scopes.is_defined_in_current_scope(scope, &name.name) {
            return Err(variable_redefinition(&name.name).with_span(name.span));
        }
        let var = if constant {
            Variable::constant(value)
        } else {
            Variable::mutable(value)
        };
        scopes
            .set(scope, name.name.clone(), var)
            .map_err(|err| EvalError::from(err).with_span(name.span))
    }

    pub(crate) fn assign_var(
        &mut self,
        scope: ScopeId,
        name: &str,
        value: Value,
    ) -> Result<(), EvalError> {
        Ok(self.scopes.with_write(|arena| arena.update(scope, name, value))?)
    }

    /// `this` as bound by the nearest enclosing call.
    pub(crate) fn lookup_this(&self, scope: ScopeId) -> EvalResult {
        self.lookup_var(scope, "this")
    }

    // Operators

    /// Apply `op` with `left` as the receiver. Unary operators pass
    /// `right = None`.
    pub fn apply_operator(
        &mut self,
        op: Op,
        left: &Value,
        right: Option<Value>,
        scope: ScopeId,
        span: Span,
    ) -> EvalResult {
        match get_operator(left, op) {
            Some(Operator::Func(implementation)) => self.call_function(
                &implementation,
                Some(left.clone()),
                right.into_iter().collect(),
                scope,
                span,
            ),
            Some(Operator::Derived(derived)) => {
                self.apply_derived(derived, left, right.unwrap_or(Value::Null), scope, span)
            }
            None => {
                let right = right.as_ref().map_or("nothing", Value::type_name);
                Err(operator_not_defined(op.as_str(), left.type_name(), right).with_span(span))
            }
        }
    }

    fn apply_derived(
        &mut self,
        derived: DerivedOp,
        left: &Value,
        right: Value,
        scope: ScopeId,
        span: Span,
    ) -> EvalResult {
        let test = |this: &mut Self, op: Op| -> Result<bool, EvalError> {
            Ok(this
                .apply_operator(op, left, Some(right.clone()), scope, span)?
                .is_truthy())
        };
        let result = match derived {
            DerivedOp::Assign => return Ok(right),
            DerivedOp::Lt => !test(self, Op::Gt)? && !test(self, Op::Eq)?,
            DerivedOp::Lte => !test(self, Op::Gt)?,
            DerivedOp::Gte => test(self, Op::Gt)? || test(self, Op::Eq)?,
            DerivedOp::Neq => !test(self, Op::Eq)?,
        };
        Ok(Value::Bool(result))
    }

    /// `a == b` through `a`'s operator table.
    pub fn values_equal(
        &mut self,
        a: &Value,
        b: &Value,
        scope: ScopeId,
        span: Span,
    ) -> Result<bool, EvalError> {
        Ok(self
            .apply_operator(Op::Eq, a, Some(b.clone()), scope, span)?
            .is_truthy())
    }

    // Stringification

    /// String form of `value` via its `toString`.
    pub fn to_string(&mut self, value: &Value, scope: ScopeId) -> Result<String, EvalError> {
        let mut current = value.clone();
        for _ in 0..MAX_TO_STRING_DEPTH {
            // Builtin prototypes are frozen, so primitives cannot override
            // their toString.
            match &current {
                Value::String(s) => return Ok(s.to_string()),
                Value::Null => return Ok("null".to_string()),
                Value::Bool(b) => return Ok(b.to_string()),
                Value::Integer(n) => return Ok(n.to_string()),
                Value::Float(x) => return Ok(x.to_string()),
                Value::Symbol(sym) => return Ok(sym.name().to_string()),
                _ => {}
            }
            let Some(method) = lookup_property(&current, &PropertyKey::string("toString")) else {
                break;
            };
            current = self.call_function(&method, Some(current.clone()), Vec::new(), scope, Span::DUMMY)?;
        }
        Ok("<unknown>".to_string())
    }

    /// Debug form of `value` via its `toDebugString(depth)`.
    pub fn to_debug_string(
        &mut self,
        value: &Value,
        depth: usize,
        scope: ScopeId,
    ) -> Result<String, EvalError> {
        let Some(method) = lookup_property(value, &PropertyKey::string("toDebugString")) else {
            return self.to_string(value, scope);
        };
        let depth = Value::from(i64::try_from(depth).unwrap_or(i64::MAX));
        let rendered = self.call_function(&method, Some(value.clone()), vec![depth], scope, Span::DUMMY)?;
        self.to_string(&rendered, scope)
    }
}

#[cfg(test)]
mod tests;

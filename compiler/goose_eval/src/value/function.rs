//! Callable values: user closures, native functions and struct constructors.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use goose_ir::ast::{FuncKind, FuncLit, StructDecl};
use goose_ir::{SourceFile, Span};
use num_bigint::BigInt;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use super::{CompositeRef, Value};
use crate::environment::{CapturedScope, ScopeId};
use crate::errors::{type_mismatch, EvalError, EvalResult};
use crate::interpreter::Interpreter;

pub type FuncRef = Arc<Function>;

/// Signature every native function, method and operator implements.
pub type NativeFn = fn(&mut FuncContext<'_>) -> EvalResult;

/// Results of a memoized function keyed by its arguments' `TYPE|hash`
/// strings.
pub type MemoCache = Arc<Mutex<FxHashMap<String, Value>>>;

/// A function or generator literal closed over its defining scope.
pub struct UserFunc {
    pub lit: Arc<FuncLit>,
    pub scope: CapturedScope,
    /// Parameter defaults, evaluated once when the literal was evaluated.
    pub defaults: Vec<Option<Value>>,
    /// File the literal came from, for error locations inside the body.
    pub source: Option<Arc<SourceFile>>,
}

/// Everything a struct constructor needs to build instances.
pub struct StructDef {
    pub name: Arc<str>,
    pub fields: Vec<Arc<str>>,
    pub defaults: Vec<Option<Value>>,
    pub decl: Option<Arc<StructDecl>>,
    /// Scope the `init` block runs under; `None` for native structs.
    pub scope: Option<CapturedScope>,
    pub source: Option<Arc<SourceFile>>,
    /// Prototype shared by every instance.
    pub prototype: CompositeRef,
}

#[derive(Clone)]
pub enum Callable {
    User(Arc<UserFunc>),
    Native(NativeFn),
    Constructor(Arc<StructDef>),
}

pub struct Function {
    name: Arc<str>,
    callable: Callable,
    this: Option<Value>,
    memo: Option<MemoCache>,
    frozen: AtomicBool,
}

impl Function {
    pub fn native(name: &str, f: NativeFn) -> Self {
        Function::from_callable(name.into(), Callable::Native(f), None)
    }

    pub fn user(name: Option<Arc<str>>, func: UserFunc) -> Self {
        let memo = func.lit.memo.then(MemoCache::default);
        let name = name.unwrap_or_else(|| Arc::from(""));
        Function::from_callable(name, Callable::User(Arc::new(func)), memo)
    }

    pub fn constructor(def: StructDef) -> Self {
        let name = def.name.clone();
        Function::from_callable(name, Callable::Constructor(Arc::new(def)), None)
    }

    fn from_callable(name: Arc<str>, callable: Callable, memo: Option<MemoCache>) -> Self {
        Function {
            name,
            callable,
            this: None,
            memo,
            frozen: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "anonymous"
        } else {
            &self.name
        }
    }

    pub fn callable(&self) -> &Callable {
        &self.callable
    }

    /// Receiver fixed by `::` or `bind`.
    pub fn this(&self) -> Option<&Value> {
        self.this.as_ref()
    }

    pub fn memo(&self) -> Option<&MemoCache> {
        self.memo.as_ref()
    }

    /// Prototype of the instances this function constructs, if it is a
    /// struct constructor.
    pub fn newable(&self) -> Option<&CompositeRef> {
        match &self.callable {
            Callable::Constructor(def) => Some(&def.prototype),
            Callable::User(_) | Callable::Native(_) => None,
        }
    }

    /// Frame this function keeps alive, when no other function value
    /// shares its closure.
    pub fn sole_capture(&self) -> Option<ScopeId> {
        match &self.callable {
            Callable::User(user) if Arc::strong_count(user) == 1 => Some(user.scope.id()),
            Callable::Constructor(def) if Arc::strong_count(def) == 1 => {
                def.scope.as_ref().map(CapturedScope::id)
            }
            Callable::User(_) | Callable::Constructor(_) | Callable::Native(_) => None,
        }
    }

    pub fn is_generator(&self) -> bool {
        matches!(&self.callable, Callable::User(u) if u.lit.kind == FuncKind::Generator)
    }

    /// Copy with `this` fixed. The memo cache is shared with the original.
    #[must_use]
    pub fn bound(&self, this: Value) -> Function {
        Function {
            name: self.name.clone(),
            callable: self.callable.clone(),
            this: Some(this),
            memo: self.memo.clone(),
            frozen: AtomicBool::new(self.is_frozen()),
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    pub fn freeze(&self) {
        self.frozen.store(true, Ordering::Release);
    }

    pub fn unfreeze(&self) {
        self.frozen.store(false, Ordering::Release);
    }
}

/// Call frame handed to native functions.
pub struct FuncContext<'a> {
    pub interp: &'a mut Interpreter,
    /// Scope of the caller.
    pub scope: ScopeId,
    pub this: Value,
    pub args: Vec<Value>,
    pub span: Span,
}

impl FuncContext<'_> {
    /// Argument `index`, or null when not supplied.
    pub fn arg(&self, index: usize) -> Value {
        self.args.get(index).cloned().unwrap_or(Value::Null)
    }

    pub fn has_arg(&self, index: usize) -> bool {
        index < self.args.len()
    }

    /// Fail with `SIG: expected N argument(s)` when fewer were passed.
    pub fn require_args(&self, signature: &str, count: usize) -> Result<(), EvalError> {
        if self.args.len() < count {
            let noun = if count == 1 { "argument" } else { "arguments" };
            return Err(type_mismatch(format!("{signature}: expected {count} {noun}")));
        }
        Ok(())
    }

    pub fn int_arg(&self, index: usize, signature: &str) -> Result<BigInt, EvalError> {
        match self.args.get(index) {
            Some(Value::Integer(n)) => Ok(n.clone()),
            other => Err(expected(signature, "an integer", index, other)),
        }
    }

    pub fn str_arg(&self, index: usize, signature: &str) -> Result<Arc<str>, EvalError> {
        match self.args.get(index) {
            Some(Value::String(s)) => Ok(s.clone()),
            other => Err(expected(signature, "a string", index, other)),
        }
    }

    /// Integer or Float argument as `f64`.
    pub fn number_arg(&self, index: usize, signature: &str) -> Result<f64, EvalError> {
        match self.args.get(index).and_then(Value::as_f64) {
            Some(x) => Ok(x),
            None => Err(expected(signature, "a number", index, self.args.get(index))),
        }
    }

    pub fn func_arg(&self, index: usize, signature: &str) -> Result<Value, EvalError> {
        match self.args.get(index) {
            Some(f @ Value::Func(_)) => Ok(f.clone()),
            other => Err(expected(signature, "a function", index, other)),
        }
    }

    /// Call back into the evaluator.
    pub fn call(&mut self, func: &Value, this: Option<Value>, args: Vec<Value>) -> EvalResult {
        self.interp
            .call_function(func, this, args, self.scope, self.span)
    }

    /// String form of `value` via its `toString`.
    pub fn stringify(&mut self, value: &Value) -> Result<String, EvalError> {
        self.interp.to_string(value, self.scope)
    }
}

fn expected(signature: &str, what: &str, index: usize, got: Option<&Value>) -> EvalError {
    let position = match index {
        0 => "first",
        1 => "second",
        2 => "third",
        _ => "an",
    };
    let got = got.map_or("nothing", Value::type_name);
    type_mismatch(format!(
        "{signature}: expected {what} as {position} argument, got {got}"
    ))
}

//! Expression evaluation.

use std::sync::Arc;

use goose_ir::ast::{CompositeField, CompositeKey, Expr, ExprKind, Stmt, StringPart};
use goose_ir::{Op, Span};
use goose_stack::ensure_sufficient_stack;
use num_traits::{Signed, ToPrimitive, Zero};

use super::{Completion, Interpreter};
use crate::environment::{ScopeId, ScopeOwner, Variable};
use crate::errors::{
    not_callable, property_of_null, stray_control_flow, type_mismatch, ControlFlow, EvalError, EvalResult,
};
use crate::property::{get_named, get_property};
use crate::proto::{char_slice, clamp_bounds, prototypes};
use crate::value::{Composite, FloatRange, IntRange, PropertyKey, Value, MAX_SEQUENCE_LEN};

impl Interpreter {
    /// Evaluate `expr` in `scope`. Errors without a location get `expr`'s
    /// span.
    pub(crate) fn eval_expr(&mut self, expr: &Expr, scope: ScopeId) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_expr_inner(expr, scope))
            .map_err(|err| err.or_span(expr.span))
    }

    fn eval_expr_inner(&mut self, expr: &Expr, scope: ScopeId) -> EvalResult {
        match &expr.kind {
            ExprKind::Null => Ok(Value::Null),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Int(n) => Ok(Value::Integer(n.clone())),
            ExprKind::Float(x) => Ok(Value::Float(*x)),
            ExprKind::Str(parts) => self.eval_string(parts, scope),
            ExprKind::Ident(ident) => self.lookup_var(scope, &ident.name),
            ExprKind::ThisProp(name) => {
                let this = self.lookup_this(scope)?;
                get_named(&this, &name.name)
            }
            ExprKind::ThisIndex(key) => {
                let this = self.lookup_this(scope)?;
                let key = self.eval_expr(key, scope)?;
                get_property(&this, &key)
            }
            ExprKind::Array(items) => Ok(Value::array(self.eval_list(items, scope)?)),
            ExprKind::ArrayInit { value, count } => self.eval_array_init(value, count, scope),
            ExprKind::Composite(fields) => self.eval_composite(fields, scope),
            ExprKind::Func(lit) => self.eval_func_lit(lit, scope),
            ExprKind::Call { callee, args } => self.eval_call(callee, args, scope, expr.span),
            ExprKind::Selector { object, name } => {
                let object = self.eval_expr(object, scope)?;
                get_named(&object, &name.name)
            }
            ExprKind::Index { object, index } => {
                let object = self.eval_expr(object, scope)?;
                let key = self.eval_expr(index, scope)?;
                get_property(&object, &key)
            }
            ExprKind::Slice { object, low, high } => {
                self.eval_slice(object, low.as_deref(), high.as_deref(), scope)
            }
            ExprKind::Bind { object, func } => {
                let object = self.eval_expr(object, scope)?;
                match self.eval_expr(func, scope)? {
                    Value::Func(f) => Ok(Value::func(f.bound(object))),
                    other => Err(not_callable(other.type_name())),
                }
            }
            ExprKind::Unary { op, operand } => {
                let operand = self.eval_expr(operand, scope)?;
                self.apply_operator(*op, &operand, None, scope, expr.span)
            }
            ExprKind::Spread(_) => Err(type_mismatch(
                "spread is only allowed in argument lists and array literals",
            )),
            ExprKind::Binary { op, left, right } => {
                self.eval_binary(*op, left, right, scope, expr.span)
            }
            ExprKind::Pipeline { left, right } => {
                let input = self.eval_expr(left, scope)?;
                self.with_scope(scope, ScopeOwner::Pipeline, |frame, pipe| {
                    frame.define(pipe, "_", Variable::constant(input))?;
                    frame.eval_expr(right, pipe)
                })
            }
            ExprKind::Range { start, stop, step } => {
                self.eval_range(start, stop, step.as_deref(), scope)
            }
            ExprKind::Debug(inner) => {
                let value = self.eval_expr(inner, scope)?;
                let code = self
                    .source
                    .as_ref()
                    .map_or_else(|| "?".to_string(), |s| s.snippet(inner.span).to_string());
                let rendered = self.to_debug_string(&value, 0, scope)?;
                self.error_handler.println(&format!("{code} = {rendered}"));
                Ok(value)
            }
            ExprKind::Paren(inner) | ExprKind::Await(inner) => self.eval_expr(inner, scope),
            ExprKind::Frozen(inner) => {
                let value = self.eval_expr(inner, scope)?;
                value.freeze();
                Ok(value)
            }
            ExprKind::If { cond, then, else_ } => {
                if self.eval_expr(cond, scope)?.is_truthy() {
                    self.eval_expr(then, scope)
                } else if let Some(else_) = else_ {
                    self.eval_expr(else_, scope)
                } else {
                    Ok(Value::Null)
                }
            }
            ExprKind::Do(stmts) => self.eval_do(stmts, scope),
            ExprKind::Match { subject, arms } => self.eval_match(subject, arms, scope),
            ExprKind::Throw(inner) => {
                let value = self.eval_expr(inner, scope)?;
                let message = self.to_string(&value, scope)?;
                Err(EvalError::thrown(value, message))
            }
        }
    }

    fn eval_string(&mut self, parts: &[StringPart], scope: ScopeId) -> EvalResult {
        let mut out = String::new();
        for part in parts {
            let value = match part {
                StringPart::Text(text) => {
                    out.push_str(text);
                    continue;
                }
                StringPart::Ident(ident) => self.lookup_var(scope, &ident.name)?,
                StringPart::ThisProp(name) => {
                    let this = self.lookup_this(scope)?;
                    get_named(&this, &name.name)?
                }
                StringPart::Expr(expr) => self.eval_expr(expr, scope)?,
            };
            out.push_str(&self.to_string(&value, scope)?);
        }
        Ok(Value::string(out))
    }

    /// Evaluate call arguments or array elements, expanding `...spread`.
    pub(crate) fn eval_list(
        &mut self,
        items: &[Expr],
        scope: ScopeId,
    ) -> Result<Vec<Value>, EvalError> {
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            if let ExprKind::Spread(inner) = &item.kind {
                match self.eval_expr(inner, scope)? {
                    Value::Array(array) => values.extend(array.snapshot()),
                    other => {
                        return Err(type_mismatch(format!(
                            "cannot spread value of type {}",
                            other.type_name()
                        ))
                        .with_span(item.span))
                    }
                }
            } else {
                values.push(self.eval_expr(item, scope)?);
            }
        }
        Ok(values)
    }

    /// `[value; count]`, with `_` bound to the index for each element.
    fn eval_array_init(&mut self, value: &Expr, count: &Expr, scope: ScopeId) -> EvalResult {
        let count = match self.eval_expr(count, scope)? {
            Value::Integer(n) if !n.is_negative() => n
                .to_usize()
                .filter(|&len| len <= MAX_SEQUENCE_LEN)
                .ok_or_else(|| {
                    type_mismatch(format!("array size {n} is too large")).with_span(count.span)
                })?,
            other => {
                return Err(type_mismatch(format!(
                    "array size must be a non-negative integer, got {}",
                    other.type_name()
                ))
                .with_span(count.span))
            }
        };
        // Grows as items are built; the body may fail long before `count`.
        let mut items = Vec::with_capacity(count.min(1024));
        for index in 0..count {
            let item = self.with_scope(scope, ScopeOwner::ArrayInit, |frame, init| {
                frame.define(init, "_", Variable::constant(Value::int(index)))?;
                frame.eval_expr(value, init)
            })?;
            items.push(item.clone_shallow());
        }
        Ok(Value::array(items))
    }

    fn eval_composite(&mut self, fields: &[CompositeField], scope: ScopeId) -> EvalResult {
        let composite = Composite::new("Object", Some(prototypes().object.clone()));
        for field in fields {
            let key = match &field.key {
                CompositeKey::Ident(ident) => PropertyKey::String(ident.name.clone()),
                CompositeKey::Str(s, _) => PropertyKey::String(s.clone()),
                CompositeKey::Int(n, _) => PropertyKey::Integer(n.clone()),
                CompositeKey::Computed(expr) => self
                    .eval_expr(expr, scope)?
                    .to_property_key()
                    .map_err(|err| err.with_span(expr.span))?,
            };
            let value = self.eval_expr(&field.value, scope)?;
            composite.insert_unchecked(key, value);
        }
        Ok(Value::Composite(composite))
    }

    /// A call through a selector or index binds `this` to the object the
    /// function was read from.
    fn eval_call(&mut self, callee: &Expr, args: &[Expr], scope: ScopeId, span: Span) -> EvalResult {
        let (func, this) = match &callee.kind {
            ExprKind::Selector { object, name } => {
                let object = self.eval_expr(object, scope)?;
                let func = get_named(&object, &name.name).map_err(|err| err.or_span(callee.span))?;
                (func, Some(object))
            }
            ExprKind::Index { object, index } => {
                let object = self.eval_expr(object, scope)?;
                let key = self.eval_expr(index, scope)?;
                let func = get_property(&object, &key).map_err(|err| err.or_span(callee.span))?;
                (func, Some(object))
            }
            ExprKind::ThisProp(name) => {
                let this = self.lookup_this(scope)?;
                let func = get_named(&this, &name.name)?;
                (func, Some(this))
            }
            _ => (self.eval_expr(callee, scope)?, None),
        };
        if !matches!(func, Value::Func(_)) {
            return Err(not_callable(func.type_name()).with_span(callee.span));
        }
        let args = self.eval_list(args, scope)?;
        self.call_function(&func, this, args, scope, span)
    }

    /// `&&`, `||` and `??` decide on their left operand before the right
    /// one is evaluated; every other operator evaluates both sides.
    fn eval_binary(
        &mut self,
        op: Op,
        left: &Expr,
        right: &Expr,
        scope: ScopeId,
        span: Span,
    ) -> EvalResult {
        let left = self.eval_expr(left, scope)?;
        let short_circuits = match op {
            Op::LogAnd => !left.is_truthy(),
            Op::LogOr => left.is_truthy(),
            Op::LogNull => !matches!(left, Value::Null),
            _ => false,
        };
        if short_circuits {
            return Ok(left);
        }
        let right = self.eval_expr(right, scope)?;
        self.apply_operator(op, &left, Some(right), scope, span)
    }

    /// `a to b [step c]`: an IntRange when every bound is an Integer, a
    /// FloatRange as soon as one is a Float.
    fn eval_range(
        &mut self,
        start: &Expr,
        stop: &Expr,
        step: Option<&Expr>,
        scope: ScopeId,
    ) -> EvalResult {
        let start_value = self.eval_expr(start, scope)?;
        let stop_value = self.eval_expr(stop, scope)?;
        let step_value = match step {
            Some(step) => Some(self.eval_expr(step, scope)?),
            None => None,
        };

        if let (Value::Integer(a), Value::Integer(b)) = (&start_value, &stop_value) {
            let mut range = IntRange::new(a.clone(), b.clone());
            match &step_value {
                None => {}
                Some(Value::Integer(step)) => range.step = step.clone(),
                Some(Value::Float(_)) => {
                    return float_range(&start_value, &stop_value, step_value.as_ref())
                }
                Some(other) => return Err(range_bound_error(other)),
            }
            if range.step.is_zero() {
                return Err(type_mismatch("range step cannot be zero"));
            }
            return Ok(Value::IntRange(Arc::new(range)));
        }
        float_range(&start_value, &stop_value, step_value.as_ref())
    }

    fn eval_slice(
        &mut self,
        object: &Expr,
        low: Option<&Expr>,
        high: Option<&Expr>,
        scope: ScopeId,
    ) -> EvalResult {
        let target = self.eval_expr(object, scope)?;
        let low = self.eval_bound(low, scope)?;
        let high = self.eval_bound(high, scope)?;
        match &target {
            Value::Array(array) => {
                let items = array.snapshot();
                let (start, end) = clamp_bounds(items.len(), low, high);
                Ok(Value::array(items[start..end].to_vec()))
            }
            Value::String(s) => Ok(Value::string(char_slice(s, low, high))),
            Value::Null => Err(property_of_null("slice")),
            other => Err(type_mismatch(format!(
                "cannot slice value of type {}",
                other.type_name()
            ))),
        }
    }

    fn eval_bound(&mut self, bound: Option<&Expr>, scope: ScopeId) -> Result<Option<i64>, EvalError> {
        let Some(expr) = bound else {
            return Ok(None);
        };
        match self.eval_expr(expr, scope)? {
            Value::Integer(n) => Ok(Some(n.to_i64().unwrap_or(if n.is_negative() {
                i64::MIN
            } else {
                i64::MAX
            }))),
            other => Err(type_mismatch(format!(
                "slice bound must be an integer, got {}",
                other.type_name()
            ))
            .with_span(expr.span)),
        }
    }

    /// `do ... end`: the `return` value if one ran, else the last
    /// expression statement's value, else null.
    fn eval_do(&mut self, stmts: &[Stmt], scope: ScopeId) -> EvalResult {
        self.with_scope(scope, ScopeOwner::Do, |frame, body| {
            let mut last = Value::Null;
            for stmt in stmts {
                match frame.exec_stmt(stmt, body)? {
                    Completion::LoneValue(value) => last = value,
                    Completion::Control(ControlFlow::Return(value)) => return Ok(value),
                    Completion::Control(flow) => {
                        return Err(stray_control_flow(&flow, "do block").with_span(stmt.span))
                    }
                    Completion::Void | Completion::Decl(..) => {}
                }
            }
            Ok(last)
        })
    }
}

fn range_bound_error(value: &Value) -> EvalError {
    type_mismatch(format!(
        "range bounds must be numeric, got {}",
        value.type_name()
    ))
}

fn float_range(start: &Value, stop: &Value, step: Option<&Value>) -> EvalResult {
    let a = start.as_f64().ok_or_else(|| range_bound_error(start))?;
    let b = stop.as_f64().ok_or_else(|| range_bound_error(stop))?;
    let mut range = FloatRange::new(a, b);
    if let Some(value) = step {
        range.step = value.as_f64().ok_or_else(|| range_bound_error(value))?;
    }
    if range.step == 0.0 {
        return Err(type_mismatch("range step cannot be zero"));
    }
    Ok(Value::FloatRange(range))
}

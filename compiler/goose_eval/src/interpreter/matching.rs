//! `match` expressions.
//!
//! Arms are tried in source order. Patterns only evaluate their value
//! expressions; bindings collected while matching are introduced together
//! in one `match` frame around the arm body.

use std::sync::Arc;

use goose_ir::ast::{CompositeKey, Expr, MatchArm, Pattern};
use smallvec::SmallVec;

use super::Interpreter;
use crate::environment::{ScopeId, ScopeOwner, Variable};
use crate::errors::{EvalError, EvalResult};
use crate::property::lookup_property;
use crate::value::{PropertyKey, Value};

/// Arms rarely bind more than a handful of names.
type Bindings = SmallVec<[(Arc<str>, Value); 4]>;

impl Interpreter {
    pub(crate) fn eval_match(
        &mut self,
        subject: &Expr,
        arms: &[MatchArm],
        scope: ScopeId,
    ) -> EvalResult {
        let value = self.eval_expr(subject, scope)?;
        for arm in arms {
            let Some(pattern) = &arm.pattern else {
                return self.eval_expr(&arm.body, scope);
            };
            let mut bindings = Bindings::new();
            if !self.match_pattern(pattern, &value, &mut bindings, scope)? {
                continue;
            }
            if bindings.is_empty() {
                return self.eval_expr(&arm.body, scope);
            }
            return self.with_scope(scope, ScopeOwner::Match, |frame, arm_scope| {
                for (name, bound) in bindings {
                    frame.define(arm_scope, name, Variable::mutable(bound))?;
                }
                frame.eval_expr(&arm.body, arm_scope)
            });
        }
        Ok(Value::Null)
    }

    fn match_pattern(
        &mut self,
        pattern: &Pattern,
        value: &Value,
        bindings: &mut Bindings,
        scope: ScopeId,
    ) -> Result<bool, EvalError> {
        match pattern {
            Pattern::Binding(ident) => {
                bindings.push((ident.name.clone(), value.clone()));
                Ok(true)
            }
            Pattern::Paren(inner) => self.match_pattern(inner, value, bindings, scope),
            Pattern::Value(expr) => {
                let expected = self.eval_expr(expr, scope)?;
                match (&expected, value) {
                    (Value::IntRange(range), Value::Integer(n)) => Ok(range.contains(n)),
                    (Value::IntRange(range), Value::Float(x)) => Ok(range.contains_f64(*x)),
                    (Value::FloatRange(range), other) => {
                        Ok(other.as_f64().is_some_and(|x| range.contains(x)))
                    }
                    (Value::IntRange(_), _) => Ok(false),
                    _ => self.values_equal(&expected, value, scope, expr.span),
                }
            }
            Pattern::Tuple(items, _) => {
                let Value::Array(array) = value else {
                    return Ok(false);
                };
                let elements = array.snapshot();
                if elements.len() != items.len() {
                    return Ok(false);
                }
                for (item, element) in items.iter().zip(&elements) {
                    if !self.match_pattern(item, element, bindings, scope)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Pattern::Composite(entries, _) => {
                if matches!(value, Value::Null) {
                    return Ok(false);
                }
                for (key, item) in entries {
                    let key = self.pattern_key(key, scope)?;
                    let Some(property) = lookup_property(value, &key) else {
                        return Ok(false);
                    };
                    if !self.match_pattern(item, &property, bindings, scope)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }

    fn pattern_key(&mut self, key: &CompositeKey, scope: ScopeId) -> Result<PropertyKey, EvalError> {
        match key {
            CompositeKey::Ident(ident) => Ok(PropertyKey::String(ident.name.clone())),
            CompositeKey::Str(s, _) => Ok(PropertyKey::String(s.clone())),
            CompositeKey::Int(n, _) => Ok(PropertyKey::Integer(n.clone())),
            CompositeKey::Computed(expr) => self
                .eval_expr(expr, scope)?
                .to_property_key()
                .map_err(|err| err.with_span(expr.span)),
        }
    }
}

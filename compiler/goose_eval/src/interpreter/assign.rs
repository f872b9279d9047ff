//! Assignment statements.

use std::sync::Arc;

use goose_ir::ast::{Expr, ExprKind};
use goose_ir::{Op, Span};

use super::Interpreter;
use crate::environment::ScopeId;
use crate::errors::{type_mismatch, EvalError, EvalResult};
use crate::property::{get_property, set_property};
use crate::value::Value;

/// Where an assignment writes.
enum Place {
    Var(Arc<str>),
    Property { object: Value, key: Value },
}

impl Interpreter {
    /// `target OP= value`. Plain `=` goes through the operator table too,
    /// so the current value of a variable must exist.
    pub(crate) fn exec_assign(
        &mut self,
        target: &Expr,
        op: Op,
        value: &Expr,
        scope: ScopeId,
        span: Span,
    ) -> Result<(), EvalError> {
        let place = self.resolve_place(target, scope)?;
        let rhs = self.eval_expr(value, scope)?;
        let result = match (&place, op) {
            (Place::Property { .. }, Op::Assign) => rhs,
            _ => {
                let current = self.read_place(&place, scope)?;
                self.apply_operator(op, &current, Some(rhs), scope, span)?
            }
        };
        self.write_place(place, result, scope)
            .map_err(|err| err.or_span(target.span))
    }

    /// `target++` / `target--` on a numeric value.
    pub(crate) fn exec_inc_dec(
        &mut self,
        target: &Expr,
        op: Op,
        scope: ScopeId,
        span: Span,
    ) -> Result<(), EvalError> {
        let place = self.resolve_place(target, scope)?;
        let current = self.read_place(&place, scope)?;
        if !matches!(current, Value::Integer(_) | Value::Float(_)) {
            let verb = if op == Op::Dec { "decrement" } else { "increment" };
            return Err(type_mismatch(format!("cannot {verb} non-numeric value")).with_span(target.span));
        }
        let result = self.apply_operator(op, &current, Some(Value::from(1)), scope, span)?;
        self.write_place(place, result, scope)
            .map_err(|err| err.or_span(target.span))
    }

    fn resolve_place(&mut self, target: &Expr, scope: ScopeId) -> Result<Place, EvalError> {
        match &target.kind {
            ExprKind::Ident(ident) => Ok(Place::Var(ident.name.clone())),
            ExprKind::Selector { object, name } => Ok(Place::Property {
                object: self.eval_expr(object, scope)?,
                key: Value::String(name.name.clone()),
            }),
            ExprKind::Index { object, index } => Ok(Place::Property {
                object: self.eval_expr(object, scope)?,
                key: self.eval_expr(index, scope)?,
            }),
            ExprKind::ThisProp(name) => Ok(Place::Property {
                object: self.lookup_this(scope)?,
                key: Value::String(name.name.clone()),
            }),
            ExprKind::ThisIndex(index) => Ok(Place::Property {
                object: self.lookup_this(scope)?,
                key: self.eval_expr(index, scope)?,
            }),
            ExprKind::Paren(inner) => self.resolve_place(inner, scope),
            _ => Err(type_mismatch("invalid assignment target").with_span(target.span)),
        }
    }

    fn read_place(&self, place: &Place, scope: ScopeId) -> EvalResult {
        match place {
            Place::Var(name) => self.lookup_var(scope, name),
            Place::Property { object, key } => get_property(object, key),
        }
    }

    fn write_place(&mut self, place: Place, value: Value, scope: ScopeId) -> Result<(), EvalError> {
        match place {
            Place::Var(name) => self.assign_var(scope, &name, value),
            Place::Property { object, key } => set_property(&object, &key, value),
        }
    }
}

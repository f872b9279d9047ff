//! Struct declarations, construction, receiver functions and operator
//! overloads.

use std::sync::Arc;

use goose_ir::ast::{Ident, OperatorDecl, StructDecl};

use super::{Completion, Interpreter};
use crate::environment::{CapturedScope, ScopeId, ScopeOwner, Variable};
use crate::errors::{stray_control_flow, type_mismatch, variable_redefinition, EvalError, EvalResult};
use crate::proto::prototypes;
use crate::value::{Composite, CompositeRef, Function, PropertyKey, StructDef, Value};

impl Interpreter {
    /// `struct Name(field = default, ...) [init ... end]`
    pub(crate) fn exec_struct(
        &mut self,
        decl: &Arc<StructDecl>,
        scope: ScopeId,
    ) -> Result<Completion, EvalError> {
        let name = &decl.name;
        if self.scopes.read().is_defined_in_current_scope(scope, &name.name) {
            return Err(variable_redefinition(&name.name).with_span(name.span));
        }

        let mut fields: Vec<Arc<str>> = Vec::with_capacity(decl.fields.len());
        let mut defaults = Vec::with_capacity(decl.fields.len());
        for field in &decl.fields {
            if fields.contains(&field.name.name) {
                return Err(type_mismatch(format!("duplicate field {}", field.name.name))
                    .with_span(field.name.span));
            }
            fields.push(field.name.name.clone());
            defaults.push(match &field.default {
                Some(expr) => Some(self.eval_expr(expr, scope)?),
                None => None,
            });
        }

        let captured = self.capture_scope(scope)?;
        let def = StructDef {
            name: name.name.clone(),
            fields,
            defaults,
            decl: Some(Arc::clone(decl)),
            scope: Some(captured),
            source: self.source.clone(),
            prototype: Composite::new(name.name.clone(), Some(prototypes().object.clone())),
        };
        let constructor = Value::func(Function::constructor(def));
        self.declare(scope, name, constructor.clone(), false)?;
        tracing::trace!(name = %name.name, "struct declared");
        Ok(Completion::Decl(name.name.clone(), constructor))
    }

    /// Build an instance: fields from the arguments or defaults, then the
    /// `init` block with `this` bound to the new object.
    pub(crate) fn construct(&mut self, def: &Arc<StructDef>, args: Vec<Value>) -> EvalResult {
        let instance = Composite::new(def.name.clone(), Some(def.prototype.clone()));
        let mut args = args.into_iter();
        for (field, default) in def.fields.iter().zip(&def.defaults) {
            let value = match args.next() {
                Some(arg) => arg.clone_shallow(),
                None => default.as_ref().map_or(Value::Null, Value::clone_shallow),
            };
            instance.insert_unchecked(PropertyKey::String(field.clone()), value);
        }
        let this = Value::Composite(instance.clone());

        let (Some(decl), Some(scope)) = (&def.decl, def.scope.as_ref().map(CapturedScope::id)) else {
            return Ok(this);
        };
        let Some(init) = &decl.init else {
            return Ok(this);
        };
        self.with_source(def.source.clone(), |interp| {
            interp.with_scope(scope, ScopeOwner::Struct, |frame, init_scope| {
                for field in &def.fields {
                    let value = instance
                        .get_own(&PropertyKey::String(field.clone()))
                        .unwrap_or(Value::Null);
                    frame.define(init_scope, field.clone(), Variable::mutable(value))?;
                }
                frame.define(init_scope, "this", Variable::constant(this.clone()))?;
                match frame.exec_block(init, init_scope)? {
                    Completion::Control(flow) => Err(stray_control_flow(&flow, "struct init")),
                    _ => Ok(()),
                }
            })
        })?;
        Ok(this)
    }

    /// Prototype of the struct named by `receiver`.
    pub(super) fn struct_prototype(&self, receiver: &Ident, scope: ScopeId) -> Result<CompositeRef, EvalError> {
        let proto = match self.lookup_var(scope, &receiver.name)? {
            Value::Func(f) => f.newable().cloned(),
            _ => None,
        };
        proto.ok_or_else(|| {
            type_mismatch(format!("{} is not a type", receiver.name)).with_span(receiver.span)
        })
    }

    /// `fn Recv.name(...)`: install `func` on `Recv`'s prototype.
    pub(crate) fn add_receiver_method(
        &mut self,
        receiver: &Ident,
        name: &Ident,
        func: Value,
        scope: ScopeId,
    ) -> Result<(), EvalError> {
        let proto = self.struct_prototype(receiver, scope)?;
        let key = PropertyKey::String(name.name.clone());
        if proto.has_own(&key) {
            return Err(type_mismatch(format!("duplicate receiver function {}", name.name))
                .with_span(name.span));
        }
        proto.set(key, func)
    }

    /// `operator Recv OP(params) ...`
    pub(crate) fn exec_operator(
        &mut self,
        decl: &Arc<OperatorDecl>,
        scope: ScopeId,
    ) -> Result<(), EvalError> {
        if !decl.op.is_overloadable() {
            return Err(type_mismatch(format!("operator {} cannot be overloaded", decl.op))
                .with_span(decl.span));
        }
        let proto = self.struct_prototype(&decl.receiver, scope)?;
        let func = self.eval_func_lit(&decl.func, scope)?;
        proto.set_operator(decl.op, func);
        tracing::trace!(receiver = %decl.receiver.name, op = %decl.op, "operator overloaded");
        Ok(())
    }
}

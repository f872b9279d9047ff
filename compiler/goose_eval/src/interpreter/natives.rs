//! `native` declarations.
//!
//! A native declaration binds a host value registered for the declaring
//! module under a key built from the declaration's shape:
//!
//! | declaration                     | key               |
//! |---------------------------------|-------------------|
//! | `native const NAME`             | `C/NAME`          |
//! | `native struct NAME(...)`       | `S/NAME`          |
//! | `native fn NAME(...)`           | `F/NAME`          |
//! | `native fn Recv.NAME(...)`      | `F/Recv.NAME`     |
//! | `native operator Recv OP(...)`  | `O/Recv.OP`       |

use goose_ir::ast::NativeDecl;

use super::{Completion, Interpreter};
use crate::environment::ScopeId;
use crate::errors::{native_missing, type_mismatch, EvalError};

/// Registry key of `decl`.
pub(crate) fn native_key(decl: &NativeDecl) -> String {
    match decl {
        NativeDecl::Const(name) => format!("C/{}", name.name),
        NativeDecl::Struct { name, .. } => format!("S/{}", name.name),
        NativeDecl::Func {
            name,
            receiver: None,
            ..
        } => format!("F/{}", name.name),
        NativeDecl::Func {
            name,
            receiver: Some(receiver),
            ..
        } => format!("F/{}.{}", receiver.name, name.name),
        NativeDecl::Operator { receiver, op, .. } => format!("O/{}.{}", receiver.name, op),
    }
}

impl Interpreter {
    pub(crate) fn exec_native(
        &mut self,
        decl: &NativeDecl,
        scope: ScopeId,
    ) -> Result<Completion, EvalError> {
        let module_name = self
            .scopes
            .read()
            .module(scope)
            .map_or_else(|| "<main>".to_string(), |module| module.native_name().to_string());
        let key = native_key(decl);
        let Some(value) = self.natives.get(&module_name, &key) else {
            return Err(native_missing(&key, &module_name));
        };
        tracing::trace!(module = module_name, key, "native bound");

        match decl {
            NativeDecl::Func {
                name,
                receiver: Some(receiver),
                ..
            } => {
                self.add_receiver_method(receiver, name, value, scope)?;
                Ok(Completion::Void)
            }
            NativeDecl::Operator { receiver, op, .. } => {
                if !op.is_overloadable() {
                    return Err(type_mismatch(format!("operator {op} cannot be overloaded"))
                        .with_span(receiver.span));
                }
                let proto = self.struct_prototype(receiver, scope)?;
                proto.set_operator(*op, value);
                Ok(Completion::Void)
            }
            NativeDecl::Const(name)
            | NativeDecl::Struct { name, .. }
            | NativeDecl::Func { name, .. } => {
                self.declare(scope, name, value.clone(), true)?;
                Ok(Completion::Decl(name.name.clone(), value))
            }
        }
    }
}

//! Built-in prototypes.
//!
//! Each builtin type has one frozen prototype composite carrying its
//! string-keyed methods and its operator table. All of them chain to the
//! root `Object` prototype. They are built once per process and shared by
//! every interpreter.

mod array;
mod misc;
mod number;
mod object;
mod string;

pub(crate) use string::char_slice;

use std::sync::OnceLock;

use goose_ir::Op;

use crate::errors::{internal, operator_not_defined, EvalError};
use crate::value::{Composite, CompositeRef, FuncContext, Function, NativeFn, PropertyKey, Value};

pub struct Prototypes {
    pub object: CompositeRef,
    pub integer: CompositeRef,
    pub float: CompositeRef,
    pub string: CompositeRef,
    pub bool: CompositeRef,
    pub null: CompositeRef,
    pub symbol: CompositeRef,
    pub array: CompositeRef,
    pub func: CompositeRef,
    pub range: CompositeRef,
    pub generator: CompositeRef,
}

static PROTOTYPES: OnceLock<Prototypes> = OnceLock::new();

pub fn prototypes() -> &'static Prototypes {
    PROTOTYPES.get_or_init(Prototypes::build)
}

impl Prototypes {
    fn build() -> Self {
        let object = object::build();
        let child = |name: &str| ProtoBuilder::new(name, &object);
        let protos = Prototypes {
            integer: number::build_integer(child("Integer")),
            float: number::build_float(child("Float")),
            string: string::build(child("String")),
            bool: misc::build_bool(child("Bool")),
            null: misc::build_null(child("Null")),
            symbol: misc::build_symbol(child("Symbol")),
            array: array::build(child("Array")),
            func: misc::build_func(child("Func")),
            range: misc::build_range(child("Range")),
            generator: crate::generator::build_prototype(child("Generator")),
            object,
        };
        tracing::trace!("builtin prototypes initialized");
        protos
    }
}

/// Fills one prototype and freezes it.
pub(crate) struct ProtoBuilder {
    proto: CompositeRef,
}

impl ProtoBuilder {
    pub(crate) fn new(name: &str, parent: &CompositeRef) -> Self {
        ProtoBuilder {
            proto: Composite::new(name, Some(parent.clone())),
        }
    }

    pub(crate) fn root(name: &str) -> Self {
        ProtoBuilder {
            proto: Composite::new(name, None),
        }
    }

    #[must_use]
    pub(crate) fn method(self, name: &str, f: NativeFn) -> Self {
        self.proto.insert_unchecked(
            PropertyKey::string(name),
            Value::func(Function::native(name, f)),
        );
        self
    }

    #[must_use]
    pub(crate) fn operator(self, op: Op, f: NativeFn) -> Self {
        self.proto
            .set_operator(op, Value::func(Function::native(op.as_str(), f)));
        self
    }

    pub(crate) fn finish(self) -> CompositeRef {
        self.proto.freeze();
        self.proto
    }
}

/// Error for a binary or unary builtin operator applied to an operand it
/// does not handle.
pub(crate) fn unsupported(ctx: &FuncContext<'_>, op: Op) -> EvalError {
    let right = ctx.args.first().map_or("nothing", Value::type_name);
    operator_not_defined(op.as_str(), ctx.this.type_name(), right)
}

/// A builtin method found a receiver of the wrong type; only reachable by
/// calling a prototype method with an explicit foreign `this`.
pub(crate) fn wrong_receiver(ctx: &FuncContext<'_>, expected: &str) -> EvalError {
    internal(format!(
        "method of {expected} called on {}",
        ctx.this.type_name()
    ))
}

/// Resolve possibly negative `start`/`end` bounds against `len`, clamped.
pub(crate) fn clamp_bounds(len: usize, start: Option<i64>, end: Option<i64>) -> (usize, usize) {
    let len_i = i64::try_from(len).unwrap_or(i64::MAX);
    let resolve = |bound: i64| -> usize {
        let absolute = if bound < 0 { len_i + bound } else { bound };
        usize::try_from(absolute.clamp(0, len_i)).unwrap_or(0)
    };
    let start = start.map_or(0, resolve);
    let end = end.map_or(len, resolve);
    (start, end.max(start))
}

#[cfg(test)]
mod tests;

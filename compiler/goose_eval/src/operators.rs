//! Operator resolution.
//!
//! Operators live in the operator tables of prototype composites. Resolving
//! `op` for a value walks from the value (or its builtin prototype) up the
//! chain; compound tokens (`+=`, `++`, ...) are first mapped to their base
//! operator. Comparison operators a type does not define itself are derived
//! from its `>` and `==`.

use goose_ir::Op;

use crate::errors::{type_mismatch, EvalError};
use crate::value::{CompositeRef, Value};

/// Resolved implementation of an operator for one left operand.
#[derive(Clone, Debug)]
pub enum Operator {
    /// A native or user function, called with the left operand as `this`.
    Func(Value),
    Derived(DerivedOp),
}

/// Operators synthesized from `>` and `==`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DerivedOp {
    /// `!(a > b) && !(a == b)`
    Lt,
    /// `!(a > b)`
    Lte,
    /// `a > b || a == b`
    Gte,
    /// `!(a == b)`
    Neq,
    /// Yields the right-hand side.
    Assign,
}

/// Map a compound token to the operator it applies.
pub fn base_operator(op: Op) -> Op {
    match op {
        Op::AddAssign | Op::Inc => Op::Add,
        Op::SubAssign | Op::Dec => Op::Sub,
        Op::MulAssign => Op::Mul,
        Op::QuoAssign => Op::Quo,
        Op::PowAssign => Op::Pow,
        Op::RemAssign => Op::Rem,
        Op::LogAndAssign => Op::LogAnd,
        Op::LogOrAssign => Op::LogOr,
        Op::LogNullAssign => Op::LogNull,
        Op::BitAndAssign => Op::BitAnd,
        Op::BitOrAssign => Op::BitOr,
        Op::BitXorAssign => Op::BitXor,
        Op::ShlAssign => Op::Shl,
        Op::ShrAssign => Op::Shr,
        other => other,
    }
}

/// Composite where property and operator lookup for `value` begins: the
/// composite itself, or the builtin prototype of a primitive.
pub(crate) fn dispatch_root(value: &Value) -> Option<CompositeRef> {
    match value {
        Value::Composite(c) => Some(c.clone()),
        other => other.prototype(),
    }
}

fn find_in_chain(value: &Value, op: Op) -> Option<Value> {
    let mut current = dispatch_root(value);
    while let Some(composite) = current {
        if let Some(implementation) = composite.operator(op) {
            return Some(implementation);
        }
        current = composite.proto().cloned();
    }
    None
}

/// Resolve `op` for a left operand `value`.
pub fn get_operator(value: &Value, op: Op) -> Option<Operator> {
    let op = base_operator(op);
    if let Some(implementation) = find_in_chain(value, op) {
        return Some(Operator::Func(implementation));
    }

    let has = |needed: Op| find_in_chain(value, needed).is_some();
    let derived = match op {
        Op::Lt if has(Op::Gt) && has(Op::Eq) => DerivedOp::Lt,
        Op::Lte if has(Op::Gt) => DerivedOp::Lte,
        Op::Gte if has(Op::Gt) && has(Op::Eq) => DerivedOp::Gte,
        Op::Neq if has(Op::Eq) => DerivedOp::Neq,
        Op::Assign => DerivedOp::Assign,
        _ => return None,
    };
    Some(Operator::Derived(derived))
}

/// `value is ty`: whether `ty`'s prototype appears on `value`'s chain.
///
/// `ty` is a struct constructor or a prototype composite.
pub fn instance_of(value: &Value, ty: &Value) -> Result<bool, EvalError> {
    let proto = match ty {
        Value::Func(f) => match f.newable() {
            Some(proto) => proto.clone(),
            None => return Err(not_a_type(ty)),
        },
        Value::Composite(c) => c.clone(),
        other => return Err(not_a_type(other)),
    };
    Ok(dispatch_root(value).is_some_and(|root| root.inherits_from(&proto)))
}

fn not_a_type(value: &Value) -> EvalError {
    let name = match value {
        Value::Func(f) => f.display_name().to_string(),
        other => other.type_name().to_string(),
    };
    type_mismatch(format!("{name} is not a type"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_compound_tokens_map_to_base() {
        assert_eq!(base_operator(Op::AddAssign), Op::Add);
        assert_eq!(base_operator(Op::Inc), Op::Add);
        assert_eq!(base_operator(Op::Dec), Op::Sub);
        assert_eq!(base_operator(Op::LogNullAssign), Op::LogNull);
        assert_eq!(base_operator(Op::ShrAssign), Op::Shr);
        assert_eq!(base_operator(Op::Gt), Op::Gt);
    }

    #[test]
    fn test_integer_add_is_native() {
        assert!(matches!(
            get_operator(&Value::from(1), Op::AddAssign),
            Some(Operator::Func(_))
        ));
    }

    #[test]
    fn test_comparisons_derive_from_gt_and_eq() {
        let one = Value::from(1);
        assert!(matches!(
            get_operator(&one, Op::Lt),
            Some(Operator::Derived(DerivedOp::Lt))
        ));
        assert!(matches!(
            get_operator(&one, Op::Neq),
            Some(Operator::Derived(DerivedOp::Neq))
        ));
    }

    #[test]
    fn test_no_ordering_without_gt() {
        // Bool has `==` via Object but no `>`.
        assert!(get_operator(&Value::Bool(true), Op::Lt).is_none());
        assert!(get_operator(&Value::Bool(true), Op::Lte).is_none());
        assert!(matches!(
            get_operator(&Value::Bool(true), Op::Neq),
            Some(Operator::Derived(DerivedOp::Neq))
        ));
    }

    #[test]
    fn test_instance_of_prototype_composite() {
        let object = Value::object([]);
        let proto = Value::Composite(crate::proto::prototypes().object.clone());
        assert!(instance_of(&object, &proto).unwrap_or(false));
        assert!(instance_of(&Value::from(3), &proto).unwrap_or(false));
    }

    #[test]
    fn test_instance_of_rejects_non_types() {
        let err = instance_of(&Value::from(1), &Value::from(2));
        assert!(matches!(err, Err(e) if e.message == "Integer is not a type"));
    }
}

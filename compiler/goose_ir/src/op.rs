//! Operator tokens shared by the parser and the runtime's operator tables.

use std::fmt;

/// Every operator that can appear in an expression, an assignment, or an
/// `operator` overload declaration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    Assign,
    Add,
    Sub,
    Mul,
    Quo,
    Rem,
    Pow,
    Gt,
    Lt,
    Lte,
    Gte,
    Eq,
    Neq,
    Compare,
    Inc,
    Dec,
    Question,
    Shl,
    Shr,
    BitNot,
    BitAnd,
    BitOr,
    BitXor,
    LogAnd,
    LogOr,
    LogNot,
    LogNull,
    Is,
    IsNot,
    AddAssign,
    SubAssign,
    MulAssign,
    QuoAssign,
    RemAssign,
    PowAssign,
    LogAndAssign,
    LogOrAssign,
    LogNullAssign,
    BitAndAssign,
    BitOrAssign,
    BitXorAssign,
    ShlAssign,
    ShrAssign,
}

/// Binding power of the pipeline operator `->`, the loosest binary form.
pub const PIPELINE_PRECEDENCE: u8 = 1;

impl Op {
    pub const fn as_str(self) -> &'static str {
        match self {
            Op::Assign => "=",
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Quo => "/",
            Op::Rem => "%",
            Op::Pow => "**",
            Op::Gt => ">",
            Op::Lt => "<",
            Op::Lte => "<=",
            Op::Gte => ">=",
            Op::Eq => "==",
            Op::Neq => "!=",
            Op::Compare => "<=>",
            Op::Inc => "++",
            Op::Dec => "--",
            Op::Question => "?",
            Op::Shl => "<<",
            Op::Shr => ">>",
            Op::BitNot => "~",
            Op::BitAnd => "&",
            Op::BitOr => "|",
            Op::BitXor => "^",
            Op::LogAnd => "&&",
            Op::LogOr => "||",
            Op::LogNot => "!",
            Op::LogNull => "??",
            Op::Is => "is",
            Op::IsNot => "is not",
            Op::AddAssign => "+=",
            Op::SubAssign => "-=",
            Op::MulAssign => "*=",
            Op::QuoAssign => "/=",
            Op::RemAssign => "%=",
            Op::PowAssign => "**=",
            Op::LogAndAssign => "&&=",
            Op::LogOrAssign => "||=",
            Op::LogNullAssign => "??=",
            Op::BitAndAssign => "&=",
            Op::BitOrAssign => "|=",
            Op::BitXorAssign => "^=",
            Op::ShlAssign => "<<=",
            Op::ShrAssign => ">>=",
        }
    }

    /// Precedence when used as an infix operator, or `None` if the operator
    /// never appears between two operands.
    ///
    /// Higher binds tighter; `->` sits below all of these at
    /// [`PIPELINE_PRECEDENCE`].
    pub const fn binary_precedence(self) -> Option<u8> {
        match self {
            Op::LogNull => Some(2),
            Op::LogOr => Some(3),
            Op::LogAnd => Some(4),
            Op::Eq
            | Op::Neq
            | Op::Lt
            | Op::Gt
            | Op::Lte
            | Op::Gte
            | Op::Compare
            | Op::Is
            | Op::IsNot => Some(5),
            Op::BitOr => Some(6),
            Op::BitXor => Some(7),
            Op::BitAnd => Some(8),
            Op::Shl | Op::Shr => Some(9),
            Op::Add | Op::Sub => Some(10),
            Op::Mul | Op::Quo | Op::Rem => Some(11),
            Op::Pow => Some(12),
            _ => None,
        }
    }

    /// `**` groups to the right; every other infix operator to the left.
    pub const fn is_right_associative(self) -> bool {
        matches!(self, Op::Pow)
    }

    /// Whether a struct may define its own implementation via `operator`.
    pub const fn is_overloadable(self) -> bool {
        matches!(
            self,
            Op::Add
                | Op::Sub
                | Op::Mul
                | Op::Quo
                | Op::Rem
                | Op::Pow
                | Op::Gt
                | Op::Lt
                | Op::Lte
                | Op::Gte
                | Op::Inc
                | Op::Dec
                | Op::Question
                | Op::Shl
                | Op::Shr
                | Op::BitNot
                | Op::BitAnd
                | Op::BitOr
                | Op::BitXor
                | Op::Eq
                | Op::Neq
                | Op::Compare
                | Op::LogNot
        )
    }

    /// Tokens accepted on the left of an assignment statement.
    pub const fn is_assignment(self) -> bool {
        matches!(
            self,
            Op::Assign
                | Op::AddAssign
                | Op::SubAssign
                | Op::MulAssign
                | Op::QuoAssign
                | Op::RemAssign
                | Op::PowAssign
                | Op::LogAndAssign
                | Op::LogOrAssign
                | Op::LogNullAssign
                | Op::BitAndAssign
                | Op::BitOrAssign
                | Op::BitXorAssign
                | Op::ShlAssign
                | Op::ShrAssign
        )
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplicative_binds_tighter_than_additive() {
        let mul = Op::Mul.binary_precedence();
        let add = Op::Add.binary_precedence();
        assert!(mul > add);
        assert!(Op::LogAnd.binary_precedence() > Op::LogOr.binary_precedence());
        assert!(Op::LogOr.binary_precedence() > Op::LogNull.binary_precedence());
    }

    #[test]
    fn test_assignment_tokens_are_not_infix() {
        assert_eq!(Op::AddAssign.binary_precedence(), None);
        assert!(Op::AddAssign.is_assignment());
        assert!(!Op::Add.is_assignment());
    }

    #[test]
    fn test_overloadable_excludes_short_circuit() {
        assert!(Op::Add.is_overloadable());
        assert!(Op::Compare.is_overloadable());
        assert!(!Op::LogAnd.is_overloadable());
        assert!(!Op::LogNull.is_overloadable());
        assert!(!Op::Assign.is_overloadable());
    }
}

//! Property-based tests for arithmetic and string operators.

#![allow(clippy::unwrap_used, reason = "Tests can panic")]
#![allow(
    clippy::doc_markdown,
    clippy::uninlined_format_args,
    reason = "Proptest macros generate code with these patterns"
)]

mod common;

use common::eval;
use goose_eval::Value;
use num_bigint::BigInt;
use proptest::prelude::*;

fn as_int(value: &Value) -> BigInt {
    match value {
        Value::Integer(n) => n.clone(),
        other => panic!("expected an integer, got {other:?}"),
    }
}

fn as_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        other => panic!("expected a bool, got {other:?}"),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Integers are arbitrary precision, so no sum or product wraps.
    #[test]
    fn integer_arithmetic_matches_bigint(a in any::<i64>(), b in any::<i64>()) {
        let sum = eval(&format!("({a}) + ({b})"));
        prop_assert_eq!(as_int(&sum), BigInt::from(a) + BigInt::from(b));
        let product = eval(&format!("({a}) * ({b})"));
        prop_assert_eq!(as_int(&product), BigInt::from(a) * BigInt::from(b));
    }

    #[test]
    fn addition_undoes_subtraction(a in any::<i64>(), b in any::<i64>()) {
        let value = eval(&format!("({a}) - ({b}) + ({b})"));
        prop_assert_eq!(as_int(&value), BigInt::from(a));
    }

    #[test]
    fn exact_division_round_trips(a in -1_000_000_i64..1_000_000, b in 1_i64..1000) {
        let value = eval(&format!("(({a}) * {b}) / {b}"));
        prop_assert_eq!(as_int(&value), BigInt::from(a));
    }

    #[test]
    fn comparison_is_consistent(a in any::<i32>(), b in any::<i32>()) {
        prop_assert_eq!(as_bool(&eval(&format!("({a}) < ({b})"))), a < b);
        prop_assert_eq!(as_bool(&eval(&format!("({a}) >= ({b})"))), a >= b);
        prop_assert_eq!(as_bool(&eval(&format!("({a}) != ({b})"))), a != b);
    }

    #[test]
    fn string_repeat_length(s in "[a-z]{0,8}", n in 0_usize..6) {
        let value = eval(&format!("len(\"{s}\" * {n})"));
        prop_assert_eq!(as_int(&value), BigInt::from(s.len() * n));
    }
}

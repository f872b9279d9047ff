use std::fmt;

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};

use super::Value;

/// `start to stop step step` over integers; `stop` is exclusive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntRange {
    pub start: BigInt,
    pub stop: BigInt,
    pub step: BigInt,
}

impl IntRange {
    /// Range with the default step: 1 ascending, -1 when `stop < start`.
    pub fn new(start: BigInt, stop: BigInt) -> Self {
        let step = if stop < start {
            BigInt::from(-1)
        } else {
            BigInt::from(1)
        };
        IntRange { start, stop, step }
    }

    /// Whether `n` lies between the bounds, in the direction of the step.
    pub fn contains(&self, n: &BigInt) -> bool {
        if self.step.is_negative() {
            *n <= self.start && *n > self.stop
        } else {
            *n >= self.start && *n < self.stop
        }
    }

    pub fn contains_f64(&self, x: f64) -> bool {
        let (Some(start), Some(stop)) = (self.start.to_f64(), self.stop.to_f64()) else {
            return false;
        };
        if self.step.is_negative() {
            x <= start && x > stop
        } else {
            x >= start && x < stop
        }
    }

    /// Bounds as `i64` when all three fit, for the native stepping path.
    pub fn as_i64(&self) -> Option<(i64, i64, i64)> {
        Some((self.start.to_i64()?, self.stop.to_i64()?, self.step.to_i64()?))
    }

    /// Number of values the range yields.
    pub fn len(&self) -> BigInt {
        if self.step.is_zero() {
            return BigInt::zero();
        }
        let span = &self.stop - &self.start;
        if span.is_negative() != self.step.is_negative() || span.is_zero() {
            return BigInt::zero();
        }
        let step = self.step.abs();
        (span.abs() + &step - 1) / step
    }

    pub fn is_empty(&self) -> bool {
        self.len().is_zero()
    }

    /// Values in order, boxed for the iteration engine.
    pub fn values(&self) -> Box<dyn Iterator<Item = Value> + Send> {
        if let Some((start, stop, step)) = self.as_i64() {
            return Box::new(I64Steps {
                next: Some(start),
                stop,
                step,
            });
        }
        let range = self.clone();
        Box::new(
            std::iter::successors(Some(range.start.clone()), move |n| Some(n + &range.step))
                .take_while({
                    let range = self.clone();
                    move |n| range.contains(n)
                })
                .map(Value::Integer),
        )
    }
}

struct I64Steps {
    next: Option<i64>,
    stop: i64,
    step: i64,
}

impl Iterator for I64Steps {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        let current = self.next?;
        let in_range = if self.step < 0 {
            current > self.stop
        } else {
            current < self.stop
        };
        if !in_range || self.step == 0 {
            self.next = None;
            return None;
        }
        self.next = current.checked_add(self.step);
        Some(Value::Integer(BigInt::from(current)))
    }
}

impl fmt::Display for IntRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {} step {}", self.start, self.stop, self.step)
    }
}

/// Range where at least one of the bounds or the step is a float.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloatRange {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl FloatRange {
    pub fn new(start: f64, stop: f64) -> Self {
        let step = if stop < start { -1.0 } else { 1.0 };
        FloatRange { start, stop, step }
    }

    pub fn contains(&self, x: f64) -> bool {
        if self.step < 0.0 {
            x <= self.start && x > self.stop
        } else {
            x >= self.start && x < self.stop
        }
    }

    /// Number of values the range yields.
    pub fn len(&self) -> u64 {
        let steps = (self.stop - self.start) / self.step;
        if !steps.is_finite() || steps <= 0.0 {
            return 0;
        }
        steps.ceil().to_u64().unwrap_or(u64::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn values(&self) -> Box<dyn Iterator<Item = Value> + Send> {
        let range = *self;
        if range.step == 0.0 {
            return Box::new(std::iter::empty());
        }
        // Multiply rather than accumulate so rounding error does not drift.
        Box::new(
            (0_u64..)
                .map(move |i| range.start + range.step * i as f64)
                .take_while(move |x| range.contains(*x))
                .map(Value::Float),
        )
    }
}

impl fmt::Display for FloatRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {} step {}", self.start, self.stop, self.step)
    }
}

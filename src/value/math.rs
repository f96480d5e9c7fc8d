//! `MathContext`: the scale/precision/rounding triple that governs every
//! arithmetic operator. All `+ - * / %` results are rescaled to `ctx.scale`
//! with `ctx.rounding`; division/modulo by zero yields `Null` rather than
//! ever throwing.

use bigdecimal::{BigDecimal, RoundingMode as BdRoundingMode};
use num_traits::Zero;
use serde::{Deserialize, Serialize};

/// Rounding mode, mirrored from `bigdecimal::RoundingMode` so config files
/// can name it without depending on the crate directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    HalfUp,
    HalfEven,
    Up,
    Down,
    Ceiling,
    Floor,
}

impl Default for RoundingMode {
    fn default() -> Self {
        RoundingMode::HalfUp
    }
}

impl From<RoundingMode> for BdRoundingMode {
    fn from(mode: RoundingMode) -> Self {
        match mode {
            RoundingMode::HalfUp => BdRoundingMode::HalfUp,
            RoundingMode::HalfEven => BdRoundingMode::HalfEven,
            RoundingMode::Up => BdRoundingMode::Up,
            RoundingMode::Down => BdRoundingMode::Down,
            RoundingMode::Ceiling => BdRoundingMode::Ceiling,
            RoundingMode::Floor => BdRoundingMode::Floor,
        }
    }
}

/// Governs scale/precision/rounding for every numeric operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathContext {
    pub scale: i64,
    pub precision: u64,
    pub rounding: RoundingMode,
}

impl Default for MathContext {
    fn default() -> Self {
        MathContext {
            scale: 64,
            precision: 0,
            rounding: RoundingMode::HalfUp,
        }
    }
}

impl MathContext {
    /// Rescale a decimal result to this context's scale/rounding. Never
    /// fails; `BigDecimal::with_scale_round` always produces a value.
    pub fn rescale(&self, value: BigDecimal) -> BigDecimal {
        value.with_scale_round(self.scale, self.rounding.into())
    }

    pub fn add(&self, a: &BigDecimal, b: &BigDecimal) -> BigDecimal {
        self.rescale(a + b)
    }

    pub fn sub(&self, a: &BigDecimal, b: &BigDecimal) -> BigDecimal {
        self.rescale(a - b)
    }

    pub fn mul(&self, a: &BigDecimal, b: &BigDecimal) -> BigDecimal {
        self.rescale(a * b)
    }

    /// Division by zero yields `None` (caller maps this to `Value::Null`);
    /// never panics or raises a `Failure`.
    pub fn div(&self, a: &BigDecimal, b: &BigDecimal) -> Option<BigDecimal> {
        if b.is_zero() {
            return None;
        }
        Some(self.rescale(a / b))
    }

    /// Modulo by zero yields `None`, same rule as division.
    pub fn rem(&self, a: &BigDecimal, b: &BigDecimal) -> Option<BigDecimal> {
        if b.is_zero() {
            return None;
        }
        Some(self.rescale(a % b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn bd(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn division_by_zero_is_none() {
        let ctx = MathContext::default();
        assert!(ctx.div(&bd("10"), &bd("0")).is_none());
        assert!(ctx.rem(&bd("10"), &bd("0")).is_none());
    }

    #[test]
    fn associativity_at_fixed_scale() {
        let ctx = MathContext {
            scale: 4,
            precision: 0,
            rounding: RoundingMode::HalfUp,
        };
        let (a, b, c) = (bd("1.1"), bd("2.2"), bd("3.3"));
        let left = ctx.add(&ctx.add(&a, &b), &c);
        let right = ctx.add(&a, &ctx.add(&b, &c));
        assert_eq!(left, right);
    }

    #[test]
    fn identities() {
        let ctx = MathContext::default();
        let x = bd("42.5");
        assert_eq!(ctx.mul(&x, &BigDecimal::zero()), ctx.rescale(BigDecimal::zero()));
        assert_eq!(ctx.add(&x, &BigDecimal::zero()), ctx.rescale(x.clone()));
    }
}

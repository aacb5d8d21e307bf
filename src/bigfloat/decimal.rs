//! Arbitrary-precision decimal arithmetic with an explicit precision and
//! rounding mode, rather than a process-wide default.

use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;

/// Precision (significant decimal places) and rounding mode threaded through
/// every binary op that needs one. Every such op rounds half-up, matching
/// the contract in §4.1: ties round away from zero toward the larger
/// magnitude digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MathContext {
    pub precision: u32,
}

impl MathContext {
    pub fn new(precision: u32) -> Self {
        Self { precision }
    }

    pub fn round(&self, x: Decimal) -> Decimal {
        x.round_dp_with_strategy(self.precision, RoundingStrategy::MidpointAwayFromZero)
    }

    pub fn add(&self, a: Decimal, b: Decimal) -> Decimal {
        self.round(a + b)
    }

    pub fn sub(&self, a: Decimal, b: Decimal) -> Decimal {
        self.round(a - b)
    }

    pub fn mul(&self, a: Decimal, b: Decimal) -> Decimal {
        self.round(a * b)
    }

    pub fn div(&self, a: Decimal, b: Decimal) -> Decimal {
        self.round(a / b)
    }
}

/// `Decimal`'s own scale limit: `Decimal::new(1, d)` panics for `d` beyond
/// this, so callers threading a user-supplied digit count through
/// [`allowed_error`] must clamp to it first.
pub const MAX_PRECISION: u32 = 28;

/// `10^(-d)`, the decimal representation of an allowed-error budget at `d`
/// decimal digits of required accuracy.
pub fn allowed_error(d: u32) -> Decimal {
    Decimal::new(1, d.min(MAX_PRECISION))
}

/// Number of decimal digits required to represent `x` to unit precision,
/// i.e. `ceil(log10(|x|))` clamped to be non-negative.
pub fn decimal_digits(x: Decimal) -> u32 {
    if x.is_zero() {
        return 0;
    }
    let x = x.abs();
    let mut digits = 0u32;
    let mut scale = Decimal::ONE;
    while scale <= x {
        scale *= Decimal::TEN;
        digits += 1;
    }
    digits
}

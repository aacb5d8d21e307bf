//! Extended-range floating point: a (mantissa, decimal-exponent) pair that
//! keeps a value's magnitude separate from its significant digits, so it
//! survives the thousands-of-orders-of-magnitude swings Fox–Glynn's
//! intermediate Poisson terms go through (`e^-lambda * lambda^i / i!` for
//! large `i` underflows `f64` long before the truncated sum does).
//!
//! Invariant: for any non-zero value, `mantissa` has absolute value in
//! `[1, 10)`; zero is represented as `mantissa = 0, exponent = 0`.

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy)]
pub struct ExtendedFloat {
    mantissa: f64,
    exponent: i32,
}

impl ExtendedFloat {
    pub const ZERO: ExtendedFloat = ExtendedFloat {
        mantissa: 0.0,
        exponent: 0,
    };

    pub fn new(mantissa: f64, exponent: i32) -> Self {
        Self { mantissa, exponent }.normalized()
    }

    pub fn from_f64(x: f64) -> Self {
        if x == 0.0 {
            return Self::ZERO;
        }
        let exponent = x.abs().log10().floor() as i32;
        let mantissa = x / 10f64.powi(exponent);
        Self { mantissa, exponent }.normalized()
    }

    /// Collapse back to `f64`. Panics in debug builds if the value is so
    /// extreme it cannot be represented; callers crossing back into native
    /// arithmetic are expected to have already rescaled into a safe range
    /// (e.g. after normalising a Fox–Glynn weight vector by its total).
    pub fn to_f64(self) -> f64 {
        self.mantissa * 10f64.powi(self.exponent)
    }

    pub fn mantissa(self) -> f64 {
        self.mantissa
    }

    pub fn exponent(self) -> i32 {
        self.exponent
    }

    pub fn is_zero(self) -> bool {
        self.mantissa == 0.0
    }

    pub fn is_negative(self) -> bool {
        self.mantissa < 0.0
    }

    fn normalized(self) -> Self {
        if self.mantissa == 0.0 || !self.mantissa.is_finite() {
            return Self::ZERO;
        }
        let mut mantissa = self.mantissa;
        let mut exponent = self.exponent;
        while mantissa.abs() >= 10.0 {
            mantissa /= 10.0;
            exponent += 1;
        }
        while mantissa.abs() < 1.0 {
            mantissa *= 10.0;
            exponent -= 1;
        }
        Self { mantissa, exponent }
    }

    pub fn add(self, other: Self) -> Self {
        if self.is_zero() {
            return other;
        }
        if other.is_zero() {
            return self;
        }
        let (hi, lo) = if self.exponent >= other.exponent {
            (self, other)
        } else {
            (other, self)
        };
        let shift = hi.exponent - lo.exponent;
        if shift > 17 {
            // lo is negligible relative to hi at f64 precision
            return hi;
        }
        let lo_scaled = lo.mantissa / 10f64.powi(shift);
        Self::new(hi.mantissa + lo_scaled, hi.exponent)
    }

    pub fn sub(self, other: Self) -> Self {
        self.add(other.neg())
    }

    pub fn neg(self) -> Self {
        Self {
            mantissa: -self.mantissa,
            exponent: self.exponent,
        }
    }

    pub fn mul(self, other: Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::ZERO;
        }
        Self::new(
            self.mantissa * other.mantissa,
            self.exponent + other.exponent,
        )
    }

    pub fn div(self, other: Self) -> Self {
        assert!(!other.is_zero(), "division by zero ExtendedFloat");
        if self.is_zero() {
            return Self::ZERO;
        }
        Self::new(
            self.mantissa / other.mantissa,
            self.exponent - other.exponent,
        )
    }

    pub fn pow(self, n: i32) -> Self {
        if n == 0 {
            return Self::new(1.0, 0);
        }
        if self.is_zero() {
            return Self::ZERO;
        }
        Self::new(self.mantissa.powi(n), self.exponent * n)
    }

    /// Natural logarithm. Safe even when `self` would overflow/underflow a
    /// native `f64`, since it only needs the mantissa and exponent
    /// separately.
    pub fn ln(self) -> f64 {
        assert!(!self.is_negative() && !self.is_zero(), "ln of non-positive");
        self.mantissa.ln() + self.exponent as f64 * std::f64::consts::LN_10
    }

    /// `e^x` computed directly in extended range, avoiding `f64::exp`
    /// overflow for large `x`.
    pub fn exp(x: f64) -> Self {
        let ln10 = std::f64::consts::LN_10;
        let exponent = (x / ln10).floor();
        let remainder = x - exponent * ln10;
        Self::new(remainder.exp(), exponent as i32)
    }

    /// Square root via the natural-logarithm identity `sqrt(x) = exp(ln(x)/2)`.
    pub fn sqrt(self) -> Self {
        if self.is_zero() {
            return Self::ZERO;
        }
        Self::exp(self.ln() / 2.0)
    }

    pub fn cmp_value(&self, other: &Self) -> Ordering {
        if self.is_zero() && other.is_zero() {
            return Ordering::Equal;
        }
        let sign_a = self.mantissa.signum();
        let sign_b = other.mantissa.signum();
        if sign_a != sign_b {
            return sign_a.partial_cmp(&sign_b).unwrap();
        }
        let by_exponent = self.exponent.cmp(&other.exponent);
        let ordering = if by_exponent == Ordering::Equal {
            self.mantissa.partial_cmp(&other.mantissa).unwrap()
        } else {
            by_exponent
        };
        if sign_a < 0.0 {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

impl PartialEq for ExtendedFloat {
    fn eq(&self, other: &Self) -> bool {
        self.cmp_value(other) == Ordering::Equal
    }
}

impl PartialOrd for ExtendedFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp_value(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn round_trips_through_f64() {
        for x in [1.0, 42.5, 0.001, 1e10, 1e-10] {
            let e = ExtendedFloat::from_f64(x);
            assert_relative_eq!(e.to_f64(), x, max_relative = 1e-9);
        }
    }

    #[test]
    fn survives_extreme_exponents() {
        let tiny = ExtendedFloat::exp(-1000.0);
        let huge = ExtendedFloat::exp(1000.0);
        assert!(tiny.cmp_value(&ExtendedFloat::ZERO) == Ordering::Greater);
        assert!(huge.exponent() > 400);
        let product = tiny.mul(huge);
        assert_relative_eq!(product.ln(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn add_matches_native_in_safe_range() {
        let a = ExtendedFloat::from_f64(3.5);
        let b = ExtendedFloat::from_f64(2.25);
        assert_relative_eq!(a.add(b).to_f64(), 5.75, max_relative = 1e-9);
    }

    #[test]
    fn sqrt_matches_native() {
        let x = ExtendedFloat::from_f64(16.0);
        assert_relative_eq!(x.sqrt().to_f64(), 4.0, max_relative = 1e-9);
    }

    #[test]
    fn ordering_respects_sign_and_magnitude() {
        let a = ExtendedFloat::from_f64(-5.0);
        let b = ExtendedFloat::from_f64(5.0);
        assert!(a.cmp_value(&b) == Ordering::Less);
        assert!(ExtendedFloat::ZERO.cmp_value(&a) == Ordering::Greater);
    }
}

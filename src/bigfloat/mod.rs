//! Arbitrary-precision and extended-range arithmetic.
//!
//! Two abstractions, per different needs:
//!
//! - [`decimal`] wraps [`rust_decimal::Decimal`] behind an explicit
//!   precision+rounding [`MathContext`], for quantities that must be
//!   auditable against κ (e.g. `allowed_error`, `decimal_digits`).
//! - [`extended`] is a hand-rolled (mantissa, decimal-exponent) pair that
//!   survives the thousands-of-orders-of-magnitude underflow/overflow native
//!   `f64`s can't, which is exactly the regime Fox–Glynn's intermediate
//!   Poisson terms live in. No published crate models this representation;
//!   it is implemented here directly.

pub mod decimal;
pub mod extended;

pub use decimal::MathContext;
pub use extended::ExtendedFloat;

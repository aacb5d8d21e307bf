//! ACTMC → DTMC reduction engine.
//!
//! Reduces an Alarm Continuous-Time Markov Chain (a CTMC augmented with at
//! most one non-exponential "alarm" event active per state) to a numerically
//! equivalent discrete-time Markov chain plus a companion reward structure,
//! accurate to a rigorously derived error bound κ. This crate is the
//! reduction core only: parsing, model checking of the produced DTMC, and any
//! simulator or CLI surface are external collaborators.

pub mod bigfloat;
pub mod error;
pub mod foxglynn;
pub mod kappa;
pub mod model;
pub mod output;
pub mod potato;
pub mod reduction;
pub mod settings;
pub mod solver;

pub use error::ReductionError;
pub use reduction::ACTMCReduction;
pub use settings::ReductionSettings;

/// State index into a model's transition matrix.
pub type StateIndex = usize;
/// Transition rate, sojourn time, or other dimensioned non-negative quantity.
pub type Rate = f64;
/// Probability mass, always in `[0, 1]`.
pub type Probability = f64;
/// Accumulated or instantaneous reward, always finite and non-negative.
pub type Reward = f64;
/// Numerical precision budget threaded through Fox–Glynn and the transient
/// solvers.
pub type Kappa = f64;

// uniformisation / Fox-Glynn guard rails
pub(crate) const DEFAULT_UNDERFLOW: f64 = 1e-300;
pub(crate) const DEFAULT_OVERFLOW: f64 = 1e300;

/// Trait for random instance generation, used to build synthetic fixtures in
/// tests without hand-rolling them each time.
pub trait Arbitrary {
    fn random() -> Self;
}

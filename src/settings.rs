//! Caller-supplied settings (§6). A plain struct, not a global/thread-local
//! — precision concerns are threaded explicitly end to end.

use crate::bigfloat::decimal::{allowed_error, MAX_PRECISION};
use crate::error::ReductionError;
use crate::Kappa;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Solver {
    GaussSeidel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReductionSettings {
    /// Global termination error for downstream model checking, ε ∈ (0, 0.5).
    termination_epsilon: f64,
    /// Whether to run the two-stage adaptive κ-derivation (§4.8), or use
    /// `constant_kappa_decimal_digits` directly.
    compute_kappa: bool,
    constant_kappa_decimal_digits: u32,
    solver: Solver,
    computing_steady_state: bool,
}

impl ReductionSettings {
    pub fn new(
        termination_epsilon: f64,
        constant_kappa_decimal_digits: u32,
    ) -> Result<Self, ReductionError> {
        if !(termination_epsilon > 0.0 && termination_epsilon < 0.5) {
            return Err(ReductionError::InvalidModel {
                reason: format!(
                    "termination epsilon must be in (0, 0.5), got {termination_epsilon}"
                ),
            });
        }
        if constant_kappa_decimal_digits < 1 {
            return Err(ReductionError::InvalidModel {
                reason: "constant_kappa_decimal_digits must be >= 1".to_string(),
            });
        }
        if constant_kappa_decimal_digits > MAX_PRECISION {
            return Err(ReductionError::InvalidModel {
                reason: format!(
                    "constant_kappa_decimal_digits must be <= {MAX_PRECISION}, got {constant_kappa_decimal_digits}"
                ),
            });
        }
        Ok(Self {
            termination_epsilon,
            compute_kappa: true,
            constant_kappa_decimal_digits,
            solver: Solver::GaussSeidel,
            computing_steady_state: false,
        })
    }

    pub fn with_compute_kappa(mut self, compute_kappa: bool) -> Self {
        self.compute_kappa = compute_kappa;
        self
    }

    pub fn with_steady_state(mut self, computing_steady_state: bool) -> Self {
        self.computing_steady_state = computing_steady_state;
        self
    }

    pub fn with_solver(mut self, solver: Solver) -> Self {
        self.solver = solver;
        self
    }

    pub fn termination_epsilon(&self) -> f64 {
        self.termination_epsilon
    }

    pub fn compute_kappa(&self) -> bool {
        self.compute_kappa
    }

    pub fn constant_kappa_decimal_digits(&self) -> u32 {
        self.constant_kappa_decimal_digits
    }

    pub fn solver(&self) -> Solver {
        self.solver
    }

    pub fn computing_steady_state(&self) -> bool {
        self.computing_steady_state
    }

    /// `10^(-constant_kappa_decimal_digits)`, the constant κ used either
    /// directly (`compute_kappa == false`) or as the clamp floor for the
    /// adaptive derivation. Goes through the auditable decimal budget rather
    /// than `f64::powi` so the digit count stays exact out to
    /// `MAX_PRECISION` digits.
    pub fn constant_kappa(&self) -> Kappa {
        allowed_error(self.constant_kappa_decimal_digits)
            .to_string()
            .parse()
            .expect("allowed_error always formats as a valid decimal literal")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_epsilon_out_of_range() {
        assert!(ReductionSettings::new(0.0, 5).is_err());
        assert!(ReductionSettings::new(0.5, 5).is_err());
        assert!(ReductionSettings::new(0.6, 5).is_err());
    }

    #[test]
    fn rejects_zero_decimal_digits() {
        assert!(ReductionSettings::new(0.1, 0).is_err());
    }

    #[test]
    fn rejects_decimal_digits_beyond_max_precision() {
        assert!(ReductionSettings::new(0.1, MAX_PRECISION + 1).is_err());
        assert!(ReductionSettings::new(0.1, MAX_PRECISION).is_ok());
    }

    #[test]
    fn constant_kappa_matches_digits() {
        let s = ReductionSettings::new(0.1, 5).unwrap();
        assert!((s.constant_kappa() - 1e-5).abs() < 1e-15);
    }
}

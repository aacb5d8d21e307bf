//! Fox–Glynn truncated Poisson weights (Fox & Glynn, 1988).
//!
//! Given a Poisson rate λ and a required truncation accuracy κ, finds
//! `L <= R` and weights `W[L..=R]` such that the tail mass dropped outside
//! `[L, R]` is at most `κ · T` where `T = ΣW`. Everything below the peak
//! term is computed in [`ExtendedFloat`] because the ratio between the
//! Poisson pmf at the mode and at the window edges can span thousands of
//! orders of magnitude for the λ this crate sees (λ = q·d for potato
//! sojourn times with large uniformisation rates).

use crate::bigfloat::ExtendedFloat;
use crate::error::ReductionError;

pub struct FoxGlynnWeights {
    pub left: usize,
    pub right: usize,
    /// `weights[i]` is the (unnormalised) Poisson weight for index `left + i`.
    pub weights: Vec<f64>,
    pub total: f64,
}

impl FoxGlynnWeights {
    pub fn get(&self, i: usize) -> f64 {
        if i < self.left || i > self.right {
            0.0
        } else {
            self.weights[i - self.left]
        }
    }
}

/// Natural log of `n!`, exact for small `n`, Stirling's series otherwise —
/// avoids computing the factorial itself, which would overflow long before
/// the mode of any λ this crate deals with.
fn ln_factorial(n: u64) -> f64 {
    if n <= 1 {
        return 0.0;
    }
    if n <= 20 {
        return (2..=n).map(|k| (k as f64).ln()).sum();
    }
    let n = n as f64;
    let two_pi = std::f64::consts::TAU;
    n * n.ln() - n + 0.5 * (two_pi * n).ln() + 1.0 / (12.0 * n) - 1.0 / (360.0 * n.powi(3))
}

fn ln_poisson_pmf(lambda: f64, i: u64) -> f64 {
    -lambda + (i as f64) * lambda.ln() - ln_factorial(i)
}

/// Event + entrance context threaded into the error for diagnosability;
/// callers without that context can pass empty/zero.
pub struct FoxGlynnContext<'a> {
    pub event: &'a str,
    pub entrance: crate::StateIndex,
}

pub fn fox_glynn(
    lambda: f64,
    underflow: f64,
    overflow: f64,
    kappa: f64,
    ctx: FoxGlynnContext,
) -> Result<FoxGlynnWeights, ReductionError> {
    assert!(lambda > 0.0, "fox_glynn requires lambda > 0");
    let overflow_err = || ReductionError::NumericOverflow {
        event: ctx.event.to_string(),
        entrance: ctx.entrance,
        kappa,
        underflow,
        overflow,
    };

    let mode = lambda.floor().max(0.0) as u64;
    let peak_ln = if lambda.is_finite() {
        ln_poisson_pmf(lambda, mode)
    } else {
        return Err(overflow_err());
    };
    let peak = ExtendedFloat::exp(peak_ln);
    if peak.is_zero() {
        return Err(overflow_err());
    }

    // Step cap scales with the window a Gaussian approximation would
    // predict (O(sqrt(lambda))), with generous headroom; if we haven't
    // bounded the tail by then lambda is numerically pathological for the
    // requested kappa.
    let step_cap = (50.0 * lambda.sqrt() + 1000.0) as u64;

    let mut weights_by_index: std::collections::BTreeMap<u64, ExtendedFloat> =
        std::collections::BTreeMap::new();
    weights_by_index.insert(mode, peak);

    let mut running_total = peak;
    let tail_threshold = kappa / 2.0;

    // expand right
    let mut right = mode;
    let mut current = peak;
    loop {
        let next_index = right + 1;
        let next = current.mul(ExtendedFloat::from_f64(lambda / next_index as f64));
        if next.is_zero() || next.exponent() < (underflow.log10().floor() as i32) {
            break;
        }
        if next.exponent() > (overflow.log10().floor() as i32) {
            return Err(overflow_err());
        }
        weights_by_index.insert(next_index, next);
        running_total = running_total.add(next);
        right = next_index;
        current = next;
        let ratio = next.to_f64() / running_total.to_f64().max(f64::MIN_POSITIVE);
        if ratio < tail_threshold && (right - mode) as f64 > lambda.sqrt() {
            break;
        }
        if right - mode > step_cap {
            return Err(overflow_err());
        }
    }

    // expand left
    let mut left = mode;
    let mut current = peak;
    while left > 0 {
        let next_index = left - 1;
        let next = current.mul(ExtendedFloat::from_f64(left as f64 / lambda));
        if next.is_zero() {
            break;
        }
        weights_by_index.insert(next_index, next);
        running_total = running_total.add(next);
        left = next_index;
        current = next;
        let ratio = next.to_f64() / running_total.to_f64().max(f64::MIN_POSITIVE);
        if ratio < tail_threshold && (mode - left) as f64 > lambda.sqrt() {
            break;
        }
        if mode - left > step_cap {
            return Err(overflow_err());
        }
    }

    let mut weights = Vec::with_capacity((right - left + 1) as usize);
    for i in left..=right {
        let w = weights_by_index.get(&i).copied().unwrap_or(ExtendedFloat::ZERO);
        weights.push(w.to_f64().max(0.0));
    }
    let total: f64 = weights.iter().sum();

    let window = right - left;
    if window as f64 > 20.0 * lambda.sqrt().max(1.0) {
        log::warn!(
            "fox_glynn: wide window [{left}, {right}] for event `{}` entrance {} at lambda={lambda:.3}",
            ctx.event,
            ctx.entrance,
        );
    }

    Ok(FoxGlynnWeights {
        left: left as usize,
        right: right as usize,
        weights,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> FoxGlynnContext<'static> {
        FoxGlynnContext {
            event: "test",
            entrance: 0,
        }
    }

    #[test]
    fn total_matches_sum_of_weights_exactly() {
        let w = fox_glynn(10.0, 1e-300, 1e300, 1e-10, ctx()).unwrap();
        let sum: f64 = w.weights.iter().sum();
        assert_eq!(sum, w.total);
    }

    #[test]
    fn captures_most_mass_within_window() {
        let w = fox_glynn(5.0, 1e-300, 1e300, 1e-10, ctx()).unwrap();
        assert!(w.total > 1.0 - 1e-6);
        assert!(w.total <= 1.0 + 1e-6);
    }

    #[test]
    fn window_is_centered_near_mode() {
        let lambda = 50.0;
        let w = fox_glynn(lambda, 1e-300, 1e300, 1e-12, ctx()).unwrap();
        assert!(w.left < lambda as usize);
        assert!(w.right > lambda as usize);
    }

    #[test]
    fn small_lambda_still_bounds_tail() {
        let w = fox_glynn(0.5, 1e-300, 1e300, 1e-8, ctx()).unwrap();
        assert!(w.total > 0.99);
    }

    #[test]
    fn tighter_kappa_widens_the_window() {
        let loose = fox_glynn(30.0, 1e-300, 1e300, 1e-3, ctx()).unwrap();
        let tight = fox_glynn(30.0, 1e-300, 1e300, 1e-14, ctx()).unwrap();
        assert!((tight.right - tight.left) >= (loose.right - loose.left));
    }
}

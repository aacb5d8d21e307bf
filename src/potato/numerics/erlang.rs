//! Erlang(k, rate) potato numerics (§4.5): a convolution of `k`
//! exponentials. The number of uniformisation steps elapsed by the time a
//! single `Exp(rate)` clock fires, racing a `Poisson(q)` clock, is
//! Geometric with success probability `p = rate / (q + rate)`; summing `k`
//! iid such clocks makes the step count Negative-Binomial(k, p). This is
//! the closed form of "a weighted sum over Fox–Glynn tables for rate
//! `q/(q+rate)`" (§4.5) — same uniformisation-of-a-race identity, just
//! solved analytically for the Erlang case instead of re-deriving it via
//! repeated Poisson convolution.

use crate::bigfloat::ExtendedFloat;
use crate::error::ReductionError;
use crate::foxglynn::FoxGlynnWeights;
use crate::{Kappa, Rate, StateIndex};

fn ln_binom(n: u64, k: u64) -> f64 {
    fn ln_fact(n: u64) -> f64 {
        (1..=n).map(|x| (x as f64).ln()).sum()
    }
    ln_fact(n) - ln_fact(k) - ln_fact(n - k)
}

pub fn weights(
    q: Rate,
    k: u32,
    rate: Rate,
    kappa: Kappa,
    event: &str,
    entrance: StateIndex,
) -> Result<FoxGlynnWeights, ReductionError> {
    let k = k as u64;
    let p = rate / (q + rate);
    let log_p = p.ln();
    let log_1mp = (1.0 - p).ln();

    let overflow_err = || ReductionError::NumericOverflow {
        event: event.to_string(),
        entrance,
        kappa,
        underflow: crate::DEFAULT_UNDERFLOW,
        overflow: crate::DEFAULT_OVERFLOW,
    };

    // mode of NegBinom(k, p) is floor((k-1)(1-p)/p) for k>1, else 0.
    let mode = if k > 1 {
        (((k - 1) as f64) * (1.0 - p) / p).floor().max(0.0) as u64
    } else {
        0
    };

    let ln_pmf = |i: u64| -> f64 { ln_binom(i + k - 1, k - 1) + (k as f64) * log_p + (i as f64) * log_1mp };

    let mut terms: std::collections::BTreeMap<u64, ExtendedFloat> = std::collections::BTreeMap::new();
    let peak = ExtendedFloat::exp(ln_pmf(mode));
    terms.insert(mode, peak);
    let mut total = peak;

    let step_cap = ((k as f64) * 200.0 / p.max(1e-6) + 10_000.0) as u64;

    let mut right = mode;
    loop {
        let next_index = right + 1;
        let next = ExtendedFloat::exp(ln_pmf(next_index));
        if next.is_zero() {
            break;
        }
        terms.insert(next_index, next);
        total = total.add(next);
        right = next_index;
        let ratio = next.to_f64() / total.to_f64().max(f64::MIN_POSITIVE);
        if ratio < kappa / 2.0 && right > mode {
            break;
        }
        if right - mode > step_cap {
            return Err(overflow_err());
        }
    }

    let mut left = mode;
    while left > 0 {
        let next_index = left - 1;
        let next = ExtendedFloat::exp(ln_pmf(next_index));
        terms.insert(next_index, next);
        total = total.add(next);
        left = next_index;
        let ratio = next.to_f64() / total.to_f64().max(f64::MIN_POSITIVE);
        if ratio < kappa / 2.0 {
            break;
        }
    }

    let mut weights = Vec::with_capacity((right - left + 1) as usize);
    for i in left..=right {
        let w = terms.get(&i).copied().unwrap_or(ExtendedFloat::ZERO);
        weights.push(w.to_f64().max(0.0));
    }
    let total: f64 = weights.iter().sum();

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

    #[test]
    fn negative_binomial_weights_sum_near_one() {
        let w = weights(10.0, 3, 2.0, 1e-10, "e", 0).unwrap();
        assert!(w.total > 0.99 && w.total <= 1.0 + 1e-6);
    }

    #[test]
    fn shape_one_reduces_to_geometric_mode_zero() {
        let w = weights(5.0, 1, 1.0, 1e-8, "e", 0).unwrap();
        assert_eq!(w.left, 0);
    }
}

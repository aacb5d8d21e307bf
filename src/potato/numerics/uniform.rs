//! Uniform(a, b) potato numerics (§4.5): the two-sided cumulative-Poisson
//! formulation, approximated here by integrating the Fox–Glynn kernel
//! against the uniform firing-time density with fixed Gauss–Legendre
//! quadrature rather than evaluating an incomplete-gamma difference in
//! closed form.

use super::quadrature::nodes_and_weights;
use crate::error::ReductionError;
use crate::foxglynn::{fox_glynn, FoxGlynnContext, FoxGlynnWeights};
use crate::{Kappa, Rate, StateIndex};
use std::collections::BTreeMap;

pub fn weights(
    q: Rate,
    a: f64,
    b: f64,
    underflow: f64,
    overflow: f64,
    kappa: Kappa,
    event: &str,
    entrance: StateIndex,
) -> Result<FoxGlynnWeights, ReductionError> {
    let nodes = nodes_and_weights(a.max(f64::MIN_POSITIVE), b.max(f64::MIN_POSITIVE));
    let mut accumulated: BTreeMap<usize, f64> = BTreeMap::new();
    let mut total = 0.0;

    for (t, quad_weight) in nodes {
        let lambda = (q * t).max(f64::MIN_POSITIVE);
        let sample = fox_glynn(
            lambda,
            underflow,
            overflow,
            kappa,
            FoxGlynnContext { event, entrance },
        )?;
        for i in sample.left..=sample.right {
            let w = sample.get(i) * quad_weight;
            *accumulated.entry(i).or_insert(0.0) += w;
            total += w;
        }
    }

    let left = *accumulated.keys().next().unwrap_or(&0);
    let right = *accumulated.keys().last().unwrap_or(&0);
    let mut dense = Vec::with_capacity(right - left + 1);
    for i in left..=right {
        dense.push(*accumulated.get(&i).unwrap_or(&0.0));
    }

    Ok(FoxGlynnWeights {
        left,
        right,
        weights: dense,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadrature_weights_are_nonnegative_and_normalised() {
        let w = weights(5.0, 0.5, 1.5, 1e-300, 1e300, 1e-10, "e", 0).unwrap();
        assert!(w.weights.iter().all(|&x| x >= 0.0));
        assert!(w.total > 0.9 && w.total < 1.1);
    }

    #[test]
    fn degenerates_toward_dirac_as_interval_narrows() {
        let wide = weights(5.0, 0.1, 3.0, 1e-300, 1e300, 1e-10, "e", 0).unwrap();
        let narrow = weights(5.0, 0.99, 1.01, 1e-300, 1e300, 1e-10, "e", 0).unwrap();
        assert!(narrow.right - narrow.left <= wide.right - wide.left);
    }
}

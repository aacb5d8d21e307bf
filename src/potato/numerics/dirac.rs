//! Dirac(d) potato numerics (§4.5): the standard Jensen uniformisation at
//! time `d` — a single Fox–Glynn call at `λ = q·d`.

use crate::foxglynn::{fox_glynn, FoxGlynnContext, FoxGlynnWeights};
use crate::{Kappa, Rate, StateIndex};

pub fn weights(
    q: Rate,
    d: f64,
    underflow: f64,
    overflow: f64,
    kappa: Kappa,
    event: &str,
    entrance: StateIndex,
) -> Result<FoxGlynnWeights, crate::error::ReductionError> {
    let lambda = (q * d).max(f64::MIN_POSITIVE);
    fox_glynn(
        lambda,
        underflow,
        overflow,
        kappa,
        FoxGlynnContext { event, entrance },
    )
}

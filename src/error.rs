//! Typed errors for the reduction core. Construction-time errors (the
//! `Invalid*` and `Unsupported*` variants) are fatal to a reduction attempt.
//! `NumericOverflow` and `Unsolvable` carry enough context (event id,
//! entrance state, κ in effect) for the caller to widen precision and retry.

use crate::{Kappa, StateIndex};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ReductionError {
    #[error("invalid model: {reason}")]
    InvalidModel { reason: String },

    #[error("event `{event}` uses an unsupported distribution ({family}) as an alarm")]
    UnsupportedDistribution { event: String, family: &'static str },

    #[error("event `{event}` is Exponential and cannot be treated as a potato alarm")]
    InvalidPotatoDistribution { event: String },

    #[error(
        "Fox-Glynn truncation for event `{event}` entrance {entrance} could not be bounded within \
         [{underflow:e}, {overflow:e}] at kappa={kappa:e}"
    )]
    NumericOverflow {
        event: String,
        entrance: StateIndex,
        kappa: Kappa,
        underflow: f64,
        overflow: f64,
    },

    #[error("inner DTMC solver failed to converge for event `{event}`: {reason}")]
    Unsolvable { event: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ReductionError>;

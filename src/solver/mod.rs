//! DTMC solver interface (§6): the minimum surface area used during
//! κ-derivation — reach-reward computation via Gauss–Seidel, with support
//! for transient targeting (mutating the target set between calls).

pub mod gauss_seidel;

use crate::error::ReductionError;
use crate::output::Dtmc;
use crate::{Reward, StateIndex};
use std::collections::BTreeSet;

pub trait Solver {
    /// Expected total reward accumulated before first hitting `target`,
    /// from every state. Target states have value 0.
    fn compute_reach_rewards(
        &self,
        dtmc: &Dtmc,
        rewards: &[Reward],
        target: &BTreeSet<StateIndex>,
    ) -> Result<Vec<f64>, ReductionError>;
}

pub use gauss_seidel::GaussSeidel;

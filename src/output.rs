//! The reduction's output: a DTMC, its companion reward vector, and
//! auditability metadata (§6 "the core produces").

use crate::{Kappa, Probability, Rate, Reward, StateIndex};
use std::collections::{BTreeMap, BTreeSet};

/// A discrete-time Markov chain: each row sums to `1 ± 10κ` (§8
/// "Stochasticity").
#[derive(Debug, Clone)]
pub struct Dtmc {
    rows: Vec<BTreeMap<StateIndex, Probability>>,
    uniformisation_rate: Rate,
}

impl Dtmc {
    pub fn new(rows: Vec<BTreeMap<StateIndex, Probability>>, uniformisation_rate: Rate) -> Self {
        Self {
            rows,
            uniformisation_rate,
        }
    }

    pub fn num_states(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, s: StateIndex) -> &BTreeMap<StateIndex, Probability> {
        &self.rows[s]
    }

    pub fn row_mut(&mut self, s: StateIndex) -> &mut BTreeMap<StateIndex, Probability> {
        &mut self.rows[s]
    }

    pub fn uniformisation_rate(&self) -> Rate {
        self.uniformisation_rate
    }

    /// `|Σ row(s) − 1|`, the stochasticity residual tested against `10κ` in
    /// §8.
    pub fn row_residual(&self, s: StateIndex) -> f64 {
        (self.row(s).values().sum::<Probability>() - 1.0).abs()
    }
}

/// Per-event audit record: entrances, expected dwell time θ per entrance,
/// mean exit distribution per entrance, mean accumulated reward per
/// entrance, and the κ in effect when they were computed.
#[derive(Debug, Clone)]
pub struct PotatoSummary {
    pub event: String,
    pub entrances: BTreeSet<StateIndex>,
    pub theta: BTreeMap<StateIndex, f64>,
    pub mean_exit: BTreeMap<StateIndex, BTreeMap<StateIndex, Probability>>,
    pub mean_reward: BTreeMap<StateIndex, Reward>,
    pub kappa: Kappa,
}

/// The full reduction output.
#[derive(Debug, Clone)]
pub struct ReductionOutput {
    pub dtmc: Dtmc,
    pub rewards: Vec<Reward>,
    pub relevant_states: BTreeSet<StateIndex>,
    pub potatoes: BTreeMap<String, PotatoSummary>,
}

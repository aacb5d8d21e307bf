//! Potato DTMC construction (§4.4): a uniformised DTMC restricted to
//! `states ∪ successors`, with successors self-absorbing, under a local
//! re-indexing that keeps the per-potato working set small regardless of
//! the size of the full model.

use crate::model::provider::Model;
use crate::potato::states::PotatoStates;
use crate::{Probability, Rate, StateIndex};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct PotatoDtmc {
    /// `rows[i]` is the uniformised transition row for local state `i`.
    pub rows: Vec<BTreeMap<usize, Probability>>,
    pub act_to_local: BTreeMap<StateIndex, usize>,
    pub local_to_act: Vec<StateIndex>,
    pub q: Rate,
    pub num_states_interior: usize,
}

pub fn build_potato_dtmc(model: &dyn Model, potato: &PotatoStates, q: Rate) -> PotatoDtmc {
    let local_to_act: Vec<StateIndex> = potato
        .states
        .iter()
        .chain(potato.successors.iter())
        .copied()
        .collect();
    let act_to_local: BTreeMap<StateIndex, usize> = local_to_act
        .iter()
        .enumerate()
        .map(|(i, &s)| (s, i))
        .collect();

    let mut rows = Vec::with_capacity(local_to_act.len());
    for (i, &s) in local_to_act.iter().enumerate() {
        let mut row = BTreeMap::new();
        if potato.states.contains(&s) {
            for (&j, &rate) in model.transitions(s) {
                if let Some(&local_j) = act_to_local.get(&j) {
                    *row.entry(local_j).or_insert(0.0) += rate / q;
                }
            }
            let outgoing: Rate = row.values().sum();
            row.insert(i, 1.0 - outgoing);
        } else {
            // successors self-absorb.
            row.insert(i, 1.0);
        }
        rows.push(row);
    }

    PotatoDtmc {
        rows,
        act_to_local,
        local_to_act,
        q,
        num_states_interior: potato.states.len(),
    }
}

impl PotatoDtmc {
    pub fn local(&self, s: StateIndex) -> Option<usize> {
        self.act_to_local.get(&s).copied()
    }

    pub fn size(&self) -> usize {
        self.local_to_act.len()
    }
}

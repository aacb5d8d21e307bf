//! Potato analysis (§4): for a single alarm event, the self-contained
//! sub-region of the model (`states`, `entrances`, `successors`) together
//! with the per-entrance numerics (mean sojourn time, mean exit
//! distribution, mean accumulated reward) needed to collapse it into a
//! handful of DTMC transitions.
//!
//! A `Potato` is immutable once built: re-deriving it at a tighter `kappa`
//! means building a fresh one rather than mutating this one in place, so
//! there is never a stale-numerics state to guard against.

pub mod dtmc;
pub mod numerics;
pub mod states;

use crate::error::ReductionError;
use crate::model::event::Event;
use crate::model::provider::{Model, RewardProvider};
use crate::{Kappa, Rate, StateIndex};
use dtmc::{build_potato_dtmc, PotatoDtmc};
use numerics::{compute_potato_numerics, PotatoNumerics};
use states::{compute_states, PotatoStates};
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
pub struct Potato {
    pub event_id: String,
    pub states: PotatoStates,
    pub dtmc: PotatoDtmc,
    pub numerics: PotatoNumerics,
    pub kappa: Kappa,
}

impl Potato {
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        model: &dyn Model,
        event: &Event,
        target: &BTreeSet<StateIndex>,
        uniformisation_rate: Rate,
        rewards: Option<&dyn RewardProvider>,
        underflow: f64,
        overflow: f64,
        kappa: Kappa,
    ) -> Result<Self, ReductionError> {
        let states = compute_states(model, event, target);
        log::debug!(
            "potato `{}`: {} interior states, {} entrances, {} successors",
            event.id(),
            states.states.len(),
            states.entrances.len(),
            states.successors.len(),
        );
        let dtmc = build_potato_dtmc(model, &states, uniformisation_rate);
        let numerics = compute_potato_numerics(
            model,
            event,
            &states,
            &dtmc,
            rewards,
            underflow,
            overflow,
            kappa,
        )?;
        Ok(Potato {
            event_id: event.id().to_string(),
            states,
            dtmc,
            numerics,
            kappa,
        })
    }

    pub fn entrances(&self) -> &BTreeSet<StateIndex> {
        &self.states.entrances
    }

    pub fn successors(&self) -> &BTreeSet<StateIndex> {
        &self.states.successors
    }

    pub fn theta(&self, entrance: StateIndex) -> Option<f64> {
        self.numerics.theta.get(&entrance).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::actmc::Actmc;
    use crate::model::distribution::Distribution;
    use std::collections::BTreeMap;

    #[test]
    fn build_round_trips_single_state_potato() {
        let mut t = BTreeMap::new();
        t.insert(0, BTreeMap::from([(1, 1.0)]));
        let event = Event::new("alarm", Distribution::Dirac { d: 1.0 }, t).unwrap();
        let rates = vec![BTreeMap::new(), BTreeMap::new()];
        let model = Actmc::new(2, BTreeSet::from([0]), rates, vec![event.clone()]).unwrap();
        let potato = Potato::build(
            &model,
            &event,
            &BTreeSet::new(),
            50.0,
            None,
            1e-300,
            1e300,
            1e-10,
        )
        .unwrap();
        assert_eq!(potato.entrances(), &BTreeSet::from([0]));
        assert_eq!(potato.successors(), &BTreeSet::from([1]));
        assert!(potato.theta(0).unwrap() > 0.0);
    }
}

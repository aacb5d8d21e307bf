//! ACTMC → DTMC reduction (§2–§4.8): the top-level entry point that wires
//! κ-derivation, potato analysis, and assembly into a single call.

pub mod assembly;
pub mod relevant;

use crate::error::ReductionError;
use crate::kappa;
use crate::model::provider::{Model, RewardProvider};
use crate::output::{PotatoSummary, ReductionOutput};
use crate::settings::ReductionSettings;
use crate::{Kappa, StateIndex};
use std::collections::BTreeSet;

/// A single reduction attempt against one (model, rewards, target, mode)
/// tuple. Immutable once constructed: a reduction that has begun producing
/// its DTMC is never mutated (§5).
pub struct ACTMCReduction<'a> {
    model: &'a dyn Model,
    rewards: Option<&'a dyn RewardProvider>,
    target: BTreeSet<StateIndex>,
    settings: ReductionSettings,
}

impl<'a> ACTMCReduction<'a> {
    pub fn new(
        model: &'a dyn Model,
        rewards: Option<&'a dyn RewardProvider>,
        target: BTreeSet<StateIndex>,
        settings: ReductionSettings,
    ) -> Self {
        ACTMCReduction {
            model,
            rewards,
            target,
            settings,
        }
    }

    pub fn reduce(&self) -> Result<ReductionOutput, ReductionError> {
        let kappa = self.derive_kappa()?;
        let assembled = assembly::assemble(
            self.model,
            self.rewards,
            &self.target,
            &self.settings,
            kappa,
        )?;
        let relevant_states = relevant::relevant_states(self.model, &assembled.potatoes);

        let potatoes = assembled
            .potatoes
            .iter()
            .map(|(id, potato)| {
                (
                    id.clone(),
                    PotatoSummary {
                        event: id.clone(),
                        entrances: potato.entrances().clone(),
                        theta: potato.numerics.theta.clone(),
                        mean_exit: potato.numerics.mean_exit.clone(),
                        mean_reward: potato.numerics.mean_reward.clone(),
                        kappa,
                    },
                )
            })
            .collect();

        Ok(ReductionOutput {
            dtmc: assembled.dtmc,
            rewards: assembled.rewards,
            relevant_states,
            potatoes,
        })
    }

    fn derive_kappa(&self) -> Result<Kappa, ReductionError> {
        let floor = self.settings.constant_kappa();
        let digits = self.settings.constant_kappa_decimal_digits();
        if !self.settings.compute_kappa() {
            return Ok(kappa::audit_round(floor, digits));
        }

        let kappa = kappa::derive_kappa(
            self.settings.termination_epsilon(),
            self.settings.computing_steady_state(),
            |trial_kappa| {
                let assembled = assembly::assemble(
                    self.model,
                    self.rewards,
                    &self.target,
                    &self.settings,
                    trial_kappa,
                )?;
                let relevant_states = relevant::relevant_states(self.model, &assembled.potatoes);
                Ok(kappa::Probe {
                    dtmc: assembled.dtmc,
                    rewards: assembled.rewards,
                    relevant_states,
                })
            },
        )?;

        let kappa = kappa.max(floor).min(1.0);
        Ok(kappa::audit_round(kappa, digits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::actmc::Actmc;
    use crate::model::distribution::Distribution;
    use crate::model::event::Event;
    use std::collections::BTreeMap;

    #[test]
    fn pure_ctmc_round_trips_to_plain_uniformisation() {
        let mut rates = vec![BTreeMap::new(), BTreeMap::new()];
        rates[0].insert(1, 2.0);
        let model = Actmc::new(2, BTreeSet::from([0]), rates, vec![]).unwrap();
        let settings = ReductionSettings::new(0.01, 10).unwrap().with_compute_kappa(false);
        let reduction = ACTMCReduction::new(&model, None, BTreeSet::new(), settings);
        let output = reduction.reduce().unwrap();
        assert_eq!(output.dtmc.uniformisation_rate(), 2.0);
        assert!((output.dtmc.row(0).get(&1).copied().unwrap_or(0.0) - 1.0).abs() < 1e-9);
        assert_eq!(output.relevant_states, BTreeSet::from([0, 1]));
    }

    #[test]
    fn constant_kappa_is_used_when_adaptive_disabled() {
        let mut t = BTreeMap::new();
        t.insert(0, BTreeMap::from([(1, 1.0)]));
        let event = Event::new("alarm", Distribution::Dirac { d: 1.0 }, t).unwrap();
        let rates = vec![BTreeMap::new(), BTreeMap::new()];
        let model = Actmc::new(2, BTreeSet::from([0]), rates, vec![event]).unwrap();
        let settings = ReductionSettings::new(0.01, 5)
            .unwrap()
            .with_compute_kappa(false);
        let reduction = ACTMCReduction::new(&model, None, BTreeSet::new(), settings);
        let output = reduction.reduce().unwrap();
        let potato = output.potatoes.get("alarm").unwrap();
        assert!(potato.kappa <= 1e-5 + 1e-15);
    }
}

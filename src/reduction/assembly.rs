//! Reduction assembly (§4.6): stitches per-event potato results into a
//! single uniformised DTMC plus a companion reward vector.

use crate::error::ReductionError;
use crate::model::event::Event;
use crate::model::provider::{Model, RewardProvider};
use crate::output::Dtmc;
use crate::potato::Potato;
use crate::settings::ReductionSettings;
use crate::{Kappa, Rate, Reward, StateIndex};
use std::collections::{BTreeMap, BTreeSet};

pub struct Assembled {
    pub dtmc: Dtmc,
    pub rewards: Vec<Reward>,
    pub potatoes: BTreeMap<String, Potato>,
}

pub fn assemble(
    model: &dyn Model,
    rewards: Option<&dyn RewardProvider>,
    target: &BTreeSet<StateIndex>,
    settings: &ReductionSettings,
    kappa: Kappa,
) -> Result<Assembled, ReductionError> {
    let underflow = crate::DEFAULT_UNDERFLOW;
    let overflow = crate::DEFAULT_OVERFLOW;

    let alarm_events: Vec<&Event> = model.events().iter().filter(|e| !e.is_exponential()).collect();

    // a model with no exponential dynamics at all (every transition gated
    // by an alarm) has max_exit_rate() == 0; uniformising at that rate
    // would make every Fox-Glynn lambda collapse to zero, so floor q at 1.
    let initial_q = model.max_exit_rate().max(1.0);
    let mut q = initial_q;

    let mut potatoes = build_potatoes(model, &alarm_events, target, q, rewards, underflow, overflow, kappa)?;
    for potato in potatoes.values() {
        for &s in potato.entrances() {
            if let Some(theta) = potato.theta(s) {
                if theta > 0.0 {
                    q = q.max(1.0 / theta);
                }
            }
        }
    }

    // θ is itself a function of q (the potato's internal DTMC was
    // uniformised at the old q); if raising q changed any entrance's
    // effective rate above the model's own max exit rate, the potatoes
    // must be rebuilt once more at the final q for consistent numerics.
    if q > initial_q {
        potatoes = build_potatoes(model, &alarm_events, target, q, rewards, underflow, overflow, kappa)?;
    }

    let mut ctmc_rows: Vec<BTreeMap<StateIndex, Rate>> = (0..model.num_states())
        .map(|s| model.transitions(s).clone())
        .collect();

    for potato in potatoes.values() {
        for &s in potato.entrances() {
            let theta = potato.theta(s).unwrap_or(1.0).max(f64::MIN_POSITIVE);
            let rate = 1.0 / theta;
            let mut row = BTreeMap::new();
            if let Some(exit) = potato.numerics.mean_exit.get(&s) {
                for (&j, &p) in exit {
                    row.insert(j, p * rate);
                }
            }
            ctmc_rows[s] = row;
        }
    }

    let dtmc = uniformise(&ctmc_rows, q);
    let reward_vec = build_rewards(model, rewards, &potatoes, settings, q);

    Ok(Assembled {
        dtmc,
        rewards: reward_vec,
        potatoes,
    })
}

#[cfg(feature = "parallel")]
#[allow(clippy::too_many_arguments)]
fn build_potatoes(
    model: &dyn Model,
    alarm_events: &[&Event],
    target: &BTreeSet<StateIndex>,
    q: Rate,
    rewards: Option<&dyn RewardProvider>,
    underflow: f64,
    overflow: f64,
    kappa: Kappa,
) -> Result<BTreeMap<String, Potato>, ReductionError> {
    use rayon::prelude::*;
    alarm_events
        .par_iter()
        .map(|event| {
            Potato::build(model, event, target, q, rewards, underflow, overflow, kappa)
                .map(|potato| (event.id().to_string(), potato))
        })
        .collect()
}

#[cfg(not(feature = "parallel"))]
#[allow(clippy::too_many_arguments)]
fn build_potatoes(
    model: &dyn Model,
    alarm_events: &[&Event],
    target: &BTreeSet<StateIndex>,
    q: Rate,
    rewards: Option<&dyn RewardProvider>,
    underflow: f64,
    overflow: f64,
    kappa: Kappa,
) -> Result<BTreeMap<String, Potato>, ReductionError> {
    let mut potatoes = BTreeMap::new();
    for event in alarm_events {
        let potato = Potato::build(model, event, target, q, rewards, underflow, overflow, kappa)?;
        potatoes.insert(event.id().to_string(), potato);
    }
    Ok(potatoes)
}

fn uniformise(ctmc_rows: &[BTreeMap<StateIndex, Rate>], q: Rate) -> Dtmc {
    let mut rows = Vec::with_capacity(ctmc_rows.len());
    for (i, row) in ctmc_rows.iter().enumerate() {
        let mut drow = BTreeMap::new();
        let mut outgoing = 0.0;
        for (&j, &rate) in row {
            if j == i {
                continue;
            }
            let p = rate / q;
            outgoing += p;
            drow.insert(j, p);
        }
        drow.insert(i, (1.0 - outgoing).max(0.0));
        rows.push(drow);
    }
    Dtmc::new(rows, q)
}

fn build_rewards(
    model: &dyn Model,
    rewards: Option<&dyn RewardProvider>,
    potatoes: &BTreeMap<String, Potato>,
    settings: &ReductionSettings,
    q: Rate,
) -> Vec<Reward> {
    let n = model.num_states();
    let mut reward_vec = vec![0.0; n];
    let Some(rp) = rewards else {
        return reward_vec;
    };

    for (s, r) in reward_vec.iter_mut().enumerate() {
        *r = if settings.computing_steady_state() {
            rp.state_reward(s)
        } else {
            rp.state_reward(s) / q
        };
    }

    for potato in potatoes.values() {
        for (&s, &mean_reward) in &potato.numerics.mean_reward {
            let theta = potato.theta(s).unwrap_or(1.0).max(f64::MIN_POSITIVE);
            if settings.computing_steady_state() {
                reward_vec[s] = mean_reward / theta;
            } else {
                reward_vec[s] += mean_reward / (theta * q);
            }
        }
    }

    reward_vec
}

//! Per-distribution potato numerics (§4.5): mean sojourn time, mean exit
//! distribution, and mean accumulated reward for each potato entrance.
//!
//! All three share one forward propagation through the potato's uniformised
//! DTMC, driven by Fox–Glynn-shaped weights (whichever distribution family
//! produced them): a "time-profile" weight `w'_i = (1 − Σ_{j≤i} w_j/T) / q`
//! for the tail-sum quantities (mean time, mean reward), and the raw
//! `w_i/T` for the at-firing-time quantity (exit distribution).

pub mod dirac;
pub mod erlang;
pub mod quadrature;
pub mod uniform;

use crate::error::ReductionError;
use crate::foxglynn::FoxGlynnWeights;
use crate::model::distribution::Distribution;
use crate::model::event::Event;
use crate::model::provider::{Model, RewardProvider};
use crate::potato::dtmc::PotatoDtmc;
use crate::potato::states::PotatoStates;
use crate::{Kappa, Probability, Reward, StateIndex};
use std::collections::BTreeMap;

/// One step of `v_next[j] = Σ_i v[i] * P[i][j]`, i.e. `vᵀP`: propagates a
/// probability distribution forward through the DTMC. Drives the mean-time
/// and exit-distribution accumulation, where `v` starts as the point mass at
/// the entrance and each step moves it one transition further.
pub fn vm_mult(v: &[Probability], dtmc: &PotatoDtmc) -> Vec<Probability> {
    let mut next = vec![0.0; dtmc.size()];
    for (i, row) in dtmc.rows.iter().enumerate() {
        let vi = v[i];
        if vi == 0.0 {
            continue;
        }
        for (&j, &p) in row {
            next[j] += vi * p;
        }
    }
    next
}

/// One step of `v_next[i] = Σ_j P[i][j] * v[j]`, i.e. `Pv`: propagates a
/// value function forward, the reading needed for mean accumulated reward
/// (§4.5(3)). Not the same linear map as [`vm_mult`] unless `P` is
/// symmetric — `r` must use this one, not `vm_mult`.
pub fn mv_mult(v: &[Probability], dtmc: &PotatoDtmc) -> Vec<Probability> {
    let mut next = vec![0.0; dtmc.size()];
    for (i, row) in dtmc.rows.iter().enumerate() {
        let mut total = 0.0;
        for (&j, &p) in row {
            total += p * v[j];
        }
        next[i] = total;
    }
    next
}

#[derive(Debug, Clone, Default)]
pub struct PotatoNumerics {
    pub theta: BTreeMap<StateIndex, f64>,
    pub mean_exit: BTreeMap<StateIndex, BTreeMap<StateIndex, Probability>>,
    pub mean_reward: BTreeMap<StateIndex, Reward>,
}

fn weight_at(fw: &FoxGlynnWeights, i: usize) -> f64 {
    if i < fw.left || i > fw.right {
        0.0
    } else {
        fw.get(i)
    }
}

/// One entrance's contribution to [`PotatoNumerics`]: θ, the mean exit
/// distribution, and (if a reward provider was supplied) the mean
/// accumulated reward. Computed independently of every other entrance — a
/// pure function of `(potato, entrance, kappa)` — so entrances can be farmed
/// out across a worker pool behind the `parallel` feature (§5, §10.5)
/// without any shared mutable state to coordinate.
struct EntranceNumerics {
    entrance: StateIndex,
    theta: f64,
    exit: BTreeMap<StateIndex, Probability>,
    reward: Option<Reward>,
}

#[allow(clippy::too_many_arguments)]
fn compute_entrance_numerics(
    event: &Event,
    potato: &PotatoStates,
    dtmc: &PotatoDtmc,
    rewards: Option<&dyn RewardProvider>,
    underflow: f64,
    overflow: f64,
    kappa: Kappa,
    entrance: StateIndex,
) -> Result<Option<EntranceNumerics>, ReductionError> {
    let Some(local) = dtmc.local(entrance) else {
        return Ok(None);
    };
    let q = dtmc.q;

    let fw = fox_glynn_weights_for(event, dtmc, entrance, underflow, overflow, kappa)?;
    let total = fw.total.max(f64::MIN_POSITIVE);

    let mut v = vec![0.0; dtmc.size()];
    v[local] = 1.0;

    let mut r = vec![0.0; dtmc.size()];
    if let Some(rp) = rewards {
        for i in 0..dtmc.num_states_interior {
            r[i] = rp.state_reward(dtmc.local_to_act[i]);
        }
    }

    let mut mean_time_vec = vec![0.0; dtmc.size()];
    let mut reward_vec = vec![0.0; dtmc.size()];
    let mut exit_vec = vec![0.0; dtmc.size()];
    let mut cumw = 0.0;

    for i in 0..=fw.right {
        let w_i = weight_at(&fw, i) / total;
        cumw += w_i;
        let coeff = (1.0 - cumw) / q;
        for j in 0..dtmc.size() {
            mean_time_vec[j] += coeff * v[j];
            reward_vec[j] += coeff * r[j];
            exit_vec[j] += w_i * v[j];
        }
        if i < fw.right {
            v = vm_mult(&v, dtmc);
            r = mv_mult(&r, dtmc);
        }
    }

    let theta: f64 = mean_time_vec[..dtmc.num_states_interior].iter().sum();

    // distBeforeEvent: redistribute residual interior mass through the
    // event's own transition distribution; successor mass is already where
    // it needs to be.
    let mut successor_exit = vec![0.0; dtmc.size()];
    for i in 0..dtmc.size() {
        let mass = exit_vec[i];
        if mass <= 0.0 {
            continue;
        }
        let act_i = dtmc.local_to_act[i];
        if potato.successors.contains(&act_i) {
            successor_exit[i] += mass;
        } else if let Some(dist) = event.transition(act_i) {
            for (&j_act, &p) in dist {
                if let Some(j_local) = dtmc.local(j_act) {
                    successor_exit[j_local] += mass * p;
                }
            }
        }
    }
    let exit_total: f64 = successor_exit.iter().sum();
    let mut exit = BTreeMap::new();
    for (i, &act) in dtmc.local_to_act.iter().enumerate() {
        let mass = successor_exit[i];
        if mass > 0.0 && potato.successors.contains(&act) {
            exit.insert(act, mass / exit_total.max(f64::MIN_POSITIVE));
        }
    }

    let reward = rewards.map(|rp| {
        let mut reward_scalar: f64 = reward_vec[local];
        for i in 0..dtmc.num_states_interior {
            let mass = exit_vec[i];
            if mass <= 0.0 {
                continue;
            }
            let act_i = dtmc.local_to_act[i];
            if let Some(dist) = event.transition(act_i) {
                let tr_rewards = rp.event_transition_rewards(act_i);
                for (&j_act, &p) in dist {
                    let tr = tr_rewards.get(&j_act).copied().unwrap_or(0.0);
                    reward_scalar += mass * p * tr;
                }
            }
        }
        reward_scalar
    });

    Ok(Some(EntranceNumerics {
        entrance,
        theta,
        exit,
        reward,
    }))
}

#[cfg(feature = "parallel")]
fn entrance_results(
    event: &Event,
    potato: &PotatoStates,
    dtmc: &PotatoDtmc,
    rewards: Option<&dyn RewardProvider>,
    underflow: f64,
    overflow: f64,
    kappa: Kappa,
) -> Result<Vec<Option<EntranceNumerics>>, ReductionError> {
    use rayon::prelude::*;
    potato
        .entrances
        .par_iter()
        .map(|&entrance| {
            compute_entrance_numerics(event, potato, dtmc, rewards, underflow, overflow, kappa, entrance)
        })
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn entrance_results(
    event: &Event,
    potato: &PotatoStates,
    dtmc: &PotatoDtmc,
    rewards: Option<&dyn RewardProvider>,
    underflow: f64,
    overflow: f64,
    kappa: Kappa,
) -> Result<Vec<Option<EntranceNumerics>>, ReductionError> {
    potato
        .entrances
        .iter()
        .map(|&entrance| {
            compute_entrance_numerics(event, potato, dtmc, rewards, underflow, overflow, kappa, entrance)
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
pub fn compute_potato_numerics(
    _model: &dyn Model,
    event: &Event,
    potato: &PotatoStates,
    dtmc: &PotatoDtmc,
    rewards: Option<&dyn RewardProvider>,
    underflow: f64,
    overflow: f64,
    kappa: Kappa,
) -> Result<PotatoNumerics, ReductionError> {
    let mut numerics = PotatoNumerics::default();
    for result in entrance_results(event, potato, dtmc, rewards, underflow, overflow, kappa)? {
        let Some(r) = result else { continue };
        numerics.theta.insert(r.entrance, r.theta);
        numerics.mean_exit.insert(r.entrance, r.exit);
        if let Some(reward) = r.reward {
            numerics.mean_reward.insert(r.entrance, reward);
        }
    }
    Ok(numerics)
}

fn fox_glynn_weights_for(
    event: &Event,
    dtmc: &PotatoDtmc,
    entrance: StateIndex,
    underflow: f64,
    overflow: f64,
    kappa: Kappa,
) -> Result<FoxGlynnWeights, ReductionError> {
    let q = dtmc.q;
    match event.distribution() {
        Distribution::Dirac { d } => {
            dirac::weights(q, d, underflow, overflow, kappa, event.id(), entrance)
        }
        Distribution::Erlang { k, rate } => {
            erlang::weights(q, k, rate, kappa, event.id(), entrance)
        }
        Distribution::Uniform { a, b } => {
            uniform::weights(q, a, b, underflow, overflow, kappa, event.id(), entrance)
        }
        Distribution::Exponential { .. } => Err(ReductionError::InvalidPotatoDistribution {
            event: event.id().to_string(),
        }),
        other => Err(ReductionError::UnsupportedDistribution {
            event: event.id().to_string(),
            family: other.family(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::actmc::Actmc;
    use crate::model::distribution::Distribution;
    use crate::potato::states::compute_states;
    use std::collections::{BTreeMap as Map, BTreeSet};

    #[test]
    fn single_state_dirac_exit_distribution_sums_to_one() {
        let mut t = Map::new();
        t.insert(0, Map::from([(1, 1.0)]));
        let event = Event::new("alarm", Distribution::Dirac { d: 1.0 }, t).unwrap();
        let rates = vec![Map::new(), Map::new()];
        let model = Actmc::new(2, BTreeSet::from([0]), rates, vec![event.clone()]).unwrap();
        let potato = compute_states(&model, &event, &BTreeSet::new());
        let dtmc = crate::potato::dtmc::build_potato_dtmc(&model, &potato, 50.0);
        let numerics =
            compute_potato_numerics(&model, &event, &potato, &dtmc, None, 1e-300, 1e300, 1e-10)
                .unwrap();
        let exit = numerics.mean_exit.get(&0).unwrap();
        let total: f64 = exit.values().sum();
        assert!((total - 1.0).abs() < 1e-6);
        assert!(numerics.theta.get(&0).copied().unwrap_or(0.0) > 0.0);
    }

    #[test]
    fn single_state_dirac_theta_matches_firing_time() {
        let mut t = Map::new();
        t.insert(0, Map::from([(1, 1.0)]));
        let event = Event::new("alarm", Distribution::Dirac { d: 2.0 }, t).unwrap();
        let rates = vec![Map::new(), Map::new()];
        let model = Actmc::new(2, BTreeSet::from([0]), rates, vec![event.clone()]).unwrap();
        let potato = compute_states(&model, &event, &BTreeSet::new());
        let q = 50.0;
        let dtmc = crate::potato::dtmc::build_potato_dtmc(&model, &potato, q);
        let numerics =
            compute_potato_numerics(&model, &event, &potato, &dtmc, None, 1e-300, 1e300, 1e-10)
                .unwrap();
        let theta = numerics.theta.get(&0).copied().unwrap();
        assert!((theta - 2.0).abs() < 0.05);
    }

    #[test]
    fn mean_reward_is_per_entrance_not_shared_across_interior_states() {
        use crate::model::reward::RewardStructure;

        // Interior {0, 1}, both potato entrances, both absorbed into exit
        // state 2 by the alarm. State 0 carries reward 10, state 1 carries
        // reward 0: entering at 0 must accrue strictly more mean reward than
        // entering at 1.
        let mut t = Map::new();
        t.insert(0, Map::from([(2, 1.0)]));
        t.insert(1, Map::from([(2, 1.0)]));
        let event = Event::new("alarm", Distribution::Dirac { d: 1.0 }, t).unwrap();
        let rates = vec![Map::new(), Map::new(), Map::new()];
        let model = Actmc::new(3, BTreeSet::from([0, 1]), rates, vec![event.clone()]).unwrap();
        let rewards = RewardStructure::new(vec![10.0, 0.0, 0.0]).unwrap();

        let potato = compute_states(&model, &event, &BTreeSet::new());
        let dtmc = crate::potato::dtmc::build_potato_dtmc(&model, &potato, 50.0);
        let numerics = compute_potato_numerics(
            &model,
            &event,
            &potato,
            &dtmc,
            Some(&rewards),
            1e-300,
            1e300,
            1e-10,
        )
        .unwrap();

        let reward_at_0 = numerics.mean_reward.get(&0).copied().unwrap();
        let reward_at_1 = numerics.mean_reward.get(&1).copied().unwrap();
        assert!(
            reward_at_0 > reward_at_1,
            "reward_at_0={reward_at_0}, reward_at_1={reward_at_1}"
        );
        assert!(reward_at_1.abs() < 1e-6, "reward_at_1={reward_at_1}");
    }

    #[test]
    fn exponential_as_alarm_is_invalid_not_unsupported() {
        let mut t = Map::new();
        t.insert(0, Map::from([(1, 1.0)]));
        let event = Event::new("alarm", Distribution::Exponential { rate: 1.0 }, t).unwrap();
        let rates = vec![Map::new(), Map::new()];
        let model = Actmc::new(2, BTreeSet::new(), rates, vec![]).unwrap();
        let potato = compute_states(&model, &event, &BTreeSet::new());
        let dtmc = crate::potato::dtmc::build_potato_dtmc(&model, &potato, 50.0);
        let err =
            compute_potato_numerics(&model, &event, &potato, &dtmc, None, 1e-300, 1e300, 1e-10)
                .unwrap_err();
        assert!(matches!(
            err,
            ReductionError::InvalidPotatoDistribution { .. }
        ));
    }
}

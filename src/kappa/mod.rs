//! κ-derivation (§4.8): a two-stage adaptive precision computation that
//! guarantees ε-accuracy of the downstream reduction. Stage 1 probes a
//! coarse seed DTMC at `κ = 10⁻²⁰` to bound expected steps and total
//! reward; stage 2 rebuilds the DTMC at the stage-1 candidates and asks
//! the inner solver for tight empirical bounds, from which the final κ is
//! derived.

use crate::error::ReductionError;
use crate::output::Dtmc;
use crate::solver::{GaussSeidel, Solver};
use crate::{Kappa, Reward, StateIndex};
use std::collections::BTreeSet;

const SEED_KAPPA: Kappa = 1e-20;
const STAGE_ONE_EPSILON: f64 = 0.1;

/// What a trial DTMC build needs to report back for κ probing.
pub struct Probe {
    pub dtmc: Dtmc,
    pub rewards: Vec<Reward>,
    pub relevant_states: BTreeSet<StateIndex>,
}

/// Derives the κ to use for the final reduction build.
///
/// `build` constructs a trial reduction at a given κ; it is supplied by the
/// caller (the reduction assembly owns the model/rewards/target the probe
/// needs) so this module stays agnostic of the reduction's internals.
pub fn derive_kappa<F>(
    termination_epsilon: f64,
    computing_steady_state: bool,
    mut build: F,
) -> Result<Kappa, ReductionError>
where
    F: FnMut(Kappa) -> Result<Probe, ReductionError>,
{
    log::debug!("kappa: stage 1 seed build at kappa={SEED_KAPPA:e}");
    let seed = build(SEED_KAPPA)?;
    let n = seed.relevant_states.len().max(1) as f64;

    let min_prob = min_transition_probability(&seed.dtmc, &seed.relevant_states);
    let max_rew = max_state_reward(&seed.rewards, &seed.relevant_states);

    // preserved verbatim from the source: `maxRew + kappa`, not `- kappa`
    // (see the open-question note in the design ledger).
    let max_rew = max_rew + SEED_KAPPA;

    let base_kappa_1 = (min_prob / 2.0).max(f64::MIN_POSITIVE);
    let base_kappa_2 = base_kappa_1.min(max_rew).max(f64::MIN_POSITIVE);

    let max_expected_steps = n / base_kappa_1.powf(n);
    let max_expected_tr = max_expected_steps * max_rew;

    let b = 1.0 / (2.0 * max_expected_steps * n);

    let kappa_steps = base_kappa_1
        .min(b)
        .min(STAGE_ONE_EPSILON / (2.0 * max_expected_steps * (max_expected_steps * n + 1.0)));
    let kappa_tr = base_kappa_2
        .min(b)
        .min(STAGE_ONE_EPSILON / (2.0 * max_expected_steps * (max_expected_tr * n + 1.0)));

    let probe_steps = build(kappa_steps)?;
    let probe_tr = build(kappa_tr)?;

    let solver = GaussSeidel::new(termination_epsilon.min(1e-6));
    let (min_time, max_time, max_steps, max_tr) =
        empirical_bounds(&solver, &probe_steps, &probe_tr)?;

    let kappa = if computing_steady_state {
        let denom_scale = max_time.max(max_tr);
        let numerator = min_time.powi(2) * termination_epsilon / n;
        let denom = denom_scale * (termination_epsilon / n + 2.0) * (n * denom_scale + 1.0);
        kappa_steps
            .min(kappa_tr)
            .min(numerator / denom.max(f64::MIN_POSITIVE))
    } else {
        kappa_steps
            .min(kappa_tr)
            .min(1.0 / (2.0 * n * max_steps))
            .min(termination_epsilon / (2.0 * max_steps * (max_tr * n + 1.0)))
    } * termination_epsilon;

    let kappa = kappa.clamp(f64::MIN_POSITIVE, 1.0);
    let digits = kappa_decimal_digits(kappa);
    log::info!(
        "kappa: derived kappa={kappa:e} (steps={kappa_steps:e}, tr={kappa_tr:e}, auditable to {digits} decimal digits)"
    );
    Ok(kappa)
}

/// Decimal digits of precision the derived κ is auditable to, using the
/// same arbitrary-precision representation as the rest of the numeric core
/// (§4.1) rather than trusting `f64`'s own notion of significant digits.
pub fn kappa_decimal_digits(kappa: Kappa) -> u32 {
    use crate::bigfloat::decimal::decimal_digits;
    use rust_decimal::Decimal;
    Decimal::try_from(1.0 / kappa)
        .map(decimal_digits)
        .unwrap_or(0)
}

/// Rounds `kappa` through the auditable decimal context at `decimal_digits`
/// digits of precision, so the final value handed back to the reduction is
/// provably representable to that many digits rather than whatever `f64`
/// happens to carry. κ can underflow `Decimal`'s representable range (as
/// low as `f64::MIN_POSITIVE`), so a conversion failure just passes `kappa`
/// through unrounded.
pub fn audit_round(kappa: Kappa, decimal_digits: u32) -> Kappa {
    use crate::bigfloat::decimal::MathContext;
    use rust_decimal::Decimal;

    let Ok(as_decimal) = Decimal::try_from(kappa) else {
        return kappa;
    };
    let ctx = MathContext::new(decimal_digits.min(crate::bigfloat::decimal::MAX_PRECISION));
    ctx.round(as_decimal)
        .to_string()
        .parse()
        .unwrap_or(kappa)
}

fn min_transition_probability(dtmc: &Dtmc, relevant: &BTreeSet<StateIndex>) -> f64 {
    let mut min_prob = 1.0;
    let mut found = false;
    for &s in relevant {
        for &p in dtmc.row(s).values() {
            if p > 0.0 {
                min_prob = min_prob.min(p);
                found = true;
            }
        }
    }
    if found {
        min_prob
    } else {
        1.0
    }
}

fn max_state_reward(rewards: &[Reward], relevant: &BTreeSet<StateIndex>) -> f64 {
    relevant
        .iter()
        .map(|&s| rewards.get(s).copied().unwrap_or(0.0))
        .fold(0.0, f64::max)
        .max(1.0 / 1e20) // degenerate fallback: no rewards present (§4.9 "maxTR→1").
}

fn empirical_bounds(
    solver: &GaussSeidel,
    probe_steps: &Probe,
    probe_tr: &Probe,
) -> Result<(f64, f64, f64, f64), ReductionError> {
    let unit_rewards = vec![1.0; probe_steps.dtmc.num_states()];
    let mut min_time = f64::MAX;
    let mut max_time: f64 = 0.0;
    let mut max_steps: f64 = 1.0;

    for &target_state in &probe_steps.relevant_states {
        let target: BTreeSet<StateIndex> = BTreeSet::from([target_state]);
        let values = solver.compute_reach_rewards(&probe_steps.dtmc, &unit_rewards, &target)?;
        for &s in &probe_steps.relevant_states {
            if s == target_state {
                continue;
            }
            let v = values.get(s).copied().unwrap_or(0.0);
            if v > 0.0 {
                min_time = min_time.min(v);
            }
            max_time = max_time.max(v);
            max_steps = max_steps.max(v);
        }
    }
    if min_time == f64::MAX {
        min_time = 1.0;
    }

    let mut max_tr: f64 = 1.0;
    for &target_state in &probe_tr.relevant_states {
        let target: BTreeSet<StateIndex> = BTreeSet::from([target_state]);
        let values = solver.compute_reach_rewards(&probe_tr.dtmc, &probe_tr.rewards, &target)?;
        for &v in &values {
            max_tr = max_tr.max(v);
        }
    }

    Ok((min_time, max_time, max_steps, max_tr))
}

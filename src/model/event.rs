//! Events: an identifier, a firing-time distribution, an active set, and a
//! per-active-state successor distribution for when the event wins the
//! race. Exponential events are folded into the model's CTMC rate row by
//! the caller (§3) and exist here mainly so their transitions participate
//! in potato entrance/successor classification (§4.3) and so their
//! transition rewards can be looked up by `(state, event, successor)`.

use crate::error::ReductionError;
use crate::model::distribution::Distribution;
use crate::{Arbitrary, Probability, StateIndex};
use std::collections::{BTreeMap, BTreeSet};

/// State universe size used by [`Arbitrary`] fixtures throughout the crate's
/// tests — small enough to keep potato/Fox–Glynn working sets trivial to
/// reason about by hand, large enough to exercise entrance/successor
/// classification.
pub const ARBITRARY_NUM_STATES: StateIndex = 5;

#[derive(Debug, Clone)]
pub struct Event {
    id: String,
    distribution: Distribution,
    active: BTreeSet<StateIndex>,
    /// `transitions[s][j]` = probability of moving to `j` when the event
    /// fires from active state `s`.
    transitions: BTreeMap<StateIndex, BTreeMap<StateIndex, Probability>>,
}

const STOCHASTICITY_TOLERANCE: Probability = 1e-9;

impl Event {
    pub fn new(
        id: impl Into<String>,
        distribution: Distribution,
        transitions: BTreeMap<StateIndex, BTreeMap<StateIndex, Probability>>,
    ) -> Result<Self, ReductionError> {
        let id = id.into();
        distribution.validate()?;
        if transitions.is_empty() {
            return Err(ReductionError::InvalidModel {
                reason: format!("event `{id}` has an empty active set"),
            });
        }
        for (state, dist) in &transitions {
            let total: Probability = dist.values().sum();
            if (total - 1.0).abs() > STOCHASTICITY_TOLERANCE {
                return Err(ReductionError::InvalidModel {
                    reason: format!(
                        "event `{id}` transition distribution at state {state} sums to {total}, not 1"
                    ),
                });
            }
        }
        let active = transitions.keys().copied().collect();
        Ok(Self {
            id,
            distribution,
            active,
            transitions,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn distribution(&self) -> Distribution {
        self.distribution
    }

    pub fn active(&self) -> &BTreeSet<StateIndex> {
        &self.active
    }

    pub fn is_active(&self, s: StateIndex) -> bool {
        self.active.contains(&s)
    }

    /// Successor distribution fired from `s`, or `None` if the event is not
    /// active at `s`.
    pub fn transition(&self, s: StateIndex) -> Option<&BTreeMap<StateIndex, Probability>> {
        self.transitions.get(&s)
    }

    pub fn is_exponential(&self) -> bool {
        matches!(self.distribution, Distribution::Exponential { .. })
    }
}

impl Arbitrary for Event {
    /// A random event active at one or two states of a fixed
    /// [`ARBITRARY_NUM_STATES`]-state universe, with a stochastic transition
    /// distribution to one or two other states per active state. Retries on
    /// the (rare) distribution parameter draw that fails validation rather
    /// than exposing that failure to callers — every `Arbitrary` impl hands
    /// back a ready-to-use value, never a `Result`.
    fn random() -> Self {
        use rand::seq::IteratorRandom;
        use rand::Rng;
        let mut rng = rand::rng();

        let distribution = loop {
            let d = Distribution::random();
            if d.validate().is_ok() {
                break d;
            }
        };

        let active_count = rng.random_range(1..=2);
        let active: Vec<StateIndex> = (0..ARBITRARY_NUM_STATES)
            .choose_multiple(&mut rng, active_count);

        let mut transitions = BTreeMap::new();
        for &s in &active {
            let candidates: Vec<StateIndex> =
                (0..ARBITRARY_NUM_STATES).filter(|&j| j != s).collect();
            let successor_count = rng.random_range(1..=2.min(candidates.len()).max(1));
            let successors: Vec<StateIndex> = candidates
                .iter()
                .copied()
                .choose_multiple(&mut rng, successor_count);
            let mut remaining = 1.0;
            let mut dist = BTreeMap::new();
            for (i, &j) in successors.iter().enumerate() {
                let p = if i + 1 == successors.len() {
                    remaining
                } else {
                    let p = rng.random_range(0.1..remaining.max(0.2));
                    remaining -= p;
                    p
                };
                dist.insert(j, p);
            }
            transitions.insert(s, dist);
        }

        Event::new(format!("arbitrary-{}", rng.random::<u32>()), distribution, transitions)
            .expect("Arbitrary Event fixture is constructed to satisfy Event::new's invariants")
    }
}

//! Default, in-memory [`Model`] implementation: a CTMC rate matrix plus a
//! list of events, with the at-most-one-alarm-per-state invariant checked
//! at construction time.

use crate::error::ReductionError;
use crate::model::event::{Event, ARBITRARY_NUM_STATES};
use crate::model::provider::Model;
use crate::{Arbitrary, Rate, StateIndex};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone)]
pub struct Actmc {
    num_states: usize,
    initial_states: BTreeSet<StateIndex>,
    rates: Vec<BTreeMap<StateIndex, Rate>>,
    events: Vec<Event>,
    /// `alarm[s]` = index into `events` of the non-exponential alarm active
    /// at `s`, if any. Computed once at construction.
    alarm: Vec<Option<usize>>,
}

impl Actmc {
    pub fn new(
        num_states: usize,
        initial_states: BTreeSet<StateIndex>,
        rates: Vec<BTreeMap<StateIndex, Rate>>,
        events: Vec<Event>,
    ) -> Result<Self, ReductionError> {
        if rates.len() != num_states {
            return Err(ReductionError::InvalidModel {
                reason: format!(
                    "rate matrix has {} rows but num_states is {num_states}",
                    rates.len()
                ),
            });
        }
        for s in &initial_states {
            if *s >= num_states {
                return Err(ReductionError::InvalidModel {
                    reason: format!("initial state {s} is out of range"),
                });
            }
        }

        let mut alarm: Vec<Option<usize>> = vec![None; num_states];
        for (idx, event) in events.iter().enumerate() {
            if event.is_exponential() {
                continue;
            }
            for &s in event.active() {
                if s >= num_states {
                    return Err(ReductionError::InvalidModel {
                        reason: format!(
                            "event `{}` is active at out-of-range state {s}",
                            event.id()
                        ),
                    });
                }
                if let Some(other) = alarm[s] {
                    return Err(ReductionError::InvalidModel {
                        reason: format!(
                            "state {s} has two overlapping alarms: `{}` and `{}`",
                            events[other].id(),
                            event.id()
                        ),
                    });
                }
                alarm[s] = Some(idx);
            }
        }

        Ok(Self {
            num_states,
            initial_states,
            rates,
            events,
            alarm,
        })
    }
}

impl Model for Actmc {
    fn num_states(&self) -> usize {
        self.num_states
    }

    fn initial_states(&self) -> &BTreeSet<StateIndex> {
        &self.initial_states
    }

    fn transitions(&self, s: StateIndex) -> &BTreeMap<StateIndex, Rate> {
        &self.rates[s]
    }

    fn max_exit_rate(&self) -> Rate {
        self.rates
            .iter()
            .map(|row| row.values().sum::<Rate>())
            .fold(0.0, f64::max)
    }

    fn events(&self) -> &[Event] {
        &self.events
    }

    fn active_event(&self, s: StateIndex) -> Option<&Event> {
        self.alarm[s].map(|idx| &self.events[idx])
    }
}

impl Arbitrary for Actmc {
    /// A small synthetic ACTMC over [`ARBITRARY_NUM_STATES`] states: a
    /// sparse exponential rate matrix plus one or two non-overlapping
    /// alarm events. Overlapping candidate events are discarded rather than
    /// retried indefinitely — a handful of non-overlapping alarms is enough
    /// for the property tests this fixture serves.
    fn random() -> Self {
        use rand::Rng;
        let mut rng = rand::rng();
        let n = ARBITRARY_NUM_STATES;

        let mut rates = vec![BTreeMap::new(); n];
        for s in 0..n {
            for j in 0..n {
                if j != s && rng.random_bool(0.3) {
                    rates[s].insert(j, rng.random_range(0.1..3.0));
                }
            }
        }

        let mut claimed: BTreeSet<StateIndex> = BTreeSet::new();
        let mut events = Vec::new();
        for _ in 0..8 {
            if events.len() >= 2 {
                break;
            }
            let candidate = Event::random();
            if candidate.is_exponential() || candidate.active().is_disjoint(&claimed) {
                claimed.extend(candidate.active());
                events.push(candidate);
            }
        }

        let initial_states = BTreeSet::from([0]);
        Actmc::new(n, initial_states, rates, events)
            .expect("Arbitrary Actmc fixture is constructed to satisfy Actmc::new's invariants")
    }
}

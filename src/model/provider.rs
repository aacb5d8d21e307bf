//! External interfaces (§6). The reduction core is generic over these two
//! traits so a caller's own model/reward representation can be reduced
//! directly, without first materialising a [`crate::model::Actmc`].

use crate::model::event::Event;
use crate::{Rate, Reward, StateIndex};
use std::collections::{BTreeMap, BTreeSet};

/// `Sync` so a caller's own implementation can be fanned out across the
/// `parallel` feature's worker pool (§10.5) the same as the built-in
/// [`crate::model::Actmc`].
pub trait Model: Sync {
    fn num_states(&self) -> usize;
    fn initial_states(&self) -> &BTreeSet<StateIndex>;
    /// The CTMC rate row at `s` — exponential dynamics only (alarm events
    /// are surfaced separately through `events`/`active_event`).
    fn transitions(&self, s: StateIndex) -> &BTreeMap<StateIndex, Rate>;
    fn max_exit_rate(&self) -> Rate;
    fn events(&self) -> &[Event];
    /// The non-exponential alarm active at `s`, if any (§3: at most one).
    fn active_event(&self, s: StateIndex) -> Option<&Event>;
}

pub trait RewardProvider: Sync {
    fn state_reward(&self, s: StateIndex) -> Reward;
    /// Transition rewards for the event active at `s`, keyed by successor.
    fn event_transition_rewards(&self, s: StateIndex) -> &BTreeMap<StateIndex, Reward>;
    fn has_transition_rewards(&self) -> bool;
}

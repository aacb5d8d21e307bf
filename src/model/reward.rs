//! Default, in-memory reward structure: per-state rewards plus
//! per-event-transition rewards keyed by `(state, successor)` — the event
//! is implicit, since §3 guarantees at most one alarm is active at any
//! rewarded state. CTMC transition rewards are assumed already folded into
//! state rewards by the caller.

use crate::error::ReductionError;
use crate::model::provider::RewardProvider;
use crate::{Reward, StateIndex};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct RewardStructure {
    state_rewards: Vec<Reward>,
    transition_rewards: BTreeMap<StateIndex, BTreeMap<StateIndex, Reward>>,
}

static EMPTY: BTreeMap<StateIndex, Reward> = BTreeMap::new();

impl RewardStructure {
    pub fn new(state_rewards: Vec<Reward>) -> Result<Self, ReductionError> {
        for (s, &r) in state_rewards.iter().enumerate() {
            if !(r.is_finite() && r >= 0.0) {
                return Err(ReductionError::InvalidModel {
                    reason: format!("state reward at {s} is not finite and non-negative: {r}"),
                });
            }
        }
        Ok(Self {
            state_rewards,
            transition_rewards: BTreeMap::new(),
        })
    }

    pub fn with_transition_reward(
        mut self,
        state: StateIndex,
        successor: StateIndex,
        reward: Reward,
    ) -> Result<Self, ReductionError> {
        if !(reward.is_finite() && reward >= 0.0) {
            return Err(ReductionError::InvalidModel {
                reason: format!(
                    "transition reward ({state} -> {successor}) is not finite and non-negative: {reward}"
                ),
            });
        }
        self.transition_rewards
            .entry(state)
            .or_default()
            .insert(successor, reward);
        Ok(self)
    }
}

impl RewardProvider for RewardStructure {
    fn state_reward(&self, s: StateIndex) -> Reward {
        self.state_rewards.get(s).copied().unwrap_or(0.0)
    }

    fn event_transition_rewards(&self, s: StateIndex) -> &BTreeMap<StateIndex, Reward> {
        self.transition_rewards.get(&s).unwrap_or(&EMPTY)
    }

    fn has_transition_rewards(&self) -> bool {
        !self.transition_rewards.is_empty()
    }
}

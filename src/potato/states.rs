//! Potato state set computation (§4.3): classifies a model's states
//! relative to one alarm event into `states` (potato interior), `entrances`
//! (potato states reachable from outside in one step), and `successors`
//! (states outside the potato reachable from inside in one step).

use crate::model::event::Event;
use crate::model::provider::Model;
use crate::StateIndex;
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
pub struct PotatoStates {
    pub states: BTreeSet<StateIndex>,
    pub entrances: BTreeSet<StateIndex>,
    pub successors: BTreeSet<StateIndex>,
}

pub fn compute_states(
    model: &dyn Model,
    event: &Event,
    target: &BTreeSet<StateIndex>,
) -> PotatoStates {
    let mut states: BTreeSet<StateIndex> = event.active().difference(target).copied().collect();
    let mut entrances: BTreeSet<StateIndex> = BTreeSet::new();
    let mut successors: BTreeSet<StateIndex> = BTreeSet::new();

    // entrances: reachable in one CTMC step from outside the potato.
    for s in 0..model.num_states() {
        if states.contains(&s) {
            continue;
        }
        for (&j, &rate) in model.transitions(s) {
            if rate > 0.0 && states.contains(&j) {
                entrances.insert(j);
            }
        }
    }

    // entrances: reachable in one step from any other event's transitions,
    // including self-re-entry of `event`'s own transitions.
    for other in model.events() {
        for &s in other.active() {
            let Some(dist) = other.transition(s) else {
                continue;
            };
            let from_inside_potato = states.contains(&s);
            for (&j, &p) in dist {
                if p > 0.0 && states.contains(&j) && (other.id() != event.id() || from_inside_potato)
                {
                    entrances.insert(j);
                }
            }
        }
    }

    // initial states, consulted as a set.
    for &s in model.initial_states() {
        if states.contains(&s) {
            entrances.insert(s);
        }
    }

    // successors: outside `states`, reachable in one CTMC step from inside.
    for &s in &states {
        for (&j, &rate) in model.transitions(s) {
            if rate > 0.0 && !states.contains(&j) {
                successors.insert(j);
            }
        }
        if let Some(dist) = event.transition(s) {
            for (&j, &p) in dist {
                if p > 0.0 && !states.contains(&j) {
                    successors.insert(j);
                }
            }
        }
    }

    // targets inside the potato are absorbed out: a state that is both
    // target and entrance is a successor, not an entrance (the potato
    // cannot absorb a reachability target).
    for &t in target {
        if event.active().contains(&t) {
            successors.insert(t);
            states.remove(&t);
            entrances.remove(&t);
        }
    }

    PotatoStates {
        states,
        entrances,
        successors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::actmc::Actmc;
    use crate::model::distribution::Distribution;
    use crate::model::event::Event;
    use std::collections::BTreeMap;

    fn two_state_dirac() -> (Actmc, Event) {
        let mut t = BTreeMap::new();
        t.insert(0, BTreeMap::from([(1, 1.0)]));
        let event = Event::new("alarm", Distribution::Dirac { d: 2.0 }, t).unwrap();
        let rates = vec![BTreeMap::new(), BTreeMap::new()];
        let model = Actmc::new(2, BTreeSet::from([0]), rates, vec![event.clone()]).unwrap();
        (model, event)
    }

    #[test]
    fn single_state_dirac_has_one_entrance_one_successor() {
        let (model, event) = two_state_dirac();
        let target = BTreeSet::new();
        let p = compute_states(&model, &event, &target);
        assert_eq!(p.states, BTreeSet::from([0]));
        assert_eq!(p.entrances, BTreeSet::from([0]));
        assert_eq!(p.successors, BTreeSet::from([1]));
    }

    #[test]
    fn target_inside_potato_becomes_successor() {
        let (model, event) = two_state_dirac();
        let target = BTreeSet::from([0]);
        let p = compute_states(&model, &event, &target);
        assert!(p.states.is_empty());
        assert!(p.entrances.is_empty());
        assert!(p.successors.contains(&0));
    }

    #[test]
    fn exponential_transition_into_potato_makes_entrance() {
        let mut t = BTreeMap::new();
        t.insert(1, BTreeMap::from([(0, 1.0)]));
        let event = Event::new("alarm", Distribution::Dirac { d: 1.0 }, t).unwrap();
        let mut rates = vec![BTreeMap::new(), BTreeMap::new()];
        rates[0].insert(1, 0.5); // plain exponential transition from outside into the potato
        let model = Actmc::new(2, BTreeSet::new(), rates, vec![event.clone()]).unwrap();
        let target = BTreeSet::new();
        let p = compute_states(&model, &event, &target);
        assert_eq!(p.states, BTreeSet::from([1]));
        assert_eq!(p.entrances, BTreeSet::from([1]));
        assert_eq!(p.successors, BTreeSet::from([0]));
    }
}

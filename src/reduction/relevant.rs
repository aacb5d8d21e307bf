//! Relevant-state computation (§4.7): a state is relevant if it carries no
//! alarm (an ordinary CTMC state) or is a potato entrance. Interior,
//! non-entrance potato states are collapsed by the reduction and carry no
//! meaningful standalone value downstream.

use crate::model::provider::Model;
use crate::potato::Potato;
use crate::StateIndex;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

pub fn relevant_states(
    model: &dyn Model,
    potatoes: &BTreeMap<String, Potato>,
) -> BTreeSet<StateIndex> {
    let mut relevant = BTreeSet::new();
    for s in 0..model.num_states() {
        if model.active_event(s).is_none() {
            relevant.insert(s);
        }
    }
    for potato in potatoes.values() {
        relevant.extend(potato.entrances().iter().copied());
    }
    relevant
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::actmc::Actmc;
    use crate::model::distribution::Distribution;
    use crate::model::event::Event;
    use std::collections::BTreeMap as Map;

    #[test]
    fn non_entrance_potato_interior_is_not_relevant() {
        let mut t = Map::new();
        t.insert(0, Map::from([(2, 1.0)]));
        t.insert(1, Map::from([(2, 1.0)]));
        let event = Event::new("alarm", Distribution::Dirac { d: 1.0 }, t).unwrap();
        let mut rates = vec![Map::new(), Map::new(), Map::new()];
        rates[0].insert(1, 1.0);
        let model = Actmc::new(3, BTreeSet::from([0]), rates, vec![event]).unwrap();
        let potatoes = BTreeMap::new();
        let relevant = relevant_states(&model, &potatoes);
        // with no potatoes built, states 0 and 1 (alarm-active) are not
        // relevant, state 2 (no alarm) is.
        assert!(!relevant.contains(&0));
        assert!(!relevant.contains(&1));
        assert!(relevant.contains(&2));
    }
}

//! Wires the generic enumeration engine (`crate::engine`) to the concrete
//! Petri-net firing model: the initial-state builder (spec §4.5), the
//! firing evaluator (spec §4.2, §4.3's priority tie-breaking), and the
//! `ComponentsFactory` that assembles them for `Analyzer<PetriNet,
//! TransitionId>`.

pub mod evaluator;
pub mod factory;
pub mod initial;

pub use factory::PetriComponentsFactory;
pub use initial::initial_state;

use crate::error::CoreResult;
use crate::net::features::Priority;
use crate::net::{Marking, PetriNet, TransitionId};

/// The ordered set of events (fireable transitions) available from
/// `marking`, in transition-declaration order, after priority pruning:
/// spec §4.3 — when any enabled transition carries a `Priority` feature,
/// only the max-priority subset of those transitions remains (absent
/// feature counts as `-infinity`, so plain timed/stochastic transitions
/// never compete against a prioritized one present in the same marking).
pub fn enabled_events(net: &PetriNet, marking: &Marking) -> CoreResult<Vec<TransitionId>> {
    let enabled = net.enabled_transitions(marking)?;
    let mut ordered: Vec<TransitionId> = net
        .transitions()
        .map(|t| t.id)
        .filter(|id| enabled.contains(id))
        .collect();

    let prioritized: Vec<TransitionId> = ordered
        .iter()
        .copied()
        .filter(|&id| net.transition(id).features.get::<Priority>().is_some())
        .collect();

    if !prioritized.is_empty() {
        let max = prioritized
            .iter()
            .map(|&id| net.transition(id).features.get::<Priority>().unwrap().0)
            .max()
            .expect("prioritized is non-empty");
        ordered.retain(|&id| {
            net.transition(id)
                .features
                .get::<Priority>()
                .map(|p| p.0)
                .unwrap_or(Priority::ABSENT)
                == max
        });
    }

    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::features;

    #[test]
    fn higher_priority_transition_prunes_lower_priority_competitor() {
        let mut net = PetriNet::new();
        let p0 = net.add_place("p0");
        let t0 = net.add_transition("t0");
        let t1 = net.add_transition("t1");
        net.add_precondition(p0, t0, 1).unwrap();
        net.add_precondition(p0, t1, 1).unwrap();
        net.transition_mut(t0).features.set(features::Priority(2));
        net.transition_mut(t1).features.set(features::Priority(5));

        let mut m = Marking::new();
        m.set_tokens(p0, 1);
        let events = enabled_events(&net, &m).unwrap();
        assert_eq!(events, vec![t1]);
    }

    #[test]
    fn no_priority_features_present_leaves_all_enabled_transitions() {
        let mut net = PetriNet::new();
        let p0 = net.add_place("p0");
        let t0 = net.add_transition("t0");
        let t1 = net.add_transition("t1");
        net.add_precondition(p0, t0, 1).unwrap();
        net.add_precondition(p0, t1, 1).unwrap();

        let mut m = Marking::new();
        m.set_tokens(p0, 1);
        let events = enabled_events(&net, &m).unwrap();
        assert_eq!(events.len(), 2);
    }
}

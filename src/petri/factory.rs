//! `ComponentsFactory<PetriNet, TransitionId>`: assembles the pluggable
//! parts `Analyzer` needs for Petri-net state-space enumeration.

use crate::engine::components::{ComponentsFactory, EnabledEventsBuilder, SuccessionProcessor, SuccessorEvaluator};
use crate::engine::policy::{EnumerationPolicy, Fifo};
use crate::engine::stop::{AlwaysFalse, StopCriterion};
use crate::error::CoreResult;
use crate::net::{Marking, PetriNet, TransitionId};
use crate::state::State;
use crate::succession::Succession;

use super::{enabled_events, evaluator};

pub struct PetriEventsBuilder;

impl EnabledEventsBuilder<PetriNet, TransitionId> for PetriEventsBuilder {
    fn events(&self, model: &PetriNet, state: &State) -> CoreResult<Vec<TransitionId>> {
        let feature = state
            .petri()
            .ok_or(crate::error::StateError::MissingFeature("PetriStateFeature"))?;
        enabled_events(model, &feature.marking)
    }
}

pub struct PetriSuccessorEvaluator;

impl SuccessorEvaluator<PetriNet, TransitionId> for PetriSuccessorEvaluator {
    fn evaluate(&self, model: &PetriNet, state: &State, event: &TransitionId) -> CoreResult<Option<Succession>> {
        let child = evaluator::fire(model, state, *event)?;
        let name = model.transition(*event).name.clone();
        Ok(Some(Succession::step(state.clone(), name, child)))
    }
}

/// Assembles an `Analyzer<PetriNet, TransitionId>`'s components. The
/// queue discipline and stop criteria are supplied as factory closures
/// (rather than stored instances) because the `Analyzer` needs a fresh
/// one per `analyze()` call; defaults are FIFO policy with no stop
/// criterion (`AlwaysFalse` on both), matching an unconstrained
/// breadth-first state-space enumeration.
pub struct PetriComponentsFactory {
    policy_fn: Box<dyn Fn() -> Box<dyn EnumerationPolicy>>,
    local_stop_fn: Box<dyn Fn() -> Box<dyn StopCriterion>>,
    global_stop_fn: Box<dyn Fn() -> Box<dyn StopCriterion>>,
    pre_fn: Option<Box<dyn Fn() -> Box<dyn SuccessionProcessor>>>,
    post_fn: Option<Box<dyn Fn() -> Box<dyn SuccessionProcessor>>>,
}

impl Default for PetriComponentsFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl PetriComponentsFactory {
    pub fn new() -> Self {
        Self {
            policy_fn: Box::new(|| Box::new(Fifo::new())),
            local_stop_fn: Box::new(|| Box::new(AlwaysFalse)),
            global_stop_fn: Box::new(|| Box::new(AlwaysFalse)),
            pre_fn: None,
            post_fn: None,
        }
    }

    pub fn with_policy(mut self, f: impl Fn() -> Box<dyn EnumerationPolicy> + 'static) -> Self {
        self.policy_fn = Box::new(f);
        self
    }

    pub fn with_local_stop(mut self, f: impl Fn() -> Box<dyn StopCriterion> + 'static) -> Self {
        self.local_stop_fn = Box::new(f);
        self
    }

    pub fn with_global_stop(mut self, f: impl Fn() -> Box<dyn StopCriterion> + 'static) -> Self {
        self.global_stop_fn = Box::new(f);
        self
    }

    pub fn with_pre_processor(mut self, f: impl Fn() -> Box<dyn SuccessionProcessor> + 'static) -> Self {
        self.pre_fn = Some(Box::new(f));
        self
    }

    pub fn with_post_processor(mut self, f: impl Fn() -> Box<dyn SuccessionProcessor> + 'static) -> Self {
        self.post_fn = Some(Box::new(f));
        self
    }
}

impl ComponentsFactory<PetriNet, TransitionId> for PetriComponentsFactory {
    fn events_builder(&self) -> Box<dyn EnabledEventsBuilder<PetriNet, TransitionId>> {
        Box::new(PetriEventsBuilder)
    }

    fn evaluator(&self) -> Box<dyn SuccessorEvaluator<PetriNet, TransitionId>> {
        Box::new(PetriSuccessorEvaluator)
    }

    fn policy(&self) -> Box<dyn EnumerationPolicy> {
        (self.policy_fn)()
    }

    fn pre_processor(&self) -> Option<Box<dyn SuccessionProcessor>> {
        self.pre_fn.as_ref().map(|f| f())
    }

    fn post_processor(&self) -> Option<Box<dyn SuccessionProcessor>> {
        self.post_fn.as_ref().map(|f| f())
    }

    fn local_stop(&self) -> Box<dyn StopCriterion> {
        (self.local_stop_fn)()
    }

    fn global_stop(&self) -> Box<dyn StopCriterion> {
        (self.global_stop_fn)()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::analyzer::Analyzer;
    use crate::engine::stop::EventName;
    use crate::petri::initial_state;
    use crate::state::LocalStop;

    #[test]
    fn local_stop_halts_expansion_at_the_matching_node_without_pruning_the_global_walk() {
        // A 4-stage ring; local stop on "t1" should leave the node reached
        // by t1 in the graph, marked LocalStop, with no successors, while
        // leaving every earlier node fully expanded.
        let mut net = PetriNet::new();
        let places: Vec<_> = (0..4).map(|i| net.add_place(format!("p{i}"))).collect();
        for i in 0..4 {
            let t = net.add_transition(format!("t{i}"));
            net.add_precondition(places[i], t, 1).unwrap();
            net.add_postcondition(t, places[(i + 1) % 4], 1).unwrap();
        }
        let mut marking = Marking::new();
        marking.set_tokens(places[0], 1);
        let s0 = initial_state(&net, marking, false).unwrap();

        let factory = PetriComponentsFactory::new().with_local_stop(|| Box::new(EventName::new("t1")));
        let analyzer = Analyzer::new(&factory, net, s0);
        let graph = analyzer.analyze().unwrap().into_graph();

        // p0 --t0--> p1 --t1--> p2, stopped; p3 and the wrap back to p0 are
        // never reached.
        assert_eq!(graph.nodes().count(), 3);

        let stopped = graph
            .nodes()
            .find(|&n| graph.state(n).features().get::<LocalStop>().is_some())
            .expect("the node reached via t1 must be marked LocalStop");
        assert!(
            graph.successors(stopped).is_empty(),
            "a LocalStop node must not be expanded further"
        );
    }

    #[test]
    fn exp_exp_cycle_enumerates_to_two_states() {
        let mut net = PetriNet::new();
        let p0 = net.add_place("p0");
        let p1 = net.add_place("p1");
        let t0 = net.add_transition("t0");
        let t1 = net.add_transition("t1");
        net.add_precondition(p0, t0, 1).unwrap();
        net.add_postcondition(t0, p1, 1).unwrap();
        net.add_precondition(p1, t1, 1).unwrap();
        net.add_postcondition(t1, p0, 1).unwrap();

        let mut marking = Marking::new();
        marking.set_tokens(p0, 1);
        let s0 = initial_state(&net, marking, false).unwrap();

        let factory = PetriComponentsFactory::new();
        let analyzer = Analyzer::new(&factory, net, s0);
        let graph = analyzer.analyze().unwrap().into_graph();
        assert_eq!(graph.nodes().count(), 2);
    }
}

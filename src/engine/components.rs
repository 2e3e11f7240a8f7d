//! The pluggable component traits an `Analyzer` is assembled from, and the
//! factory that produces one full set for a given model/event pair.

use crate::error::CoreResult;
use crate::state::State;
use crate::succession::Succession;

use super::policy::EnumerationPolicy;
use super::stop::StopCriterion;

/// Given the model and a state, returns the ordered set of events enabled
/// in that state. Order determines child-insertion order and must be
/// stable across calls for the same state.
pub trait EnabledEventsBuilder<M, E> {
    fn events(&self, model: &M, state: &State) -> CoreResult<Vec<E>>;
}

/// Computes the successor produced by firing `event` from `state`. `None`
/// suppresses the successor entirely: no notifications are fired for it.
pub trait SuccessorEvaluator<M, E> {
    fn evaluate(&self, model: &M, state: &State, event: &E) -> CoreResult<Option<Succession>>;
}

/// Pure transform applied to a succession before it is inserted into the
/// graph (pre-processor) or before it is pushed onto the policy queue
/// (post-processor). Returning `None` drops the succession.
pub trait SuccessionProcessor {
    fn process(&self, succession: Succession) -> Option<Succession>;
}

/// Assembles one full set of components for a model/event pair. Concrete
/// models (the Petri net firing model, in this crate) provide a factory
/// implementation; the `Analyzer` itself is model-agnostic.
pub trait ComponentsFactory<M, E> {
    fn events_builder(&self) -> Box<dyn EnabledEventsBuilder<M, E>>;
    fn evaluator(&self) -> Box<dyn SuccessorEvaluator<M, E>>;
    fn policy(&self) -> Box<dyn EnumerationPolicy>;
    fn pre_processor(&self) -> Option<Box<dyn SuccessionProcessor>> {
        None
    }
    fn post_processor(&self) -> Option<Box<dyn SuccessionProcessor>> {
        None
    }
    fn local_stop(&self) -> Box<dyn StopCriterion>;
    fn global_stop(&self) -> Box<dyn StopCriterion>;
}

//! The generic enumeration engine: grows a `SuccessionGraph` from an initial
//! state using the pluggable components assembled by a `ComponentsFactory`.

use std::marker::PhantomData;

use tracing::{debug, trace};

use crate::error::CoreResult;
use crate::graph::SuccessionGraph;
use crate::state::{LocalStop, State};
use crate::succession::Succession;

use super::components::{ComponentsFactory, EnabledEventsBuilder, SuccessionProcessor, SuccessorEvaluator};
use super::observer::{EngineObserver, Notification, ObserverList};
use super::policy::EnumerationPolicy;
use super::stop::{StopCriterion, StopSignal};

pub enum AnalyzeOutcome {
    Completed(SuccessionGraph),
    Interrupted(SuccessionGraph),
}

impl AnalyzeOutcome {
    pub fn into_graph(self) -> SuccessionGraph {
        match self {
            AnalyzeOutcome::Completed(g) | AnalyzeOutcome::Interrupted(g) => g,
        }
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, AnalyzeOutcome::Interrupted(_))
    }
}

pub struct Analyzer<M, E> {
    model: M,
    initial_state: State,
    events_builder: Box<dyn EnabledEventsBuilder<M, E>>,
    evaluator: Box<dyn SuccessorEvaluator<M, E>>,
    pre: Option<Box<dyn SuccessionProcessor>>,
    post: Option<Box<dyn SuccessionProcessor>>,
    policy: Box<dyn EnumerationPolicy>,
    local_stop: Box<dyn StopCriterion>,
    global_stop: Box<dyn StopCriterion>,
    observers: ObserverList,
    _event: PhantomData<E>,
}

impl<M, E> Analyzer<M, E> {
    pub fn new(factory: &dyn ComponentsFactory<M, E>, model: M, initial_state: State) -> Self {
        Self {
            model,
            initial_state,
            events_builder: factory.events_builder(),
            evaluator: factory.evaluator(),
            pre: factory.pre_processor(),
            post: factory.post_processor(),
            policy: factory.policy(),
            local_stop: factory.local_stop(),
            global_stop: factory.global_stop(),
            observers: ObserverList::new(),
            _event: PhantomData,
        }
    }

    pub fn add_observer(&mut self, id: impl Into<String>, observer: Box<dyn EngineObserver>) {
        self.observers.add(id, observer);
    }

    pub fn remove_observer(&mut self, id: &str) {
        self.observers.remove(id);
    }

    /// Fan a notification out to the user observers and both stop criteria,
    /// returning `(global signal, local signal)` for this notification.
    fn observe(&mut self, notification: &Notification) -> (StopSignal, StopSignal) {
        self.observers.notify_all(notification);
        let local = self.local_stop.observe(notification);
        let global = self.global_stop.observe(notification);
        (global, local)
    }

    fn pre_process(&self, succession: Succession) -> Option<Succession> {
        match &self.pre {
            Some(p) => p.process(succession),
            None => Some(succession),
        }
    }

    fn post_process(&self, succession: Succession) -> Option<Succession> {
        match &self.post {
            Some(p) => p.process(succession),
            None => Some(succession),
        }
    }

    pub fn analyze(mut self) -> CoreResult<AnalyzeOutcome> {
        let mut graph = SuccessionGraph::new();
        let mut global_signal = StopSignal::Continue;

        let root = Succession::root(self.initial_state.clone());
        self.observe(&Notification::Created(&root));
        if let Some(root) = self.post_process(root) {
            self.observe(&Notification::PostProcessed(&root));
            self.policy.push(root.clone());
            let (sig, _) = self.observe(&Notification::Inserted(&root));
            if sig.is_stopping() {
                global_signal = sig;
            }
        }

        while !self.policy.is_empty() && !global_signal.is_stopping() {
            let succession = self.policy.pop().expect("checked non-empty above");
            let (sig, local_sig) = self.observe(&Notification::Extracted(&succession));
            if sig.is_stopping() {
                global_signal = sig;
            }

            let Some(succession) = self.pre_process(succession) else {
                continue;
            };
            self.observe(&Notification::PreProcessed(&succession));

            let child = succession.child.clone();
            let is_new = graph.add(succession.clone())?;
            trace!(is_new, "node added to succession graph");
            let (sig, _) = self.observe(&Notification::NodeAdded {
                succession: &succession,
                is_new,
            });
            if sig.is_stopping() {
                global_signal = sig;
            }

            if local_sig.is_stopping() {
                let node = graph
                    .node(&child)
                    .expect("child was just bound by graph.add");
                graph.mark_feature(node, LocalStop);
                continue;
            }

            if !is_new || global_signal.is_stopping() {
                continue;
            }

            'events: for event in self.events_builder.events(&self.model, &child)? {
                let Some(candidate) = self.evaluator.evaluate(&self.model, &child, &event)? else {
                    continue;
                };
                self.observe(&Notification::Created(&candidate));
                let Some(candidate) = self.post_process(candidate) else {
                    continue;
                };
                self.observe(&Notification::PostProcessed(&candidate));
                self.policy.push(candidate.clone());
                let (sig, _) = self.observe(&Notification::Inserted(&candidate));
                if sig.is_stopping() {
                    global_signal = sig;
                    break 'events;
                }
            }
        }

        debug!(interrupted = global_signal == StopSignal::Interrupted, "draining remaining worklist");
        while let Some(succession) = self.policy.pop() {
            let Some(succession) = self.pre_process(succession) else {
                continue;
            };
            self.observe(&Notification::PreProcessed(&succession));
            let is_new = graph.add(succession.clone())?;
            self.observe(&Notification::NodeAdded {
                succession: &succession,
                is_new,
            });
        }

        Ok(if global_signal == StopSignal::Interrupted {
            AnalyzeOutcome::Interrupted(graph)
        } else {
            AnalyzeOutcome::Completed(graph)
        })
    }
}

//! Stop criteria: stateful predicates over the engine's notification stream.

use super::observer::Notification;
use crate::expr::Expr;
use crate::net::marking::Marking;
use crate::net::PetriNet;
use crate::state::State;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSignal {
    Continue,
    Stop,
    Interrupted,
}

impl StopSignal {
    pub fn is_stopping(self) -> bool {
        !matches!(self, StopSignal::Continue)
    }
}

pub trait StopCriterion: fmt::Debug {
    fn observe(&mut self, notification: &Notification) -> StopSignal;
}

#[derive(Debug, Default)]
pub struct AlwaysFalse;

impl StopCriterion for AlwaysFalse {
    fn observe(&mut self, _notification: &Notification) -> StopSignal {
        StopSignal::Continue
    }
}

#[derive(Debug)]
pub struct IterationsNumber {
    target: usize,
    count: usize,
}

impl IterationsNumber {
    pub fn new(target: usize) -> Self {
        Self { target, count: 0 }
    }
}

impl StopCriterion for IterationsNumber {
    fn observe(&mut self, notification: &Notification) -> StopSignal {
        if let Notification::NodeAdded { is_new: true, .. } = notification {
            self.count += 1;
        }
        if self.count >= self.target {
            StopSignal::Stop
        } else {
            StopSignal::Continue
        }
    }
}

#[derive(Debug)]
pub struct EventName {
    name: String,
}

impl EventName {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl StopCriterion for EventName {
    fn observe(&mut self, notification: &Notification) -> StopSignal {
        if let Notification::Extracted(succession) = notification {
            if succession.event.as_deref() == Some(self.name.as_str()) {
                return StopSignal::Stop;
            }
        }
        StopSignal::Continue
    }
}

/// Stops once the last extracted child satisfies an arbitrary predicate.
pub struct StatePredicate {
    predicate: Arc<dyn Fn(&State) -> bool + Send + Sync>,
}

impl fmt::Debug for StatePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatePredicate").finish_non_exhaustive()
    }
}

impl StatePredicate {
    pub fn new(predicate: Arc<dyn Fn(&State) -> bool + Send + Sync>) -> Self {
        Self { predicate }
    }
}

impl StopCriterion for StatePredicate {
    fn observe(&mut self, notification: &Notification) -> StopSignal {
        if let Notification::Extracted(succession) = notification {
            if (self.predicate)(&succession.child) {
                return StopSignal::Stop;
            }
        }
        StopSignal::Continue
    }
}

/// Either a parsed boolean expression over place names, or an opaque
/// structural predicate over a marking directly.
pub enum MarkingCond {
    Expr { net: Arc<PetriNet>, expr: Expr },
    Predicate(Arc<dyn Fn(&Marking) -> bool + Send + Sync>),
}

impl MarkingCond {
    pub fn from_str(net: Arc<PetriNet>, source: &str) -> crate::error::CoreResult<Self> {
        Ok(MarkingCond::Expr {
            net,
            expr: crate::expr::parser::parse(source)?,
        })
    }

    pub(crate) fn holds(&self, marking: &Marking) -> crate::error::CoreResult<bool> {
        match self {
            MarkingCond::Expr { net, expr } => {
                let bindings = crate::net::MarkingBindings {
                    net: net.as_ref(),
                    marking,
                };
                crate::expr::eval::eval(expr, &bindings)?.as_bool()
            }
            MarkingCond::Predicate(p) => Ok(p(marking)),
        }
    }
}

pub struct MarkingCondition {
    cond: MarkingCond,
}

impl MarkingCondition {
    pub fn new(cond: MarkingCond) -> Self {
        Self { cond }
    }
}

impl fmt::Debug for MarkingCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkingCondition").finish_non_exhaustive()
    }
}

impl StopCriterion for MarkingCondition {
    fn observe(&mut self, notification: &Notification) -> StopSignal {
        if let Notification::Extracted(succession) = notification {
            if let Some(petri) = succession.child.petri() {
                if self.cond.holds(&petri.marking).unwrap_or(false) {
                    return StopSignal::Stop;
                }
            }
        }
        StopSignal::Continue
    }
}

/// Cooperative cancellation channel queried by the `Monitor` stop criterion.
pub trait AnalysisMonitor: fmt::Debug + Send + Sync {
    fn interrupt_requested(&self) -> bool;
}

#[derive(Debug)]
pub struct Monitor {
    monitor: Arc<dyn AnalysisMonitor>,
    nodes_added: usize,
}

impl Monitor {
    pub fn new(monitor: Arc<dyn AnalysisMonitor>) -> Self {
        Self {
            monitor,
            nodes_added: 0,
        }
    }

    pub fn nodes_added(&self) -> usize {
        self.nodes_added
    }
}

impl StopCriterion for Monitor {
    fn observe(&mut self, notification: &Notification) -> StopSignal {
        if let Notification::NodeAdded { is_new: true, .. } = notification {
            self.nodes_added += 1;
        }
        if self.monitor.interrupt_requested() {
            StopSignal::Interrupted
        } else {
            StopSignal::Continue
        }
    }
}

#[derive(Debug, Default)]
pub struct AndStopCriterion {
    children: Vec<Box<dyn StopCriterion>>,
}

impl AndStopCriterion {
    pub fn new(children: Vec<Box<dyn StopCriterion>>) -> Self {
        Self { children }
    }
}

impl StopCriterion for AndStopCriterion {
    fn observe(&mut self, notification: &Notification) -> StopSignal {
        let mut any_interrupted = false;
        let mut all_stopping = !self.children.is_empty();
        for child in self.children.iter_mut() {
            match child.observe(notification) {
                StopSignal::Interrupted => any_interrupted = true,
                StopSignal::Stop => {}
                StopSignal::Continue => all_stopping = false,
            }
        }
        if any_interrupted {
            StopSignal::Interrupted
        } else if all_stopping {
            StopSignal::Stop
        } else {
            StopSignal::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::marking::Marking;
    use crate::net::PlaceId;
    use crate::state::PetriStateFeature;

    fn petri_state(tokens: u64) -> State {
        let mut m = Marking::new();
        m.set_tokens(PlaceId(0), tokens);
        State::new().with_feature(PetriStateFeature {
            marking: m,
            enabled: Default::default(),
            newly_enabled: Default::default(),
            persistent: Default::default(),
            disabled: Default::default(),
            check_newly_enabled: false,
        })
    }

    #[test]
    fn iterations_number_stops_once_target_new_nodes_seen() {
        let mut crit = IterationsNumber::new(2);
        let succ = Succession::root(petri_state(0));
        assert_eq!(
            crit.observe(&Notification::NodeAdded {
                succession: &succ,
                is_new: true
            }),
            StopSignal::Continue
        );
        assert_eq!(
            crit.observe(&Notification::NodeAdded {
                succession: &succ,
                is_new: true
            }),
            StopSignal::Stop
        );
    }

    #[test]
    fn and_stop_criterion_requires_all_children_to_stop() {
        let mut and = AndStopCriterion::new(vec![
            Box::new(IterationsNumber::new(1)),
            Box::new(EventName::new("t0")),
        ]);
        let succ = Succession::step(petri_state(0), "other".to_string(), petri_state(1));
        assert_eq!(
            and.observe(&Notification::NodeAdded {
                succession: &succ,
                is_new: true
            }),
            StopSignal::Continue,
            "EventName hasn't matched yet"
        );
        assert_eq!(
            and.observe(&Notification::Extracted(&succ)),
            StopSignal::Continue
        );
    }
}

//! Notifications fanned out by the enumeration engine to stop criteria and
//! user-supplied observers, in the exact order the engine produces them.

use crate::succession::Succession;

#[derive(Debug, Clone, Copy)]
pub enum Notification<'a> {
    Created(&'a Succession),
    PostProcessed(&'a Succession),
    Inserted(&'a Succession),
    Extracted(&'a Succession),
    PreProcessed(&'a Succession),
    NodeAdded {
        succession: &'a Succession,
        is_new: bool,
    },
}

/// A passive observer of engine notifications (added via
/// `Analyzer::add_observer`). Unlike `StopCriterion`, it has no say in
/// whether the run continues.
pub trait EngineObserver {
    fn notify(&mut self, notification: &Notification);
}

#[derive(Default)]
pub struct ObserverList {
    observers: Vec<(String, Box<dyn EngineObserver>)>,
}

impl ObserverList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: impl Into<String>, observer: Box<dyn EngineObserver>) {
        self.observers.push((id.into(), observer));
    }

    pub fn remove(&mut self, id: &str) {
        self.observers.retain(|(existing, _)| existing != id);
    }

    pub fn notify_all(&mut self, notification: &Notification) {
        for (_, observer) in self.observers.iter_mut() {
            observer.notify(notification);
        }
    }
}

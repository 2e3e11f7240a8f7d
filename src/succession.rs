//! `Succession`: an immutable (parent, event, child) triple.

use crate::featurizable::FeatureMap;
use crate::state::State;

/// An event label. Petri-net events are transition firings, identified by
/// the fired transition's name; external event sources (e.g. simulation
/// lifecycle probes) may use other strings.
pub type Event = String;

#[derive(Debug, Clone)]
pub struct Succession {
    /// `None` only for the pseudo-succession that seeds the graph root.
    pub parent: Option<State>,
    pub event: Option<Event>,
    pub child: State,
    pub features: FeatureMap,
}

impl Succession {
    pub fn root(child: State) -> Self {
        Self {
            parent: None,
            event: None,
            child,
            features: FeatureMap::new(),
        }
    }

    pub fn step(parent: State, event: Event, child: State) -> Self {
        Self {
            parent: Some(parent),
            event: Some(event),
            child,
            features: FeatureMap::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

//! States: the `Featurizable` substrate specialized to what the
//! enumeration engine and simulation kernel actually produce.

pub mod petri_state;

pub use petri_state::PetriStateFeature;

use crate::featurizable::FeatureMap;
use std::hash::{Hash, Hasher};

/// A node's payload in the succession graph (or a simulation run's current
/// position). Equality and hashing are feature-map equality/hashing, with
/// `PetriStateFeature` as the authoritative equivalence-defining feature for
/// this crate ("equality of a State is equality of its feature
/// map").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    features: FeatureMap,
}

impl State {
    pub fn new() -> Self {
        Self {
            features: FeatureMap::new(),
        }
    }

    pub fn with_feature<T: crate::featurizable::Feature + 'static>(mut self, value: T) -> Self {
        self.features.set(value);
        self
    }

    pub fn features(&self) -> &FeatureMap {
        &self.features
    }

    pub fn features_mut(&mut self) -> &mut FeatureMap {
        &mut self.features
    }

    pub fn petri(&self) -> Option<&PetriStateFeature> {
        self.features.get::<PetriStateFeature>()
    }
}

impl Hash for State {
    fn hash<H: Hasher>(&self, state: &mut H) {
        if let Some(p) = self.petri() {
            p.marking.hash(state);
            if p.check_newly_enabled {
                let mut ids: Vec<_> = p.newly_enabled.iter().collect();
                ids.sort();
                ids.hash(state);
            }
        } else {
            crate::featurizable::hash_shape(&self.features, state);
        }
    }
}

/// Marker feature attached to a graph node when a local stop criterion
/// fires on it: the node is added to the graph but never expanded (spec
/// §4.1 step 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LocalStop;

/// Remaining time-to-fire per enabled transition, maintained by the
/// simulation kernel between firings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimedSimulatorStateFeature {
    pub ttf: std::collections::HashMap<crate::net::TransitionId, f64>,
}

/// Opaque seam consumed by the external symbolic (DBM-based) kernel for time
/// Petri nets; this crate never constructs or interprets its contents (spec
/// §1 Non-goals: "the DBM / continuous PDF algebra ... specified only at
/// their interface").
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimedStateFeature {
    pub opaque: Vec<u8>,
}

/// Opaque seam consumed by the external symbolic (regenerative/GSPN) kernel
/// for stochastic state classes; same status as `TimedStateFeature`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StochasticStateFeature {
    pub opaque: Vec<u8>,
}

//! `PetriStateFeature`: the feature that makes a `State` a Petri-net state
//! (the feature that makes a node a Petri-net marking).

use crate::net::marking::Marking;
use crate::net::TransitionId;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct PetriStateFeature {
    pub marking: Marking,
    pub enabled: HashSet<TransitionId>,
    pub newly_enabled: HashSet<TransitionId>,
    pub persistent: HashSet<TransitionId>,
    pub disabled: HashSet<TransitionId>,
    pub check_newly_enabled: bool,
}

impl PetriStateFeature {
    /// Invariant checked by callers/tests: `persistent` and `newly_enabled`
    /// partition `enabled`.
    pub fn partitions_enabled(&self) -> bool {
        let union: HashSet<_> = self.persistent.union(&self.newly_enabled).copied().collect();
        let disjoint = self.persistent.is_disjoint(&self.newly_enabled);
        disjoint && union == self.enabled
    }
}

/// Markings must be equal; if `check_newly_enabled` is set,
/// newly-enabled sets must also match. This governs state-merging in the
/// enumeration engine, so it intentionally ignores `persistent`/`disabled` —
/// those are derived from `enabled`/`newly_enabled` by the firing evaluator
/// and never distinguish two states that are otherwise the same class.
impl PartialEq for PetriStateFeature {
    fn eq(&self, other: &Self) -> bool {
        if self.marking != other.marking {
            return false;
        }
        if self.check_newly_enabled {
            self.newly_enabled == other.newly_enabled
        } else {
            true
        }
    }
}
impl Eq for PetriStateFeature {}

//! Initial state builder (spec §4.5): given a net and a marking, produce a
//! `State` whose `PetriStateFeature` treats every initially-enabled
//! transition as newly enabled.

use crate::error::CoreResult;
use crate::net::{Marking, PetriNet};
use crate::state::{PetriStateFeature, State};

pub fn initial_state(net: &PetriNet, marking: Marking, check_newly_enabled: bool) -> CoreResult<State> {
    let enabled = net.enabled_transitions(&marking)?;
    let newly_enabled = enabled.clone();
    Ok(State::new().with_feature(PetriStateFeature {
        marking,
        enabled,
        newly_enabled,
        persistent: Default::default(),
        disabled: Default::default(),
        check_newly_enabled,
    }))
}

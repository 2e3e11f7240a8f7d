//! The Petri firing evaluator: computes the successor `State` produced by
//! firing a transition from a Petri-net state.

use std::collections::HashSet;

use crate::error::CoreResult;
use crate::net::{PetriNet, TransitionId};
use crate::state::{PetriStateFeature, State};

/// Fires `transition` from `prev`, returning the resulting state.
///
/// Steps: remove precondition tokens (and flush any `PlaceFlusher` places);
/// add postcondition tokens; apply any `PostUpdater` against the
/// pre-update marking; reclassify every transition as persistent,
/// newly-enabled or disabled relative to its status before/after the step.
pub fn fire(net: &PetriNet, prev: &State, transition: TransitionId) -> CoreResult<State> {
    let prev_feature = prev
        .petri()
        .ok_or(crate::error::StateError::MissingFeature("PetriStateFeature"))?;

    let mut tmp = prev_feature.marking.clone();
    net.remove_tokens_for_firing(&mut tmp, transition)?;

    let mut next = tmp.clone();
    net.add_tokens_for_firing(&mut next, transition);

    if let Some(updater) = net
        .transition(transition)
        .features
        .get::<crate::net::features::PostUpdater>()
    {
        next = apply_post_updater(net, &next, updater)?;
    }

    let prev_enabled = net.enabled_transitions(&prev_feature.marking)?;
    let mut tmp_enabled = net.enabled_transitions(&tmp)?;
    let next_enabled = net.enabled_transitions(&next)?;

    if let Some(reset) = net
        .transition(transition)
        .features
        .get::<crate::net::features::ResetSet>()
    {
        for member in &reset.0 {
            tmp_enabled.remove(member);
        }
    }

    let mut persistent: HashSet<TransitionId> = next_enabled
        .intersection(&tmp_enabled)
        .copied()
        .collect::<HashSet<_>>()
        .intersection(&prev_enabled)
        .copied()
        .collect();
    persistent.remove(&transition);

    let newly_enabled: HashSet<TransitionId> =
        next_enabled.difference(&persistent).copied().collect();

    let mut disabled: HashSet<TransitionId> = prev_enabled
        .difference(&next_enabled)
        .copied()
        .chain(prev_enabled.intersection(&newly_enabled).copied())
        .collect();
    disabled.remove(&transition);

    Ok(State::new().with_feature(PetriStateFeature {
        marking: next,
        enabled: next_enabled,
        newly_enabled,
        persistent,
        disabled,
        check_newly_enabled: prev_feature.check_newly_enabled,
    }))
}

/// Evaluates every post-updater expression against `base` (the marking
/// before any post-updater ran), then bulk-assigns the results into
/// `scratch`, so every right-hand side sees the same input marking
/// regardless of write order (simultaneous-assignment semantics).
fn apply_post_updater(
    net: &PetriNet,
    base: &crate::net::Marking,
    updater: &crate::net::features::PostUpdater,
) -> CoreResult<crate::net::Marking> {
    let bindings = crate::net::MarkingBindings { net, marking: base };
    let mut assignments = Vec::with_capacity(updater.0.len());
    for (place, expr) in &updater.0 {
        let value = crate::expr::eval::eval(expr, &bindings)?;
        let tokens = value.as_i64()?;
        if tokens < 0 {
            return Err(crate::error::CoreError::Domain(format!(
                "post-updater produced a negative token count for place {place}"
            )));
        }
        assignments.push((*place, tokens as u64));
    }
    let mut result = base.clone();
    for (place, tokens) in assignments {
        result.set_tokens(place, tokens);
    }
    Ok(result)
}

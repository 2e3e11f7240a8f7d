//! The Petri-net structural model: places, transitions, arcs, and markings
//! their structural relationships.
//!
//! Grounded on `knhk-patterns`'s Van der Aalst pattern definitions (places
//! and transitions as the structural substrate workflow patterns compile
//! down to) and on `other_examples`'s `MichaelOwenDyer-petrinets-rs`
//! reachability module for the arc/marking shape.

pub mod features;
pub mod ids;
pub mod marking;

pub use ids::{PlaceId, TransitionId};
pub use marking::Marking;

use crate::error::{CoreError, CoreResult, ValidationMessage};
use crate::expr::value::Bindings;
use crate::featurizable::FeatureMap;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArcKind {
    Precondition,
    Inhibitor,
}

#[derive(Debug, Clone, Copy)]
struct Arc {
    place: PlaceId,
    multiplicity: u64,
    kind: ArcKind,
}

/// A transition: identity plus its attached feature map (stochastic/timed
/// distribution, enabling function, priority, reset set, flusher,
/// post-updater, sampler).
#[derive(Debug, Clone)]
pub struct Transition {
    pub id: TransitionId,
    pub name: String,
    pub features: FeatureMap,
}

/// Binds place names, by token count, for expression evaluation against a
/// given marking (enabling functions, clock-rate expressions).
pub struct MarkingBindings<'a> {
    pub net: &'a PetriNet,
    pub marking: &'a Marking,
}

impl<'a> Bindings for MarkingBindings<'a> {
    fn lookup(&self, name: &str) -> Option<crate::expr::Value> {
        let place = self.net.place_id(name)?;
        Some(crate::expr::Value::Int(self.marking.tokens(place) as i64))
    }
}

#[derive(Debug, Clone, Default)]
pub struct PetriNet {
    place_names: Vec<String>,
    place_index: HashMap<String, PlaceId>,
    transitions: Vec<Transition>,
    transition_index: HashMap<String, TransitionId>,
    preconditions: HashMap<TransitionId, Vec<Arc>>,
    postconditions: HashMap<TransitionId, Vec<(PlaceId, u64)>>,
}

impl PetriNet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_place(&mut self, name: impl Into<String>) -> PlaceId {
        let name = name.into();
        if let Some(&id) = self.place_index.get(&name) {
            return id;
        }
        let id = PlaceId(self.place_names.len());
        self.place_names.push(name.clone());
        self.place_index.insert(name, id);
        id
    }

    pub fn add_transition(&mut self, name: impl Into<String>) -> TransitionId {
        let name = name.into();
        if let Some(&id) = self.transition_index.get(&name) {
            return id;
        }
        let id = TransitionId(self.transitions.len());
        self.transitions.push(Transition {
            id,
            name: name.clone(),
            features: FeatureMap::new(),
        });
        self.transition_index.insert(name, id);
        id
    }

    pub fn add_precondition(
        &mut self,
        place: PlaceId,
        transition: TransitionId,
        multiplicity: u64,
    ) -> CoreResult<()> {
        if multiplicity == 0 {
            return Err(CoreError::Validation(
                "precondition multiplicity must be >= 1".into(),
            ));
        }
        self.preconditions.entry(transition).or_default().push(Arc {
            place,
            multiplicity,
            kind: ArcKind::Precondition,
        });
        Ok(())
    }

    pub fn add_inhibitor_arc(
        &mut self,
        place: PlaceId,
        transition: TransitionId,
        multiplicity: u64,
    ) -> CoreResult<()> {
        if multiplicity == 0 {
            return Err(CoreError::Validation(
                "inhibitor multiplicity must be >= 1".into(),
            ));
        }
        self.preconditions.entry(transition).or_default().push(Arc {
            place,
            multiplicity,
            kind: ArcKind::Inhibitor,
        });
        Ok(())
    }

    pub fn add_postcondition(
        &mut self,
        transition: TransitionId,
        place: PlaceId,
        multiplicity: u64,
    ) -> CoreResult<()> {
        if multiplicity == 0 {
            return Err(CoreError::Validation(
                "postcondition multiplicity must be >= 1".into(),
            ));
        }
        self.postconditions
            .entry(transition)
            .or_default()
            .push((place, multiplicity));
        Ok(())
    }

    pub fn place_id(&self, name: &str) -> Option<PlaceId> {
        self.place_index.get(name).copied()
    }

    pub fn place_name(&self, id: PlaceId) -> &str {
        &self.place_names[id.0]
    }

    pub fn transition_id(&self, name: &str) -> Option<TransitionId> {
        self.transition_index.get(name).copied()
    }

    pub fn transition(&self, id: TransitionId) -> &Transition {
        &self.transitions[id.0]
    }

    pub fn transition_mut(&mut self, id: TransitionId) -> &mut Transition {
        &mut self.transitions[id.0]
    }

    pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.iter()
    }

    pub fn preconditions(&self, transition: TransitionId) -> &[Arc] {
        self.preconditions
            .get(&transition)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn postconditions(&self, transition: TransitionId) -> &[(PlaceId, u64)] {
        self.postconditions
            .get(&transition)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// True iff `transition` is enabled in `marking`: every precondition is
    /// satisfied, every inhibitor arc's place is below its threshold, and
    /// any attached `EnablingFunction` evaluates true.
    pub fn is_enabled(&self, transition: TransitionId, marking: &Marking) -> CoreResult<bool> {
        for arc in self.preconditions(transition) {
            let tokens = marking.tokens(arc.place);
            let ok = match arc.kind {
                ArcKind::Precondition => tokens >= arc.multiplicity,
                ArcKind::Inhibitor => tokens < arc.multiplicity,
            };
            if !ok {
                return Ok(false);
            }
        }
        if let Some(ef) = self
            .transition(transition)
            .features
            .get::<features::EnablingFunction>()
        {
            let bindings = MarkingBindings {
                net: self,
                marking,
            };
            let value = crate::expr::eval::eval(&ef.expr, &bindings)?;
            if !value.as_bool()? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// All transitions enabled in `marking`, in transition-declaration order
    /// in transition-declaration order.
    pub fn enabled_transitions(&self, marking: &Marking) -> CoreResult<HashSet<TransitionId>> {
        let mut out = HashSet::new();
        for t in &self.transitions {
            if self.is_enabled(t.id, marking)? {
                out.insert(t.id);
            }
        }
        Ok(out)
    }

    /// Removes precondition-arc tokens for `transition`'s firing, applying
    /// any attached `PlaceFlusher`.
    pub fn remove_tokens_for_firing(
        &self,
        marking: &mut Marking,
        transition: TransitionId,
    ) -> CoreResult<()> {
        for arc in self.preconditions(transition) {
            if arc.kind == ArcKind::Precondition {
                marking.remove_tokens(arc.place, arc.multiplicity)?;
            }
        }
        if let Some(flusher) = self
            .transition(transition)
            .features
            .get::<features::PlaceFlusher>()
        {
            for &place in &flusher.0 {
                marking.set_tokens(place, 0);
            }
        }
        Ok(())
    }

    /// Adds postcondition-arc tokens for `transition`'s firing (the default
    /// behaviour before any `PostUpdater` runs).
    pub fn add_tokens_for_firing(&self, marking: &mut Marking, transition: TransitionId) {
        for &(place, mult) in self.postconditions(transition) {
            marking.add_tokens(place, mult);
        }
    }

    /// Structural + feature-reference validation, run once at construction
    /// boundaries rather than lazily during enumeration, so authoring errors
    /// surface immediately instead of mid-run.
    pub fn validate(&self) -> Vec<ValidationMessage> {
        let mut messages = Vec::new();
        for t in &self.transitions {
            if let Some(updater) = t.features.get::<features::PostUpdater>() {
                for (place, _) in &updater.0 {
                    if place.0 >= self.place_names.len() {
                        messages.push(ValidationMessage::error(format!(
                            "transition '{}' post-updater references an unknown place",
                            t.name
                        )));
                    }
                }
            }
            if let Some(reset) = t.features.get::<features::ResetSet>() {
                for &peer in &reset.0 {
                    if peer.0 >= self.transitions.len() {
                        messages.push(ValidationMessage::error(format!(
                            "transition '{}' reset set references an unknown transition",
                            t.name
                        )));
                    }
                }
            }
        }
        if self.transitions.is_empty() {
            messages.push(ValidationMessage::warning("net has no transitions"));
        }
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_net() -> (PetriNet, PlaceId, PlaceId, TransitionId) {
        let mut net = PetriNet::new();
        let p0 = net.add_place("p0");
        let p1 = net.add_place("p1");
        let t0 = net.add_transition("t0");
        net.add_precondition(p0, t0, 1).unwrap();
        net.add_postcondition(t0, p1, 1).unwrap();
        (net, p0, p1, t0)
    }

    #[test]
    fn transition_enabled_iff_precondition_satisfied() {
        let (net, p0, _p1, t0) = simple_net();
        let mut m = Marking::new();
        assert!(!net.is_enabled(t0, &m).unwrap());
        m.set_tokens(p0, 1);
        assert!(net.is_enabled(t0, &m).unwrap());
    }

    #[test]
    fn inhibitor_arc_disables_transition_when_threshold_met() {
        let (mut net, p0, _p1, t0) = simple_net();
        let guard = net.add_place("guard");
        net.add_inhibitor_arc(guard, t0, 1).unwrap();
        let mut m = Marking::new();
        m.set_tokens(p0, 1);
        assert!(net.is_enabled(t0, &m).unwrap());
        m.set_tokens(guard, 1);
        assert!(!net.is_enabled(t0, &m).unwrap());
    }

    #[test]
    fn enabling_function_gates_in_addition_to_arcs() {
        let (mut net, p0, p1, t0) = simple_net();
        net.transition_mut(t0)
            .features
            .set(features::EnablingFunction::parse("p1 < 2").unwrap());
        let mut m = Marking::new();
        m.set_tokens(p0, 1);
        m.set_tokens(p1, 2);
        assert!(!net.is_enabled(t0, &m).unwrap());
        m.set_tokens(p1, 1);
        assert!(net.is_enabled(t0, &m).unwrap());
    }

    #[test]
    fn validate_flags_unknown_place_in_post_updater() {
        let (mut net, _p0, _p1, t0) = simple_net();
        net.transition_mut(t0).features.set(features::PostUpdater(vec![(
            PlaceId(99),
            crate::expr::Expr::Literal(crate::expr::Value::Int(1)),
        )]));
        let messages = net.validate();
        assert!(messages.iter().any(|m| m.level == crate::error::ValidationLevel::Error));
    }
}

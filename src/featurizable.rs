//! The `Featurizable` substrate: a heterogeneous, type-tag-keyed map that
//! lets states, transitions, and successions be polymorphically extended
//! with small immutable feature records.
//!
//! Grounded on the `variables: HashMap<String, String>` extensible context
//! bag threaded through `knhk-workflow-engine::executor::WorkflowEngine`'s
//! `PatternExecutionContext` — same idea (attach arbitrary typed data to a
//! core object) generalized from string values to a type-keyed map so feature
//! values can be full Rust types instead of stringly-typed payloads.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::{Hash, Hasher};

/// Marker trait every feature value must implement. A blanket impl below
/// covers any `'static + Debug + PartialEq` type, so ordinary structs/enums
/// can be used as features without extra boilerplate.
///
/// `Send + Sync` are supertraits (rather than bolted on at each use site via
/// `Box<dyn Feature + Send + Sync>`) so a `PetriNet` is itself `Send + Sync`
/// and can be shared across `rayon`'s worker threads when running
/// replications of a simulation in parallel.
pub trait Feature: Any + Debug + Send + Sync {
    fn eq_dyn(&self, other: &dyn Feature) -> bool;
    fn as_any(&self) -> &dyn Any;
    fn clone_box(&self) -> Box<dyn Feature>;
}

impl<T> Feature for T
where
    T: Any + Debug + PartialEq + Clone + Send + Sync,
{
    fn eq_dyn(&self, other: &dyn Feature) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|o| self == o)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_box(&self) -> Box<dyn Feature> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn Feature> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl PartialEq for Box<dyn Feature> {
    fn eq(&self, other: &Self) -> bool {
        self.as_ref().eq_dyn(other.as_ref())
    }
}

/// A mapping from feature-type-tag to feature-value, with at most one value
/// per tag. Equality of a `FeatureMap` is equality of its contents,
/// independent of insertion order.
#[derive(Debug, Default, Clone)]
pub struct FeatureMap {
    values: HashMap<TypeId, Box<dyn Feature>>,
}

impl FeatureMap {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Insert or replace the feature of type `T`. Returns the previous value
    /// of that type, if any.
    pub fn set<T: Feature + 'static>(&mut self, value: T) -> Option<Box<dyn Feature>> {
        self.values.insert(TypeId::of::<T>(), Box::new(value))
    }

    pub fn get<T: Feature + 'static>(&self) -> Option<&T> {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|f| f.as_any().downcast_ref::<T>())
    }

    pub fn contains<T: Feature + 'static>(&self) -> bool {
        self.values.contains_key(&TypeId::of::<T>())
    }

    pub fn remove<T: Feature + 'static>(&mut self) -> Option<Box<dyn Feature>> {
        self.values.remove(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PartialEq for FeatureMap {
    fn eq(&self, other: &Self) -> bool {
        if self.values.len() != other.values.len() {
            return false;
        }
        self.values.iter().all(|(tag, value)| {
            other
                .values
                .get(tag)
                .is_some_and(|other_value| value.eq_dyn(other_value.as_ref()))
        })
    }
}
impl Eq for FeatureMap {}

/// Feature maps do not derive `Hash` automatically (trait objects can't), so
/// callers that need set/map membership for a `Featurizable` object (the
/// enumeration engine's state-merging semantics) hash through a
/// type-specific projection instead, e.g. `PetriStateFeature`'s own `Hash`
/// impl in `crate::state`. This helper hashes the *shape* (which feature
/// types are present) as a cheap pre-filter.
pub fn hash_shape<H: Hasher>(map: &FeatureMap, state: &mut H) {
    let mut tags: Vec<&TypeId> = map.values.keys().collect();
    tags.sort_by_key(|t| format!("{:?}", t));
    for tag in tags {
        tag.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Foo(i32);
    #[derive(Debug, Clone, PartialEq)]
    struct Bar(String);

    #[test]
    fn set_and_get_round_trip() {
        let mut map = FeatureMap::new();
        map.set(Foo(42));
        map.set(Bar("hi".into()));
        assert_eq!(map.get::<Foo>(), Some(&Foo(42)));
        assert_eq!(map.get::<Bar>(), Some(&Bar("hi".into())));
    }

    #[test]
    fn overwriting_same_type_keeps_one_value() {
        let mut map = FeatureMap::new();
        map.set(Foo(1));
        map.set(Foo(2));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get::<Foo>(), Some(&Foo(2)));
    }

    #[test]
    fn equality_is_content_based_not_identity() {
        let mut a = FeatureMap::new();
        a.set(Foo(1));
        let mut b = FeatureMap::new();
        b.set(Foo(1));
        assert_eq!(a, b);
        b.set(Foo(2));
        assert_ne!(a, b);
    }
}

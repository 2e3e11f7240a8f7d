//! Place and transition identifiers.
//!
//! Grounded on `knhk-workflow-engine::case::CaseId` — a small newtype
//! wrapper with cheap `Copy` semantics and a human-readable `Display` — but
//! backed by an interned index rather than a UUID, since place/transition
//! identity is name-stable within one `PetriNet` rather than globally
//! unique.

use std::fmt;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct PlaceId(pub(crate) usize);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct TransitionId(pub(crate) usize);

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

impl fmt::Display for TransitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

//! Small cross-cutting utility types.

/// A minimal generic pair, used where a tuple would lose readability at the
/// call site (e.g. pairing a transition with its evaluated time-to-fire, or a
/// tick index with a count).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pair<A, B> {
    pub first: A,
    pub second: B,
}

impl<A, B> Pair<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

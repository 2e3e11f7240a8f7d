//! Marking: a mapping from place to non-negative integer token count
//! A place absent from the map is treated as zero, matching the
//! sparse-storage convention in `other_examples`'s Petri-net reachability
//! reference code (only nonzero places are ever inserted).

use super::ids::PlaceId;
use crate::error::CoreError;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Marking(BTreeMap<PlaceId, u64>);

impl Marking {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn tokens(&self, place: PlaceId) -> u64 {
        self.0.get(&place).copied().unwrap_or(0)
    }

    pub fn set_tokens(&mut self, place: PlaceId, count: u64) {
        if count == 0 {
            self.0.remove(&place);
        } else {
            self.0.insert(place, count);
        }
    }

    pub fn add_tokens(&mut self, place: PlaceId, count: u64) {
        if count == 0 {
            return;
        }
        let entry = self.0.entry(place).or_insert(0);
        *entry += count;
    }

    /// Removes `count` tokens from `place`. Fails with a `Domain` error
    /// (`UnderflowError` in spec terms) rather than saturating, since an
    /// underflow here means the firing rule computed an impossible
    /// successor.
    pub fn remove_tokens(&mut self, place: PlaceId, count: u64) -> Result<(), CoreError> {
        let current = self.tokens(place);
        if count > current {
            return Err(CoreError::Domain(format!(
                "removing {count} tokens from {place} would underflow (has {current})"
            )));
        }
        self.set_tokens(place, current - count);
        Ok(())
    }

    /// Overwrite this marking's contents with `other`'s (`setTokensFrom`).
    pub fn set_tokens_from(&mut self, other: &Marking) {
        self.0 = other.0.clone();
    }

    /// Places with a nonzero token count, in place-id order.
    pub fn support(&self) -> impl Iterator<Item = (PlaceId, u64)> + '_ {
        self.0.iter().map(|(p, c)| (*p, *c))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(PlaceId, u64)> for Marking {
    fn from_iter<I: IntoIterator<Item = (PlaceId, u64)>>(iter: I) -> Self {
        let mut m = Marking::new();
        for (p, c) in iter {
            m.set_tokens(p, c);
        }
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pl(n: usize) -> PlaceId {
        PlaceId(n)
    }

    #[test]
    fn absent_place_is_zero() {
        let m = Marking::new();
        assert_eq!(m.tokens(pl(0)), 0);
    }

    #[test]
    fn remove_tokens_underflow_is_domain_error() {
        let mut m = Marking::new();
        m.set_tokens(pl(0), 1);
        assert!(m.remove_tokens(pl(0), 2).is_err());
    }

    #[test]
    fn setting_zero_tokens_drops_the_place_from_storage() {
        let mut m = Marking::new();
        m.set_tokens(pl(0), 5);
        m.set_tokens(pl(0), 0);
        assert_eq!(m.support().count(), 0);
    }

    #[test]
    fn set_tokens_from_overwrites_contents() {
        let mut a = Marking::new();
        a.set_tokens(pl(0), 1);
        let mut b = Marking::new();
        b.set_tokens(pl(1), 9);
        a.set_tokens_from(&b);
        assert_eq!(a.tokens(pl(0)), 0);
        assert_eq!(a.tokens(pl(1)), 9);
    }
}

//! State accumulators: per-component, per-purpose ordered value sets.
//!
//! A purpose is a marker type implementing [`Accumulate`]. Any number of call
//! sites may push values under the same purpose on the same component; a
//! consumer elsewhere (draw pass, update pass, input replay) reads the whole
//! ordered set through [`Accumulator::all`].
//!
//! ```ignore
//! struct Tags;
//! impl Accumulate for Tags {
//!     type Value = &'static str;
//! }
//!
//! world.accumulator::<Tags>(component)?.add("enemy");
//! let tags = world.snapshot::<Tags>(component);
//! ```

use core::any::{Any, TypeId};

use rustc_hash::FxHashMap;

/// A registration purpose.
///
/// Each implementor is a distinct key; two different marker types never
/// share storage even if their `Value` types coincide.
pub trait Accumulate: 'static {
    /// Stored value. Equality decides deduplication.
    type Value: Clone + PartialEq + 'static;
}

/// Ordered, duplicate-free collection of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Accumulator<V> {
    values: Vec<V>,
}

impl<V> Default for Accumulator<V> {
    fn default() -> Self {
        Self { values: Vec::new() }
    }
}

impl<V: Clone + PartialEq> Accumulator<V> {
    /// Create an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` unless an equal value is already present.
    ///
    /// Returns `true` if the value was inserted.
    pub fn add(&mut self, value: V) -> bool {
        if self.values.contains(&value) {
            return false;
        }
        self.values.push(value);
        true
    }

    /// Remove `value`, keeping the relative order of the rest.
    ///
    /// Returns `true` if the value was present.
    pub fn remove(&mut self, value: &V) -> bool {
        match self.values.iter().position(|v| v == value) {
            Some(index) => {
                self.values.remove(index);
                true
            }
            None => false,
        }
    }

    /// Owned snapshot in insertion order.
    ///
    /// Mutating the accumulator while iterating the snapshot does not affect
    /// the snapshot.
    #[must_use]
    pub fn all(&self) -> Vec<V> {
        self.values.clone()
    }

    #[must_use]
    pub fn contains(&self, value: &V) -> bool {
        self.values.contains(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &V> {
        self.values.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

/// Type-erased map from purpose to accumulator, owned by one component.
#[derive(Default)]
pub struct AccumulatorMap {
    slots: FxHashMap<TypeId, Box<dyn Any>>,
}

impl AccumulatorMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the accumulator for `K`, creating it on first use.
    pub fn entry<K: Accumulate>(&mut self) -> &mut Accumulator<K::Value> {
        self.slots
            .entry(TypeId::of::<K>())
            .or_insert_with(|| Box::new(Accumulator::<K::Value>::new()))
            .downcast_mut::<Accumulator<K::Value>>()
            .unwrap_or_else(|| unreachable!("accumulator slot keyed by its own TypeId"))
    }

    /// Get the accumulator for `K` if anything was ever registered.
    #[must_use]
    pub fn get<K: Accumulate>(&self) -> Option<&Accumulator<K::Value>> {
        self.slots
            .get(&TypeId::of::<K>())
            .and_then(|slot| slot.downcast_ref::<Accumulator<K::Value>>())
    }

    /// Snapshot of `K`'s values, empty if none.
    #[must_use]
    pub fn snapshot<K: Accumulate>(&self) -> Vec<K::Value> {
        self.get::<K>().map(Accumulator::all).unwrap_or_default()
    }

    /// Whether `K` has at least one value.
    #[must_use]
    pub fn has<K: Accumulate>(&self) -> bool {
        self.get::<K>().is_some_and(|acc| !acc.is_empty())
    }

    /// Number of purposes with storage allocated.
    #[must_use]
    pub fn purposes(&self) -> usize {
        self.slots.len()
    }
}

impl core::fmt::Debug for AccumulatorMap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AccumulatorMap")
            .field("purposes", &self.slots.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Names;
    impl Accumulate for Names {
        type Value = &'static str;
    }

    struct Aliases;
    impl Accumulate for Aliases {
        type Value = &'static str;
    }

    #[test]
    fn test_add_is_deduplicated() {
        let mut acc = Accumulator::new();
        assert!(acc.add("x"));
        assert!(!acc.add("x"));
        assert_eq!(acc.all(), vec!["x"]);
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut acc = Accumulator::new();
        for v in ["a", "b", "c", "d"] {
            acc.add(v);
        }

        assert!(acc.remove(&"b"));
        assert!(!acc.remove(&"b"));
        assert_eq!(acc.all(), vec!["a", "c", "d"]);
    }

    #[test]
    fn test_snapshot_is_stable_under_mutation() {
        let mut acc = Accumulator::new();
        acc.add(1);
        acc.add(2);

        let snapshot = acc.all();
        acc.add(3);
        acc.remove(&1);

        assert_eq!(snapshot, vec![1, 2]);
        assert_eq!(acc.all(), vec![2, 3]);
    }

    #[test]
    fn test_purposes_do_not_share_storage() {
        let mut map = AccumulatorMap::new();
        map.entry::<Names>().add("alice");
        map.entry::<Aliases>().add("al");

        assert_eq!(map.snapshot::<Names>(), vec!["alice"]);
        assert_eq!(map.snapshot::<Aliases>(), vec!["al"]);
        assert_eq!(map.purposes(), 2);
    }

    #[test]
    fn test_missing_purpose_is_empty() {
        let map = AccumulatorMap::new();
        assert!(map.snapshot::<Names>().is_empty());
        assert!(!map.has::<Names>());
    }
}

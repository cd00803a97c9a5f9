//! Immutable mapping helpers for transition tables.
//!
//! The canonical representation for an automaton's transition
//! function is multi-valued (every key maps to a *set* of target states),
//! even for deterministic machines where every such set happens to have at
//! most one member. [`MultiMap`] is that canonical representation.
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// An immutable mapping from keys to sets of values.
///
/// This is the transition map's canonical storage form: `δ: (state, symbol)
/// -> {states}`. Entries whose value set becomes empty are never stored.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiMap<K: Eq + Hash + Clone, V: Eq + Hash + Clone> {
    inner: HashMap<K, HashSet<V>>,
}

impl<K: Eq + Hash + Clone, V: Eq + Hash + Clone> MultiMap<K, V> {
    pub fn new() -> Self {
        MultiMap { inner: HashMap::new() }
    }

    /// Build a multi-map from a mapping whose values are already sets.
    pub fn from_multi(pairs: impl IntoIterator<Item = (K, HashSet<V>)>) -> Self {
        let mut inner = HashMap::new();
        for (key, values) in pairs {
            if !values.is_empty() {
                inner.insert(key, values);
            }
        }
        MultiMap { inner }
    }

    /// Build a multi-map from a single-valued mapping, wrapping each value
    /// in a singleton set.
    pub fn from_single(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        let mut inner: HashMap<K, HashSet<V>> = HashMap::new();
        for (key, value) in pairs {
            inner.entry(key).or_default().insert(value);
        }
        MultiMap { inner }
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.inner.entry(key).or_default().insert(value);
    }

    pub fn union_insert(&mut self, key: K, values: impl IntoIterator<Item = V>) {
        let entry = self.inner.entry(key).or_default();
        entry.extend(values);
    }

    pub fn get(&self, key: &K) -> impl Iterator<Item = &V> {
        self.inner.get(key).into_iter().flatten()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.contains_key(key)
    }

    pub fn remove(&mut self, key: &K) -> Option<HashSet<V>> {
        self.inner.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.inner.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &HashSet<V>)> {
        self.inner.iter()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<K: Eq + Hash + Clone, V: Eq + Hash + Clone> Default for MultiMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_single_wraps_in_singletons() {
        let map: MultiMap<&str, i32> = MultiMap::from_single([("a", 1), ("b", 2)]);
        assert_eq!(map.get(&"a").collect::<Vec<_>>(), vec![&1]);
    }

    #[test]
    fn union_insert_merges_existing_entries() {
        let mut map: MultiMap<&str, i32> = MultiMap::new();
        map.insert("a", 1);
        map.union_insert("a", [2, 3]);
        let mut values: Vec<_> = map.get(&"a").copied().collect();
        values.sort();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn empty_value_sets_are_not_stored() {
        let map: MultiMap<&str, i32> = MultiMap::from_multi([("a", Default::default())]);
        assert!(!map.contains_key(&"a"));
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural helpers: an insertion-ordered map and a keyed transform.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

/// Transform every value of a keyed map, keeping its keys.
pub fn map_values<K: Ord, V, W>(map: BTreeMap<K, V>, mut f: impl FnMut(V) -> W) -> BTreeMap<K, W> {
    map.into_iter().map(|(k, v)| (k, f(v))).collect()
}

/// A map that iterates in insertion order.
///
/// Lookups go through a side index; iteration and [`to_list`](Self::to_list) follow the
/// order in which keys were first inserted.
#[derive(Clone, Debug)]
pub struct OrderedMap<K, V> {
    entries: Vec<(K, V)>,
    index: BTreeMap<K, usize>,
}

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Clone, V> OrderedMap<K, V> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value` under `key` unless the key is already present.
    ///
    /// Returns `true` if the entry was inserted.
    pub fn insert_if_absent(&mut self, key: K, value: V) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        true
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Value stored under `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Move every entry out, in insertion order, leaving the map empty.
    pub fn to_list(&mut self) -> Vec<(K, V)> {
        self.index.clear();
        core::mem::take(&mut self.entries)
    }
}

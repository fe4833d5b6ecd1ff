// crates/epsg-core/src/runtime/pool.rs
// ============================================================================
// Module: Weak Object Pools
// Description: Weakly held keyed maps and canonicalizing value pools.
// Purpose: Share equal objects without pinning them in memory.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Pools hold [`Weak`] references only: an entry lives as long as some caller
//! still owns the object. Dead entries are pruned opportunistically on insert
//! so the maps stay proportional to the set of live objects.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::Weak;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Inserts between two pruning passes.
const PRUNE_INTERVAL: usize = 64;

// ============================================================================
// SECTION: Weak Value Map
// ============================================================================

/// Map from keys to weakly held values.
#[derive(Debug)]
pub struct WeakValueMap<K, V> {
    /// Entries; values may be dead.
    entries: HashMap<K, Weak<V>>,
    /// Inserts since the last prune.
    inserts: usize,
}

impl<K, V> Default for WeakValueMap<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            inserts: 0,
        }
    }
}

impl<K: Eq + Hash, V> WeakValueMap<K, V> {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the live value registered under `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.entries.get(key).and_then(Weak::upgrade)
    }

    /// Registers `value` under `key`, replacing any previous entry.
    pub fn insert(&mut self, key: K, value: &Arc<V>) {
        self.inserts += 1;
        if self.inserts >= PRUNE_INTERVAL {
            self.prune();
        }
        self.entries.insert(key, Arc::downgrade(value));
    }

    /// Removes every dead entry.
    pub fn prune(&mut self) {
        self.entries.retain(|_, value| value.strong_count() > 0);
        self.inserts = 0;
    }

    /// Returns the number of live entries.
    #[must_use]
    pub fn live_len(&self) -> usize {
        self.entries.values().filter(|value| value.strong_count() > 0).count()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.inserts = 0;
    }
}

// ============================================================================
// SECTION: Canonical Pool
// ============================================================================

/// Pool collapsing structurally equal values to one shared instance.
///
/// Values are bucketed by a caller-supplied fingerprint and compared with
/// [`PartialEq`] inside a bucket.
#[derive(Debug)]
pub struct CanonicalPool<T> {
    /// Fingerprint buckets of weakly held values.
    buckets: HashMap<String, Vec<Weak<T>>>,
    /// Inserts since the last prune.
    inserts: usize,
}

impl<T> Default for CanonicalPool<T> {
    fn default() -> Self {
        Self {
            buckets: HashMap::new(),
            inserts: 0,
        }
    }
}

impl<T: PartialEq> CanonicalPool<T> {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the live value equal to `value`, registering `value` when none
    /// exists.
    pub fn canonicalize(&mut self, fingerprint: String, value: Arc<T>) -> Arc<T> {
        self.inserts += 1;
        if self.inserts >= PRUNE_INTERVAL {
            self.prune();
        }
        let bucket = self.buckets.entry(fingerprint).or_default();
        if let Some(existing) =
            bucket.iter().filter_map(Weak::upgrade).find(|candidate| **candidate == *value)
        {
            return existing;
        }
        bucket.retain(|candidate| candidate.strong_count() > 0);
        bucket.push(Arc::downgrade(&value));
        value
    }

    /// Removes dead entries and empty buckets.
    pub fn prune(&mut self) {
        for bucket in self.buckets.values_mut() {
            bucket.retain(|candidate| candidate.strong_count() > 0);
        }
        self.buckets.retain(|_, bucket| !bucket.is_empty());
        self.inserts = 0;
    }

    /// Returns the number of live pooled values.
    #[must_use]
    pub fn live_len(&self) -> usize {
        self.buckets
            .values()
            .flat_map(|bucket| bucket.iter())
            .filter(|candidate| candidate.strong_count() > 0)
            .count()
    }
}

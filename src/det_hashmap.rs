//! Deterministic HashMap with sorted iteration.
//!
//! Regular HashMap iteration order depends on the hasher's random state,
//! which would make event order differ between two runs of the same
//! workload. `DetHashMap` keeps O(1) lookups and only exposes iteration in
//! sorted key order.

use std::collections::HashMap;
use std::hash::Hash;

/// A HashMap wrapper that only iterates in key order.
///
/// # Example
///
/// ```
/// use cpusim::det_hashmap::DetHashMap;
///
/// let mut io_done: DetHashMap<&str, u64> = DetHashMap::new();
/// io_done.insert("C", 12);
/// io_done.insert("A", 9);
/// io_done.insert("B", 30);
///
/// let due = io_done.extract_sorted(|_, &at| at <= 12);
/// assert_eq!(due, vec![("A", 9), ("C", 12)]);
/// assert_eq!(io_done.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct DetHashMap<K, V>(HashMap<K, V>);

impl<K, V> DetHashMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        DetHashMap(HashMap::new())
    }

    /// Inserts a key-value pair, returning the previous value if present.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.0.insert(key, value)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.0.get_mut(key)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> DetHashMap<K, V>
where
    K: Eq + Hash + Ord + Clone,
{
    /// Removes every entry matching `pred`, returning them in sorted key order.
    pub fn extract_sorted<F>(&mut self, mut pred: F) -> Vec<(K, V)>
    where
        F: FnMut(&K, &V) -> bool,
    {
        let mut keys: Vec<K> = self
            .0
            .iter()
            .filter(|(k, v)| pred(k, v))
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort();
        keys.into_iter()
            .filter_map(|k| self.0.remove(&k).map(|v| (k, v)))
            .collect()
    }
}

impl<K, V> Default for DetHashMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

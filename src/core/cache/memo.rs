//! Keyed memo cache for pass-through lookups that never go stale
//! (sunrise/sunset, moon phase, marine forecast).

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

pub struct MemoCache<K, V> {
    map: RwLock<HashMap<K, Arc<V>>>,
}

impl<K: Eq + Hash, V> Default for MemoCache<K, V> {
    fn default() -> Self {
        Self {
            map: RwLock::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone, V> MemoCache<K, V> {
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.map.read().unwrap().get(key).map(Arc::clone)
    }

    /// Insert and return the stored value. If another writer raced us, the
    /// existing entry wins so concurrent callers converge on one value.
    pub fn insert(&self, key: K, value: V) -> Arc<V> {
        let mut map = self.map.write().unwrap();
        Arc::clone(map.entry(key).or_insert_with(|| Arc::new(value)))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.map.read().unwrap().len()
    }
}

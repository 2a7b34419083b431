use std::borrow::Borrow;
use std::fmt::Debug;
use std::hash::Hash;

use tracing::debug;

use super::linked_arena::LinkedArena;

/// A fixed capacity store ordered by recency of access.
///
/// Every structural removal, whether caused by overflow, [`LruPolicy::remove`] or
/// [`LruPolicy::clear`], hands the owned key and value to the caller supplied hook.
pub(crate) struct LruPolicy<K, V> {
    capacity: Option<usize>,
    pub(crate) arena: LinkedArena<K, V>,
}

impl<K, V> LruPolicy<K, V> {
    /// # Panics:
    /// If capacity is zero
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "LRU capacity must be greater than 0");

        LruPolicy {
            capacity: Some(capacity),
            arena: LinkedArena::new(),
        }
    }

    /// A store that never evicts on its own
    pub fn unbounded() -> Self {
        LruPolicy {
            capacity: None,
            arena: LinkedArena::new(),
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }
}

impl<K, V> LruPolicy<K, V>
where
    K: Clone + Hash + Eq,
{
    /// Look up a key and mark it as the most recently used one
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let idx = self.arena.index_of(key)?;
        self.arena.move_to_head(idx);

        Some(&self.arena.nodes[idx].value)
    }

    /// Look up a key without touching its position
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.arena
            .index_of(key)
            .map(|idx| &self.arena.nodes[idx].value)
    }

    /// Insert a value as the most recently used one.
    ///
    /// If the key is already present its value is replaced and the old one returned, the hook is
    /// not called for it. Otherwise the least recently used entries are evicted through `on_evict`
    /// until the store fits its capacity again.
    pub fn put<F>(&mut self, key: K, value: V, mut on_evict: F) -> Option<V>
    where
        F: FnMut(K, V),
    {
        if let Some(idx) = self.arena.index_of(&key) {
            self.arena.move_to_head(idx);

            return Some(std::mem::replace(&mut self.arena.nodes[idx].value, value));
        }

        self.arena.insert_head(key, value);
        self.evict(&mut on_evict);

        None
    }

    /// Remove a key, returns false if it wasnt present
    pub fn remove<Q, F>(&mut self, key: &Q, mut on_evict: F) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnMut(K, V),
    {
        match self.arena.index_of(key) {
            Some(idx) => {
                let node = self.arena.remove(idx);
                on_evict(node.key, node.value);

                true
            }
            None => false,
        }
    }

    /// Remove every entry, least recently used first
    pub fn clear<F>(&mut self, mut on_evict: F)
    where
        F: FnMut(K, V),
    {
        while let Some(node) = self.arena.pop_tail() {
            on_evict(node.key, node.value);
        }
    }

    #[inline]
    fn evict<F>(&mut self, on_evict: &mut F)
    where
        F: FnMut(K, V),
    {
        let Some(capacity) = self.capacity else {
            return;
        };

        // were called after every insert, so there should never be more than one item to evict
        while self.arena.len() > capacity {
            match self.arena.pop_tail() {
                Some(node) => {
                    debug!(len = self.arena.len(), capacity, "evicting least recently used entry");
                    on_evict(node.key, node.value);
                }
                None => break,
            }
        }
    }
}

impl<K, V> Debug for LruPolicy<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LruPolicy")
            .field("capacity", &self.capacity)
            .field("len", &self.arena.len())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn insert_n(store: &mut LruPolicy<i32, i32>, n: i32, evicted: &mut Vec<i32>) {
        for i in 0..n {
            store.put(i, i * 10, |k, _| evicted.push(k));
        }
    }

    #[test]
    /// Insert 5 keys into a store of 3
    /// this will leave only the last 3 items inserted
    fn test_basic_scenario_1() {
        let mut store = LruPolicy::new(3);
        let mut evicted = Vec::new();

        insert_n(&mut store, 5, &mut evicted);

        assert_eq!(store.len(), 3);
        assert_eq!(evicted, vec![0, 1]);
        assert_eq!(store.arena.keys_in_order(), vec![4, 3, 2]);
    }

    #[test]
    fn test_get_promotes() {
        let mut store = LruPolicy::new(2);
        let mut evicted = Vec::new();

        store.put("a", 1, |k, _| evicted.push(k));
        store.put("b", 2, |k, _| evicted.push(k));
        assert_eq!(store.get("a"), Some(&1));
        store.put("c", 3, |k, _| evicted.push(k));

        assert_eq!(evicted, vec!["b"]);
        assert_eq!(store.arena.keys_in_order(), vec!["c", "a"]);
    }

    #[test]
    fn test_peek_does_not_promote() {
        let mut store = LruPolicy::new(2);
        let mut evicted = Vec::new();

        store.put("a", 1, |k, _| evicted.push(k));
        store.put("b", 2, |k, _| evicted.push(k));
        assert_eq!(store.peek("a"), Some(&1));
        store.put("c", 3, |k, _| evicted.push(k));

        assert_eq!(evicted, vec!["a"]);
    }

    #[test]
    fn test_put_existing_replaces_without_hook() {
        let mut store = LruPolicy::new(2);
        let mut evicted = Vec::new();

        store.put("a", 1, |k, _| evicted.push(k));
        store.put("b", 2, |k, _| evicted.push(k));
        let old = store.put("a", 10, |k, _| evicted.push(k));

        assert_eq!(old, Some(1));
        assert!(evicted.is_empty());
        assert_eq!(store.arena.keys_in_order(), vec!["a", "b"]);
        assert_eq!(store.peek("a"), Some(&10));
    }

    #[test]
    fn test_remove_calls_hook() {
        let mut store = LruPolicy::new(5);
        let mut evicted = Vec::new();

        insert_n(&mut store, 4, &mut evicted);

        assert!(store.remove(&2, |k, v| evicted.push(k + v)));
        assert!(!store.remove(&2, |k, v| evicted.push(k + v)));
        assert!(!store.remove(&42, |k, v| evicted.push(k + v)));

        assert_eq!(evicted, vec![22]);
        assert_eq!(store.arena.keys_in_order(), vec![3, 1, 0]);
    }

    #[test]
    fn test_clear() {
        let mut store = LruPolicy::new(5);
        let mut evicted = Vec::new();

        insert_n(&mut store, 3, &mut evicted);
        store.clear(|k, _| evicted.push(k));

        assert_eq!(evicted, vec![0, 1, 2]);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_unbounded_never_evicts() {
        let mut store = LruPolicy::unbounded();
        let mut evicted = Vec::new();

        insert_n(&mut store, 1000, &mut evicted);

        assert!(evicted.is_empty());
        assert_eq!(store.len(), 1000);
        assert_eq!(store.capacity(), None);
    }

    #[test]
    #[should_panic]
    fn test_zero_capacity_panics() {
        let _ = LruPolicy::<i32, i32>::new(0);
    }
}

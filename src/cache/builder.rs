use super::LruCache;
use crate::entry::OnEvicted;
use crate::error::BuildError;
use crate::policy::LruPolicy;

use std::hash::Hash;
use std::sync::Arc;

/// Configures a [`LruCache`] before it is shared.
///
/// ```rust
/// use ref_lru::LruCache;
///
/// let cache = LruCache::<String, u32>::builder()
///     .capacity(128)
///     .on_evicted(|key, _value| println!("closing {key}"))
///     .build()
///     .unwrap();
///
/// assert_eq!(cache.capacity(), Some(128));
/// ```
pub struct CacheBuilder<K, V> {
    pub(crate) capacity: Option<usize>,
    pub(crate) unbounded: bool,
    pub(crate) on_evicted: Option<OnEvicted<K, V>>,
}

impl<K, V> CacheBuilder<K, V> {
    pub fn new() -> Self {
        CacheBuilder {
            capacity: None,
            unbounded: false,
            on_evicted: None,
        }
    }

    /// Maximum number of entries kept in the cache
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self.unbounded = false;
        self
    }

    /// Never evict on capacity, entries only leave through removal
    pub fn unbounded(mut self) -> Self {
        self.capacity = None;
        self.unbounded = true;
        self
    }

    /// Callback run once per entry when it has left the cache and every borrower is done with it
    pub fn on_evicted<F>(mut self, on_evicted: F) -> Self
    where
        F: Fn(&K, &V) + Send + Sync + 'static,
    {
        self.on_evicted = Some(Arc::new(on_evicted));
        self
    }

    pub fn build(self) -> Result<LruCache<K, V>, BuildError>
    where
        K: Clone + Eq + Hash,
    {
        let policy = match (self.capacity, self.unbounded) {
            (Some(0), _) => return Err(BuildError::ZeroCapacity),
            (Some(capacity), _) => LruPolicy::new(capacity),
            (None, true) => LruPolicy::unbounded(),
            (None, false) => return Err(BuildError::ZeroCapacity),
        };

        Ok(LruCache::from_parts(policy, self.on_evicted))
    }
}

impl<K, V> Default for CacheBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_zero_capacity_is_rejected() {
        let err = CacheBuilder::<String, u32>::new().capacity(0).build().unwrap_err();

        assert_eq!(err, BuildError::ZeroCapacity);
        assert_eq!(err.to_string(), "cache capacity must be greater than 0");
    }

    #[test]
    fn test_missing_capacity_is_rejected() {
        let err = CacheBuilder::<String, u32>::new().build().unwrap_err();

        assert_eq!(err, BuildError::ZeroCapacity);
    }

    #[test]
    fn test_unbounded() {
        let cache = CacheBuilder::<u32, u32>::new().unbounded().build().unwrap();

        for i in 0..100 {
            cache.add(i, i).0.done();
        }

        assert_eq!(cache.capacity(), None);
        assert_eq!(cache.len(), 100);
    }

    #[test]
    fn test_capacity_after_unbounded_wins() {
        let cache = CacheBuilder::<u32, u32>::new()
            .unbounded()
            .capacity(3)
            .build()
            .unwrap();

        assert_eq!(cache.capacity(), Some(3));
    }

    #[test]
    fn test_builder_callback_is_used() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();

        let cache = CacheBuilder::<&'static str, u32>::new()
            .capacity(1)
            .on_evicted(move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .build()
            .unwrap();

        cache.add("a", 1).0.done();
        cache.add("b", 2).0.done();

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}

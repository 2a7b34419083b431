pub mod builder;
mod handle;

pub use builder::CacheBuilder;
pub use handle::Handle;

use crate::entry::{OnEvicted, RefCounted};
use crate::policy::LruPolicy;

use parking_lot::{Mutex, RwLock};
use tracing::trace;

use std::borrow::Borrow;
use std::fmt::{self, Debug, Formatter};
use std::hash::Hash;
use std::sync::Arc;

pub(crate) type Store<K, V> = LruPolicy<K, Arc<RefCounted<K, V>>>;

/// A LRU cache that counts references to its values.
///
/// Evicting or removing a key only drops the cache's own reference to the value, the eviction
/// callback runs once every [`Handle`] to it has been released as well.
///
/// The cache is safe to share between threads, every operation takes a single cache wide lock.
/// Clones share the same entries.
///
/// ### Note
/// The eviction callback runs while locks of the cache are held, it must never call back into the
/// same cache. Values themselves are dropped after the locks are released, so a value may hold a
/// [`Handle`] into the cache it lives in.
pub struct LruCache<K, V> {
    store: Arc<Mutex<Store<K, V>>>,
    on_evicted: Arc<RwLock<Option<OnEvicted<K, V>>>>,
}

impl<K, V> Clone for LruCache<K, V> {
    fn clone(&self) -> Self {
        LruCache {
            store: self.store.clone(),
            on_evicted: self.on_evicted.clone(),
        }
    }
}

impl<K, V> Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let store = self.store.lock();

        f.debug_struct("LruCache")
            .field("capacity", &store.capacity())
            .field("len", &store.len())
            .finish()
    }
}

impl<K, V> LruCache<K, V> {
    /// # Panics:
    /// If capacity is zero, see [`CacheBuilder::build`] for a fallible version
    pub fn new(capacity: usize) -> Self {
        Self::from_parts(LruPolicy::new(capacity), None)
    }

    /// A cache that never evicts on its own
    pub fn unbounded() -> Self {
        Self::from_parts(LruPolicy::unbounded(), None)
    }

    pub fn builder() -> CacheBuilder<K, V> {
        CacheBuilder::new()
    }

    pub(crate) fn from_parts(policy: Store<K, V>, on_evicted: Option<OnEvicted<K, V>>) -> Self {
        LruCache {
            store: Arc::new(Mutex::new(policy)),
            on_evicted: Arc::new(RwLock::new(on_evicted)),
        }
    }

    /// Set the callback for entries added from now on.
    ///
    /// Entries keep the callback that was set when they were added, changing it later does not
    /// affect them.
    pub fn set_on_evicted<F>(&self, on_evicted: F)
    where
        F: Fn(&K, &V) + Send + Sync + 'static,
    {
        *self.on_evicted.write() = Some(Arc::new(on_evicted));
    }

    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The configured capacity, [`None`] if the cache is unbounded
    pub fn capacity(&self) -> Option<usize> {
        self.store.lock().capacity()
    }
}

impl<K, V> LruCache<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Get a value and borrow it until the returned handle is released
    pub fn get<Q>(&self, key: &Q) -> Option<Handle<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let mut store = self.store.lock();

        let Some(entry) = store.get(key) else {
            trace!("cache miss");
            return None;
        };

        let entry = Arc::clone(entry);
        entry.inc();
        trace!("cache hit");

        Some(Handle::new(entry, Arc::clone(&self.store)))
    }

    /// Add a value to the cache and borrow it.
    ///
    /// If the key is already cached the given value is dropped and the cached one is borrowed
    /// instead, the returned flag tells whether `value` was actually inserted.
    pub fn add(&self, key: K, value: V) -> (Handle<K, V>, bool) {
        let mut store = self.store.lock();

        if let Some(entry) = store.get(&key) {
            let entry = Arc::clone(entry);
            entry.inc();
            trace!("key already cached, keeping the existing value");

            // the rejected value may itself hold a handle into this cache
            drop(store);
            drop(value);

            return (Handle::new(entry, Arc::clone(&self.store)), false);
        }

        let on_evicted = self.on_evicted.read().clone();
        let entry = Arc::new(RefCounted::new(key.clone(), value, on_evicted));

        // the cache slot holds one reference until the key leaves the store
        entry.initialize();
        // the caller holds another one until its handle is released
        entry.inc();

        let mut evicted = Vec::new();
        store.put(key, Arc::clone(&entry), finalize_into(&mut evicted));
        drop(store);
        drop(evicted);

        (Handle::new(entry, Arc::clone(&self.store)), true)
    }

    /// Remove a key from the cache.
    ///
    /// The eviction callback still waits for outstanding handles to be released.
    pub fn remove<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let mut evicted = Vec::new();

        if self.store.lock().remove(key, finalize_into(&mut evicted)) {
            trace!("removed key");
        }

        drop(evicted);
    }

    /// Whether the key is cached, without marking it as used
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.store.lock().peek(key).is_some()
    }

    /// Remove every key, as if [`LruCache::remove`] was called for each of them
    pub fn clear(&self) {
        let mut evicted = Vec::new();
        self.store.lock().clear(finalize_into(&mut evicted));

        drop(evicted);
    }
}

/// Eviction hook for the store.
///
/// Releases the reference taken in add under the cache lock, the evicted entries are only
/// collected so the caller can drop them once the lock is released. Dropping a value may release
/// handles into this very cache.
#[inline]
fn finalize_into<K, V>(
    evicted: &mut Vec<Arc<RefCounted<K, V>>>,
) -> impl FnMut(K, Arc<RefCounted<K, V>>) + '_ {
    move |_, entry| {
        entry.finalize();
        evicted.push(entry);
    }
}

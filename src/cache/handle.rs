use parking_lot::Mutex;

use std::fmt::{self, Debug, Formatter};
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::Store;
use crate::entry::RefCounted;

/// A borrowed reference to a cached value.
///
/// While a handle is alive the value will not be finalized, even if the cache has already evicted
/// it. Call [`Handle::done`] or drop the handle to give the reference back. Only the first release
/// counts, later calls are no-ops.
#[must_use = "the borrow is released as soon as the handle is dropped"]
pub struct Handle<K, V> {
    entry: Arc<RefCounted<K, V>>,
    store: Arc<Mutex<Store<K, V>>>,
    released: AtomicBool,
}

impl<K, V> Handle<K, V> {
    pub(crate) fn new(entry: Arc<RefCounted<K, V>>, store: Arc<Mutex<Store<K, V>>>) -> Self {
        Handle {
            entry,
            store,
            released: AtomicBool::new(false),
        }
    }

    pub fn key(&self) -> &K {
        self.entry.key()
    }

    pub fn value(&self) -> &V {
        self.entry.value()
    }

    /// Release this borrow.
    ///
    /// If the entry was already evicted and this was the last reference the eviction callback runs
    /// before this returns, on the calling thread.
    pub fn done(&self) {
        // serialize with structural changes, the lock order is always cache -> entry
        let _store = self.store.lock();

        if !self.released.swap(true, Ordering::AcqRel) {
            self.entry.dec();
        }
    }

    /// Whether [`Handle::done`] was already called
    pub fn is_done(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    #[cfg(test)]
    pub(crate) fn refs(&self) -> i64 {
        self.entry.refs()
    }
}

impl<K, V> Deref for Handle<K, V> {
    type Target = V;

    fn deref(&self) -> &V {
        self.value()
    }
}

impl<K, V> Drop for Handle<K, V> {
    fn drop(&mut self) {
        if !self.is_done() {
            self.done();
        }
    }
}

impl<K: Debug, V: Debug> Debug for Handle<K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("key", self.key())
            .field("value", self.value())
            .field("done", &self.is_done())
            .finish()
    }
}

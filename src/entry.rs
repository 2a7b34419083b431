use parking_lot::Mutex;
use tracing::trace;

use std::sync::Arc;

/// Callback run once a value has left the cache and nobody refers to it anymore.
pub type OnEvicted<K, V> = Arc<dyn Fn(&K, &V) + Send + Sync>;

/// A cached value together with the number of parties currently holding it.
///
/// The cache slot itself owns one reference (the baseline) from [`RefCounted::initialize`] until
/// [`RefCounted::finalize`], every borrower owns one more. The eviction callback fires under the
/// entry lock as soon as the count drops to zero.
pub(crate) struct RefCounted<K, V> {
    key: K,
    value: V,
    on_evicted: Option<OnEvicted<K, V>>,
    state: Mutex<RefState>,
}

#[derive(Debug, Default)]
struct RefState {
    refs: i64,
    initialized: bool,
    finalized: bool,
    evicted: bool,
}

impl<K, V> RefCounted<K, V> {
    pub(crate) fn new(key: K, value: V, on_evicted: Option<OnEvicted<K, V>>) -> Self {
        RefCounted {
            key,
            value,
            on_evicted,
            state: Mutex::new(RefState::default()),
        }
    }

    pub(crate) fn key(&self) -> &K {
        &self.key
    }

    pub(crate) fn value(&self) -> &V {
        &self.value
    }

    #[cfg(test)]
    pub(crate) fn refs(&self) -> i64 {
        self.state.lock().refs
    }

    /// Take the baseline reference, only the first call has any effect
    pub(crate) fn initialize(&self) {
        let mut state = self.state.lock();

        if !std::mem::replace(&mut state.initialized, true) {
            state.refs += 1;
        }
    }

    /// Release the baseline reference, only the first call has any effect
    pub(crate) fn finalize(&self) {
        let mut state = self.state.lock();

        if !std::mem::replace(&mut state.finalized, true) {
            self.release(&mut state);
        }
    }

    pub(crate) fn inc(&self) {
        self.state.lock().refs += 1;
    }

    pub(crate) fn dec(&self) {
        let mut state = self.state.lock();
        self.release(&mut state);
    }

    fn release(&self, state: &mut RefState) {
        debug_assert!(state.refs > 0, "released a reference that was never taken");

        state.refs -= 1;
        trace!(refs = state.refs, "released reference");

        if state.refs <= 0 && !std::mem::replace(&mut state.evicted, true) {
            // nobody will refer to this value anymore
            if let Some(on_evicted) = &self.on_evicted {
                trace!("finalizing entry");
                on_evicted(&self.key, &self.value);
            }
        }
    }
}

//! In-flight guards and per-line locks.

use std::{
    hash::Hash,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// A flag marking one action as running. A second attempt fails fast.
#[derive(Debug, Default)]
pub struct InFlight(AtomicBool);

impl InFlight {
    /// Claim the action, or `None` when it is already running.
    pub fn try_begin(&self) -> Option<InFlightGuard<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard(&self.0))
    }

    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Releases its [`InFlight`] flag on drop.
#[derive(Debug)]
pub struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// In-flight flags keyed by id, e.g. one cancel per order.
#[derive(Debug)]
pub struct KeyedInFlight<K> {
    active: Mutex<FxHashSet<K>>,
}

impl<K> Default for KeyedInFlight<K> {
    fn default() -> Self {
        Self {
            active: Mutex::new(FxHashSet::default()),
        }
    }
}

impl<K: Eq + Hash + Clone> KeyedInFlight<K> {
    /// Claim `key`, or `None` when it is already running.
    pub fn try_begin(&self, key: &K) -> Option<KeyedGuard<'_, K>> {
        self.active.lock().insert(key.clone()).then(|| KeyedGuard {
            active: &self.active,
            key: key.clone(),
        })
    }

    pub fn is_active(&self, key: &K) -> bool {
        self.active.lock().contains(key)
    }
}

/// Releases its key on drop.
#[derive(Debug)]
pub struct KeyedGuard<'a, K: Eq + Hash> {
    active: &'a Mutex<FxHashSet<K>>,
    key: K,
}

impl<K: Eq + Hash> Drop for KeyedGuard<'_, K> {
    fn drop(&mut self) {
        self.active.lock().remove(&self.key);
    }
}

/// Async mutexes keyed by id, serializing work on the same key.
#[derive(Debug)]
pub struct LineLocks<K> {
    locks: Mutex<FxHashMap<K, Arc<AsyncMutex<()>>>>,
}

impl<K> Default for LineLocks<K> {
    fn default() -> Self {
        Self {
            locks: Mutex::new(FxHashMap::default()),
        }
    }
}

impl<K: Eq + Hash + Clone> LineLocks<K> {
    /// Wait for exclusive access to `key`.
    pub async fn lock(&self, key: &K) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock();

            // Entries only referenced by the map have no holder or waiter.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);

            Arc::clone(locks.entry(key.clone()).or_default())
        };

        lock.lock_owned().await
    }

    #[cfg(test)]
    pub(crate) fn tracked(&self) -> usize {
        self.locks.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn in_flight_rejects_second_claim_until_released() {
        let flag = InFlight::default();

        let guard = flag.try_begin();
        assert!(guard.is_some(), "first claim should succeed");
        assert!(flag.try_begin().is_none(), "second claim should fail");
        assert!(flag.is_active());

        drop(guard);

        assert!(!flag.is_active());
        assert!(flag.try_begin().is_some(), "claim after release should succeed");
    }

    #[test]
    fn keyed_in_flight_is_independent_per_key() {
        let flags = KeyedInFlight::default();

        let a = flags.try_begin(&"a");
        assert!(a.is_some(), "claim on a should succeed");
        assert!(flags.try_begin(&"b").is_some(), "claim on b should succeed");
        assert!(flags.try_begin(&"a").is_none(), "second claim on a should fail");

        drop(a);

        assert!(!flags.is_active(&"a"));
    }

    #[tokio::test]
    async fn line_locks_serialize_same_key() {
        let locks = Arc::new(LineLocks::default());
        let first = locks.lock(&"a").await;

        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.lock(&"a").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished(), "second lock should wait");

        drop(first);
        let joined = contender.await;
        assert!(joined.is_ok(), "contender should finish once released");
    }

    #[tokio::test]
    async fn line_locks_forget_idle_keys() {
        let locks = LineLocks::default();

        drop(locks.lock(&"a").await);
        drop(locks.lock(&"b").await);

        assert_eq!(locks.tracked(), 1, "only the most recent key is retained");
    }
}

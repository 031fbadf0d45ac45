use parking_lot::RwLockUpgradableReadGuard;
use parking_lot::RwLock;

/// A single-slot cache guarded by a lock with three access modes: shared
/// (many), upgradeable (one, compatible with shared), and exclusive (one,
/// incompatible with all).
///
/// This is the discipline a block instance uses to guard its derived
/// quantities (`total_inputs`, `base_size`, `segregated`, ...): a reader first
/// acquires shared access and checks for a cached value; on a miss it
/// upgrades to exclusive access, recomputes, and publishes. The
/// upgradeable-to-exclusive transition is atomic, so concurrent readers never
/// both recompute the same slot, and readers that hit the fast path never
/// contend with each other once a value has been published.
pub struct UpgradeLock<T> {
    slot: RwLock<Option<T>>,
}

impl<T> Default for UpgradeLock<T> {
    fn default() -> Self {
        UpgradeLock {
            slot: RwLock::new(None),
        }
    }
}

impl<T: Clone> UpgradeLock<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value, computing and publishing it via `init` on a
    /// cache miss. `init` runs at most once per miss: if two readers race on
    /// an empty slot, only the one that wins the upgrade to exclusive access
    /// calls `init`; the other observes the now-published value.
    pub fn get_or_init(&self, init: impl FnOnce() -> T) -> T {
        let upgradeable = self.slot.upgradable_read();
        if let Some(value) = upgradeable.as_ref() {
            tracing::trace!("upgrade lock cache hit");
            return value.clone();
        }

        tracing::trace!("upgrade lock cache miss, upgrading to exclusive");
        let mut exclusive = RwLockUpgradableReadGuard::upgrade(upgradeable);
        if exclusive.is_none() {
            *exclusive = Some(init());
        }
        exclusive
            .as_ref()
            .expect("value was just published under exclusive access")
            .clone()
    }

    /// Clears the cached value, forcing the next `get_or_init` to recompute it.
    pub fn invalidate(&self) {
        *self.slot.write() = None;
    }

    /// Returns `true` if a value has already been published.
    pub fn has_value(&self) -> bool {
        self.slot.read().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn computes_at_most_once() {
        let lock: UpgradeLock<u32> = UpgradeLock::new();
        let calls = AtomicUsize::new(0);
        let init = || {
            calls.fetch_add(1, Ordering::SeqCst);
            42
        };

        assert_eq!(lock.get_or_init(init), 42);
        assert_eq!(lock.get_or_init(init), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn invalidate_forces_recompute() {
        let lock: UpgradeLock<u32> = UpgradeLock::new();
        assert_eq!(lock.get_or_init(|| 1), 1);
        lock.invalidate();
        assert!(!lock.has_value());
        assert_eq!(lock.get_or_init(|| 2), 2);
    }

    #[test]
    fn concurrent_readers_agree_on_one_computation() {
        let lock = Arc::new(UpgradeLock::<u32>::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let lock = lock.clone();
            let calls = calls.clone();
            handles.push(std::thread::spawn(move || {
                lock.get_or_init(|| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    7
                })
            }));
        }
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

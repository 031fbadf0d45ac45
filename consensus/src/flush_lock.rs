//! The filesystem seam a host uses to signal "a flush is in progress": the
//! presence of a designated file is the lock. This crate defines the trait
//! and a `std::fs`-backed implementation, but doesn't wire it into any
//! daemon lifecycle.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub trait FlushLock {
    /// Returns `true` if the lock is currently free.
    fn try_lock(&self) -> io::Result<bool>;
    /// Marks a flush as in progress.
    fn lock_shared(&self) -> io::Result<()>;
    /// Marks a flush as finished.
    fn unlock_shared(&self) -> io::Result<()>;
}

/// A `FlushLock` whose state is the presence or absence of a file on disk.
///
/// Idempotent: locking an already-locked path, or unlocking an already-free
/// one, succeeds without error.
pub struct PathFlushLock {
    path: PathBuf,
}

impl PathFlushLock {
    pub fn new(path: impl Into<PathBuf>) -> PathFlushLock {
        PathFlushLock { path: path.into() }
    }
}

impl FlushLock for PathFlushLock {
    fn try_lock(&self) -> io::Result<bool> {
        Ok(!self.path.exists())
    }

    fn lock_shared(&self) -> io::Result<()> {
        match fs::File::create(&self.path) {
            Ok(_) => Ok(()),
            Err(error) => Err(error),
        }
    }

    fn unlock_shared(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error),
        }
    }
}

impl PathFlushLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_then_unlock_round_trips() {
        let dir = std::env::temp_dir();
        let lock = PathFlushLock::new(dir.join(format!("bitcoin-consensus-flush-lock-test-{}", std::process::id())));

        assert!(lock.try_lock().unwrap());
        lock.lock_shared().unwrap();
        assert!(!lock.try_lock().unwrap());
        lock.unlock_shared().unwrap();
        assert!(lock.try_lock().unwrap());
    }

    #[test]
    fn unlocking_a_free_lock_is_a_no_op() {
        let dir = std::env::temp_dir();
        let lock = PathFlushLock::new(dir.join(format!("bitcoin-consensus-flush-lock-noop-{}", std::process::id())));
        assert!(lock.unlock_shared().is_ok());
    }
}

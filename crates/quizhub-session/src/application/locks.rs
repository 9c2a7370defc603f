//! Per-session write locks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use quizhub_core::session::SessionCode;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Hands out one async mutex per session code. Entries are weak, so a code
/// nobody is writing to costs nothing once its last guard drops.
#[derive(Debug, Default)]
pub(crate) struct SessionLocks {
    locks: Mutex<HashMap<SessionCode, Weak<AsyncMutex<()>>>>,
}

impl SessionLocks {
    /// Waits for exclusive write access to `code`.
    pub(crate) async fn acquire(&self, code: SessionCode) -> OwnedMutexGuard<()> {
        self.lock_for(code).lock_owned().await
    }

    fn lock_for(&self, code: SessionCode) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(lock) = locks.get(&code).and_then(Weak::upgrade) {
            return lock;
        }
        locks.retain(|_, lock| lock.strong_count() > 0);
        let lock = Arc::new(AsyncMutex::new(()));
        locks.insert(code, Arc::downgrade(&lock));
        lock
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

//! Per-appeal operation serialization.
//!
//! Action, cancel, and revoke on the same appeal must observe each other's
//! writes, so each takes an async mutex keyed by appeal id for the whole
//! read-mutate-write span. Distinct appeals proceed independently.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::Arc;

use guardian_core::AppealId;
use tokio::sync::OwnedMutexGuard;

#[derive(Debug, Default)]
pub(crate) struct AppealLocks {
    inner: Mutex<HashMap<AppealId, Arc<tokio::sync::Mutex<()>>>>,
}

impl AppealLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for one appeal, creating it on first use.
    pub(crate) async fn acquire(&self, id: AppealId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            Arc::clone(
                map.entry(id)
                    .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
            )
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_appeal_serializes() {
        let locks = Arc::new(AppealLocks::new());
        let id = AppealId::new();

        let guard = locks.acquire(id).await;
        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire(id).await;
            })
        };
        // The contender cannot finish while the guard is held.
        tokio::task::yield_now().await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.expect("contender should acquire after drop");
    }

    #[tokio::test]
    async fn test_distinct_appeals_do_not_contend() {
        let locks = AppealLocks::new();
        let _a = locks.acquire(AppealId::new()).await;
        let _b = locks.acquire(AppealId::new()).await;
    }
}

use pillbox_domain::UserId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Serializes store access per user. Dispatching, reconciliation and
/// response recording for a user all go through that user's mutex, so a
/// reminder firing can never interleave with a schedule mutation for the
/// same user. Operations on different users proceed in parallel.
#[derive(Default)]
pub struct UserLocks {
    locks: Mutex<HashMap<UserId, Arc<AsyncMutex<()>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Default::default()
    }

    pub async fn acquire(&self, user_id: &UserId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap();
            locks.entry(user_id.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }
}

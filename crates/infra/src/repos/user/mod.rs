mod filestore;
mod inmemory;

pub use filestore::FileUserRepo;
pub use inmemory::InMemoryUserRepo;
use pillbox_domain::{UserId, UserRecord};

/// The schedule store: a durable mapping from user id to the user's
/// medications and adherence counters. `find`/`save` are atomic at the
/// per-user granularity; callers needing read-modify-write cycles hold the
/// user's lock (see `UserLocks`) around them.
#[async_trait::async_trait]
pub trait IUserRepo: Send + Sync {
    async fn find(&self, user_id: &UserId) -> anyhow::Result<Option<UserRecord>>;
    async fn save(&self, user: &UserRecord) -> anyhow::Result<()>;
    async fn find_all(&self) -> anyhow::Result<Vec<UserRecord>>;
}

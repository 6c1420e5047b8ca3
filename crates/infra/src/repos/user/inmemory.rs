use super::IUserRepo;
use pillbox_domain::{UserId, UserRecord};
use std::collections::HashMap;
use std::sync::Mutex;

pub struct InMemoryUserRepo {
    users: Mutex<HashMap<UserId, UserRecord>>,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait::async_trait]
impl IUserRepo for InMemoryUserRepo {
    async fn find(&self, user_id: &UserId) -> anyhow::Result<Option<UserRecord>> {
        let users = self.users.lock().unwrap();
        Ok(users.get(user_id).cloned())
    }

    async fn save(&self, user: &UserRecord) -> anyhow::Result<()> {
        let mut users = self.users.lock().unwrap();
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn find_all(&self) -> anyhow::Result<Vec<UserRecord>> {
        let users = self.users.lock().unwrap();
        Ok(users.values().cloned().collect())
    }
}

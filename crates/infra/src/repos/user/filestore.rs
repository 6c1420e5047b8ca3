use super::IUserRepo;
use anyhow::Context;
use pillbox_domain::{UserId, UserRecord};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Stores all user records in a single JSON file. Every operation loads
/// the full map, mutates it and writes it back while holding the file
/// mutex, which gives the per-user atomicity the store contract asks for.
/// Fine for the intended scale of a personal reminder bot.
pub struct FileUserRepo {
    path: PathBuf,
    file_lock: Mutex<()>,
}

impl FileUserRepo {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            file_lock: Mutex::new(()),
        }
    }

    fn load(&self) -> anyhow::Result<HashMap<UserId, UserRecord>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Unable to read data file: {}", self.path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Malformed data file: {}", self.path.display()))
    }

    fn store(&self, users: &HashMap<UserId, UserRecord>) -> anyhow::Result<()> {
        let contents = serde_json::to_string_pretty(users)?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("Unable to write data file: {}", self.path.display()))
    }
}

#[async_trait::async_trait]
impl IUserRepo for FileUserRepo {
    async fn find(&self, user_id: &UserId) -> anyhow::Result<Option<UserRecord>> {
        let _guard = self.file_lock.lock().unwrap();
        let mut users = self.load()?;
        Ok(users.remove(user_id))
    }

    async fn save(&self, user: &UserRecord) -> anyhow::Result<()> {
        let _guard = self.file_lock.lock().unwrap();
        let mut users = self.load()?;
        users.insert(user.id.clone(), user.clone());
        self.store(&users)
    }

    async fn find_all(&self) -> anyhow::Result<Vec<UserRecord>> {
        let _guard = self.file_lock.lock().unwrap();
        let users = self.load()?;
        Ok(users.into_iter().map(|(_, user)| user).collect())
    }
}

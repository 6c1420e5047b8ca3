mod user;

pub use user::IUserRepo;
use user::{FileUserRepo, InMemoryUserRepo};

use std::sync::Arc;

#[derive(Clone)]
pub struct Repos {
    pub users: Arc<dyn IUserRepo>,
}

impl Repos {
    pub fn create_inmemory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepo::new()),
        }
    }

    pub fn create_file(path: &str) -> Self {
        Self {
            users: Arc::new(FileUserRepo::new(path)),
        }
    }
}

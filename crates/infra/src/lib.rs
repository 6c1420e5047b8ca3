mod config;
mod locks;
mod repos;
mod services;
mod system;

pub use config::{Config, WebhookConfig};
pub use locks::UserLocks;
pub use repos::{IUserRepo, Repos};
pub use services::{
    DeliveryError, INotifier, LogNotifier, ReminderNotification, StubNotifier, WebhookNotifier,
};
use std::sync::Arc;
pub use system::{FakeSys, ISys, RealSys};

#[derive(Clone)]
pub struct PillboxContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub notifier: Arc<dyn INotifier>,
    pub locks: Arc<UserLocks>,
}

impl PillboxContext {
    fn create(config: Config) -> Self {
        let repos = match &config.data_file {
            Some(path) => Repos::create_file(path),
            None => Repos::create_inmemory(),
        };
        let notifier: Arc<dyn INotifier> = match &config.webhook {
            Some(webhook) => Arc::new(WebhookNotifier::new(&webhook.url, &webhook.key)),
            None => Arc::new(LogNotifier {}),
        };
        Self {
            repos,
            config,
            sys: Arc::new(RealSys {}),
            notifier,
            locks: Arc::new(UserLocks::new()),
        }
    }
}

/// Will setup the infrastructure context given the environment
pub fn setup_context() -> PillboxContext {
    PillboxContext::create(Config::new())
}

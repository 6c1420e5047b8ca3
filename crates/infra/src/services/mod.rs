use pillbox_domain::UserId;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::warn;

/// The notifier could not deliver a reminder. The dispatcher logs this and
/// moves on; the next scheduled occurrence is the retry boundary.
#[derive(Debug)]
pub struct DeliveryError {
    pub reason: String,
}

impl std::fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unable to deliver reminder: {}", self.reason)
    }
}

impl std::error::Error for DeliveryError {}

/// Outbound reminder delivery channel. One best-effort send per occurrence;
/// the prompt carries the medication name so the taken/skipped response can
/// be routed back to the right adherence counter.
#[async_trait::async_trait]
pub trait INotifier: Send + Sync {
    async fn send(&self, user_id: &UserId, medication_name: &str) -> Result<(), DeliveryError>;
}

/// Payload POSTed to the configured webhook for every due reminder.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderNotification<'a> {
    pub user_id: &'a str,
    pub medication_name: &'a str,
    /// Actions the receiving UI should offer; responses come back through
    /// the responses endpoint with one of these outcomes.
    pub actions: [&'static str; 2],
}

pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    key: String,
}

impl WebhookNotifier {
    pub fn new(url: &str, key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
            key: key.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl INotifier for WebhookNotifier {
    async fn send(&self, user_id: &UserId, medication_name: &str) -> Result<(), DeliveryError> {
        let notification = ReminderNotification {
            user_id: user_id.as_str(),
            medication_name,
            actions: ["taken", "skipped"],
        };
        self.client
            .post(&self.url)
            .header("pillbox-webhook-key", self.key.as_str())
            .json(&notification)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map(|_| ())
            .map_err(|e| DeliveryError {
                reason: e.to_string(),
            })
    }
}

/// Used when no webhook is configured. Reminders still fire and adherence
/// still works; delivery is just a log line.
pub struct LogNotifier {}

#[async_trait::async_trait]
impl INotifier for LogNotifier {
    async fn send(&self, user_id: &UserId, medication_name: &str) -> Result<(), DeliveryError> {
        warn!(
            "No webhook configured, dropping reminder for user: {} medication: {}",
            user_id, medication_name
        );
        Ok(())
    }
}

/// Records every send attempt, used by tests. Can be flipped into failure
/// mode to exercise the at-most-once delivery policy.
#[derive(Default)]
pub struct StubNotifier {
    sends: Mutex<Vec<(UserId, String)>>,
    failing: AtomicBool,
}

impl StubNotifier {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn sent(&self) -> Vec<(UserId, String)> {
        self.sends.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl INotifier for StubNotifier {
    async fn send(&self, user_id: &UserId, medication_name: &str) -> Result<(), DeliveryError> {
        self.sends
            .lock()
            .unwrap()
            .push((user_id.clone(), medication_name.to_string()));
        if self.failing.load(Ordering::SeqCst) {
            return Err(DeliveryError {
                reason: "unreachable user".into(),
            });
        }
        Ok(())
    }
}

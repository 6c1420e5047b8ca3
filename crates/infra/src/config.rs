use pillbox_utils::create_random_secret;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Endpoint that receives reminder notifications
    pub url: String,
    /// Signing key sent with every notification so the receiver can verify
    /// that it came from us
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// Path of the JSON file holding the user records. When unset the
    /// records live in memory only and do not survive a restart.
    pub data_file: Option<String>,
    /// Where reminder notifications are delivered. When unset, reminders
    /// are only logged.
    pub webhook: Option<WebhookConfig>,
    /// How often the periodic reconciliation sweep runs. The sweep is a
    /// consistency check that re-arms anything missing from the timer set;
    /// it never dispatches reminders itself.
    pub reconcile_sweep_interval: Duration,
}

impl Config {
    pub fn new() -> Self {
        let default_port = "5110";
        let port = std::env::var("PORT").unwrap_or_else(|_| default_port.into());
        let port = match port.parse::<usize>() {
            Ok(port) => port,
            Err(_) => {
                warn!(
                    "The given PORT: {} is not valid, falling back to the default port: {}.",
                    port, default_port
                );
                default_port.parse::<usize>().unwrap()
            }
        };

        let data_file = std::env::var("DATA_FILE").ok();

        let webhook = match std::env::var("WEBHOOK_URL") {
            Ok(url) if Url::parse(&url).is_ok() => {
                let key = match std::env::var("WEBHOOK_KEY") {
                    Ok(key) => key,
                    Err(_) => {
                        let key = create_random_secret(16);
                        info!(
                            "Did not find WEBHOOK_KEY environment variable. Generated one: {}",
                            key
                        );
                        key
                    }
                };
                Some(WebhookConfig { url, key })
            }
            Ok(url) => {
                warn!(
                    "The given WEBHOOK_URL: {} is not a valid url, reminders will only be logged.",
                    url
                );
                None
            }
            Err(_) => None,
        };

        let reconcile_sweep_interval = std::env::var("RECONCILE_SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|secs| secs.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(5 * 60));

        Self {
            port,
            data_file,
            webhook,
            reconcile_sweep_interval,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

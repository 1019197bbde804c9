// ── Runtime connection configuration ──
//
// These types describe *where* the API lives and how often to poll it.
// They never touch disk. The CLI (or any other front-end) constructs a
// `ClientConfig` and hands it in.

use std::time::Duration;

use medtrack_api::{CollectionClient, TransportConfig};
use url::Url;

use crate::error::CoreError;

/// API root used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:5103/api";

/// Poll period for live collections when the caller does not pick one.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Configuration for talking to one collection API.
///
/// Built by the front-end, passed to the core -- core never reads config files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root (e.g., `http://localhost:5103/api`).
    pub base_url: Url,
    /// Per-request timeout. `None` means requests may wait indefinitely.
    pub timeout: Option<Duration>,
    /// Default period for realtime bindings and `watch`.
    pub poll_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            timeout: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            ..Self::default()
        }
    }

    /// Transport settings derived from this config.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            timeout: self.timeout,
            ..TransportConfig::default()
        }
    }

    /// Build the single client shared by every consumer of this API.
    pub fn build_client(&self) -> Result<CollectionClient, CoreError> {
        Ok(CollectionClient::new(
            self.base_url.clone(),
            &self.transport(),
        )?)
    }
}

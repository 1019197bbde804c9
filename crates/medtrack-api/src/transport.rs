// Shared transport configuration for building reqwest::Client instances.
//
// Timeouts and the user agent live here so every CollectionClient built
// for the same base URL behaves the same way.

use std::time::Duration;

use crate::error::Error;

/// Shared transport configuration for building HTTP clients.
///
/// No request timeout is applied unless one is configured: a hung request
/// only stalls the call that issued it.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Whole-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// TCP connect timeout. `None` uses the OS default.
    pub connect_timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            connect_timeout: None,
            user_agent: concat!("medtrack/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl TransportConfig {
    /// Set a whole-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder().user_agent(self.user_agent.as_str());

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = self.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        builder.build().map_err(|e| Error::Client(e.to_string()))
    }
}

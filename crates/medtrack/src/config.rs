//! CLI configuration: thin wrapper around `medtrack_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (`--api-url`, `--timeout`).

use std::time::Duration;

use medtrack_config::ConfigError;
use medtrack_core::ClientConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use medtrack_config::{Config, config_path, load_config, save_config};

/// Resolve the `ClientConfig` for this invocation.
///
/// Precedence: flag / env var, then the selected profile, then built-in
/// defaults. Without any config file the CLI talks to the local API.
pub fn resolve_client_config(global: &GlobalOpts) -> Result<ClientConfig, CliError> {
    let cfg = load_config()?;
    let mut client = medtrack_config::resolve_client_config(&cfg, global.profile.as_deref())
        .map_err(|e| match e {
            ConfigError::UnknownProfile(name) => CliError::ProfileNotFound {
                name,
                available: available_profiles(&cfg),
            },
            other => other.into(),
        })?;

    if let Some(ref raw) = global.api_url {
        client.base_url = parse_api_url(raw)?;
    }
    if let Some(secs) = global.timeout {
        client.timeout = Some(Duration::from_secs(secs));
    }

    tracing::debug!(
        api_url = %client.base_url,
        timeout = ?client.timeout,
        "resolved client config"
    );
    Ok(client)
}

pub fn parse_api_url(raw: &str) -> Result<url::Url, CliError> {
    raw.parse().map_err(|_| CliError::Validation {
        field: "api-url".into(),
        reason: format!("invalid URL: {raw}"),
    })
}

fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

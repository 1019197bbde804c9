//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use medtrack_config::ConfigError;
use medtrack_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the medtrack API at {url}")]
    #[diagnostic(
        code(medtrack::connection_failed),
        help(
            "Check that the API server is running and reachable.\n\
             Reason: {reason}\n\
             Point the CLI elsewhere with --api-url or MEDTRACK_API_URL,\n\
             or save an endpoint with: medtrack config init"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to {url} timed out")]
    #[diagnostic(
        code(medtrack::timeout),
        help("Increase the limit with --timeout or check the API server's health.")
    )]
    Timeout { url: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Document '{id}' not found in '{collection}'")]
    #[diagnostic(
        code(medtrack::not_found),
        help("Run: medtrack list {collection} to see available documents")
    )]
    NotFound { collection: String, id: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error (HTTP {status}): {message}")]
    #[diagnostic(code(medtrack::api_error))]
    Api { status: u16, message: String },

    #[error("Unexpected response: {message}")]
    #[diagnostic(
        code(medtrack::decode),
        help("The endpoint answered, but not with collection documents. Is --api-url the API root?")
    )]
    Decode { message: String },

    #[error("Internal error: {0}")]
    #[diagnostic(code(medtrack::internal))]
    Internal(String),

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(medtrack::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(medtrack::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: medtrack config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(medtrack::config))]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(medtrack::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(medtrack::json), help("Check the JSON contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("YAML rendering failed: {0}")]
    #[diagnostic(code(medtrack::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NotFound { .. } | Self::Api { status: 404, .. } => exit_code::NOT_FOUND,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::ProfileNotFound { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }
            CoreError::Timeout { url } => CliError::Timeout { url },
            CoreError::Api { status, message } => CliError::Api { status, message },
            CoreError::Decode { message } => CliError::Decode { message },
            CoreError::Config { message } => CliError::Validation {
                field: "api-url".into(),
                reason: message,
            },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

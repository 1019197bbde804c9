// ── Core error types ──
//
// User-facing errors from medtrack-core. Consumers see "cannot reach the
// API" or "the API rejected this" rather than raw reqwest failures.
// The `From<medtrack_api::Error>` impl translates transport-layer errors
// into these variants.

use thiserror::Error;

/// Unified error type for the core crate.
///
/// `Clone` so it can sit in a [`ViewState`](crate::ViewState) and be
/// handed back to the caller at the same time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach API at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    // ── API errors ───────────────────────────────────────────────────
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid data from API: {message}")]
    Decode { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// HTTP status behind an [`Api`](Self::Api) error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if the API could not be reached at all.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. } | Self::Timeout { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<medtrack_api::Error> for CoreError {
    fn from(err: medtrack_api::Error) -> Self {
        match err {
            medtrack_api::Error::Http { status, body } => CoreError::Api {
                status,
                message: if body.is_empty() {
                    format!("HTTP {status}")
                } else {
                    body
                },
            },
            medtrack_api::Error::Decode { message, body: _ } => CoreError::Decode { message },
            medtrack_api::Error::Network(ref e) => {
                let url = e
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string);
                if e.is_timeout() {
                    CoreError::Timeout { url }
                } else {
                    CoreError::ConnectionFailed {
                        url,
                        reason: e.to_string(),
                    }
                }
            }
            medtrack_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            medtrack_api::Error::InvalidBaseUrl(url) => CoreError::Config {
                message: format!("Invalid base URL: {url}"),
            },
            medtrack_api::Error::Client(msg) => CoreError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_maps_to_api() {
        let err = CoreError::from(medtrack_api::Error::Http {
            status: 503,
            body: String::new(),
        });
        assert_eq!(
            err,
            CoreError::Api {
                status: 503,
                message: "HTTP 503".into()
            }
        );
        assert_eq!(err.status(), Some(503));
        assert!(!err.is_connection());
    }

    #[test]
    fn decode_error_drops_body() {
        let err = CoreError::from(medtrack_api::Error::Decode {
            message: "expected value".into(),
            body: "<html>".into(),
        });
        assert_eq!(
            err,
            CoreError::Decode {
                message: "expected value".into()
            }
        );
    }

    #[test]
    fn base_url_error_is_config() {
        let err = CoreError::from(medtrack_api::Error::InvalidBaseUrl("mailto:x".into()));
        assert!(matches!(err, CoreError::Config { .. }));
    }
}

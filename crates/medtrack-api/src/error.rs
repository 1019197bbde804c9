use thiserror::Error;

/// Longest slice of a response body kept in error messages.
const BODY_PREVIEW_CHARS: usize = 200;

/// Top-level error type for the `medtrack-api` crate.
///
/// Covers every failure mode of a collection call: the server answered
/// with a non-2xx status, the body could not be decoded, or the request
/// never completed. `medtrack-core` maps these into user-facing errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Server ──────────────────────────────────────────────────────
    /// The server answered with a non-success status.
    #[error("HTTP error {status}")]
    Http {
        status: u16,
        /// Leading part of the response body, for diagnostics.
        body: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON decoding failed, with the raw body for debugging.
    #[error("Decode error: {message}")]
    Decode { message: String, body: String },

    // ── Transport ───────────────────────────────────────────────────
    /// Transport failure (connection refused, DNS failure, reset, timeout).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The base URL cannot have collection segments appended (e.g. `mailto:`).
    #[error("Invalid base URL '{0}': cannot append collection paths")]
    InvalidBaseUrl(String),

    /// The underlying HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl Error {
    /// Build a [`Error::Decode`] from a parse failure and the offending body.
    pub(crate) fn decode(err: impl std::fmt::Display, body: &str) -> Self {
        Self::Decode {
            message: format!("{err} (body preview: {:?})", preview(body)),
            body: body.to_owned(),
        }
    }

    /// Build a [`Error::Http`] keeping only a preview of the body.
    pub(crate) fn http(status: reqwest::StatusCode, body: &str) -> Self {
        Self::Http {
            status: status.as_u16(),
            body: preview(body),
        }
    }

    /// The HTTP status attached to this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` if the server reported "not found".
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns `true` if the request never reached (or never heard back
    /// from) the server.
    pub fn is_unreachable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }
}

/// Char-boundary-safe prefix of a body.
pub(crate) fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

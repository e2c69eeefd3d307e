// ── Core error types ──
//
// User-facing errors from pbcli-core. Consumers never see HTTP status
// codes or JSON parse failures directly; the `From<pbcli_api::Error>` impl
// translates transport-layer errors into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out")]
    Timeout,

    // ── Resolution errors ────────────────────────────────────────────
    #[error("Failed to locate device identified by {identifier}")]
    DeviceNotFound { identifier: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// Service error code (e.g., "invalid_access_token").
        code: Option<String>,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<pbcli_api::Error> for CoreError {
    fn from(err: pbcli_api::Error) -> Self {
        match err {
            pbcli_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            pbcli_api::Error::InvalidToken(reason) => CoreError::Config {
                message: format!("API key is not usable: {reason}"),
            },
            pbcli_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), |u| u.origin().ascii_serialization()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            pbcli_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            pbcli_api::Error::Api {
                status,
                code,
                message,
            } => CoreError::Api {
                message,
                code,
                status: Some(status),
            },
            e @ (pbcli_api::Error::WebSocketConnect(_)
            | pbcli_api::Error::WebSocketClosed { .. }
            | pbcli_api::Error::StreamIdle { .. }) => CoreError::ConnectionFailed {
                url: "stream".into(),
                reason: e.to_string(),
            },
            pbcli_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

use thiserror::Error;

/// Top-level error type for the `pbcli-api` crate.
///
/// Covers every failure mode across the REST surface and the realtime
/// stream. `pbcli-core` maps these into domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Access token rejected (HTTP 401/403).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The access token cannot be carried in an HTTP header.
    #[error("Invalid access token: {0}")]
    InvalidToken(String),

    // ── REST API ────────────────────────────────────────────────────
    /// Structured error from the REST API (`{"error": {...}}` body).
    #[error("API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    // ── Stream ──────────────────────────────────────────────────────
    /// Realtime stream connection failed or broke mid-read.
    #[error("Stream connection failed: {0}")]
    WebSocketConnect(String),

    /// Server closed the stream with a close frame.
    #[error("Stream closed (code {code}): {reason}")]
    WebSocketClosed { code: u16, reason: String },

    /// No frame (not even a heartbeat) arrived within the idle window.
    #[error("Stream idle for {idle_secs}s, connection presumed dead")]
    StreamIdle { idle_secs: u64 },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::WebSocketConnect(_) | Self::WebSocketClosed { .. } | Self::StreamIdle { .. } => {
                true
            }
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_transient() {
        let err = Error::Api {
            status: 503,
            code: None,
            message: "unavailable".into(),
        };
        assert!(err.is_transient());

        let err = Error::Api {
            status: 400,
            code: Some("invalid_request".into()),
            message: "bad".into(),
        };
        assert!(!err.is_transient());
    }

    #[test]
    fn stream_failures_are_transient() {
        assert!(Error::StreamIdle { idle_secs: 90 }.is_transient());
        assert!(Error::WebSocketConnect("reset".into()).is_transient());
        assert!(
            !Error::Authentication {
                message: "nope".into()
            }
            .is_transient()
        );
    }
}

// ── Runtime connection configuration ──
//
// Describes *how* to reach the service. Carries the credential and
// connection tuning but never touches disk; the CLI builds one from the
// config file and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::error::CoreError;

/// Default buffer size for each of the four subscription channels.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Configuration for talking to the Pushbullet service.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Access token for the account.
    pub api_key: SecretString,
    /// REST API root.
    pub api_url: Url,
    /// Realtime stream root; the token is appended as the last segment.
    pub stream_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Buffer size of each subscription channel.
    pub channel_capacity: usize,
}

impl ClientConfig {
    /// Config pointing at the public service endpoints.
    pub fn new(api_key: SecretString) -> Result<Self, CoreError> {
        Ok(Self {
            api_key,
            api_url: parse_url(pbcli_api::DEFAULT_API_URL)?,
            stream_url: parse_url(pbcli_api::DEFAULT_STREAM_URL)?,
            timeout: Duration::from_secs(30),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        })
    }

    pub fn with_api_url(mut self, url: Url) -> Self {
        self.api_url = url;
        self
    }

    pub fn with_stream_url(mut self, url: Url) -> Self {
        self.stream_url = url;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn parse_url(raw: &str) -> Result<Url, CoreError> {
    Url::parse(raw).map_err(|e| CoreError::Config {
        message: format!("invalid URL {raw}: {e}"),
    })
}

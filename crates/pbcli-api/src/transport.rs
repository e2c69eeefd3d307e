// Shared transport configuration for building reqwest::Client instances.
//
// Keeps timeout, user agent and the access-token header in one place so the
// REST client and any future surfaces build identical HTTP stacks.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Header Pushbullet reads the access token from.
pub const ACCESS_TOKEN_HEADER: &str = "Access-Token";

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("pbcli/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` that authenticates every request with
    /// the given access token.
    pub fn build_client(&self, access_token: &SecretString) -> Result<reqwest::Client, Error> {
        let mut token = HeaderValue::from_str(access_token.expose_secret())
            .map_err(|e| Error::InvalidToken(e.to_string()))?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_TOKEN_HEADER, token);

        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .default_headers(headers)
            .build()
            .map_err(Error::Transport)
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// Pushbullet REST client
//
// Wraps `reqwest::Client` with base-URL joining, error-body decoding and
// cursor pagination. Every method returns wire models; conversion into
// domain types happens in `pbcli-core`.

use serde::de::DeserializeOwned;
use secrecy::SecretString;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{ApiDevice, ApiPush, DeviceList, ErrorEnvelope, NewPush, PushList};
use crate::transport::TransportConfig;

/// Production REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.pushbullet.com/";

/// Raw HTTP client for the Pushbullet v2 REST API.
#[derive(Debug, Clone)]
pub struct PushbulletClient {
    http: reqwest::Client,
    base_url: Url,
}

impl PushbulletClient {
    /// Create a client that authenticates with `access_token`.
    ///
    /// `base_url` is the API root (normally [`DEFAULT_API_URL`]); a missing
    /// trailing slash is added so relative joins keep any path prefix.
    pub fn new(
        base_url: Url,
        access_token: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client(access_token)?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url: normalize_base(base_url),
        }
    }

    // ── Devices ──────────────────────────────────────────────────────

    /// List all active devices, following pagination cursors.
    ///
    /// `GET /v2/devices?active=true`
    pub async fn list_devices(&self) -> Result<Vec<ApiDevice>, Error> {
        debug!("listing devices");
        self.collect_devices(&[("active", "true".to_owned())]).await
    }

    /// List devices created, changed or deleted after `modified_after`.
    ///
    /// Deleted devices are included (with `active: false`) so callers can
    /// observe removals.
    pub async fn list_devices_modified_after(
        &self,
        modified_after: f64,
    ) -> Result<Vec<ApiDevice>, Error> {
        debug!(modified_after, "listing changed devices");
        self.collect_devices(&[("modified_after", modified_after.to_string())])
            .await
    }

    async fn collect_devices(&self, params: &[(&str, String)]) -> Result<Vec<ApiDevice>, Error> {
        let mut devices = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let url = self.endpoint("devices", params, cursor.as_deref())?;
            let page: DeviceList = self.get(url).await?;
            devices.extend(page.devices);

            match page.cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => break,
            }
        }

        Ok(devices)
    }

    // ── Pushes ───────────────────────────────────────────────────────

    /// List pushes modified after `modified_after`, newest first, following
    /// pagination cursors. `page_size` bounds each page, not the total.
    pub async fn list_pushes_modified_after(
        &self,
        modified_after: f64,
        page_size: u32,
    ) -> Result<Vec<ApiPush>, Error> {
        debug!(modified_after, page_size, "listing changed pushes");
        let params = [
            ("modified_after", modified_after.to_string()),
            ("limit", page_size.to_string()),
        ];
        let mut pushes = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let url = self.endpoint("pushes", &params, cursor.as_deref())?;
            let page: PushList = self.get(url).await?;
            pushes.extend(page.pushes);

            match page.cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => break,
            }
        }

        Ok(pushes)
    }

    /// Create a push.
    ///
    /// `POST /v2/pushes`
    pub async fn create_push(&self, push: &NewPush) -> Result<ApiPush, Error> {
        let url = self.endpoint("pushes", &[], None)?;
        debug!(target_device = ?push.device_iden, "creating push");

        let resp = self
            .http
            .post(url)
            .json(push)
            .send()
            .await
            .map_err(Error::Transport)?;

        parse_response(resp).await
    }

    // ── Request helpers ──────────────────────────────────────────────

    fn endpoint(
        &self,
        resource: &str,
        params: &[(&str, String)],
        cursor: Option<&str>,
    ) -> Result<Url, Error> {
        let mut url = self.base_url.join(&format!("v2/{resource}"))?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                query.append_pair(key, value);
            }
            if let Some(cursor) = cursor {
                query.append_pair("cursor", cursor);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url.path());

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(Error::Transport)?;

        parse_response(resp).await
    }
}

fn normalize_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Decode a response body, mapping non-2xx statuses into typed errors.
async fn parse_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    let body = resp.text().await.map_err(Error::Transport)?;

    if !status.is_success() {
        let envelope = serde_json::from_str::<ErrorEnvelope>(&body).ok();
        let code = envelope.as_ref().and_then(|e| e.error.code.clone());
        let message = envelope
            .and_then(|e| e.error.message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_owned());

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(Error::Authentication { message });
        }

        return Err(Error::Api {
            status: status.as_u16(),
            code,
            message,
        });
    }

    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: body.clone(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn client(base: &str) -> PushbulletClient {
        PushbulletClient::with_client(reqwest::Client::new(), Url::parse(base).unwrap())
    }

    #[test]
    fn endpoint_keeps_path_prefix() {
        let c = client("http://localhost:9000/proxy");
        let url = c.endpoint("devices", &[], None).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/proxy/v2/devices");
    }

    #[test]
    fn endpoint_appends_params_and_cursor() {
        let c = client(DEFAULT_API_URL);
        let url = c
            .endpoint("devices", &[("active", "true".into())], Some("abc"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.pushbullet.com/v2/devices?active=true&cursor=abc"
        );
    }
}

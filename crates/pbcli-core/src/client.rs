// ── PushClient ──
//
// Facade over the raw API client. Everything the CLI does goes through
// here: listing the device directory, resolving a target, sending pushes
// and opening a live subscription.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use pbcli_api::{NewPush, NewPushContent, PushbulletClient, StreamConfig, TransportConfig};

use crate::config::ClientConfig;
use crate::convert::devices_from_api;
use crate::error::CoreError;
use crate::listener::spawn_listener;
use crate::model::{Device, Iden, Push};
use crate::resolve::resolve_device;
use crate::subscription::{self, Subscription};

/// What to send in a push, minus the target.
#[derive(Debug, Clone, Default)]
pub struct PushDraft {
    pub title: Option<String>,
    pub body: Option<String>,
}

/// High-level client for one account.
#[derive(Debug, Clone)]
pub struct PushClient {
    api: PushbulletClient,
    config: ClientConfig,
}

impl PushClient {
    pub fn new(config: ClientConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig::default().with_timeout(config.timeout);
        let api = PushbulletClient::new(config.api_url.clone(), &config.api_key, &transport)?;
        Ok(Self { api, config })
    }

    // ── Devices ──────────────────────────────────────────────────────

    /// Fetch a fresh directory snapshot. Nothing is cached between calls.
    #[instrument(skip(self))]
    pub async fn devices(&self) -> Result<Vec<Device>, CoreError> {
        let raw = self.api.list_devices().await?;
        debug!(count = raw.len(), "fetched device directory");
        Ok(devices_from_api(raw))
    }

    /// Fetch the directory and resolve `query` against it.
    pub async fn resolve_device(&self, query: &str) -> Result<Device, CoreError> {
        let devices = self.devices().await?;
        resolve_device(query, &devices).cloned()
    }

    // ── Pushes ───────────────────────────────────────────────────────

    /// Send a note. `target` of `None` pushes to every device.
    pub async fn push_note(
        &self,
        target: Option<&Iden>,
        draft: PushDraft,
    ) -> Result<Push, CoreError> {
        self.create(NewPushContent::Note, target, draft).await
    }

    /// Send a link. `target` of `None` pushes to every device.
    pub async fn push_link(
        &self,
        target: Option<&Iden>,
        url: String,
        draft: PushDraft,
    ) -> Result<Push, CoreError> {
        self.create(NewPushContent::Link { url }, target, draft).await
    }

    async fn create(
        &self,
        content: NewPushContent,
        target: Option<&Iden>,
        draft: PushDraft,
    ) -> Result<Push, CoreError> {
        let push = NewPush {
            content,
            title: draft.title,
            body: draft.body,
            device_iden: target.map(|iden| iden.as_str().to_owned()),
        };
        let created = self.api.create_push(&push).await?;
        debug!(iden = %created.iden, "push created");
        Ok(Push::from(created))
    }

    // ── Streaming ────────────────────────────────────────────────────

    /// Open a live subscription.
    ///
    /// Spawns the websocket connection and its bridge; both run until
    /// `cancel` fires or the returned subscription is dropped.
    pub fn listen(&self, cancel: CancellationToken) -> Result<(Subscription, JoinHandle<()>), CoreError> {
        let url = pbcli_api::stream::stream_url(&self.config.stream_url, &self.config.api_key)?;
        let (tx, sub) = subscription::channel(self.config.channel_capacity);
        let task = spawn_listener(self.api.clone(), url, StreamConfig::default(), tx, cancel);
        Ok((sub, task))
    }
}

// ── Stream → subscription bridge ──
//
// Sits between the websocket task in `pbcli-api` and the four
// subscription channels. Tickles are turned into REST fetches of whatever
// changed since the last high-water mark; ephemerals and errors are
// forwarded as-is.

use std::ops::ControlFlow;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use url::Url;

use pbcli_api::{PushbulletClient, StreamConfig, StreamFrame, StreamHandle, StreamMessage, TickleKind};

use crate::convert::{device_from_api, epoch_seconds};
use crate::model::{Push, StreamError};
use crate::subscription::SubscriptionSender;

/// Page size used when syncing pushes after a tickle.
const PUSH_SYNC_PAGE_SIZE: u32 = 100;

/// Spawn the websocket task plus the bridge that feeds `tx`.
///
/// Both stop when `cancel` fires or when every subscription receiver has
/// been dropped.
pub fn spawn_listener(
    api: PushbulletClient,
    stream_url: Url,
    stream_config: StreamConfig,
    tx: SubscriptionSender,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let (handle, rx) = StreamHandle::connect(stream_url, stream_config, cancel.child_token());
    let bridge = Bridge::new(api, tx);

    tokio::spawn(async move {
        bridge.run(rx, cancel).await;
        handle.shutdown();
    })
}

pub(crate) struct Bridge {
    api: PushbulletClient,
    tx: SubscriptionSender,
    /// `modified` of the newest push seen so far (epoch seconds).
    push_mark: f64,
    /// `modified` of the newest device change seen so far.
    device_mark: f64,
    connections: u64,
}

impl Bridge {
    pub(crate) fn new(api: PushbulletClient, tx: SubscriptionSender) -> Self {
        let now = epoch_seconds(Utc::now());
        Self::with_marks(api, tx, now)
    }

    pub(crate) fn with_marks(api: PushbulletClient, tx: SubscriptionSender, mark: f64) -> Self {
        Self {
            api,
            tx,
            push_mark: mark,
            device_mark: mark,
            connections: 0,
        }
    }

    async fn run(mut self, mut rx: mpsc::Receiver<StreamMessage>, cancel: CancellationToken) {
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                msg = rx.recv() => {
                    let Some(msg) = msg else {
                        debug!("stream task ended");
                        break;
                    };
                    if self.on_message(msg).await.is_break() {
                        debug!("subscription dropped, stopping bridge");
                        break;
                    }
                }
            }
        }
    }

    pub(crate) async fn on_message(&mut self, msg: StreamMessage) -> ControlFlow<()> {
        match msg {
            StreamMessage::Connected => {
                self.connections += 1;
                info!(connections = self.connections, "stream connected");
                // Anything pushed while we were disconnected produced no tickle.
                if self.connections > 1 {
                    return self.sync_pushes().await;
                }
                ControlFlow::Continue(())
            }
            StreamMessage::Frame(frame) => self.on_frame(frame).await,
            StreamMessage::Error(err) => {
                warn!(error = %err, "stream error");
                self.report(StreamError::from(err)).await
            }
        }
    }

    async fn on_frame(&mut self, frame: StreamFrame) -> ControlFlow<()> {
        match frame {
            StreamFrame::Nop => {
                trace!("nop");
                ControlFlow::Continue(())
            }
            StreamFrame::Tickle(TickleKind::Push) => self.sync_pushes().await,
            StreamFrame::Tickle(TickleKind::Device) => self.sync_devices().await,
            StreamFrame::Tickle(TickleKind::Other(subtype)) => {
                debug!(subtype, "ignoring tickle");
                ControlFlow::Continue(())
            }
            StreamFrame::Ephemeral(eph) => {
                if self.tx.ephemerals.send(eph.into()).await.is_err() {
                    return ControlFlow::Break(());
                }
                ControlFlow::Continue(())
            }
            StreamFrame::Unknown(kind) => {
                debug!(kind, "ignoring unknown frame");
                ControlFlow::Continue(())
            }
        }
    }

    /// Fetch every push changed since the mark and emit them oldest first.
    ///
    /// The mark only moves once the whole change set has been fetched.
    async fn sync_pushes(&mut self) -> ControlFlow<()> {
        let pushes = match self
            .api
            .list_pushes_modified_after(self.push_mark, PUSH_SYNC_PAGE_SIZE)
            .await
        {
            Ok(pushes) => pushes,
            Err(err) => return self.report(StreamError::from(err)).await,
        };
        debug!(count = pushes.len(), mark = self.push_mark, "synced pushes");

        for raw in pushes.into_iter().rev() {
            if let Some(modified) = raw.modified {
                self.push_mark = self.push_mark.max(modified);
            }
            // Deletions come through as inactive pushes.
            if !raw.active {
                continue;
            }
            if self.tx.pushes.send(Push::from(raw)).await.is_err() {
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    /// Fetch devices changed since the mark and emit each as an update.
    async fn sync_devices(&mut self) -> ControlFlow<()> {
        let devices = match self.api.list_devices_modified_after(self.device_mark).await {
            Ok(devices) => devices,
            Err(err) => return self.report(StreamError::from(err)).await,
        };
        debug!(count = devices.len(), mark = self.device_mark, "synced devices");

        // Change lists are not directory listings, so updates carry no rank.
        for raw in devices {
            if let Some(modified) = raw.modified {
                self.device_mark = self.device_mark.max(modified);
            }
            if self.tx.devices.send(device_from_api(raw)).await.is_err() {
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    async fn report(&self, err: StreamError) -> ControlFlow<()> {
        if self.tx.errors.send(err).await.is_err() {
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    }
}

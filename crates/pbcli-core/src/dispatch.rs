// ── Event dispatch ──
//
// Runs the listen session: waits on all four subscription channels at
// once, classifies whatever arrives first and hands it to a presentation
// sink. Stream errors are reported like any other event; nothing on the
// stream ends the loop. Only the cancellation token does.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::model::{Event, EventKind, PushContent, StreamError};
use crate::subscription::Subscription;

// ── Classification ───────────────────────────────────────────────────

/// Human-readable rendering of one event: a headline plus any
/// kind-specific lines that follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub headline: String,
    pub details: Vec<String>,
}

/// Classify an event into its printable summary.
///
/// Push kinds this client doesn't know get the generic line only.
pub fn summarize(event: &Event) -> Summary {
    match event {
        Event::Push(push) => {
            let mut details = Vec::new();
            if let Some(body) = push.body.as_deref() {
                details.push(body.to_owned());
            }
            match &push.content {
                PushContent::File {
                    file_name,
                    file_type,
                    file_url,
                    ..
                } => details.push(format!(
                    "File {} of type {}: {}",
                    file_name.as_deref().unwrap_or_default(),
                    file_type.as_deref().unwrap_or_default(),
                    file_url.as_deref().unwrap_or_default(),
                )),
                PushContent::Link { url } => {
                    details.push(format!("Link: {}", url.as_deref().unwrap_or_default()));
                }
                PushContent::Note | PushContent::Other { .. } => {}
            }
            Summary {
                headline: format!(
                    "New {} from {}: {}",
                    push.content.kind(),
                    push.sender(),
                    push.title.as_deref().unwrap_or_default(),
                ),
                details,
            }
        }
        Event::Ephemeral(eph) => Summary {
            headline: format!(
                "New ephemeral of type {} received from {}@{}: {}",
                eph.kind,
                eph.package_name.as_deref().unwrap_or_default(),
                eph.source_user_iden
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
                eph.message.as_deref().unwrap_or_default(),
            ),
            details: Vec::new(),
        },
        Event::DeviceUpdate(device) => Summary {
            headline: format!(
                "Device {} updated",
                device.nickname.as_deref().unwrap_or_default()
            ),
            details: Vec::new(),
        },
        Event::StreamError(err) => Summary {
            headline: format!("An error occurred: {err}"),
            details: Vec::new(),
        },
    }
}

// ── Sink ─────────────────────────────────────────────────────────────

/// Presentation side of the dispatcher. Called synchronously, once per
/// event, on the dispatcher's task.
pub trait EventSink {
    fn on_event(&mut self, event: &Event, summary: &Summary);

    /// Called after `on_event` for every stream error. Hook for callers
    /// that want to react to connection trouble (reconnect, alert, ...).
    fn on_stream_error(&mut self, _error: &StreamError) {}
}

/// Per-kind counts of handled events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub pushes: u64,
    pub ephemerals: u64,
    pub device_updates: u64,
    pub stream_errors: u64,
}

impl DispatchStats {
    pub fn total(&self) -> u64 {
        self.pushes + self.ephemerals + self.device_updates + self.stream_errors
    }

    fn record(&mut self, kind: EventKind) {
        match kind {
            EventKind::Push => self.pushes += 1,
            EventKind::Ephemeral => self.ephemerals += 1,
            EventKind::DeviceUpdate => self.device_updates += 1,
            EventKind::StreamError => self.stream_errors += 1,
        }
    }
}

// ── Dispatcher ───────────────────────────────────────────────────────

/// Which subscription channels still have a live producer.
#[derive(Debug, Clone, Copy)]
struct OpenChannels {
    pushes: bool,
    ephemerals: bool,
    devices: bool,
    errors: bool,
}

impl OpenChannels {
    fn any(self) -> bool {
        self.pushes || self.ephemerals || self.devices || self.errors
    }
}

/// Consumes a [`Subscription`] and routes each event to a sink.
pub struct Dispatcher<S> {
    sink: S,
    stats: DispatchStats,
}

impl<S: EventSink> Dispatcher<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            stats: DispatchStats::default(),
        }
    }

    /// Run until `cancel` fires.
    ///
    /// Branches are polled in random order each iteration so a busy
    /// channel can't starve the others. Channels whose producer has gone
    /// away are disabled; when all of them are, the loop just waits for
    /// cancellation.
    pub async fn run(
        &mut self,
        mut subscription: Subscription,
        cancel: CancellationToken,
    ) -> DispatchStats {
        let mut open = OpenChannels {
            pushes: true,
            ephemerals: true,
            devices: true,
            errors: true,
        };
        info!("dispatcher listening");

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!("dispatcher cancelled");
                    break;
                }
                msg = subscription.pushes.recv(), if open.pushes => match msg {
                    Some(push) => self.handle(&Event::Push(push)),
                    None => Self::mark_closed(&mut open, EventKind::Push),
                },
                msg = subscription.ephemerals.recv(), if open.ephemerals => match msg {
                    Some(eph) => self.handle(&Event::Ephemeral(eph)),
                    None => Self::mark_closed(&mut open, EventKind::Ephemeral),
                },
                msg = subscription.devices.recv(), if open.devices => match msg {
                    Some(device) => self.handle(&Event::DeviceUpdate(device)),
                    None => Self::mark_closed(&mut open, EventKind::DeviceUpdate),
                },
                msg = subscription.errors.recv(), if open.errors => match msg {
                    Some(err) => self.handle(&Event::StreamError(err)),
                    None => Self::mark_closed(&mut open, EventKind::StreamError),
                },
            }
        }

        info!(handled = self.stats.total(), "dispatcher stopped");
        self.stats
    }

    /// Handle one event synchronously.
    pub fn handle(&mut self, event: &Event) {
        let kind = event.kind();
        let summary = summarize(event);
        debug!(%kind, headline = %summary.headline, "dispatching event");

        self.sink.on_event(event, &summary);
        if let Event::StreamError(err) = event {
            warn!(transient = err.transient, error = %err, "stream error");
            self.sink.on_stream_error(err);
        }
        self.stats.record(kind);
    }

    fn mark_closed(open: &mut OpenChannels, kind: EventKind) {
        debug!(%kind, "channel closed");
        match kind {
            EventKind::Push => open.pushes = false,
            EventKind::Ephemeral => open.ephemerals = false,
            EventKind::DeviceUpdate => open.devices = false,
            EventKind::StreamError => open.errors = false,
        }
        if !open.any() {
            info!("all channels closed; waiting for cancellation");
        }
    }
}

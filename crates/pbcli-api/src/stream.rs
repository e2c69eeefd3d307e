//! Realtime event stream with auto-reconnect.
//!
//! Connects to the Pushbullet stream websocket and forwards parsed frames,
//! connection transitions and errors through a single FIFO
//! [`tokio::sync::mpsc`] channel. Reconnects with exponential backoff +
//! jitter until cancelled.
//!
//! # Example
//!
//! ```rust,ignore
//! use pbcli_api::stream::{StreamConfig, StreamHandle, StreamMessage};
//! use tokio_util::sync::CancellationToken;
//!
//! let cancel = CancellationToken::new();
//! let url = pbcli_api::stream::stream_url(&base, &token)?;
//! let (handle, mut rx) = StreamHandle::connect(url, StreamConfig::default(), cancel.clone());
//!
//! while let Some(msg) = rx.recv().await {
//!     println!("{msg:?}");
//! }
//!
//! handle.shutdown();
//! ```

use std::time::Duration;

use futures_util::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;
use crate::models::ApiEphemeral;

/// Production stream endpoint; the access token is appended as the last
/// path segment.
pub const DEFAULT_STREAM_URL: &str = "wss://stream.pushbullet.com/websocket/";

// ── Channel capacity ─────────────────────────────────────────────────

const MESSAGE_CHANNEL_CAPACITY: usize = 256;

// ── Frames ───────────────────────────────────────────────────────────

/// What a tickle frame says has changed server-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickleKind {
    Push,
    Device,
    Other(String),
}

/// A parsed text frame from the stream.
#[derive(Debug, Clone)]
pub enum StreamFrame {
    /// Heartbeat, sent roughly every 30 seconds.
    Nop,
    /// Something changed; fetch it over REST.
    Tickle(TickleKind),
    /// An ephemeral delivered inline.
    Ephemeral(ApiEphemeral),
    /// A frame type this client doesn't understand.
    Unknown(String),
}

/// Everything the background task reports, in the order it happened.
#[derive(Debug)]
pub enum StreamMessage {
    /// A websocket handshake completed (first connect or reconnect).
    Connected,
    Frame(StreamFrame),
    /// A connection attempt failed, the socket broke, or a frame was
    /// malformed. The task keeps running after sending this.
    Error(Error),
}

// ── StreamConfig ─────────────────────────────────────────────────────

/// Reconnection and liveness tuning for the stream. Reconnection never
/// gives up; only cancellation stops the task.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Delay before the first reconnection attempt. Default: 1s.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 30s.
    pub max_delay: Duration,

    /// Reconnect if no frame arrives for this long. The server sends a
    /// `nop` every 30s, so the default of 90s tolerates two lost beats.
    pub idle_timeout: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(90),
        }
    }
}

/// Build the stream URL for an access token.
pub fn stream_url(base: &Url, access_token: &SecretString) -> Result<Url, Error> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join(access_token.expose_secret())?)
}

// ── StreamHandle ─────────────────────────────────────────────────────

/// Handle to a running stream task.
pub struct StreamHandle {
    cancel: CancellationToken,
}

impl StreamHandle {
    /// Spawn the connect/read/reconnect loop and return the receiving end
    /// of its message channel.
    ///
    /// Returns immediately; the first handshake happens asynchronously and
    /// is announced with [`StreamMessage::Connected`].
    pub fn connect(
        url: Url,
        config: StreamConfig,
        cancel: CancellationToken,
    ) -> (Self, mpsc::Receiver<StreamMessage>) {
        let (tx, rx) = mpsc::channel(MESSAGE_CHANNEL_CAPACITY);

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            stream_loop(url, tx, config, task_cancel).await;
        });

        (Self { cancel }, rx)
    }

    /// Signal the background task to shut down gracefully.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

// ── Background reconnection loop ─────────────────────────────────────

/// Main loop: connect → read → on error, report → wait → reconnect.
async fn stream_loop(
    url: Url,
    tx: mpsc::Sender<StreamMessage>,
    config: StreamConfig,
    cancel: CancellationToken,
) {
    let mut attempt: u32 = 0;

    loop {
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = connect_and_read(&url, &tx, &config, &cancel) => result,
        };

        let clean = match result {
            // Clean disconnect (server ended the stream, or cancelled).
            Ok(()) => {
                if cancel.is_cancelled() || tx.is_closed() {
                    break;
                }
                tracing::info!("stream disconnected cleanly");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, attempt, "stream error");
                if tx.send(StreamMessage::Error(e)).await.is_err() {
                    break;
                }
                false
            }
        };

        let delay = next_delay(clean, &mut attempt, &config);
        tracing::info!(
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            attempt,
            "waiting before reconnect"
        );

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(delay) => {}
        }
    }

    tracing::debug!("stream loop exiting");
}

/// Delay before the next connection attempt.
///
/// A clean disconnect resets the backoff but still waits `initial_delay`,
/// so a server that accepts and immediately drops never gets hammered.
fn next_delay(clean: bool, attempt: &mut u32, config: &StreamConfig) -> Duration {
    if clean {
        *attempt = 0;
        return config.initial_delay;
    }
    let delay = calculate_backoff(*attempt, config);
    *attempt = attempt.saturating_add(1);
    delay
}

// ── Single connection lifecycle ──────────────────────────────────────

/// Establish one websocket connection and read frames until it drops.
async fn connect_and_read(
    url: &Url,
    tx: &mpsc::Sender<StreamMessage>,
    config: &StreamConfig,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    // The token is the last path segment; keep it out of the logs.
    tracing::info!(host = url.host_str().unwrap_or(""), "connecting to stream");

    let (mut ws_stream, _response) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

    tracing::info!("stream connected");
    if tx.send(StreamMessage::Connected).await.is_err() {
        return Ok(());
    }

    loop {
        let frame = tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(()),
            frame = tokio::time::timeout(config.idle_timeout, ws_stream.next()) => frame,
        };

        let Ok(frame) = frame else {
            return Err(Error::StreamIdle {
                idle_secs: config.idle_timeout.as_secs(),
            });
        };

        match frame {
            Some(Ok(tungstenite::Message::Text(text))) => {
                let msg = match parse_frame(text.as_str()) {
                    Ok(frame) => StreamMessage::Frame(frame),
                    Err(e) => {
                        tracing::debug!(error = %e, "failed to parse stream frame");
                        StreamMessage::Error(e)
                    }
                };
                if tx.send(msg).await.is_err() {
                    return Ok(());
                }
            }
            Some(Ok(tungstenite::Message::Ping(_))) => {
                // tungstenite handles pong replies automatically
                tracing::trace!("stream ping");
            }
            Some(Ok(tungstenite::Message::Close(frame))) => {
                return Err(match frame {
                    Some(cf) => Error::WebSocketClosed {
                        code: u16::from(cf.code),
                        reason: cf.reason.to_string(),
                    },
                    None => Error::WebSocketClosed {
                        code: 1005,
                        reason: "no close payload".into(),
                    },
                });
            }
            Some(Err(e)) => {
                return Err(Error::WebSocketConnect(e.to_string()));
            }
            None => {
                tracing::info!("stream ended");
                return Ok(());
            }
            _ => {
                // Binary, Pong, Frame -- ignore
            }
        }
    }
}

// ── Frame parsing ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RawFrame {
    Nop,
    Tickle { subtype: String },
    Push { push: ApiEphemeral },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct FrameType {
    #[serde(rename = "type", default)]
    frame_type: String,
}

/// Parse one text frame.
pub fn parse_frame(text: &str) -> Result<StreamFrame, Error> {
    let raw: RawFrame = serde_json::from_str(text).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: text.to_owned(),
    })?;

    Ok(match raw {
        RawFrame::Nop => StreamFrame::Nop,
        RawFrame::Tickle { subtype } => StreamFrame::Tickle(match subtype.as_str() {
            "push" => TickleKind::Push,
            "device" => TickleKind::Device,
            _ => TickleKind::Other(subtype),
        }),
        RawFrame::Push { push } => StreamFrame::Ephemeral(push),
        RawFrame::Unknown => {
            let frame_type = serde_json::from_str::<FrameType>(text)
                .map(|f| f.frame_type)
                .unwrap_or_default();
            StreamFrame::Unknown(frame_type)
        }
    })
}

// ── Backoff calculation ──────────────────────────────────────────────

/// Exponential backoff with jitter.
///
/// `delay = min(initial * 2^attempt, max) * (1 +- 0.25)`
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn calculate_backoff(attempt: u32, config: &StreamConfig) -> Duration {
    let exponent = i32::try_from(attempt.min(30)).unwrap_or(30);
    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powi(exponent);
    let capped = base.min(config.max_delay.as_secs_f64());

    // Deterministic jitter seeded from the attempt number.
    let jitter_factor = 1.0 + 0.25 * (f64::from(attempt) * 7.3).sin();
    let with_jitter = (capped * jitter_factor).max(0.0);

    Duration::from_secs_f64(with_jitter)
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn default_stream_config() {
        let config = StreamConfig::default();
        assert_eq!(config.initial_delay, Duration::from_secs(1));
        assert_eq!(config.max_delay, Duration::from_secs(30));
        assert_eq!(config.idle_timeout, Duration::from_secs(90));
    }

    #[test]
    fn backoff_increases_exponentially() {
        let config = StreamConfig::default();

        let d0 = calculate_backoff(0, &config);
        let d1 = calculate_backoff(1, &config);
        let d2 = calculate_backoff(2, &config);

        assert!(d1 > d0, "d1 ({d1:?}) should be greater than d0 ({d0:?})");
        assert!(d2 > d1, "d2 ({d2:?}) should be greater than d1 ({d1:?})");
    }

    #[test]
    fn clean_disconnect_still_waits_and_resets_backoff() {
        let config = StreamConfig::default();
        let mut attempt = 0;

        let first = next_delay(false, &mut attempt, &config);
        let second = next_delay(false, &mut attempt, &config);
        assert_eq!(attempt, 2);
        assert!(second > first);

        let clean = next_delay(true, &mut attempt, &config);
        assert_eq!(clean, config.initial_delay);
        assert!(clean > Duration::ZERO);
        assert_eq!(attempt, 0);
    }

    #[test]
    fn backoff_caps_at_max_delay() {
        let config = StreamConfig {
            max_delay: Duration::from_secs(10),
            ..StreamConfig::default()
        };

        let d10 = calculate_backoff(10, &config);
        // With jitter factor up to 1.25, max effective is 12.5s
        assert!(d10 <= Duration::from_secs(13), "delay at attempt 10 ({d10:?})");

        // Huge attempt counts must not overflow
        let far = calculate_backoff(u32::MAX, &config);
        assert!(far <= Duration::from_secs(13));
    }

    #[test]
    fn stream_url_appends_token() {
        let base = Url::parse(DEFAULT_STREAM_URL).unwrap();
        let token = SecretString::from("o.abc123".to_string());
        let url = stream_url(&base, &token).unwrap();
        assert_eq!(url.as_str(), "wss://stream.pushbullet.com/websocket/o.abc123");

        let base = Url::parse("ws://127.0.0.1:9000/ws").unwrap();
        let url = stream_url(&base, &token).unwrap();
        assert_eq!(url.as_str(), "ws://127.0.0.1:9000/ws/o.abc123");
    }

    #[test]
    fn parse_nop() {
        assert!(matches!(parse_frame(r#"{"type":"nop"}"#).unwrap(), StreamFrame::Nop));
    }

    #[test]
    fn parse_tickles() {
        let push = parse_frame(r#"{"type":"tickle","subtype":"push"}"#).unwrap();
        assert!(matches!(push, StreamFrame::Tickle(TickleKind::Push)));

        let device = parse_frame(r#"{"type":"tickle","subtype":"device"}"#).unwrap();
        assert!(matches!(device, StreamFrame::Tickle(TickleKind::Device)));

        let other = parse_frame(r#"{"type":"tickle","subtype":"chat"}"#).unwrap();
        match other {
            StreamFrame::Tickle(TickleKind::Other(s)) => assert_eq!(s, "chat"),
            f => panic!("unexpected frame: {f:?}"),
        }
    }

    #[test]
    fn parse_ephemeral_mirror() {
        let text = serde_json::json!({
            "type": "push",
            "push": {
                "type": "mirror",
                "package_name": "com.pushbullet.android",
                "source_user_iden": "ujpah72o0",
                "source_device_iden": "ujpah72o0sjAoRtnM0jc",
                "title": "Mirror",
                "body": "If you see this on your computer, it works",
                "dismissible": true
            }
        })
        .to_string();

        match parse_frame(&text).unwrap() {
            StreamFrame::Ephemeral(e) => {
                assert_eq!(e.ephemeral_type, "mirror");
                assert_eq!(e.package_name.as_deref(), Some("com.pushbullet.android"));
                assert_eq!(e.source_user_iden.as_deref(), Some("ujpah72o0"));
                assert_eq!(
                    e.body.as_deref(),
                    Some("If you see this on your computer, it works")
                );
            }
            f => panic!("unexpected frame: {f:?}"),
        }
    }

    #[test]
    fn parse_unknown_frame_type() {
        match parse_frame(r#"{"type":"chat_update","x":1}"#).unwrap() {
            StreamFrame::Unknown(t) => assert_eq!(t, "chat_update"),
            f => panic!("unexpected frame: {f:?}"),
        }
    }

    #[test]
    fn parse_malformed_frame_is_an_error() {
        let err = parse_frame("not json at all").unwrap_err();
        assert!(matches!(err, Error::Deserialization { .. }));

        // Known type but missing payload
        let err = parse_frame(r#"{"type":"push"}"#).unwrap_err();
        assert!(matches!(err, Error::Deserialization { .. }));
    }
}

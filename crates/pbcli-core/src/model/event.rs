// ── Stream event domain types ──

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::device::Device;
use super::iden::Iden;

/// Type-specific payload of a push.
///
/// Kinds this client doesn't know are kept verbatim in `Other` so newer
/// server-side push types still surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PushContent {
    Note,
    File {
        file_name: Option<String>,
        file_type: Option<String>,
        file_url: Option<String>,
        image_url: Option<String>,
    },
    Link {
        url: Option<String>,
    },
    Other {
        kind: String,
    },
}

impl PushContent {
    /// Wire name of the push type.
    pub fn kind(&self) -> &str {
        match self {
            Self::Note => "note",
            Self::File { .. } => "file",
            Self::Link { .. } => "link",
            Self::Other { kind } => kind,
        }
    }
}

/// A stored push (note, file or link) delivered to this account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Push {
    pub iden: Iden,
    pub content: PushContent,
    pub active: bool,
    pub dismissed: bool,
    pub title: Option<String>,
    pub body: Option<String>,
    pub sender_name: Option<String>,
    pub sender_email: Option<String>,
    pub sender_iden: Option<Iden>,
    pub target_device_iden: Option<Iden>,
    pub source_device_iden: Option<Iden>,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
}

impl Push {
    /// Who sent it: display name, then email, then `"unknown"`.
    pub fn sender(&self) -> &str {
        self.sender_name
            .as_deref()
            .or(self.sender_email.as_deref())
            .unwrap_or("unknown")
    }
}

/// A transient message relayed through the stream and never stored
/// (mirrored notifications, dismissals, clipboard, SMS changes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ephemeral {
    pub kind: String,
    pub package_name: Option<String>,
    pub source_user_iden: Option<Iden>,
    pub source_device_iden: Option<Iden>,
    pub title: Option<String>,
    pub message: Option<String>,
}

/// An error observed on the live stream. Reported, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamError {
    pub message: String,
    /// Whether the condition is expected to clear on its own.
    pub transient: bool,
}

impl StreamError {
    pub fn new(message: impl Into<String>, transient: bool) -> Self {
        Self {
            message: message.into(),
            transient,
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Discriminant of [`Event`], used for log fields and counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    Push,
    Ephemeral,
    DeviceUpdate,
    StreamError,
}

/// One occurrence on a subscription, tagged by the channel it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    Push(Push),
    Ephemeral(Ephemeral),
    DeviceUpdate(Device),
    StreamError(StreamError),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Push(_) => EventKind::Push,
            Self::Ephemeral(_) => EventKind::Ephemeral,
            Self::DeviceUpdate(_) => EventKind::DeviceUpdate,
            Self::StreamError(_) => EventKind::StreamError,
        }
    }
}

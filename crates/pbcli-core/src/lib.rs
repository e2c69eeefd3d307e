// pbcli-core: Domain layer between pbcli-api and the command line.
//
// Owns the device resolver, the live-event dispatcher and the domain
// model. Never reads config files or prints anything itself.

pub mod client;
pub mod config;
pub mod convert;
pub mod dispatch;
pub mod error;
pub mod listener;
pub mod model;
pub mod resolve;
pub mod subscription;

// ── Primary re-exports ──────────────────────────────────────────────
pub use client::{PushClient, PushDraft};
pub use config::ClientConfig;
pub use dispatch::{DispatchStats, Dispatcher, EventSink, Summary, summarize};
pub use error::CoreError;
pub use resolve::{MatchedBy, resolve_device, resolve_with_match};
pub use subscription::{Subscription, SubscriptionSender};

pub use model::{Device, Ephemeral, Event, EventKind, Iden, Push, PushContent, StreamError};

// pbcli-api: Async Rust client for the Pushbullet REST API and realtime stream

pub mod client;
pub mod error;
pub mod models;
pub mod stream;
pub mod transport;

pub use client::{DEFAULT_API_URL, PushbulletClient};
pub use error::Error;
pub use models::{ApiDevice, ApiEphemeral, ApiPush, NewPush, NewPushContent};
pub use stream::{DEFAULT_STREAM_URL, StreamConfig, StreamFrame, StreamHandle, StreamMessage, TickleKind};
pub use transport::TransportConfig;

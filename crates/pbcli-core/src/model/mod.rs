// ── Domain model ──
//
// Canonical types consumed by the CLI. Wire types from `pbcli-api` are
// converted into these in `crate::convert`.

pub mod device;
pub mod event;
pub mod iden;

pub use device::Device;
pub use event::{Ephemeral, Event, EventKind, Push, PushContent, StreamError};
pub use iden::Iden;

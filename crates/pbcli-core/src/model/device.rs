// ── Device domain type ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::iden::Iden;

/// A registered device, as seen in one directory snapshot.
///
/// Devices are immutable snapshots; nothing in this crate writes them back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// 0-based rank in the directory listing this device came from. It
    /// shifts whenever devices are added or removed, and is absent for
    /// devices that did not come from a full listing (stream updates).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    pub iden: Iden,
    pub nickname: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    /// Platform: `"android"`, `"ios"`, `"chrome"`, `"stream"`, ...
    pub device_type: Option<String>,
    pub icon: Option<String>,
    pub active: bool,
    pub pushable: bool,
    pub has_sms: bool,
    pub app_version: Option<i64>,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,

    // Sensitive-ish, shown only in verbose listings
    pub fingerprint: Option<String>,
    pub key_fingerprint: Option<String>,
    pub push_token: Option<String>,
}

#[cfg(test)]
pub(crate) fn test_device(position: usize, iden: &str, nickname: &str, model: &str) -> Device {
    let opt = |s: &str| (!s.is_empty()).then(|| s.to_owned());
    Device {
        position: Some(position),
        iden: Iden::from(iden),
        nickname: opt(nickname),
        manufacturer: None,
        model: opt(model),
        device_type: None,
        icon: None,
        active: true,
        pushable: true,
        has_sms: false,
        app_version: None,
        created: None,
        modified: None,
        fingerprint: None,
        key_fingerprint: None,
        push_token: None,
    }
}

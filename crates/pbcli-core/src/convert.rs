// ── Wire → domain conversions ──
//
// Pushbullet timestamps are float seconds since the epoch; empty strings
// are treated the same as absent fields.

use chrono::{DateTime, Utc};

use pbcli_api::{ApiDevice, ApiEphemeral, ApiPush};

use crate::model::{Device, Ephemeral, Iden, Push, PushContent, StreamError};

/// Convert float epoch seconds into a UTC timestamp.
#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
pub(crate) fn timestamp(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let micros = (secs * 1_000_000.0).round() as i64;
    DateTime::from_timestamp_micros(micros)
}

/// Convert a UTC timestamp back into float epoch seconds.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub(crate) fn epoch_seconds(at: DateTime<Utc>) -> f64 {
    at.timestamp_micros() as f64 / 1_000_000.0
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.is_empty())
}

fn iden(s: Option<String>) -> Option<Iden> {
    non_empty(s).map(Iden::from)
}

/// Build a domain device from its wire form. No listing rank is assigned.
pub fn device_from_api(d: ApiDevice) -> Device {
    Device {
        position: None,
        iden: Iden::from(d.iden),
        nickname: non_empty(d.nickname),
        manufacturer: non_empty(d.manufacturer),
        model: non_empty(d.model),
        device_type: non_empty(d.device_type).or(non_empty(d.kind)),
        icon: non_empty(d.icon),
        active: d.active,
        pushable: d.pushable,
        has_sms: d.has_sms,
        app_version: d.app_version,
        created: d.created.and_then(timestamp),
        modified: d.modified.and_then(timestamp),
        fingerprint: non_empty(d.fingerprint),
        key_fingerprint: non_empty(d.key_fingerprint),
        push_token: non_empty(d.push_token),
    }
}

/// Convert a full directory listing, assigning positions in order.
pub fn devices_from_api(devices: Vec<ApiDevice>) -> Vec<Device> {
    devices
        .into_iter()
        .enumerate()
        .map(|(position, d)| Device {
            position: Some(position),
            ..device_from_api(d)
        })
        .collect()
}

impl From<ApiPush> for Push {
    fn from(p: ApiPush) -> Self {
        let content = match p.push_type.as_deref() {
            Some("note") => PushContent::Note,
            Some("file") => PushContent::File {
                file_name: non_empty(p.file_name),
                file_type: non_empty(p.file_type),
                file_url: non_empty(p.file_url),
                image_url: non_empty(p.image_url),
            },
            Some("link") => PushContent::Link {
                url: non_empty(p.url),
            },
            other => PushContent::Other {
                kind: other.unwrap_or_default().to_owned(),
            },
        };

        Push {
            iden: Iden::from(p.iden),
            content,
            active: p.active,
            dismissed: p.dismissed,
            title: non_empty(p.title),
            body: non_empty(p.body),
            sender_name: non_empty(p.sender_name),
            sender_email: non_empty(p.sender_email),
            sender_iden: iden(p.sender_iden),
            target_device_iden: iden(p.target_device_iden),
            source_device_iden: iden(p.source_device_iden),
            created: p.created.and_then(timestamp),
            modified: p.modified.and_then(timestamp),
        }
    }
}

impl From<ApiEphemeral> for Ephemeral {
    fn from(e: ApiEphemeral) -> Self {
        Ephemeral {
            kind: e.ephemeral_type,
            package_name: non_empty(e.package_name),
            source_user_iden: iden(e.source_user_iden),
            source_device_iden: iden(e.source_device_iden),
            title: non_empty(e.title),
            message: non_empty(e.body),
        }
    }
}

impl From<pbcli_api::Error> for StreamError {
    fn from(err: pbcli_api::Error) -> Self {
        let transient = err.is_transient();
        StreamError::new(err.to_string(), transient)
    }
}

// Pushbullet REST response and request types
//
// Wire-level models only. Fields use `#[serde(default)]` liberally because
// the service omits fields freely (deleted objects carry little more than
// `iden`, `active` and `modified`). Timestamps are float seconds.

use serde::{Deserialize, Serialize};

// ── List envelopes ───────────────────────────────────────────────────

/// `GET /v2/devices` response body.
#[derive(Debug, Deserialize)]
pub struct DeviceList {
    #[serde(default)]
    pub devices: Vec<ApiDevice>,
    #[serde(default)]
    pub cursor: Option<String>,
}

/// `GET /v2/pushes` response body.
#[derive(Debug, Deserialize)]
pub struct PushList {
    #[serde(default)]
    pub pushes: Vec<ApiPush>,
    #[serde(default)]
    pub cursor: Option<String>,
}

/// Error body returned with non-2xx responses.
///
/// ```json
/// { "error": { "code": "invalid_access_token", "type": "invalid_request", "message": "..." } }
/// ```
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

// ── Device ───────────────────────────────────────────────────────────

/// Device object from `/v2/devices`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiDevice {
    pub iden: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub created: Option<f64>,
    #[serde(default)]
    pub modified: Option<f64>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default, rename = "type")]
    pub device_type: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub app_version: Option<i64>,
    #[serde(default)]
    pub pushable: bool,
    #[serde(default)]
    pub has_sms: bool,
    #[serde(default)]
    pub fingerprint: Option<String>,
    #[serde(default)]
    pub key_fingerprint: Option<String>,
    #[serde(default)]
    pub push_token: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Push ─────────────────────────────────────────────────────────────

/// Push object from `/v2/pushes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiPush {
    pub iden: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub dismissed: bool,
    #[serde(default)]
    pub created: Option<f64>,
    #[serde(default)]
    pub modified: Option<f64>,
    /// `"note"`, `"file"` or `"link"`. Absent on deleted pushes.
    #[serde(default, rename = "type")]
    pub push_type: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub sender_iden: Option<String>,
    #[serde(default)]
    pub sender_email: Option<String>,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub receiver_iden: Option<String>,
    #[serde(default)]
    pub target_device_iden: Option<String>,
    #[serde(default)]
    pub source_device_iden: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Ephemeral ────────────────────────────────────────────────────────

/// Ephemeral payload embedded in a `{"type": "push", "push": {...}}` frame.
///
/// Ephemerals are never stored server-side: mirrored notifications,
/// dismissals, clipboard syncs, SMS changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEphemeral {
    #[serde(rename = "type")]
    pub ephemeral_type: String,
    #[serde(default)]
    pub package_name: Option<String>,
    #[serde(default)]
    pub application_name: Option<String>,
    #[serde(default)]
    pub source_user_iden: Option<String>,
    #[serde(default)]
    pub source_device_iden: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub notification_id: Option<String>,
    #[serde(default)]
    pub dismissible: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Push creation ────────────────────────────────────────────────────

/// Type-specific part of a new push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NewPushContent {
    Note,
    Link { url: String },
}

/// `POST /v2/pushes` request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPush {
    #[serde(flatten)]
    pub content: NewPushContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Target device. `None` pushes to every device on the account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_iden: Option<String>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn deserialize_device_keeps_unknown_fields() {
        let raw = json!({
            "iden": "ujpah72o0sjAoRtnM0jc",
            "active": true,
            "created": 1_412_047_948.579_029,
            "modified": 1_412_047_948.579_031,
            "type": "stream",
            "kind": "stream",
            "nickname": "Stream Device",
            "manufacturer": "Apple",
            "model": "iPhone 5s (GSM)",
            "app_version": 8623,
            "pushable": true,
            "has_sms": false,
            "generated_nickname": true
        });

        let device: ApiDevice = serde_json::from_value(raw).unwrap();
        assert_eq!(device.iden, "ujpah72o0sjAoRtnM0jc");
        assert_eq!(device.nickname.as_deref(), Some("Stream Device"));
        assert_eq!(device.device_type.as_deref(), Some("stream"));
        assert_eq!(device.app_version, Some(8623));
        assert_eq!(device.extra["generated_nickname"], true);
    }

    #[test]
    fn deserialize_deleted_push() {
        let raw = json!({ "iden": "ujpah72o0sjAoRtnM0jc", "active": false, "modified": 1.5 });
        let push: ApiPush = serde_json::from_value(raw).unwrap();
        assert!(!push.active);
        assert!(push.push_type.is_none());
    }

    #[test]
    fn serialize_link_push() {
        let push = NewPush {
            content: NewPushContent::Link {
                url: "https://example.com".into(),
            },
            title: Some("Look".into()),
            body: None,
            device_iden: Some("abc".into()),
        };

        let value = serde_json::to_value(&push).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "link",
                "url": "https://example.com",
                "title": "Look",
                "device_iden": "abc"
            })
        );
    }

    #[test]
    fn serialize_broadcast_note() {
        let push = NewPush {
            content: NewPushContent::Note,
            title: None,
            body: Some("hello".into()),
            device_iden: None,
        };

        let value = serde_json::to_value(&push).unwrap();
        assert_eq!(value, json!({ "type": "note", "body": "hello" }));
    }
}

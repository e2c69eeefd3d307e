// ── Canonical identity type ──
//
// Every Pushbullet object (device, push, user) is named by a short opaque
// string the service assigns. `Iden` keeps those distinct from nicknames,
// titles and other user-facing strings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Service-assigned identifier, stable across sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Iden(String);

impl Iden {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Iden {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Iden {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Iden {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Iden {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl PartialEq<str> for Iden {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Iden {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

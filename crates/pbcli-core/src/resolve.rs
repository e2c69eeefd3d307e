// ── Device resolution ──
//
// Maps a free-form target string onto exactly one device of a directory
// snapshot. Interpretations are tried in a fixed order and the first hit
// wins:
//
//   1. position   (`"0"`, `"2"`, ...) if it parses and is in range
//   2. nickname   (exact, case-sensitive)
//   3. model      (exact)
//   4. iden       (exact)
//
// Each string interpretation is its own pass over the whole list, so a
// nickname match later in the list beats a model match earlier in it.

use crate::error::CoreError;
use crate::model::Device;

/// Which interpretation of the query produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum MatchedBy {
    Position,
    Nickname,
    Model,
    Iden,
}

type Field = fn(&Device) -> Option<&str>;

fn nickname(d: &Device) -> Option<&str> {
    d.nickname.as_deref()
}

fn model(d: &Device) -> Option<&str> {
    d.model.as_deref()
}

fn iden(d: &Device) -> Option<&str> {
    Some(d.iden.as_str())
}

const STRING_PASSES: [(MatchedBy, Field); 3] = [
    (MatchedBy::Nickname, nickname),
    (MatchedBy::Model, model),
    (MatchedBy::Iden, iden),
];

/// Resolve `query` against `devices`, reporting how it matched.
///
/// Never touches the list; `devices` is read in directory order. An empty
/// query is left to the caller (it means "no targeting") and simply finds
/// nothing here.
pub fn resolve_with_match<'a>(
    query: &str,
    devices: &'a [Device],
) -> Result<(&'a Device, MatchedBy), CoreError> {
    if let Some(device) = query.parse::<usize>().ok().and_then(|n| devices.get(n)) {
        return Ok((device, MatchedBy::Position));
    }

    for (matched_by, field) in STRING_PASSES {
        if let Some(device) = devices.iter().find(|d| field(d) == Some(query)) {
            return Ok((device, matched_by));
        }
    }

    Err(CoreError::DeviceNotFound {
        identifier: query.to_owned(),
    })
}

/// Resolve `query` to a single device of the snapshot.
pub fn resolve_device<'a>(query: &str, devices: &'a [Device]) -> Result<&'a Device, CoreError> {
    let (device, matched_by) = resolve_with_match(query, devices)?;
    tracing::debug!(query, %matched_by, iden = %device.iden, "resolved device");
    Ok(device)
}

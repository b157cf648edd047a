//! Types shared by the mode endpoint and its clients.

use crate::error::{RemoteError, Result};
use duaelmix_core::SubIndex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of a session id
pub const SESSION_ID_LEN: usize = 10;

// =============================================================================
// Session Id
// =============================================================================

/// A validated session id: exactly ten characters from `[a-z0-9]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Validate `raw` as a session id.
    pub fn parse(raw: &str) -> Result<Self> {
        let valid = raw.len() == SESSION_ID_LEN
            && raw
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit());
        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(RemoteError::Validation(format!("invalid session id {raw:?}")))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SessionId {
    type Error = RemoteError;

    fn try_from(raw: String) -> Result<Self> {
        Self::parse(&raw)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

// =============================================================================
// Mode Request
// =============================================================================

/// A validated `?session=<id>&on=<0|1>` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeRequest {
    pub session: SessionId,
    pub mode: SubIndex,
}

impl ModeRequest {
    /// Validate raw query values.
    ///
    /// `on` must be an integer that is 0 or 1; trailing garbage such as
    /// `1abc` is rejected.
    pub fn from_query(session: Option<&str>, on: Option<&str>) -> Result<Self> {
        let session = SessionId::parse(session.unwrap_or_default())?;
        let on = on.ok_or_else(|| RemoteError::Validation("missing on".into()))?;
        let mode = on
            .parse::<i64>()
            .ok()
            .and_then(|n| usize::try_from(n).ok())
            .and_then(SubIndex::from_index)
            .ok_or_else(|| RemoteError::Validation(format!("invalid on {on:?}")))?;

        Ok(Self { session, mode })
    }
}

// =============================================================================
// Session Record
// =============================================================================

/// Stored state of one session, overwritten on every mode request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Unix seconds of the last update
    #[serde(default)]
    pub timestamp: i64,
    /// 0 or 1; absent counts as 0
    #[serde(default)]
    pub mode: u8,
}

impl SessionRecord {
    pub fn new(timestamp: i64, mode: SubIndex) -> Self {
        Self {
            timestamp,
            mode: mode.into(),
        }
    }

    /// Record for `mode` stamped with the current time
    pub fn now(mode: SubIndex) -> Self {
        Self::new(chrono::Utc::now().timestamp(), mode)
    }

    /// The mode as a slot; out-of-range values count as `Driving`
    pub fn sub_index(&self) -> SubIndex {
        SubIndex::from_index(usize::from(self.mode)).unwrap_or_default()
    }
}

/// Mode carried by an optional record, defaulting to `Driving`
pub fn mode_of(record: Option<&SessionRecord>) -> SubIndex {
    record.map(SessionRecord::sub_index).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_accepts_lowercase_alphanumerics() {
        assert!(SessionId::parse("abcdefghij").is_ok());
        assert!(SessionId::parse("0123456789").is_ok());
        assert!(SessionId::parse("a1b2c3d4e5").is_ok());
    }

    #[test]
    fn session_id_rejects_everything_else() {
        for raw in ["short", "abcdefghijk", "ABCDEFGHIJ", "abcde-ghij", "abcdefghi\u{e9}", ""] {
            assert!(SessionId::parse(raw).is_err(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn on_must_be_zero_or_one() {
        let ok = ModeRequest::from_query(Some("abcdefghij"), Some("1")).unwrap();
        assert_eq!(ok.mode, SubIndex::Driven);
        let ok = ModeRequest::from_query(Some("abcdefghij"), Some("0")).unwrap();
        assert_eq!(ok.mode, SubIndex::Driving);

        for on in ["2", "-1", "", "one", "1abc", "0.5"] {
            assert!(
                ModeRequest::from_query(Some("abcdefghij"), Some(on)).is_err(),
                "on={on:?} should be rejected"
            );
        }
        assert!(ModeRequest::from_query(Some("abcdefghij"), None).is_err());
    }

    #[test]
    fn missing_session_is_rejected() {
        assert!(ModeRequest::from_query(None, Some("1")).is_err());
        assert!(ModeRequest::from_query(Some("short"), Some("1")).is_err());
    }

    #[test]
    fn record_serializes_with_plain_fields() {
        let record = SessionRecord::new(1_700_000_000, SubIndex::Driven);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"timestamp":1700000000,"mode":1}"#);
    }

    #[test]
    fn missing_mode_defaults_to_driving() {
        let record: SessionRecord = serde_json::from_str(r#"{"timestamp":5}"#).unwrap();
        assert_eq!(record.sub_index(), SubIndex::Driving);
        assert_eq!(mode_of(None), SubIndex::Driving);
        assert_eq!(
            mode_of(Some(&SessionRecord::new(0, SubIndex::Driven))),
            SubIndex::Driven
        );
    }

    #[test]
    fn session_id_deserialization_validates() {
        assert!(serde_json::from_str::<SessionId>(r#""abcdefghij""#).is_ok());
        assert!(serde_json::from_str::<SessionId>(r#""nope""#).is_err());
    }
}

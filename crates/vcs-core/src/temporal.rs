//! # Temporal Types
//!
//! UTC-only timestamp for proof `created` values. Serialized form is ISO 8601
//! with a `Z` suffix at second precision (`2026-01-15T12:00:00Z`), which is
//! the form that ends up inside signed statements.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// A UTC timestamp truncated to whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp representing the current UTC time.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, dropping sub-seconds.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        let secs = dt.timestamp();
        Self(DateTime::from_timestamp(secs, 0).unwrap_or(dt))
    }

    /// Parse an RFC 3339 string in any offset and normalize to UTC.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| Self::from_datetime(dt.with_timezone(&Utc)))
            .map_err(|e| ValidationError::InvalidTimestamp {
                value: value.to_string(),
                reason: e.to_string(),
            })
    }

    /// Access the underlying `chrono::DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// ISO 8601 with `Z` suffix, seconds precision.
    pub fn to_canonical_string(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_datetime(dt)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_canonical_string())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_string_has_z_suffix() {
        let ts = Timestamp::parse("2026-01-15T12:00:00+00:00").unwrap();
        assert_eq!(ts.to_canonical_string(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn offsets_normalize_to_utc() {
        let ts = Timestamp::parse("2026-01-15T21:00:00+09:00").unwrap();
        assert_eq!(ts.to_string(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn subseconds_are_truncated() {
        let ts = Timestamp::parse("2026-01-15T12:00:00.987Z").unwrap();
        assert_eq!(ts.to_string(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn rejects_garbage() {
        assert!(Timestamp::parse("last tuesday").is_err());
    }

    #[test]
    fn serde_uses_canonical_string() {
        let ts = Timestamp::parse("2026-03-01T10:30:00Z").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, r#""2026-03-01T10:30:00Z""#);
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }

    #[test]
    fn now_has_no_subseconds() {
        let ts = Timestamp::now();
        assert_eq!(ts.as_datetime().timestamp_subsec_nanos(), 0);
    }
}

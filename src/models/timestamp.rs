use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::LifecycleError;

/// Wire format for event timestamps: UTC, second precision, literal `Z`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// UTC instant truncated to whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Wrap a chrono instant, dropping sub-second precision.
    pub fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime.trunc_subsecs(0))
    }

    /// Parse the strict `YYYY-MM-DDTHH:MM:SSZ` form. Offsets and fractional
    /// seconds are rejected.
    pub fn parse(value: &str) -> Result<Self, LifecycleError> {
        NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
            .map(|naive| Self(naive.and_utc()))
            .map_err(|_| LifecycleError::InvalidTimestamp {
                value: value.to_string(),
            })
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

impl FromStr for Timestamp {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Timestamp {
    type Error = LifecycleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Timestamp> for String {
    fn from(ts: Timestamp) -> Self {
        ts.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_and_display() {
        let ts = Timestamp::parse("2025-01-15T10:30:00Z").unwrap();
        assert_eq!(ts.to_string(), "2025-01-15T10:30:00Z");
    }

    #[test]
    fn test_rejects_offsets_and_fractions() {
        for bad in [
            "2025-01-15T10:30:00+00:00",
            "2025-01-15T10:30:00.123Z",
            "2025-01-15 10:30:00Z",
            "2025-01-15T10:30:00",
            "2025-13-01T00:00:00Z",
            "yesterday",
        ] {
            assert!(Timestamp::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_from_datetime_truncates() {
        let dt = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 5).unwrap()
            + chrono::Duration::milliseconds(900);
        let ts = Timestamp::from_datetime(dt);
        assert_eq!(ts.to_string(), "2025-03-01T08:00:05Z");
        assert_eq!(ts, Timestamp::parse("2025-03-01T08:00:05Z").unwrap());
    }
}

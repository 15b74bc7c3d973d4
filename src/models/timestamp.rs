use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ContractError;

/// `createdAt` / `updatedAt` value. Travels as an RFC 3339 string; ISO 8601
/// strings without an offset are read as UTC and written back with `Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current time at millisecond precision, matching what browsers send.
    pub fn now() -> Self {
        Self(Utc::now().trunc_subsecs(3))
    }

    pub fn parse(value: &str) -> Result<Self, ContractError> {
        match DateTime::parse_from_rfc3339(value) {
            Ok(dt) => Ok(Self(dt.with_timezone(&Utc))),
            Err(source) => NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .map(|naive| Self(naive.and_utc()))
                .map_err(|_| ContractError::InvalidTimestamp {
                    value: value.to_string(),
                    source,
                }),
        }
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

impl FromStr for Timestamp {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timestamp::parse(s)
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Timestamp::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_seconds_keep_their_form() {
        let ts = Timestamp::parse("2024-01-01T00:00:00Z").unwrap();
        assert_eq!(ts.to_string(), "2024-01-01T00:00:00Z");
    }

    #[test]
    fn client_iso_strings_keep_millis() {
        let ts: Timestamp = "2023-06-02T17:45:10.123Z".parse().unwrap();
        assert_eq!(ts.to_string(), "2023-06-02T17:45:10.123Z");
    }

    #[test]
    fn offsets_normalise_to_utc() {
        let ts = Timestamp::parse("2024-01-01T02:00:00+02:00").unwrap();
        assert_eq!(ts.to_string(), "2024-01-01T00:00:00Z");
    }

    #[test]
    fn naive_iso_strings_read_as_utc() {
        let ts = Timestamp::parse("2024-01-01T00:00:00").unwrap();
        assert_eq!(ts.to_string(), "2024-01-01T00:00:00Z");
        let ts = Timestamp::parse("2023-06-02T17:45:10.123").unwrap();
        assert_eq!(ts.to_string(), "2023-06-02T17:45:10.123Z");
    }

    #[test]
    fn now_is_written_with_at_most_millis() {
        let text = Timestamp::now().to_string();
        let fraction = text
            .trim_end_matches('Z')
            .rsplit_once('.')
            .map_or(0, |(_, digits)| digits.len());
        assert!(fraction <= 3, "{text}");
        assert_eq!(Timestamp::parse(&text).unwrap().to_string(), text);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(Timestamp::parse("yesterday").is_err());
        assert!(Timestamp::parse("2024-01-01").is_err());
        assert!(serde_json::from_str::<Timestamp>("\"2024-13-01\"").is_err());
    }
}

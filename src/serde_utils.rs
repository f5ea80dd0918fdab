use std::path::Path;

use eyre::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// ISO 8601 dates as UNIX timestamps.
///
/// Accepts RFC 3339 (`2024-06-01T12:00:00Z`), a zone-less date time taken as
/// UTC (`2024-06-01T12:00:00`) and a bare date at midnight UTC
/// (`2024-06-01`).
pub mod iso_timestamp {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};
    use serde::{Deserialize, Deserializer};

    use crate::types::UnixTimestamp;

    pub fn parse(s: &str) -> eyre::Result<UnixTimestamp> {
        let s = s.trim();

        let seconds = if let Ok(date_time) = DateTime::parse_from_rfc3339(s) {
            date_time.timestamp()
        } else if let Ok(date_time) =
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        {
            date_time.and_utc().timestamp()
        } else if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            date.and_hms_opt(0, 0, 0)
                .map(|midnight| midnight.and_utc().timestamp())
                .ok_or_else(|| eyre::eyre!("invalid date {s:?}"))?
        } else {
            eyre::bail!("invalid ISO 8601 timestamp {s:?}");
        };

        let seconds = u64::try_from(seconds)
            .map_err(|_| eyre::eyre!("timestamp {s:?} is before 1970"))?;

        Ok(UnixTimestamp(seconds))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<UnixTimestamp, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A number given either as a JSON string or a JSON integer, kept as its
/// decimal string.
pub mod string_or_integer {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        String(String),
        Integer(u64),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Raw::deserialize(deserializer)? {
            Raw::String(s) => s.trim().to_string(),
            Raw::Integer(n) => n.to_string(),
        })
    }
}

pub async fn read_deserialize<T>(path: impl AsRef<Path>) -> eyre::Result<T>
where
    T: DeserializeOwned,
{
    let path = path.as_ref();

    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Reading from {}", path.display()))?;

    let value = serde_yaml::from_str(&content).with_context(|| {
        format!("Parsing {} content was {content}", path.display())
    })?;

    Ok(value)
}

pub async fn write_serialize<T>(
    path: impl AsRef<Path>,
    value: T,
) -> eyre::Result<()>
where
    T: Serialize,
{
    let path = path.as_ref();

    let content = serde_yaml::to_string(&value)
        .with_context(|| format!("Serializing {}", path.display()))?;

    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Writing to {}", path.display()))?;

    Ok(())
}

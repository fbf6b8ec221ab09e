//! Date parsing shared by fragment fields and the CLI.

use chrono::NaiveDate;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

/// Parse a `YYYY-MM-DD` date. Anything after the first ten characters
/// (a time or offset) is ignored.
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();
    let day = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{}': {}", raw, e))
}

/// Accept either a quoted string or a TOML date literal.
pub(crate) fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<toml::Value>::deserialize(deserializer)? {
        None => Ok(None),
        Some(toml::Value::String(s)) => parse_date(&s).map(Some).map_err(D::Error::custom),
        Some(toml::Value::Datetime(dt)) => {
            let date = dt
                .date
                .ok_or_else(|| D::Error::custom(format!("datetime '{}' has no date part", dt)))?;
            NaiveDate::from_ymd_opt(date.year.into(), date.month.into(), date.day.into())
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid date '{}'", dt)))
        }
        Some(other) => Err(D::Error::custom(format!(
            "expected a date, found {}",
            other.type_str()
        ))),
    }
}

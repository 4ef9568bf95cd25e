//! Serde helpers for date fields.

/// Persists an optional date as an ISO-8601 midnight UTC timestamp.
///
/// Reading accepts any RFC 3339 timestamp (taking its UTC date) or a plain
/// `YYYY-MM-DD` date.
pub(crate) mod timestamp_date {
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT00:00:00.000Z";

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => serializer.serialize_str(&date.format(TIMESTAMP_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        parse(&raw).map(Some).map_err(de::Error::custom)
    }

    pub(crate) fn parse(raw: &str) -> Result<NaiveDate, String> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Ok(ts.with_timezone(&Utc).date_naive());
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|e| format!("invalid date '{raw}': {e}"))
    }
}

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

/// Render a timestamp the way it is stored and sent over the wire:
/// RFC 3339 with microsecond precision and a `Z` suffix.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a timestamp produced by [`format_timestamp`] (any RFC 3339 offset is accepted).
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

// Custom serde module so an unset created_at goes out as an explicit null
pub(crate) mod timestamp_format {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => serializer.serialize_str(&super::format_timestamp(date)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Option::<String>::deserialize(deserializer)?;
        s.map(|s| super::parse_timestamp(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

/// A stored row of one of the five Snapfeed entities.
///
/// The `Serialize` impl of every entity is its transport contract: field names
/// are fixed and credential fields are skipped.
pub trait Entity: Serialize {
    /// Human-readable entity name used in errors and logs.
    const NAME: &'static str;
    /// Backing table.
    const TABLE: &'static str;

    fn id(&self) -> i64;

    fn created_at(&self) -> Option<DateTime<Utc>>;

    /// Field-name to value projection safe to hand to an outer API layer.
    fn to_transport(&self) -> Map<String, Value> {
        // Entities are plain structs of strings, integers and options, so
        // the derived impl always yields an object.
        let value = serde_json::to_value(self);
        debug_assert!(
            matches!(value, Ok(Value::Object(_))),
            "{} did not serialize to a JSON object",
            Self::NAME
        );
        value
            .ok()
            .and_then(|value| match value {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .unwrap_or_default()
    }
}

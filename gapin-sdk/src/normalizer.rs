//! Event normalization applied before signing and sending.
//!
//! * timestamps are rendered as RFC 3339 UTC with millisecond precision
//! * `sent_at` and SDK metadata flags are injected
//! * values under PII keys are redacted at any depth

use serde_json::{Map, Value};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

/// Keys whose values never leave the SDK (matched case-insensitively).
pub const PII_KEYS: &[&str] = &[
    "email",
    "phone",
    "mobile",
    "token",
    "password",
    "api_key",
    "secret",
    "ssn",
    "address",
    "auth",
    "credentials",
];

/// Replacement value for redacted fields.
pub const REDACTED: &str = "***redacted***";

/// Version stamped into `metadata.sdk_version`.
pub const SDK_NORMALIZER_VERSION: &str = "1.0";

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Format a UTC instant as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn format_timestamp(at: OffsetDateTime) -> String {
    let format = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
    );
    // Every field above is always present on an OffsetDateTime.
    at.to_offset(time::UtcOffset::UTC)
        .format(&format)
        .unwrap_or_default()
}

/// Parse the accepted timestamp shapes: RFC 3339 text, a bare
/// `YYYY-MM-DD` date (midnight UTC), or milliseconds since the epoch.
/// Falsy values (`null`, `false`, `0`, `""`) yield `None`; `true` counts
/// as one millisecond past the epoch.
pub fn parse_timestamp(value: &Value) -> Result<Option<OffsetDateTime>, NormalizeError> {
    let invalid = || NormalizeError::InvalidTimestamp(value.to_string());
    match value {
        Value::Null | Value::Bool(false) => Ok(None),
        Value::Bool(true) => from_unix_millis(1).map(Some).ok_or_else(invalid),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => {
            if let Ok(at) = OffsetDateTime::parse(s, &Rfc3339) {
                return Ok(Some(at));
            }
            let date = Date::parse(s, format_description!("[year]-[month]-[day]"))
                .map_err(|_| invalid())?;
            Ok(Some(date.midnight().assume_utc()))
        }
        Value::Number(n) => {
            let millis = n.as_f64().ok_or_else(invalid)?.trunc();
            if millis == 0.0 {
                return Ok(None);
            }
            if !millis.is_finite() {
                return Err(invalid());
            }
            // `as` saturates; anything that large is rejected below.
            from_unix_millis(millis as i128)
                .map(Some)
                .ok_or_else(invalid)
        }
        _ => Err(invalid()),
    }
}

fn from_unix_millis(millis: i128) -> Option<OffsetDateTime> {
    let nanos = millis.checked_mul(1_000_000)?;
    OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()
}

/// Normalize an event message, returning a scrubbed copy.
pub fn normalize_event(message: &Map<String, Value>) -> Result<Map<String, Value>, NormalizeError> {
    normalize_event_at(message, OffsetDateTime::now_utc())
}

/// [`normalize_event`] with an explicit notion of "now".
pub fn normalize_event_at(
    message: &Map<String, Value>,
    now: OffsetDateTime,
) -> Result<Map<String, Value>, NormalizeError> {
    let mut event = message.clone();

    let timestamp = match event.get("timestamp") {
        Some(value) => parse_timestamp(value)?.unwrap_or(now),
        None => now,
    };
    event.insert("timestamp".into(), Value::String(format_timestamp(timestamp)));
    event.insert("sent_at".into(), Value::String(format_timestamp(now)));

    let metadata = event
        .entry("metadata")
        .or_insert_with(|| Value::Object(Map::new()));
    if !metadata.is_object() {
        *metadata = Value::Object(Map::new());
    }
    if let Value::Object(metadata) = metadata {
        metadata.insert("sdk_normalized".into(), Value::Bool(true));
        metadata.insert(
            "sdk_version".into(),
            Value::String(SDK_NORMALIZER_VERSION.into()),
        );
    }

    Ok(scrub_object(event))
}

/// Whether `key` names a PII field.
pub fn is_pii_key(key: &str) -> bool {
    let key = key.to_lowercase();
    PII_KEYS.contains(&key.as_str())
}

fn scrub_object(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .map(|(key, value)| {
            let value = if is_pii_key(&key) {
                Value::String(REDACTED.into())
            } else {
                scrub(value)
            };
            (key, value)
        })
        .collect()
}

fn scrub(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(scrub_object(map)),
        Value::Array(items) => Value::Array(items.into_iter().map(scrub).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_format_timestamp_millis() {
        assert_eq!(
            format_timestamp(datetime!(2024-03-05 07:08:09.123456 UTC)),
            "2024-03-05T07:08:09.123Z"
        );
        assert_eq!(
            format_timestamp(datetime!(2024-03-05 09:00:00 +02:00)),
            "2024-03-05T07:00:00.000Z"
        );
    }

    #[test]
    fn test_parse_timestamp_shapes() {
        let expected = datetime!(2024-01-01 00:00:00 UTC);
        assert_eq!(
            parse_timestamp(&json!("2024-01-01T00:00:00Z")).unwrap(),
            Some(expected)
        );
        assert_eq!(parse_timestamp(&json!("2024-01-01")).unwrap(), Some(expected));
        assert_eq!(
            parse_timestamp(&json!(1_704_067_200_000_i64)).unwrap(),
            Some(expected)
        );
        assert_eq!(parse_timestamp(&json!(null)).unwrap(), None);
        assert_eq!(parse_timestamp(&json!("")).unwrap(), None);
        assert_eq!(parse_timestamp(&json!(0)).unwrap(), None);
        assert!(parse_timestamp(&json!("yesterday")).is_err());
        assert!(parse_timestamp(&json!({ "at": 1 })).is_err());
    }

    #[test]
    fn test_parse_timestamp_true_is_first_millisecond() {
        assert_eq!(
            parse_timestamp(&json!(true)).unwrap(),
            Some(datetime!(1970-01-01 00:00:00.001 UTC))
        );
    }

    #[test]
    fn test_out_of_range_millis_rejected() {
        for value in [json!(1e33), json!(-1e33), json!(1e300), json!(9.0e15)] {
            assert!(matches!(
                parse_timestamp(&value),
                Err(NormalizeError::InvalidTimestamp(_))
            ));
        }
        let message = object(json!({ "timestamp": 1e33 }));
        assert!(matches!(
            normalize_event(&message),
            Err(NormalizeError::InvalidTimestamp(_))
        ));
        let message = object(json!({ "timestamp": -1e33 }));
        assert!(matches!(
            normalize_event(&message),
            Err(NormalizeError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_normalize_sets_timestamps_and_metadata() {
        let now = datetime!(2024-06-01 12:00:00 UTC);
        let event = normalize_event_at(&object(json!({ "key": "value" })), now).unwrap();

        assert_eq!(event["key"], "value");
        assert_eq!(event["timestamp"], "2024-06-01T12:00:00.000Z");
        assert_eq!(event["sent_at"], "2024-06-01T12:00:00.000Z");
        assert_eq!(event["metadata"]["sdk_normalized"], true);
        assert_eq!(event["metadata"]["sdk_version"], "1.0");
    }

    #[test]
    fn test_normalize_keeps_caller_timestamp_and_metadata() {
        let now = datetime!(2024-06-01 12:00:00 UTC);
        let message = object(json!({
            "timestamp": "2024-05-31T10:00:00+02:00",
            "metadata": { "session_id": "s-1" }
        }));
        let event = normalize_event_at(&message, now).unwrap();

        assert_eq!(event["timestamp"], "2024-05-31T08:00:00.000Z");
        assert_eq!(event["metadata"]["session_id"], "s-1");
        assert_eq!(event["metadata"]["sdk_normalized"], true);
    }

    #[test]
    fn test_normalize_replaces_non_object_metadata() {
        let now = datetime!(2024-06-01 12:00:00 UTC);
        let event = normalize_event_at(&object(json!({ "metadata": "x" })), now).unwrap();
        assert_eq!(
            event["metadata"],
            json!({ "sdk_normalized": true, "sdk_version": "1.0" })
        );
    }

    #[test]
    fn test_normalize_redacts_pii_at_any_depth() {
        let now = datetime!(2024-06-01 12:00:00 UTC);
        let message = object(json!({
            "Email": "a@b.c",
            "user": {
                "name": "ann",
                "credentials": { "password": "hunter2" },
                "contacts": [{ "phone": "555" }, { "note": "ok" }]
            }
        }));
        let event = normalize_event_at(&message, now).unwrap();

        assert_eq!(event["Email"], REDACTED);
        assert_eq!(event["user"]["name"], "ann");
        assert_eq!(event["user"]["credentials"], REDACTED);
        assert_eq!(event["user"]["contacts"][0]["phone"], REDACTED);
        assert_eq!(event["user"]["contacts"][1]["note"], "ok");
    }

    #[test]
    fn test_normalize_rejects_bad_timestamp() {
        let message = object(json!({ "timestamp": "not a date" }));
        assert!(matches!(
            normalize_event(&message),
            Err(NormalizeError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_normalize_leaves_input_untouched() {
        let message = object(json!({ "token": "t" }));
        let _ = normalize_event(&message).unwrap();
        assert_eq!(message["token"], "t");
    }
}

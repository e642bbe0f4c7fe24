//! Event publishing bodies.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

use crate::normalizer::format_timestamp;
use crate::signature::{canonical_json, sign_payload};
use crate::utils::generate_id;

/// Schema version carried by every signed envelope.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Body of a plain `POST /events/publish`: `{"topic": .., "message": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishRequest<'a> {
    pub topic: &'a str,
    pub message: &'a Map<String, Value>,
}

/// Body of a signed `POST /events/publish`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub topic: String,
    pub message: Map<String, Value>,
    pub event_id: String,
    pub timestamp: String,
    pub schema_version: String,
}

impl EventEnvelope {
    /// Wrap an already normalized message with a fresh id and the current time.
    pub fn new(topic: impl Into<String>, message: Map<String, Value>) -> Self {
        Self::new_at(topic, message, OffsetDateTime::now_utc())
    }

    pub fn new_at(
        topic: impl Into<String>,
        message: Map<String, Value>,
        at: OffsetDateTime,
    ) -> Self {
        Self {
            topic: topic.into(),
            message,
            event_id: generate_id(),
            timestamp: format_timestamp(at),
            schema_version: SCHEMA_VERSION.to_owned(),
        }
    }

    /// The envelope as a JSON value.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("topic".into(), Value::String(self.topic.clone()));
        map.insert("message".into(), Value::Object(self.message.clone()));
        map.insert("event_id".into(), Value::String(self.event_id.clone()));
        map.insert("timestamp".into(), Value::String(self.timestamp.clone()));
        map.insert(
            "schema_version".into(),
            Value::String(self.schema_version.clone()),
        );
        Value::Object(map)
    }

    /// Canonical JSON body and its hex HMAC-SHA256 signature.
    pub fn sign(&self, secret: &[u8]) -> (String, String) {
        let value = self.to_value();
        (canonical_json(&value), sign_payload(&value, secret))
    }
}

/// Gateway reply to a signed publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventResponse {
    pub success: bool,
    #[serde(rename = "eventId", default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

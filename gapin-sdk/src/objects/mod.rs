//! Request and response bodies exchanged with the gateway.

pub mod event;

pub use event::{EventEnvelope, EventResponse, PublishRequest, SCHEMA_VERSION};

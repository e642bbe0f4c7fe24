//! GAPIN SDK: publish and read events through the GAPIN gateway.
//!
//! The crate is split the same way the gateway's API is used:
//!
//! * [`generate_id`] / [`hash_data`] are standalone helpers with no relation
//!   to any client.
//! * [`Client`] wraps the gateway's REST endpoints and hands back decoded
//!   JSON untouched. [`BlockingClient`] offers the same calls without an
//!   async runtime (`blocking` feature).
//! * [`signature`] and [`normalizer`] implement the signed publish path used
//!   by [`Client::publish_signed_event`].
//!
//! # Example
//!
//! ```no_run
//! use gapin_sdk::{Client, generate_id, hash_data};
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), gapin_sdk::ClientError> {
//! let client = Client::default();
//! println!("{}", client.health_check().await?);
//! println!("{}", generate_id());
//! println!("{:?}", hash_data("test"));
//!
//! let message = json!({ "key": "value" }).as_object().cloned().unwrap_or_default();
//! println!("{}", client.publish_event("test-topic", message).await?);
//! println!("{}", client.read_events().await?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod normalizer;
pub mod objects;
pub mod signature;
mod utils;

#[cfg(feature = "client")]
pub mod client;

pub use config::ClientConfig;
pub use utils::{DIGEST_LEN, generate_id, hash_data};

#[cfg(feature = "client")]
pub use client::{Client, ClientError, make_request};

#[cfg(feature = "blocking")]
pub use client::blocking::{self, BlockingClient};

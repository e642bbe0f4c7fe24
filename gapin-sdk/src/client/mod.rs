//! HTTP clients for the GAPIN gateway.
//!
//! Gated behind the `client` cargo feature so downstream crates that only
//! need the shared types and helpers do not pull in `reqwest`. The blocking
//! variants additionally need the `blocking` feature.

mod gateway;

#[cfg(feature = "blocking")]
pub mod blocking;

pub use gateway::Client;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::normalizer::NormalizeError;

/// Errors produced by the SDK HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, TLS, connection reset, …).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// A non-2xx response whose body is not JSON.
    #[error("api error: status {status}, body: {body}")]
    Api { status: StatusCode, body: String },

    /// A 2xx response whose body could not be deserialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The base URL could not be combined with the endpoint path.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("missing API key: configure one before calling this endpoint")]
    MissingApiKey,

    #[error("missing signing secret: configure one before publishing signed events")]
    MissingSigningSecret,

    /// The event message could not be normalized for signing.
    #[error("normalize error: {0}")]
    Normalize(#[from] NormalizeError),
}

/// `GET {url}` and decode the JSON body.
///
/// The URL is used as given; the response is decoded whatever its status.
pub async fn make_request(url: &str) -> Result<Value, ClientError> {
    let url = url::Url::parse(url)?;
    tracing::debug!(%url, "GET");
    let resp = reqwest::get(url).await?;
    decode_response(resp).await
}

pub(crate) async fn decode_response<T: DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let status = resp.status();
    log_status(status, resp.url());
    let bytes = resp.bytes().await?;
    decode_body(status, &bytes)
}

pub(crate) fn log_status(status: StatusCode, url: &url::Url) {
    if status.is_success() {
        tracing::debug!(%status, %url, "gateway response");
    } else {
        tracing::warn!(%status, %url, "gateway returned non-success status");
    }
}

/// Decode a response body as JSON regardless of status. The status only
/// decides how an undecodable body is reported.
pub(crate) fn decode_body<T: DeserializeOwned>(
    status: StatusCode,
    bytes: &[u8],
) -> Result<T, ClientError> {
    match serde_json::from_slice(bytes) {
        Ok(value) => Ok(value),
        Err(_) if !status.is_success() => Err(ClientError::Api {
            status,
            body: String::from_utf8_lossy(bytes).into_owned(),
        }),
        Err(e) => Err(ClientError::Json(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_body_ignores_status_for_json() {
        let value: Value =
            decode_body(StatusCode::BAD_REQUEST, br#"{"error":"bad topic"}"#).unwrap();
        assert_eq!(value, json!({ "error": "bad topic" }));
    }

    #[test]
    fn test_decode_body_error_mapping() {
        let err = decode_body::<Value>(StatusCode::BAD_GATEWAY, b"upstream down").unwrap_err();
        assert!(matches!(
            err,
            ClientError::Api { status, ref body }
                if status == StatusCode::BAD_GATEWAY && body == "upstream down"
        ));

        let err = decode_body::<Value>(StatusCode::OK, b"<html>").unwrap_err();
        assert!(matches!(err, ClientError::Json(_)));
    }
}

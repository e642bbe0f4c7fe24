//! Async gateway client.

use reqwest::RequestBuilder;
use serde_json::{Map, Value};

use super::{ClientError, decode_response};
use crate::config::ClientConfig;
use crate::normalizer::normalize_event;
use crate::objects::{EventEnvelope, EventResponse, PublishRequest};
use crate::signature::{API_KEY_HEADER, SIGNATURE_HEADER};

/// Typed HTTP client for the GAPIN gateway.
///
/// Every call performs exactly one request and returns the decoded JSON body
/// as the gateway sent it. Nothing is retried; timeouts are whatever the
/// underlying `reqwest::Client` is configured with.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    config: ClientConfig,
}

impl Default for Client {
    /// A client for `http://localhost:3000` without credentials.
    fn default() -> Self {
        Self::from_config(ClientConfig::default())
    }
}

impl Client {
    /// Create a new `Client` for the gateway at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::from_config(ClientConfig::new(base_url))
    }

    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Send `x-api-key` on event endpoints.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api_key = Some(api_key.into());
        self
    }

    /// Secret used by [`publish_signed_event`](Self::publish_signed_event).
    pub fn with_signing_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.signing_secret = Some(secret.into());
        self
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }

    /// `GET /health` – check the health of the gateway.
    pub async fn health_check(&self) -> Result<Value, ClientError> {
        let url = self.config.endpoint("/health")?;
        tracing::debug!(%url, "GET");

        let resp = self.http.get(url).send().await?;

        decode_response(resp).await
    }

    /// `POST /events/publish` – publish `message` to `topic`.
    ///
    /// The body is exactly `{"topic": topic, "message": message}`.
    pub async fn publish_event(
        &self,
        topic: &str,
        message: Map<String, Value>,
    ) -> Result<Value, ClientError> {
        let url = self.config.endpoint("/events/publish")?;
        tracing::debug!(%url, topic, "POST");

        let body = PublishRequest {
            topic,
            message: &message,
        };
        let resp = self
            .authorize(self.http.post(url))
            .json(&body)
            .send()
            .await?;

        decode_response(resp).await
    }

    /// `GET /events/read` – read recent events.
    pub async fn read_events(&self) -> Result<Value, ClientError> {
        let url = self.config.endpoint("/events/read")?;
        tracing::debug!(%url, "GET");

        let resp = self.authorize(self.http.get(url)).send().await?;

        decode_response(resp).await
    }

    /// `POST /events/publish` – normalize, envelope and sign `message`, then
    /// publish it.
    ///
    /// Requires both an API key and a signing secret; fails before any
    /// network I/O when either is missing.
    pub async fn publish_signed_event(
        &self,
        topic: &str,
        message: &Map<String, Value>,
    ) -> Result<EventResponse, ClientError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ClientError::MissingApiKey)?;
        let secret = self
            .config
            .signing_secret
            .as_deref()
            .ok_or(ClientError::MissingSigningSecret)?;

        let envelope = EventEnvelope::new(topic, normalize_event(message)?);
        let (body, signature) = envelope.sign(secret.as_bytes());

        let url = self.config.endpoint("/events/publish")?;
        tracing::debug!(%url, topic, event_id = %envelope.event_id, "POST signed");

        let resp = self
            .http
            .post(url)
            .header(API_KEY_HEADER, api_key)
            .header(SIGNATURE_HEADER, signature)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        decode_response(resp).await
    }
}

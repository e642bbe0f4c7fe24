//! Blocking gateway client for callers without an async runtime.
//!
//! Mirrors [`Client`](super::Client) call for call. Do not use it from
//! inside a tokio runtime; `reqwest::blocking` panics there.

use reqwest::blocking::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::{ClientError, decode_body, log_status};
use crate::config::ClientConfig;
use crate::normalizer::normalize_event;
use crate::objects::{EventEnvelope, EventResponse, PublishRequest};
use crate::signature::{API_KEY_HEADER, SIGNATURE_HEADER};

/// Blocking `GET {url}` and decode the JSON body.
pub fn make_request(url: &str) -> Result<Value, ClientError> {
    let url = url::Url::parse(url)?;
    tracing::debug!(%url, "GET");
    let resp = reqwest::blocking::get(url)?;
    decode_response(resp)
}

fn decode_response<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let status = resp.status();
    log_status(status, resp.url());
    let bytes = resp.bytes()?;
    decode_body(status, &bytes)
}

/// Blocking HTTP client for the GAPIN gateway.
#[derive(Debug, Clone)]
pub struct BlockingClient {
    http: reqwest::blocking::Client,
    config: ClientConfig,
}

impl Default for BlockingClient {
    fn default() -> Self {
        Self::from_config(ClientConfig::default())
    }
}

impl BlockingClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::from_config(ClientConfig::new(base_url))
    }

    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            config,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api_key = Some(api_key.into());
        self
    }

    pub fn with_signing_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.signing_secret = Some(secret.into());
        self
    }

    pub fn with_http_client(mut self, client: reqwest::blocking::Client) -> Self {
        self.http = client;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }

    /// `GET /health`
    pub fn health_check(&self) -> Result<Value, ClientError> {
        let url = self.config.endpoint("/health")?;
        tracing::debug!(%url, "GET");
        decode_response(self.http.get(url).send()?)
    }

    /// `POST /events/publish` with body `{"topic": topic, "message": message}`.
    pub fn publish_event(
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
        decode_response(self.authorize(self.http.post(url)).json(&body).send()?)
    }

    /// `GET /events/read`
    pub fn read_events(&self) -> Result<Value, ClientError> {
        let url = self.config.endpoint("/events/read")?;
        tracing::debug!(%url, "GET");
        decode_response(self.authorize(self.http.get(url)).send()?)
    }

    /// Blocking counterpart of
    /// [`Client::publish_signed_event`](super::Client::publish_signed_event).
    pub fn publish_signed_event(
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
            .send()?;

        decode_response(resp)
    }
}

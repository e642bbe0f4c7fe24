//! Client configuration.
//!
//! The SDK never reads the environment or the filesystem itself; callers
//! (such as `gapin-cli`) build a [`ClientConfig`] however they like, for
//! instance by deserializing it from a TOML file.

use serde::{Deserialize, Serialize};

/// Gateway address used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

/// Connection settings for a gateway client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Root URL of the gateway.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Sent as `x-api-key` on event endpoints when present.
    #[serde(default)]
    pub api_key: Option<String>,
    /// HMAC secret for signed publishing.
    #[serde(default)]
    pub signing_secret: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            signing_secret: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Absolute URL for `path` (which must start with `/`) under the base URL.
    pub fn endpoint(&self, path: &str) -> Result<url::Url, url::ParseError> {
        url::Url::parse(&format!("{}{path}", self.base_url.trim_end_matches('/')))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert!(config.api_key.is_none());
        assert!(config.signing_secret.is_none());
    }

    #[test]
    fn test_partial_deserialization() {
        let config: ClientConfig = serde_json::from_str(r#"{"api_key":"k"}"#).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn test_endpoint_keeps_path_prefix() {
        let config = ClientConfig::new("https://gw.example.com/gapin/");
        assert_eq!(
            config.endpoint("/events/read").unwrap().as_str(),
            "https://gw.example.com/gapin/events/read"
        );
        assert_eq!(
            ClientConfig::default().endpoint("/health").unwrap().as_str(),
            "http://localhost:3000/health"
        );
    }

    #[test]
    fn test_endpoint_rejects_garbage_base() {
        assert!(ClientConfig::new("not a url").endpoint("/health").is_err());
    }
}

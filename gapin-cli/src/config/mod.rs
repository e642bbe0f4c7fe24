//! Configuration module for the gapin CLI.
//!
//! Handles loading configuration from an optional TOML file and layering
//! CLI arguments and environment variables on top of it.

pub mod file;

use crate::config::file::FileConfig;
use gapin_sdk::ClientConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Values given on the command line (or through their environment
/// variables). Each one that is set wins over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub signing_secret: Option<String>,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    overrides: Overrides,
}

impl ConfigLoader {
    pub fn new(config_path: Option<impl AsRef<Path>>, overrides: Overrides) -> Self {
        Self {
            config_path: config_path.map(|p| p.as_ref().to_path_buf()),
            overrides,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file, if one was given
    /// 2. Apply CLI overrides
    /// 3. Validate the configuration
    pub fn load(&self) -> Result<ClientConfig, ConfigError> {
        let file_config = match &self.config_path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                tracing::debug!(?path, "Read configuration file");
                toml::from_str(&content)?
            }
            None => FileConfig::default(),
        };

        let mut config = file_config.gateway;
        let overrides = self.overrides.clone();
        if let Some(base_url) = overrides.base_url {
            config.base_url = base_url;
        }
        if overrides.api_key.is_some() {
            config.api_key = overrides.api_key;
        }
        if overrides.signing_secret.is_some() {
            config.signing_secret = overrides.signing_secret;
        }

        self.validate(&config)?;
        Ok(config)
    }

    fn validate(&self, config: &ClientConfig) -> Result<(), ConfigError> {
        config.endpoint("/health").map_err(|e| {
            ConfigError::ValidationError(format!("invalid base_url {:?}: {e}", config.base_url))
        })?;
        if config.api_key.as_deref() == Some("") {
            return Err(ConfigError::ValidationError("api_key is empty".into()));
        }
        if config.signing_secret.as_deref() == Some("") {
            return Err(ConfigError::ValidationError(
                "signing_secret is empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_without_file() {
        let config = ConfigLoader::new(None::<&Path>, Overrides::default())
            .load()
            .unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_overrides_win_over_file() {
        let file = write_config(
            r#"
[gateway]
base_url = "https://file.example.com"
api_key = "file-key"
signing_secret = "file-secret"
"#,
        );
        let overrides = Overrides {
            base_url: Some("https://cli.example.com".into()),
            api_key: Some("cli-key".into()),
            signing_secret: None,
        };
        let config = ConfigLoader::new(Some(file.path()), overrides)
            .load()
            .unwrap();

        assert_eq!(config.base_url, "https://cli.example.com");
        assert_eq!(config.api_key.as_deref(), Some("cli-key"));
        assert_eq!(config.signing_secret.as_deref(), Some("file-secret"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let loader = ConfigLoader::new(
            Some("/nonexistent/gapin.toml"),
            Overrides::default(),
        );
        assert!(matches!(loader.load(), Err(ConfigError::IoError(_))));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let file = write_config("[gateway\nbase_url = 1");
        let loader = ConfigLoader::new(Some(file.path()), Overrides::default());
        assert!(matches!(loader.load(), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let overrides = Overrides {
            base_url: Some("localhost without scheme".into()),
            ..Overrides::default()
        };
        let loader = ConfigLoader::new(None::<&Path>, overrides);
        assert!(matches!(
            loader.load(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let overrides = Overrides {
            api_key: Some(String::new()),
            ..Overrides::default()
        };
        let loader = ConfigLoader::new(None::<&Path>, overrides);
        assert!(matches!(
            loader.load(),
            Err(ConfigError::ValidationError(_))
        ));
    }
}

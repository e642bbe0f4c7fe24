//! TOML file configuration structures.
//!
//! These structs directly map to the `gapin.toml` file format:
//!
//! ```toml
//! [gateway]
//! base_url = "http://localhost:3000"
//! api_key = "..."
//! signing_secret = "..."
//! ```

use gapin_sdk::ClientConfig;
use serde::{Deserialize, Serialize};

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    /// Gateway connection section; every key is optional.
    #[serde(default)]
    pub gateway: ClientConfig,
}

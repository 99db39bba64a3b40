//! Reader configuration, what gets dispatched to the app and how payloads are shown

use std::path::Path;

use serde::{Deserialize, Serialize};
use tapread_ndef::PayloadRendering;
use tapread_util::result_ext::ResultExt as _;

/// Names a JSON config file for the CLI
pub const CONFIG_ENV_VAR: &str = "TAPREAD_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
#[serde(default)]
pub struct ReaderConfig {
    pub rendering: PayloadRendering,
    pub uri_filters: Vec<UriFilterConfig>,
    pub mime_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
pub struct UriFilterConfig {
    pub scheme: String,

    #[serde(default)]
    pub authority: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, uniffi::Error)]
pub enum ConfigError {
    #[error("unable to read config file {path}: {error}")]
    Read { path: String, error: String },

    #[error("invalid config: {0}")]
    Parse(String),
}

impl Default for ReaderConfig {
    /// Links to google.com over http and plain text tags
    fn default() -> Self {
        Self {
            rendering: PayloadRendering::default(),
            uri_filters: vec![UriFilterConfig {
                scheme: "http".to_string(),
                authority: Some("google.com".to_string()),
                port: None,
            }],
            mime_types: vec!["text/plain".to_string()],
        }
    }
}

impl ReaderConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err_str(ConfigError::Parse)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|error| ConfigError::Read {
            path: path.display().to_string(),
            error: error.to_string(),
        })?;

        Self::from_json(&json)
    }

    pub fn with_rendering(mut self, rendering: PayloadRendering) -> Self {
        self.rendering = rendering;
        self
    }
}

#[uniffi::export]
fn default_reader_config() -> ReaderConfig {
    ReaderConfig::default()
}

#[uniffi::export]
fn reader_config_from_json(json: String) -> Result<ReaderConfig, ConfigError> {
    ReaderConfig::from_json(&json)
}

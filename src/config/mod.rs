//! Service configuration.
//!
//! Configuration is loaded from a YAML file at startup. Every field has a
//! documented default, so an empty file (or no file at all) yields a
//! working configuration. Layout:
//!
//! ```yaml
//! server:
//!   address: "0.0.0.0"
//!   port: 8000
//! fonts:
//!   search_paths:
//!     - "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"
//! watermark:
//!   default_text: "Sample"
//!   spacing:
//!     strategy: margin-factor
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod server;

pub use crate::watermark::config::{FontConfig, SpacingConfig, SpacingStrategy, WatermarkStyle};
pub use server::ServerConfig;

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Font search settings
    #[serde(default)]
    pub fonts: FontConfig,

    /// Watermark style settings
    #[serde(default)]
    pub watermark: WatermarkStyle,
}

impl Config {
    /// Parse and validate a configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, String> {
        let config: Config =
            serde_yaml::from_str(yaml).map_err(|e| format!("Failed to parse config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_yaml(&yaml)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.server.threads == 0 {
            return Err("Server threads must be positive".to_string());
        }

        if self.server.max_body_size == 0 {
            return Err("Server max_body_size must be positive".to_string());
        }

        if self.fonts.search_paths.iter().any(|p| p.trim().is_empty()) {
            return Err("Font search_paths entries cannot be empty".to_string());
        }

        self.watermark.validate()
    }
}

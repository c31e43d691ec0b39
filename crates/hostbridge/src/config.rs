// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bridge configuration.
//!
//! Supports both programmatic and file-based configuration.
//!
//! ```toml
//! class_discriminator = "kind"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Bridge configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Property carrying the serial name of a union variant.
    #[serde(default = "default_class_discriminator")]
    pub class_discriminator: String,
}

fn default_class_discriminator() -> String {
    "type".to_string()
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            class_discriminator: default_class_discriminator(),
        }
    }
}

impl Configuration {
    /// Default configuration (`"type"` discriminator).
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the class discriminator.
    pub fn with_class_discriminator(mut self, name: impl Into<String>) -> Self {
        self.class_discriminator = name.into();
        self
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.class_discriminator.is_empty() {
            return Err(ConfigError::Invalid(
                "class_discriminator must not be empty".into(),
            ));
        }
        Ok(())
    }
}

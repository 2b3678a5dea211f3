use std::io::ErrorKind;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::generator::GeneratorConfig;

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub generator: GeneratorConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match Self::read(path)? {
            Some(content) => Self::from_toml(&content),
            None => Err(ConfigError::FileRead {
                path: path.to_path_buf(),
                source: ErrorKind::NotFound.into(),
            }),
        }
    }

    /// Like [`AppConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::read(path)? {
            Some(content) => Self::from_toml(&content),
            None => {
                warn!("config file '{}' not found, using defaults", path.display());
                Ok(Self::default())
            }
        }
    }

    /// Parses and validates a TOML document; omitted keys keep their defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn read(path: &Path) -> Result<Option<String>, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ConfigError::FileRead {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.generator.validate()
    }
}

//! TOML configuration for the sampler and the default mapping timings.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::controller::sampler::SamplerSettings;

/// Default timer periods for mappings built by the demo profile.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct TranslatorSettings {
    /// Delay between repeats while a button is held, in milliseconds.
    pub key_repeat_delay_ms: u64,

    /// Delay before the first repeat of a held button, in milliseconds.
    pub first_repeat_delay_ms: u64,
}

impl Default for TranslatorSettings {
    fn default() -> Self {
        Self {
            key_repeat_delay_ms: 100,
            first_repeat_delay_ms: 100,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct Config {
    pub sampler: SamplerSettings,
    pub translator: TranslatorSettings,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read or write config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl Config {
    /// Loads the configuration from `path`, falling back to defaults when
    /// the file is missing or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => {
                info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                warn!(
                    "Could not load configuration from {}: {} - using defaults",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        let config = toml::from_str(&raw)?;
        debug!("Parsed configuration: {:?}", config);
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let raw = toml::to_string_pretty(self)?;
        fs::write(path, raw)?;
        info!("Saved configuration to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_toml() {
        let config = Config::default();
        let raw = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&raw).unwrap();

        assert_eq!(
            parsed.sampler.collection_interval_ms,
            config.sampler.collection_interval_ms
        );
        assert_eq!(
            parsed.translator.key_repeat_delay_ms,
            config.translator.key_repeat_delay_ms
        );
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load_or_default(Path::new("/definitely/not/here.toml"));
        assert_eq!(config.translator.key_repeat_delay_ms, 100);
    }
}

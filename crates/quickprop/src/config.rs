//! Engine configuration.
//!
//! Configuration can be built in code or loaded from TOML; missing keys
//! take their defaults.
//!
//! ```toml
//! max_trials = 500
//! max_size = 50
//! algorithm = "mersenne-twister"
//! catch_panics = false
//! ```

use quickprop_random::{Algorithm, Size};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for a property testing campaign
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Trials per campaign
    pub max_trials: usize,
    /// Sizes cycle through `1..=max_size`
    pub max_size: u32,
    /// Random source used for every trial
    pub algorithm: Algorithm,
    /// Report panicking properties as failures instead of unwinding
    pub catch_panics: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_trials: 250,
            max_size: Size::MAX.value(),
            algorithm: Algorithm::Mwc,
            catch_panics: true,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_trials(mut self, max_trials: usize) -> Self {
        self.max_trials = max_trials;
        self
    }

    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_catch_panics(mut self, catch_panics: bool) -> Self {
        self.catch_panics = catch_panics;
        self
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_trials == 0 {
            return Err(ConfigError::Invalid("max_trials must be at least 1".into()));
        }
        if !(Size::MIN.value()..=Size::MAX.value()).contains(&self.max_size) {
            return Err(ConfigError::Invalid(format!(
                "max_size must be between {} and {}, got {}",
                Size::MIN,
                Size::MAX,
                self.max_size
            )));
        }
        Ok(())
    }

    /// Size of the trial with zero-based index `trial`
    pub fn size_for(&self, trial: usize) -> Size {
        let max_size = self.max_size.max(1) as usize;
        Size::new((trial % max_size + 1) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_trials, 250);
        assert_eq!(config.max_size, 100);
        assert_eq!(config.algorithm, Algorithm::Mwc);
        assert!(config.catch_panics);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            max_trials = 40
            algorithm = "mersenne-twister"
            "#,
        )
        .unwrap();
        assert_eq!(
            config,
            EngineConfig::new()
                .with_max_trials(40)
                .with_algorithm(Algorithm::MersenneTwister)
        );
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            EngineConfig::from_toml_str("max_trials = 0"),
            Err(ConfigError::Invalid(_))
        ));
        let err = EngineConfig::from_toml_str("max_size = 101").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid configuration: max_size must be between 1 and 100, got 101"
        );
        assert!(matches!(
            EngineConfig::from_toml_str("algorithm = \"xorshift\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("max_tirals = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = EngineConfig::load("/nonexistent/quickprop.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().starts_with("failed to read /nonexistent/quickprop.toml"));
    }

    #[test]
    fn test_sizes_cycle() {
        let config = EngineConfig::new().with_max_size(3);
        let sizes: Vec<u32> = (0..7).map(|i| config.size_for(i).value()).collect();
        assert_eq!(sizes, vec![1, 2, 3, 1, 2, 3, 1]);
    }
}

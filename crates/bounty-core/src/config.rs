//! Configuration loading and typed config structures for the bounty engine.
//!
//! The canonical configuration lives in `bounty-config.yaml`. This module
//! defines strongly-typed structs that mirror the YAML structure and a loader
//! that reads and validates the file. Every field has a default, so an empty
//! file (or no file at all) yields a working engine.

use std::path::Path;

use chrono::TimeDelta;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but makes no sense (e.g. a zero-length window).
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BountyConfig {
    /// Batch cycle and attribution window.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Which destroyed blocks may carry a bounty.
    #[serde(default)]
    pub admission: AdmissionConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BountyConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// The `BOUNTY_LOG` environment variable overrides `logging.level`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to a map.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.logging.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.cycle_interval()?;
        self.engine.damage_window()?;
        if self.admission.bounty_key.trim().is_empty() {
            return Err(ConfigError::Invalid {
                reason: "admission.bounty_key must not be empty".to_owned(),
            });
        }
        Ok(())
    }
}

/// Batch cycle settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Minimum milliseconds between two batch cycles.
    #[serde(default = "default_cycle_interval_ms")]
    pub cycle_interval_ms: u64,

    /// How long damage stays eligible for attribution.
    #[serde(default = "default_damage_window_seconds")]
    pub damage_window_seconds: u64,
}

impl EngineConfig {
    /// The cycle interval as a [`TimeDelta`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the interval is zero or too large.
    pub fn cycle_interval(&self) -> Result<TimeDelta, ConfigError> {
        i64::try_from(self.cycle_interval_ms)
            .ok()
            .filter(|ms| *ms > 0)
            .and_then(TimeDelta::try_milliseconds)
            .ok_or_else(|| ConfigError::Invalid {
                reason: format!(
                    "engine.cycle_interval_ms must be positive and representable, got {}",
                    self.cycle_interval_ms
                ),
            })
    }

    /// The attribution window as a [`TimeDelta`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the window is zero or too large.
    pub fn damage_window(&self) -> Result<TimeDelta, ConfigError> {
        i64::try_from(self.damage_window_seconds)
            .ok()
            .filter(|s| *s > 0)
            .and_then(TimeDelta::try_seconds)
            .ok_or_else(|| ConfigError::Invalid {
                reason: format!(
                    "engine.damage_window_seconds must be positive and representable, got {}",
                    self.damage_window_seconds
                ),
            })
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cycle_interval_ms: default_cycle_interval_ms(),
            damage_window_seconds: default_damage_window_seconds(),
        }
    }
}

/// Kill admission settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AdmissionConfig {
    /// Block subtypes that may carry a bounty.
    #[serde(default = "default_valid_subtypes")]
    pub valid_subtypes: Vec<String>,

    /// Metadata key holding the bounty amount.
    #[serde(default = "default_bounty_key")]
    pub bounty_key: String,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            valid_subtypes: default_valid_subtypes(),
            bounty_key: default_bounty_key(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl LoggingConfig {
    /// Override the level with `BOUNTY_LOG` when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("BOUNTY_LOG") {
            self.level = val;
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_cycle_interval_ms() -> u64 {
    1000
}

const fn default_damage_window_seconds() -> u64 {
    300
}

fn default_valid_subtypes() -> Vec<String> {
    vec![
        "RivalAIRemoteControlLarge".to_owned(),
        "RivalAIRemoteControlSmall".to_owned(),
    ]
}

fn default_bounty_key() -> String {
    "BountyOnKill".to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = BountyConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.engine.cycle_interval_ms, 1000);
        assert_eq!(config.engine.damage_window_seconds, 300);
        assert_eq!(config.admission.valid_subtypes.len(), 2);
        assert_eq!(config.admission.bounty_key, "BountyOnKill");
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
engine:
  cycle_interval_ms: 250
  damage_window_seconds: 60

admission:
  valid_subtypes:
    - "PirateRemoteControl"
  bounty_key: "Reward"

logging:
  level: "debug"
"#;
        let config = BountyConfig::parse(yaml).unwrap();
        assert_eq!(config.engine.cycle_interval().unwrap(), TimeDelta::milliseconds(250));
        assert_eq!(config.engine.damage_window().unwrap(), TimeDelta::seconds(60));
        assert_eq!(config.admission.valid_subtypes, vec!["PirateRemoteControl".to_owned()]);
        assert_eq!(config.admission.bounty_key, "Reward");
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = BountyConfig::parse("engine:\n  damage_window_seconds: 30\n").unwrap();
        assert_eq!(config.engine.damage_window_seconds, 30);
        // Everything else uses defaults
        assert_eq!(config.engine.cycle_interval_ms, 1000);
        assert_eq!(config.admission.bounty_key, "BountyOnKill");
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(BountyConfig::parse("").is_ok());
    }

    #[test]
    fn zero_window_is_rejected() {
        let result = BountyConfig::parse("engine:\n  damage_window_seconds: 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let result = BountyConfig::parse("engine:\n  cycle_interval_ms: 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let result = BountyConfig::parse("engine: [not, a, map");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("bounty-config.yaml");
        if path.exists() {
            let config = BountyConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}

//! Error types for the replay binary.

use std::path::PathBuf;

/// Top-level error for the replay binary.
///
/// Each variant wraps a specific failure so `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: bounty_core::config::ConfigError,
    },

    /// The scenario file could not be read.
    #[error("failed to read scenario {}: {source}", path.display())]
    ScenarioIo {
        /// Path that was read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The scenario file is not a valid scenario.
    #[error("failed to parse scenario {}: {source}", path.display())]
    ScenarioYaml {
        /// Path that was parsed.
        path: PathBuf,
        /// The underlying YAML error.
        source: serde_yml::Error,
    },

    /// A scenario event time could not be represented.
    #[error("scenario event at {offset_ms}ms is out of range")]
    EventTime {
        /// Offset from the scenario start.
        offset_ms: i64,
    },

    /// Writing the report failed.
    #[error("report error: {source}")]
    Report {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// Bad command line.
    #[error("usage: bounty-engine <scenario.yaml> [config.yaml]")]
    Usage,
}

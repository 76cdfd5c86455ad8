//! Configuration loading and typed config structures for the evstruct engine.
//!
//! The canonical configuration lives in `evstruct-config.yaml` at the
//! project root. Every field has a default, so an empty file (or no file)
//! yields a working engine.

use std::path::Path;

use evstruct_types::DEFAULT_MAX_VARIABLES;
use serde::Deserialize;

use crate::minimize::SplitOrder;

/// Environment variable overriding `logging.level`.
pub const LOG_LEVEL_ENV: &str = "EVSTRUCT_LOG_LEVEL";

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
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration.
///
/// Mirrors the structure of `evstruct-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Derivation and bundle minimization settings.
    #[serde(default)]
    pub derivation: DerivationConfig,

    /// Feature solver settings.
    #[serde(default)]
    pub solver: SolverConfig,

    /// Round-trip verification settings.
    #[serde(default)]
    pub verification: VerificationConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `EVSTRUCT_LOG_LEVEL` overrides `logging.level`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document means all defaults.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.logging.apply_env_overrides();
        Ok(config)
    }
}

/// Derivation configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DerivationConfig {
    /// Which non-conflicting member pair the minimization worklist splits
    /// first.
    #[serde(default)]
    pub split_order: SplitOrder,

    /// Whether candidate bundles are minimized. When disabled, derived
    /// bundles may contain non-conflicting members.
    #[serde(default = "default_true")]
    pub minimize_bundles: bool,
}

impl Default for DerivationConfig {
    fn default() -> Self {
        Self {
            split_order: SplitOrder::default(),
            minimize_bundles: true,
        }
    }
}

/// Feature solver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SolverConfig {
    /// Largest number of distinct features the truth-table solver accepts
    /// in one formula.
    #[serde(default = "default_max_variables")]
    pub max_variables: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_variables: default_max_variables(),
        }
    }
}

/// Round-trip verification configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct VerificationConfig {
    /// Whether `round_trip` compares traces of the input and output graphs.
    #[serde(default = "default_true")]
    pub check_round_trip: bool,

    /// Trace length bound for featured trace comparison.
    #[serde(default = "default_featured_trace_depth")]
    pub featured_trace_depth: usize,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            check_round_trip: true,
            featured_trace_depth: default_featured_trace_depth(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log filter (trace, debug, info, warn, error, or a full directive).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    /// Apply `EVSTRUCT_LOG_LEVEL` if set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(LOG_LEVEL_ENV) {
            self.level = val;
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_true() -> bool {
    true
}

const fn default_max_variables() -> usize {
    DEFAULT_MAX_VARIABLES
}

const fn default_featured_trace_depth() -> usize {
    8
}

fn default_log_level() -> String {
    "info".to_owned()
}

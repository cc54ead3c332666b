//! Configuration for the workload compiler

use crate::error::{CompilerError, CompilerResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use workload_behavior::MatrixConfig;

/// Main compiler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Directory behavior matrices are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Plan lowering options
    #[serde(default)]
    pub plan: PlanConfig,

    /// Matrix rendering options
    #[serde(default)]
    pub matrix: MatrixConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            plan: PlanConfig::default(),
            matrix: MatrixConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl CompilerConfig {
    pub fn from_toml_str(input: &str) -> CompilerResult<Self> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that would corrupt the written artifacts
    pub fn validate(&self) -> CompilerResult<()> {
        self.matrix
            .validate()
            .map_err(|e| CompilerError::ConfigurationError(e.to_string()))
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> CompilerResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CompilerError::ConfigurationError(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}

/// Plan lowering options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanConfig {
    /// How the `negate` flag of boolean guards is rendered
    #[serde(default)]
    pub guard_negation: GuardNegation,
}

/// Rendering of boolean guard negation.
///
/// The session controller consuming the plans treats a boolean guard whose
/// `negate` flag is unset as `!name`. `PrefixNegated` renders the flag the
/// literal way round instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardNegation {
    /// `negate == false` renders `!name`, `negate == true` renders `name`
    #[default]
    PrefixUnnegated,
    /// `negate == true` renders `!name`, `negate == false` renders `name`
    PrefixNegated,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,

    /// Include timestamps
    #[serde(default = "default_true")]
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            timestamps: true,
        }
    }
}

// Default value helpers
fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

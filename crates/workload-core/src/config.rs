//! Workload configuration.
//!
//! The configuration is loaded once at startup from a YAML or JSON file and
//! describes the SQL templates, how many workers run them, and how fast.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::spec::ParamSpec;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error reading the configuration file
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Error parsing JSON
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Structurally invalid configuration
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// How connections are obtained for each session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionMode {
    /// One pooled connection per worker, reused across sessions
    #[default]
    #[serde(alias = "long-lived", alias = "long_lived")]
    Long,

    /// A fresh physical connection per session, closed afterwards
    #[serde(alias = "short-lived", alias = "short_lived")]
    Short,
}

impl std::fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionMode::Long => f.write_str("long-lived pooled"),
            ConnectionMode::Short => f.write_str("short-lived cycled"),
        }
    }
}

/// A SQL statement with one [`ParamSpec`] per positional `?` placeholder.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Template {
    /// SQL text with positional placeholders
    pub sql: String,

    /// Parameter specs, in placeholder order
    #[serde(default)]
    pub params: Vec<ParamSpec>,
}

/// Full workload definition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorkloadConfig {
    /// Number of concurrent workers
    pub concurrency: usize,

    /// Sessions per second per worker (0 = unlimited)
    #[serde(default)]
    pub rate_per_thread: u32,

    /// Database connection string
    pub db_conn_str: String,

    /// Connection lifecycle
    #[serde(default)]
    pub connection_type: ConnectionMode,

    /// Run each session inside a single transaction
    #[serde(default)]
    pub use_transaction: bool,

    /// Templates executed in order by every session
    pub templates: Vec<Template>,
}

impl WorkloadConfig {
    /// Load a configuration file.
    ///
    /// Files ending in `.json` are parsed as JSON, everything else as YAML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: WorkloadConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: WorkloadConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Structural checks. Parameter specs are validated by the generator factory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.templates.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one template is required".to_string(),
            ));
        }
        if let Some(idx) = self.templates.iter().position(|t| t.sql.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!("template {idx} has empty sql")));
        }
        Ok(())
    }
}

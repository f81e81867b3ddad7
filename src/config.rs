//! Service configuration
//!
//! Loaded from an optional JSON file; every field has a default.
//!
//! ```json
//! {
//!   "host": "0.0.0.0",
//!   "port": 5000,
//!   "log_path": "server_squat_log.csv",
//!   "schema_policy": "evolve",
//!   "log_level": "info"
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::durable_log::{DurableLog, SchemaPolicy};
use crate::http_server::HttpServerConfig;
use crate::observability::Severity;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Listen address
    #[serde(flatten)]
    pub http: HttpServerConfig,

    /// CSV log file (default: "server_squat_log.csv")
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,

    /// Schema drift policy (default: evolve)
    #[serde(default)]
    pub schema_policy: SchemaPolicy,

    /// Minimum log severity (default: "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_path() -> PathBuf {
    PathBuf::from("server_squat_log.csv")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            http: HttpServerConfig::default(),
            log_path: default_log_path(),
            schema_policy: SchemaPolicy::default(),
            log_level: default_log_level(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: ServiceConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.http.host.trim().is_empty() {
            return Err(ConfigError::Invalid("host must not be empty".into()));
        }
        if self.log_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("log_path must not be empty".into()));
        }
        if self.log_path.is_dir() {
            return Err(ConfigError::Invalid(format!(
                "log_path is a directory: {}",
                self.log_path.display()
            )));
        }
        self.min_severity()?;
        Ok(())
    }

    pub fn min_severity(&self) -> ConfigResult<Severity> {
        self.log_level.parse().map_err(ConfigError::Invalid)
    }

    /// Handle on the configured log file
    pub fn durable_log(&self) -> DurableLog {
        DurableLog::new(&self.log_path, self.schema_policy)
    }
}

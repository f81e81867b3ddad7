//! Durable log error types
//!
//! - `Load` / `Malformed`: recovery could not read the file. Never fatal;
//!   the service starts with an empty store.
//! - `Append`: a disk write failed. The record stays in memory.
//! - `SchemaMismatch`: the record carries fields the header does not have
//!   and the configured policy is `reject`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for durable log operations
pub type LogResult<T> = Result<T, LogError>;

#[derive(Debug, Error)]
pub enum LogError {
    /// Log file exists but could not be read
    #[error("failed to read log {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Log content could not be decoded
    #[error("malformed log at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    /// Writing to the log failed
    #[error("failed to append to log {}: {source}", path.display())]
    Append {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Record fields are not covered by the committed header
    #[error("record fields not in log header: {}", fields.join(", "))]
    SchemaMismatch { fields: Vec<String> },
}

impl LogError {
    pub(crate) fn load(path: impl Into<PathBuf>, source: io::Error) -> Self {
        LogError::Load {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        LogError::Malformed {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn append(path: impl Into<PathBuf>, source: io::Error) -> Self {
        LogError::Append {
            path: path.into(),
            source,
        }
    }

    /// Whether this error came from reading the log
    pub fn is_load(&self) -> bool {
        matches!(self, LogError::Load { .. } | LogError::Malformed { .. })
    }

    /// Whether this error came from writing the log
    pub fn is_append(&self) -> bool {
        matches!(self, LogError::Append { .. })
    }
}

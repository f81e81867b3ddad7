//! Observable events for squatlog
//!
//! Events are explicit and typed; each carries its own severity.

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Process startup begins
    BootStart,
    /// Configuration resolved
    ConfigLoaded,
    /// Listener bound, ready for requests
    Serving,
    /// Listener stopped
    ShutdownComplete,

    // Recovery
    /// Reading the durable log begins
    RecoveryStart,
    /// Store populated from the log
    RecoveryComplete,
    /// Log unreadable; starting with an empty store
    RecoveryFailed,

    // Writes
    /// Record stored in memory and on disk
    RecordAccepted,
    /// Request body was not a non-empty JSON object
    PayloadRejected,
    /// Record refused by the `reject` schema policy
    SchemaRejected,
    /// First record created the log header
    HeaderCreated,
    /// Header extended with new columns
    SchemaEvolved,
    /// Fields left out of a row by the `drop_extra` policy
    FieldsDropped,
    /// Disk append failed; record kept in memory only
    AppendFailed,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "SQUATLOG_STARTUP_BEGIN",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::Serving => "SQUATLOG_SERVING",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",

            Event::RecoveryStart => "RECOVERY_BEGIN",
            Event::RecoveryComplete => "RECOVERY_COMPLETE",
            Event::RecoveryFailed => "RECOVERY_FAILED",

            Event::RecordAccepted => "RECORD_ACCEPTED",
            Event::PayloadRejected => "PAYLOAD_REJECTED",
            Event::SchemaRejected => "SCHEMA_REJECTED",
            Event::HeaderCreated => "LOG_HEADER_CREATED",
            Event::SchemaEvolved => "LOG_HEADER_EVOLVED",
            Event::FieldsDropped => "LOG_FIELDS_DROPPED",
            Event::AppendFailed => "LOG_APPEND_FAILED",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Event::RecordAccepted => Severity::Trace,
            Event::PayloadRejected | Event::SchemaRejected | Event::FieldsDropped => Severity::Warn,
            Event::RecoveryFailed | Event::AppendFailed => Severity::Error,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//! CLI module for squatlog
//!
//! Provides command-line interface for:
//! - serve: Recover the log and serve the HTTP API
//! - dump: Recover the log and print its records

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, ConfigArgs};
pub use commands::{dump, dump_to, resolve_config, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_json, write_json_to};

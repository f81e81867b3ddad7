//! CLI argument definitions using clap
//!
//! Commands:
//! - squatlog serve [--config <path>] [overrides]
//! - squatlog dump  [--config <path>] [--log-path <path>]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::durable_log::SchemaPolicy;

/// squatlog - squat repetition event log
#[derive(Parser, Debug)]
#[command(name = "squatlog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Recover the log and serve the HTTP API
    Serve {
        #[command(flatten)]
        opts: ConfigArgs,
    },

    /// Recover the log and print the records as JSON
    Dump {
        #[command(flatten)]
        opts: ConfigArgs,
    },
}

/// Config file plus per-field overrides
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to a JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(long)]
    pub port: Option<u16>,

    /// CSV log file
    #[arg(long)]
    pub log_path: Option<PathBuf>,

    /// Schema drift policy: evolve, drop_extra or reject
    #[arg(long)]
    pub schema_policy: Option<SchemaPolicy>,

    /// Minimum log level: trace, info, warn, error
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from([
            "squatlog",
            "serve",
            "--port",
            "8080",
            "--schema-policy",
            "drop_extra",
        ])
        .unwrap();
        match cli.command {
            Command::Serve { opts } => {
                assert_eq!(opts.port, Some(8080));
                assert_eq!(opts.schema_policy, Some(SchemaPolicy::DropExtra));
                assert!(opts.config.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_bad_policy_is_rejected() {
        assert!(Cli::try_parse_from(["squatlog", "serve", "--schema-policy", "rewrite"]).is_err());
    }

    #[test]
    fn test_parse_dump() {
        let cli = Cli::try_parse_from(["squatlog", "dump", "--log-path", "/tmp/x.csv"]).unwrap();
        assert!(matches!(cli.command, Command::Dump { .. }));
    }
}

//! CLI command implementations
//!
//! Boot order for `serve`:
//! 1. Resolve configuration (file, then flag overrides)
//! 2. Recover the log into the in-memory store
//! 3. Bind and serve until Ctrl-C

use std::io::Write;
use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::http_server::HttpServer;
use crate::ledger::Ledger;
use crate::observability::{log_event, log_event_with_fields, Event, Logger, Severity};

use super::args::{Command, ConfigArgs};
use super::errors::{CliError, CliResult};
use super::io::{write_json, write_json_to};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { opts } => serve(&opts),
        Command::Dump { opts } => dump(&opts),
    }
}

/// Build the effective configuration.
///
/// Starts from the file named by `--config` (or defaults), then applies
/// each flag that was given.
pub fn resolve_config(opts: &ConfigArgs) -> CliResult<ServiceConfig> {
    let mut config = match &opts.config {
        Some(path) => ServiceConfig::load(path)?,
        None => ServiceConfig::default(),
    };

    if let Some(host) = &opts.host {
        config.http.host = host.clone();
    }
    if let Some(port) = opts.port {
        config.http.port = port;
    }
    if let Some(log_path) = &opts.log_path {
        config.log_path = log_path.clone();
    }
    if let Some(policy) = opts.schema_policy {
        config.schema_policy = policy;
    }
    if let Some(level) = &opts.log_level {
        config.log_level = level.clone();
    }

    config.validate()?;
    Ok(config)
}

/// Recover the log and serve the HTTP API until shutdown
pub fn serve(opts: &ConfigArgs) -> CliResult<()> {
    let config = resolve_config(opts)?;
    Logger::set_min_severity(config.min_severity()?);

    log_event(Event::BootStart);
    let log_path = config.log_path.display().to_string();
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("addr", config.http.socket_addr().as_str()),
            ("log_path", log_path.as_str()),
            ("schema_policy", config.schema_policy.as_str()),
        ],
    );

    let ledger = Arc::new(Ledger::open(config.durable_log())?);
    let server = HttpServer::new(config.http.clone(), ledger);

    // Start the async runtime and run the server
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })?;

    Ok(())
}

/// Recover the log and print its records to stdout as a JSON array
pub fn dump(opts: &ConfigArgs) -> CliResult<()> {
    let config = resolve_config(opts)?;
    // Keep stdout clean for the JSON
    Logger::set_min_severity(Severity::Error);

    let records = config.durable_log().recover()?.records;
    write_json(&records)
}

/// Like `dump`, writing to `out` instead of stdout
pub fn dump_to<W: Write>(config: &ServiceConfig, out: &mut W) -> CliResult<()> {
    let records = config.durable_log().recover()?.records;
    write_json_to(out, &records)
}

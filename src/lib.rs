//! squatlog - an append-only log of squat repetition events
//!
//! Records posted over HTTP are held in memory and written through to a
//! CSV file; the file is replayed into memory at startup.

pub mod cli;
pub mod config;
pub mod durable_log;
pub mod http_server;
pub mod ledger;
pub mod observability;
pub mod record;
pub mod store;

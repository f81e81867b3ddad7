//! # squatlog HTTP Server Module
//!
//! Thin transport over the ledger.
//!
//! # Endpoints
//!
//! - `POST /api/squat` - Store one record
//! - `GET /api/squats` - List all records
//! - `/health` - Health check

pub mod config;
pub mod errors;
pub mod observability_routes;
pub mod server;
pub mod squat_routes;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use server::{build_router, HttpServer};

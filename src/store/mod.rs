//! In-memory record store
//!
//! The store is the authoritative read view for the process lifetime.
//! It is loaded once from the durable log at startup and then grows by
//! one record per accepted write. It is never persisted directly.

mod errors;
mod memory;

pub use errors::{StoreError, StoreResult};
pub use memory::RecordStore;

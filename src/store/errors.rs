//! Record store errors

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// `load` after a previous load or after the first append
    #[error("record store is already initialized")]
    AlreadyInitialized,

    /// A writer panicked while holding the lock
    #[error("record store lock poisoned")]
    LockPoisoned,
}

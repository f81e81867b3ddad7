//! Ledger error types

use thiserror::Error;

use crate::store::StoreError;

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Refused by the `reject` schema policy; no state changed
    #[error("record fields not in log header: {}", fields.join(", "))]
    SchemaMismatch { fields: Vec<String> },

    #[error(transparent)]
    Store(#[from] StoreError),
}

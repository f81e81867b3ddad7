//! Write-through ledger
//!
//! Owns the in-memory store and the durable log and keeps them in step:
//!
//! - Startup: the log is recovered into the store exactly once. An
//!   unreadable log is logged and the store starts empty.
//! - Writes: one mutex covers admission, the memory append and the disk
//!   append, so rows from concurrent writers never interleave and the
//!   store and the log see records in the same order.
//! - Reads: served from the store under its shared lock; they never wait
//!   on the write mutex or on disk.

mod errors;

pub use errors::{LedgerError, LedgerResult};

use std::iter;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::durable_log::{AppendOutcome, DurableLog, LogError, RecoveryStats, SchemaPolicy};
use crate::observability::{log_event, log_event_with_fields, Event};
use crate::record::{Record, TIMESTAMP_FIELD};
use crate::store::{RecordStore, StoreError};

/// Whether an accepted record reached the disk
#[derive(Debug)]
pub enum Durability {
    Persisted(AppendOutcome),
    /// The record is held in memory only
    MemoryOnly(LogError),
}

/// Result of an accepted write
#[derive(Debug)]
pub struct Committed {
    /// The record as stored (with `timestamp` filled)
    pub record: Record,
    pub durability: Durability,
}

impl Committed {
    pub fn is_durable(&self) -> bool {
        matches!(self.durability, Durability::Persisted(_))
    }
}

/// What startup recovery produced
#[derive(Debug, Clone, Default)]
pub struct RecoverySummary {
    pub records: usize,
    pub stats: RecoveryStats,
    /// Set when the log could not be read and the store started empty
    pub error: Option<String>,
}

pub struct Ledger {
    store: RecordStore,
    log: Mutex<DurableLog>,
    log_path: PathBuf,
    policy: SchemaPolicy,
    recovery: RecoverySummary,
}

impl Ledger {
    /// Recover `log` into a fresh store.
    pub fn open(log: DurableLog) -> LedgerResult<Self> {
        Self::with_store(log, RecordStore::new())
    }

    /// Recover `log` into the given (unused) store.
    pub fn with_store(mut log: DurableLog, store: RecordStore) -> LedgerResult<Self> {
        let log_path = log.path().to_path_buf();
        let path_str = log_path.display().to_string();
        log_event_with_fields(Event::RecoveryStart, &[("log_path", path_str.as_str())]);

        let recovery = match log.recover() {
            Ok(recovered) => {
                let summary = RecoverySummary {
                    records: recovered.records.len(),
                    stats: recovered.stats,
                    error: None,
                };
                store.load(recovered.records)?;
                log_event_with_fields(
                    Event::RecoveryComplete,
                    &[
                        ("records", summary.records.to_string().as_str()),
                        ("numbers_coerced", summary.stats.numbers_coerced.to_string().as_str()),
                        ("numbers_degraded", summary.stats.numbers_degraded.to_string().as_str()),
                        ("extra_cells", summary.stats.extra_cells.to_string().as_str()),
                    ],
                );
                summary
            }
            Err(e) => {
                store.load(Vec::new())?;
                let reason = e.to_string();
                log_event_with_fields(
                    Event::RecoveryFailed,
                    &[("log_path", path_str.as_str()), ("reason", reason.as_str())],
                );
                RecoverySummary {
                    error: Some(reason),
                    ..RecoverySummary::default()
                }
            }
        };

        Ok(Self {
            store,
            policy: log.policy(),
            log: Mutex::new(log),
            log_path,
            recovery,
        })
    }

    /// Store a record in memory and append it to the log.
    ///
    /// Fails only when the `reject` policy refuses the record (nothing
    /// changes) or a lock is poisoned. A failed disk append is reported
    /// through `Committed::durability`; the record stays in memory.
    pub fn record(&self, record: Record) -> LedgerResult<Committed> {
        let mut log = self.log.lock().map_err(|_| StoreError::LockPoisoned)?;

        let names = record.field_names().chain(iter::once(TIMESTAMP_FIELD));
        match log.admit(names) {
            Err(LogError::SchemaMismatch { fields }) => {
                log_event_with_fields(
                    Event::SchemaRejected,
                    &[("fields", fields.join(",").as_str())],
                );
                return Err(LedgerError::SchemaMismatch { fields });
            }
            // header unreadable; the append below reports it
            Err(_) | Ok(()) => {}
        }

        let stored = self.store.append(record)?;

        let durability = match log.append(&stored) {
            Ok(outcome) => {
                log_append_outcome(&outcome);
                log_event_with_fields(
                    Event::RecordAccepted,
                    &[("fields", stored.len().to_string().as_str())],
                );
                Durability::Persisted(outcome)
            }
            Err(e) => {
                log_event_with_fields(
                    Event::AppendFailed,
                    &[
                        ("log_path", self.log_path.display().to_string().as_str()),
                        ("reason", e.to_string().as_str()),
                    ],
                );
                Durability::MemoryOnly(e)
            }
        };

        Ok(Committed {
            record: stored,
            durability,
        })
    }

    /// All records in insertion order
    pub fn records(&self) -> LedgerResult<Vec<Record>> {
        Ok(self.store.all()?)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn policy(&self) -> SchemaPolicy {
        self.policy
    }

    pub fn recovery(&self) -> &RecoverySummary {
        &self.recovery
    }
}

fn log_append_outcome(outcome: &AppendOutcome) {
    if outcome.header_created {
        log_event(Event::HeaderCreated);
    }
    if !outcome.columns_added.is_empty() {
        log_event_with_fields(
            Event::SchemaEvolved,
            &[("columns_added", outcome.columns_added.join(",").as_str())],
        );
    }
    if !outcome.fields_dropped.is_empty() {
        log_event_with_fields(
            Event::FieldsDropped,
            &[("fields", outcome.fields_dropped.join(",").as_str())],
        );
    }
}

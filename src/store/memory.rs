//! RwLock-backed record sequence
//!
//! Readers take the shared lock and copy the sequence out, so they never
//! see a record that is still being inserted. Writers push one complete
//! record per exclusive lock.

use std::sync::{PoisonError, RwLock};

use super::errors::{StoreError, StoreResult};
use crate::record::{now_timestamp, Record};

#[derive(Debug, Default)]
struct StoreState {
    records: Vec<Record>,
    /// Set by `load` or by the first `append`
    initialized: bool,
}

/// Ordered in-memory collection of all records.
#[derive(Debug)]
pub struct RecordStore {
    state: RwLock<StoreState>,
    clock: fn() -> String,
}

impl RecordStore {
    /// Create an empty store stamping records with local time
    pub fn new() -> Self {
        Self::with_clock(now_timestamp)
    }

    /// Create an empty store with a custom timestamp source
    pub fn with_clock(clock: fn() -> String) -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            clock,
        }
    }

    /// Populate the store from recovered records.
    ///
    /// One-time initialization: fails once the store was loaded or has
    /// accepted an append, so accepted records can never be discarded.
    pub fn load(&self, records: Vec<Record>) -> StoreResult<()> {
        let mut state = self.state.write().map_err(|_| StoreError::LockPoisoned)?;
        if state.initialized {
            return Err(StoreError::AlreadyInitialized);
        }
        state.records = records;
        state.initialized = true;
        Ok(())
    }

    /// Append a record, filling `timestamp` if it is missing.
    ///
    /// Returns the record as stored.
    pub fn append(&self, mut record: Record) -> StoreResult<Record> {
        record.fill_timestamp_with(self.clock);

        let mut state = self.state.write().map_err(|_| StoreError::LockPoisoned)?;
        state.initialized = true;
        state.records.push(record.clone());
        Ok(record)
    }

    /// Copy of all records in insertion order
    pub fn all(&self) -> StoreResult<Vec<Record>> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(state.records.clone())
    }

    /// Number of stored records; still counts after a writer panicked
    pub fn len(&self) -> usize {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::thread;

    fn fixed_clock() -> String {
        "2024-05-01T18:30:12".to_string()
    }

    fn record(value: serde_json::Value) -> Record {
        Record::from_json(value).unwrap()
    }

    #[test]
    fn test_append_fills_timestamp() {
        let store = RecordStore::with_clock(fixed_clock);
        let stored = store.append(record(json!({"count": 5}))).unwrap();
        assert_eq!(stored.get("timestamp"), Some(&json!("2024-05-01T18:30:12")));
        assert_eq!(store.all().unwrap(), vec![stored]);
    }

    #[test]
    fn test_append_keeps_given_timestamp() {
        let store = RecordStore::with_clock(fixed_clock);
        let stored = store
            .append(record(json!({"count": 5, "timestamp": "2023-01-01T00:00:00"})))
            .unwrap();
        assert_eq!(stored.get("timestamp"), Some(&json!("2023-01-01T00:00:00")));
    }

    #[test]
    fn test_insertion_order() {
        let store = RecordStore::new();
        for i in 0..5 {
            store.append(record(json!({"count": i}))).unwrap();
        }
        let counts: Vec<_> = store
            .all()
            .unwrap()
            .iter()
            .map(|r| r.get("count").cloned().unwrap())
            .collect();
        assert_eq!(counts, (0..5).map(|i| json!(i)).collect::<Vec<_>>());
    }

    #[test]
    fn test_load_once() {
        let store = RecordStore::new();
        store.load(vec![record(json!({"count": 1}))]).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.load(vec![]),
            Err(StoreError::AlreadyInitialized)
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_load_after_append_is_refused() {
        let store = RecordStore::new();
        store.append(record(json!({"count": 1}))).unwrap();
        assert_eq!(
            store.load(vec![record(json!({"count": 9}))]),
            Err(StoreError::AlreadyInitialized)
        );
        assert_eq!(store.all().unwrap().len(), 1);
    }

    #[test]
    fn test_all_is_a_copy() {
        let store = RecordStore::new();
        store.append(record(json!({"count": 1}))).unwrap();
        let snapshot = store.all().unwrap();
        store.append(record(json!({"count": 2}))).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_concurrent_appends() {
        let store = Arc::new(RecordStore::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..50 {
                        store.append(record(json!({"thread": t, "i": i}))).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.len(), 400);
        assert!(store.all().unwrap().iter().all(|r| r.len() == 3));
    }

    #[test]
    fn test_len_counts_records_after_writer_panic() {
        let store = Arc::new(RecordStore::new());
        store.append(record(json!({"count": 1}))).unwrap();
        store.append(record(json!({"count": 2}))).unwrap();

        let poisoner = Arc::clone(&store);
        let _ = thread::spawn(move || {
            let _guard = poisoner.state.write().unwrap();
            panic!("writer panicked while holding the lock");
        })
        .join();

        assert!(store.state.is_poisoned());
        assert_eq!(store.len(), 2);
        assert!(!store.is_empty());
        assert_eq!(store.all(), Err(StoreError::LockPoisoned));
    }
}

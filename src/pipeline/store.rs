use crate::digest::Algorithm;
use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::{Mutex, PoisonError};

/// Key of a stored match: the worker's id namespaces its own sequence counter,
/// so two workers can never produce the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MatchKey {
    pub worker_id: usize,
    pub sequence: u64,
}

impl MatchKey {
    pub fn new(worker_id: usize, sequence: u64) -> Self {
        Self {
            worker_id,
            sequence,
        }
    }
}

/// A candidate whose digest equalled the target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub worker_id: usize,
    pub chunk_id: usize,
    pub original: String,
    /// Lowercase hex
    pub hash: String,
    pub algorithm: Algorithm,
    /// Unix time in milliseconds
    pub timestamp: u64,
}

/// Thread-safe map of matches written by many workers and read once after join.
#[derive(Debug, Default)]
pub struct ResultStore {
    records: Mutex<BTreeMap<MatchKey, MatchRecord>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record. A key that is already present is rejected rather
    /// than overwritten.
    pub fn insert(&self, key: MatchKey, record: MatchRecord) -> Result<()> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        match records.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
            Entry::Occupied(_) => Err(PipelineError::DuplicateMatchKey {
                worker_id: key.worker_id,
                sequence: key.sequence,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every record in key order.
    ///
    /// Only meaningful once all writers have been joined.
    pub fn snapshot(&self) -> Vec<(MatchKey, MatchRecord)> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(key, record)| (*key, record.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(worker_id: usize, original: &str) -> MatchRecord {
        MatchRecord {
            worker_id,
            chunk_id: 0,
            original: original.to_string(),
            hash: "00".to_string(),
            algorithm: Algorithm::Sha256,
            timestamp: 0,
        }
    }

    #[test]
    fn test_duplicate_key_is_rejected() {
        let store = ResultStore::new();
        store.insert(MatchKey::new(1, 0), record(1, "a")).unwrap();
        let err = store.insert(MatchKey::new(1, 0), record(1, "b")).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::DuplicateMatchKey {
                worker_id: 1,
                sequence: 0
            }
        ));
        assert_eq!(store.snapshot()[0].1.original, "a");
    }

    #[test]
    fn test_concurrent_inserts_lose_nothing() {
        let store = ResultStore::new();
        let workers = 8;
        let per_worker: u64 = 250;

        crossbeam::thread::scope(|s| {
            for worker_id in 0..workers {
                let store = &store;
                s.spawn(move |_| {
                    for sequence in 0..per_worker {
                        store
                            .insert(
                                MatchKey::new(worker_id, sequence),
                                record(worker_id, "same candidate"),
                            )
                            .unwrap();
                    }
                });
            }
        })
        .unwrap();

        assert_eq!(store.len(), workers * per_worker as usize);
    }

    #[test]
    fn test_snapshot_is_ordered_by_worker_then_sequence() {
        let store = ResultStore::new();
        store.insert(MatchKey::new(2, 0), record(2, "c")).unwrap();
        store.insert(MatchKey::new(0, 1), record(0, "b")).unwrap();
        store.insert(MatchKey::new(0, 0), record(0, "a")).unwrap();

        let snapshot = store.snapshot();
        let order: Vec<&str> = snapshot.iter().map(|(_, r)| r.original.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }
}

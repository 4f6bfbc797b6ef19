use super::store::{MatchRecord, ResultStore};

/// Snapshot the store and return its matches ordered by worker id, then by
/// discovery order within each worker.
///
/// Call once, after every worker has been joined.
pub fn collect(store: &ResultStore) -> Vec<MatchRecord> {
    let records: Vec<MatchRecord> = store
        .snapshot()
        .into_iter()
        .map(|(_, record)| record)
        .collect();
    tracing::debug!("Collected {} matches", records.len());
    records
}

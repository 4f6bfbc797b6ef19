use super::store::MatchRecord;
use super::worker::{WorkerOutcome, WorkerState};
use crate::digest::Algorithm;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;

/// Final statistics of one worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerReport {
    pub worker_id: usize,
    pub state: WorkerState,
    pub items_processed: usize,
    pub items_skipped: usize,
    pub chunks_processed: usize,
    pub matches_found: usize,
    pub elapsed_seconds: f64,
}

/// A worker, or the orchestrator itself, that did not finish cleanly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerFailure {
    /// `None` when the failure happened while filling the queue
    pub worker_id: Option<usize>,
    pub error: String,
}

/// Outcome of one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub run_id: String,
    pub algorithm: Algorithm,
    pub target_hash: String,
    pub total_candidates: usize,
    pub chunks_enqueued: usize,
    pub total_processed: usize,
    pub total_skipped: usize,
    pub total_matches: usize,
    /// Ordered by worker id, then discovery order within the worker
    pub matches: Vec<MatchRecord>,
    pub workers: Vec<WorkerReport>,
    pub failures: Vec<WorkerFailure>,
    pub elapsed_seconds: f64,
    pub throughput_per_sec: f64,
    pub success: bool,
}

/// Inputs the orchestrator gathers for the report
pub struct RunSummary<'a> {
    pub algorithm: Algorithm,
    pub target_hash: &'a str,
    pub total_candidates: usize,
    pub chunks_enqueued: usize,
    pub elapsed: Duration,
}

impl Report {
    pub fn new(
        summary: RunSummary<'_>,
        matches: Vec<MatchRecord>,
        outcomes: &[WorkerOutcome],
        mut failures: Vec<WorkerFailure>,
    ) -> Self {
        let workers: Vec<WorkerReport> = outcomes
            .iter()
            .map(|outcome| WorkerReport {
                worker_id: outcome.stats.worker_id,
                state: outcome.state,
                items_processed: outcome.stats.items_processed,
                items_skipped: outcome.stats.items_skipped,
                chunks_processed: outcome.stats.chunks_processed,
                matches_found: outcome.stats.matches_found,
                elapsed_seconds: outcome.stats.elapsed.as_secs_f64(),
            })
            .collect();

        failures.extend(outcomes.iter().filter_map(|outcome| {
            outcome.error.as_ref().map(|e| WorkerFailure {
                worker_id: Some(outcome.stats.worker_id),
                error: e.to_string(),
            })
        }));

        let total_processed = workers.iter().map(|w| w.items_processed).sum();
        let total_skipped = workers.iter().map(|w| w.items_skipped).sum();
        let elapsed_seconds = summary.elapsed.as_secs_f64();
        let throughput_per_sec = if elapsed_seconds > 0.0 {
            total_processed as f64 / elapsed_seconds
        } else {
            0.0
        };

        Self {
            run_id: Uuid::new_v4().to_string(),
            algorithm: summary.algorithm,
            target_hash: summary.target_hash.to_string(),
            total_candidates: summary.total_candidates,
            chunks_enqueued: summary.chunks_enqueued,
            total_processed,
            total_skipped,
            total_matches: matches.len(),
            matches,
            workers,
            success: failures.is_empty(),
            failures,
            elapsed_seconds,
            throughput_per_sec,
        }
    }

    /// Write the report as pretty JSON, creating the parent directory if needed.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        crate::utils::ensure_parent_dir(path)?;
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)?;
        tracing::info!("Results saved to {}", path.display());
        Ok(())
    }
}

use super::store::{MatchKey, MatchRecord, ResultStore};
use crate::digest::{Digester, TargetDigest};
use crate::error::{PipelineError, Result};
use crate::parallel::{Chunk, ConsumerHandle, PermitPool, QueueItem, TaskQueue};
use crate::utils::Timer;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Lifecycle of a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Created,
    Running,
    /// Consumed its stop marker and exited normally
    Drained,
    /// Exited because of an error or its idle timeout
    Terminated,
}

/// Counters owned by one worker and handed over when it finishes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub worker_id: usize,
    pub items_processed: usize,
    pub items_skipped: usize,
    pub chunks_processed: usize,
    pub matches_found: usize,
    pub elapsed: Duration,
}

impl WorkerStats {
    pub fn new(worker_id: usize) -> Self {
        Self {
            worker_id,
            ..Default::default()
        }
    }
}

/// What a worker hands back to the orchestrator at join
#[derive(Debug)]
pub struct WorkerOutcome {
    pub stats: WorkerStats,
    pub state: WorkerState,
    pub error: Option<PipelineError>,
}

impl WorkerOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Shared handles every worker borrows from the orchestrator
#[derive(Clone, Copy)]
pub struct WorkerContext<'a> {
    pub queue: &'a TaskQueue,
    pub store: &'a ResultStore,
    pub permits: &'a PermitPool,
    pub target: &'a TargetDigest,
    pub poll_interval: Duration,
    pub timeout: Duration,
    pub pbkdf2_iterations: u32,
}

/// A single queue consumer
pub struct Worker<'a> {
    id: usize,
    ctx: WorkerContext<'a>,
    state: WorkerState,
    stats: WorkerStats,
    // Next match sequence number, unique within this worker
    sequence: u64,
}

impl<'a> Worker<'a> {
    pub fn new(id: usize, ctx: WorkerContext<'a>) -> Self {
        Self {
            id,
            ctx,
            state: WorkerState::Created,
            stats: WorkerStats::new(id),
            sequence: 0,
        }
    }

    /// Consume chunks until a stop marker arrives or the idle budget runs out.
    ///
    /// `consumer` is this worker's queue registration. It is released together
    /// with the permit when the worker returns or unwinds.
    pub fn run(mut self, consumer: ConsumerHandle<'_>) -> WorkerOutcome {
        let _consumer = consumer;
        let _permit = self.ctx.permits.acquire();

        let timer = Timer::start();
        self.state = WorkerState::Running;
        tracing::debug!("Worker {} started", self.id);

        let error = self.fetch_loop().err();
        self.stats.elapsed = timer.elapsed();

        match &error {
            None => {
                self.state = WorkerState::Drained;
                tracing::info!(
                    "Worker {} completed: {} processed, {} skipped, {} matches, {} chunks in {:.2}s",
                    self.id,
                    self.stats.items_processed,
                    self.stats.items_skipped,
                    self.stats.matches_found,
                    self.stats.chunks_processed,
                    self.stats.elapsed.as_secs_f64()
                );
            }
            Some(e) => {
                self.state = WorkerState::Terminated;
                tracing::error!("Worker {} terminated: {}", self.id, e);
            }
        }

        WorkerOutcome {
            stats: self.stats,
            state: self.state,
            error,
        }
    }

    fn fetch_loop(&mut self) -> Result<()> {
        let digester = Digester::for_target(self.ctx.target, self.ctx.pbkdf2_iterations)?;
        let mut idle = Duration::ZERO;

        loop {
            match self.ctx.queue.get(self.ctx.poll_interval) {
                Ok(QueueItem::Work(chunk)) => self.process_chunk(&digester, chunk)?,
                Ok(QueueItem::Stop) => {
                    tracing::debug!("Worker {} received stop signal", self.id);
                    return Ok(());
                }
                Err(PipelineError::QueueTimeout(waited)) => {
                    idle += waited;
                    if idle >= self.ctx.timeout {
                        return Err(PipelineError::WorkerTimeout {
                            worker_id: self.id,
                            items_processed: self.stats.items_processed,
                        });
                    }
                    tracing::debug!(
                        "Worker {} waiting for work ({:.1}s idle)",
                        self.id,
                        idle.as_secs_f64()
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn process_chunk(&mut self, digester: &Digester, chunk: Chunk) -> Result<()> {
        tracing::debug!(
            "Worker {} processing chunk {} ({} candidates)",
            self.id,
            chunk.id,
            chunk.len()
        );

        for candidate in &chunk.candidates {
            let text = match candidate.to_str() {
                Ok(text) => text,
                Err(e) => {
                    let skipped = PipelineError::MalformedCandidate {
                        chunk_id: chunk.id,
                        reason: e.to_string(),
                    };
                    tracing::warn!("Worker {} skipping candidate: {}", self.id, skipped);
                    self.stats.items_skipped += 1;
                    continue;
                }
            };

            let computed = digester.digest(candidate.as_bytes())?;
            self.stats.items_processed += 1;

            if self.ctx.target.matches(&computed) {
                let record = MatchRecord {
                    worker_id: self.id,
                    chunk_id: chunk.id,
                    original: text.to_string(),
                    hash: hex::encode(&computed),
                    algorithm: digester.algorithm(),
                    timestamp: unix_millis(),
                };
                tracing::info!(
                    "Worker {} found match: '{}' -> {}",
                    self.id,
                    record.original,
                    record.hash
                );

                self.ctx
                    .store
                    .insert(MatchKey::new(self.id, self.sequence), record)?;
                self.sequence += 1;
                self.stats.matches_found += 1;
            }
        }

        self.stats.chunks_processed += 1;
        Ok(())
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

use super::collector;
use super::receiver::CsvReceiver;
use super::report::{Report, RunSummary, WorkerFailure};
use super::store::ResultStore;
use super::worker::{Worker, WorkerContext, WorkerOutcome, WorkerState, WorkerStats};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::parallel::{Candidate, ConsumerHandle, PermitPool, TaskQueue, chunk};
use crate::utils::{Timer, format_duration};
use std::any::Any;
use std::path::Path;

/// Drives one cracking run from candidates to report
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Validates `config` up front so a bad snapshot never reaches `run`.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load candidates from a delimited file, then run.
    pub fn run_from_source(&self, path: &Path, receiver: &CsvReceiver) -> Result<Report> {
        let loaded = receiver.load(path)?;
        self.run(loaded.candidates)
    }

    /// Chunk `candidates`, fan them out to the worker pool and collect the matches.
    ///
    /// Validation problems are returned as errors before any thread is spawned.
    /// Worker failures do not abort the run; they are listed in the report.
    pub fn run(&self, candidates: Vec<Candidate>) -> Result<Report> {
        self.run_with(candidates, |id, ctx, consumer| {
            Worker::new(id, ctx).run(consumer)
        })
    }

    /// Same as [`Pipeline::run`] with `work` as the body of every worker thread.
    fn run_with<F>(&self, candidates: Vec<Candidate>, work: F) -> Result<Report>
    where
        F: for<'q> Fn(usize, WorkerContext<'q>, ConsumerHandle<'q>) -> WorkerOutcome + Sync,
    {
        let config = &self.config;
        config.validate()?;

        let timer = Timer::start();
        let total_candidates = candidates.len();
        let chunks = chunk(candidates, config.chunk_size)?;
        let chunk_count = chunks.len();

        let queue = TaskQueue::new(config.effective_queue_capacity())?;
        let store = ResultStore::new();
        let permits = PermitPool::new(config.effective_max_workers())?;

        tracing::info!(
            "Starting {} workers (at most {} active) on {} candidates in {} chunks using {}",
            config.worker_count,
            permits.capacity(),
            total_candidates,
            chunk_count,
            config.target.algorithm()
        );

        let ctx = WorkerContext {
            queue: &queue,
            store: &store,
            permits: &permits,
            target: &config.target,
            poll_interval: config.effective_poll_interval(),
            timeout: config.timeout,
            pbkdf2_iterations: config.pbkdf2_iterations,
        };
        // Workers log through whatever dispatcher is active on this thread
        let dispatch = tracing::dispatcher::get_default(|d| d.clone());
        let work = &work;

        let (outcomes, failures) = crossbeam::thread::scope(|s| {
            let mut handles = Vec::with_capacity(config.worker_count);
            let mut failures = Vec::new();

            for id in 0..config.worker_count {
                let consumer = queue.register_consumer();
                let dispatch = dispatch.clone();
                let spawned = s
                    .builder()
                    .name(format!("worker-{id}"))
                    .spawn(move |_| {
                        tracing::dispatcher::with_default(&dispatch, || work(id, ctx, consumer))
                    });

                match spawned {
                    Ok(handle) => handles.push((id, handle)),
                    Err(e) => {
                        tracing::error!("Failed to spawn worker {}: {}", id, e);
                        failures.push(WorkerFailure {
                            worker_id: Some(id),
                            error: format!("failed to spawn: {e}"),
                        });
                        break;
                    }
                }
            }

            // All chunks first, then one stop marker per running worker
            let filled = queue
                .put_many(chunks)
                .and_then(|_| queue.send_poison_pills(handles.len()));
            if let Err(e) = filled {
                tracing::error!("Could not enqueue all work: {}", e);
                failures.push(WorkerFailure {
                    worker_id: None,
                    error: e.to_string(),
                });
            }

            // Every handle is joined, so one failed worker never hides the others
            let outcomes: Vec<WorkerOutcome> = handles
                .into_iter()
                .map(|(id, handle)| join_outcome(id, handle.join()))
                .collect();

            (outcomes, failures)
        })
        .map_err(|_| std::io::Error::other("worker scope panicked"))?;

        let stats = queue.stats();
        tracing::debug!(
            "Queue: {} tasks added, {} taken, {} stop markers sent",
            stats.tasks_added,
            stats.tasks_taken,
            stats.pills_sent
        );

        let matches = collector::collect(&store);
        let report = Report::new(
            RunSummary {
                algorithm: config.target.algorithm(),
                target_hash: config.target.hex(),
                total_candidates,
                chunks_enqueued: stats.tasks_added,
                elapsed: timer.elapsed(),
            },
            matches,
            &outcomes,
            failures,
        );

        tracing::info!(
            "Processed {} candidates ({} skipped), {} matches in {} ({:.0} hashes/sec)",
            report.total_processed,
            report.total_skipped,
            report.total_matches,
            format_duration(report.elapsed_seconds),
            report.throughput_per_sec
        );
        if !report.success {
            tracing::warn!("{} failure(s) during the run", report.failures.len());
        }

        Ok(report)
    }
}

/// Turn a joined worker thread into its outcome. A panic becomes a
/// `Terminated` outcome carrying [`PipelineError::WorkerPanicked`].
fn join_outcome(id: usize, joined: std::thread::Result<WorkerOutcome>) -> WorkerOutcome {
    match joined {
        Ok(outcome) => outcome,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!("Worker {} panicked: {}", id, message);
            WorkerOutcome {
                stats: WorkerStats::new(id),
                state: WorkerState::Terminated,
                error: Some(PipelineError::WorkerPanicked {
                    worker_id: id,
                    message,
                }),
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::{Algorithm, TargetDigest};
    use std::time::Duration;

    const SHA256_TEST: &str = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";

    fn config(workers: usize) -> PipelineConfig {
        let target = TargetDigest::parse(Algorithm::Sha256, SHA256_TEST, None).unwrap();
        PipelineConfig::new(target)
            .with_workers(workers)
            .with_chunk_size(2)
            .with_timeout(Duration::from_secs(10))
            .with_poll_interval(Duration::from_millis(20))
    }

    fn candidates(items: &[&str]) -> Vec<Candidate> {
        items.iter().map(|s| Candidate::from(*s)).collect()
    }

    #[test]
    fn test_invalid_config_is_rejected_before_spawn() {
        assert!(matches!(
            Pipeline::new(config(0)),
            Err(PipelineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_run_finds_single_match() {
        let pipeline = Pipeline::new(config(2)).unwrap();
        let report = pipeline
            .run(candidates(&["test", "hello", "world"]))
            .unwrap();

        assert!(report.success);
        assert_eq!(report.total_candidates, 3);
        assert_eq!(report.chunks_enqueued, 2);
        assert_eq!(report.total_processed, 3);
        assert_eq!(report.total_matches, 1);
        assert_eq!(report.matches[0].original, "test");
        assert_eq!(report.matches[0].hash, SHA256_TEST);
        assert_eq!(report.workers.len(), 2);
        assert!(
            report
                .workers
                .iter()
                .all(|w| w.state == WorkerState::Drained)
        );
    }

    #[test]
    fn test_empty_input_still_terminates() {
        let report = Pipeline::new(config(3)).unwrap().run(Vec::new()).unwrap();
        assert!(report.success);
        assert_eq!(report.chunks_enqueued, 0);
        assert_eq!(report.total_processed, 0);
        assert_eq!(report.workers.len(), 3);
    }

    #[test]
    fn test_worker_events_reach_scoped_dispatcher() {
        use crate::logging::{LogConfig, LogLevel, Logger};

        let dir = tempfile::TempDir::new().unwrap();
        let logger = Logger::new(&LogConfig {
            path: dir.path().join("run.log"),
            level: LogLevel::Info,
            console: false,
        })
        .unwrap();

        tracing::dispatcher::with_default(logger.dispatch(), || {
            Pipeline::new(config(2))
                .unwrap()
                .run(candidates(&["a", "test", "b"]))
                .unwrap();
        });
        logger.flush().unwrap();

        let content = std::fs::read_to_string(logger.path()).unwrap();
        assert!(content.contains("found match: 'test'"));
        assert!(content.contains("worker-"));
        assert!(content.contains("Processed 3 candidates"));
    }

    #[test]
    fn test_join_outcome_converts_panics() {
        let (ok, panicked) = crossbeam::thread::scope(|s| {
            let ok = s.spawn(|_| WorkerOutcome {
                stats: WorkerStats::new(1),
                state: WorkerState::Drained,
                error: None,
            });
            let panicked = s.spawn(|_| -> WorkerOutcome { panic!("digest blew up") });
            (join_outcome(1, ok.join()), join_outcome(0, panicked.join()))
        })
        .unwrap();

        assert!(ok.is_success());
        assert_eq!(ok.state, WorkerState::Drained);

        assert!(!panicked.is_success());
        assert_eq!(panicked.state, WorkerState::Terminated);
        assert_eq!(panicked.stats.worker_id, 0);
        assert!(matches!(
            panicked.error,
            Some(PipelineError::WorkerPanicked { worker_id: 0, ref message }) if message == "digest blew up"
        ));
    }

    #[test]
    fn test_panicking_worker_leaves_siblings_and_matches_intact() {
        let pipeline = Pipeline::new(config(3)).unwrap();
        let report = pipeline
            .run_with(
                candidates(&["a", "test", "b", "c", "d", "e", "f"]),
                |id, ctx, consumer| {
                    if id == 0 {
                        panic!("worker 0 gave up");
                    }
                    Worker::new(id, ctx).run(consumer)
                },
            )
            .unwrap();

        assert!(!report.success);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].worker_id, Some(0));
        assert!(report.failures[0].error.contains("worker 0 gave up"));

        assert_eq!(report.workers.len(), 3);
        for worker in &report.workers {
            if worker.worker_id == 0 {
                assert_eq!(worker.state, WorkerState::Terminated);
                assert_eq!(worker.items_processed, 0);
            } else {
                assert_eq!(worker.state, WorkerState::Drained);
            }
        }

        // The surviving workers drained every chunk
        assert_eq!(report.chunks_enqueued, 4);
        assert_eq!(report.total_processed, 7);
        assert_eq!(report.total_matches, 1);
        assert_eq!(report.matches[0].original, "test");
    }

    #[test]
    fn test_panic_message_extraction() {
        let payload = std::panic::catch_unwind(|| panic!("boom {}", 1)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "boom 1");

        let payload = std::panic::catch_unwind(|| panic!("static")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "static");
    }
}

//! Error types for the cracking pipeline.
//!
//! Validation-stage errors (`InvalidArgument`, `Configuration`, `Source`) abort a
//! run before any worker is spawned. Worker-stage errors are isolated to the
//! worker that raised them and end up in the report's failure list.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while validating or running the pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Bad chunk size, worker count, or queue capacity
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Unsupported algorithm, malformed target digest, bad PBKDF2 parameters
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Unreadable candidate source
    #[error("Cannot read candidate source {path}: {reason}")]
    Source { path: String, reason: String },

    /// A worker waited longer than its cumulative idle budget
    #[error("Worker {worker_id} timed out after processing {items_processed} items")]
    WorkerTimeout {
        worker_id: usize,
        items_processed: usize,
    },

    /// A candidate that is not valid UTF-8
    #[error("Malformed candidate in chunk {chunk_id}: {reason}")]
    MalformedCandidate { chunk_id: usize, reason: String },

    /// No queue entry arrived within the poll interval
    #[error("Timed out waiting for a task after {0:?}")]
    QueueTimeout(std::time::Duration),

    /// Every registered consumer exited while items were still being enqueued
    #[error("No consumers left to receive chunk {chunk_id:?}")]
    NoConsumers { chunk_id: Option<usize> },

    /// The sending side of the queue is gone
    #[error("Task queue disconnected")]
    QueueDisconnected,

    /// A match key was inserted twice
    #[error("Duplicate match key: worker {worker_id}, sequence {sequence}")]
    DuplicateMatchKey { worker_id: usize, sequence: u64 },

    /// A worker thread panicked
    #[error("Worker {worker_id} panicked: {message}")]
    WorkerPanicked { worker_id: usize, message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// True for errors raised by configuration or input validation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PipelineError::InvalidArgument(_)
                | PipelineError::Configuration(_)
                | PipelineError::Source { .. }
        )
    }
}

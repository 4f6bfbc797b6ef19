//! Parallel execution primitives
//!
//! This module provides the building blocks the pipeline uses to fan work out
//! to a pool of worker threads. It knows nothing about digests or matches.
//!
//! # Architecture Responsibilities
//!
//! ## What This Module Does:
//! - **Work Splitting**: Cuts the candidate sequence into fixed-size [`Chunk`]s
//! - **Work Distribution**: A bounded crossbeam-backed [`TaskQueue`] carrying
//!   chunks and stop markers
//! - **Concurrency Limiting**: A [`PermitPool`] capping how many workers are
//!   active at the same time
//! - **Resource Discovery**: Picks a default worker count from the available cores
//!
//! ## What This Module Does NOT Do:
//! - **Domain Logic**: Hashing, comparison and result collection live in
//!   [`crate::pipeline`]
//!
//! ```text
//! ┌─────────────┐   chunks + Stop   ┌──────────────┐   permit   ┌─────────────┐
//! │ Orchestrator│──────────────────▶│  TaskQueue   │◀───────────│  Worker × N │
//! └─────────────┘                   └──────────────┘            └─────────────┘
//! ```
//!
//! # Example Usage
//!
//! ```rust
//! use hashcrack::parallel::{chunk, Candidate, QueueItem, TaskQueue};
//! use std::time::Duration;
//!
//! let chunks = chunk(vec![Candidate::from("a"), Candidate::from("b")], 1)?;
//! let queue = TaskQueue::new(4)?;
//! queue.put_many(chunks)?;
//! queue.send_poison_pills(1)?;
//!
//! assert!(matches!(queue.get(Duration::from_millis(10))?, QueueItem::Work(_)));
//! # Ok::<(), hashcrack::PipelineError>(())
//! ```

pub mod chunker;
pub mod permits;
pub mod queue;

pub use chunker::{Candidate, Chunk, chunk};
pub use permits::{Permit, PermitPool};
pub use queue::{ConsumerHandle, QueueItem, QueueStats, TaskQueue};

/// Default worker count: one per available core, never fewer than one
pub fn default_worker_count() -> usize {
    std::cmp::max(1, num_cpus::get())
}

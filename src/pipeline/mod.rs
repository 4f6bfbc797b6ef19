//! The cracking pipeline
//!
//! [`Pipeline`] splits the candidates into chunks, spawns a pool of named
//! worker threads inside a crossbeam scope and feeds them through a bounded
//! [`TaskQueue`](crate::parallel::TaskQueue). Each worker digests its chunks,
//! records matches in the shared [`ResultStore`] and stops when it takes its
//! stop marker off the queue. Once every worker is joined, the collector
//! snapshots the store and the run is summarized in a [`Report`].
//!
//! ```text
//! CsvReceiver ─▶ Pipeline ─▶ chunk() ─▶ TaskQueue ─▶ Worker × N ─▶ ResultStore
//!                                                                    │
//!                         Report ◀── collector::collect() ◀──────────┘
//! ```
//!
//! # Example Usage
//!
//! ```rust
//! use hashcrack::config::PipelineConfig;
//! use hashcrack::digest::{Algorithm, TargetDigest};
//! use hashcrack::parallel::Candidate;
//! use hashcrack::pipeline::Pipeline;
//!
//! let target = TargetDigest::parse(
//!     Algorithm::Sha256,
//!     "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08",
//!     None,
//! )?;
//! let pipeline = Pipeline::new(PipelineConfig::new(target).with_workers(2))?;
//! let report = pipeline.run(vec![Candidate::from("hello"), Candidate::from("test")])?;
//!
//! assert_eq!(report.total_matches, 1);
//! assert_eq!(report.matches[0].original, "test");
//! # Ok::<(), hashcrack::PipelineError>(())
//! ```

pub mod collector;
pub mod orchestrator;
pub mod receiver;
pub mod report;
pub mod store;
pub mod worker;

pub use orchestrator::Pipeline;
pub use receiver::{CsvReceiver, LoadedSource, SourceStats};
pub use report::{Report, WorkerFailure, WorkerReport};
pub use store::{MatchKey, MatchRecord, ResultStore};
pub use worker::{WorkerOutcome, WorkerState, WorkerStats};

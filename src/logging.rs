//! Process-wide logging to a file and the console.
//!
//! Built on `tracing`: the CLI creates one [`Logger`] before any worker starts,
//! installs it as the global dispatcher and keeps the returned [`LogGuard`]
//! alive until the report is written. Every event is written and flushed while
//! holding the file sink's lock, so concurrent workers never interleave
//! characters within a line and the file is current while a run is going.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::Dispatch;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;

/// Log severity threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(PipelineError::Configuration(format!(
                "Unknown log level '{other}'"
            ))),
        }
    }
}

/// Logger settings
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub path: PathBuf,
    pub level: LogLevel,
    /// Mirror events to stderr
    pub console: bool,
}

/// File sink shared by every thread. Each event gets the lock for the whole
/// write of its line.
#[derive(Clone)]
pub struct LineSink {
    file: Arc<Mutex<BufWriter<File>>>,
}

impl LineSink {
    pub fn open(path: &Path) -> Result<Self> {
        crate::utils::ensure_parent_dir(path)?;
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Arc::new(Mutex::new(BufWriter::new(file))),
        })
    }

    pub fn flush(&self) -> io::Result<()> {
        self.lock().flush()
    }

    fn lock(&self) -> MutexGuard<'_, BufWriter<File>> {
        self.file.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Writer handed to the formatter for a single event. The line is flushed
/// to the file when the event is done with it.
pub struct LockedLine<'a> {
    guard: MutexGuard<'a, BufWriter<File>>,
}

impl Drop for LockedLine<'_> {
    fn drop(&mut self) {
        let _ = self.guard.flush();
    }
}

impl Write for LockedLine<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.guard.write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.guard.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.guard.flush()
    }
}

impl<'a> MakeWriter<'a> for LineSink {
    type Writer = LockedLine<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LockedLine { guard: self.lock() }
    }
}

/// Configured logger, not yet installed
pub struct Logger {
    sink: LineSink,
    dispatch: Dispatch,
    path: PathBuf,
}

impl Logger {
    pub fn new(config: &LogConfig) -> Result<Self> {
        let sink = LineSink::open(&config.path)?;

        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(sink.clone())
            .with_ansi(false)
            .with_target(false)
            .with_thread_names(true)
            .with_filter(config.level.as_filter());

        // RUST_LOG takes precedence on the console, like the rest of the CLI
        let console_layer = config.console.then(|| {
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .without_time()
                .with_target(false)
                .with_filter(filter)
        });

        let subscriber = tracing_subscriber::registry()
            .with(file_layer)
            .with(console_layer);

        Ok(Self {
            sink,
            dispatch: Dispatch::new(subscriber),
            path: config.path.clone(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Dispatcher for scoped use with `tracing::dispatcher::with_default`.
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    pub fn flush(&self) -> Result<()> {
        Ok(self.sink.flush()?)
    }

    /// Make this logger the process-wide default. Fails if one is already set.
    pub fn install(self) -> Result<LogGuard> {
        tracing::dispatcher::set_global_default(self.dispatch).map_err(|e| {
            PipelineError::Configuration(format!("Logger already initialized: {e}"))
        })?;
        Ok(LogGuard { sink: self.sink })
    }
}

/// Flushes the log file when dropped
pub struct LogGuard {
    sink: LineSink,
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        let _ = self.sink.flush();
    }
}

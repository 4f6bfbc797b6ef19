//! Utility functions for hashcrack
//!
//! Small helpers shared by the pipeline and the CLI.

use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

/// Wall-clock stopwatch
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    started: Instant,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Format seconds as `12.34s`, `2m 3.00s` or `1h 2m 3.00s`
pub fn format_duration(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    if seconds < 60.0 {
        return format!("{seconds:.2}s");
    }

    let whole = seconds.trunc() as u64;
    let hours = whole / 3600;
    let minutes = (whole % 3600) / 60;
    let rest = seconds - (hours * 3600 + minutes * 60) as f64;

    if hours > 0 {
        format!("{hours}h {minutes}m {rest:.2}s")
    } else {
        format!("{minutes}m {rest:.2}s")
    }
}

/// Create the parent directory of `path` if it does not exist yet
pub fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Truncate string to specified length with ellipsis
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        "...".to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(12.344), "12.34s");
        assert_eq!(format_duration(123.0), "2m 3.00s");
        assert_eq!(format_duration(3723.0), "1h 2m 3.00s");
        assert_eq!(format_duration(-1.0), "0.00s");
    }

    #[test]
    fn test_timer_elapsed_grows() {
        let timer = Timer::start();
        std::thread::sleep(Duration::from_millis(5));
        let first = timer.elapsed();
        assert!(first >= Duration::from_millis(5));
        assert!(timer.elapsed() >= first);
    }

    #[test]
    fn test_ensure_parent_dir() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a").join("b").join("report.json");
        ensure_parent_dir(&file).unwrap();
        assert!(dir.path().join("a").join("b").is_dir());

        // Bare file names have no parent to create
        ensure_parent_dir(Path::new("report.json")).unwrap();
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("héllo wörld", 8), "héllo...");
        assert_eq!(truncate_string("hello", 2), "...");
    }
}

//! Run reporting: injectable log sink and summary types
//!
//! The merge/link core never touches the filesystem for logging; progress and
//! summary lines go through a [`LogSink`] chosen by the caller. The binary
//! wires up a file or stdout sink; tests use [`MemorySink`].

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Append-only sink for human-readable progress lines.
///
/// Logging has no effect on data correctness; a sink that drops every line is
/// a valid implementation.
pub trait LogSink: Send + Sync {
    fn line(&self, msg: &str);
}

/// Writes lines to standard output
#[derive(Debug, Default)]
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn line(&self, msg: &str) {
        println!("{}", msg);
    }
}

/// Appends lines to a file, truncated when the sink is opened
pub struct FileSink {
    file: Mutex<File>,
}

impl FileSink {
    /// Create the log file, truncating any previous run's log.
    pub fn create(path: &Path) -> std::io::Result<Self> {
        Ok(Self {
            file: Mutex::new(File::create(path)?),
        })
    }
}

impl LogSink for FileSink {
    fn line(&self, msg: &str) {
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{}", msg);
        }
    }
}

/// Collects lines in memory; for tests
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl LogSink for MemorySink {
    fn line(&self, msg: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(msg.to_string());
        }
    }
}

/// Before/after merge counts for one source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceStats {
    pub id: String,
    pub before: usize,
    pub after: usize,
}

/// Aggregate result of an indexing run.
///
/// The totals cover persisted records only: a source that fails to process
/// drops out of `entry_count`/`merged_count` and is listed in
/// `failed_sources` instead. `per_source` keeps every source's stats,
/// failed ones included.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Raw entry count before merging
    pub entry_count: usize,
    /// Entry count after merging
    pub merged_count: usize,
    pub per_source: Vec<SourceStats>,
    /// Ids of sources that failed to process; their files were not written
    pub failed_sources: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_collects_lines_in_order() {
        let sink = MemorySink::new();
        sink.line("first");
        sink.line("second");
        assert_eq!(sink.lines(), ["first", "second"]);
    }

    #[test]
    fn file_sink_truncates_previous_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        std::fs::write(&path, "stale\n").unwrap();

        let sink = FileSink::create(&path).unwrap();
        sink.line("fresh");
        drop(sink);

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fresh\n");
    }
}

// Wed Jan 21 2026 - Alex

use crate::discovery::MethodDescriptor;
use crate::facts::FactRecord;
use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Failed to write facts to {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
}

/// Receives facts during a batch and persists them. The orchestrator
/// loop, the exit guard and the watchdog all share one sink, so `flush`
/// must tolerate concurrent calls and repeated calls with nothing new
/// to write.
pub trait FactSink: Send + Sync {
    /// Opens the per-candidate section subsequent records belong to.
    fn begin_section(&self, candidate: &MethodDescriptor);

    fn emit(&self, record: FactRecord);

    /// Appends buffered lines to durable storage. An empty buffer is a
    /// no-op; a failed flush keeps the buffer for a later retry.
    fn flush(&self) -> Result<(), SinkError>;

    /// Total records emitted so far, flushed or not.
    fn emitted(&self) -> usize;
}

struct SinkState {
    buffer: Vec<String>,
    emitted: usize,
}

/// File-backed sink writing datalog facts one per line, each section
/// headed by a comment naming its candidate. Lines are appended, never
/// rewritten, so an interrupted batch leaves a usable prefix.
pub struct DatalogSink {
    path: PathBuf,
    state: Mutex<SinkState>,
}

impl DatalogSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: Mutex::new(SinkState {
                buffer: Vec::new(),
                emitted: 0,
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FactSink for DatalogSink {
    fn begin_section(&self, candidate: &MethodDescriptor) {
        self.state.lock().buffer.push(format!("% {}", candidate));
    }

    fn emit(&self, record: FactRecord) {
        let mut state = self.state.lock();
        state.buffer.push(record.render());
        state.emitted += 1;
    }

    // The lock is held across the whole append: a concurrent flush sees
    // either an empty buffer or all of it, never a prefix, and never
    // appends the same line twice.
    fn flush(&self) -> Result<(), SinkError> {
        let mut state = self.state.lock();
        if state.buffer.is_empty() {
            return Ok(());
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| SinkError::Io(self.path.clone(), e))?;
        let mut writer = BufWriter::new(file);
        for line in &state.buffer {
            writeln!(writer, "{}", line).map_err(|e| SinkError::Io(self.path.clone(), e))?;
        }
        writer
            .flush()
            .map_err(|e| SinkError::Io(self.path.clone(), e))?;

        state.buffer.clear();
        Ok(())
    }

    fn emitted(&self) -> usize {
        self.state.lock().emitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;
    use std::thread;

    fn record(arg: &str) -> FactRecord {
        FactRecord::new("invokes", vec![arg.to_string()])
    }

    fn candidate(method: &str) -> MethodDescriptor {
        MethodDescriptor::new(method, "()V", "com.example.FooTest")
    }

    #[test]
    fn test_repeated_flush_appends_nothing_new() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facts.pl");
        let sink = DatalogSink::new(&path);

        sink.emit(record("a"));
        sink.emit(record("b"));
        sink.flush().unwrap();
        let after_first = fs::read_to_string(&path).unwrap();

        sink.flush().unwrap();
        sink.flush().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), after_first);
        assert_eq!(after_first, "invokes(a).\ninvokes(b).\n");
        assert_eq!(sink.emitted(), 2);
    }

    #[test]
    fn test_sections_append_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facts.pl");
        let sink = DatalogSink::new(&path);

        sink.begin_section(&candidate("testFoo"));
        sink.emit(record("a"));
        sink.flush().unwrap();

        sink.begin_section(&candidate("testBar"));
        sink.emit(record("b"));
        sink.flush().unwrap();

        let lines: Vec<String> = fs::read_to_string(&path)
            .unwrap()
            .lines()
            .map(String::from)
            .collect();
        assert_eq!(
            lines,
            vec![
                "% com.example.FooTest.testFoo:()V",
                "invokes(a).",
                "% com.example.FooTest.testBar:()V",
                "invokes(b).",
            ]
        );
    }

    #[test]
    fn test_empty_flush_creates_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facts.pl");
        let sink = DatalogSink::new(&path);

        sink.flush().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_failed_flush_keeps_the_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("missing");
        let path = nested.join("facts.pl");
        let sink = DatalogSink::new(&path);

        sink.emit(record("a"));
        assert!(matches!(sink.flush(), Err(SinkError::Io(_, _))));

        fs::create_dir(&nested).unwrap();
        sink.flush().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "invokes(a).\n");
    }

    #[test]
    fn test_concurrent_flush_writes_each_record_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facts.pl");
        let sink = Arc::new(DatalogSink::new(&path));

        for i in 0..100 {
            sink.emit(record(&format!("m{}", i)));
        }

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let sink = sink.clone();
                thread::spawn(move || sink.flush().unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 100);
    }
}

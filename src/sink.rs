use parking_lot::Mutex;
use std::io::{self, Write};

/// Output stream a record is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Stdout,
    Stderr,
}

impl Target {
    /// Routing rule: anything above `Info` goes to the error stream.
    pub fn for_severity(severity: crate::Severity) -> Self {
        if severity.is_escalated() {
            Target::Stderr
        } else {
            Target::Stdout
        }
    }
}

/// Synchronous destination for encoded records.
///
/// The logger calls `write` on the thread that streams the record, once
/// per record, and never retries. Errors are swallowed by the logger.
pub trait LogSink: Send + Sync {
    /// Write one encoded record to `target`.
    ///
    /// **Returns**
    /// - `Ok(())` if the bytes were handed to the underlying stream.
    /// - `Err(..)` on an I/O failure. The record is lost.
    fn write(&self, target: Target, bytes: &[u8]) -> io::Result<()>;

    /// Flush any buffered output. Default implementation is a no-op.
    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

/// Writes to the process' standard output and error streams.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdioSink;

impl LogSink for StdioSink {
    fn write(&self, target: Target, bytes: &[u8]) -> io::Result<()> {
        match target {
            Target::Stdout => io::stdout().lock().write_all(bytes),
            Target::Stderr => io::stderr().lock().write_all(bytes),
        }
    }

    fn flush(&self) -> io::Result<()> {
        io::stdout().flush()?;
        io::stderr().flush()
    }
}

/// Keeps every record in memory, per target, in write order.
///
/// Meant for tests, including tests of applications asserting on their
/// own log output.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<(Target, Vec<u8>)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw records written to `target`.
    pub fn records(&self, target: Target) -> Vec<Vec<u8>> {
        self.records
            .lock()
            .iter()
            .filter(|(t, _)| *t == target)
            .map(|(_, bytes)| bytes.clone())
            .collect()
    }

    /// Records written to `target`, decoded as JSON. Records that are not
    /// valid JSON are skipped.
    pub fn json_records(&self, target: Target) -> Vec<serde_json::Value> {
        self.records(target)
            .iter()
            .filter_map(|bytes| serde_json::from_slice(bytes).ok())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl LogSink for MemorySink {
    fn write(&self, target: Target, bytes: &[u8]) -> io::Result<()> {
        self.records.lock().push((target, bytes.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Severity;

    #[test]
    fn routing_rule() {
        assert_eq!(Target::for_severity(Severity::Debug), Target::Stdout);
        assert_eq!(Target::for_severity(Severity::Info), Target::Stdout);
        assert_eq!(Target::for_severity(Severity::Warn), Target::Stderr);
        assert_eq!(Target::for_severity(Severity::Critical), Target::Stderr);
    }

    #[test]
    fn memory_sink_keeps_targets_apart() {
        let sink = MemorySink::new();
        sink.write(Target::Stdout, b"{\"a\":1}\n").unwrap();
        sink.write(Target::Stderr, b"not json").unwrap();

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.json_records(Target::Stdout).len(), 1);
        assert!(sink.json_records(Target::Stderr).is_empty());
        assert_eq!(sink.records(Target::Stderr), vec![b"not json".to_vec()]);

        sink.clear();
        assert!(sink.is_empty());
    }
}

use crate::sink::{LogSink, Target};
use std::io;

/// A sink that simply drops all records.
///
/// Useful for measuring the overhead of correlation and encoding without
/// any I/O, and for tests that don't care about output.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn write(&self, _target: Target, _bytes: &[u8]) -> io::Result<()> {
        Ok(())
    }
}

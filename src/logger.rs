use crate::decorator::{EntryDecorator, EntryDecorators, EventDecorator, EventDecorators};
use crate::encoder::{Encoder, JsonEncoder};
use crate::entry::LogEntry;
use crate::event::Event;
use crate::layer::SELF_TARGET;
use crate::severity::Severity;
use crate::sink::{LogSink, StdioSink, Target};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::Arc;

/// Encodes records and routes them to a sink; owns the decorator lists.
///
/// Exactly one logger is process-wide at a time (see [`set_global`]);
/// scopes may bind another through
/// [`Scope::with_logger`](crate::Scope::with_logger).
pub trait Logger: Send + Sync {
    fn stream_log_entry(&self, entry: &LogEntry);
    fn stream_event(&self, event: &Event);

    fn set_encoder(&self, encoder: Arc<dyn Encoder>);

    fn set_event_decorators(&self, decorators: Vec<Arc<dyn EventDecorator>>);
    fn event_decorators(&self) -> EventDecorators;

    fn set_entry_decorators(&self, decorators: Vec<Arc<dyn EntryDecorator>>);
    fn entry_decorators(&self) -> EntryDecorators;

    /// Flush buffered output, if any. Default implementation is a no-op.
    fn flush(&self) {}
}

struct Inner {
    encoder: Arc<dyn Encoder>,
    event_decorators: EventDecorators,
    entry_decorators: EntryDecorators,
}

/// Standard [`Logger`]: JSON to stdout/stderr unless configured otherwise.
///
/// Encoder and decorator lists sit behind one lock, held only to read or
/// swap them. Encoding and writing happen outside the lock.
pub struct DefaultLogger {
    inner: RwLock<Inner>,
    sink: Arc<dyn LogSink>,
}

impl Default for DefaultLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultLogger {
    pub fn new() -> Self {
        Self::with_sink(Arc::new(StdioSink))
    }

    pub fn with_sink(sink: Arc<dyn LogSink>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                encoder: Arc::new(JsonEncoder),
                event_decorators: Arc::from(Vec::new()),
                entry_decorators: Arc::from(Vec::new()),
            }),
            sink,
        }
    }

    /// Builder-style variant of [`Logger::set_encoder`].
    pub fn encoder(self, encoder: Arc<dyn Encoder>) -> Self {
        self.set_encoder(encoder);
        self
    }

    fn current_encoder(&self) -> Arc<dyn Encoder> {
        Arc::clone(&self.inner.read().encoder)
    }

    fn write(&self, severity: Severity, encoded: Result<Vec<u8>, crate::EncodeError>) {
        let bytes = match encoded {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(target: SELF_TARGET, error = %e, "dropping record that failed to encode");
                return;
            }
        };

        if let Err(e) = self.sink.write(Target::for_severity(severity), &bytes) {
            tracing::debug!(target: SELF_TARGET, error = %e, "log sink write failed, record lost");
        }
    }
}

impl Logger for DefaultLogger {
    fn stream_log_entry(&self, entry: &LogEntry) {
        let encoded = self.current_encoder().encode_log_entry(entry);
        self.write(entry.severity(), encoded);
    }

    fn stream_event(&self, event: &Event) {
        let encoded = self.current_encoder().encode_event(event);
        self.write(event.severity(), encoded);
    }

    fn set_encoder(&self, encoder: Arc<dyn Encoder>) {
        self.inner.write().encoder = encoder;
    }

    fn set_event_decorators(&self, decorators: Vec<Arc<dyn EventDecorator>>) {
        self.inner.write().event_decorators = Arc::from(decorators);
    }

    fn event_decorators(&self) -> EventDecorators {
        Arc::clone(&self.inner.read().event_decorators)
    }

    fn set_entry_decorators(&self, decorators: Vec<Arc<dyn EntryDecorator>>) {
        self.inner.write().entry_decorators = Arc::from(decorators);
    }

    fn entry_decorators(&self) -> EntryDecorators {
        Arc::clone(&self.inner.read().entry_decorators)
    }

    fn flush(&self) {
        if let Err(e) = self.sink.flush() {
            tracing::debug!(target: SELF_TARGET, error = %e, "log sink flush failed");
        }
    }
}

static GLOBAL: Lazy<RwLock<Arc<dyn Logger>>> =
    Lazy::new(|| RwLock::new(Arc::new(DefaultLogger::new())));

/// Replace the process-wide logger as a whole.
pub fn set_global(logger: Arc<dyn Logger>) {
    *GLOBAL.write() = logger;
}

/// The current process-wide logger.
pub fn global() -> Arc<dyn Logger> {
    Arc::clone(&GLOBAL.read())
}

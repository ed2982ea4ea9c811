use crate::event::Event;
use crate::logger::{self, Logger};
use std::fmt;
use std::sync::Arc;

/// Span and trace identifiers supplied by a distributed-tracing integration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    pub trace_id: String,
    pub span_id: String,
    pub sampled: bool,
}

/// Explicit correlation handle threaded through a unit of work.
///
/// A scope returned by [`new_event`](crate::event::new_event) carries that
/// event; entries logged against it attach to the event instead of being
/// streamed right away. Scopes are cheap to clone and every derivation
/// produces an independent value.
#[derive(Clone, Default)]
pub struct Scope {
    event: Option<Arc<Event>>,
    logger: Option<Arc<dyn Logger>>,
    trace: Option<TraceContext>,
}

impl Scope {
    /// Empty scope: no event, process-wide logger.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a scope that streams through `logger` instead of the
    /// process-wide one.
    pub fn with_logger(&self, logger: Arc<dyn Logger>) -> Self {
        Self { logger: Some(logger), ..self.clone() }
    }

    pub fn with_trace(&self, trace: TraceContext) -> Self {
        Self { trace: Some(trace), ..self.clone() }
    }

    /// Same logger and trace, no event.
    pub fn detached(&self) -> Self {
        Self { event: None, ..self.clone() }
    }

    /// Bound logger, or the process-wide one.
    pub fn logger(&self) -> Arc<dyn Logger> {
        match &self.logger {
            Some(logger) => Arc::clone(logger),
            None => logger::global(),
        }
    }

    pub fn trace(&self) -> Option<&TraceContext> {
        self.trace.as_ref()
    }

    pub fn has_event(&self) -> bool {
        self.event.is_some()
    }

    pub(crate) fn event(&self) -> Option<&Arc<Event>> {
        self.event.as_ref()
    }

    pub(crate) fn with_event(&self, event: Arc<Event>) -> Self {
        Self { event: Some(event), ..self.clone() }
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("event", &self.event.as_ref().map(|ev| ev.message().to_owned()))
            .field("bound_logger", &self.logger.is_some())
            .field("trace", &self.trace)
            .finish()
    }
}

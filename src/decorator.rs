use crate::entry::LogEntry;
use crate::event::Event;
use crate::scope::Scope;
use serde_json::Value;
use std::sync::Arc;

/// Field key for a span identifier.
pub const SPAN_ID_KEY: &str = "span_id";
/// Field key for a trace identifier.
pub const TRACE_ID_KEY: &str = "trace_id";
/// Field key for the trace sampling decision.
pub const TRACE_SAMPLED_KEY: &str = "trace_sampled";
/// Field key for the id of the current `tracing` span.
pub const TRACING_SPAN_KEY: &str = "tracing_span_id";

/// Hook applied to every new [`Event`] right after construction.
pub trait EventDecorator: Send + Sync {
    fn decorate(&self, scope: &Scope, event: &Event);
}

/// Hook applied to every [`LogEntry`] when its severity call runs.
pub trait EntryDecorator: Send + Sync {
    fn decorate(&self, scope: &Scope, entry: &LogEntry);
}

impl<F> EventDecorator for F
where
    F: Fn(&Scope, &Event) + Send + Sync,
{
    fn decorate(&self, scope: &Scope, event: &Event) {
        self(scope, event)
    }
}

impl<F> EntryDecorator for F
where
    F: Fn(&Scope, &LogEntry) + Send + Sync,
{
    fn decorate(&self, scope: &Scope, entry: &LogEntry) {
        self(scope, entry)
    }
}

/// Ordered, immutable decorator list. Replaced as a whole, never edited.
pub type EventDecorators = Arc<[Arc<dyn EventDecorator>]>;
pub type EntryDecorators = Arc<[Arc<dyn EntryDecorator>]>;

/// Adds a fixed set of fields to every event (own fields) or entry.
#[derive(Debug, Clone)]
pub struct StaticFields {
    fields: Vec<(String, Value)>,
}

impl StaticFields {
    pub fn new<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self {
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl EventDecorator for StaticFields {
    fn decorate(&self, _scope: &Scope, event: &Event) {
        for (key, value) in &self.fields {
            event.set(key.as_str(), value.clone());
        }
    }
}

impl EntryDecorator for StaticFields {
    fn decorate(&self, _scope: &Scope, entry: &LogEntry) {
        for (key, value) in &self.fields {
            entry.fields().add(key.as_str(), value.clone());
        }
    }
}

/// Copies the scope's [`TraceContext`](crate::scope::TraceContext) onto
/// events and entries.
///
/// On events the span id is an own field while the trace id and sampling
/// flag are labels, so every child of the event carries them too.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceFields;

impl EventDecorator for TraceFields {
    fn decorate(&self, scope: &Scope, event: &Event) {
        let Some(trace) = scope.trace() else {
            return;
        };
        event
            .set(SPAN_ID_KEY, trace.span_id.as_str())
            .set_label(TRACE_ID_KEY, trace.trace_id.as_str())
            .set_label(TRACE_SAMPLED_KEY, trace.sampled);
    }
}

impl EntryDecorator for TraceFields {
    fn decorate(&self, scope: &Scope, entry: &LogEntry) {
        let Some(trace) = scope.trace() else {
            return;
        };
        entry.fields().add(SPAN_ID_KEY, trace.span_id.as_str());
        entry.fields().add(TRACE_ID_KEY, trace.trace_id.as_str());
    }
}

/// Records the id of the `tracing` span that is current on this thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSpanFields;

impl TracingSpanFields {
    fn current_span_id() -> Option<u64> {
        tracing::Span::current().id().map(|id| id.into_u64())
    }
}

impl EventDecorator for TracingSpanFields {
    fn decorate(&self, _scope: &Scope, event: &Event) {
        if let Some(id) = Self::current_span_id() {
            event.set(TRACING_SPAN_KEY, id);
        }
    }
}

impl EntryDecorator for TracingSpanFields {
    fn decorate(&self, _scope: &Scope, entry: &LogEntry) {
        if let Some(id) = Self::current_span_id() {
            entry.fields().add(TRACING_SPAN_KEY, id);
        }
    }
}

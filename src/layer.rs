use crate::entry::LogEntry;
use crate::field::FieldCollection;
use crate::logger::Logger;
use crate::scope::Scope;
use crate::severity::Severity;
use serde_json::Value;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// Target of this crate's own diagnostics. Never forwarded.
pub(crate) const SELF_TARGET: &str = "event_log_sink";

/// `tracing_subscriber` layer that turns `tracing` events into standalone
/// [`LogEntry`]s.
///
/// The event level maps onto a [`Severity`], the `message` field becomes
/// the entry message and every other field becomes an entry field, next to
/// a `target` field. Entries are streamed synchronously; they never attach
/// to an [`Event`](crate::Event) since `tracing` carries no scope.
#[derive(Default)]
pub struct EventLogLayer {
    logger: Option<Arc<dyn Logger>>,
}

impl EventLogLayer {
    /// Layer streaming through the process-wide logger current at the time
    /// of each event.
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer streaming through `logger`.
    pub fn with_logger(logger: Arc<dyn Logger>) -> Self {
        Self { logger: Some(logger) }
    }

    fn scope(&self) -> Scope {
        match &self.logger {
            Some(logger) => Scope::background().with_logger(Arc::clone(logger)),
            None => Scope::background(),
        }
    }
}

impl<S> Layer<S> for EventLogLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if meta.target() == SELF_TARGET {
            return;
        }

        let entry = LogEntry::new().with("target", meta.target());
        let mut message = None;
        let mut visitor = FieldVisitor { fields: entry.fields(), message: &mut message };
        event.record(&mut visitor);

        entry.log_at(&self.scope(), Severity::from(*meta.level()), message.unwrap_or_default());
    }
}

struct FieldVisitor<'a> {
    fields: &'a FieldCollection,
    message: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.fields.add(field.name(), value);
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.add(field.name(), value);
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.add(field.name(), value);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.add(field.name(), Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.add(field.name(), value);
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.fields.add(field.name(), format!("{:?}", value));
        }
    }
}

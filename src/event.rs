use crate::entry::LogEntry;
use crate::field::{Field, FieldCollection, FieldPolicy};
use crate::layer::SELF_TARGET;
use crate::logger::Logger;
use crate::scope::Scope;
use crate::severity::{Severity, SeverityRatchet};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::Value;
use std::panic::Location;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const UNNAMED_EVENT: &str = "Unnamed event";

/// A unit of work correlating the entries logged within it.
///
/// Severity starts at `Info` and only rises, either when a child entry
/// above the current level attaches or when the event ends. Fields live
/// in three buckets, one per [`FieldPolicy`]. Call [`Event::end`] (or hold
/// an [`EventGuard`]) to stream the children followed by the event.
pub struct Event {
    message: String,
    timestamp: DateTime<Utc>,
    started: Instant,
    severity: SeverityRatchet,
    children: Mutex<Vec<LogEntry>>,
    fields: FieldCollection,
    err_fields: FieldCollection,
    labels: FieldCollection,
    finalized: AtomicBool,
    logger: Arc<dyn Logger>,
}

/// Open a new event against `scope`.
///
/// Registered event decorators run before this returns. The returned scope
/// carries the event; pass it to everything that should log into it.
pub fn new_event(scope: &Scope, message: impl Into<String>) -> (Scope, Arc<Event>) {
    let logger = scope.logger();
    let event = Arc::new(Event {
        message: message.into(),
        timestamp: Utc::now(),
        started: Instant::now(),
        severity: SeverityRatchet::new(Severity::Info),
        children: Mutex::new(Vec::new()),
        fields: FieldCollection::new(),
        err_fields: FieldCollection::new(),
        labels: FieldCollection::new(),
        finalized: AtomicBool::new(false),
        logger: Arc::clone(&logger),
    });

    for decorator in logger.event_decorators().iter() {
        decorator.decorate(scope, &event);
    }

    (scope.with_event(Arc::clone(&event)), event)
}

impl Event {
    /// Own field, emitted with the event only.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> &Self {
        self.fields.add(key, value);
        self
    }

    /// Field emitted only if the event ends above `Info`.
    pub fn set_on_err(&self, key: impl Into<String>, value: impl Into<Value>) -> &Self {
        self.err_fields.add(key, value);
        self
    }

    /// Field emitted with the event and stamped onto every child at `end()`,
    /// overwriting a same-named child field.
    pub fn set_label(&self, key: impl Into<String>, value: impl Into<Value>) -> &Self {
        self.labels.add(key, value);
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn severity(&self) -> Severity {
        self.severity.get()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized.load(Ordering::Acquire)
    }

    /// Children attached and not yet streamed.
    pub fn child_count(&self) -> usize {
        self.children.lock().len()
    }

    pub fn bucket(&self, policy: FieldPolicy) -> &FieldCollection {
        match policy {
            FieldPolicy::Always => &self.fields,
            FieldPolicy::OnEscalation => &self.err_fields,
            FieldPolicy::Propagated => &self.labels,
        }
    }

    pub fn fields(&self) -> &FieldCollection {
        &self.fields
    }

    pub fn err_fields(&self) -> &FieldCollection {
        &self.err_fields
    }

    pub fn labels(&self) -> &FieldCollection {
        &self.labels
    }

    /// Buckets that are part of the output at the current severity.
    ///
    /// Empty buckets are skipped.
    pub fn emitted_fields(&self) -> Vec<(FieldPolicy, Vec<Field>)> {
        self.emitted_fields_at(self.severity())
    }

    /// Buckets that are part of the output at `severity`.
    ///
    /// Encoders read the severity once and pass it here, so the `severity`
    /// key and the bucket selection always agree.
    pub fn emitted_fields_at(&self, severity: Severity) -> Vec<(FieldPolicy, Vec<Field>)> {
        FieldPolicy::ALL
            .into_iter()
            .filter(|policy| policy.is_emitted(severity))
            .map(|policy| (policy, self.bucket(policy).snapshot()))
            .filter(|(_, fields)| !fields.is_empty())
            .collect()
    }

    /// Finalize the event: stamp labels onto the children, stream them in
    /// attachment order, then stream the event.
    ///
    /// Only the first call does anything. A concurrent second caller
    /// returns immediately without waiting for the first to finish.
    pub fn end(&self) {
        if self
            .finalized
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        // Attaches after the latch see `finalized` under this lock and drop
        // their entry, so the vector taken here is complete.
        let children = std::mem::take(&mut *self.children.lock());

        let propagated: Vec<&FieldCollection> = FieldPolicy::ALL
            .into_iter()
            .filter(|policy| policy.propagates())
            .map(|policy| self.bucket(policy))
            .filter(|bucket| !bucket.is_empty())
            .collect();

        for entry in &children {
            for bucket in &propagated {
                entry.fields().merge(bucket);
            }
            self.severity.raise(entry.severity());
            self.logger.stream_log_entry(entry);
        }

        self.logger.stream_event(self);
    }

    /// Guard that ends the event when dropped.
    pub fn guard(self: &Arc<Self>) -> EventGuard {
        EventGuard(Arc::clone(self))
    }

    /// Defer `entry` until `end()`. Entries arriving after `end()` started
    /// are dropped.
    pub(crate) fn attach(&self, mut entry: LogEntry) {
        let mut children = self.children.lock();
        if self.is_finalized() {
            tracing::debug!(target: SELF_TARGET, event = %self.message, "entry logged into an ended event, dropped");
            return;
        }
        entry.mark_attached();
        self.severity.raise(entry.severity());
        children.push(entry);
    }

    pub(crate) fn raise_severity(&self, severity: Severity) {
        self.severity.raise(severity);
    }
}

impl std::fmt::Debug for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("message", &self.message)
            .field("timestamp", &self.timestamp)
            .field("severity", &self.severity())
            .field("children", &self.child_count())
            .field("fields", &self.fields)
            .field("err_fields", &self.err_fields)
            .field("labels", &self.labels)
            .field("finalized", &self.is_finalized())
            .finish()
    }
}

/// Ends the wrapped event on drop.
#[derive(Debug)]
pub struct EventGuard(Arc<Event>);

impl EventGuard {
    pub fn event(&self) -> &Arc<Event> {
        &self.0
    }
}

impl Drop for EventGuard {
    fn drop(&mut self) {
        self.0.end();
    }
}

/// [`Event::set`] on the event carried by `scope`.
///
/// When `scope` carries no event, an "Unnamed event" is created ad hoc
/// with severity `Warn`, and an `Error` entry naming the call site is
/// streamed so the omission is visible. Chain further setters on the
/// returned handle; they all apply to the same event.
#[track_caller]
pub fn set(scope: &Scope, key: impl Into<String>, value: impl Into<Value>) -> Arc<Event> {
    let event = event_from_scope(scope, Location::caller());
    event.set(key, value);
    event
}

/// [`Event::set_on_err`] on the event carried by `scope`; see [`set`] for
/// the missing-event fallback.
#[track_caller]
pub fn set_on_err(scope: &Scope, key: impl Into<String>, value: impl Into<Value>) -> Arc<Event> {
    let event = event_from_scope(scope, Location::caller());
    event.set_on_err(key, value);
    event
}

/// [`Event::set_label`] on the event carried by `scope`; see [`set`] for
/// the missing-event fallback.
#[track_caller]
pub fn set_label(scope: &Scope, key: impl Into<String>, value: impl Into<Value>) -> Arc<Event> {
    let event = event_from_scope(scope, Location::caller());
    event.set_label(key, value);
    event
}

fn event_from_scope(scope: &Scope, caller: &'static Location<'static>) -> Arc<Event> {
    if let Some(event) = scope.event() {
        return Arc::clone(event);
    }

    let (_, event) = new_event(scope, UNNAMED_EVENT);
    event.raise_severity(Severity::Warn);

    let caller = caller.to_string();
    LogEntry::new().with("caller_name", caller.as_str()).errorf(
        &scope.detached(),
        format_args!("Called ({caller}) but there was no event found in scope"),
    );

    event
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::DefaultLogger;
    use crate::sink::{MemorySink, Target};
    use serde_json::json;

    fn capture() -> (Scope, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let logger = Arc::new(DefaultLogger::with_sink(sink.clone()));
        (Scope::background().with_logger(logger), sink)
    }

    #[test]
    fn new_event_starts_at_info() {
        let (scope, _sink) = capture();
        let (derived, event) = new_event(&scope, "Ooops!");

        assert_eq!(event.severity(), Severity::Info);
        assert_eq!(event.message(), "Ooops!");
        assert!(event.fields().is_empty());
        assert!(event.err_fields().is_empty());
        assert!(event.labels().is_empty());
        assert!(Arc::ptr_eq(derived.event().unwrap(), &event));
        assert!(!scope.has_event());
    }

    #[test]
    fn setters_fill_their_buckets() {
        let (scope, _sink) = capture();
        let (scope, event) = new_event(&scope, "buckets");

        set(&scope, "set_key", "set_value");
        set_on_err(&scope, "error_key", "error_value");
        set_label(&scope, "label_key", "label_value");

        assert_eq!(event.fields().retrieve("set_key"), Some(json!("set_value")));
        assert_eq!(event.err_fields().retrieve("error_key"), Some(json!("error_value")));
        assert_eq!(event.labels().retrieve("label_key"), Some(json!("label_value")));

        event.set("a", 1).set_on_err("b", 2).set_label("c", 3);
        assert_eq!(event.fields().len(), 2);
        assert_eq!(event.err_fields().len(), 2);
        assert_eq!(event.labels().len(), 2);
    }

    #[test]
    fn end_streams_children_then_event() {
        let (scope, sink) = capture();
        let (scope, event) = new_event(&scope, "checkout");
        LogEntry::new().info(&scope, "one");
        LogEntry::new().debug(&scope, "two");
        event.end();

        let records = sink.json_records(Target::Stdout);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["message"], "one");
        assert_eq!(records[1]["message"], "two");
        assert_eq!(records[2]["message"], "checkout");
        assert!(event.is_finalized());
    }

    #[test]
    fn end_twice_streams_once() {
        let (scope, sink) = capture();
        let (scope, event) = new_event(&scope, "twice");
        LogEntry::new().info(&scope, "child");
        event.end();
        event.end();

        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn empty_event_is_still_streamed() {
        let (scope, sink) = capture();
        let (_scope, event) = new_event(&scope, "empty");
        event.end();

        let records = sink.json_records(Target::Stdout);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["message"], "empty");
    }

    #[test]
    fn labels_overwrite_child_fields() {
        let (scope, sink) = capture();
        let (scope, event) = new_event(&scope, "labels");
        LogEntry::new().with("tenant", "child").info(&scope, "entry");
        event.set_label("tenant", "event");
        event.end();

        let records = sink.json_records(Target::Stdout);
        assert_eq!(records[0]["tenant"], "event");
        assert_eq!(records[1]["labels"]["tenant"], "event");
    }

    #[test]
    fn missing_event_falls_back_to_unnamed() {
        let (scope, sink) = capture();

        let event = set(&scope, "k", "v");
        event.set_label("l", 1);

        assert_eq!(event.message(), UNNAMED_EVENT);
        assert_eq!(event.severity(), Severity::Warn);
        assert_eq!(event.fields().retrieve("k"), Some(json!("v")));
        assert_eq!(event.labels().retrieve("l"), Some(json!(1)));

        let diagnostics = sink.json_records(Target::Stderr);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0]["severity"], "ERROR");
        let caller = diagnostics[0]["caller_name"].as_str().unwrap();
        assert!(caller.contains("event.rs"), "unexpected caller {caller}");

        event.end();
        let records = sink.json_records(Target::Stderr);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["severity"], "WARN");
    }

    #[test]
    fn guard_ends_on_drop() {
        let (scope, sink) = capture();
        let (_scope, event) = new_event(&scope, "guarded");
        {
            let _guard = event.guard();
        }
        assert!(event.is_finalized());
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn late_children_have_no_effect() {
        let (scope, sink) = capture();
        let (scope, event) = new_event(&scope, "late");
        event.end();
        LogEntry::new().error(&scope, "too late");
        event.end();

        assert_eq!(sink.len(), 1);
        assert_eq!(event.child_count(), 0);
        assert_eq!(event.severity(), Severity::Info);
    }

    #[test]
    fn end_releases_children() {
        let (scope, _sink) = capture();
        let (scope, event) = new_event(&scope, "drained");
        LogEntry::new().info(&scope, "one");
        LogEntry::new().info(&scope, "two");
        assert_eq!(event.child_count(), 2);

        event.end();
        assert_eq!(event.child_count(), 0);
    }

    #[test]
    fn emitted_fields_follow_given_severity() {
        let (scope, _sink) = capture();
        let (_scope, event) = new_event(&scope, "pinned");
        event.set("k", 1).set_on_err("err", 2);

        let at_info: Vec<_> = event
            .emitted_fields_at(Severity::Info)
            .into_iter()
            .map(|(policy, _)| policy)
            .collect();
        assert_eq!(at_info, vec![FieldPolicy::Always]);

        let at_error: Vec<_> = event
            .emitted_fields_at(Severity::Error)
            .into_iter()
            .map(|(policy, _)| policy)
            .collect();
        assert_eq!(at_error, vec![FieldPolicy::Always, FieldPolicy::OnEscalation]);
    }
}

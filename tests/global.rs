//! The process-wide logger is shared state, so everything touching it
//! lives in this single test.

use event_log_sink::decorator::{EntryDecorators, EventDecorators};
use event_log_sink::*;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

/// Records what it is asked to stream instead of encoding it.
#[derive(Default)]
struct MockLogger {
    entries: Mutex<Vec<(String, Severity)>>,
    events: Mutex<Vec<(String, Severity)>>,
    event_decorators: Mutex<Vec<Arc<dyn EventDecorator>>>,
    entry_decorators: Mutex<Vec<Arc<dyn EntryDecorator>>>,
}

impl Logger for MockLogger {
    fn stream_log_entry(&self, entry: &LogEntry) {
        self.entries.lock().push((entry.message().to_owned(), entry.severity()));
    }

    fn stream_event(&self, event: &Event) {
        self.events.lock().push((event.message().to_owned(), event.severity()));
    }

    fn set_encoder(&self, _encoder: Arc<dyn Encoder>) {}

    fn set_event_decorators(&self, decorators: Vec<Arc<dyn EventDecorator>>) {
        *self.event_decorators.lock() = decorators;
    }

    fn event_decorators(&self) -> EventDecorators {
        Arc::from(self.event_decorators.lock().clone())
    }

    fn set_entry_decorators(&self, decorators: Vec<Arc<dyn EntryDecorator>>) {
        *self.entry_decorators.lock() = decorators;
    }

    fn entry_decorators(&self) -> EntryDecorators {
        Arc::from(self.entry_decorators.lock().clone())
    }
}

#[test]
fn global_logger_is_swapped_whole() {
    let mock = Arc::new(MockLogger::default());
    let defaults: Arc<dyn EventDecorator> =
        Arc::new(StaticFields::new([("example_event_id", json!("example_event_value"))]));
    mock.set_event_decorators(vec![defaults]);
    set_global(mock.clone());

    let scope = Scope::background();
    let (scope, event) = new_event(&scope, "A new test logger instance");
    debug(&scope, "Debug called");
    debugf(&scope, format_args!("Debugf with ({}) called", "argument"));
    with("logger_key", "logger_value").info(&scope, "Info With");
    event.end();
    info(&Scope::background(), "standalone");

    assert_eq!(
        event.fields().retrieve("example_event_id"),
        Some(json!("example_event_value"))
    );
    assert_eq!(
        *mock.entries.lock(),
        vec![
            ("Debug called".to_owned(), Severity::Debug),
            ("Debugf with (argument) called".to_owned(), Severity::Debug),
            ("Info With".to_owned(), Severity::Info),
            ("standalone".to_owned(), Severity::Info),
        ]
    );
    assert_eq!(
        *mock.events.lock(),
        vec![("A new test logger instance".to_owned(), Severity::Info)]
    );

    // An event keeps streaming through the logger it was created with.
    let (scope, pending) = new_event(&Scope::background(), "pending");
    let sink = Arc::new(MemorySink::new());
    let config = LoggerConfig::default();
    set_global(Arc::new(config.build_with_sink(sink.clone())));
    warn(&scope, "late child");
    pending.end();
    info(&Scope::background(), "after swap");

    assert_eq!(mock.events.lock().len(), 2);
    assert_eq!(sink.json_records(Target::Stdout).len(), 1);
}

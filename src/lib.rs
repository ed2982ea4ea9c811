//! Structured logging that correlates log entries into events.
//!
//! An [`Event`] is opened with [`new_event`] against a [`Scope`]; entries
//! logged against the returned scope become its children. The event's
//! severity rises with its children, and [`Event::end`] streams every
//! child followed by the event itself through the scope's [`Logger`].
//! Entries logged against a scope without an event are streamed at once.
//!
//! ```no_run
//! use event_log_sink::{new_event, with, Scope};
//!
//! let (scope, event) = new_event(&Scope::background(), "checkout");
//! with("user", "42").info(&scope, "step1");
//! event.set_label("request_id", "abc").set_on_err("retryCount", 3);
//! event.end();
//! ```

pub mod decorator;
pub mod encoder;
pub mod entry;
pub mod env;
pub mod error;
pub mod event;
pub mod field;
pub mod init;
pub mod layer;
pub mod logger;
pub mod noop_sink;
pub mod scope;
pub mod severity;
pub mod sink;

pub use decorator::{EntryDecorator, EventDecorator, StaticFields, TraceFields, TracingSpanFields};
pub use encoder::{CloudEncoder, Encoder, JsonEncoder, TerminalEncoder};
pub use entry::LogEntry;
pub use error::{ConfigError, EncodeError, InitError};
pub use event::{new_event, set, set_label, set_on_err, Event, EventGuard};
pub use field::{Field, FieldCollection, FieldPolicy};
pub use init::{init, init_with_config, install_tracing_bridge, Format, LoggerConfig};
pub use layer::EventLogLayer;
pub use logger::{global, set_global, DefaultLogger, Logger};
pub use noop_sink::NoopSink;
pub use scope::{Scope, TraceContext};
pub use severity::Severity;
pub use sink::{LogSink, MemorySink, StdioSink, Target};

use serde_json::Value;
use std::fmt;

/// Start an entry with one field; chain more with [`LogEntry::with`].
pub fn with(key: impl Into<String>, value: impl Into<Value>) -> LogEntry {
    LogEntry::new().with(key, value)
}

pub fn debug(scope: &Scope, message: impl Into<String>) {
    LogEntry::new().debug(scope, message)
}

pub fn debugf(scope: &Scope, args: fmt::Arguments<'_>) {
    LogEntry::new().debugf(scope, args)
}

pub fn info(scope: &Scope, message: impl Into<String>) {
    LogEntry::new().info(scope, message)
}

pub fn infof(scope: &Scope, args: fmt::Arguments<'_>) {
    LogEntry::new().infof(scope, args)
}

pub fn warn(scope: &Scope, message: impl Into<String>) {
    LogEntry::new().warn(scope, message)
}

pub fn warnf(scope: &Scope, args: fmt::Arguments<'_>) {
    LogEntry::new().warnf(scope, args)
}

pub fn error(scope: &Scope, message: impl Into<String>) {
    LogEntry::new().error(scope, message)
}

pub fn errorf(scope: &Scope, args: fmt::Arguments<'_>) {
    LogEntry::new().errorf(scope, args)
}

/// Log at `Critical` and exit the process with status 1.
pub fn fatal(scope: &Scope, message: impl Into<String>) -> ! {
    LogEntry::new().fatal(scope, message)
}

/// Formatted variant of [`fatal`].
pub fn fatalf(scope: &Scope, args: fmt::Arguments<'_>) -> ! {
    LogEntry::new().fatalf(scope, args)
}

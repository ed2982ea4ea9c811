use crate::field::FieldCollection;
use crate::scope::Scope;
use crate::severity::Severity;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;

/// A single log statement.
///
/// Built with [`LogEntry::new`] or [`with`](crate::with), optionally
/// enriched through [`LogEntry::with`], and consumed by one of the
/// severity calls. When the scope carries an event the entry becomes one
/// of its children and is streamed when the event ends; otherwise it is
/// streamed right away.
#[derive(Debug)]
pub struct LogEntry {
    message: String,
    timestamp: DateTime<Utc>,
    severity: Severity,
    fields: FieldCollection,
    attached: bool,
}

impl Default for LogEntry {
    fn default() -> Self {
        Self::new()
    }
}

impl LogEntry {
    pub fn new() -> Self {
        Self {
            message: String::new(),
            timestamp: Utc::now(),
            severity: Severity::Debug,
            fields: FieldCollection::new(),
            attached: false,
        }
    }

    /// Add a field and hand the entry back for further chaining.
    pub fn with(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.add(key, value);
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Own fields. Decorators write through this.
    pub fn fields(&self) -> &FieldCollection {
        &self.fields
    }

    /// Whether the entry was handed to an enclosing event.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn debug(self, scope: &Scope, message: impl Into<String>) {
        self.log_at(scope, Severity::Debug, message.into());
    }

    pub fn debugf(self, scope: &Scope, args: fmt::Arguments<'_>) {
        self.log_at(scope, Severity::Debug, args.to_string());
    }

    pub fn info(self, scope: &Scope, message: impl Into<String>) {
        self.log_at(scope, Severity::Info, message.into());
    }

    pub fn infof(self, scope: &Scope, args: fmt::Arguments<'_>) {
        self.log_at(scope, Severity::Info, args.to_string());
    }

    pub fn warn(self, scope: &Scope, message: impl Into<String>) {
        self.log_at(scope, Severity::Warn, message.into());
    }

    pub fn warnf(self, scope: &Scope, args: fmt::Arguments<'_>) {
        self.log_at(scope, Severity::Warn, args.to_string());
    }

    pub fn error(self, scope: &Scope, message: impl Into<String>) {
        self.log_at(scope, Severity::Error, message.into());
    }

    pub fn errorf(self, scope: &Scope, args: fmt::Arguments<'_>) {
        self.log_at(scope, Severity::Error, args.to_string());
    }

    /// Stream the entry at `Critical` and terminate the process.
    ///
    /// The entry is written immediately even if the scope carries an
    /// event: that event never ends, so deferring would lose the record.
    /// Nothing else is flushed.
    pub fn fatal(self, scope: &Scope, message: impl Into<String>) -> ! {
        self.log_fatal(scope, message.into())
    }

    pub fn fatalf(self, scope: &Scope, args: fmt::Arguments<'_>) -> ! {
        self.log_fatal(scope, args.to_string())
    }

    pub(crate) fn log_at(mut self, scope: &Scope, severity: Severity, message: String) {
        self.prepare(scope, severity, message);

        match scope.event() {
            Some(event) => event.attach(self),
            None => scope.logger().stream_log_entry(&self),
        }
    }

    fn log_fatal(mut self, scope: &Scope, message: String) -> ! {
        self.prepare(scope, Severity::Critical, message);

        if let Some(event) = scope.event() {
            event.raise_severity(Severity::Critical);
        }
        let logger = scope.logger();
        logger.stream_log_entry(&self);
        logger.flush();

        std::process::exit(1)
    }

    fn prepare(&mut self, scope: &Scope, severity: Severity, message: String) {
        self.message = message;
        self.severity = severity;

        // Decorators see an empty bag; fields given through `with` are
        // merged back afterwards and win collisions.
        let user_fields = std::mem::take(&mut self.fields);
        for decorator in scope.logger().entry_decorators().iter() {
            decorator.decorate(scope, self);
        }
        self.fields.merge(&user_fields);
    }

    pub(crate) fn mark_attached(&mut self) {
        self.attached = true;
    }
}

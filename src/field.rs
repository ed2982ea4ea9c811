use crate::severity::Severity;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;

/// A single key/value pair taken out of a [`FieldCollection`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: String,
    pub value: Value,
}

/// Concurrency-safe key/value bag shared by entries and events.
///
/// Keys are unique and the last write wins. Snapshots carry no ordering
/// guarantee.
#[derive(Debug, Default)]
pub struct FieldCollection {
    inner: Mutex<HashMap<String, Value>>,
}

impl FieldCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value` under `key`, overwriting any previous value.
    pub fn add(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.inner.lock().insert(key.into(), value.into());
    }

    /// Copy every pair of `other` into `self`; `other` wins on collision.
    pub fn merge(&self, other: &FieldCollection) {
        // Snapshot first so merging a collection into itself cannot deadlock.
        let incoming = other.snapshot();
        let mut map = self.inner.lock();
        for field in incoming {
            map.insert(field.key, field.value);
        }
    }

    /// Value stored under `key`, or `None` when absent.
    pub fn retrieve(&self, key: &str) -> Option<Value> {
        self.inner.lock().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Materialize all current pairs.
    pub fn snapshot(&self) -> Vec<Field> {
        self.inner
            .lock()
            .iter()
            .map(|(key, value)| Field { key: key.clone(), value: value.clone() })
            .collect()
    }
}

/// Lifetime policy of an event field bucket.
///
/// Evaluated when an event is encoded, against its final severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldPolicy {
    /// Emitted with the event, never passed down.
    Always,
    /// Emitted only when the event ends above `Info`.
    OnEscalation,
    /// Emitted with the event and merged into every child entry at `end()`.
    Propagated,
}

impl FieldPolicy {
    pub const ALL: [FieldPolicy; 3] = [
        FieldPolicy::Always,
        FieldPolicy::OnEscalation,
        FieldPolicy::Propagated,
    ];

    pub fn is_emitted(self, severity: Severity) -> bool {
        match self {
            FieldPolicy::OnEscalation => severity.is_escalated(),
            FieldPolicy::Always | FieldPolicy::Propagated => true,
        }
    }

    pub fn propagates(self) -> bool {
        matches!(self, FieldPolicy::Propagated)
    }
}

use super::{json_line, to_map, Encoder};
use crate::entry::LogEntry;
use crate::error::EncodeError;
use crate::event::Event;
use crate::field::FieldPolicy;
use crate::severity::Severity;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

/// One JSON object per line. The default encoder.
///
/// Entry fields are flattened next to `message`, `timestamp` and
/// `severity`, which win on collision. Event buckets are nested under
/// `fields`, `errors` and `labels`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

pub(crate) fn rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn bucket_key(policy: FieldPolicy) -> &'static str {
    match policy {
        FieldPolicy::Always => "fields",
        FieldPolicy::OnEscalation => "errors",
        FieldPolicy::Propagated => "labels",
    }
}

impl JsonEncoder {
    pub(crate) fn entry_object(entry: &LogEntry) -> Map<String, Value> {
        let mut object = to_map(entry.fields().snapshot());
        object.insert("message".into(), entry.message().into());
        object.insert("timestamp".into(), rfc3339(entry.timestamp()).into());
        object.insert("severity".into(), entry.severity().as_str().into());
        object
    }

    pub(crate) fn event_buckets(event: &Event, severity: Severity) -> Map<String, Value> {
        let mut object = Map::new();
        for (policy, fields) in event.emitted_fields_at(severity) {
            object.insert(bucket_key(policy).into(), Value::Object(to_map(fields)));
        }
        object
    }
}

impl Encoder for JsonEncoder {
    fn encode_log_entry(&self, entry: &LogEntry) -> Result<Vec<u8>, EncodeError> {
        json_line(&Self::entry_object(entry))
    }

    fn encode_event(&self, event: &Event) -> Result<Vec<u8>, EncodeError> {
        let severity = event.severity();
        let mut object = Self::event_buckets(event, severity);
        object.insert("message".into(), event.message().into());
        object.insert("timestamp".into(), rfc3339(event.timestamp()).into());
        object.insert("elapsed".into(), format!("{:?}", event.elapsed()).into());
        object.insert("severity".into(), severity.as_str().into());
        json_line(&object)
    }
}

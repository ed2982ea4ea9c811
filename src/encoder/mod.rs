//! Serialization strategies consumed by [`DefaultLogger`](crate::DefaultLogger).

mod cloud;
mod json;
mod terminal;

pub use cloud::{project_id, CloudEncoder};
pub use json::JsonEncoder;
pub use terminal::TerminalEncoder;

use crate::entry::LogEntry;
use crate::error::EncodeError;
use crate::event::Event;
use crate::field::Field;
use serde_json::{Map, Value};

/// Turns entries and events into output bytes.
///
/// Entries project message, timestamp, textual severity and own fields.
/// Events additionally project their emitted field buckets (see
/// [`Event::emitted_fields_at`], called with the severity read once for the
/// whole record) and the time elapsed since creation.
pub trait Encoder: Send + Sync {
    fn encode_log_entry(&self, entry: &LogEntry) -> Result<Vec<u8>, EncodeError>;
    fn encode_event(&self, event: &Event) -> Result<Vec<u8>, EncodeError>;
}

pub(crate) fn to_map(fields: Vec<Field>) -> Map<String, Value> {
    fields.into_iter().map(|f| (f.key, f.value)).collect()
}

/// Serialize `object` as one JSON line.
pub(crate) fn json_line(object: &Map<String, Value>) -> Result<Vec<u8>, EncodeError> {
    let mut out = serde_json::to_vec(object)?;
    out.push(b'\n');
    Ok(out)
}

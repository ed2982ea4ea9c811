use super::json::JsonEncoder;
use super::{to_map, Encoder};
use crate::entry::LogEntry;
use crate::error::EncodeError;
use crate::event::Event;
use crate::severity::Severity;
use chrono::Local;
use serde_json::{Map, Value};
use std::fmt::Write;

const TIME_FORMAT: &str = "%Y/%m/%d - %H:%M:%S";

/// Human-readable single-line output for local development.
///
/// `2024/01/31 - 09:15:02\t INFO\t message | {"key":"value"}`
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalEncoder;

fn line(severity: Severity, message: &str, payload: &Map<String, Value>) -> Result<Vec<u8>, EncodeError> {
    let payload = serde_json::to_string(payload)?;
    let mut out = String::with_capacity(message.len() + payload.len() + 40);
    writeln!(
        out,
        "{}\t {}\t {} | {}",
        Local::now().format(TIME_FORMAT),
        severity,
        message,
        payload
    )?;
    Ok(out.into_bytes())
}

impl Encoder for TerminalEncoder {
    fn encode_log_entry(&self, entry: &LogEntry) -> Result<Vec<u8>, EncodeError> {
        let payload = to_map(entry.fields().snapshot());
        line(entry.severity(), entry.message(), &payload)
    }

    fn encode_event(&self, event: &Event) -> Result<Vec<u8>, EncodeError> {
        let severity = event.severity();
        let mut payload = JsonEncoder::event_buckets(event, severity);
        payload.insert("elapsed".into(), format!("{:?}", event.elapsed()).into());
        line(severity, event.message(), &payload)
    }
}

use super::json::rfc3339;
use super::{json_line, Encoder};
use crate::decorator::{SPAN_ID_KEY, TRACE_ID_KEY, TRACE_SAMPLED_KEY};
use crate::entry::LogEntry;
use crate::env::{env_non_empty, EVENT_LOG_PROJECT_ID_ENV, GCP_PROJECT_ENVS};
use crate::error::EncodeError;
use crate::event::Event;
use crate::field::FieldPolicy;
#[cfg(feature = "gcp-metadata")]
use crate::layer::SELF_TARGET;
use crate::scope::Scope;
use once_cell::sync::Lazy;
use serde_json::{Map, Value};

const SPAN_ID_OUT: &str = "logging.googleapis.com/spanId";
const TRACE_OUT: &str = "logging.googleapis.com/trace";
const TRACE_SAMPLED_OUT: &str = "logging.googleapis.com/trace_sampled";
const LABELS_OUT: &str = "logging.googleapis.com/labels";

static PROJECT_ID: Lazy<String> = Lazy::new(|| match detect_project_id() {
    Some(id) => id,
    None => {
        LogEntry::new().error(
            &Scope::background(),
            "Unable to extract the GCP project ID from the env, your logs might not be displayed correctly in Cloud Logging",
        );
        String::new()
    }
});

/// Cloud Logging project id, detected once per process.
///
/// Checks `EVENT_LOG_PROJECT_ID`, then the variables Google Cloud runtimes
/// set, then (with the `gcp-metadata` feature) the metadata server. When
/// nothing is found an `Error` entry is logged and the id is empty.
pub fn project_id() -> &'static str {
    PROJECT_ID.as_str()
}

fn detect_project_id() -> Option<String> {
    std::iter::once(EVENT_LOG_PROJECT_ID_ENV)
        .chain(GCP_PROJECT_ENVS)
        .find_map(env_non_empty)
        .or_else(metadata_project_id)
}

#[cfg(feature = "gcp-metadata")]
fn metadata_project_id() -> Option<String> {
    const URL: &str = "http://metadata.google.internal/computeMetadata/v1/project/project-id";

    // The blocking client must not run on an async runtime thread.
    let lookup = std::thread::spawn(|| -> Result<String, reqwest::Error> {
        reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(2))
            .build()?
            .get(URL)
            .header("Metadata-Flavor", "Google")
            .send()?
            .error_for_status()?
            .text()
    });

    match lookup.join() {
        Ok(Ok(id)) if !id.trim().is_empty() => Some(id.trim().to_string()),
        Ok(Ok(_)) => None,
        Ok(Err(e)) => {
            tracing::debug!(target: SELF_TARGET, error = %e, "metadata server project id lookup failed");
            None
        }
        Err(_) => None,
    }
}

#[cfg(not(feature = "gcp-metadata"))]
fn metadata_project_id() -> Option<String> {
    None
}

/// JSON shaped for Cloud Logging structured logs.
///
/// Span/trace fields are lifted into the `logging.googleapis.com/*` keys,
/// with the trace rendered as `projects/{project}/traces/{trace}`.
#[derive(Debug, Clone)]
pub struct CloudEncoder {
    project_id: String,
}

impl Default for CloudEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl CloudEncoder {
    /// Encoder using the detected [`project_id`].
    pub fn new() -> Self {
        Self::with_project_id(project_id())
    }

    pub fn with_project_id(project_id: impl Into<String>) -> Self {
        Self { project_id: project_id.into() }
    }

    fn trace_path(&self, trace_id: &Value) -> String {
        let trace_id = match trace_id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        format!("projects/{}/traces/{}", self.project_id, trace_id)
    }

    /// Output key and value for a tracing field, `None` for anything else.
    fn lift(&self, key: &str, value: &Value) -> Option<(&'static str, Value)> {
        match key {
            SPAN_ID_KEY => Some((SPAN_ID_OUT, value.clone())),
            TRACE_ID_KEY => Some((TRACE_OUT, Value::String(self.trace_path(value)))),
            TRACE_SAMPLED_KEY => Some((TRACE_SAMPLED_OUT, value.clone())),
            _ => None,
        }
    }
}

fn bucket_key(policy: FieldPolicy) -> &'static str {
    match policy {
        FieldPolicy::Always => "fields",
        FieldPolicy::OnEscalation => "errors",
        FieldPolicy::Propagated => LABELS_OUT,
    }
}

impl Encoder for CloudEncoder {
    fn encode_log_entry(&self, entry: &LogEntry) -> Result<Vec<u8>, EncodeError> {
        let mut object = Map::new();
        for field in entry.fields().snapshot() {
            match self.lift(&field.key, &field.value) {
                Some((key, value)) => object.insert(key.into(), value),
                None => object.insert(field.key, field.value),
            };
        }

        object.insert("message".into(), entry.message().into());
        object.insert("timestamp".into(), rfc3339(entry.timestamp()).into());
        object.insert("severity".into(), entry.severity().as_str().into());
        json_line(&object)
    }

    fn encode_event(&self, event: &Event) -> Result<Vec<u8>, EncodeError> {
        let severity = event.severity();
        let mut object = Map::new();
        for (policy, fields) in event.emitted_fields_at(severity) {
            let mut bucket = Map::new();
            for field in fields {
                match self.lift(&field.key, &field.value) {
                    Some((key, value)) => object.insert(key.into(), value),
                    None => bucket.insert(field.key, field.value),
                };
            }
            if !bucket.is_empty() {
                object.insert(bucket_key(policy).into(), Value::Object(bucket));
            }
        }

        object.insert("message".into(), event.message().into());
        object.insert("timestamp".into(), rfc3339(event.timestamp()).into());
        object.insert(
            "latencySeconds".into(),
            format!("{}s", event.elapsed().as_secs_f64()).into(),
        );
        object.insert("severity".into(), severity.as_str().into());
        json_line(&object)
    }
}

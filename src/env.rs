//! Environment variable names used by this crate for configuring the
//! process-wide logger.
//!
//! These are purely helpers; the core types remain decoupled from
//! environment access.

/// Output format of the process-wide logger: `json`, `terminal` or `cloud`.
pub const EVENT_LOG_FORMAT_ENV: &str = "EVENT_LOG_FORMAT";

/// Explicit Cloud Logging project id, taking precedence over detection.
pub const EVENT_LOG_PROJECT_ID_ENV: &str = "EVENT_LOG_PROJECT_ID";

/// Variables set by Google Cloud runtimes, checked in order when the
/// project id is detected from the environment.
pub const GCP_PROJECT_ENVS: [&str; 3] = ["GOOGLE_CLOUD_PROJECT", "GCP_PROJECT", "GCLOUD_PROJECT"];

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read an environment variable, treating an empty value as unset.
pub fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

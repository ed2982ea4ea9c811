use crate::encoder::{CloudEncoder, Encoder, JsonEncoder, TerminalEncoder};
use crate::env::{env_non_empty, env_or, EVENT_LOG_FORMAT_ENV, EVENT_LOG_PROJECT_ID_ENV};
use crate::error::{ConfigError, InitError};
use crate::layer::{EventLogLayer, SELF_TARGET};
use crate::logger::{self, DefaultLogger, Logger};
use crate::sink::LogSink;
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Output format of a [`DefaultLogger`].
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// One JSON object per line (default).
    #[default]
    Json,
    /// Human-readable console lines.
    Terminal,
    /// Cloud Logging structured JSON.
    Cloud,
}

impl FromStr for Format {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "terminal" | "console" => Ok(Format::Terminal),
            "cloud" | "stackdriver" => Ok(Format::Cloud),
            _ => Err(ConfigError::UnknownFormat(s.to_string())),
        }
    }
}

/// Configuration of the process-wide logger.
///
/// **Fields**
/// - `format`: which [`Encoder`] the logger uses.
/// - `project_id`: Cloud Logging project used by [`Format::Cloud`]; when
///   `None` the project id is detected from the environment.
///
/// ```toml
/// [log]
/// format = "cloud"
/// project_id = "my-project"
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggerConfig {
    pub format: Format,
    pub project_id: Option<String>,
}

impl LoggerConfig {
    /// Read `EVENT_LOG_FORMAT` and `EVENT_LOG_PROJECT_ID`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            format: env_or(EVENT_LOG_FORMAT_ENV, "json").parse()?,
            project_id: env_non_empty(EVENT_LOG_PROJECT_ID_ENV),
        })
    }

    pub fn encoder(&self) -> Arc<dyn Encoder> {
        match self.format {
            Format::Json => Arc::new(JsonEncoder),
            Format::Terminal => Arc::new(TerminalEncoder),
            Format::Cloud => match &self.project_id {
                Some(id) => Arc::new(CloudEncoder::with_project_id(id.as_str())),
                None => Arc::new(CloudEncoder::new()),
            },
        }
    }

    /// Build a logger writing to stdout/stderr.
    pub fn build(&self) -> DefaultLogger {
        DefaultLogger::new().encoder(self.encoder())
    }

    /// Build a logger writing to `sink`.
    pub fn build_with_sink(&self, sink: Arc<dyn LogSink>) -> DefaultLogger {
        DefaultLogger::with_sink(sink).encoder(self.encoder())
    }
}

/// Install a logger built from `config` as the process-wide logger and
/// return it, so decorators can be registered on it.
pub fn init_with_config(config: &LoggerConfig) -> Arc<dyn Logger> {
    let logger: Arc<dyn Logger> = Arc::new(config.build());
    logger::set_global(Arc::clone(&logger));
    tracing::debug!(target: SELF_TARGET, format = ?config.format, "installed process-wide logger");
    logger
}

/// Configure the process-wide logger from the environment.
///
/// Equivalent to [`init_with_config`] with [`LoggerConfig::from_env`].
pub fn init() -> Result<Arc<dyn Logger>, InitError> {
    let config = LoggerConfig::from_env()?;
    Ok(init_with_config(&config))
}

/// Install a global `tracing` subscriber forwarding `tracing` events into
/// the process-wide logger as standalone entries.
///
/// **Effects**
///
/// This installs a [`Registry`] combined with [`EventLogLayer`] as the
/// global default subscriber, so all `tracing` events in the process
/// (except this crate's own diagnostics) end up in the same output as
/// entries and events.
pub fn install_tracing_bridge() -> Result<(), InitError> {
    let subscriber = Registry::default().with(EventLogLayer::new());
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

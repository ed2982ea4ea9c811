/// Error returned by an [`Encoder`](crate::encoder::Encoder).
///
/// Never reaches logging callers: the logger drops the record instead.
#[derive(thiserror::Error, Debug)]
pub enum EncodeError {
    #[error("failed to serialize record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to format record: {0}")]
    Format(#[from] std::fmt::Error),
}

/// Error type returned when building a configuration.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown log format {0:?} (expected json, terminal or cloud)")]
    UnknownFormat(String),
}

/// Error type returned by the `init` helpers.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("a global tracing subscriber is already installed")]
    SubscriberAlreadySet(#[from] tracing::subscriber::SetGlobalDefaultError),
}

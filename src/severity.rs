use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Severity of a [`LogEntry`](crate::entry::LogEntry) or an
/// [`Event`](crate::event::Event).
///
/// Variants are declared in ascending order so the derived `Ord` gives
/// `Debug < Info < Warn < Error < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum Severity {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
    Critical = 4,
}

impl Severity {
    /// Canonical uppercase text used by every encoder.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }

    /// Whether records of this severity are routed to the error stream.
    pub fn is_escalated(&self) -> bool {
        *self > Severity::Info
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Debug,
            1 => Self::Info,
            2 => Self::Warn,
            3 => Self::Error,
            _ => Self::Critical,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<tracing::Level> for Severity {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE | tracing::Level::DEBUG => Severity::Debug,
            tracing::Level::INFO => Severity::Info,
            tracing::Level::WARN => Severity::Warn,
            tracing::Level::ERROR => Severity::Error,
        }
    }
}

/// Severity that can only ever be raised.
#[derive(Debug)]
pub(crate) struct SeverityRatchet(AtomicU8);

impl SeverityRatchet {
    pub(crate) fn new(initial: Severity) -> Self {
        Self(AtomicU8::new(initial as u8))
    }

    pub(crate) fn get(&self) -> Severity {
        Severity::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Raise to `severity` if it is higher than the current value.
    pub(crate) fn raise(&self, severity: Severity) {
        self.0.fetch_max(severity as u8, Ordering::AcqRel);
    }
}

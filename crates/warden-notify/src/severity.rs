//! Ordered severity scale.

use serde::{Deserialize, Serialize};

/// Severity levels, most severe first. Lower index = more severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Severity {
    /// The full scale in severity order.
    pub const ALL: [Severity; 6] = [
        Severity::Fatal,
        Severity::Error,
        Severity::Warn,
        Severity::Info,
        Severity::Debug,
        Severity::Trace,
    ];

    /// Position in the scale.
    pub fn index(self) -> usize {
        match self {
            Severity::Fatal => 0,
            Severity::Error => 1,
            Severity::Warn => 2,
            Severity::Info => 3,
            Severity::Debug => 4,
            Severity::Trace => 5,
        }
    }

    /// Parse a level name. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Severity> {
        match name {
            "fatal" => Some(Severity::Fatal),
            "error" => Some(Severity::Error),
            "warn" => Some(Severity::Warn),
            "info" => Some(Severity::Info),
            "debug" => Some(Severity::Debug),
            "trace" => Some(Severity::Trace),
            _ => None,
        }
    }

    /// Scale position of a level name, if recognized.
    pub fn index_of(name: &str) -> Option<usize> {
        Self::parse(name).map(Severity::index)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Fatal => write!(f, "fatal"),
            Severity::Error => write!(f, "error"),
            Severity::Warn => write!(f, "warn"),
            Severity::Info => write!(f, "info"),
            Severity::Debug => write!(f, "debug"),
            Severity::Trace => write!(f, "trace"),
        }
    }
}

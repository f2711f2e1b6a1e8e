//! Log severities and level gating

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Severity of a log call
///
/// Ordered from least to most verbose: `Error < Info < Debug`. A configured
/// minimum severity lets through every call at or below it, so `Error` is
/// never suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    #[default]
    Error = 0,
    Info = 1,
    Debug = 2,
}

/// Returned by the strict [`FromStr`] parser
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown severity name: {0:?}")]
pub struct UnknownSeverity(pub String);

impl Severity {
    /// Severities in flush order
    pub const FLUSH_ORDER: [Severity; 3] = [Severity::Info, Severity::Error, Severity::Debug];

    /// Parse a severity name case-insensitively, falling back to `Error`
    ///
    /// Unrecognised names select Error-only logging rather than failing.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }

    /// Upper-case name of this severity
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
        }
    }

    /// Whether a call at `requested` passes a gate configured with `self`
    pub fn allows(&self, requested: Severity) -> bool {
        requested <= *self
    }
}

impl FromStr for Severity {
    type Err = UnknownSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ERROR" => Ok(Severity::Error),
            "INFO" => Ok(Severity::Info),
            "DEBUG" => Ok(Severity::Debug),
            _ => Err(UnknownSeverity(s.to_string())),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Log level definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a log record
///
/// Levels are ordered, so a logger configured at `Warn` drops `Debug` and
/// `Info` records.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Voluminous diagnostics, usually disabled in production
    Debug = 1,
    /// Default logging priority
    #[default]
    Info = 2,
    /// More important than info, but no individual human review needed
    Warn = 3,
    /// High-priority records; a healthy application emits none
    Error = 4,
    /// Logged, flushed, then the process exits
    Fatal = 5,
}

/// Names accepted by [`Level::from_str`], in severity order
pub const VALID_LEVELS: &str = "debug, info, warn, error, fatal";

impl Level {
    /// Lowercase name as written into records
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid log level: {input} (valid: {})", VALID_LEVELS)]
pub struct ParseLevelError {
    input: String,
}

impl ParseLevelError {
    /// The rejected input, unchanged
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "fatal" => Ok(Level::Fatal),
            _ => Err(ParseLevelError {
                input: s.to_string(),
            }),
        }
    }
}

//! Output destination selection

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where records are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputType {
    /// Standard output
    Stdout,
    /// A file with size/age/count rotation
    File,
}

impl OutputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputType::Stdout => "stdout",
            OutputType::File => "file",
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("output must be stdout or file (got: {input})")]
pub struct ParseOutputError {
    input: String,
}

impl ParseOutputError {
    /// The rejected input, unchanged
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl FromStr for OutputType {
    type Err = ParseOutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdout" => Ok(OutputType::Stdout),
            "file" => Ok(OutputType::File),
            _ => Err(ParseOutputError {
                input: s.to_string(),
            }),
        }
    }
}

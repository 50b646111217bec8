//! Appender trait for log output destinations

use super::{error::Result, record::LogRecord};

/// A sink that encodes and writes records
///
/// The logger serializes calls to a single appender, so an implementation
/// only has to write each record completely or not at all.
pub trait Appender: Send {
    fn append(&mut self, record: &LogRecord) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}

//! Standard output appender

use crate::core::{Appender, LogRecord, Result};
use std::io::Write;

/// Writes one JSON line per record to standard output
///
/// Each line is written with the stdout lock held, so records from other
/// writers in the process cannot split it.
#[derive(Debug, Default)]
pub struct StdoutAppender;

impl StdoutAppender {
    pub fn new() -> Self {
        Self
    }
}

impl Appender for StdoutAppender {
    fn append(&mut self, record: &LogRecord) -> Result<()> {
        let line = record.to_json_line()?;
        let mut out = std::io::stdout().lock();
        out.write_all(line.as_bytes())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        std::io::stdout().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "stdout"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Level;

    #[test]
    fn test_stdout_append_and_flush() {
        let mut appender = StdoutAppender::new();
        let record = LogRecord::new(Level::Info, "stdout appender test");

        assert!(appender.append(&record).is_ok());
        assert!(appender.flush().is_ok());
        assert_eq!(appender.name(), "stdout");
    }
}

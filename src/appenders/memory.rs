//! In-memory appender for tests and inspection

use crate::core::{Appender, LogRecord, Result};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Captured {
    records: Vec<LogRecord>,
    flushes: usize,
}

/// Captures records instead of writing them
///
/// Clones share the same buffer, so a test can keep one handle and give
/// another to the logger.
///
/// # Example
///
/// ```
/// use service_logger::prelude::*;
///
/// let memory = MemoryAppender::new();
/// let logger = Logger::builder(Config::new("svc", "dev"))
///     .appender(memory.clone())
///     .build()
///     .unwrap();
///
/// logger.warn("disk almost full", [Field::int("percent", 93)]);
///
/// let records = memory.json();
/// assert_eq!(records[0]["percent"], 93);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryAppender {
    captured: Arc<Mutex<Captured>>,
}

impl MemoryAppender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies of every record captured so far
    pub fn records(&self) -> Vec<LogRecord> {
        self.captured.lock().records.clone()
    }

    /// Captured records as they would be encoded by a JSON sink
    pub fn json(&self) -> Vec<serde_json::Value> {
        self.captured
            .lock()
            .records
            .iter()
            .map(LogRecord::to_json)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.captured.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captured.lock().records.is_empty()
    }

    /// Number of times the logger asked for a flush
    pub fn flush_count(&self) -> usize {
        self.captured.lock().flushes
    }

    pub fn clear(&self) {
        self.captured.lock().records.clear();
    }
}

impl Appender for MemoryAppender {
    fn append(&mut self, record: &LogRecord) -> Result<()> {
        self.captured.lock().records.push(record.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.captured.lock().flushes += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

//! Logging macros with `format!`-style messages.
//!
//! Each macro takes the logger, an optional bracketed list of fields, then a
//! format string and its arguments. The call site reported in `caller` is the
//! macro invocation.
//!
//! # Examples
//!
//! ```
//! use service_logger::prelude::*;
//! use service_logger::{info, warn};
//!
//! let memory = MemoryAppender::new();
//! let logger = Logger::builder(Config::new("gateway", "dev"))
//!     .appender(memory.clone())
//!     .build()
//!     .unwrap();
//!
//! // Message only
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! // With fields
//! warn!(logger, [Field::int("attempt", 3)], "Retrying upstream {}", "auth");
//!
//! assert_eq!(memory.len(), 3);
//! ```

/// Log a message at an explicit level.
///
/// # Examples
///
/// ```
/// # use service_logger::prelude::*;
/// # let logger = Logger::builder(Config::new("svc", "dev")).appender(MemoryAppender::new()).build().unwrap();
/// use service_logger::log;
/// log!(logger, Level::Info, "Simple message");
/// log!(logger, Level::Error, [Field::string("code", "E500")], "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, [$($field:expr),* $(,)?], $($arg:tt)+) => {
        $logger.log($level, ::std::format!($($arg)+), [$($field),*])
    };
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, ::std::format!($($arg)+), [])
    };
}

/// Log a debug-level message.
///
/// ```
/// # use service_logger::prelude::*;
/// # let logger = Logger::builder(Config::new("svc", "dev")).appender(MemoryAppender::new()).build().unwrap();
/// use service_logger::debug;
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, [$($field:expr),* $(,)?], $($arg:tt)+) => {
        $logger.debug(::std::format!($($arg)+), [$($field),*])
    };
    ($logger:expr, $($arg:tt)+) => {
        $logger.debug(::std::format!($($arg)+), [])
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, [$($field:expr),* $(,)?], $($arg:tt)+) => {
        $logger.info(::std::format!($($arg)+), [$($field),*])
    };
    ($logger:expr, $($arg:tt)+) => {
        $logger.info(::std::format!($($arg)+), [])
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, [$($field:expr),* $(,)?], $($arg:tt)+) => {
        $logger.warn(::std::format!($($arg)+), [$($field),*])
    };
    ($logger:expr, $($arg:tt)+) => {
        $logger.warn(::std::format!($($arg)+), [])
    };
}

/// Log an error-level message.
///
/// ```
/// # use service_logger::prelude::*;
/// # let logger = Logger::builder(Config::new("svc", "dev")).appender(MemoryAppender::new()).build().unwrap();
/// use service_logger::error;
/// let err = std::io::Error::new(std::io::ErrorKind::Other, "connection reset");
/// error!(logger, [Field::error(&err)], "Failed to reach {}", "db-1");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, [$($field:expr),* $(,)?], $($arg:tt)+) => {
        $logger.error(::std::format!($($arg)+), [$($field),*])
    };
    ($logger:expr, $($arg:tt)+) => {
        $logger.error(::std::format!($($arg)+), [])
    };
}

/// Log a fatal-level message, then run the logger's exit hook.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, [$($field:expr),* $(,)?], $($arg:tt)+) => {
        $logger.fatal(::std::format!($($arg)+), [$($field),*])
    };
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatal(::std::format!($($arg)+), [])
    };
}

#[cfg(test)]
mod tests {
    use crate::appenders::MemoryAppender;
    use crate::core::{Config, Field, Level, Logger};
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn logger(level: Level) -> (Logger, MemoryAppender) {
        let memory = MemoryAppender::new();
        let logger = Logger::builder(Config::new("macros", "dev").with_level(level).with_caller(true))
            .appender(memory.clone())
            .exit_hook(|_| {})
            .build()
            .unwrap();
        (logger, memory)
    }

    #[test]
    fn test_log_macro() {
        let (logger, memory) = logger(Level::Debug);
        log!(logger, Level::Info, "Test message");
        log!(logger, Level::Warn, "Formatted: {}", 42);

        let records = memory.json();
        assert_eq!(records[0]["message"], json!("Test message"));
        assert_eq!(records[1]["message"], json!("Formatted: 42"));
        assert_eq!(records[1]["level"], json!("warn"));
    }

    #[test]
    fn test_level_macros() {
        let (logger, memory) = logger(Level::Debug);
        debug!(logger, "Count: {}", 5);
        info!(logger, "Items: {}", 100);
        warn!(logger, "Retry {} of {}", 1, 3);
        error!(logger, "Code: {}", 500);

        let levels: Vec<Level> = memory.records().iter().map(|r| r.level).collect();
        assert_eq!(levels, [Level::Debug, Level::Info, Level::Warn, Level::Error]);
    }

    #[test]
    fn test_macro_fields() {
        let (logger, memory) = logger(Level::Info);
        info!(logger, [Field::string("user", "ada"), Field::int("attempt", 2),], "login {}", "ok");

        let record = &memory.json()[0];
        assert_eq!(record["message"], json!("login ok"));
        assert_eq!(record["user"], json!("ada"));
        assert_eq!(record["attempt"], json!(2));
    }

    #[test]
    fn test_macro_respects_min_level() {
        let (logger, memory) = logger(Level::Error);
        debug!(logger, "hidden");
        info!(logger, "hidden");
        assert!(memory.is_empty());
    }

    #[test]
    fn test_macro_reports_invocation_site() {
        let (logger, memory) = logger(Level::Info);
        let line = line!() + 1;
        info!(logger, "where am I");

        let record = &memory.json()[0];
        assert_eq!(record["caller"], json!(format!("macros.rs:{}", line)));
        assert_eq!(record["function"], json!("test_macro_reports_invocation_site"));
    }

    #[test]
    fn test_fatal_macro_calls_exit_hook() {
        let exited = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&exited);
        let memory = MemoryAppender::new();
        let logger = Logger::builder(Config::new("macros", "dev"))
            .appender(memory.clone())
            .exit_hook(move |_| flag.store(true, Ordering::SeqCst))
            .build()
            .unwrap();

        fatal!(logger, "Unable to recover: {}", "disk full");

        assert!(exited.load(Ordering::SeqCst));
        assert_eq!(memory.json()[0]["message"], json!("Unable to recover: disk full"));
    }
}

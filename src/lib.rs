//! # Service Logger
//!
//! Structured JSON logging with a fixed set of required fields.
//!
//! Every record is one JSON object per line and always carries `timestamp`,
//! `level`, `message`, `service` and `env`. Records go to stdout or to a
//! size-rotated file.
//!
//! ## Features
//!
//! - **Validated configuration**: every misconfiguration is reported at once
//! - **Typed fields**: string, integer, float, bool, arbitrary `Serialize`
//!   values and errors
//! - **Child loggers**: bind fields once with [`Logger::with`]
//! - **Caller metadata**: optional `caller` and `function` keys
//! - **Pluggable backends**: anything implementing [`Appender`]
//!
//! ## Example
//!
//! ```
//! use service_logger::prelude::*;
//!
//! let memory = MemoryAppender::new();
//! let logger = Logger::builder(Config::new("billing", "staging").with_level(Level::Debug))
//!     .appender(memory.clone())
//!     .build()
//!     .unwrap();
//!
//! let log = logger.with_request("req-42");
//! log.debug("charging card", [Field::int64("amount_cents", 1299)]);
//!
//! let record = &memory.json()[0];
//! assert_eq!(record["service"], "billing");
//! assert_eq!(record["request_id"], "req-42");
//! ```

pub mod appenders;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{MemoryAppender, RotatingFileAppender, RotationPolicy, StdoutAppender};
    pub use crate::core::{
        Appender, CallerInfo, Config, ConfigViolation, Field, Level, LogRecord, Logger,
        LoggerBuilder, LoggerError, OutputType, Result,
    };
}

pub use appenders::{MemoryAppender, RotatingFileAppender, RotationPolicy, StdoutAppender};
pub use core::{
    Appender, CallerInfo, Config, ConfigViolation, ExitHook, Field, Level, LogRecord, Logger,
    LoggerBuilder, LoggerError, OutputType, ParseLevelError, ParseOutputError, Result, ALLOWED_ENVS,
    DEFAULT_MAX_AGE_DAYS, DEFAULT_MAX_BACKUPS, DEFAULT_MAX_SIZE_MB, FATAL_EXIT_CODE,
    TIMESTAMP_FORMAT,
};

//! Core logger types and traits

pub mod appender;
pub mod caller;
pub mod config;
pub mod error;
pub mod field;
pub mod level;
pub mod logger;
pub mod output;
pub mod record;

pub use appender::Appender;
pub use caller::CallerInfo;
pub use config::{
    Config, ALLOWED_ENVS, DEFAULT_MAX_AGE_DAYS, DEFAULT_MAX_BACKUPS, DEFAULT_MAX_SIZE_MB,
};
pub use error::{ConfigViolation, LoggerError, Result};
pub use field::Field;
pub use level::{Level, ParseLevelError, VALID_LEVELS};
pub use logger::{ExitHook, Logger, LoggerBuilder, FATAL_EXIT_CODE};
pub use output::{OutputType, ParseOutputError};
pub use record::{LogRecord, TIMESTAMP_FORMAT};

//! Main logger implementation

use super::{
    appender::Appender,
    caller::CallerInfo,
    config::Config,
    error::{LoggerError, Result},
    field::Field,
    level::Level,
    output::OutputType,
    record::LogRecord,
};
use crate::appenders::{RotatingFileAppender, RotationPolicy, StdoutAppender};
use parking_lot::Mutex;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;
use std::time::Duration;

/// Process termination used by [`Logger::fatal`]
pub type ExitHook = Arc<dyn Fn(i32) + Send + Sync>;

/// Exit code passed to the exit hook after a fatal record
pub const FATAL_EXIT_CODE: i32 = 1;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;
const BYTES_PER_MB: u64 = 1024 * 1024;

/// State shared by a logger and every child created from it
struct Shared {
    min_level: Level,
    enable_caller: bool,
    /// `service` and `env`, present on every record
    required: [Field; 2],
    appender: Mutex<Box<dyn Appender>>,
    exit_hook: ExitHook,
}

/// Structured JSON logger with required service fields
///
/// A `Logger` is a cheap handle: cloning it, or deriving a child with
/// [`Logger::with`], shares the underlying appender. It is `Send + Sync`
/// and every method may be called concurrently.
///
/// # Example
///
/// ```no_run
/// use service_logger::{Config, Field, Logger};
///
/// let logger = Logger::new(Config::new("checkout", "prod")).unwrap();
///
/// let request_log = logger.with([Field::string("request_id", "req-7")]);
/// request_log.info("order placed", [Field::int64("order_id", 991)]);
///
/// logger.sync().unwrap();
/// ```
#[derive(Clone)]
pub struct Logger {
    shared: Arc<Shared>,
    bound: Arc<[Field]>,
}

impl Logger {
    /// Validate `config` and build a logger writing to stdout or a file
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::InvalidConfig`] listing every violated rule, or
    /// an appender error if the log file cannot be opened.
    pub fn new(config: Config) -> Result<Self> {
        LoggerBuilder::new(config).build()
    }

    /// Create a builder for Logger
    ///
    /// # Example
    /// ```
    /// use service_logger::prelude::*;
    ///
    /// let memory = MemoryAppender::new();
    /// let logger = Logger::builder(Config::new("svc", "dev"))
    ///     .appender(memory.clone())
    ///     .build()
    ///     .unwrap();
    ///
    /// logger.info("ready", []);
    /// assert_eq!(memory.len(), 1);
    /// ```
    #[must_use]
    pub fn builder(config: Config) -> LoggerBuilder {
        LoggerBuilder::new(config)
    }

    /// Derive a logger that adds `fields` to every record
    ///
    /// The child's bound fields are the parent's followed by `fields`. With
    /// no fields the same logger is returned, see [`Logger::ptr_eq`].
    #[must_use]
    pub fn with(&self, fields: impl IntoIterator<Item = Field>) -> Logger {
        let mut fields = fields.into_iter().peekable();
        if fields.peek().is_none() {
            return self.clone();
        }

        let bound: Vec<Field> = self.bound.iter().cloned().chain(fields).collect();
        Logger {
            shared: Arc::clone(&self.shared),
            bound: bound.into(),
        }
    }

    /// Derive a logger bound to `request_id`
    ///
    /// # Panics
    ///
    /// Panics if `request_id` is blank. Records without a usable request id
    /// cannot be correlated, so this is treated as a programming error.
    #[must_use]
    pub fn with_request(&self, request_id: &str) -> Logger {
        assert!(!request_id.trim().is_empty(), "request_id cannot be empty");
        self.with([Field::string("request_id", request_id)])
    }

    /// Whether two handles are the same logger instance
    pub fn ptr_eq(a: &Logger, b: &Logger) -> bool {
        Arc::ptr_eq(&a.shared, &b.shared) && Arc::ptr_eq(&a.bound, &b.bound)
    }

    pub fn min_level(&self) -> Level {
        self.shared.min_level
    }

    pub fn caller_enabled(&self) -> bool {
        self.shared.enable_caller
    }

    /// Fields this logger adds to every record, after `service` and `env`
    pub fn bound_fields(&self) -> &[Field] {
        &self.bound
    }

    #[inline]
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.shared.min_level
    }

    /// Emit one record at `level`
    ///
    /// A `Fatal` record terminates the process after it is written.
    #[track_caller]
    pub fn log(
        &self,
        level: Level,
        message: impl Into<String>,
        fields: impl IntoIterator<Item = Field>,
    ) {
        if !self.enabled(level) {
            return;
        }

        self.emit(level, message.into(), fields, Location::caller());

        if level == Level::Fatal {
            if let Err(e) = self.sync() {
                eprintln!("[LOGGER ERROR] Failed to flush before exit: {}", e);
            }
            (self.shared.exit_hook)(FATAL_EXIT_CODE);
        }
    }

    #[track_caller]
    #[inline]
    pub fn debug(&self, message: impl Into<String>, fields: impl IntoIterator<Item = Field>) {
        self.log(Level::Debug, message, fields);
    }

    #[track_caller]
    #[inline]
    pub fn info(&self, message: impl Into<String>, fields: impl IntoIterator<Item = Field>) {
        self.log(Level::Info, message, fields);
    }

    #[track_caller]
    #[inline]
    pub fn warn(&self, message: impl Into<String>, fields: impl IntoIterator<Item = Field>) {
        self.log(Level::Warn, message, fields);
    }

    #[track_caller]
    #[inline]
    pub fn error(&self, message: impl Into<String>, fields: impl IntoIterator<Item = Field>) {
        self.log(Level::Error, message, fields);
    }

    /// Emit, flush, then call the exit hook with [`FATAL_EXIT_CODE`]
    ///
    /// With the default hook this never returns.
    #[track_caller]
    #[inline]
    pub fn fatal(&self, message: impl Into<String>, fields: impl IntoIterator<Item = Field>) {
        self.log(Level::Fatal, message, fields);
    }

    /// Flush buffered output
    pub fn sync(&self) -> Result<()> {
        let mut appender = self.shared.appender.lock();
        std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| appender.flush()))
            .unwrap_or_else(|panic_info| {
                Err(LoggerError::writer(format!(
                    "appender panicked during flush: {}",
                    panic_message(panic_info.as_ref())
                )))
            })
    }

    fn emit(
        &self,
        level: Level,
        message: String,
        fields: impl IntoIterator<Item = Field>,
        location: &'static Location<'static>,
    ) {
        let mut record = LogRecord::new(level, message);
        record.fields.extend(self.shared.required.iter().cloned());

        if self.shared.enable_caller {
            let caller = CallerInfo::at(location);
            record.fields.push(Field::string("caller", caller.to_string()));
            record.fields.push(Field::string("function", caller.function));
        }

        record.fields.extend(self.bound.iter().cloned());
        record.fields.extend(fields);

        self.write(&record);
    }

    /// Hand a record to the appender with panic isolation
    ///
    /// Failures are reported on stderr and never reach the caller.
    fn write(&self, record: &LogRecord) {
        let mut appender = self.shared.appender.lock();
        let append_result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            appender.append(record)
        }));

        match append_result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                eprintln!("[LOGGER ERROR] Appender '{}' failed: {}", appender.name(), e);
            }
            Err(panic_info) => {
                eprintln!(
                    "[LOGGER CRITICAL] Appender '{}' panicked: {}",
                    appender.name(),
                    panic_message(panic_info.as_ref())
                );
            }
        }
    }
}

fn panic_message(panic_info: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("min_level", &self.shared.min_level)
            .field("enable_caller", &self.shared.enable_caller)
            .field("required", &self.shared.required)
            .field("bound", &self.bound)
            .finish_non_exhaustive()
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        if let Err(e) = self.appender.get_mut().flush() {
            eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
        }
    }
}

/// Builder for constructing Logger with a fluent API
///
/// The appender and exit hook can be replaced, which lets tests capture
/// records in memory and observe `fatal` without ending the process.
pub struct LoggerBuilder {
    config: Config,
    appender: Option<Box<dyn Appender>>,
    exit_hook: Option<ExitHook>,
}

impl LoggerBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            appender: None,
            exit_hook: None,
        }
    }

    /// Write to `appender` instead of the sink named by the config
    #[must_use = "builder methods return a new value"]
    pub fn appender<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.appender = Some(Box::new(appender));
        self
    }

    /// Replace `std::process::exit` for fatal records
    #[must_use = "builder methods return a new value"]
    pub fn exit_hook(mut self, hook: impl Fn(i32) + Send + Sync + 'static) -> Self {
        self.exit_hook = Some(Arc::new(hook));
        self
    }

    /// Validate the config and build the Logger
    pub fn build(self) -> Result<Logger> {
        let mut config = self.config;
        config.validate()?;
        let min_level = config.min_level()?;

        let appender = match self.appender {
            Some(appender) => appender,
            None => Self::config_appender(&config)?,
        };

        let exit_hook = self
            .exit_hook
            .unwrap_or_else(|| Arc::new(|code| std::process::exit(code)));

        let shared = Shared {
            min_level,
            enable_caller: config.enable_caller,
            required: [
                Field::string("service", config.service),
                Field::string("env", config.env),
            ],
            appender: Mutex::new(appender),
            exit_hook,
        };

        Ok(Logger {
            shared: Arc::new(shared),
            bound: Arc::from(Vec::new()),
        })
    }

    fn config_appender(config: &Config) -> Result<Box<dyn Appender>> {
        match config.output_type() {
            Some(OutputType::File) => {
                let path = config.file_path().ok_or_else(|| {
                    LoggerError::other("file path is required when output is file")
                })?;
                // Validated settings are positive but may be arbitrarily large
                let policy = RotationPolicy::new()
                    .with_max_size(config.max_size_mb.unsigned_abs().saturating_mul(BYTES_PER_MB))
                    .with_max_backups(
                        usize::try_from(config.max_backups.unsigned_abs()).unwrap_or(usize::MAX),
                    )
                    .with_max_age(Duration::from_secs(
                        config.max_age_days.unsigned_abs().saturating_mul(SECONDS_PER_DAY),
                    ));
                Ok(Box::new(RotatingFileAppender::with_policy(path, policy)?))
            }
            _ => Ok(Box::new(StdoutAppender::new())),
        }
    }
}

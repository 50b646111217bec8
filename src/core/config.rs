//! Logger configuration and validation

use super::error::{ConfigViolation, LoggerError, Result};
use super::level::Level;
use super::output::OutputType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Rotation size used when `max_size_mb` is not positive
pub const DEFAULT_MAX_SIZE_MB: i64 = 100;
/// Backup count used when `max_backups` is not positive
pub const DEFAULT_MAX_BACKUPS: i64 = 3;
/// Backup age used when `max_age_days` is not positive
pub const DEFAULT_MAX_AGE_DAYS: i64 = 28;

/// Environments a service may declare, compared case-insensitively
pub const ALLOWED_ENVS: [&str; 5] = ["dev", "development", "staging", "prod", "production"];

/// Logger configuration
///
/// `level` and `output` are kept as text so that values read from files or
/// the environment are checked by [`Config::validate`] alongside every other
/// rule. The typed setters are the usual way to fill them in code.
///
/// # Example
///
/// ```
/// use service_logger::{Config, Level};
///
/// let mut config = Config::new("billing", "prod")
///     .with_level(Level::Warn)
///     .with_file_output("/var/log/billing/app.log")
///     .with_caller(true);
///
/// config.validate().unwrap();
/// assert_eq!(config.max_backups, 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Name of the service, written to every record (required)
    pub service: String,
    /// Deployment environment, one of [`ALLOWED_ENVS`] (required)
    pub env: String,
    /// Minimum level, see [`Level`] (required)
    pub level: String,
    /// `stdout` or `file` (required)
    pub output: String,
    /// Active log file, required when `output` is `file`
    pub file_path: Option<PathBuf>,
    /// Size in MiB before the file is rotated
    pub max_size_mb: i64,
    /// Rotated files to keep
    pub max_backups: i64,
    /// Days to keep rotated files
    pub max_age_days: i64,
    /// Add `caller` and `function` to every record
    pub enable_caller: bool,
}

impl Config {
    /// Start a config for stdout at info level
    pub fn new(service: impl Into<String>, env: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            env: env.into(),
            level: Level::Info.as_str().to_string(),
            output: OutputType::Stdout.as_str().to_string(),
            ..Self::default()
        }
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level.as_str().to_string();
        self
    }

    /// Write to a rotating file at `path`
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_file_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = OutputType::File.as_str().to_string();
        self.file_path = Some(path.into());
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_rotation(mut self, max_size_mb: i64, max_backups: i64, max_age_days: i64) -> Self {
        self.max_size_mb = max_size_mb;
        self.max_backups = max_backups;
        self.max_age_days = max_age_days;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_caller(mut self, enabled: bool) -> Self {
        self.enable_caller = enabled;
        self
    }

    /// Check every rule and backfill rotation defaults
    ///
    /// All violations are gathered into a single
    /// [`LoggerError::InvalidConfig`]. Non-positive rotation settings are
    /// replaced by their defaults even when validation fails.
    pub fn validate(&mut self) -> Result<()> {
        let mut violations = Vec::new();

        if self.service.trim().is_empty() {
            violations.push(ConfigViolation::MissingService);
        }

        let env = self.env.trim();
        if env.is_empty() {
            violations.push(ConfigViolation::MissingEnv);
        } else if !ALLOWED_ENVS.contains(&env.to_lowercase().as_str()) {
            violations.push(ConfigViolation::InvalidEnv(self.env.clone()));
        }

        if self.level.is_empty() {
            violations.push(ConfigViolation::MissingLevel);
        } else if let Err(e) = self.level.parse::<Level>() {
            violations.push(ConfigViolation::InvalidLevel(e));
        }

        if self.output.is_empty() {
            violations.push(ConfigViolation::MissingOutput);
        } else if let Err(e) = self.output.parse::<OutputType>() {
            violations.push(ConfigViolation::InvalidOutput(e));
        }

        if self.output_type() == Some(OutputType::File) && self.file_path().is_none() {
            violations.push(ConfigViolation::MissingFilePath);
        }

        if self.max_size_mb <= 0 {
            self.max_size_mb = DEFAULT_MAX_SIZE_MB;
        }
        if self.max_backups <= 0 {
            self.max_backups = DEFAULT_MAX_BACKUPS;
        }
        if self.max_age_days <= 0 {
            self.max_age_days = DEFAULT_MAX_AGE_DAYS;
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(LoggerError::InvalidConfig { violations })
        }
    }

    /// Parsed minimum level
    pub fn min_level(&self) -> Result<Level> {
        Ok(self.level.parse::<Level>()?)
    }

    /// Parsed output type, `None` when missing or unrecognized
    pub fn output_type(&self) -> Option<OutputType> {
        self.output.parse().ok()
    }

    /// The configured file path, `None` when unset or blank
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path
            .as_deref()
            .filter(|p| !p.as_os_str().to_string_lossy().trim().is_empty())
    }
}

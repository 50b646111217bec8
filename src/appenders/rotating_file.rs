//! Rotating file appender with size-triggered rotation
//!
//! The active file always lives at the configured path. When a record would
//! push it past the size limit, it is renamed to `<name>.1`, older backups
//! shift up by one (`.1` to `.2`, ...), and a fresh file is opened. Backups
//! beyond the count limit or older than the age limit are deleted at
//! rotation time. Rotated files are never compressed.

use crate::core::appender::Appender;
use crate::core::error::{LoggerError, Result};
use crate::core::record::LogRecord;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Limits governing rotation and retention
///
/// # Examples
///
/// ```
/// use service_logger::appenders::RotationPolicy;
/// use std::time::Duration;
///
/// let policy = RotationPolicy::new()
///     .with_max_size(50 * 1024 * 1024)
///     .with_max_backups(7)
///     .with_max_age(Duration::from_secs(7 * 24 * 3600));
/// assert_eq!(policy.max_backup_files, 7);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Size in bytes the active file may reach before rotating
    pub max_bytes: u64,
    /// Maximum number of rotated files to keep
    pub max_backup_files: usize,
    /// Rotated files older than this are deleted
    pub max_age: Duration,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_bytes: 100 * 1024 * 1024,
            max_backup_files: 3,
            max_age: Duration::from_secs(28 * 24 * 3600),
        }
    }
}

impl RotationPolicy {
    /// Create a new rotation policy with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum file size in bytes
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size(mut self, size: u64) -> Self {
        self.max_bytes = size;
        self
    }

    /// Set maximum backup files
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backup_files = count;
        self
    }

    /// Set maximum age of backup files
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_age(mut self, age: Duration) -> Self {
        self.max_age = age;
        self
    }
}

/// Appender writing JSON lines to a size-rotated file
///
/// # Examples
///
/// ```no_run
/// use service_logger::appenders::{RotatingFileAppender, RotationPolicy};
///
/// // 100 MiB, 3 backups, 28 days
/// let appender = RotatingFileAppender::new("/var/log/app.log").unwrap();
///
/// let policy = RotationPolicy::new().with_max_size(10 * 1024 * 1024).with_max_backups(10);
/// let appender = RotatingFileAppender::with_policy("/var/log/app.log", policy).unwrap();
/// ```
pub struct RotatingFileAppender {
    base_path: PathBuf,
    policy: RotationPolicy,
    writer: Option<BufWriter<File>>,
    current_size: u64,
}

impl RotatingFileAppender {
    /// Create a new rotating file appender with the default policy
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be created or opened
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_policy(path, RotationPolicy::default())
    }

    /// Create a new rotating file appender with custom policy
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be created or opened
    pub fn with_policy<P: AsRef<Path>>(path: P, policy: RotationPolicy) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();

        if let Some(parent) = base_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let (file, current_size) = Self::open_active(&base_path)?;

        Ok(Self {
            base_path,
            policy,
            writer: Some(BufWriter::new(file)),
            current_size,
        })
    }

    fn open_active(path: &Path) -> Result<(File, u64)> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LoggerError::file_appender(
                    path.display().to_string(),
                    format!("Failed to open: {}", e),
                )
            })?;

        let size = file
            .metadata()
            .map_err(|e| {
                LoggerError::file_appender(
                    path.display().to_string(),
                    format!("Cannot access file metadata: {}", e),
                )
            })?
            .len();

        Ok((file, size))
    }

    /// Whether writing `incoming` more bytes calls for a rotation first
    ///
    /// An empty file is never rotated, so a single oversized record still
    /// gets written.
    fn should_rotate(&self, incoming: u64) -> bool {
        self.current_size > 0 && self.current_size.saturating_add(incoming) > self.policy.max_bytes
    }

    /// Perform log rotation
    fn rotate(&mut self) -> Result<()> {
        // Release the handle before renaming
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        let max = self.policy.max_backup_files;

        if max == 0 {
            if self.base_path.exists() {
                fs::remove_file(&self.base_path).map_err(|e| {
                    LoggerError::file_rotation(
                        self.base_path.display().to_string(),
                        format!("Failed to discard current log file: {}", e),
                    )
                })?;
            }
        } else {
            let existing = self.existing_backups();
            if existing >= max {
                let oldest = self.backup_path(max);
                if let Err(e) = fs::remove_file(&oldest) {
                    eprintln!("[WARN] Failed to remove oldest backup {}: {}", oldest.display(), e);
                }
            }

            for i in (1..=existing.min(max - 1)).rev() {
                let old_path = self.backup_path(i);
                let new_path = self.backup_path(i + 1);
                if fs::rename(&old_path, &new_path).is_err() {
                    // Some platforms refuse to rename over an existing file
                    if new_path.exists() {
                        let _ = fs::remove_file(&new_path);
                    }
                    fs::rename(&old_path, &new_path).map_err(|e| {
                        LoggerError::file_rotation(
                            old_path.display().to_string(),
                            format!("Failed to rotate backup files: {}", e),
                        )
                    })?;
                }
            }

            if self.base_path.exists() {
                fs::rename(&self.base_path, self.backup_path(1)).map_err(|e| {
                    LoggerError::file_rotation(
                        self.base_path.display().to_string(),
                        format!("Failed to rotate current log file: {}", e),
                    )
                })?;
            }

            self.remove_expired_backups();
        }

        let (file, size) = Self::open_active(&self.base_path).map_err(|e| {
            LoggerError::file_rotation(
                self.base_path.display().to_string(),
                format!("Failed to create new log file: {}", e),
            )
        })?;

        self.writer = Some(BufWriter::new(file));
        self.current_size = size;

        Ok(())
    }

    fn remove_expired_backups(&self) {
        let now = SystemTime::now();
        for i in 1..=self.existing_backups() {
            let path = self.backup_path(i);
            let expired = fs::metadata(&path)
                .and_then(|m| m.modified())
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .is_some_and(|age| age > self.policy.max_age);

            if expired {
                if let Err(e) = fs::remove_file(&path) {
                    eprintln!("[WARN] Failed to remove expired backup {}: {}", path.display(), e);
                }
            }
        }
    }

    /// Number of consecutive backups `.1`, `.2`, ... on disk, capped at the policy limit
    fn existing_backups(&self) -> usize {
        (1..=self.policy.max_backup_files)
            .take_while(|&i| self.backup_path(i).exists())
            .count()
    }

    /// Get backup file path for given index
    fn backup_path(&self, index: usize) -> PathBuf {
        let mut path = self.base_path.clone();
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("app.log");
        path.set_file_name(format!("{}.{}", filename, index));
        path
    }

    /// Get current file size
    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    /// Get base path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.base_path
    }

    /// Get rotation policy
    #[must_use]
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }
}

impl Appender for RotatingFileAppender {
    fn name(&self) -> &str {
        "rotating_file"
    }

    fn append(&mut self, record: &LogRecord) -> Result<()> {
        let line = record.to_json_line()?;
        let bytes_written = line.len() as u64;

        if self.should_rotate(bytes_written) {
            if let Err(e) = self.rotate() {
                eprintln!("[WARN] Log rotation failed: {}. Continuing with current file.", e);

                if self.writer.is_none() {
                    let (file, size) = Self::open_active(&self.base_path)?;
                    self.writer = Some(BufWriter::new(file));
                    self.current_size = size;
                }

                // Let the file grow past the limit rather than retry on every record
                self.current_size = 0;
            }
        }

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| LoggerError::writer("Writer not initialized"))?;

        writer.write_all(line.as_bytes()).map_err(|e| {
            LoggerError::file_appender(
                self.base_path.display().to_string(),
                format!("Failed to write log entry: {}", e),
            )
        })?;
        self.current_size += bytes_written;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush().map_err(|e| {
                LoggerError::file_appender(
                    self.base_path.display().to_string(),
                    format!("Failed to flush: {}", e),
                )
            })?;
        }
        Ok(())
    }
}

impl Drop for RotatingFileAppender {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Field, Level};
    use tempfile::tempdir;

    fn record(i: usize) -> LogRecord {
        LogRecord::new(Level::Info, format!("message number {}", i))
            .with_fields([Field::string("service", "rotation-test")])
    }

    #[test]
    fn test_creates_parent_directories() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("deeper").join("app.log");

        let mut appender = RotatingFileAppender::new(&path)?;
        appender.append(&record(0))?;
        appender.flush()?;

        assert!(path.exists());
        assert_eq!(appender.path(), path.as_path());
        Ok(())
    }

    #[test]
    fn test_writes_json_lines() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("app.log");

        let mut appender = RotatingFileAppender::new(&path)?;
        for i in 0..5 {
            appender.append(&record(i))?;
        }
        appender.flush()?;

        let content = fs::read_to_string(&path)?;
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 5);
        for line in lines {
            let parsed: serde_json::Value = serde_json::from_str(line)?;
            assert_eq!(parsed["service"], "rotation-test");
        }
        assert_eq!(appender.current_size(), content.len() as u64);
        Ok(())
    }

    #[test]
    fn test_rotates_when_size_exceeded() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("app.log");
        let line_len = record(0).to_json_line()?.len() as u64;

        // Room for two records per file
        let policy = RotationPolicy::new()
            .with_max_size(line_len * 2)
            .with_max_backups(2);
        let mut appender = RotatingFileAppender::with_policy(&path, policy)?;

        for i in 0..7 {
            appender.append(&record(i))?;
        }
        appender.flush()?;

        assert!(path.exists());
        assert!(dir.path().join("app.log.1").exists());
        assert!(dir.path().join("app.log.2").exists());
        assert!(!dir.path().join("app.log.3").exists());

        // Newest records live in the active file
        let active = fs::read_to_string(&path)?;
        assert!(active.contains("message number 6"));
        let newest_backup = fs::read_to_string(dir.path().join("app.log.1"))?;
        assert!(newest_backup.contains("message number 5"));
        Ok(())
    }

    #[test]
    fn test_existing_file_counts_toward_size() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("app.log");
        fs::write(&path, "x".repeat(64))?;

        let policy = RotationPolicy::new().with_max_size(80);
        let mut appender = RotatingFileAppender::with_policy(&path, policy)?;
        assert_eq!(appender.current_size(), 64);

        appender.append(&record(0))?;
        appender.flush()?;

        assert_eq!(fs::read_to_string(dir.path().join("app.log.1"))?, "x".repeat(64));
        Ok(())
    }

    #[test]
    fn test_expired_backups_removed_on_rotation() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("app.log");

        let stale = dir.path().join("app.log.1");
        fs::write(&stale, "old\n")?;
        let forty_days = Duration::from_secs(40 * 24 * 3600);
        File::options()
            .write(true)
            .open(&stale)?
            .set_modified(SystemTime::now() - forty_days)?;

        let policy = RotationPolicy::new()
            .with_max_size(1)
            .with_max_backups(3)
            .with_max_age(Duration::from_secs(28 * 24 * 3600));
        let mut appender = RotatingFileAppender::with_policy(&path, policy)?;

        appender.append(&record(0))?;
        appender.append(&record(1))?;
        appender.flush()?;

        // The stale backup was shifted to .2 and then pruned for age
        assert!(dir.path().join("app.log.1").exists());
        assert!(!dir.path().join("app.log.2").exists());
        Ok(())
    }

    #[test]
    fn test_unbounded_backup_count_rotates_existing_files_only() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("app.log");

        let policy = RotationPolicy::new()
            .with_max_size(1)
            .with_max_backups(usize::MAX)
            .with_max_age(Duration::MAX);
        let mut appender = RotatingFileAppender::with_policy(&path, policy)?;

        for i in 0..4 {
            appender.append(&record(i))?;
        }
        appender.flush()?;

        for i in 1..=3 {
            assert!(dir.path().join(format!("app.log.{}", i)).exists());
        }
        assert!(!dir.path().join("app.log.4").exists());
        let oldest = fs::read_to_string(dir.path().join("app.log.3"))?;
        assert!(oldest.contains("message number 0"));
        Ok(())
    }

    #[test]
    fn test_policy_builder() {
        let policy = RotationPolicy::new()
            .with_max_size(1024)
            .with_max_backups(9)
            .with_max_age(Duration::from_secs(60));

        assert_eq!(policy.max_bytes, 1024);
        assert_eq!(policy.max_backup_files, 9);
        assert_eq!(policy.max_age, Duration::from_secs(60));
        assert_eq!(RotationPolicy::default().max_backup_files, 3);
    }
}

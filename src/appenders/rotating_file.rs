//! Rotating file appender with template-named backups
//!
//! When a rotation is due the active file is renamed to a path rendered from
//! a [`BackupPath`] template, optionally gzip-compressed, and a fresh file is
//! opened in its place. The template is first rendered without an index; if
//! that path is taken, indexes 1, 2, ... are tried until a free one is found.

use super::file::open_append;
use crate::core::appender::Appender;
use crate::core::clock::{system_clock, SharedClock};
use crate::core::error::{LoggerError, Result};
use crate::core::log_event::LogEvent;
use crate::format::{BackupPath, LogPattern};
use chrono::{DateTime, Local, Timelike};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::collections::VecDeque;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Backup template used when a policy does not name one
///
/// `logs/app.log` rotated at noon on 2020-01-01 becomes
/// `logs/app.log.20200101-120000`, then `logs/app.log.20200101-120000.1` for a
/// second rotation within the same second.
pub const DEFAULT_BACKUP_PATTERN: &str = r"{FilePath}.{DateTime:yyyyMMdd-HHmmss}{Index:\.0}";

/// Highest index tried when looking for a free backup path
const MAX_BACKUP_INDEX: u32 = 9999;

/// Active file size at which the default policy rolls over
pub const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// When the active file is rolled over
///
/// ```
/// use rust_pattern_logger::appenders::RotationStrategy;
/// use std::time::Duration;
///
/// let by_size = RotationStrategy::size(64 * 1024 * 1024);
/// let nightly = RotationStrategy::daily(3).unwrap();
/// let either = RotationStrategy::hybrid(8 * 1024 * 1024, Duration::from_secs(6 * 3600));
/// assert!(RotationStrategy::daily(24).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RotationStrategy {
    /// Once the active file holds `max_bytes`
    Size { max_bytes: u64 },
    /// Once `interval` has passed since the last rollover
    Time { interval: Duration },
    /// On the first write of a new day at or after `hour`
    Daily { hour: u8 },
    Hourly,
    /// Whichever of the size or time limits trips first
    Hybrid { max_bytes: u64, interval: Duration },
    /// Leave rotation to someone else
    Never,
}

impl Default for RotationStrategy {
    fn default() -> Self {
        RotationStrategy::Size {
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

impl RotationStrategy {
    #[must_use]
    pub fn size(max_bytes: u64) -> Self {
        RotationStrategy::Size { max_bytes }
    }

    #[must_use]
    pub fn time(interval: Duration) -> Self {
        RotationStrategy::Time { interval }
    }

    /// # Errors
    ///
    /// Returns an argument error when `hour` is not a valid hour of the day
    pub fn daily(hour: u8) -> Result<Self> {
        if hour > 23 {
            return Err(LoggerError::argument(
                "hour",
                format!("expected 0..=23, got {}", hour),
            ));
        }
        Ok(RotationStrategy::Daily { hour })
    }

    #[must_use]
    pub fn hourly() -> Self {
        RotationStrategy::Hourly
    }

    #[must_use]
    pub fn hybrid(max_bytes: u64, interval: Duration) -> Self {
        RotationStrategy::Hybrid { max_bytes, interval }
    }

    #[must_use]
    pub fn never() -> Self {
        RotationStrategy::Never
    }

    /// Size limit, if this strategy has one
    #[must_use]
    pub fn size_limit(&self) -> Option<u64> {
        match *self {
            RotationStrategy::Size { max_bytes } | RotationStrategy::Hybrid { max_bytes, .. } => {
                Some(max_bytes)
            }
            _ => None,
        }
    }
}

/// What triggers a rollover, where backups go and how many are kept
///
/// ```
/// use rust_pattern_logger::appenders::{RotationPolicy, RotationStrategy};
///
/// // Nightly at 02:00 into dated, compressed archives; a month of history
/// let policy = RotationPolicy::new()
///     .with_strategy(RotationStrategy::daily(2).unwrap())
///     .with_backup_pattern(r"{Directory}/archive/{FileBody}.{DateTime:yyyy-MM-dd}{Index:\.00}{Extension}")
///     .unwrap()
///     .with_max_backups(30)
///     .with_compression(true);
/// assert_eq!(policy.strategy.size_limit(), None);
/// ```
#[derive(Debug, Clone)]
pub struct RotationPolicy {
    pub strategy: RotationStrategy,
    /// Template rotated files are renamed to
    pub backup: BackupPath,
    /// Backups kept by one appender; 0 keeps every one
    pub max_backup_files: usize,
    /// Gzip each backup to `<backup>.gz`
    pub compress: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            strategy: RotationStrategy::default(),
            backup: BackupPath::compile(DEFAULT_BACKUP_PATTERN)
                .unwrap_or_else(|e| unreachable!("default backup pattern is invalid: {}", e)),
            max_backup_files: 5,
            compress: false,
        }
    }
}

impl RotationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: RotationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Shorthand for `with_strategy(RotationStrategy::size(max_bytes))`
    #[must_use]
    pub fn with_max_size(self, max_bytes: u64) -> Self {
        self.with_strategy(RotationStrategy::size(max_bytes))
    }

    /// # Errors
    ///
    /// Fails like [`BackupPath::compile`]
    pub fn with_backup_pattern(mut self, template: &str) -> Result<Self> {
        self.backup = BackupPath::compile(template)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_backup_path(mut self, backup: BackupPath) -> Self {
        self.backup = backup;
        self
    }

    #[must_use]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backup_files = count;
        self
    }

    #[must_use]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }
}

/// Rotating file appender with support for multiple rotation strategies
///
/// # Examples
///
/// ```no_run
/// use rust_pattern_logger::appenders::{RotatingFileAppender, RotationPolicy, RotationStrategy};
///
/// // Size-based rotation with the default backup names
/// let appender = RotatingFileAppender::new("/var/log/app.log").unwrap();
///
/// // Hourly rotation into per-day folders
/// let policy = RotationPolicy::new()
///     .with_strategy(RotationStrategy::Hourly)
///     .with_backup_pattern(r"/var/log/{DateTime:yyyy-MM-dd}/{FileBody}.{DateTime:HH}{Index:\.0}{Extension}")
///     .unwrap()
///     .with_max_backups(48);
/// let appender = RotatingFileAppender::with_policy("/var/log/app.log", policy).unwrap();
/// ```
pub struct RotatingFileAppender {
    name: String,
    base_path: PathBuf,
    policy: RotationPolicy,
    pattern: LogPattern,
    writer: Option<BufWriter<File>>,
    current_size: u64,
    /// Timestamp of the last rotation (used for time-based strategies)
    last_rotation: DateTime<Local>,
    clock: SharedClock,
    /// Backups created by this appender, oldest first
    backups: VecDeque<PathBuf>,
    /// Counter for consecutive deletion failures (reset on successful deletion)
    deletion_failure_count: usize,
}

impl RotatingFileAppender {
    /// Create a new rotating file appender
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be created or opened
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_policy(path, RotationPolicy::default())
    }

    /// Create a new rotating file appender with custom policy
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be created or opened
    pub fn with_policy<P: AsRef<Path>>(path: P, policy: RotationPolicy) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        let clock = system_clock();
        let (file, current_size, last_rotation) = Self::open_active(&base_path, &clock)?;

        Ok(Self {
            name: "rotating_file".to_string(),
            base_path,
            policy,
            pattern: LogPattern::default(),
            writer: Some(BufWriter::new(file)),
            current_size,
            last_rotation,
            clock,
            backups: VecDeque::new(),
            deletion_failure_count: 0,
        })
    }

    /// # Errors
    ///
    /// Returns an argument error if `template` is empty
    pub fn with_pattern(mut self, template: &str) -> Result<Self> {
        self.pattern = LogPattern::compile(template)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Take rotation times and backup timestamps from `clock`
    ///
    /// An empty active file counts as freshly rotated at the clock's time.
    #[must_use]
    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        if self.current_size == 0 {
            self.last_rotation = clock.now_local();
        }
        self.clock = clock;
        self
    }

    /// Open the active file, returning it with its size and the time it was
    /// last rotated (its modification time, or now when it is empty)
    fn open_active(path: &Path, clock: &SharedClock) -> Result<(File, u64, DateTime<Local>)> {
        let file = open_append(path)?;
        let metadata = file.metadata().map_err(|e| {
            LoggerError::file_appender(
                path.display().to_string(),
                format!("Cannot access file metadata: {}", e),
            )
        })?;

        let size = metadata.len();
        let last_rotation = match metadata.modified() {
            Ok(modified) if size > 0 => DateTime::<Local>::from(modified),
            _ => clock.now_local(),
        };
        Ok((file, size, last_rotation))
    }

    /// Check if rotation is needed based on the configured strategy
    fn should_rotate(&self, now: &DateTime<Local>) -> bool {
        let elapsed = (*now - self.last_rotation).to_std().unwrap_or(Duration::ZERO);

        match &self.policy.strategy {
            RotationStrategy::Never => false,

            RotationStrategy::Size { max_bytes } => self.current_size >= *max_bytes,

            RotationStrategy::Time { interval } => elapsed >= *interval,

            RotationStrategy::Daily { hour } => {
                // Rotate if we're on a different day and past the target hour
                now.date_naive() != self.last_rotation.date_naive()
                    && now.hour() >= u32::from(*hour)
            }

            RotationStrategy::Hourly => elapsed >= Duration::from_secs(3600),

            RotationStrategy::Hybrid { max_bytes, interval } => {
                self.current_size >= *max_bytes || elapsed >= *interval
            }
        }
    }

    /// Roll the active file over now, whatever the strategy says
    ///
    /// # Errors
    ///
    /// Returns a rotation error if the active file cannot be moved or
    /// reopened, or if no free backup path exists
    pub fn rotate(&mut self) -> Result<()> {
        // The handle must be closed before the rename
        if let Some(mut writer) = self.writer.take() {
            writer
                .flush()
                .map_err(|e| self.rotation_error(format!("flush before rotation: {}", e)))?;
        }

        let now = self.clock.now_local();
        if self.base_path.exists() {
            let backup = self.next_backup_path(&now)?;
            self.move_to_backup(&backup)?;

            // Tracked before compression so a failed gzip still counts
            // toward the backup limit
            self.backups.push_back(backup.clone());
            if self.policy.compress {
                let compressed = Self::compress_file(&backup)?;
                if let Some(last) = self.backups.back_mut() {
                    *last = compressed;
                }
            }
            self.prune_backups()?;
        }

        let file = open_append(&self.base_path)
            .map_err(|e| self.rotation_error(format!("reopen after rotation: {}", e)))?;
        self.writer = Some(BufWriter::new(file));
        self.current_size = 0;
        self.last_rotation = now;
        Ok(())
    }

    fn move_to_backup(&self, backup: &Path) -> Result<()> {
        if let Some(parent) = backup.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create backup directory",
                    parent.display().to_string(),
                    e,
                )
            })?;
        }
        fs::rename(&self.base_path, backup)
            .map_err(|e| self.rotation_error(format!("move to '{}': {}", backup.display(), e)))
    }

    fn rotation_error(&self, message: impl Into<String>) -> LoggerError {
        LoggerError::file_rotation(self.base_path.display().to_string(), message)
    }

    /// First free path: the template without an index, then indexes 1, 2, ...
    fn next_backup_path(&self, now: &DateTime<Local>) -> Result<PathBuf> {
        let original = self.base_path.to_string_lossy();

        let unindexed = PathBuf::from(self.policy.backup.render(&original, now, None));
        if self.is_free(&unindexed) {
            return Ok(unindexed);
        }

        (1..=MAX_BACKUP_INDEX)
            .map(|index| PathBuf::from(self.policy.backup.render(&original, now, Some(index))))
            .find(|candidate| self.is_free(candidate))
            .ok_or_else(|| {
                self.rotation_error(format!(
                    "no free backup path for '{}' up to index {}",
                    self.policy.backup.template(),
                    MAX_BACKUP_INDEX
                ))
            })
    }

    fn is_free(&self, candidate: &Path) -> bool {
        candidate != self.base_path.as_path()
            && !candidate.exists()
            && !(self.policy.compress && gz_path(candidate).exists())
    }

    /// Delete the oldest backups beyond `max_backup_files`
    fn prune_backups(&mut self) -> Result<()> {
        const MAX_DELETION_FAILURES: usize = 5;

        let limit = self.policy.max_backup_files;
        while limit > 0 && self.backups.len() > limit {
            let Some(oldest) = self.backups.pop_front() else {
                break;
            };

            match fs::remove_file(&oldest) {
                Ok(()) => self.deletion_failure_count = 0,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    self.deletion_failure_count += 1;
                    eprintln!(
                        "[WARN] Cannot delete backup {} ({}/{}): {}",
                        oldest.display(),
                        self.deletion_failure_count,
                        MAX_DELETION_FAILURES,
                        e
                    );
                    self.backups.push_front(oldest);

                    if self.deletion_failure_count >= MAX_DELETION_FAILURES {
                        return Err(self.rotation_error(format!(
                            "backup deletion failed {} times in a row",
                            self.deletion_failure_count
                        )));
                    }
                    break;
                }
            }
        }
        Ok(())
    }

    /// Gzip `path` into `<path>.gz` and return the compressed path
    ///
    /// Output goes to `<path>.gz.tmp` first; the original is removed only
    /// once the archive is complete and in place.
    fn compress_file(path: &Path) -> Result<PathBuf> {
        let gz_path = gz_path(path);
        let mut temp_name = gz_path.clone().into_os_string();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);

        let compressed = Self::write_gzip(path, &temp_path)
            .and_then(|()| fs::rename(&temp_path, &gz_path));
        if let Err(e) = compressed {
            let _ = fs::remove_file(&temp_path);
            return Err(LoggerError::io_operation(
                "compress backup",
                format!("Cannot compress '{}'", path.display()),
                e,
            ));
        }

        if let Err(e) = fs::remove_file(path) {
            eprintln!(
                "[WARN] Compressed backup written but '{}' could not be removed: {}",
                path.display(),
                e
            );
        }
        Ok(gz_path)
    }

    fn write_gzip(source: &Path, target: &Path) -> std::io::Result<()> {
        let mut input = BufReader::new(File::open(source)?);
        let output = BufWriter::new(File::create(target)?);
        let mut encoder = GzEncoder::new(output, Compression::default());
        io::copy(&mut input, &mut encoder)?;
        encoder.finish()?.flush()
    }

    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.base_path
    }

    #[must_use]
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    #[must_use]
    pub fn last_rotation(&self) -> DateTime<Local> {
        self.last_rotation
    }

    #[must_use]
    pub fn strategy(&self) -> &RotationStrategy {
        &self.policy.strategy
    }

    /// Backups this appender created and still keeps, oldest first
    pub fn backups(&self) -> impl Iterator<Item = &Path> + '_ {
        self.backups.iter().map(PathBuf::as_path)
    }
}

/// `<path>.gz`, keeping any existing extension
fn gz_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".gz");
    PathBuf::from(name)
}

impl Appender for RotatingFileAppender {
    fn name(&self) -> &str {
        &self.name
    }

    fn append(&mut self, event: &LogEvent) -> Result<()> {
        let formatted = self.pattern.render(event)?;

        let now = self.clock.now_local();
        if self.should_rotate(&now) {
            if let Err(e) = self.rotate() {
                eprintln!("[WARN] Rotation of {} failed: {}", self.base_path.display(), e);
                self.resume_after_failed_rotation(now, e)?;
            }
        }

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| LoggerError::writer("appender is closed"))?;
        writer.write_all(formatted.as_bytes()).map_err(|e| {
            LoggerError::file_appender(self.base_path.display().to_string(), e.to_string())
        })?;
        self.current_size += formatted.len() as u64;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush().map_err(|e| {
                LoggerError::file_appender(self.base_path.display().to_string(), e.to_string())
            }),
            None => Ok(()),
        }
    }

    fn close(&mut self) -> Result<()> {
        self.flush()?;
        self.writer = None;
        Ok(())
    }
}

impl RotatingFileAppender {
    /// Keep logging into the active file after a failed rotation, and wait a
    /// full period before the next attempt
    fn resume_after_failed_rotation(
        &mut self,
        now: DateTime<Local>,
        cause: LoggerError,
    ) -> Result<()> {
        if self.writer.is_none() {
            match Self::open_active(&self.base_path, &self.clock) {
                Ok((file, _, _)) => self.writer = Some(BufWriter::new(file)),
                Err(reopen) => {
                    eprintln!(
                        "[ERROR] Cannot reopen {}: {}",
                        self.base_path.display(),
                        reopen
                    );
                    return Err(cause);
                }
            }
        }
        self.current_size = 0;
        self.last_rotation = now;
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

//! File appender implementation

use crate::core::{Appender, LogEvent, LoggerError, Result};
use crate::format::LogPattern;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends rendered events to a single file
pub struct FileAppender {
    name: String,
    path: PathBuf,
    pattern: LogPattern,
    writer: Option<BufWriter<File>>,
}

impl FileAppender {
    /// Open `path` for appending, creating it and its directory as needed
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory or file cannot be created
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let writer = Some(BufWriter::new(open_append(&path)?));

        Ok(Self {
            name: "file".to_string(),
            path,
            pattern: LogPattern::default(),
            writer,
        })
    }

    /// Set the pattern each event is rendered with
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rust_pattern_logger::appenders::FileAppender;
    ///
    /// let appender = FileAppender::new("/var/log/app.log")
    ///     .unwrap()
    ///     .with_pattern("{DateTime:o} {Level} [{Thread}] {Message}{NewLine}")
    ///     .unwrap();
    /// ```
    ///
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

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Open a log file for appending, creating its parent directory first
pub(crate) fn open_append(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            LoggerError::io_operation(
                "create log directory",
                format!("Failed to create directory '{}'", parent.display()),
                e,
            )
        })?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            LoggerError::file_appender(path.display().to_string(), format!("Failed to open: {}", e))
        })
}

impl Appender for FileAppender {
    fn append(&mut self, event: &LogEvent) -> Result<()> {
        let output = self.pattern.render(event)?;
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| LoggerError::writer("File writer not initialized"))?;

        writer.write_all(output.as_bytes())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for FileAppender {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        let _ = self.flush();
    }
}

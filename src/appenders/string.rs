//! In-memory appender

use crate::core::{Appender, LogEvent, Result};
use crate::format::LogPattern;
use parking_lot::Mutex;
use std::sync::Arc;

/// Shared handle to the text a [`StringAppender`] has written
///
/// Cloning the handle shares the same buffer, so a test can keep one while
/// the appender itself is owned by the logger.
#[derive(Debug, Clone, Default)]
pub struct StringBuffer(Arc<Mutex<String>>);

impl StringBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything written so far
    pub fn contents(&self) -> String {
        self.0.lock().clone()
    }

    /// Return everything written so far and empty the buffer
    pub fn take(&self) -> String {
        std::mem::take(&mut *self.0.lock())
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    fn push(&self, text: &str) {
        self.0.lock().push_str(text);
    }
}

/// Appends rendered events to a shared string
///
/// # Example
///
/// ```
/// use rust_pattern_logger::prelude::*;
///
/// let appender = StringAppender::new("memory").with_pattern("{Level}:{Message};").unwrap();
/// let buffer = appender.buffer();
///
/// let logger = Logger::builder().appender(appender).build().unwrap();
/// logger.warn("low disk");
///
/// assert_eq!(buffer.contents(), "WARN:low disk;");
/// ```
pub struct StringAppender {
    name: String,
    pattern: LogPattern,
    buffer: StringBuffer,
}

impl StringAppender {
    /// Create an appender using [`DEFAULT_PATTERN`](crate::format::DEFAULT_PATTERN)
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: LogPattern::default(),
            buffer: StringBuffer::new(),
        }
    }

    /// Replace the pattern
    ///
    /// # Errors
    ///
    /// Returns an argument error if `template` is empty
    pub fn with_pattern(mut self, template: &str) -> Result<Self> {
        self.pattern = LogPattern::compile(template)?;
        Ok(self)
    }

    /// Write into an existing buffer instead of a fresh one
    #[must_use]
    pub fn with_buffer(mut self, buffer: StringBuffer) -> Self {
        self.buffer = buffer;
        self
    }

    pub fn buffer(&self) -> StringBuffer {
        self.buffer.clone()
    }

    pub fn pattern(&self) -> &LogPattern {
        &self.pattern
    }
}

impl Appender for StringAppender {
    fn append(&mut self, event: &LogEvent) -> Result<()> {
        let rendered = self.pattern.render(event)?;
        self.buffer.push(&rendered);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogLevel, LoggerError};

    #[test]
    fn test_appends_rendered_events() {
        let mut appender = StringAppender::new("s").with_pattern("{Message},").unwrap();
        appender.append(&LogEvent::new(LogLevel::Info, "a")).unwrap();
        appender.append(&LogEvent::new(LogLevel::Info, "b")).unwrap();
        assert_eq!(appender.buffer().contents(), "a,b,");
    }

    #[test]
    fn test_take_empties_buffer() {
        let mut appender = StringAppender::new("s").with_pattern("{Message}").unwrap();
        let buffer = appender.buffer();
        appender.append(&LogEvent::new(LogLevel::Info, "once")).unwrap();

        assert_eq!(buffer.take(), "once");
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_shared_buffer_between_appenders() {
        let shared = StringBuffer::new();
        let mut first = StringAppender::new("a")
            .with_pattern("1")
            .unwrap()
            .with_buffer(shared.clone());
        let mut second = StringAppender::new("b")
            .with_pattern("2")
            .unwrap()
            .with_buffer(shared.clone());

        let event = LogEvent::new(LogLevel::Debug, "");
        first.append(&event).unwrap();
        second.append(&event).unwrap();
        assert_eq!(shared.contents(), "12");
    }

    #[test]
    fn test_malformed_sub_format_fails_append() {
        let mut appender = StringAppender::new("s").with_pattern("{Line:Q}").unwrap();
        let err = appender
            .append(&LogEvent::new(LogLevel::Info, "x"))
            .unwrap_err();
        assert!(matches!(err, LoggerError::InvalidPattern { .. }));
        assert!(appender.buffer().is_empty());
    }
}

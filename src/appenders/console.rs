//! Console appender implementation

use crate::core::{Appender, LogEvent, LogLevel, Result};
use crate::format::LogPattern;
use std::io::Write;

pub struct ConsoleAppender {
    name: String,
    pattern: LogPattern,
    use_colors: bool,
}

impl ConsoleAppender {
    pub fn new() -> Self {
        Self::with_colors(true)
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            name: "console".to_string(),
            pattern: LogPattern::default(),
            use_colors,
        }
    }

    /// Set the pattern each event is rendered with
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_pattern_logger::appenders::ConsoleAppender;
    ///
    /// let appender = ConsoleAppender::new()
    ///     .with_pattern("{DateTime:HH:mm:ss} {Level,-5} {Message}{NewLine}")
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

    pub fn pattern(&self) -> &LogPattern {
        &self.pattern
    }

    #[cfg(feature = "console")]
    fn colorize(&self, level: LogLevel, rendered: String) -> String {
        use colored::Colorize;

        if !self.use_colors {
            return rendered;
        }
        // Keep the line ending outside the escape codes
        let body = rendered.trim_end_matches(['\r', '\n']);
        let ending = &rendered[body.len()..];
        format!("{}{}", body.color(level.color_code()), ending)
    }

    #[cfg(not(feature = "console"))]
    fn colorize(&self, _level: LogLevel, rendered: String) -> String {
        rendered
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for ConsoleAppender {
    fn append(&mut self, event: &LogEvent) -> Result<()> {
        let output = self.colorize(event.level, self.pattern.render(event)?);

        // Route Error and Fatal levels to stderr, others to stdout
        match event.level {
            LogLevel::Error | LogLevel::Fatal => {
                std::io::stderr().lock().write_all(output.as_bytes())?
            }
            _ => std::io::stdout().lock().write_all(output.as_bytes())?,
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        // Flush both stdout and stderr since we write to both
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

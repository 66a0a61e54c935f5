//! Main logger implementation

use super::{
    appender::Appender,
    clock::{system_clock, SharedClock},
    error::{LoggerError, Result},
    log_event::{CallerInfo, LogEvent},
    log_level::LogLevel,
    metrics::LoggerMetrics,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A logger handle owned by the application
///
/// Appenders are kept in insertion order behind a single mutex; every event
/// goes to every appender. Share the handle with `Arc` or by reference.
pub struct Logger {
    appenders: Mutex<Vec<Box<dyn Appender>>>,
    enabled: AtomicBool,
    stopped: AtomicBool,
    escape_line_breaks: AtomicBool,
    clock: SharedClock,
    /// Metrics for observability (dropped count, total logged, etc.)
    metrics: Arc<LoggerMetrics>,
}

impl Logger {
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(system_clock())
    }

    /// Create a logger that timestamps events with `clock`
    #[must_use]
    pub fn with_clock(clock: SharedClock) -> Self {
        Self {
            appenders: Mutex::new(Vec::new()),
            enabled: AtomicBool::new(true),
            stopped: AtomicBool::new(false),
            escape_line_breaks: AtomicBool::new(false),
            clock,
            metrics: Arc::new(LoggerMetrics::new()),
        }
    }

    /// Dispatch one event with per-appender panic isolation
    ///
    /// A failing or panicking appender is reported on stderr and does not
    /// prevent the remaining appenders from receiving the event.
    fn dispatch(
        appenders: &mut [Box<dyn Appender>],
        event: &LogEvent,
        metrics: &LoggerMetrics,
    ) -> bool {
        let mut has_error = false;

        for appender in appenders.iter_mut() {
            let append_result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                appender.append(event)
            }));

            match append_result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!("[LOGGER ERROR] Appender '{}' failed: {}", appender.name(), e);
                    metrics.record_appender_failure();
                    has_error = true;
                }
                Err(panic_info) => {
                    eprintln!(
                        "[LOGGER CRITICAL] Appender '{}' panicked: {}. \
                         Other appenders continue to function.",
                        appender.name(),
                        panic_message(panic_info.as_ref())
                    );
                    metrics.record_appender_failure();
                    has_error = true;
                }
            }
        }

        if has_error {
            metrics.record_dropped();
        } else {
            metrics.record_logged();
        }

        has_error
    }

    /// Register an appender; it receives events after those added earlier
    ///
    /// # Errors
    ///
    /// Returns an argument error for an unnamed appender, or
    /// `LoggerStopped` after [`Logger::shutdown`]
    pub fn add_appender(&self, appender: Box<dyn Appender>) -> Result<()> {
        if appender.name().is_empty() {
            return Err(LoggerError::argument("appender", "appender name must not be empty"));
        }
        if self.stopped.load(Ordering::Acquire) {
            return Err(LoggerError::LoggerStopped);
        }
        self.appenders.lock().push(appender);
        Ok(())
    }

    /// Close and remove the first appender called `name`
    ///
    /// Returns `false` if no appender has that name.
    pub fn remove_appender(&self, name: &str) -> bool {
        let mut appender = {
            let mut appenders = self.appenders.lock();
            match appenders.iter().position(|a| a.name() == name) {
                Some(position) => appenders.remove(position),
                None => return false,
            }
        };

        if let Err(e) = appender.close() {
            eprintln!("[LOGGER ERROR] Failed to close removed appender '{}': {}", name, e);
        }
        true
    }

    /// Names of the registered appenders, in dispatch order
    pub fn appender_names(&self) -> Vec<String> {
        self.appenders
            .lock()
            .iter()
            .map(|a| a.name().to_string())
            .collect()
    }

    /// Close and drop every appender
    pub fn clear_appenders(&self) {
        let drained: Vec<_> = self.appenders.lock().drain(..).collect();
        for mut appender in drained {
            if let Err(e) = appender.close() {
                eprintln!("[LOGGER ERROR] Failed to close appender '{}': {}", appender.name(), e);
            }
        }
    }

    /// Turn all logging on or off
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire) && !self.stopped.load(Ordering::Acquire)
    }

    /// Escape newlines, carriage returns and tabs in messages passed to
    /// [`Logger::log_at`] and the level helpers; off by default
    pub fn set_escape_line_breaks(&self, escape: bool) {
        self.escape_line_breaks.store(escape, Ordering::Release);
    }

    pub fn escapes_line_breaks(&self) -> bool {
        self.escape_line_breaks.load(Ordering::Acquire)
    }

    /// Log without caller information
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.log_at(level, message, CallerInfo::default());
    }

    /// Log with caller information; the logging macros call this
    pub fn log_at(&self, level: LogLevel, message: impl Into<String>, caller: CallerInfo) {
        if !self.is_enabled() {
            self.metrics.record_disabled_skip();
            return;
        }

        let mut event = LogEvent::at(self.clock.now_local(), level, message).with_caller(caller);
        if self.escapes_line_breaks() {
            event = event.with_escaped_line_breaks();
        }
        self.log_event(&event);
    }

    /// Hand a prepared event to every appender
    pub fn log_event(&self, event: &LogEvent) {
        if !self.is_enabled() {
            self.metrics.record_disabled_skip();
            return;
        }

        let mut appenders = self.appenders.lock();
        Self::dispatch(&mut appenders, event, &self.metrics);
    }

    /// Get the number of events at least one appender failed to write
    pub fn dropped_count(&self) -> u64 {
        self.metrics.dropped_count()
    }

    /// Get the logger metrics for detailed observability
    ///
    /// # Example
    ///
    /// ```
    /// use rust_pattern_logger::Logger;
    ///
    /// let logger = Logger::new();
    /// logger.info("ready");
    ///
    /// let metrics = logger.metrics();
    /// println!("Dropped: {}", metrics.dropped_count());
    /// println!("Total logged: {}", metrics.total_logged());
    /// ```
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// The clock used to timestamp events
    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    /// Flush every appender, even after one fails; the first failure is
    /// returned
    pub fn flush(&self) -> Result<()> {
        let mut appenders = self.appenders.lock();
        let mut first_error = None;
        for appender in appenders.iter_mut() {
            if let Err(e) = appender.flush() {
                eprintln!("[LOGGER ERROR] Failed to flush appender '{}': {}", appender.name(), e);
                self.metrics.record_appender_failure();
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    #[inline]
    pub fn trace(&self, message: impl Into<String>) {
        self.log(LogLevel::Trace, message);
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    pub fn fatal(&self, message: impl Into<String>) {
        self.log(LogLevel::Fatal, message);
    }

    /// Flush and close every appender, then stop accepting events
    ///
    /// Call this once at process exit. Every appender is closed even if an
    /// earlier one fails; the first failure is returned. Calling it again is
    /// a no-op.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_pattern_logger::Logger;
    ///
    /// let logger = Logger::new();
    /// logger.info("Important message");
    /// logger.shutdown().expect("appenders closed");
    /// assert!(!logger.is_enabled());
    /// ```
    pub fn shutdown(&self) -> Result<()> {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let drained: Vec<_> = self.appenders.lock().drain(..).collect();
        let mut first_error = None;
        for mut appender in drained {
            if let Err(e) = appender.close() {
                eprintln!(
                    "[LOGGER ERROR] Failed to close appender '{}' during shutdown: {}",
                    appender.name(),
                    e
                );
                first_error.get_or_insert(e);
            }
        }

        // Report any dropped logs
        let dropped = self.metrics.dropped_count();
        if dropped > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger shutting down with {} dropped logs (drop rate: {:.2}%)",
                dropped,
                self.metrics.drop_rate()
            );
        }

        first_error.map_or(Ok(()), Err)
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

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        // Fallback for hosts that never call shutdown()
        if let Err(e) = self.shutdown() {
            eprintln!("[LOGGER ERROR] Failed to shut down cleanly: {}", e);
        }
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use rust_pattern_logger::prelude::*;
///
/// let logger = Logger::builder()
///     .appender(ConsoleAppender::new())
///     .enabled(true)
///     .build()
///     .unwrap();
/// ```
pub struct LoggerBuilder {
    enabled: bool,
    escape_line_breaks: bool,
    appenders: Vec<Box<dyn Appender>>,
    clock: Option<SharedClock>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            enabled: true,
            escape_line_breaks: false,
            appenders: Vec::new(),
            clock: None,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// See [`Logger::set_escape_line_breaks`]
    #[must_use = "builder methods return a new value"]
    pub fn escape_line_breaks(mut self, escape: bool) -> Self {
        self.escape_line_breaks = escape;
        self
    }

    /// Add an appender
    #[must_use = "builder methods return a new value"]
    pub fn appender<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.appenders.push(Box::new(appender));
        self
    }

    /// Add an already boxed appender
    #[must_use = "builder methods return a new value"]
    pub fn boxed_appender(mut self, appender: Box<dyn Appender>) -> Self {
        self.appenders.push(appender);
        self
    }

    /// Timestamp events with `clock` instead of the system clock
    #[must_use = "builder methods return a new value"]
    pub fn clock(mut self, clock: SharedClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the Logger
    ///
    /// # Errors
    ///
    /// Returns an argument error if an appender has an empty name
    pub fn build(self) -> Result<Logger> {
        let logger = Logger::with_clock(self.clock.unwrap_or_else(system_clock));
        logger.set_enabled(self.enabled);
        logger.set_escape_line_breaks(self.escape_line_breaks);
        for appender in self.appenders {
            logger.add_appender(appender)?;
        }
        Ok(logger)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    /// Create a builder for Logger
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appenders::StringAppender;
    use crate::core::clock::FixedClock;
    use chrono::{TimeZone, Utc};

    struct FailingAppender;

    impl Appender for FailingAppender {
        fn append(&mut self, _event: &LogEvent) -> Result<()> {
            Err(LoggerError::other("Simulated failure"))
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    /// Accepts events but cannot flush
    struct StuckAppender;

    impl Appender for StuckAppender {
        fn append(&mut self, _event: &LogEvent) -> Result<()> {
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            Err(LoggerError::writer("device busy"))
        }

        fn name(&self) -> &str {
            "stuck"
        }
    }

    /// Counts flush calls through a shared handle
    struct CountingAppender(Arc<std::sync::atomic::AtomicUsize>);

    impl Appender for CountingAppender {
        fn append(&mut self, _event: &LogEvent) -> Result<()> {
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    struct PanickingAppender;

    impl Appender for PanickingAppender {
        fn append(&mut self, _event: &LogEvent) -> Result<()> {
            panic!("appender exploded");
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    fn string_appender(name: &str) -> StringAppender {
        StringAppender::new(name).with_pattern("{Level} {Message}|").unwrap()
    }

    #[test]
    fn test_builder_basic() {
        let logger = Logger::builder().build().unwrap();
        assert!(logger.is_enabled());
        assert_eq!(logger.dropped_count(), 0);
    }

    #[test]
    fn test_fan_out_in_insertion_order() {
        let first = string_appender("first");
        let second = string_appender("second");
        let (a, b) = (first.buffer(), second.buffer());

        let logger = Logger::builder()
            .appender(first)
            .appender(second)
            .build()
            .unwrap();
        logger.info("hello");
        logger.warn("careful");

        assert_eq!(logger.appender_names(), vec!["first", "second"]);
        assert_eq!(a.contents(), "INFO hello|WARN careful|");
        assert_eq!(b.contents(), a.contents());
        assert_eq!(logger.metrics().total_logged(), 2);
    }

    #[test]
    fn test_failing_appender_is_isolated() {
        let healthy = string_appender("healthy");
        let buffer = healthy.buffer();
        let logger = Logger::new();
        logger.add_appender(Box::new(FailingAppender)).unwrap();
        logger.add_appender(Box::new(PanickingAppender)).unwrap();
        logger.add_appender(Box::new(healthy)).unwrap();

        for _ in 0..3 {
            logger.error("still delivered");
        }

        assert_eq!(buffer.contents().matches("still delivered").count(), 3);
        assert_eq!(logger.dropped_count(), 3);
        assert_eq!(logger.metrics().appender_failures(), 6);
    }

    #[test]
    fn test_disable_and_enable() {
        let appender = string_appender("s");
        let buffer = appender.buffer();
        let logger = Logger::builder().appender(appender).build().unwrap();

        logger.set_enabled(false);
        logger.info("hidden");
        logger.set_enabled(true);
        logger.info("shown");

        assert_eq!(buffer.contents(), "INFO shown|");
        assert_eq!(logger.metrics().disabled_skips(), 1);
    }

    #[test]
    fn test_remove_appender() {
        let logger = Logger::builder()
            .appender(string_appender("a"))
            .appender(string_appender("b"))
            .build()
            .unwrap();

        assert!(logger.remove_appender("a"));
        assert!(!logger.remove_appender("a"));
        assert_eq!(logger.appender_names(), vec!["b"]);

        logger.clear_appenders();
        assert!(logger.appender_names().is_empty());
    }

    #[test]
    fn test_shutdown_stops_logging() {
        let appender = string_appender("s");
        let buffer = appender.buffer();
        let logger = Logger::builder().appender(appender).build().unwrap();

        logger.info("before");
        logger.shutdown().unwrap();
        logger.info("after");
        logger.shutdown().unwrap();

        assert_eq!(buffer.contents(), "INFO before|");
        assert!(matches!(
            logger.add_appender(Box::new(string_appender("late"))),
            Err(LoggerError::LoggerStopped)
        ));
    }

    #[test]
    fn test_events_use_injected_clock() {
        let at = Utc.with_ymd_and_hms(2020, 1, 1, 8, 0, 0).unwrap();
        let appender = StringAppender::new("s").with_pattern("{DateTime:u}").unwrap();
        let buffer = appender.buffer();
        let logger = Logger::builder()
            .clock(Arc::new(FixedClock::new(at)))
            .appender(appender)
            .build()
            .unwrap();

        logger.info("tick");
        assert_eq!(buffer.contents(), "2020-01-01 08:00:00Z");
    }

    #[test]
    fn test_unnamed_appender_is_rejected() {
        let logger = Logger::new();
        let unnamed = StringAppender::new("");
        assert!(matches!(
            logger.add_appender(Box::new(unnamed)),
            Err(LoggerError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_flush_reaches_appenders_after_a_failure() {
        let flushes = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let logger = Logger::builder()
            .appender(StuckAppender)
            .appender(CountingAppender(Arc::clone(&flushes)))
            .build()
            .unwrap();

        let err = logger.flush().unwrap_err();
        assert!(matches!(err, LoggerError::WriterError(_)));
        assert_eq!(flushes.load(Ordering::SeqCst), 1);
        assert_eq!(logger.metrics().appender_failures(), 1);
    }

    #[test]
    fn test_multiline_messages_are_kept_by_default() {
        let appender = StringAppender::new("s").with_pattern("{Message}").unwrap();
        let buffer = appender.buffer();
        let logger = Logger::builder().appender(appender).build().unwrap();

        logger.error("boom\n  at frame 1\tx");
        assert!(!logger.escapes_line_breaks());
        assert_eq!(buffer.contents(), "boom\n  at frame 1\tx");
    }

    #[test]
    fn test_escape_line_breaks_when_enabled() {
        let appender = StringAppender::new("s").with_pattern("{Message}|").unwrap();
        let buffer = appender.buffer();
        let logger = Logger::builder()
            .escape_line_breaks(true)
            .appender(appender)
            .build()
            .unwrap();

        logger.info("forged\n[INFO ] entry");
        logger.set_escape_line_breaks(false);
        logger.info("two\nlines");

        assert_eq!(buffer.contents(), "forged\\n[INFO ] entry|two\nlines|");
    }
}

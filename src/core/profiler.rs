//! Section timing
//!
//! A [`Profiler`] accumulates elapsed-time statistics per named section. It
//! is independent of the logger; [`Profiler::log_report`] is the only bridge.

use super::{
    error::{LoggerError, Result},
    log_level::LogLevel,
    logger::Logger,
};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Accumulated timings of one section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionStats {
    pub count: u64,
    pub total: Duration,
    pub min: Duration,
    pub max: Duration,
}

impl SectionStats {
    fn first(elapsed: Duration) -> Self {
        Self {
            count: 1,
            total: elapsed,
            min: elapsed,
            max: elapsed,
        }
    }

    fn add(&mut self, elapsed: Duration) {
        self.count += 1;
        self.total = self.total.saturating_add(elapsed);
        self.min = self.min.min(elapsed);
        self.max = self.max.max(elapsed);
    }

    /// Average duration, zero when nothing was recorded
    pub fn mean(&self) -> Duration {
        match u32::try_from(self.count) {
            Ok(0) => Duration::ZERO,
            Ok(count) => self.total / count,
            Err(_) => Duration::from_secs_f64(self.total.as_secs_f64() / self.count as f64),
        }
    }
}

type Sections = Arc<Mutex<BTreeMap<String, SectionStats>>>;

/// Collects section timings; clones share the same records
///
/// # Example
///
/// ```
/// use rust_pattern_logger::Profiler;
///
/// let profiler = Profiler::new();
/// {
///     let _guard = profiler.start("load").unwrap();
///     // ... work ...
/// }
/// assert_eq!(profiler.stats("load").unwrap().count, 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Profiler {
    sections: Sections,
}

impl Profiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start timing `section`; the time is recorded when the guard is
    /// dropped or stopped
    ///
    /// # Errors
    ///
    /// Returns an argument error if `section` is empty
    pub fn start(&self, section: &str) -> Result<ProfileGuard> {
        validate_section(section)?;
        Ok(ProfileGuard {
            sections: Arc::clone(&self.sections),
            section: section.to_string(),
            started: Instant::now(),
            stopped: false,
        })
    }

    /// Time a closure under `section`
    ///
    /// # Errors
    ///
    /// Returns an argument error if `section` is empty; `f` is not run
    pub fn measure<T>(&self, section: &str, f: impl FnOnce() -> T) -> Result<T> {
        let guard = self.start(section)?;
        let value = f();
        guard.stop();
        Ok(value)
    }

    /// Add one externally measured duration
    ///
    /// # Errors
    ///
    /// Returns an argument error if `section` is empty
    pub fn record(&self, section: &str, elapsed: Duration) -> Result<()> {
        validate_section(section)?;
        record(&self.sections, section, elapsed);
        Ok(())
    }

    pub fn stats(&self, section: &str) -> Option<SectionStats> {
        self.sections.lock().get(section).copied()
    }

    /// All sections, sorted by name
    pub fn snapshot(&self) -> Vec<(String, SectionStats)> {
        self.sections
            .lock()
            .iter()
            .map(|(name, stats)| (name.clone(), *stats))
            .collect()
    }

    pub fn reset(&self) {
        self.sections.lock().clear();
    }

    /// One line per section, sorted by name
    pub fn report(&self) -> String {
        let mut out = String::new();
        for (name, stats) in self.snapshot() {
            let _ = writeln!(
                out,
                "{}: count={} total={:?} mean={:?} min={:?} max={:?}",
                name,
                stats.count,
                stats.total,
                stats.mean(),
                stats.min,
                stats.max
            );
        }
        out
    }

    /// Log each report line at info level
    pub fn log_report(&self, logger: &Logger) {
        for line in self.report().lines() {
            logger.log(LogLevel::Info, line);
        }
    }
}

fn validate_section(section: &str) -> Result<()> {
    if section.is_empty() {
        return Err(LoggerError::argument(
            "section",
            "profiling section name must not be empty",
        ));
    }
    Ok(())
}

fn record(sections: &Sections, section: &str, elapsed: Duration) {
    let mut sections = sections.lock();
    match sections.get_mut(section) {
        Some(stats) => stats.add(elapsed),
        None => {
            sections.insert(section.to_string(), SectionStats::first(elapsed));
        }
    }
}

/// RAII guard for a running section
///
/// The elapsed time is recorded exactly once, on [`ProfileGuard::stop`] or
/// on drop, so early returns and panics are still measured.
#[must_use = "dropping the guard immediately records a near-zero duration"]
pub struct ProfileGuard {
    sections: Sections,
    section: String,
    started: Instant,
    stopped: bool,
}

impl ProfileGuard {
    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Record now and return the measured duration
    pub fn stop(mut self) -> Duration {
        self.finish()
    }

    fn finish(&mut self) -> Duration {
        let elapsed = self.started.elapsed();
        if !self.stopped {
            self.stopped = true;
            record(&self.sections, &self.section, elapsed);
        }
        elapsed
    }
}

impl Drop for ProfileGuard {
    fn drop(&mut self) {
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appenders::StringAppender;

    #[test]
    fn test_guard_records_on_drop() {
        let profiler = Profiler::new();
        {
            let _guard = profiler.start("scope").unwrap();
        }
        {
            let _guard = profiler.start("scope").unwrap();
        }
        assert_eq!(profiler.stats("scope").unwrap().count, 2);
    }

    #[test]
    fn test_stop_records_once() {
        let profiler = Profiler::new();
        let guard = profiler.start("once").unwrap();
        let elapsed = guard.stop();

        let stats = profiler.stats("once").unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.total, elapsed);
    }

    #[test]
    fn test_guard_records_when_panicking() {
        let profiler = Profiler::new();
        let cloned = profiler.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _guard = cloned.start("panics").unwrap();
            panic!("boom");
        }));

        assert!(result.is_err());
        assert_eq!(profiler.stats("panics").unwrap().count, 1);
    }

    #[test]
    fn test_recorded_statistics() {
        let profiler = Profiler::new();
        for ms in [10, 30, 20] {
            profiler.record("io", Duration::from_millis(ms)).unwrap();
        }

        let stats = profiler.stats("io").unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.total, Duration::from_millis(60));
        assert_eq!(stats.min, Duration::from_millis(10));
        assert_eq!(stats.max, Duration::from_millis(30));
        assert_eq!(stats.mean(), Duration::from_millis(20));
    }

    #[test]
    fn test_empty_section_is_rejected() {
        let profiler = Profiler::new();
        assert!(matches!(
            profiler.start(""),
            Err(LoggerError::InvalidArgument { .. })
        ));
        assert!(profiler.record("", Duration::ZERO).is_err());
        assert!(profiler.snapshot().is_empty());
    }

    #[test]
    fn test_measure_returns_value() {
        let profiler = Profiler::new();
        let value = profiler.measure("compute", || 6 * 7).unwrap();
        assert_eq!(value, 42);
        assert!(profiler.stats("compute").is_some());
    }

    #[test]
    fn test_report_and_reset() {
        let profiler = Profiler::new();
        profiler.record("b", Duration::from_millis(2)).unwrap();
        profiler.record("a", Duration::from_millis(1)).unwrap();

        let report = profiler.report();
        let names: Vec<_> = report
            .lines()
            .map(|line| line.split(':').next().unwrap())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(report.contains("count=1"));

        profiler.reset();
        assert!(profiler.report().is_empty());
    }

    #[test]
    fn test_log_report() {
        let appender = StringAppender::new("s").with_pattern("{Level} {Message}\n").unwrap();
        let buffer = appender.buffer();
        let logger = Logger::builder().appender(appender).build().unwrap();

        let profiler = Profiler::new();
        profiler.record("db", Duration::from_millis(5)).unwrap();
        profiler.log_report(&logger);

        assert!(buffer.contents().starts_with("INFO db: count=1"));
    }
}

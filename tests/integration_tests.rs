//! Integration tests for logger system
//!
//! These tests verify:
//! - Log injection prevention
//! - Pattern rendering through real appenders
//! - Rotation into template-named backups
//! - Configuration-driven logger construction
//! - Error isolation between appenders
//! - Profiling output through the logger

use chrono::{TimeZone, Utc};
use rust_pattern_logger::appenders::{
    FileAppender, RotatingFileAppender, RotationPolicy, RotationStrategy, StringAppender,
};
use rust_pattern_logger::core::{
    Appender, AppenderConfig, AppenderRegistry, Clock, FixedClock, LogEvent, LogLevel, Logger,
    LoggerConfig, LoggerError, Profiler, Result,
};
use rust_pattern_logger::format::{BackupPath, FolderMap, SpecialFolder};
use rust_pattern_logger::info;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2020, 1, 1, 12, 0, 0).unwrap(),
    ))
}

#[test]
fn test_log_injection_prevention() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("injection_test.log");

    let appender = FileAppender::new(&log_file).expect("Failed to create appender");
    let logger = Logger::builder()
        .escape_line_breaks(true)
        .appender(appender)
        .build()
        .unwrap();

    // Try to inject fake log entries with newlines
    let malicious_message = "User login\nERROR [2024-10-17] Fake error injected\nINFO Continuation";
    logger.info(malicious_message);
    logger.flush().expect("Failed to flush");

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    assert!(content.contains("\\n"));
    assert!(!content.contains("\nERROR [2024-10-17] Fake error injected\n"));

    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1, "Log should be a single line, not multiple");
}

#[test]
fn test_stack_trace_keeps_its_lines() {
    let temp_dir = TempDir::new().unwrap();
    let log_file = temp_dir.path().join("trace.log");

    let appender = FileAppender::new(&log_file)
        .unwrap()
        .with_pattern("{Message}{NewLine}")
        .unwrap();
    let logger = Logger::builder().appender(appender).build().unwrap();

    logger.error("boom\n  at frame 1\tx");
    logger.shutdown().unwrap();

    let content = fs::read_to_string(&log_file).unwrap();
    assert_eq!(content.lines().collect::<Vec<_>>(), vec!["boom", "  at frame 1\tx"]);
}

#[test]
fn test_default_pattern_in_file() {
    let temp_dir = TempDir::new().unwrap();
    let log_file = temp_dir.path().join("default.log");

    let logger = Logger::builder()
        .clock(fixed_clock())
        .appender(FileAppender::new(&log_file).unwrap())
        .build()
        .unwrap();
    logger.warn("low disk");
    logger.shutdown().unwrap();

    let expected_time = fixed_clock().now_local().format("%Y-%m-%d %H:%M:%S%.3f").to_string();
    let content = fs::read_to_string(&log_file).unwrap();
    assert_eq!(content.trim_end(), format!("{} [WARN ] low disk", expected_time));
}

#[test]
fn test_all_fields_render_through_appender() {
    let appender = StringAppender::new("all")
        .with_pattern("{Level,-5}|{Thread}|{Type}.{Method}|{Line:000}|{Message,8}")
        .unwrap();
    let buffer = appender.buffer();
    let logger = Logger::builder().appender(appender).build().unwrap();

    let line = line!() + 1;
    info!(logger, "{}", "ok");

    let contents = buffer.contents();
    let parts: Vec<&str> = contents.split('|').collect();
    assert_eq!(parts[0], "INFO ");
    assert!(parts[1].parse::<u64>().unwrap() > 0);
    assert_eq!(
        parts[2],
        format!("{}.test_all_fields_render_through_appender", module_path!())
    );
    assert_eq!(parts[3], format!("{:03}", line));
    assert_eq!(parts[4], "      ok");
}

#[test]
fn test_size_rotation_with_backup_template() {
    let temp_dir = TempDir::new().unwrap();
    let log_file = temp_dir.path().join("service.log");
    let template = format!(
        "{}/archive/{{FileBody}}.{{DateTime:yyyyMMdd}}{{Index:\\.000}}{{Extension}}",
        temp_dir.path().display()
    );

    let policy = RotationPolicy::new()
        .with_strategy(RotationStrategy::size(10))
        .with_backup_pattern(&template)
        .unwrap()
        .with_max_backups(10);
    let appender = RotatingFileAppender::with_policy(&log_file, policy)
        .unwrap()
        .with_pattern("{Message}{NewLine}")
        .unwrap()
        .with_clock(fixed_clock());

    let logger = Logger::builder()
        .clock(fixed_clock())
        .appender(appender)
        .build()
        .unwrap();
    for i in 0..4 {
        logger.info(format!("message number {:02}", i));
    }
    logger.shutdown().unwrap();

    let day = fixed_clock().now_local().format("%Y%m%d").to_string();
    let archive = temp_dir.path().join("archive");
    let first = archive.join(format!("service.{}.log", day));
    let second = archive.join(format!("service.{}.001.log", day));
    let third = archive.join(format!("service.{}.002.log", day));

    assert!(fs::read_to_string(first).unwrap().contains("message number 00"));
    assert!(fs::read_to_string(second).unwrap().contains("message number 01"));
    assert!(fs::read_to_string(third).unwrap().contains("message number 02"));
    assert!(fs::read_to_string(&log_file)
        .unwrap()
        .contains("message number 03"));
}

#[test]
fn test_special_folder_backup_rendering() {
    let folders = FolderMap::new().with(SpecialFolder::ApplicationData, "/srv/appdata");
    let backup = BackupPath::compile_with(
        r"{ApplicationData}/{DateTime:yyyy-MM-dd}{Index:\.000}.log",
        &folders,
    )
    .unwrap();
    let at = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();

    assert_eq!(
        backup.render("", &at, Some(7)),
        "/srv/appdata/2020-01-01.007.log"
    );
    assert_eq!(backup.render("", &at, None), "/srv/appdata/2020-01-01.log");
}

#[test]
fn test_logger_from_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let log_file = temp_dir.path().join("configured.log");
    let config_file = temp_dir.path().join("logger.json");

    let document = serde_json::json!({
        "enabled": true,
        "appenders": [
            {
                "type": "file",
                "name": "main",
                "pattern": "{Level}: {Message}{NewLine}",
                "settings": { "path": log_file }
            }
        ]
    });
    fs::write(&config_file, document.to_string()).unwrap();

    let config = LoggerConfig::from_file(&config_file).unwrap();
    let logger = AppenderRegistry::with_defaults()
        .build_logger(&config)
        .unwrap();
    logger.error("configured error");
    logger.shutdown().unwrap();

    assert_eq!(
        fs::read_to_string(&log_file).unwrap().trim_end(),
        "ERROR: configured error"
    );
}

#[test]
fn test_missing_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let err = LoggerConfig::from_file(temp_dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, LoggerError::IoOperation { .. }));
}

#[test]
fn test_config_with_unknown_appender_type() {
    let config = LoggerConfig::default().with_appender(AppenderConfig::new("eventlog"));
    let err = AppenderRegistry::with_defaults()
        .build_logger(&config)
        .err()
        .unwrap();
    assert!(err.to_string().contains("eventlog"));
}

/// Appender that fails every other write
struct FlakyAppender {
    calls: usize,
}

impl Appender for FlakyAppender {
    fn append(&mut self, _event: &LogEvent) -> Result<()> {
        self.calls += 1;
        if self.calls % 2 == 0 {
            Err(LoggerError::writer("flaky write"))
        } else {
            Ok(())
        }
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "flaky"
    }
}

#[test]
fn test_error_tracking() {
    let healthy = StringAppender::new("healthy").with_pattern("{Message};").unwrap();
    let buffer = healthy.buffer();

    let logger = Logger::builder()
        .appender(FlakyAppender { calls: 0 })
        .appender(healthy)
        .build()
        .unwrap();

    for i in 0..10 {
        logger.info(format!("{}", i));
    }

    assert_eq!(buffer.contents(), "0;1;2;3;4;5;6;7;8;9;");
    assert_eq!(logger.dropped_count(), 5);
    assert_eq!(logger.metrics().total_logged(), 5);
    assert_eq!(logger.metrics().appender_failures(), 5);
}

#[test]
fn test_bad_pattern_is_reported_per_event() {
    let broken = StringAppender::new("broken")
        .with_pattern("{DateTime:Q} {Message}")
        .unwrap();
    let healthy = StringAppender::new("healthy").with_pattern("{Message}").unwrap();
    let buffer = healthy.buffer();

    let logger = Logger::builder()
        .appender(broken)
        .appender(healthy)
        .build()
        .unwrap();
    logger.info("a");
    logger.info("b");

    assert_eq!(buffer.contents(), "ab");
    assert_eq!(logger.metrics().appender_failures(), 2);
}

#[test]
fn test_profiler_report_through_logger() {
    let appender = StringAppender::new("report").with_pattern("{Message}\n").unwrap();
    let buffer = appender.buffer();
    let logger = Logger::builder().appender(appender).build().unwrap();

    let profiler = Profiler::new();
    profiler.record("parse", Duration::from_millis(4)).unwrap();
    profiler.record("parse", Duration::from_millis(6)).unwrap();
    {
        let _guard = profiler.start("render").unwrap();
    }
    profiler.log_report(&logger);

    let contents = buffer.contents();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("parse: count=2 total=10ms mean=5ms"));
    assert!(lines[1].starts_with("render: count=1"));
}

#[test]
fn test_disabled_logger_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let log_file = temp_dir.path().join("disabled.log");

    let logger = Logger::builder()
        .enabled(false)
        .appender(FileAppender::new(&log_file).unwrap())
        .build()
        .unwrap();
    for level in LogLevel::ALL {
        logger.log(level, "ignored");
    }
    logger.shutdown().unwrap();

    assert_eq!(fs::read_to_string(&log_file).unwrap(), "");
    assert_eq!(logger.metrics().disabled_skips(), LogLevel::ALL.len() as u64);
}

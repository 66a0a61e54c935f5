//! Criterion benchmarks for rust_pattern_logger

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_pattern_logger::format::FolderMap;
use rust_pattern_logger::prelude::*;
use std::sync::Arc;

const PATTERNS: [(&str, &str); 4] = [
    ("literal", "static text only"),
    ("message", "{Message}"),
    (
        "default",
        "{DateTime:yyyy-MM-dd HH:mm:ss.fff} [{Level,-5}] {Message}{NewLine}",
    ),
    (
        "everything",
        "{DateTime:o} {Level,5} [{Thread:D4}] {Type}.{Method}({File}:{Line}) {Message}{NewLine}",
    ),
];

fn sample_event() -> LogEvent {
    LogEvent::new(LogLevel::Info, "user 42 logged in from 10.0.0.1").with_caller(CallerInfo::new(
        "src/session.rs",
        128,
        "login",
        "app::session::Session",
    ))
}

// ============================================================================
// Pattern Benchmarks
// ============================================================================

fn bench_pattern_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("pattern_compile");
    group.throughput(Throughput::Elements(1));

    for (name, template) in PATTERNS {
        group.bench_with_input(BenchmarkId::from_parameter(name), template, |b, template| {
            b.iter(|| LogPattern::compile(black_box(template)).unwrap());
        });
    }

    group.finish();
}

fn bench_pattern_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("pattern_render");
    group.throughput(Throughput::Elements(1));
    let event = sample_event();

    for (name, template) in PATTERNS {
        let pattern = LogPattern::compile(template).unwrap();
        group.bench_function(name, |b| {
            b.iter(|| pattern.render(black_box(&event)).unwrap());
        });
    }

    group.finish();
}

// ============================================================================
// Backup Path Benchmarks
// ============================================================================

fn bench_backup_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("backup_path");
    group.throughput(Throughput::Elements(1));

    let folders = FolderMap::new().with(
        rust_pattern_logger::format::SpecialFolder::ApplicationData,
        "/home/user/.config",
    );
    let template = r"{ApplicationData}/logs/{FileBody}.{DateTime:yyyy-MM-dd}{Index:\.000}{Extension}";
    let backup = BackupPath::compile_with(template, &folders).unwrap();
    let at = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();

    group.bench_function("compile", |b| {
        b.iter(|| BackupPath::compile_with(black_box(template), &folders).unwrap());
    });

    group.bench_function("render_without_index", |b| {
        b.iter(|| backup.render(black_box("/var/log/app.log"), &at, None));
    });

    group.bench_function("render_with_index", |b| {
        b.iter(|| backup.render(black_box("/var/log/app.log"), &at, Some(black_box(7))));
    });

    group.finish();
}

// ============================================================================
// Logging Performance Benchmarks
// ============================================================================

fn bench_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("logging");
    group.throughput(Throughput::Elements(1));

    let appender = StringAppender::new("memory");
    let buffer = appender.buffer();
    let logger = Logger::builder().appender(appender).build().unwrap();

    group.bench_function("info", |b| {
        b.iter(|| {
            logger.info(black_box("Info message"));
            buffer.clear();
        });
    });

    group.bench_function("disabled", |b| {
        logger.set_enabled(false);
        b.iter(|| logger.info(black_box("Skipped message")));
        logger.set_enabled(true);
    });

    group.bench_function("no_appenders", |b| {
        let empty = Logger::new();
        b.iter(|| empty.info(black_box("Nobody listens")));
    });

    group.finish();
}

fn bench_concurrent_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_logging");

    for threads in [2usize, 4, 8] {
        group.throughput(Throughput::Elements((threads * 100) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, &threads| {
            let appender = StringAppender::new("memory").with_pattern("{Message}").unwrap();
            let buffer = appender.buffer();
            let logger = Arc::new(Logger::builder().appender(appender).build().unwrap());

            b.iter(|| {
                let handles: Vec<_> = (0..threads)
                    .map(|_| {
                        let logger = Arc::clone(&logger);
                        std::thread::spawn(move || {
                            for i in 0..100 {
                                logger.info(format!("message {}", i));
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().unwrap();
                }
                buffer.clear();
            });
        });
    }

    group.finish();
}

fn bench_profiler(c: &mut Criterion) {
    let mut group = c.benchmark_group("profiler");
    group.throughput(Throughput::Elements(1));
    let profiler = Profiler::new();

    group.bench_function("guard", |b| {
        b.iter(|| {
            let _guard = profiler.start(black_box("section")).unwrap();
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_pattern_compile,
    bench_pattern_render,
    bench_backup_path,
    bench_logging,
    bench_concurrent_logging,
    bench_profiler,
);

criterion_main!(benches);

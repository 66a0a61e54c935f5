//! Profiling example
//!
//! Times named sections with scoped guards and writes the report through the
//! logger.
//!
//! Run with: cargo run --example profiling

use rust_pattern_logger::prelude::*;
use std::thread;
use std::time::Duration;

fn load(profiler: &Profiler, id: u64) -> Result<u64> {
    let _guard = profiler.start("load")?;
    thread::sleep(Duration::from_millis(2 + id % 3));
    Ok(id * 10)
}

fn main() -> Result<()> {
    println!("=== Rust Pattern Logger - Profiling Example ===\n");

    let logger = Logger::builder()
        .appender(ConsoleAppender::new().with_pattern("{DateTime:HH:mm:ss.fff} {Message}{NewLine}")?)
        .build()?;
    let profiler = Profiler::new();

    let mut total = 0;
    for id in 0..10 {
        total += load(&profiler, id)?;
    }

    let sum = profiler.measure("sum", || (0..1_000_000u64).sum::<u64>())?;
    logger.info(format!("Loaded total {}, computed {}", total, sum));

    let guard = profiler.start("sleep")?;
    thread::sleep(Duration::from_millis(5));
    let elapsed = guard.stop();
    logger.info(format!("Slept for {:?}", elapsed));

    println!("\nReport:");
    profiler.log_report(&logger);

    logger.shutdown()?;
    println!("\n=== Example completed successfully! ===");

    Ok(())
}

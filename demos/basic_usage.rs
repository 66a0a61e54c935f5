//! Basic logger usage example
//!
//! Demonstrates console logging with custom patterns, the enable switch and
//! caller information captured by the logging macros.
//!
//! Run with: cargo run --example basic_usage

use rust_pattern_logger::prelude::*;
use rust_pattern_logger::{info, warn};

struct Inventory;

impl Inventory {
    fn restock(logger: &Logger, item: &str, count: u32) {
        info!(logger, "Restocked {} x{}", item, count);
        if count < 5 {
            warn!(logger, "Low stock for {}", item);
        }
    }
}

fn main() -> Result<()> {
    println!("=== Rust Pattern Logger - Basic Usage Example ===\n");

    let logger = Logger::builder()
        .appender(ConsoleAppender::new())
        .appender(
            ConsoleAppender::with_colors(false)
                .with_pattern("    caller: {Type}.{Method} line {Line:000}, thread {Thread}{NewLine}")?
                .with_name("caller"),
        )
        .build()?;

    println!("1. Logging at different levels:");
    logger.trace("This is a trace message");
    logger.debug("This is a debug message");
    logger.info("This is an info message");
    logger.warn("This is a warning message");
    logger.error("This is an error message");
    logger.fatal("This is a fatal message");

    println!("\n2. Macros record where they were called:");
    Inventory::restock(&logger, "widgets", 3);

    println!("\n3. Disabling the logger:");
    logger.set_enabled(false);
    logger.info("Hidden message");
    logger.set_enabled(true);
    logger.info("Visible again");

    logger.shutdown()?;
    println!("\n=== Example completed successfully! ===");

    Ok(())
}

//! File logging example
//!
//! Demonstrates a configuration-driven logger writing to the console and to a
//! rotating file whose backups land in dated folders.
//!
//! Run with: cargo run --example file_logging

use rust_pattern_logger::prelude::*;

const CONFIG: &str = r#"{
    "enabled": true,
    "appenders": [
        { "type": "console", "pattern": "{Level,-5} {Message}{NewLine}" },
        {
            "type": "rotating_file",
            "name": "application",
            "pattern": "{DateTime:o} [{Level,-5}] [{Thread}] {Message}{NewLine}",
            "settings": {
                "path": "logs/application.log",
                "backup_pattern": "{Directory}/{DateTime:yyyy-MM-dd}/{FileBody}{Index:\\.000}{Extension}",
                "max_bytes": 512,
                "max_backups": 3
            }
        }
    ]
}"#;

fn main() -> Result<()> {
    println!("=== Rust Pattern Logger - File Logging Example ===\n");

    let config = LoggerConfig::from_json_str(CONFIG)?;
    let logger = AppenderRegistry::with_defaults().build_logger(&config)?;
    println!("Appenders: {:?}\n", logger.appender_names());

    logger.info("Application started");
    logger.info("Configuration loaded successfully");
    logger.warn("Using default settings for some options");

    // Enough output to roll the file over a few times
    for i in 1..=20 {
        logger.info(format!("Processing item {}/20", i));
        if i % 7 == 0 {
            logger.warn(format!("Item {} took longer than expected", i));
        }
    }

    logger.info("All operations completed");
    logger.shutdown()?;

    println!("\n=== Example completed successfully! ===");
    println!("Check 'logs/' for the active file and its dated backups");

    Ok(())
}

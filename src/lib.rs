//! # Rust Pattern Logger
//!
//! An embeddable logging framework: a [`Logger`] fans leveled messages out to
//! pluggable appenders, each rendering events through a compiled
//! [`LogPattern`](format::LogPattern), with file appenders rotating into
//! backups named by a [`BackupPath`](format::BackupPath) template.
//!
//! ## Features
//!
//! - **Patterns**: `{DateTime:yyyy-MM-dd HH:mm:ss.fff} [{Level,-5}] {Message}{NewLine}`
//!   compiled once, rendered per event
//! - **Rotation**: size, time and calendar strategies, templated backup names
//!   with special folders, dates and indexes, optional gzip
//! - **Configuration**: JSON documents mapped to appenders through a registry
//! - **Profiling**: per-section timing statistics
//!
//! ## Example
//!
//! ```
//! use rust_pattern_logger::prelude::*;
//!
//! let memory = StringAppender::new("memory")
//!     .with_pattern("[{Level,-5}] {Message}{NewLine}")
//!     .unwrap();
//! let output = memory.buffer();
//!
//! let logger = Logger::builder().appender(memory).build().unwrap();
//! logger.info("service started");
//! logger.shutdown().unwrap();
//!
//! assert!(output.contents().starts_with("[INFO ] service started"));
//! ```

pub mod appenders;
pub mod core;
pub mod format;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{
        ConsoleAppender, FileAppender, RotatingFileAppender, RotationPolicy, RotationStrategy,
        StringAppender, StringBuffer,
    };
    pub use crate::core::{
        Appender, AppenderConfig, AppenderRegistry, CallerInfo, Clock, LogEvent, LogLevel, Logger,
        LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics, Profiler, Result,
    };
    pub use crate::format::{BackupPath, LogPattern};
}

pub use appenders::{ConsoleAppender, FileAppender, RotatingFileAppender, StringAppender};
pub use core::{
    Appender, AppenderConfig, AppenderRegistry, CallerInfo, Clock, FixedClock, LogEvent, LogLevel,
    Logger, LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics, ProfileGuard, Profiler,
    Result, SectionStats, SharedClock, SystemClock,
};
pub use format::{BackupPath, LogPattern};

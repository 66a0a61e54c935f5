//! Core logger types and traits

pub mod appender;
pub mod clock;
pub mod config;
pub mod error;
pub mod log_event;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod profiler;

pub use appender::Appender;
pub use clock::{system_clock, Clock, FixedClock, SharedClock, SystemClock};
pub use config::{AppenderConfig, AppenderFactory, AppenderRegistry, LoggerConfig};
pub use error::{LoggerError, Result};
pub use log_event::{current_thread_id, CallerInfo, LogEvent};
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use profiler::{ProfileGuard, Profiler, SectionStats};

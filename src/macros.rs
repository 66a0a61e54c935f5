//! Logging macros for ergonomic log message formatting.
//!
//! These macros format like `format!` and record where they were called: the
//! source file, line, enclosing function and its type or module, which a
//! pattern reaches through `{File}`, `{Line}`, `{Method}` and `{Type}`.
//!
//! # Examples
//!
//! ```
//! use rust_pattern_logger::prelude::*;
//! use rust_pattern_logger::info;
//!
//! let appender = StringAppender::new("memory")
//!     .with_pattern("{Method}:{Line} {Message}")
//!     .unwrap();
//! let buffer = appender.buffer();
//! let logger = Logger::builder().appender(appender).build().unwrap();
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! assert!(buffer.contents().ends_with("Server listening on port 8080"));
//! ```

/// Caller information for the current source location
///
/// # Examples
///
/// ```
/// mod billing {
///     pub struct Invoice;
///
///     impl Invoice {
///         pub fn total() -> rust_pattern_logger::CallerInfo {
///             rust_pattern_logger::caller!()
///         }
///     }
/// }
///
/// let caller = billing::Invoice::total();
/// assert_eq!(caller.method, "total");
/// assert!(caller.type_name.ends_with("billing::Invoice"));
/// ```
#[macro_export]
macro_rules! caller {
    () => {
        $crate::CallerInfo::from_function_path(file!(), line!(), {
            fn __here() {}
            fn __type_name_of<T>(_: T) -> &'static str {
                ::std::any::type_name::<T>()
            }
            let path = __type_name_of(__here);
            path.strip_suffix("::__here").unwrap_or(path)
        })
    };
}

/// Log a message with automatic formatting.
///
/// # Examples
///
/// ```
/// # use rust_pattern_logger::prelude::*;
/// # let logger = Logger::new();
/// use rust_pattern_logger::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log_at($level, format!($($arg)+), $crate::caller!())
    };
}

/// Log a trace-level message.
///
/// ```
/// # use rust_pattern_logger::prelude::*;
/// # let logger = Logger::new();
/// use rust_pattern_logger::trace;
/// trace!(logger, "Entering function: calculate()");
/// ```
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// ```
/// # use rust_pattern_logger::prelude::*;
/// # let logger = Logger::new();
/// use rust_pattern_logger::error;
/// error!(logger, "Code: {}", 500);
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal-level message.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}

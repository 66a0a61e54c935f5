//! Log event structure

use super::log_level::LogLevel;
use chrono::{DateTime, Local};
use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

// Thread-local cache so each thread draws its numeric id exactly once
thread_local! {
    static THREAD_ID_CACHE: Cell<u64> = const { Cell::new(0) };
}

/// Small, stable numeric id of the calling thread
pub fn current_thread_id() -> u64 {
    THREAD_ID_CACHE.with(|cache| {
        let mut id = cache.get();
        if id == 0 {
            id = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
            cache.set(id);
        }
        id
    })
}

/// Where a log call was made
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerInfo {
    pub file: String,
    pub line: u32,
    pub method: String,
    /// Declaring type, or the module path for free functions
    pub type_name: String,
}

impl CallerInfo {
    pub fn new(
        file: impl Into<String>,
        line: u32,
        method: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            line,
            method: method.into(),
            type_name: type_name.into(),
        }
    }

    /// Build caller info from a fully qualified function path such as
    /// `my_crate::server::Handler::accept::{{closure}}`
    pub fn from_function_path(file: &str, line: u32, path: &str) -> Self {
        let mut parts: Vec<&str> = path
            .split("::")
            .filter(|part| *part != "{{closure}}")
            .collect();
        let method = parts.pop().unwrap_or_default();
        Self::new(file, line, method, parts.join("::"))
    }
}

/// One log call, created at the call site and consumed by the appenders
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
    pub caller: CallerInfo,
    pub thread_id: u64,
}

impl LogEvent {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self::at(Local::now(), level, message)
    }

    pub fn at(timestamp: DateTime<Local>, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            level,
            message: message.into(),
            caller: CallerInfo::default(),
            thread_id: current_thread_id(),
        }
    }

    #[must_use]
    pub fn with_caller(mut self, caller: CallerInfo) -> Self {
        self.caller = caller;
        self
    }

    /// Replace newlines, carriage returns and tabs in the message with
    /// `\n`, `\r` and `\t`, so one event always renders as one line
    #[must_use]
    pub fn with_escaped_line_breaks(mut self) -> Self {
        if self.message.contains(&['\n', '\r', '\t'][..]) {
            self.message = self
                .message
                .replace('\n', "\\n")
                .replace('\r', "\\r")
                .replace('\t', "\\t");
        }
        self
    }

    #[must_use]
    pub fn with_thread_id(mut self, thread_id: u64) -> Self {
        self.thread_id = thread_id;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_is_kept_verbatim() {
        let event = LogEvent::new(LogLevel::Error, "boom\n  at frame 1\tx");
        assert_eq!(event.message, "boom\n  at frame 1\tx");
    }

    #[test]
    fn test_escaped_line_breaks() {
        let event =
            LogEvent::new(LogLevel::Info, "line one\r\nline two\tend").with_escaped_line_breaks();
        assert_eq!(event.message, "line one\\r\\nline two\\tend");

        let plain = LogEvent::new(LogLevel::Info, "single line").with_escaped_line_breaks();
        assert_eq!(plain.message, "single line");
    }

    #[test]
    fn test_thread_id_is_stable_per_thread() {
        let here = current_thread_id();
        assert_eq!(here, current_thread_id());

        let other = std::thread::spawn(current_thread_id).join().unwrap();
        assert_ne!(here, other);
    }

    #[test]
    fn test_caller_from_method_path() {
        let caller =
            CallerInfo::from_function_path("src/server.rs", 42, "app::server::Handler::accept");
        assert_eq!(caller.method, "accept");
        assert_eq!(caller.type_name, "app::server::Handler");
        assert_eq!(caller.line, 42);
    }

    #[test]
    fn test_caller_skips_closures() {
        let caller = CallerInfo::from_function_path("src/main.rs", 7, "app::main::{{closure}}");
        assert_eq!(caller.method, "main");
        assert_eq!(caller.type_name, "app");
    }
}

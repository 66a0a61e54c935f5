//! Appender implementations

pub mod console;
pub mod file;
pub mod rotating_file;
pub mod string;

pub use console::ConsoleAppender;
pub use file::FileAppender;
pub use rotating_file::{
    RotatingFileAppender, RotationPolicy, RotationStrategy, DEFAULT_BACKUP_PATTERN,
    DEFAULT_MAX_BYTES,
};
pub use string::{StringAppender, StringBuffer};

pub use crate::core::Appender;

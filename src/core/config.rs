//! Logger configuration and the appender factory registry
//!
//! A configuration document looks like this:
//!
//! ```json
//! {
//!   "enabled": true,
//!   "appenders": [
//!     { "type": "console", "pattern": "{Level,-5} {Message}{NewLine}" },
//!     {
//!       "type": "rotating_file",
//!       "name": "main",
//!       "settings": {
//!         "path": "logs/app.log",
//!         "backup_pattern": "{Directory}/archive/{FileBody}{Index:\\.000}{Extension}",
//!         "max_bytes": 1048576,
//!         "max_backups": 10
//!       }
//!     }
//!   ]
//! }
//! ```
//!
//! Each `type` is looked up in an [`AppenderRegistry`], whose factory turns
//! the entry into a boxed [`Appender`].

use super::{
    appender::Appender,
    error::{LoggerError, Result},
    logger::Logger,
};
use crate::appenders::{
    ConsoleAppender, FileAppender, RotatingFileAppender, RotationPolicy, RotationStrategy,
    StringAppender, DEFAULT_MAX_BYTES,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Top-level logger configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub enabled: bool,
    /// Escape newlines, carriage returns and tabs in messages
    pub escape_line_breaks: bool,
    pub appenders: Vec<AppenderConfig>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            escape_line_breaks: false,
            appenders: Vec::new(),
        }
    }
}

impl LoggerConfig {
    /// Parse a JSON configuration document
    ///
    /// # Errors
    ///
    /// Returns a JSON error if the document is malformed
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON configuration file
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or a JSON error if it
    /// is malformed
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation(
                "read logger configuration",
                format!("Failed to read '{}'", path.display()),
                e,
            )
        })?;
        Self::from_json_str(&text)
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_appender(mut self, appender: AppenderConfig) -> Self {
        self.appenders.push(appender);
        self
    }
}

/// One appender entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppenderConfig {
    /// Registry key, e.g. `console` or `rotating_file`
    #[serde(rename = "type")]
    pub kind: String,
    /// Defaults to the appender's own name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Defaults to [`DEFAULT_PATTERN`](crate::format::DEFAULT_PATTERN)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Type-specific settings
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub settings: serde_json::Value,
}

impl AppenderConfig {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: None,
            pattern: None,
            settings: serde_json::Value::Null,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_settings(mut self, settings: serde_json::Value) -> Self {
        self.settings = settings;
        self
    }

    /// Deserialize `settings` into a factory's own settings type
    ///
    /// Missing settings deserialize like an empty object.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming this appender type
    pub fn settings<T: DeserializeOwned>(&self) -> Result<T> {
        let value = match &self.settings {
            serde_json::Value::Null => serde_json::Value::Object(serde_json::Map::new()),
            other => other.clone(),
        };
        serde_json::from_value(value)
            .map_err(|e| LoggerError::config(format!("appender '{}'", self.kind), e.to_string()))
    }
}

/// Builds an appender from its configuration entry
pub type AppenderFactory = Arc<dyn Fn(&AppenderConfig) -> Result<Box<dyn Appender>> + Send + Sync>;

/// Maps configured appender types to factories
#[derive(Clone, Default)]
pub struct AppenderRegistry {
    factories: HashMap<String, AppenderFactory>,
}

impl AppenderRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in `console`, `file`, `rotating_file` and
    /// `string` appenders
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("console", build_console);
        registry.register("file", build_file);
        registry.register("rotating_file", build_rotating_file);
        registry.register("string", build_string);
        registry
    }

    /// Register a factory, replacing any previous one for `kind`
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(&AppenderConfig) -> Result<Box<dyn Appender>> + Send + Sync + 'static,
    {
        self.factories.insert(kind.into(), Arc::new(factory));
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Registered type names, sorted
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<_> = self.factories.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Build a single appender
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unregistered type, or whatever
    /// the factory reports
    pub fn build_appender(&self, config: &AppenderConfig) -> Result<Box<dyn Appender>> {
        let factory = self.factories.get(&config.kind).ok_or_else(|| {
            LoggerError::config(
                "appender registry",
                format!("unknown appender type '{}'", config.kind),
            )
        })?;
        factory(config)
    }

    /// Build a logger with every configured appender, in order
    ///
    /// # Errors
    ///
    /// Fails on the first appender that cannot be built
    pub fn build_logger(&self, config: &LoggerConfig) -> Result<Logger> {
        let mut builder = Logger::builder()
            .enabled(config.enabled)
            .escape_line_breaks(config.escape_line_breaks);
        for appender in &config.appenders {
            builder = builder.boxed_appender(self.build_appender(appender)?);
        }
        builder.build()
    }
}

impl std::fmt::Debug for AppenderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppenderRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConsoleSettings {
    colors: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self { colors: true }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RotatingFileSettings {
    path: PathBuf,
    #[serde(default)]
    backup_pattern: Option<String>,
    #[serde(default)]
    strategy: StrategySetting,
    #[serde(default)]
    max_bytes: Option<u64>,
    #[serde(default)]
    interval_secs: Option<u64>,
    #[serde(default)]
    hour: Option<u8>,
    #[serde(default)]
    max_backups: Option<usize>,
    #[serde(default)]
    compress: bool,
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum StrategySetting {
    #[default]
    Size,
    Time,
    Daily,
    Hourly,
    Hybrid,
    Never,
}

impl RotatingFileSettings {
    fn strategy(&self) -> Result<RotationStrategy> {
        let max_bytes = self.max_bytes.unwrap_or(DEFAULT_MAX_BYTES);
        let interval = || {
            self.interval_secs.map(Duration::from_secs).ok_or_else(|| {
                LoggerError::config("appender 'rotating_file'", "interval_secs is required")
            })
        };

        Ok(match self.strategy {
            StrategySetting::Size => RotationStrategy::Size { max_bytes },
            StrategySetting::Time => RotationStrategy::Time {
                interval: interval()?,
            },
            StrategySetting::Daily => {
                let hour = self.hour.unwrap_or(0);
                if hour > 23 {
                    return Err(LoggerError::config(
                        "appender 'rotating_file'",
                        format!("hour must be between 0 and 23, got {}", hour),
                    ));
                }
                RotationStrategy::Daily { hour }
            }
            StrategySetting::Hourly => RotationStrategy::Hourly,
            StrategySetting::Hybrid => RotationStrategy::Hybrid {
                max_bytes,
                interval: interval()?,
            },
            StrategySetting::Never => RotationStrategy::Never,
        })
    }
}

fn build_console(config: &AppenderConfig) -> Result<Box<dyn Appender>> {
    let settings: ConsoleSettings = config.settings()?;
    let mut appender = ConsoleAppender::with_colors(settings.colors);
    if let Some(pattern) = &config.pattern {
        appender = appender.with_pattern(pattern)?;
    }
    if let Some(name) = &config.name {
        appender = appender.with_name(name);
    }
    Ok(Box::new(appender))
}

fn build_file(config: &AppenderConfig) -> Result<Box<dyn Appender>> {
    let settings: FileSettings = config.settings()?;
    let mut appender = FileAppender::new(settings.path)?;
    if let Some(pattern) = &config.pattern {
        appender = appender.with_pattern(pattern)?;
    }
    if let Some(name) = &config.name {
        appender = appender.with_name(name);
    }
    Ok(Box::new(appender))
}

fn build_rotating_file(config: &AppenderConfig) -> Result<Box<dyn Appender>> {
    let settings: RotatingFileSettings = config.settings()?;

    let mut policy = RotationPolicy::new()
        .with_strategy(settings.strategy()?)
        .with_compression(settings.compress);
    if let Some(template) = &settings.backup_pattern {
        policy = policy.with_backup_pattern(template)?;
    }
    if let Some(max_backups) = settings.max_backups {
        policy = policy.with_max_backups(max_backups);
    }

    let mut appender = RotatingFileAppender::with_policy(&settings.path, policy)?;
    if let Some(pattern) = &config.pattern {
        appender = appender.with_pattern(pattern)?;
    }
    if let Some(name) = &config.name {
        appender = appender.with_name(name);
    }
    Ok(Box::new(appender))
}

/// A `string` appender's buffer is only reachable through the logger's
/// appender list, so configured instances suit smoke tests of a document
fn build_string(config: &AppenderConfig) -> Result<Box<dyn Appender>> {
    let mut appender = StringAppender::new(config.name.as_deref().unwrap_or("string"));
    if let Some(pattern) = &config.pattern {
        appender = appender.with_pattern(pattern)?;
    }
    Ok(Box::new(appender))
}

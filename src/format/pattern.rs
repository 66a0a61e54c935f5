//! Log message patterns
//!
//! A pattern such as
//!
//! ```text
//! {DateTime:yyyy-MM-dd HH:mm:ss.fff} [{Level,-5}] {Type}.{Method}: {Message}{NewLine}
//! ```
//!
//! is compiled once into a [`LogPattern`] and rendered for every event.

use super::{compile_segments, FieldValue, Resolved, Segment, ValueKind, LINE_ENDING};
use crate::core::error::{LoggerError, Result};
use crate::core::log_event::LogEvent;
use chrono::Offset;

/// Pattern used by appenders that are not given one
pub const DEFAULT_PATTERN: &str =
    "{DateTime:yyyy-MM-dd HH:mm:ss.fff} [{Level,-5}] {Message}{NewLine}";

/// A field a log pattern can reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogField {
    Timestamp,
    Level,
    Message,
    CallerFile,
    CallerLine,
    CallerMethod,
    CallerType,
    ThreadId,
    NewLine,
}

impl LogField {
    /// Token names, longest first so no name can shadow a longer one
    pub const TOKENS: [(&'static str, LogField); 9] = [
        ("Message", LogField::Message),
        ("NewLine", LogField::NewLine),
        ("Method", LogField::CallerMethod),
        ("Thread", LogField::ThreadId),
        ("Level", LogField::Level),
        ("DateTime", LogField::Timestamp),
        ("File", LogField::CallerFile),
        ("Line", LogField::CallerLine),
        ("Type", LogField::CallerType),
    ];

    pub fn from_token(name: &str) -> Option<Self> {
        Self::TOKENS
            .iter()
            .find(|(token, _)| *token == name)
            .map(|(_, field)| *field)
    }

    pub fn token_name(&self) -> &'static str {
        Self::TOKENS
            .iter()
            .find(|(_, field)| field == self)
            .map(|(token, _)| *token)
            .unwrap_or_default()
    }

    fn kind(&self) -> ValueKind {
        match self {
            LogField::Timestamp => ValueKind::Date,
            LogField::Level => ValueKind::Level,
            LogField::CallerLine | LogField::ThreadId => ValueKind::Number,
            LogField::Message
            | LogField::CallerFile
            | LogField::CallerMethod
            | LogField::CallerType
            | LogField::NewLine => ValueKind::Text,
        }
    }
}

/// A compiled log pattern
///
/// # Examples
///
/// ```
/// use rust_pattern_logger::format::LogPattern;
/// use rust_pattern_logger::core::{LogEvent, LogLevel};
///
/// let pattern = LogPattern::compile("[{Level}] {Message}").unwrap();
/// let event = LogEvent::new(LogLevel::Warn, "disk almost full");
/// assert_eq!(pattern.render(&event).unwrap(), "[WARN] disk almost full");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPattern {
    template: String,
    segments: Vec<Segment<LogField>>,
}

impl LogPattern {
    /// Compile a pattern
    ///
    /// Unknown tokens stay literal text. A malformed sub-format does not fail
    /// compilation; it is reported by every call to [`LogPattern::render`].
    ///
    /// # Errors
    ///
    /// Returns an argument error if the template is empty
    pub fn compile(template: &str) -> Result<Self> {
        if template.is_empty() {
            return Err(LoggerError::argument("template", "log pattern must not be empty"));
        }

        let segments = compile_segments(template, |token| {
            Ok(match LogField::from_token(token.name) {
                Some(field) => Resolved::Field(field, field.kind()),
                None => Resolved::Unknown,
            })
        })?;

        Ok(Self {
            template: template.to_string(),
            segments,
        })
    }

    /// The template as written
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Fields referenced by this pattern, in order
    pub fn fields(&self) -> impl Iterator<Item = LogField> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Field { field, .. } => Some(*field),
            Segment::Literal(_) => None,
        })
    }

    /// Render one event
    ///
    /// # Errors
    ///
    /// Returns a pattern error naming this template if any field carries a
    /// malformed sub-format
    pub fn render(&self, event: &LogEvent) -> Result<String> {
        let mut out = String::with_capacity(self.template.len() + event.message.len() + 32);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field { field, token, spec } => {
                    let spec = spec.as_ref().map_err(|message| {
                        LoggerError::pattern(&self.template, format!("{}: {}", token, message))
                    })?;
                    spec.apply(field_value(*field, event), &mut out);
                }
            }
        }
        Ok(out)
    }
}

impl Default for LogPattern {
    /// [`DEFAULT_PATTERN`], compiled
    fn default() -> Self {
        Self::compile(DEFAULT_PATTERN)
            .unwrap_or_else(|e| unreachable!("default pattern failed to compile: {}", e))
    }
}

fn field_value(field: LogField, event: &LogEvent) -> FieldValue<'_> {
    match field {
        LogField::Timestamp => {
            FieldValue::Date(event.timestamp.with_timezone(&event.timestamp.offset().fix()))
        }
        LogField::Level => FieldValue::Level(event.level),
        LogField::Message => FieldValue::Text(&event.message),
        LogField::CallerFile => FieldValue::Text(&event.caller.file),
        LogField::CallerLine => FieldValue::Number(u64::from(event.caller.line)),
        LogField::CallerMethod => FieldValue::Text(&event.caller.method),
        LogField::CallerType => FieldValue::Text(&event.caller.type_name),
        LogField::ThreadId => FieldValue::Number(event.thread_id),
        LogField::NewLine => FieldValue::Text(LINE_ENDING),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::log_event::CallerInfo;
    use crate::core::log_level::LogLevel;
    use chrono::{Local, TimeZone};

    fn event() -> LogEvent {
        let timestamp = Local
            .with_ymd_and_hms(2020, 1, 1, 12, 30, 45)
            .single()
            .expect("unambiguous local time");
        LogEvent::at(timestamp, LogLevel::Info, "server started")
            .with_caller(CallerInfo::new("src/server.rs", 42, "start", "app::Server"))
            .with_thread_id(7)
    }

    fn render(template: &str) -> String {
        LogPattern::compile(template)
            .expect("compiles")
            .render(&event())
            .expect("renders")
    }

    #[test]
    fn test_all_fields() {
        assert_eq!(
            render("{DateTime:yyyy-MM-dd HH:mm:ss} {Level} {Thread} {File}:{Line} {Type}.{Method} {Message}"),
            "2020-01-01 12:30:45 INFO 7 src/server.rs:42 app::Server.start server started"
        );
    }

    #[test]
    fn test_line_and_newline_are_distinct() {
        let pattern = LogPattern::compile("{Line}{NewLine}").unwrap();
        assert_eq!(
            pattern.fields().collect::<Vec<_>>(),
            vec![LogField::CallerLine, LogField::NewLine]
        );
        assert_eq!(pattern.render(&event()).unwrap(), format!("42{}", LINE_ENDING));
    }

    #[test]
    fn test_literal_only_pattern_ignores_event() {
        assert_eq!(render("just text, no fields"), "just text, no fields");
    }

    #[test]
    fn test_unknown_tokens_stay_literal() {
        assert_eq!(render("{Host} {Message}"), "{Host} server started");
    }

    #[test]
    fn test_alignment_and_subformats() {
        assert_eq!(render("[{Level,-5}]"), "[INFO ]");
        assert_eq!(render("{Line:00000}|{Thread,3}"), "00042|  7");
        assert_eq!(render("{Level:D}"), "2");
    }

    #[test]
    fn test_escaped_braces() {
        assert_eq!(render("{{{Level}}}"), "{INFO}");
    }

    #[test]
    fn test_bad_subformat_fails_at_render_time() {
        let pattern = LogPattern::compile("{DateTime:q} {Message}").expect("compiles lazily");
        let err = pattern.render(&event()).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("{DateTime:q} {Message}"));

        // Reported on every render, not just the first
        assert!(pattern.render(&event()).is_err());
    }

    #[test]
    fn test_empty_template_is_rejected() {
        assert!(matches!(
            LogPattern::compile(""),
            Err(LoggerError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_compiling_twice_is_identical() {
        let a = LogPattern::compile(DEFAULT_PATTERN).unwrap();
        let b = LogPattern::compile(DEFAULT_PATTERN).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.render(&event()).unwrap(), b.render(&event()).unwrap());
    }

    #[test]
    fn test_token_names_round_trip() {
        for (name, field) in LogField::TOKENS {
            assert_eq!(LogField::from_token(name), Some(field));
            assert_eq!(field.token_name(), name);
        }
    }
}

//! Template compilation
//!
//! Log patterns and backup path templates share one grammar (see [`token`]).
//! Both are compiled once into a list of [`Segment`]s and rendered many
//! times; compiled values are immutable and can be shared across threads.

pub mod backup_path;
pub mod date_format;
pub mod number_format;
pub mod pattern;
pub mod special_folder;
pub mod token;

pub use backup_path::{BackupField, BackupPath};
pub use date_format::DateFormat;
pub use number_format::NumberFormat;
pub use pattern::{LogField, LogPattern, DEFAULT_PATTERN};
pub use special_folder::{FolderMap, FolderResolver, SpecialFolder, SystemFolders};

use crate::core::error::Result;
use crate::core::log_level::LogLevel;
use chrono::{DateTime, FixedOffset};
use token::{Piece, TokenSpan, Tokens};

/// Platform line ending written for `{NewLine}`
#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";

/// Widest alignment accepted in `{Name,alignment}`
const MAX_ALIGNMENT: usize = 1_000_000;

/// How a field's value is interpreted by its sub-format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Date,
    Number,
    Level,
}

/// A value handed to a field formatter
#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Date(DateTime<FixedOffset>),
    Number(u64),
    Level(LogLevel),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ValueFormat {
    Text,
    Date(DateFormat),
    Number(NumberFormat),
    Level(LevelFormat),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LevelFormat {
    Name,
    Decimal,
    Hex,
}

impl LevelFormat {
    fn parse(spec: &str) -> std::result::Result<Self, String> {
        match spec {
            "" | "G" | "g" | "F" | "f" => Ok(LevelFormat::Name),
            "D" | "d" => Ok(LevelFormat::Decimal),
            "X" | "x" => Ok(LevelFormat::Hex),
            other => Err(format!("unknown level format '{}'", other)),
        }
    }

    fn format(&self, level: LogLevel) -> String {
        match self {
            LevelFormat::Name => level.to_str().to_string(),
            LevelFormat::Decimal => level.value().to_string(),
            LevelFormat::Hex => format!("{:08X}", level.value()),
        }
    }
}

/// Parsed alignment and sub-format of one token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Positive right-aligns, negative left-aligns
    alignment: Option<i64>,
    format: ValueFormat,
}

impl FieldSpec {
    pub fn parse(
        kind: ValueKind,
        alignment: Option<&str>,
        format: Option<&str>,
    ) -> std::result::Result<Self, String> {
        let alignment = match alignment {
            None => None,
            Some(raw) => {
                let width: i64 = raw
                    .parse()
                    .map_err(|_| format!("invalid alignment '{}'", raw))?;
                if width.unsigned_abs() as usize >= MAX_ALIGNMENT {
                    return Err(format!("alignment {} is out of range", width));
                }
                Some(width)
            }
        };

        let spec = format.unwrap_or("");
        let format = match kind {
            ValueKind::Text => ValueFormat::Text,
            ValueKind::Date => ValueFormat::Date(DateFormat::parse(spec)?),
            ValueKind::Number => ValueFormat::Number(NumberFormat::parse(spec)?),
            ValueKind::Level => ValueFormat::Level(LevelFormat::parse(spec)?),
        };

        Ok(Self { alignment, format })
    }

    /// Format a value and apply alignment
    pub fn apply(&self, value: FieldValue<'_>, out: &mut String) {
        let text = match (&self.format, value) {
            (ValueFormat::Date(format), FieldValue::Date(datetime)) => format.format(&datetime),
            (ValueFormat::Number(format), FieldValue::Number(number)) => format.format(number),
            (ValueFormat::Level(format), FieldValue::Level(level)) => format.format(level),
            (_, FieldValue::Text(text)) => text.to_string(),
            (_, FieldValue::Date(datetime)) => datetime.to_rfc3339(),
            (_, FieldValue::Number(number)) => number.to_string(),
            (_, FieldValue::Level(level)) => level.to_str().to_string(),
        };
        pad_into(out, &text, self.alignment);
    }
}

fn pad_into(out: &mut String, text: &str, alignment: Option<i64>) {
    let width = alignment.map_or(0, |w| w.unsigned_abs() as usize);
    let len = text.chars().count();
    if len >= width {
        out.push_str(text);
        return;
    }
    let fill = " ".repeat(width - len);
    if alignment.is_some_and(|w| w < 0) {
        out.push_str(text);
        out.push_str(&fill);
    } else {
        out.push_str(&fill);
        out.push_str(text);
    }
}

/// One compiled piece of a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<F> {
    Literal(String),
    Field {
        field: F,
        /// The token as written, for error messages
        token: String,
        /// A malformed sub-format is kept and reported when rendering
        spec: std::result::Result<FieldSpec, String>,
    },
}

/// What a token resolves to during compilation
pub(crate) enum Resolved<F> {
    Field(F, ValueKind),
    Literal(String),
    Unknown,
}

/// Split a template into segments, merging adjacent literal text
pub(crate) fn compile_segments<F, R>(template: &str, mut resolve: R) -> Result<Vec<Segment<F>>>
where
    R: FnMut(&TokenSpan<'_>) -> Result<Resolved<F>>,
{
    let mut segments = Vec::new();
    for piece in Tokens::new(template) {
        match piece {
            Piece::Literal(text) => push_literal(&mut segments, text),
            Piece::Token(token) => match resolve(&token)? {
                Resolved::Field(field, kind) => segments.push(Segment::Field {
                    field,
                    token: token.text.to_string(),
                    spec: FieldSpec::parse(kind, token.alignment, token.format),
                }),
                Resolved::Literal(text) => push_literal(&mut segments, &text),
                Resolved::Unknown => push_literal(&mut segments, token.text),
            },
        }
    }
    Ok(segments)
}

pub(crate) fn push_literal<F>(segments: &mut Vec<Segment<F>>, text: &str) {
    if text.is_empty() {
        return;
    }
    match segments.last_mut() {
        Some(Segment::Literal(existing)) => existing.push_str(text),
        _ => segments.push(Segment::Literal(text.to_string())),
    }
}

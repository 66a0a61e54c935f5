//! Backup file naming for log rotation
//!
//! A backup template names the file an active log is moved to on rollover:
//!
//! ```text
//! {Directory}/archive/{FileBody}-{DateTime:yyyy-MM-dd}{Index:\.000}{Extension}
//! ```
//!
//! | Token          | Value for `/var/log/app.log`        |
//! |----------------|-------------------------------------|
//! | `{Directory}`  | `/var/log`                          |
//! | `{FilePath}`   | `/var/log/app.log`                  |
//! | `{FileName}`   | `app.log`                           |
//! | `{FileBody}`   | `app`                               |
//! | `{Extension}`  | `.log`                              |
//! | `{DateTime}`   | rotation time, with a date sub-format |
//! | `{Index}`      | sequence number, with a numeric sub-format |
//!
//! Special folders (`{ApplicationData}`, `{UserProfile}`, ...) are replaced by
//! their paths at compile time. Every template needs an `{Index}` token; a
//! backup rendered without an index drops that token entirely, so no stray
//! separator is left behind.

use super::special_folder::{FolderResolver, SpecialFolder, SystemFolders};
use super::{compile_segments, token, FieldValue, Resolved, Segment, ValueKind};
use crate::core::error::{LoggerError, Result};
use chrono::{DateTime, Offset, TimeZone};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackupField {
    Directory,
    FilePath,
    FileName,
    FileBody,
    Extension,
    DateTime,
    Index,
}

impl BackupField {
    pub fn from_token(name: &str) -> Option<Self> {
        match name {
            "Directory" => Some(BackupField::Directory),
            "FilePath" => Some(BackupField::FilePath),
            "FileName" => Some(BackupField::FileName),
            "FileBody" => Some(BackupField::FileBody),
            "Extension" => Some(BackupField::Extension),
            "DateTime" => Some(BackupField::DateTime),
            "Index" => Some(BackupField::Index),
            _ => None,
        }
    }

    fn kind(&self) -> ValueKind {
        match self {
            BackupField::DateTime => ValueKind::Date,
            BackupField::Index => ValueKind::Number,
            _ => ValueKind::Text,
        }
    }
}

/// A compiled backup path template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupPath {
    template: String,
    without_index: Vec<Segment<BackupField>>,
    with_index: Vec<Segment<BackupField>>,
}

impl BackupPath {
    /// Compile a template, resolving special folders from the environment
    ///
    /// # Errors
    ///
    /// See [`BackupPath::compile_with`]
    pub fn compile(template: &str) -> Result<Self> {
        Self::compile_with(template, &SystemFolders)
    }

    /// Compile a template with an explicit folder resolver
    ///
    /// # Errors
    ///
    /// Returns a pattern error if the template has no `{Index}` token, names
    /// a special folder that does not resolve, or carries a malformed
    /// sub-format; an argument error if the template is empty
    pub fn compile_with(template: &str, folders: &dyn FolderResolver) -> Result<Self> {
        if template.is_empty() {
            return Err(LoggerError::argument(
                "template",
                "backup path template must not be empty",
            ));
        }
        if token::find(template, "Index").is_none() {
            return Err(LoggerError::pattern(
                template,
                "backup path template must contain an {Index} token",
            ));
        }

        let with_index = compile_segments(template, |token| {
            if let Some(folder) = SpecialFolder::from_name(token.name) {
                let path = folders.resolve(folder).ok_or_else(|| {
                    LoggerError::pattern(
                        template,
                        format!("special folder {} is not available", token.text),
                    )
                })?;
                return Ok(Resolved::Literal(path.to_string_lossy().into_owned()));
            }
            Ok(match BackupField::from_token(token.name) {
                Some(field) => Resolved::Field(field, field.kind()),
                None => Resolved::Unknown,
            })
        })?;

        // Rendering backups must not fail mid-rotation, so sub-formats are checked now
        for segment in &with_index {
            if let Segment::Field {
                token,
                spec: Err(message),
                ..
            } = segment
            {
                return Err(LoggerError::pattern(
                    template,
                    format!("{}: {}", token, message),
                ));
            }
        }

        let mut without_index = Vec::with_capacity(with_index.len());
        for segment in &with_index {
            match segment {
                Segment::Field {
                    field: BackupField::Index,
                    ..
                } => {}
                Segment::Literal(text) => super::push_literal(&mut without_index, text),
                field => without_index.push(field.clone()),
            }
        }

        Ok(Self {
            template: template.to_string(),
            without_index,
            with_index,
        })
    }

    /// The template as written
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Whether the template references `{DateTime}`
    pub fn uses_date(&self) -> bool {
        self.with_index.iter().any(|segment| {
            matches!(
                segment,
                Segment::Field {
                    field: BackupField::DateTime,
                    ..
                }
            )
        })
    }

    /// Render the backup path for `original`
    ///
    /// Without an index the `{Index}` token is omitted entirely. This never
    /// touches the filesystem.
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_pattern_logger::format::BackupPath;
    /// use chrono::{TimeZone, Utc};
    ///
    /// let backup = BackupPath::compile(r"{DateTime:yyyy-MM-dd}{Index:\.000}.log").unwrap();
    /// let at = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    /// assert_eq!(backup.render("", &at, None), "2020-01-01.log");
    /// assert_eq!(backup.render("", &at, Some(7)), "2020-01-01.007.log");
    /// ```
    pub fn render<Tz: TimeZone>(
        &self,
        original: &str,
        timestamp: &DateTime<Tz>,
        index: Option<u32>,
    ) -> String {
        let parts = PathParts::split(original);
        let timestamp = timestamp.with_timezone(&timestamp.offset().fix());
        let segments = if index.is_some() {
            &self.with_index
        } else {
            &self.without_index
        };

        let mut out = String::with_capacity(self.template.len() + original.len());
        for segment in segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field {
                    field,
                    spec: Ok(spec),
                    ..
                } => {
                    let value = match field {
                        BackupField::Directory => FieldValue::Text(parts.directory),
                        BackupField::FilePath => FieldValue::Text(original),
                        BackupField::FileName => FieldValue::Text(parts.name),
                        BackupField::FileBody => FieldValue::Text(parts.body),
                        BackupField::Extension => FieldValue::Text(parts.extension),
                        BackupField::DateTime => FieldValue::Date(timestamp),
                        BackupField::Index => FieldValue::Number(u64::from(index.unwrap_or(0))),
                    };
                    spec.apply(value, &mut out);
                }
                // Rejected by compile_with
                Segment::Field { spec: Err(_), .. } => {}
            }
        }
        out
    }
}

/// Components of the original file path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PathParts<'a> {
    directory: &'a str,
    name: &'a str,
    body: &'a str,
    /// Includes the leading dot, or is empty
    extension: &'a str,
}

impl<'a> PathParts<'a> {
    fn split(original: &'a str) -> Self {
        // `Path` drops a trailing separator; here it means "no file name"
        if original.ends_with(std::path::is_separator) {
            return Self {
                directory: &original[..original.len() - 1],
                name: "",
                body: "",
                extension: "",
            };
        }

        let path = Path::new(original);
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        let directory = path.parent().and_then(|p| p.to_str()).unwrap_or("");
        let (body, extension) = match name.rfind('.') {
            Some(dot) if dot + 1 == name.len() => (&name[..dot], ""),
            Some(dot) => (&name[..dot], &name[dot..]),
            None => (name, ""),
        };
        Self {
            directory,
            name,
            body,
            extension,
        }
    }
}

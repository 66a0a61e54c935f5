//! Date/time sub-formats
//!
//! Interprets the sub-format of a `{DateTime:...}` token. Custom formats use
//! the familiar specifier letters (`yyyy-MM-dd HH:mm:ss.fff`, `dddd`, `tt`,
//! `zzz`); a format made of a single character selects one of the standard
//! layouts (`o`, `s`, `u`, `d`, `T`, ...). Output is culture invariant.
//!
//! A format compiles to chrono [`Item`]s; the few specifiers chrono has no
//! item for (`yyy`, fraction digits other than 3/6/9, trimmed `F`, `t`, `z`,
//! `zz`) are rendered alongside them.

use chrono::format::{Fixed, Item, Numeric, Pad};
use chrono::{DateTime, Datelike, FixedOffset, Offset, Timelike, Utc};
use std::fmt::Write;

/// Used when a `{DateTime}` token carries no sub-format
pub const DEFAULT_DATE_FORMAT: &str = "yyyy-MM-dd HH:mm:ss";

const NANOSECONDS: [Item<'static>; 1] = [Item::Numeric(Numeric::Nanosecond, Pad::Zero)];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Chrono(Vec<Item<'static>>),
    /// `yyy` or five and more `y`: the year zero-padded to that width
    PaddedYear(usize),
    /// `F` drops trailing zeros, and the `.` before them when none remain
    Fraction { digits: usize, trim: bool },
    /// `t`: `A` or `P`
    MeridiemInitial,
    /// `z` and `zz`: signed whole hours of the offset
    OffsetHours { padded: bool },
}

/// A parsed date/time format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
    pieces: Vec<Piece>,
    /// Standard layouts such as `u` and `r` render in UTC
    utc: bool,
}

fn push_item(pieces: &mut Vec<Piece>, item: Item<'static>) {
    match pieces.last_mut() {
        Some(Piece::Chrono(items)) => items.push(item),
        _ => pieces.push(Piece::Chrono(vec![item])),
    }
}

fn pad(run: usize) -> Pad {
    if run >= 2 {
        Pad::Zero
    } else {
        Pad::None
    }
}

/// The chrono item or custom piece for a run of one specifier letter
fn specifier(c: char, run: usize) -> Option<Piece> {
    let item = match (c, run) {
        ('y', 1) => Item::Numeric(Numeric::YearMod100, Pad::None),
        ('y', 2) => Item::Numeric(Numeric::YearMod100, Pad::Zero),
        ('y', 4) => Item::Numeric(Numeric::Year, Pad::Zero),
        ('y', n) => return Some(Piece::PaddedYear(n)),
        ('M', 1 | 2) => Item::Numeric(Numeric::Month, pad(run)),
        ('M', 3) => Item::Fixed(Fixed::ShortMonthName),
        ('M', _) => Item::Fixed(Fixed::LongMonthName),
        ('d', 1 | 2) => Item::Numeric(Numeric::Day, pad(run)),
        ('d', 3) => Item::Fixed(Fixed::ShortWeekdayName),
        ('d', _) => Item::Fixed(Fixed::LongWeekdayName),
        ('H', _) => Item::Numeric(Numeric::Hour, pad(run)),
        ('h', _) => Item::Numeric(Numeric::Hour12, pad(run)),
        ('m', _) => Item::Numeric(Numeric::Minute, pad(run)),
        ('s', _) => Item::Numeric(Numeric::Second, pad(run)),
        ('t', 1) => return Some(Piece::MeridiemInitial),
        ('t', _) => Item::Fixed(Fixed::UpperAmPm),
        ('z', 1 | 2) => return Some(Piece::OffsetHours { padded: run == 2 }),
        ('z', _) => Item::Fixed(Fixed::TimezoneOffsetColon),
        ('K', _) => Item::Fixed(Fixed::TimezoneOffsetColonZ),
        ('g', _) => Item::Literal("A.D."),
        _ => return None,
    };
    Some(Piece::Chrono(vec![item]))
}

impl DateFormat {
    /// Parse a sub-format; the error message describes the offending specifier
    pub fn parse(spec: &str) -> Result<Self, String> {
        if spec.is_empty() {
            return Self::parse_custom(DEFAULT_DATE_FORMAT, false);
        }

        let mut chars = spec.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Self::parse_standard(c);
        }

        Self::parse_custom(spec, false)
    }

    fn parse_standard(c: char) -> Result<Self, String> {
        let (layout, utc) = match c {
            'd' => ("MM/dd/yyyy", false),
            'D' => ("dddd, dd MMMM yyyy", false),
            'f' => ("dddd, dd MMMM yyyy HH:mm", false),
            'F' => ("dddd, dd MMMM yyyy HH:mm:ss", false),
            'g' => ("MM/dd/yyyy HH:mm", false),
            'G' => ("MM/dd/yyyy HH:mm:ss", false),
            'm' | 'M' => ("MMMM dd", false),
            'o' | 'O' => ("yyyy'-'MM'-'dd'T'HH':'mm':'ss'.'fffffffK", false),
            'r' | 'R' => ("ddd, dd MMM yyyy HH':'mm':'ss 'GMT'", true),
            's' => ("yyyy'-'MM'-'dd'T'HH':'mm':'ss", false),
            't' => ("HH:mm", false),
            'T' => ("HH:mm:ss", false),
            'u' => ("yyyy'-'MM'-'dd HH':'mm':'ss'Z'", true),
            'U' => ("dddd, dd MMMM yyyy HH:mm:ss", true),
            'y' | 'Y' => ("yyyy MMMM", false),
            other => return Err(format!("unknown standard date/time format '{}'", other)),
        };
        Self::parse_custom(layout, utc)
    }

    fn parse_custom(spec: &str, utc: bool) -> Result<Self, String> {
        let chars: Vec<char> = spec.chars().collect();
        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut i = 0;

        let flush = |literal: &mut String, pieces: &mut Vec<Piece>| {
            if !literal.is_empty() {
                let text = std::mem::take(literal).into_boxed_str();
                push_item(pieces, Item::OwnedLiteral(text));
            }
        };

        while i < chars.len() {
            let c = chars[i];
            let run = if c == 'K' {
                1
            } else {
                chars[i..].iter().take_while(|&&x| x == c).count()
            };

            if c == 'f' || c == 'F' {
                if run > 7 {
                    return Err(format!("too many '{}' specifiers in '{}'", c, spec));
                }
                flush(&mut literal, &mut pieces);
                pieces.push(Piece::Fraction {
                    digits: run,
                    trim: c == 'F',
                });
                i += run;
                continue;
            }

            if let Some(piece) = specifier(c, run) {
                flush(&mut literal, &mut pieces);
                match piece {
                    Piece::Chrono(items) => {
                        for item in items {
                            push_item(&mut pieces, item);
                        }
                    }
                    other => pieces.push(other),
                }
                i += run;
                continue;
            }

            match c {
                '\'' | '"' => {
                    let close = chars[i + 1..]
                        .iter()
                        .position(|&x| x == c)
                        .ok_or_else(|| format!("unterminated quoted text in '{}'", spec))?;
                    literal.extend(&chars[i + 1..i + 1 + close]);
                    i += close + 2;
                }
                '\\' => {
                    let escaped = chars
                        .get(i + 1)
                        .ok_or_else(|| format!("trailing escape character in '{}'", spec))?;
                    literal.push(*escaped);
                    i += 2;
                }
                '%' => {
                    // `%c` forces a single specifier to be read as a custom format
                    if i + 1 >= chars.len() || chars[i + 1] == '%' {
                        return Err(format!("invalid '%' specifier in '{}'", spec));
                    }
                    i += 1;
                }
                _ => {
                    literal.push(c);
                    i += 1;
                }
            }
        }
        flush(&mut literal, &mut pieces);

        Ok(Self { pieces, utc })
    }

    /// Render a timestamp
    pub fn format(&self, datetime: &DateTime<FixedOffset>) -> String {
        let utc_view;
        let datetime = if self.utc {
            utc_view = datetime.with_timezone(&Utc.fix());
            &utc_view
        } else {
            datetime
        };

        let mut out = String::with_capacity(32);
        for piece in &self.pieces {
            match piece {
                Piece::Chrono(items) => {
                    let _ = write!(out, "{}", datetime.format_with_items(items.iter()));
                }
                Piece::PaddedYear(width) => {
                    let _ = write!(out, "{:0width$}", datetime.year(), width = *width);
                }
                Piece::Fraction { digits, trim } => {
                    let nanos = datetime.format_with_items(NANOSECONDS.iter()).to_string();
                    let mut fraction = nanos.get(..*digits).unwrap_or(&nanos);
                    if *trim {
                        fraction = fraction.trim_end_matches('0');
                        if fraction.is_empty() && out.ends_with('.') {
                            out.pop();
                        }
                    }
                    out.push_str(fraction);
                }
                Piece::MeridiemInitial => out.push(if datetime.hour() < 12 { 'A' } else { 'P' }),
                Piece::OffsetHours { padded } => {
                    let seconds = datetime.offset().local_minus_utc();
                    let sign = if seconds < 0 { '-' } else { '+' };
                    let hours = seconds.unsigned_abs() / 3600;
                    if *padded {
                        let _ = write!(out, "{}{:02}", sign, hours);
                    } else {
                        let _ = write!(out, "{}{}", sign, hours);
                    }
                }
            }
        }
        out
    }
}

//! Integer sub-formats
//!
//! Used for `{Line}`, `{Thread}` and `{Index}`. A letter optionally followed
//! by a precision (`D4`, `X`, `N0`) is a standard format; anything else is a
//! custom picture where `0` forces a digit, `#` allows one, `.` starts the
//! fraction, `,` between digit placeholders groups thousands, and `\c` or
//! quoted text is copied verbatim. `\.000` therefore renders 7 as `.007`.

#[derive(Debug, Clone, PartialEq, Eq)]
enum Standard {
    General,
    Decimal(usize),
    Hex { digits: usize, upper: bool },
    Fixed(usize),
    Grouped(usize),
    Exponent { digits: usize, upper: bool },
    Percent(usize),
    /// Invariant culture uses the generic currency sign `¤`
    Currency(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Item {
    Literal(String),
    Zero,
    Optional,
    Point,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    Standard(Standard),
    Custom {
        items: Vec<Item>,
        grouping: bool,
        scale: u64,
        percent: u32,
    },
}

/// A parsed integer format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFormat {
    kind: Kind,
}

impl NumberFormat {
    pub fn parse(spec: &str) -> Result<Self, String> {
        if spec.is_empty() {
            return Ok(Self {
                kind: Kind::Standard(Standard::General),
            });
        }

        let mut chars = spec.chars();
        let first = chars.next().unwrap_or_default();
        let precision = chars.as_str();
        if first.is_ascii_alphabetic()
            && precision.len() <= 3
            && precision.chars().all(|c| c.is_ascii_digit())
        {
            return Self::parse_standard(first, precision).map(|standard| Self {
                kind: Kind::Standard(standard),
            });
        }

        Self::parse_custom(spec)
    }

    fn parse_standard(letter: char, precision: &str) -> Result<Standard, String> {
        let precision: Option<usize> = precision.parse().ok();
        let standard = match letter {
            'G' | 'g' => Standard::General,
            'D' | 'd' => Standard::Decimal(precision.unwrap_or(0)),
            'X' | 'x' => Standard::Hex {
                digits: precision.unwrap_or(0),
                upper: letter == 'X',
            },
            'F' | 'f' => Standard::Fixed(precision.unwrap_or(2)),
            'N' | 'n' => Standard::Grouped(precision.unwrap_or(2)),
            'E' | 'e' => Standard::Exponent {
                digits: precision.unwrap_or(6),
                upper: letter == 'E',
            },
            'P' | 'p' => Standard::Percent(precision.unwrap_or(2)),
            'C' | 'c' => Standard::Currency(precision.unwrap_or(2)),
            other => return Err(format!("unknown standard numeric format '{}'", other)),
        };
        Ok(standard)
    }

    fn parse_custom(spec: &str) -> Result<Self, String> {
        // Only the first section applies; values are never negative or special-cased
        let chars: Vec<char> = spec.chars().collect();
        let mut items: Vec<Item> = Vec::new();
        let mut grouping = false;
        let mut scale = 1u64;
        let mut percent = 0u32;
        let mut seen_point = false;
        let mut i = 0;

        let push_literal = |items: &mut Vec<Item>, c: char| match items.last_mut() {
            Some(Item::Literal(text)) => text.push(c),
            _ => items.push(Item::Literal(c.to_string())),
        };

        while i < chars.len() {
            let c = chars[i];
            match c {
                ';' => break,
                '0' => items.push(Item::Zero),
                '#' => items.push(Item::Optional),
                '.' if !seen_point => {
                    seen_point = true;
                    items.push(Item::Point);
                }
                ',' if !seen_point => {
                    let before = items
                        .iter()
                        .any(|item| matches!(item, Item::Zero | Item::Optional));
                    let after = chars[i + 1..]
                        .iter()
                        .take_while(|&&x| x != '.' && x != ';')
                        .any(|&x| x == '0' || x == '#');
                    if before && after {
                        grouping = true;
                    } else if before {
                        scale = scale.saturating_mul(1000);
                    }
                }
                '%' => {
                    percent += 1;
                    push_literal(&mut items, '%');
                }
                '\\' => {
                    let escaped = chars
                        .get(i + 1)
                        .ok_or_else(|| format!("trailing escape character in '{}'", spec))?;
                    push_literal(&mut items, *escaped);
                    i += 1;
                }
                '\'' | '"' => {
                    let close = chars[i + 1..]
                        .iter()
                        .position(|&x| x == c)
                        .ok_or_else(|| format!("unterminated quoted text in '{}'", spec))?;
                    for &quoted in &chars[i + 1..i + 1 + close] {
                        push_literal(&mut items, quoted);
                    }
                    i += close + 1;
                }
                other => push_literal(&mut items, other),
            }
            i += 1;
        }

        Ok(Self {
            kind: Kind::Custom {
                items,
                grouping,
                scale,
                percent,
            },
        })
    }

    /// Render a value
    pub fn format(&self, value: u64) -> String {
        match &self.kind {
            Kind::Standard(standard) => format_standard(standard, value),
            Kind::Custom {
                items,
                grouping,
                scale,
                percent,
            } => format_custom(items, *grouping, scaled(value, *scale, *percent)),
        }
    }
}

fn scaled(value: u64, scale: u64, percent: u32) -> u64 {
    let value = value.saturating_mul(100u64.saturating_pow(percent));
    // Trailing commas divide by 1000 each, rounding half up
    (value.saturating_add(scale / 2)) / scale
}

fn format_standard(standard: &Standard, value: u64) -> String {
    match standard {
        Standard::General => value.to_string(),
        Standard::Decimal(digits) => format!("{:0width$}", value, width = *digits),
        Standard::Hex { digits, upper } => {
            if *upper {
                format!("{:0width$X}", value, width = *digits)
            } else {
                format!("{:0width$x}", value, width = *digits)
            }
        }
        Standard::Fixed(decimals) => with_fraction(value.to_string(), *decimals),
        Standard::Grouped(decimals) => with_fraction(group_thousands(&value.to_string()), *decimals),
        Standard::Exponent { digits, upper } => exponential(value, *digits, *upper),
        Standard::Percent(decimals) => {
            let hundredfold = value.saturating_mul(100).to_string();
            format!("{} %", with_fraction(group_thousands(&hundredfold), *decimals))
        }
        Standard::Currency(decimals) => {
            format!("\u{a4}{}", with_fraction(group_thousands(&value.to_string()), *decimals))
        }
    }
}

/// `1234` with `E2` is `1.23E+003`: at least three exponent digits, always signed
fn exponential(value: u64, digits: usize, upper: bool) -> String {
    let rendered = format!("{:.*e}", digits, value as f64);
    let (mantissa, exponent) = rendered.split_once('e').unwrap_or((rendered.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    format!(
        "{}{}{}{:03}",
        mantissa,
        if upper { 'E' } else { 'e' },
        if exponent < 0 { '-' } else { '+' },
        exponent.unsigned_abs()
    )
}

fn with_fraction(mut integer: String, decimals: usize) -> String {
    if decimals > 0 {
        integer.push('.');
        integer.extend(std::iter::repeat('0').take(decimals));
    }
    integer
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn format_custom(items: &[Item], grouping: bool, value: u64) -> String {
    let point = items.iter().position(|item| *item == Item::Point);
    let (integer_items, fraction_items) = match point {
        Some(p) => (&items[..p], &items[p + 1..]),
        None => (items, &items[items.len()..]),
    };

    let placeholders: Vec<usize> = integer_items
        .iter()
        .enumerate()
        .filter(|(_, item)| matches!(item, Item::Zero | Item::Optional))
        .map(|(i, _)| i)
        .collect();
    let min_digits = integer_items
        .iter()
        .filter(|item| matches!(item, Item::Zero | Item::Optional))
        .skip_while(|item| **item == Item::Optional)
        .count();

    let mut digits = if value == 0 && min_digits == 0 {
        String::new()
    } else {
        format!("{:0width$}", value, width = min_digits)
    };
    if grouping {
        digits = group_thousands(&digits);
    }

    let mut out = String::new();
    if placeholders.is_empty() {
        for item in integer_items {
            if let Item::Literal(text) = item {
                out.push_str(text);
            }
        }
        // A picture without any digit placeholder shows no number at all
        let has_fraction_digits = fraction_items
            .iter()
            .any(|item| matches!(item, Item::Zero | Item::Optional));
        if has_fraction_digits {
            out.push_str(&digits);
        }
    } else {
        // Fill placeholders right to left; the leftmost one takes any overflow
        let mut assigned: Vec<String> = vec![String::new(); integer_items.len()];
        let mut remaining = digits.as_str();
        for (n, &slot) in placeholders.iter().enumerate().rev() {
            if grouping || n == 0 {
                assigned[slot] = remaining.to_string();
                remaining = "";
                if grouping {
                    break;
                }
            } else if let Some(c) = remaining.chars().last() {
                assigned[slot] = c.to_string();
                remaining = &remaining[..remaining.len() - c.len_utf8()];
            }
        }
        for (i, item) in integer_items.iter().enumerate() {
            match item {
                Item::Literal(text) => out.push_str(text),
                _ => out.push_str(&assigned[i]),
            }
        }
    }

    if point.is_some() {
        let shown = fraction_items.iter().any(|item| *item == Item::Zero);
        if shown {
            out.push('.');
        }
        for item in fraction_items {
            match item {
                Item::Zero => out.push('0'),
                Item::Literal(text) => out.push_str(text),
                Item::Optional | Item::Point => {}
            }
        }
    }

    out
}

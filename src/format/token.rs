//! Placeholder scanning
//!
//! Templates mix literal text with brace-delimited tokens:
//!
//! ```text
//! {Name}  {Name:subformat}  {Name,alignment}  {Name,alignment:subformat}
//! ```
//!
//! The subformat runs to the first following `}`. `{{` and `}}` are escaped
//! braces, and a `{` that does not open a well-formed token is literal text.
//! Matching is anchored on the complete token name, so looking for `Line`
//! never lands inside `{NewLine}`.

/// One token occurrence inside a template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSpan<'a> {
    /// Byte offset of the opening brace
    pub start: usize,
    /// Byte offset just past the closing brace
    pub end: usize,
    /// The token including braces, alignment and subformat
    pub text: &'a str,
    pub name: &'a str,
    pub alignment: Option<&'a str>,
    pub format: Option<&'a str>,
}

/// A piece of a template: literal text or a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece<'a> {
    Literal(&'a str),
    Token(TokenSpan<'a>),
}

/// Iterator over the pieces of a template
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    template: &'a str,
    pos: usize,
}

impl<'a> Tokens<'a> {
    pub fn new(template: &'a str) -> Self {
        Self { template, pos: 0 }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Piece<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.pos;
        let rest = self.template.get(start..).filter(|rest| !rest.is_empty())?;

        if rest.starts_with("{{") || rest.starts_with("}}") {
            self.pos += 2;
            return Some(Piece::Literal(&self.template[start..start + 1]));
        }

        if rest.starts_with('{') {
            if let Some(token) = parse_token(self.template, start) {
                self.pos = token.end;
                return Some(Piece::Token(token));
            }
            self.pos += 1;
            return Some(Piece::Literal(&self.template[start..start + 1]));
        }

        if rest.starts_with('}') {
            self.pos += 1;
            return Some(Piece::Literal(&self.template[start..start + 1]));
        }

        let len = rest.find(['{', '}']).unwrap_or(rest.len());
        self.pos += len;
        Some(Piece::Literal(&rest[..len]))
    }
}

/// Parse the token whose opening brace sits at `start`
fn parse_token(template: &str, start: usize) -> Option<TokenSpan<'_>> {
    let body_start = start + 1;
    let close = template[body_start..].find('}')?;
    let body = &template[body_start..body_start + close];
    let end = body_start + close + 1;

    let (head, format) = match body.find(':') {
        Some(colon) => (&body[..colon], Some(&body[colon + 1..])),
        None => (body, None),
    };
    let (name, alignment) = match head.find(',') {
        Some(comma) => (&head[..comma], Some(head[comma + 1..].trim())),
        None => (head, None),
    };

    if !is_token_name(name) {
        return None;
    }

    Some(TokenSpan {
        start,
        end,
        text: &template[start..end],
        name,
        alignment,
        format,
    })
}

fn is_token_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Find the first token named exactly `name`
///
/// ```
/// use rust_pattern_logger::format::token;
///
/// let span = token::find("{NewLine}{Line:000}", "Line").unwrap();
/// assert_eq!(span.text, "{Line:000}");
/// assert_eq!(span.format, Some("000"));
/// ```
pub fn find<'a>(template: &'a str, name: &str) -> Option<TokenSpan<'a>> {
    Tokens::new(template).find_map(|piece| match piece {
        Piece::Token(token) if token.name == name => Some(token),
        _ => None,
    })
}

//! HTML utility functions.
//!
//! Provides the start-tag level helpers used by the integrity annotator:
//! - `escape_attr()`, `unescape()` - HTML entity escaping for attribute values
//! - `StartTag` - attribute scanning with byte spans, and single-attribute rewrite
//! - `start_tags()` - document-order start tags, skipping comments and raw text
//!
//! Rewriting works on the raw source text so that everything outside the
//! touched attribute keeps its original quoting, order and whitespace.

use std::borrow::Cow;
use std::ops::Range;

// =============================================================================
// HTML Escaping
// =============================================================================

/// Characters that require escaping inside a double-quoted attribute value.
const ESCAPE_CHARS: [char; 5] = ['<', '>', '&', '"', '\''];

/// Get the HTML entity for a special character.
#[inline]
fn escape_char(c: char) -> Option<&'static str> {
    match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    }
}

/// Escape HTML attribute values.
///
/// Uses `Cow` to avoid allocation when no escaping is needed.
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    if !s.contains(ESCAPE_CHARS) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match escape_char(c) {
            Some(entity) => result.push_str(entity),
            None => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Unescape HTML entities back to characters.
///
/// Handles common named entities and numeric character references.
pub fn unescape(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '&' {
            result.push(c);
            continue;
        }

        // Collect entity
        let mut entity = String::new();
        let mut terminated = false;
        while let Some(&next) = chars.peek() {
            if next == ';' {
                chars.next();
                terminated = true;
                break;
            }
            if entity.len() >= 10 || !(next.is_ascii_alphanumeric() || next == '#') {
                break;
            }
            entity.push(next);
            chars.next();
        }

        if !terminated {
            // Not an entity, keep the text as written
            result.push('&');
            result.push_str(&entity);
            continue;
        }

        match decode_entity(&entity) {
            Some(decoded) => result.push(decoded),
            None => {
                result.push('&');
                result.push_str(&entity);
                result.push(';');
            }
        }
    }

    Cow::Owned(result)
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{00A0}'),
        s if s.starts_with("#x") || s.starts_with("#X") => {
            u32::from_str_radix(&s[2..], 16).ok().and_then(char::from_u32)
        }
        s if s.starts_with('#') => s[1..].parse().ok().and_then(char::from_u32),
        _ => None,
    }
}

// =============================================================================
// Start Tag Scanning
// =============================================================================

/// A single attribute inside a start tag, with its location in the tag source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr<'a> {
    /// Attribute name as written.
    pub name: &'a str,
    /// Raw (still escaped) value; `None` for boolean attributes.
    pub value: Option<&'a str>,
    /// Span of the whole attribute, `name` through the closing quote.
    pub span: Range<usize>,
    /// Span of the raw value, excluding quotes.
    pub value_span: Option<Range<usize>>,
}

impl Attr<'_> {
    /// Entity-decoded attribute value (empty for boolean attributes).
    pub fn decoded(&self) -> Cow<'_, str> {
        unescape(self.value.unwrap_or_default())
    }
}

/// A scanned HTML start tag such as `<script src="/main.js" defer>`.
///
/// Scanning stops at the first `>` outside a quoted attribute value, so the
/// source may be the rest of a document starting at the tag's `<`.
#[derive(Debug, Clone)]
pub struct StartTag<'a> {
    source: &'a str,
    name: Range<usize>,
    attrs: Vec<Attr<'a>>,
    /// Index of the terminating `>`.
    close: usize,
}

#[inline]
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0c')
}

impl<'a> StartTag<'a> {
    /// Scan the start tag at the beginning of `source`.
    ///
    /// Returns `None` if `source` does not begin with `<name` or the tag is
    /// never closed.
    pub fn parse(source: &'a str) -> Option<Self> {
        let bytes = source.as_bytes();
        if bytes.first() != Some(&b'<') {
            return None;
        }

        let mut i = 1;
        while i < bytes.len() && !is_space(bytes[i]) && !matches!(bytes[i], b'>' | b'/') {
            i += 1;
        }
        if i == 1 {
            return None;
        }
        let name = 1..i;

        let mut attrs = Vec::new();
        loop {
            while i < bytes.len() && (is_space(bytes[i]) || bytes[i] == b'/') {
                i += 1;
            }
            if i >= bytes.len() {
                return None;
            }
            if bytes[i] == b'>' {
                break;
            }

            // Read attribute name (a leading '=' belongs to the name)
            let start = i;
            i += 1;
            while i < bytes.len() && !is_space(bytes[i]) && !matches!(bytes[i], b'=' | b'>' | b'/') {
                i += 1;
            }
            let name_end = i;

            // Look ahead for a value
            let mut j = i;
            while j < bytes.len() && is_space(bytes[j]) {
                j += 1;
            }

            if j < bytes.len() && bytes[j] == b'=' {
                j += 1;
                while j < bytes.len() && is_space(bytes[j]) {
                    j += 1;
                }

                let (value_span, end) = match bytes.get(j).copied() {
                    Some(quote) if quote == b'"' || quote == b'\'' => {
                        let close = bytes[j + 1..].iter().position(|&b| b == quote)? + j + 1;
                        (j + 1..close, close + 1)
                    }
                    _ => {
                        let mut k = j;
                        while k < bytes.len() && !is_space(bytes[k]) && bytes[k] != b'>' {
                            k += 1;
                        }
                        (j..k, k)
                    }
                };

                attrs.push(Attr {
                    name: &source[start..name_end],
                    value: Some(&source[value_span.clone()]),
                    span: start..end,
                    value_span: Some(value_span),
                });
                i = end;
            } else {
                // Boolean attribute (no value)
                attrs.push(Attr {
                    name: &source[start..name_end],
                    value: None,
                    span: start..name_end,
                    value_span: None,
                });
            }
        }

        Some(Self {
            source,
            name,
            attrs,
            close: i,
        })
    }

    /// Tag name as written.
    pub fn name(&self) -> &'a str {
        &self.source[self.name.clone()]
    }

    /// All attributes in source order.
    pub fn attrs(&self) -> &[Attr<'a>] {
        &self.attrs
    }

    /// First attribute with the given name (ASCII case-insensitive).
    pub fn attr(&self, name: &str) -> Option<&Attr<'a>> {
        self.attrs
            .iter()
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
    }

    /// Byte offset just past the closing `>`.
    pub fn end(&self) -> usize {
        self.close + 1
    }

    /// Source text of the start tag.
    pub fn as_str(&self) -> &'a str {
        &self.source[..self.end()]
    }

    /// Render this start tag with `name` set to `value`.
    ///
    /// An existing attribute keeps its position and quote style and only has
    /// its value replaced. A new attribute is appended after the last existing
    /// one as `name="value"`.
    pub fn with_attr(&self, name: &str, value: &str) -> String {
        let tag = self.as_str();
        let escaped = escape_attr(value);

        if let Some(attr) = self.attr(name) {
            let (range, replacement) = match &attr.value_span {
                Some(span) if span.start > 0 && matches!(tag.as_bytes()[span.start - 1], b'"' | b'\'') => {
                    (span.clone(), escaped.into_owned())
                }
                // Unquoted or boolean: rewrite as a quoted attribute
                _ => (attr.span.clone(), format!("{}=\"{}\"", attr.name, escaped)),
            };
            return [&tag[..range.start], replacement.as_str(), &tag[range.end..]].concat();
        }

        let at = self
            .attrs
            .last()
            .map_or(self.name.end, |attr| attr.span.end);
        format!("{} {}=\"{}\"{}", &tag[..at], name, escaped, &tag[at..])
    }
}

// =============================================================================
// Document Scanning
// =============================================================================

/// Check if tag is a raw text element (content is not markup).
///
/// In HTML, script and style content is "raw text".
#[inline]
pub fn is_raw_text_element(tag: &str) -> bool {
    tag.eq_ignore_ascii_case("script") || tag.eq_ignore_ascii_case("style")
}

/// Check if tag is an escapable raw text element.
///
/// In HTML, textarea and title content is "escapable raw text".
#[inline]
pub fn is_escapable_raw_text_element(tag: &str) -> bool {
    tag.eq_ignore_ascii_case("textarea") || tag.eq_ignore_ascii_case("title")
}

/// A start tag whose closing `>` is missing, at the given byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unterminated(pub usize);

/// Iterator over the start tags of a document, see [`start_tags`].
#[derive(Debug, Clone)]
pub struct StartTags<'a> {
    source: &'a str,
    pos: usize,
}

/// Scan `source` for start tags in document order.
///
/// Yields each tag with the byte offset of its `<`. Comments, doctypes,
/// end tags and the text content of raw text elements (`script`, `style`,
/// `textarea`, `title`) are skipped, so markup inside an inline script is
/// never reported. An unterminated start tag ends the scan with
/// [`Unterminated`].
pub fn start_tags(source: &str) -> StartTags<'_> {
    StartTags { source, pos: 0 }
}

impl<'a> Iterator for StartTags<'a> {
    type Item = Result<(usize, StartTag<'a>), Unterminated>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.source.as_bytes();

        while self.pos < bytes.len() {
            let Some(offset) = bytes[self.pos..].iter().position(|&b| b == b'<') else {
                self.pos = bytes.len();
                break;
            };
            let at = self.pos + offset;
            let rest = &self.source[at..];

            if rest.starts_with("<!--") {
                // `<!-->` and `<!--->` close immediately
                self.pos = rest[2..]
                    .find("-->")
                    .map_or(bytes.len(), |end| at + 2 + end + 3);
                continue;
            }

            match bytes.get(at + 1).copied() {
                Some(b) if b.is_ascii_alphabetic() => {}
                // End tags, doctypes, processing instructions
                Some(b'/' | b'!' | b'?') => {
                    self.pos = rest.find('>').map_or(bytes.len(), |end| at + end + 1);
                    continue;
                }
                // A lone `<` is text
                _ => {
                    self.pos = at + 1;
                    continue;
                }
            }

            let Some(tag) = StartTag::parse(rest) else {
                self.pos = bytes.len();
                return Some(Err(Unterminated(at)));
            };

            self.pos = at + tag.end();
            let name = tag.name();
            if is_raw_text_element(name) || is_escapable_raw_text_element(name) {
                self.pos = find_end_tag(self.source, self.pos, name).unwrap_or(bytes.len());
            }
            return Some(Ok((at, tag)));
        }

        None
    }
}

/// Offset of the first `</name` (ASCII case-insensitive) at or after `from`
/// that is followed by whitespace, `/` or `>`.
fn find_end_tag(source: &str, from: usize, name: &str) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut pos = from;

    while let Some(offset) = source[pos..].find("</") {
        let at = pos + offset;
        let name_start = at + 2;
        let name_end = name_start + name.len();

        let matches_name = bytes
            .get(name_start..name_end)
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name.as_bytes()));
        let boundary = bytes
            .get(name_end)
            .is_none_or(|&b| is_space(b) || matches!(b, b'/' | b'>'));

        if matches_name && boundary {
            return Some(at);
        }
        pos = at + 2;
    }

    None
}

// =============================================================================
// Tests
// =============================================================================

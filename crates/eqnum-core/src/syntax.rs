//! Source markers recognized in documents.
//!
//! Everything here works on a single line. Keys never contain braces or
//! line breaks; a marker without its closing brace simply does not match.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

/// Comment marker. A label is "comment-gated" when this appears anywhere on its line.
pub const COMMENT_MARKER: char = '%';

/// Line-continuation marker.
pub const CONTINUATION_MARKER: &str = r"\\";

static LABEL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\label\{([^{}\r\n]*)\}").expect("valid label pattern"));

static COMMENTED_LABEL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%\s*\\label\{([^{}\r\n]*)\}").expect("valid label pattern"));

static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\tag\{([^{}\r\n]*)\}").expect("valid tag pattern"));

pub(crate) static REF_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\ref\{([^{}\r\n]*)\}").expect("valid ref pattern"));

/// A brace-delimited marker found on a line.
///
/// `span` covers the whole marker (`\label{key}`), `content` only the text
/// between the braces. Both are byte ranges into the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker<'a> {
    pub content: &'a str,
    pub span: Range<usize>,
    pub content_span: Range<usize>,
}

fn first_marker<'a>(pattern: &Regex, line: &'a str) -> Option<Marker<'a>> {
    let caps = pattern.captures(line)?;
    let whole = caps.get(0)?;
    let content = caps.get(1)?;
    Some(Marker {
        content: content.as_str(),
        span: whole.range(),
        content_span: content.range(),
    })
}

/// First well-formed `\label{..}` on the line, comment prefix not required.
pub fn find_label(line: &str) -> Option<Marker<'_>> {
    first_marker(&LABEL_PATTERN, line)
}

/// First `%\label{..}` on the line (whitespace allowed after `%`).
///
/// The returned span starts at the `\label` itself, not at the comment marker.
pub fn find_commented_label(line: &str) -> Option<Marker<'_>> {
    let caps = COMMENTED_LABEL_PATTERN.captures(line)?;
    let whole = caps.get(0)?;
    let content = caps.get(1)?;
    let label_start = whole.start() + line[whole.range()].find('\\')?;
    Some(Marker {
        content: content.as_str(),
        span: label_start..whole.end(),
        content_span: content.range(),
    })
}

/// First well-formed `\tag{..}` on the line.
pub fn find_tag(line: &str) -> Option<Marker<'_>> {
    first_marker(&TAG_PATTERN, line)
}

/// Byte index of the first comment marker on the line.
pub fn comment_position(line: &str) -> Option<usize> {
    line.find(COMMENT_MARKER)
}

/// Byte index of the first continuation marker on the line.
pub fn continuation_position(line: &str) -> Option<usize> {
    line.find(CONTINUATION_MARKER)
}

/// Renders the annotation for an ordinal.
pub fn tag_text(ordinal: u32) -> String {
    format!("\\tag{{{ordinal}}}")
}

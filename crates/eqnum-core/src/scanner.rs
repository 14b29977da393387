//! Label extraction and ordinal assignment.
//!
//! Lines are scanned top to bottom and the first label on each line gets the
//! next ordinal. Ordinals restart at 1 on every scan.

use crate::cache::LabelCache;
use crate::error::{EqnumError, Result};
use crate::syntax;
use std::collections::HashMap;
use std::ops::Range;

/// Which labels a scan recognizes.
///
/// The live pass and the rendered-output pass disagree on purpose: `Live`
/// numbers every `\label{..}`, while `CommentPrefixed` only sees `%\label{..}`.
/// A document with uncommented labels therefore numbers differently in the two
/// views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    #[default]
    Live,
    CommentPrefixed,
}

/// A label declaration found by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub key: String,
    /// Zero-based line index.
    pub line: usize,
    /// One-based ordinal in scan order.
    pub ordinal: u32,
    /// Byte range of the `\label{..}` marker within its line.
    pub span: Range<usize>,
    /// Whether a comment marker appears anywhere on the line.
    pub commented: bool,
}

/// A label whose key was already declared earlier in the same scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateLabel {
    pub key: String,
    pub first_line: usize,
    pub line: usize,
}

impl From<&DuplicateLabel> for EqnumError {
    fn from(dup: &DuplicateLabel) -> Self {
        Self::DuplicateLabel {
            key: dup.key.clone(),
            first_line: dup.first_line,
            line: dup.line,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    pub labels: Vec<Label>,
    pub duplicates: Vec<DuplicateLabel>,
}

impl ScanResult {
    /// Builds the key lookup. Later duplicates overwrite earlier ones.
    pub fn cache(&self) -> LabelCache {
        LabelCache::from_labels(self.labels.iter().cloned())
    }

    /// Rejects the scan if any key was declared twice.
    pub fn strict(self) -> Result<Self> {
        match self.duplicates.first() {
            Some(dup) => Err(dup.into()),
            None => Ok(self),
        }
    }
}

/// Scans a whole document.
///
/// # Examples
///
/// ```
/// use eqnum_core::scanner::{scan, ScanMode};
///
/// let result = scan("%\\label{a}\n\\label{b}\n%\\label{c}", ScanMode::Live);
/// let ordinals: Vec<u32> = result.labels.iter().map(|l| l.ordinal).collect();
/// assert_eq!(ordinals, vec![1, 2, 3]);
///
/// let rendered = scan("%\\label{a}\n\\label{b}\n%\\label{c}", ScanMode::CommentPrefixed);
/// assert_eq!(rendered.labels.len(), 2);
/// ```
pub fn scan(text: &str, mode: ScanMode) -> ScanResult {
    scan_lines(text.lines(), mode)
}

/// Scans an ordered sequence of lines.
pub fn scan_lines<'a, I>(lines: I, mode: ScanMode) -> ScanResult
where
    I: IntoIterator<Item = &'a str>,
{
    let mut result = ScanResult::default();
    let mut first_seen: HashMap<String, usize> = HashMap::new();
    let mut counter = 0u32;

    for (line_idx, line) in lines.into_iter().enumerate() {
        let marker = match mode {
            ScanMode::Live => syntax::find_label(line),
            ScanMode::CommentPrefixed => syntax::find_commented_label(line),
        };
        let Some(marker) = marker else {
            continue;
        };

        if marker.content.trim().is_empty() {
            tracing::trace!(line = line_idx, "skipping label with empty key");
            continue;
        }

        counter += 1;
        let key = marker.content.to_string();

        match first_seen.get(&key) {
            Some(&first_line) => result.duplicates.push(DuplicateLabel {
                key: key.clone(),
                first_line,
                line: line_idx,
            }),
            None => {
                first_seen.insert(key.clone(), line_idx);
            }
        }

        result.labels.push(Label {
            key,
            line: line_idx,
            ordinal: counter,
            span: marker.span,
            commented: syntax::comment_position(line).is_some(),
        });
    }

    tracing::trace!(
        labels = result.labels.len(),
        duplicates = result.duplicates.len(),
        ?mode,
        "scan complete"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ordinals(result: &ScanResult) -> Vec<(&str, u32)> {
        result
            .labels
            .iter()
            .map(|l| (l.key.as_str(), l.ordinal))
            .collect()
    }

    #[test]
    fn test_ordinals_follow_document_order() {
        let text = "%\\label{a}\ntext\n%\\label{b}\n\n%\\label{c}\n";
        let result = scan(text, ScanMode::Live);
        assert_eq!(ordinals(&result), vec![("a", 1), ("b", 2), ("c", 3)]);
        assert_eq!(result.labels[1].line, 2);
        assert_eq!(result.labels[2].line, 4);
    }

    #[test]
    fn test_only_first_label_per_line() {
        let result = scan("\\label{a} \\label{b}\n%\\label{c}", ScanMode::Live);
        assert_eq!(ordinals(&result), vec![("a", 1), ("c", 2)]);
    }

    #[test]
    fn test_malformed_labels_skipped() {
        let text = "%\\label{open\n%\\label{}\n%\\label{  }\n%\\label{ok}";
        let result = scan(text, ScanMode::Live);
        assert_eq!(ordinals(&result), vec![("ok", 1)]);
        assert_eq!(result.labels[0].line, 3);
    }

    #[test]
    fn test_uncommented_label_counts_in_live_mode() {
        let result = scan("\\label{a}\n%\\label{b}", ScanMode::Live);
        assert_eq!(ordinals(&result), vec![("a", 1), ("b", 2)]);
        assert!(!result.labels[0].commented);
        assert!(result.labels[1].commented);
    }

    #[test]
    fn test_comment_prefixed_mode_ignores_bare_labels() {
        let result = scan("\\label{a}\n%\\label{b}\n% \\label{c}", ScanMode::CommentPrefixed);
        assert_eq!(ordinals(&result), vec![("b", 1), ("c", 2)]);
    }

    #[test]
    fn test_comment_anywhere_marks_commented() {
        let result = scan("\\label{a} x % trailing", ScanMode::Live);
        assert!(result.labels[0].commented);
    }

    #[test]
    fn test_duplicate_keys_reported_and_last_wins() {
        let text = "%\\label{x}\n%\\label{y}\n%\\label{x}";
        let result = scan(text, ScanMode::Live);
        assert_eq!(
            result.duplicates,
            vec![DuplicateLabel {
                key: "x".into(),
                first_line: 0,
                line: 2,
            }]
        );

        let cache = result.cache();
        assert_eq!(cache.ordinal("x"), Some(3));
        assert_eq!(cache.ordinal("y"), Some(2));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_strict_rejects_duplicates() {
        let err = scan("%\\label{x}\n%\\label{x}", ScanMode::Live)
            .strict()
            .unwrap_err();
        assert!(matches!(err, EqnumError::DuplicateLabel { line: 1, .. }));

        assert!(scan("%\\label{x}", ScanMode::Live).strict().is_ok());
    }

    #[test]
    fn test_crlf_lines() {
        let result = scan("%\\label{a}\r\n%\\label{b}\r\n", ScanMode::Live);
        assert_eq!(ordinals(&result), vec![("a", 1), ("b", 2)]);
        assert_eq!(result.labels[0].span, 1..10);
    }

    #[test]
    fn test_empty_document() {
        let result = scan("", ScanMode::Live);
        assert!(result.labels.is_empty());
        assert!(result.cache().is_empty());
    }
}

//! Tag synchronization.
//!
//! For every comment-gated label, keeps a `\tag{N}` on the same line where N
//! is the label's ordinal. Edits are as small as possible: a stale tag only has
//! the text between its braces replaced, a missing tag is inserted in front of
//! the line's continuation marker (when that comes before the comment marker)
//! or in front of the comment marker.
//!
//! Planning is a pure function of the document lines and the scan result. The
//! plan for a document that was just synchronized is always empty, which is
//! what stops the synchronizer's own writes from scheduling another write.

use crate::document::LineIndex;
use crate::error::{EqnumError, Result};
use crate::scanner::Label;
use crate::syntax;
use std::ops::Range;

/// A single text replacement inside one line.
///
/// `range` is a byte range relative to the start of `line`; an empty range is
/// an insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub line: usize,
    pub range: Range<usize>,
    pub text: String,
}

impl Edit {
    pub fn insert(line: usize, column: usize, text: impl Into<String>) -> Self {
        Self {
            line,
            range: column..column,
            text: text.into(),
        }
    }

    pub fn replace(line: usize, range: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            line,
            range,
            text: text.into(),
        }
    }
}

/// Computes every edit needed to bring tags in line with label ordinals.
///
/// Labels whose line has no comment marker are left alone. Lines that no
/// longer exist, or whose insertion point would land inside the label marker
/// itself, are skipped.
///
/// # Examples
///
/// ```
/// use eqnum_core::scanner::{scan, ScanMode};
/// use eqnum_core::sync::{plan_edits, Edit};
///
/// let text = "x = 1 %\\label{a}";
/// let lines: Vec<&str> = text.lines().collect();
/// let edits = plan_edits(&lines, &scan(text, ScanMode::Live).labels);
/// assert_eq!(edits, vec![Edit::insert(0, 6, "\\tag{1}")]);
/// ```
pub fn plan_edits(lines: &[&str], labels: &[Label]) -> Vec<Edit> {
    let mut edits = Vec::new();

    for label in labels {
        if !label.commented {
            continue;
        }
        let Some(line) = lines.get(label.line) else {
            tracing::debug!(line = label.line, key = %label.key, "label line out of range");
            continue;
        };

        let expected = label.ordinal.to_string();

        if let Some(tag) = syntax::find_tag(line) {
            if tag.content != expected {
                edits.push(Edit::replace(label.line, tag.content_span, expected));
            }
            continue;
        }

        let Some(comment) = syntax::comment_position(line) else {
            continue;
        };
        let column = match syntax::continuation_position(line) {
            Some(continuation) if continuation < comment => continuation,
            _ => comment,
        };

        if column > label.span.start && column < label.span.end {
            tracing::trace!(line = label.line, key = %label.key, "marker inside label, skipping");
            continue;
        }

        edits.push(Edit::insert(
            label.line,
            column,
            syntax::tag_text(label.ordinal),
        ));
    }

    edits
}

/// Applies one transaction of edits to `text`.
///
/// The transaction is validated as a whole before anything is written: any
/// out-of-range or overlapping edit rejects it.
pub fn apply_edits(text: &str, edits: &[Edit]) -> Result<String> {
    if edits.is_empty() {
        return Ok(text.to_string());
    }

    let index = LineIndex::new(text);
    let mut resolved: Vec<(Range<usize>, &str)> = Vec::with_capacity(edits.len());

    for edit in edits {
        let start = index.offset(text, edit.line, edit.range.start);
        let end = index.offset(text, edit.line, edit.range.end);
        match (start, end) {
            (Some(start), Some(end)) if start <= end => resolved.push((start..end, &edit.text)),
            _ => {
                return Err(EqnumError::InvalidEdit(format!(
                    "line {} columns {:?} out of range",
                    edit.line, edit.range
                )));
            }
        }
    }

    resolved.sort_by_key(|(range, _)| (range.start, range.end));

    if let Some(pair) = resolved
        .windows(2)
        .find(|pair| pair[0].0.end > pair[1].0.start)
    {
        return Err(EqnumError::InvalidEdit(format!(
            "overlapping edits at {:?} and {:?}",
            pair[0].0, pair[1].0
        )));
    }

    let extra: usize = resolved.iter().map(|(_, new_text)| new_text.len()).sum();
    let mut out = String::with_capacity(text.len() + extra);
    let mut cursor = 0;
    for (range, new_text) in resolved {
        out.push_str(&text[cursor..range.start]);
        out.push_str(new_text);
        cursor = range.end;
    }
    out.push_str(&text[cursor..]);

    Ok(out)
}

//! Document access.
//!
//! [`DocumentStore`] is what the synchronizer needs from a host editor: the
//! full text, line access, and a way to apply one atomic transaction.
//! [`TextDocument`] is the in-memory implementation used by tests and by hosts
//! that mirror the editor's buffer.

use crate::error::Result;
use crate::sync::{Edit, apply_edits};
use std::ops::Range;

/// Host document interface.
pub trait DocumentStore {
    /// Full document text.
    fn text(&self) -> &str;

    /// Line by zero-based index, without its line terminator.
    fn line(&self, index: usize) -> Option<&str> {
        self.text().lines().nth(index)
    }

    fn line_count(&self) -> usize {
        self.text().lines().count()
    }

    /// Applies every edit or none of them. An empty slice is a no-op.
    fn apply_transaction(&mut self, edits: &[Edit]) -> Result<()>;
}

/// Pre-computed line start byte offsets for O(log n) position lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// Number of lines, counting a trailing empty line after a final newline.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Byte range of a line's content, excluding `\n` or `\r\n`.
    pub fn line_range(&self, text: &str, line: usize) -> Option<Range<usize>> {
        let start = self.line_start(line)?;
        let mut end = self
            .line_starts
            .get(line + 1)
            .map_or(text.len(), |next| next - 1);
        if end > start && text.as_bytes()[end - 1] == b'\r' && end < text.len() {
            end -= 1;
        }
        Some(start..end)
    }

    /// Absolute byte offset of a column within a line.
    ///
    /// Returns `None` when the line does not exist, the column runs past the
    /// end of the line, or the offset splits a character.
    pub fn offset(&self, text: &str, line: usize, column: usize) -> Option<usize> {
        let range = self.line_range(text, line)?;
        let offset = range.start.checked_add(column)?;
        (offset <= range.end && text.is_char_boundary(offset)).then_some(offset)
    }

    /// Line and byte column of an absolute offset.
    pub fn position(&self, offset: usize) -> (usize, usize) {
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        (line, offset - self.line_starts[line])
    }

    /// Converts a byte offset to a (line, UTF-16 character) pair.
    pub fn utf16_position(&self, text: &str, offset: usize) -> (u32, u32) {
        let offset = offset.min(text.len());
        let (line, _) = self.position(offset);
        let line_start = self.line_starts[line];

        let character = text
            .get(line_start..offset)
            .unwrap_or_default()
            .chars()
            .map(|c| c.len_utf16() as u32)
            .sum();

        (line as u32, character)
    }

    /// Converts a (line, UTF-16 character) pair to a byte offset.
    ///
    /// Positions past the end of a line clamp to the line end; lines past the
    /// end of the document clamp to the document end.
    pub fn offset_from_utf16(&self, text: &str, line: u32, character: u32) -> usize {
        let Some(range) = self.line_range(text, line as usize) else {
            return text.len();
        };

        let mut remaining = character as usize;
        for (idx, c) in text[range.clone()].char_indices() {
            if remaining == 0 {
                return range.start + idx;
            }
            remaining = remaining.saturating_sub(c.len_utf16());
        }
        range.end
    }
}

/// In-memory document.
///
/// `version` increases by one per applied non-empty transaction.
#[derive(Debug, Clone)]
pub struct TextDocument {
    text: String,
    index: LineIndex,
    version: u64,
}

impl TextDocument {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let index = LineIndex::new(&text);
        Self {
            text,
            index,
            version: 0,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn index(&self) -> &LineIndex {
        &self.index
    }

    /// Replaces the whole text, as a user edit would.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.index = LineIndex::new(&self.text);
        self.version += 1;
    }
}

impl DocumentStore for TextDocument {
    fn text(&self) -> &str {
        &self.text
    }

    fn line(&self, index: usize) -> Option<&str> {
        let range = self.index.line_range(&self.text, index)?;
        Some(&self.text[range])
    }

    fn line_count(&self) -> usize {
        self.text.lines().count()
    }

    fn apply_transaction(&mut self, edits: &[Edit]) -> Result<()> {
        if edits.is_empty() {
            return Ok(());
        }
        let updated = apply_edits(&self.text, edits)?;
        self.set_text(updated);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_ranges() {
        let text = "ab\r\ncd\nef";
        let index = LineIndex::new(text);
        assert_eq!(index.line_count(), 3);
        assert_eq!(index.line_range(text, 0), Some(0..2));
        assert_eq!(index.line_range(text, 1), Some(4..6));
        assert_eq!(index.line_range(text, 2), Some(7..9));
        assert_eq!(index.line_range(text, 3), None);
    }

    #[test]
    fn test_offset_validation() {
        let text = "héllo\nx";
        let index = LineIndex::new(text);
        assert_eq!(index.offset(text, 0, 1), Some(1));
        assert_eq!(index.offset(text, 0, 2), None);
        assert_eq!(index.offset(text, 0, 6), Some(6));
        assert_eq!(index.offset(text, 0, 7), None);
        assert_eq!(index.offset(text, 1, 1), Some(8));
    }

    #[test]
    fn test_position() {
        let index = LineIndex::new("ab\ncd");
        assert_eq!(index.position(0), (0, 0));
        assert_eq!(index.position(2), (0, 2));
        assert_eq!(index.position(3), (1, 0));
        assert_eq!(index.position(4), (1, 1));
    }

    #[test]
    fn test_utf16_round_trip_with_astral_chars() {
        let text = "a😀b\n\\ref{x}";
        let index = LineIndex::new(text);
        let b_offset = text.find('b').unwrap();
        assert_eq!(index.utf16_position(text, b_offset), (0, 3));
        assert_eq!(index.offset_from_utf16(text, 0, 3), b_offset);
        assert_eq!(index.offset_from_utf16(text, 1, 0), 7);
    }

    #[test]
    fn test_offset_from_utf16_clamps() {
        let text = "abc\nde";
        let index = LineIndex::new(text);
        assert_eq!(index.offset_from_utf16(text, 0, 99), 3);
        assert_eq!(index.offset_from_utf16(text, 9, 0), text.len());
    }

    #[test]
    fn test_text_document_lines() {
        let doc = TextDocument::new("one\ntwo\n");
        assert_eq!(doc.line(1), Some("two"));
        assert_eq!(doc.line_count(), 2);
    }

    #[test]
    fn test_empty_transaction_does_not_bump_version() {
        let mut doc = TextDocument::new("%\\label{a}");
        doc.apply_transaction(&[]).unwrap();
        assert_eq!(doc.version(), 0);
    }

    #[test]
    fn test_transaction_is_all_or_nothing() {
        let mut doc = TextDocument::new("abc\ndef");
        let edits = [Edit::insert(0, 0, "x"), Edit::insert(5, 0, "y")];
        assert!(doc.apply_transaction(&edits).is_err());
        assert_eq!(doc.text(), "abc\ndef");
        assert_eq!(doc.version(), 0);

        doc.apply_transaction(&[Edit::insert(0, 0, "x"), Edit::insert(1, 3, "y")])
            .unwrap();
        assert_eq!(doc.text(), "xabc\ndefy");
        assert_eq!(doc.version(), 1);
    }
}

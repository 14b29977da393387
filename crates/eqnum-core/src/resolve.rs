//! Reference lookup.
//!
//! Finds `\ref{key}` occurrences inside the visible parts of a document and
//! resolves them against a label cache snapshot. The snapshot may trail the
//! text by one debounce window; lookups simply use whatever it holds.

use crate::cache::LabelCache;
use crate::scanner::Label;
use crate::syntax::REF_PATTERN;
use std::ops::Range;
use std::sync::Arc;

/// A `\ref{key}` in the document. `range` is an absolute byte range covering
/// the whole marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceOccurrence {
    pub key: String,
    pub range: Range<usize>,
}

/// Normalizes host-supplied visible ranges.
///
/// Ranges are clamped to the text, widened to whole lines (a reference never
/// spans lines, so this keeps one straddling a range edge intact), then sorted
/// and merged.
pub fn normalize_ranges(text: &str, ranges: &[Range<usize>]) -> Vec<Range<usize>> {
    let mut widened: Vec<Range<usize>> = ranges
        .iter()
        .filter_map(|range| {
            let start = range.start.min(text.len());
            let end = range.end.min(text.len());
            if start > end {
                return None;
            }
            let line_start = text[..floor_boundary(text, start)]
                .rfind('\n')
                .map_or(0, |i| i + 1);
            let end = ceil_boundary(text, end);
            let line_end = text[end..].find('\n').map_or(text.len(), |i| end + i);
            Some(line_start..line_end)
        })
        .collect();

    widened.sort_by_key(|range| range.start);

    let mut merged: Vec<Range<usize>> = Vec::with_capacity(widened.len());
    for range in widened {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }
    merged
}

fn floor_boundary(text: &str, mut offset: usize) -> usize {
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

fn ceil_boundary(text: &str, mut offset: usize) -> usize {
    while !text.is_char_boundary(offset) {
        offset += 1;
    }
    offset
}

/// Collects every reference inside the visible ranges, in document order.
pub fn find_references(text: &str, visible: &[Range<usize>]) -> Vec<ReferenceOccurrence> {
    let mut occurrences = Vec::new();
    for range in normalize_ranges(text, visible) {
        let base = range.start;
        for caps in REF_PATTERN.captures_iter(&text[range]) {
            let (Some(whole), Some(key)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            occurrences.push(ReferenceOccurrence {
                key: key.as_str().to_string(),
                range: base + whole.start()..base + whole.end(),
            });
        }
    }
    occurrences
}

/// Resolves references against one cache snapshot.
#[derive(Debug, Clone)]
pub struct ReferenceResolver {
    cache: Arc<LabelCache>,
}

impl ReferenceResolver {
    pub fn new(cache: Arc<LabelCache>) -> Self {
        Self { cache }
    }

    /// Looks up the label an occurrence refers to.
    pub fn resolve(&self, occurrence: &ReferenceOccurrence) -> Option<&Label> {
        self.cache.get(&occurrence.key)
    }

    /// Occurrences in the visible ranges paired with their labels.
    /// Unresolved references are dropped.
    pub fn resolve_visible<'a>(
        &'a self,
        text: &str,
        visible: &[Range<usize>],
    ) -> impl Iterator<Item = (ReferenceOccurrence, &'a Label)> + 'a {
        find_references(text, visible)
            .into_iter()
            .filter_map(move |occurrence| {
                let label = self.cache.get(&occurrence.key)?;
                Some((occurrence, label))
            })
    }
}

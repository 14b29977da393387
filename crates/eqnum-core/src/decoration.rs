//! Decoration planning.
//!
//! Every resolved reference in view is shown as `{prefix}{ordinal}` unless a
//! selection touches it, in which case the raw `\ref{..}` stays visible so it
//! can be edited. The set is rebuilt from scratch on each qualifying update.

use crate::cache::LabelCache;
use crate::event::ViewState;
use crate::resolve::ReferenceResolver;
use std::ops::Range;
use std::sync::Arc;

/// A presentation-only replacement of `range` with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    pub range: Range<usize>,
    pub text: String,
}

/// Inclusive overlap: a caret sitting on either edge of `span` counts.
pub fn touches(span: &Range<usize>, selection: &Range<usize>) -> bool {
    let (sel_start, sel_end) = if selection.start <= selection.end {
        (selection.start, selection.end)
    } else {
        (selection.end, selection.start)
    };
    sel_start <= span.end && span.start <= sel_end
}

#[derive(Debug, Clone)]
pub struct DecorationPlanner<'a> {
    prefix: &'a str,
}

impl<'a> DecorationPlanner<'a> {
    pub fn new(prefix: &'a str) -> Self {
        Self { prefix }
    }

    /// Plans decorations for the visible part of `text`, sorted by position.
    ///
    /// # Examples
    ///
    /// ```
    /// use eqnum_core::decoration::DecorationPlanner;
    /// use eqnum_core::event::ViewState;
    /// use eqnum_core::scanner::{scan, ScanMode};
    /// use std::sync::Arc;
    ///
    /// let text = "%\\label{a}\nsee \\ref{a}";
    /// let cache = Arc::new(scan(text, ScanMode::Live).cache());
    /// let view = ViewState { visible: vec![0..text.len()], ..Default::default() };
    ///
    /// let decorations = DecorationPlanner::new("Eq. ").plan(text, &view, cache);
    /// assert_eq!(decorations[0].text, "Eq. 1");
    /// ```
    pub fn plan(&self, text: &str, view: &ViewState, cache: Arc<LabelCache>) -> Vec<Decoration> {
        let resolver = ReferenceResolver::new(cache);
        let selections = view.active_selections();

        let mut decorations: Vec<Decoration> = resolver
            .resolve_visible(text, &view.visible)
            .filter(|(occurrence, _)| {
                !selections
                    .iter()
                    .any(|selection| touches(&occurrence.range, selection))
            })
            .map(|(occurrence, label)| Decoration {
                range: occurrence.range,
                text: format!("{}{}", self.prefix, label.ordinal),
            })
            .collect();

        decorations.sort_by_key(|d| d.range.start);
        tracing::trace!(count = decorations.len(), "planned decorations");
        decorations
    }
}

//! Host update events and the view state they maintain.
//!
//! A host update may carry several changes at once (an edit that also moved
//! the selection, a scroll that also changed focus). Each change is one
//! [`UpdateEvent`]; [`DISPATCH`] decides which kinds require the decoration
//! set to be rebuilt.

use std::ops::Range;

/// One change reported by the host. Ranges are absolute byte offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateEvent {
    DocumentChanged,
    ViewportChanged(Vec<Range<usize>>),
    SelectionChanged(Vec<Range<usize>>),
    FocusChanged(bool),
    /// Anything else the host forwards (theme changes, geometry, ...).
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateKind {
    DocumentChanged,
    ViewportChanged,
    SelectionChanged,
    FocusChanged,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Redecorate,
    Ignore,
}

/// Reaction per update kind.
pub const DISPATCH: [(UpdateKind, Reaction); 5] = [
    (UpdateKind::DocumentChanged, Reaction::Redecorate),
    (UpdateKind::ViewportChanged, Reaction::Redecorate),
    (UpdateKind::SelectionChanged, Reaction::Redecorate),
    (UpdateKind::FocusChanged, Reaction::Redecorate),
    (UpdateKind::Other, Reaction::Ignore),
];

impl UpdateKind {
    pub fn reaction(self) -> Reaction {
        DISPATCH
            .iter()
            .find(|(kind, _)| *kind == self)
            .map_or(Reaction::Ignore, |(_, reaction)| *reaction)
    }
}

impl UpdateEvent {
    pub fn kind(&self) -> UpdateKind {
        match self {
            Self::DocumentChanged => UpdateKind::DocumentChanged,
            Self::ViewportChanged(_) => UpdateKind::ViewportChanged,
            Self::SelectionChanged(_) => UpdateKind::SelectionChanged,
            Self::FocusChanged(_) => UpdateKind::FocusChanged,
            Self::Other => UpdateKind::Other,
        }
    }

    pub fn reaction(&self) -> Reaction {
        self.kind().reaction()
    }
}

/// What the host currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub visible: Vec<Range<usize>>,
    pub selections: Vec<Range<usize>>,
    pub focused: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            visible: Vec::new(),
            selections: Vec::new(),
            focused: true,
        }
    }
}

impl ViewState {
    /// Folds a batch of events into the state.
    ///
    /// Returns [`Reaction::Redecorate`] if any event in the batch asks for it.
    pub fn apply(&mut self, events: &[UpdateEvent]) -> Reaction {
        let mut reaction = Reaction::Ignore;
        for event in events {
            match event {
                UpdateEvent::ViewportChanged(ranges) => self.visible.clone_from(ranges),
                UpdateEvent::SelectionChanged(ranges) => self.selections.clone_from(ranges),
                UpdateEvent::FocusChanged(focused) => self.focused = *focused,
                UpdateEvent::DocumentChanged | UpdateEvent::Other => {}
            }
            if event.reaction() == Reaction::Redecorate {
                reaction = Reaction::Redecorate;
            }
        }
        reaction
    }

    /// Selections that can hide a decoration. An unfocused view has none.
    pub fn active_selections(&self) -> &[Range<usize>] {
        if self.focused { &self.selections } else { &[] }
    }
}

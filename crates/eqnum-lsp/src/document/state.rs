use dashmap::DashMap;
use eqnum_core::{DocumentSession, LineIndex, ViewState};
use std::ops::Range;
use tower_lsp_server::ls_types::{Position, Range as LspRange, Uri};

/// State for a single open document.
///
/// Holds the text as last reported by the client, the label cache published
/// by the most recent synchronization, and the client's view (visible ranges,
/// selections) in LSP coordinates.
///
/// # Examples
///
/// ```
/// use eqnum_lsp::document::DocumentState;
///
/// let doc = DocumentState::new("%\\label{a}\n\\ref{a}".into(), 1);
/// assert_eq!(doc.version, 1);
/// assert!(doc.session.cache.load().is_empty());
/// ```
#[derive(Debug)]
pub struct DocumentState {
    /// Document text
    pub content: String,
    /// Client version of `content`
    pub version: i32,
    /// Line starts of `content`
    pub index: LineIndex,
    /// Label cache and view state
    pub session: DocumentSession,
    /// Visible ranges and selections as the client reported them
    pub view: ClientView,
}

/// The client's view in LSP coordinates.
///
/// A caret keeps its line and character when text is inserted on another
/// line, and the client reports no new selection. Byte offsets go stale on
/// such edits, so these ranges are resolved against the current text each
/// time a view is planned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientView {
    pub visible: Vec<LspRange>,
    pub selections: Vec<LspRange>,
}

impl DocumentState {
    pub fn new(content: String, version: i32) -> Self {
        let index = LineIndex::new(&content);
        Self {
            content,
            version,
            index,
            session: DocumentSession::default(),
            view: ClientView::default(),
        }
    }

    /// Replaces the text after a full-sync change.
    ///
    /// The byte view held by the session is re-resolved against the new text.
    pub fn update_content(&mut self, content: String, version: i32) {
        self.index = LineIndex::new(&content);
        self.content = content;
        self.version = version;
        self.session.view = self.byte_view();
    }

    /// The client's view as byte ranges of the current text.
    pub fn byte_view(&self) -> ViewState {
        let to_bytes = |ranges: &[LspRange]| -> Vec<Range<usize>> {
            ranges.iter().map(|range| self.byte_range(*range)).collect()
        };
        ViewState {
            visible: to_bytes(&self.view.visible),
            selections: to_bytes(&self.view.selections),
            focused: self.session.view.focused,
        }
    }

    /// LSP position of a byte offset.
    pub fn position(&self, offset: usize) -> Position {
        let (line, character) = self.index.utf16_position(&self.content, offset);
        Position::new(line, character)
    }

    /// LSP range of a byte range.
    pub fn lsp_range(&self, range: &Range<usize>) -> LspRange {
        LspRange::new(self.position(range.start), self.position(range.end))
    }

    /// Byte offset of an LSP position, clamped to the document.
    pub fn offset(&self, position: Position) -> usize {
        self.index
            .offset_from_utf16(&self.content, position.line, position.character)
    }

    /// Byte range of an LSP range. Reversed ranges (an anchor after the
    /// caret) stay reversed.
    pub fn byte_range(&self, range: LspRange) -> Range<usize> {
        self.offset(range.start)..self.offset(range.end)
    }
}

/// Global LSP server state.
///
/// Shared across handlers and the synchronization job via `Arc`.
///
/// # Examples
///
/// ```
/// use eqnum_lsp::document::ServerState;
///
/// let state = ServerState::new();
/// assert_eq!(state.document_count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct ServerState {
    /// Open documents by URI
    pub documents: DashMap<Uri, DocumentState>,
}

impl ServerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieves document state by URI.
    ///
    /// The reference holds a lock on the internal map, so it should be
    /// dropped before any `.await`.
    pub fn get_document(
        &self,
        uri: &Uri,
    ) -> Option<dashmap::mapref::one::Ref<'_, Uri, DocumentState>> {
        self.documents.get(uri)
    }

    pub fn get_document_mut(
        &self,
        uri: &Uri,
    ) -> Option<dashmap::mapref::one::RefMut<'_, Uri, DocumentState>> {
        self.documents.get_mut(uri)
    }

    /// Updates or inserts document state.
    pub fn update_document(&self, uri: Uri, state: DocumentState) {
        self.documents.insert(uri, state);
    }

    pub fn remove_document(&self, uri: &Uri) -> Option<(Uri, DocumentState)> {
        self.documents.remove(uri)
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// URIs of all open documents.
    pub fn uris(&self) -> Vec<Uri> {
        self.documents.iter().map(|entry| entry.key().clone()).collect()
    }
}

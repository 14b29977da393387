//! Client view notifications.
//!
//! Editors report what they show through three custom notifications. Each is
//! turned into an [`UpdateEvent`] against the document's current text and
//! folded into its view state.

use super::decorations::{self, PublishDecorationsParams};
use crate::document::{DocumentState, ServerState};
use crate::error::{LspError, Result};
use eqnum_core::UpdateEvent;
use serde::{Deserialize, Serialize};
use tower_lsp_server::ls_types::{Range, TextDocumentIdentifier, Uri};

pub const DID_CHANGE_VISIBLE_RANGES: &str = "eqnum/didChangeVisibleRanges";
pub const DID_CHANGE_SELECTION: &str = "eqnum/didChangeSelection";
pub const DID_CHANGE_FOCUS: &str = "eqnum/didChangeFocus";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleRangesParams {
    pub text_document: TextDocumentIdentifier,
    pub ranges: Vec<Range>,
}

/// Selections may be reversed: `start` is the anchor, `end` the caret.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionParams {
    pub text_document: TextDocumentIdentifier,
    pub selections: Vec<Range>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusParams {
    pub text_document: TextDocumentIdentifier,
    pub focused: bool,
}

/// A change in what the client shows, in LSP coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewUpdate {
    DocumentChanged,
    VisibleRanges(Vec<Range>),
    Selections(Vec<Range>),
    Focus(bool),
}

impl ViewUpdate {
    /// Records the update on the document and returns the matching event,
    /// resolved against the current text.
    fn record(&self, doc: &mut DocumentState) -> UpdateEvent {
        match self {
            Self::DocumentChanged => UpdateEvent::DocumentChanged,
            Self::VisibleRanges(ranges) => {
                doc.view.visible.clone_from(ranges);
                UpdateEvent::ViewportChanged(doc.byte_view().visible)
            }
            Self::Selections(ranges) => {
                doc.view.selections.clone_from(ranges);
                UpdateEvent::SelectionChanged(doc.byte_view().selections)
            }
            Self::Focus(focused) => UpdateEvent::FocusChanged(*focused),
        }
    }
}

/// Folds an update into the document's view.
///
/// Returns the new decoration set when the update calls for one, `None` when
/// nothing changed.
pub fn apply_update(
    state: &ServerState,
    uri: &Uri,
    update: &ViewUpdate,
    prefix: &str,
) -> Result<Option<PublishDecorationsParams>> {
    let mut doc = state
        .get_document_mut(uri)
        .ok_or_else(|| LspError::DocumentNotFound(format!("{uri:?}")))?;

    let event = update.record(&mut doc);
    let DocumentState {
        content,
        session,
        version,
        ..
    } = &mut *doc;
    let version = *version;
    let Some(planned) = session.on_update(std::slice::from_ref(&event), content, prefix) else {
        return Ok(None);
    };

    Ok(Some(PublishDecorationsParams {
        uri: uri.clone(),
        version,
        decorations: decorations::to_items(&doc, &planned),
    }))
}

//! Inlay hints after `\ref{..}`.
//!
//! The requested range is treated as the visible range. Each resolved
//! reference in it that no selection touches gets a `{prefix}{n}` hint at
//! the end of its source text.

use crate::config::InlayHintsConfig;
use crate::document::{DocumentState, ServerState};
use crate::error::{LspError, Result};
use eqnum_core::{DecorationPlanner, ViewState};
use std::sync::Arc;
use tower_lsp_server::ls_types::{InlayHint, InlayHintLabel, InlayHintParams, Range};

/// Handles inlay hint requests.
///
/// Gracefully degrades by returning an empty vec when the document is unknown.
pub fn handle_inlay_hints(
    state: Arc<ServerState>,
    params: &InlayHintParams,
    config: &InlayHintsConfig,
    prefix: &str,
) -> Vec<InlayHint> {
    if !config.enabled {
        return vec![];
    }

    match document_hints(&state, params, prefix) {
        Ok(hints) => hints,
        Err(e) => {
            tracing::warn!("no inlay hints: {}", e);
            vec![]
        }
    }
}

fn document_hints(
    state: &ServerState,
    params: &InlayHintParams,
    prefix: &str,
) -> Result<Vec<InlayHint>> {
    let uri = &params.text_document.uri;
    let doc = state
        .get_document(uri)
        .ok_or_else(|| LspError::DocumentNotFound(format!("{uri:?}")))?;

    Ok(generate_hints(&doc, params.range, prefix))
}

pub(crate) fn generate_hints(doc: &DocumentState, range: Range, prefix: &str) -> Vec<InlayHint> {
    let current = doc.byte_view();
    let view = ViewState {
        visible: vec![doc.byte_range(range)],
        selections: current.selections,
        focused: current.focused,
    };

    DecorationPlanner::new(prefix)
        .plan(&doc.content, &view, doc.session.cache.load())
        .into_iter()
        .map(|decoration| InlayHint {
            position: doc.position(decoration.range.end),
            label: InlayHintLabel::String(decoration.text),
            kind: None,
            padding_left: Some(true),
            padding_right: None,
            text_edits: None,
            tooltip: None,
            data: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use eqnum_core::{DocumentStore, TextDocument};
    use tower_lsp_server::ls_types::{
        Position, TextDocumentIdentifier, Uri, WorkDoneProgressParams,
    };

    const TEXT: &str = "%\\label{a}\n%\\label{b}\nsee \\ref{b} and \\ref{a}\n\\ref{missing}";

    fn uri() -> Uri {
        Uri::from_file_path("/test/paper.tex").unwrap()
    }

    fn state_with_synced_document() -> Arc<ServerState> {
        let mut source = TextDocument::new(TEXT);
        let mut doc = DocumentState::new(String::new(), 1);
        doc.session.synchronize(&mut source).unwrap();
        doc.update_content(source.text().to_string(), 2);

        let state = Arc::new(ServerState::new());
        state.update_document(uri(), doc);
        state
    }

    fn params(range: Range) -> InlayHintParams {
        InlayHintParams {
            text_document: TextDocumentIdentifier { uri: uri() },
            range,
            work_done_progress_params: WorkDoneProgressParams::default(),
        }
    }

    fn whole_document() -> Range {
        Range::new(Position::new(0, 0), Position::new(100, 0))
    }

    #[test]
    fn test_hints_for_resolved_references() {
        let state = state_with_synced_document();
        let hints = handle_inlay_hints(
            state,
            &params(whole_document()),
            &InlayHintsConfig::default(),
            "Equation ",
        );

        assert_eq!(hints.len(), 2);
        assert_eq!(hints[0].position, Position::new(2, 11));
        assert!(matches!(&hints[0].label, InlayHintLabel::String(s) if s == "Equation 2"));
        assert!(matches!(&hints[1].label, InlayHintLabel::String(s) if s == "Equation 1"));
    }

    #[test]
    fn test_hints_limited_to_requested_range() {
        let state = state_with_synced_document();
        let first_two_lines = Range::new(Position::new(0, 0), Position::new(1, 3));
        let hints = handle_inlay_hints(
            state,
            &params(first_two_lines),
            &InlayHintsConfig::default(),
            "Equation ",
        );

        assert!(hints.is_empty());
    }

    #[test]
    fn test_selection_hides_hint() {
        let state = state_with_synced_document();
        {
            let mut doc = state.get_document_mut(&uri()).unwrap();
            let caret = doc.position(doc.content.find("\\ref{a}").unwrap() + 2);
            doc.view.selections = vec![Range::new(caret, caret)];
        }

        let hints = handle_inlay_hints(
            state,
            &params(whole_document()),
            &InlayHintsConfig::default(),
            "Eq. ",
        );
        assert_eq!(hints.len(), 1);
        assert!(matches!(&hints[0].label, InlayHintLabel::String(s) if s == "Eq. 2"));
    }

    #[test]
    fn test_disabled_returns_empty() {
        let state = state_with_synced_document();
        let config = InlayHintsConfig { enabled: false };
        assert!(handle_inlay_hints(state, &params(whole_document()), &config, "Eq. ").is_empty());
    }

    #[test]
    fn test_hint_stays_hidden_after_tags_inserted_above() {
        let state = Arc::new(ServerState::new());
        let mut doc = DocumentState::new("%\\label{a}\n\\ref{a}".into(), 1);
        let caret = Position::new(1, 2);
        doc.view.selections = vec![Range::new(caret, caret)];

        let mut source = TextDocument::new(doc.content.clone());
        doc.session.synchronize(&mut source).unwrap();
        doc.update_content(source.text().to_string(), 2);
        state.update_document(uri(), doc);

        let hints = handle_inlay_hints(
            Arc::clone(&state),
            &params(whole_document()),
            &InlayHintsConfig::default(),
            "Eq. ",
        );
        assert!(hints.is_empty());
    }

    #[test]
    fn test_unknown_document_is_not_found() {
        let state = ServerState::new();
        assert!(matches!(
            document_hints(&state, &params(whole_document()), "Eq. "),
            Err(LspError::DocumentNotFound(_))
        ));
    }

    #[test]
    fn test_unknown_document_returns_empty() {
        let state = Arc::new(ServerState::new());
        let hints = handle_inlay_hints(
            state,
            &params(whole_document()),
            &InlayHintsConfig::default(),
            "Eq. ",
        );
        assert!(hints.is_empty());
    }
}

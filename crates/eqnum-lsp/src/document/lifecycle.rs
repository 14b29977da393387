//! Document lifecycle and the synchronization job.
//!
//! Open and change notifications store the text and poke the scheduler. When
//! the scheduler fires, [`synchronize_document`] plans one cycle against the
//! latest text, sends the tag edits to the client as a single
//! `workspace/applyEdit`, publishes the new label cache, and refreshes
//! everything derived from it.
//!
//! The client answers our edit with a `didChange`, which lands inside the
//! debounce window. The trailing run then finds nothing to do.

use super::state::{DocumentState, ServerState};
use crate::config::EqnumConfig;
use crate::error::{LspError, Result};
use crate::handlers::{decorations, diagnostics};
use eqnum_core::{ChangeScheduler, Edit, EqnumError, EquationSession, plan_cycle};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower_lsp_server::Client;
use tower_lsp_server::ls_types::{
    DocumentChanges, OneOf, OptionalVersionedTextDocumentIdentifier, Range, TextDocumentEdit,
    TextEdit, Uri, WorkspaceEdit,
};

/// Everything the synchronization job needs, cheap to clone into each run.
#[derive(Clone)]
pub struct SyncContext {
    pub state: Arc<ServerState>,
    pub client: Client,
    pub config: Arc<RwLock<EqnumConfig>>,
    pub session: Arc<RwLock<EquationSession>>,
}

impl SyncContext {
    /// Builds the per-document scheduler that runs [`synchronize_document`].
    pub fn scheduler(&self, window: Duration) -> ChangeScheduler<Uri> {
        let ctx = self.clone();
        ChangeScheduler::new(window, move |uri: Uri| {
            let ctx = ctx.clone();
            async move { synchronize_document(ctx, uri).await }
        })
    }
}

/// Stores a newly opened document.
pub fn handle_document_open(state: &ServerState, uri: Uri, content: String, version: i32) {
    tracing::info!("opening {:?} (version {})", uri, version);
    state.update_document(uri, DocumentState::new(content, version));
}

/// Replaces the text of an open document.
///
/// Returns `false` if the document was never opened.
pub fn handle_document_change(state: &ServerState, uri: &Uri, content: String, version: i32) -> bool {
    match state.get_document_mut(uri) {
        Some(mut doc) => {
            doc.update_content(content, version);
            true
        }
        None => {
            tracing::warn!("change for unopened document: {:?}", uri);
            false
        }
    }
}

/// Forgets a closed document and any owed synchronization.
pub fn handle_document_close(state: &ServerState, scheduler: &ChangeScheduler<Uri>, uri: &Uri) {
    scheduler.cancel(uri);
    state.remove_document(uri);
}

/// Converts a planned transaction to LSP text edits.
///
/// Positions refer to the text the plan was made from, as LSP requires for
/// the edits of one `TextDocumentEdit`.
pub fn to_text_edits(doc: &DocumentState, edits: &[Edit]) -> Result<Vec<TextEdit>> {
    edits
        .iter()
        .map(|edit| {
            let start = doc.index.offset(&doc.content, edit.line, edit.range.start);
            let end = doc.index.offset(&doc.content, edit.line, edit.range.end);
            match (start, end) {
                (Some(start), Some(end)) => Ok(TextEdit {
                    range: Range::new(doc.position(start), doc.position(end)),
                    new_text: edit.text.clone(),
                }),
                _ => Err(EqnumError::InvalidEdit(format!(
                    "line {} columns {:?} outside document",
                    edit.line, edit.range
                ))
                .into()),
            }
        })
        .collect()
}

/// Sends one transaction to the client and waits for its verdict.
pub async fn apply_tag_edits(
    client: &Client,
    uri: &Uri,
    version: i32,
    edits: Vec<TextEdit>,
) -> Result<()> {
    let edit = WorkspaceEdit {
        document_changes: Some(DocumentChanges::Edits(vec![TextDocumentEdit {
            text_document: OptionalVersionedTextDocumentIdentifier {
                uri: uri.clone(),
                version: Some(version),
            },
            edits: edits.into_iter().map(OneOf::Left).collect(),
        }])),
        ..Default::default()
    };

    let response = client.apply_edit(edit).await?;
    if response.applied {
        Ok(())
    } else {
        Err(LspError::EditRejected {
            uri: format!("{uri:?}"),
            reason: response
                .failure_reason
                .unwrap_or_else(|| "no reason given".into()),
        })
    }
}

/// Runs one synchronization cycle for `uri`.
///
/// Never fails: problems are logged and the previous cache stays published.
pub async fn synchronize_document(ctx: SyncContext, uri: Uri) {
    let config = { ctx.config.read().await.clone() };
    let prefix = { ctx.session.read().await.prefix().to_string() };

    // Plan against the latest text without holding the map lock across awaits.
    let planned = {
        let Some(doc) = ctx.state.get_document(&uri) else {
            tracing::debug!("document closed before sync: {:?}", uri);
            return;
        };
        let cycle = plan_cycle(&doc.content);
        let diagnostics = diagnostics::generate_diagnostics(&doc, &cycle.scan, &config.sync);
        let edits = to_text_edits(&doc, &cycle.edits);
        edits.map(|edits| (cycle, edits, doc.version, diagnostics))
    };

    let (cycle, edits, version, diagnostics) = match planned {
        Ok(planned) => planned,
        Err(e) => {
            tracing::warn!("skipping sync of {:?}: {}", uri, e);
            return;
        }
    };

    if !edits.is_empty() {
        tracing::debug!("sending {} tag edits for {:?}", edits.len(), uri);
        if let Err(e) = apply_tag_edits(&ctx.client, &uri, version, edits).await {
            tracing::warn!("tag edits not applied to {:?}: {}", uri, e);
            return;
        }
    }

    let decorations = {
        let Some(doc) = ctx.state.get_document(&uri) else {
            return;
        };
        doc.session.cache.replace(cycle.cache());
        tracing::debug!(
            "synchronized {:?}: {} labels, {} duplicates",
            uri,
            cycle.scan.labels.len(),
            cycle.scan.duplicates.len()
        );
        decorations::PublishDecorationsParams {
            uri: uri.clone(),
            version: doc.version,
            decorations: decorations::build(&doc, &prefix),
        }
    };

    ctx.client
        .publish_diagnostics(uri, diagnostics, Some(version))
        .await;

    if config.decorations.enabled {
        decorations::publish(&ctx.client, decorations).await;
    }

    if config.inlay_hints.enabled
        && let Err(e) = ctx.client.inlay_hint_refresh().await
    {
        tracing::debug!("inlay_hint_refresh not supported: {:?}", e);
    }
}

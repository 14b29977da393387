//! `eqnum/publishDecorations` notification.
//!
//! Clients that can draw replacement decorations hide the `\ref{..}` source
//! range and show `text` in its place. The full set for the document is sent
//! every time; an empty list clears what was shown.

use crate::document::DocumentState;
use eqnum_core::DecorationPlanner;
use serde::{Deserialize, Serialize};
use tower_lsp_server::Client;
use tower_lsp_server::ls_types::notification::Notification;
use tower_lsp_server::ls_types::{Range, Uri};

pub enum PublishDecorations {}

impl Notification for PublishDecorations {
    type Params = PublishDecorationsParams;
    const METHOD: &'static str = "eqnum/publishDecorations";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishDecorationsParams {
    pub uri: Uri,
    /// Document version the ranges refer to.
    pub version: i32,
    pub decorations: Vec<DecorationItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecorationItem {
    pub range: Range,
    pub text: String,
}

/// Converts planned decorations to LSP ranges of `doc`.
pub fn to_items(doc: &DocumentState, decorations: &[eqnum_core::Decoration]) -> Vec<DecorationItem> {
    decorations
        .iter()
        .map(|decoration| DecorationItem {
            range: doc.lsp_range(&decoration.range),
            text: decoration.text.clone(),
        })
        .collect()
}

/// Plans the decorations for the document's current view.
pub fn build(doc: &DocumentState, prefix: &str) -> Vec<DecorationItem> {
    let decorations = DecorationPlanner::new(prefix).plan(
        &doc.content,
        &doc.byte_view(),
        doc.session.cache.load(),
    );
    to_items(doc, &decorations)
}

pub async fn publish(client: &Client, params: PublishDecorationsParams) {
    tracing::debug!(
        "publishing {} decorations for {:?}",
        params.decorations.len(),
        params.uri
    );
    client
        .send_notification::<PublishDecorations>(params)
        .await;
}

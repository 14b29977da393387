//! Duplicate label diagnostics.
//!
//! Duplicated keys are legal: the later declaration wins the lookup. With
//! `sync.strict_duplicates` enabled each later declaration is reported.

use crate::config::SyncConfig;
use crate::document::DocumentState;
use eqnum_core::{EqnumError, ScanResult};
use tower_lsp_server::ls_types::Diagnostic;

/// Builds diagnostics for the duplicates found by `scan` over `doc`'s text.
pub fn generate_diagnostics(
    doc: &DocumentState,
    scan: &ScanResult,
    config: &SyncConfig,
) -> Vec<Diagnostic> {
    if !config.strict_duplicates {
        return vec![];
    }

    scan.duplicates
        .iter()
        .filter_map(|dup| {
            let label = scan.labels.iter().find(|label| label.line == dup.line)?;
            let line_start = doc.index.line_start(label.line)?;
            let range = line_start + label.span.start..line_start + label.span.end;

            Some(Diagnostic {
                range: doc.lsp_range(&range),
                severity: Some(config.duplicate_severity),
                message: EqnumError::from(dup).to_string(),
                source: Some("eqnum-lsp".into()),
                ..Default::default()
            })
        })
        .collect()
}

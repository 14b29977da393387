//! One scan + synchronize cycle.

use crate::cache::{LabelCache, LabelCacheCell};
use crate::document::DocumentStore;
use crate::error::Result;
use crate::scanner::{DuplicateLabel, ScanMode, ScanResult, scan};
use crate::sync::{Edit, plan_edits};

/// The plan for one cycle: what the scan found and what must be written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncCycle {
    pub scan: ScanResult,
    pub edits: Vec<Edit>,
}

impl SyncCycle {
    pub fn cache(&self) -> LabelCache {
        self.scan.cache()
    }

    /// True when the document needs no edits.
    pub fn is_fixed_point(&self) -> bool {
        self.edits.is_empty()
    }
}

/// Plans a cycle for the given text without touching any document.
pub fn plan_cycle(text: &str) -> SyncCycle {
    let lines: Vec<&str> = text.lines().collect();
    let scan = scan(text, ScanMode::Live);
    let edits = plan_edits(&lines, &scan.labels);
    SyncCycle { scan, edits }
}

/// What a completed cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleOutcome {
    /// Number of edits in the applied transaction (zero if none was sent).
    pub edits_applied: usize,
    pub labels: usize,
    pub duplicates: Vec<DuplicateLabel>,
}

/// Runs one cycle against a store and publishes the new cache.
///
/// The transaction is only dispatched when it is non-empty. If the store
/// rejects it, the previous cache stays in place and the error is returned.
pub fn run_cycle(store: &mut dyn DocumentStore, cache: &LabelCacheCell) -> Result<CycleOutcome> {
    let cycle = plan_cycle(store.text());

    if !cycle.is_fixed_point() {
        tracing::debug!(edits = cycle.edits.len(), "applying tag transaction");
        store.apply_transaction(&cycle.edits)?;
    }

    cache.replace(cycle.cache());

    Ok(CycleOutcome {
        edits_applied: cycle.edits.len(),
        labels: cycle.scan.labels.len(),
        duplicates: cycle.scan.duplicates,
    })
}

//! Session state.
//!
//! An [`EquationSession`] owns the settings for its whole lifetime: they are
//! loaded on [`EquationSession::activate`] and written back on
//! [`EquationSession::deactivate`]. Each open document gets its own
//! [`DocumentSession`] holding the label cache and what the host shows. The
//! host discards each document's cache when the session ends.

use crate::cache::LabelCacheCell;
use crate::decoration::{Decoration, DecorationPlanner};
use crate::document::DocumentStore;
use crate::error::Result;
use crate::event::{Reaction, UpdateEvent, ViewState};
use crate::pipeline::{CycleOutcome, run_cycle};
use crate::settings::{Settings, SettingsStore, load_or, validate_prefix};

#[derive(Debug, Clone, Default)]
pub struct EquationSession {
    settings: Settings,
}

impl EquationSession {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Starts a session from stored settings, falling back to defaults.
    pub async fn activate(store: &dyn SettingsStore) -> Self {
        Self::activate_or(store, Settings::default()).await
    }

    /// Starts a session from stored settings, falling back to `fallback`.
    pub async fn activate_or(store: &dyn SettingsStore, fallback: Settings) -> Self {
        let settings = load_or(store, fallback).await;
        tracing::info!(prefix = %settings.prefix, "session activated");
        Self { settings }
    }

    /// Ends the session, persisting its settings.
    pub async fn deactivate(self, store: &dyn SettingsStore) -> Result<()> {
        store.save(&self.settings).await?;
        tracing::info!("session deactivated");
        Ok(())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn prefix(&self) -> &str {
        &self.settings.prefix
    }

    pub fn set_prefix(&mut self, prefix: impl Into<String>) {
        self.settings.prefix = validate_prefix(prefix.into());
    }

    pub fn document(&self) -> DocumentSession {
        DocumentSession::default()
    }
}

/// Per-document state: the published label cache and the current view.
#[derive(Debug, Default)]
pub struct DocumentSession {
    pub cache: LabelCacheCell,
    pub view: ViewState,
}

impl DocumentSession {
    /// Runs one scan + sync cycle against `store`.
    pub fn synchronize(&self, store: &mut dyn DocumentStore) -> Result<CycleOutcome> {
        run_cycle(store, &self.cache)
    }

    /// Folds host updates into the view.
    ///
    /// Returns a fresh decoration set when the batch qualifies, `None` when
    /// the decorations stay as they were.
    pub fn on_update(
        &mut self,
        events: &[UpdateEvent],
        text: &str,
        prefix: &str,
    ) -> Option<Vec<Decoration>> {
        match self.view.apply(events) {
            Reaction::Redecorate => Some(self.decorations(text, prefix)),
            Reaction::Ignore => None,
        }
    }

    /// Discards the published label cache. References resolve to nothing until
    /// the next synchronization.
    pub fn discard(&self) {
        self.cache.clear();
        tracing::debug!("label cache discarded");
    }

    /// Decorations for the current view from the latest cache snapshot.
    pub fn decorations(&self, text: &str, prefix: &str) -> Vec<Decoration> {
        DecorationPlanner::new(prefix).plan(text, &self.view, self.cache.load())
    }
}

//! Equation numbering engine.
//!
//! Labels declared with `\label{key}` get ordinals in document order. Lines
//! carrying a comment marker are kept annotated with a matching `\tag{n}`,
//! and every `\ref{key}` in view can be displayed as `{prefix}{n}` unless the
//! cursor is on it.
//!
//! # Architecture
//!
//! - **Scanning**: [`scanner`] extracts labels, [`cache`] publishes them as
//!   immutable snapshots.
//! - **Synchronization**: [`sync`] plans the minimal tag edits, [`pipeline`]
//!   runs one cycle against a [`DocumentStore`], [`scheduler`] debounces
//!   cycles per document.
//! - **Presentation**: [`resolve`] finds references in view, [`decoration`]
//!   decides what each one shows, [`event`] tracks the host's view.
//! - **State**: [`settings`] and [`session`] tie the prefix and caches to an
//!   activate/deactivate lifecycle.
//!
//! # Examples
//!
//! ```
//! use eqnum_core::{DocumentStore, EquationSession, TextDocument, UpdateEvent};
//!
//! let session = EquationSession::default();
//! let mut doc = TextDocument::new("%\\label{one}\n\\ref{one}\n%\\label{two}");
//! let mut state = session.document();
//!
//! state.synchronize(&mut doc).unwrap();
//! assert!(doc.text().starts_with("\\tag{1}%\\label{one}"));
//!
//! let visible = UpdateEvent::ViewportChanged(vec![0..doc.text().len()]);
//! let decorations = state
//!     .on_update(&[visible], doc.text(), session.prefix())
//!     .unwrap();
//! assert_eq!(decorations[0].text, "Equation 1");
//! ```

pub mod cache;
pub mod decoration;
pub mod document;
pub mod error;
pub mod event;
pub mod pipeline;
pub mod resolve;
pub mod scanner;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod sync;
pub mod syntax;

pub use cache::{LabelCache, LabelCacheCell};
pub use decoration::{Decoration, DecorationPlanner};
pub use document::{DocumentStore, LineIndex, TextDocument};
pub use error::{EqnumError, Result};
pub use event::{Reaction, UpdateEvent, UpdateKind, ViewState};
pub use pipeline::{CycleOutcome, SyncCycle, plan_cycle, run_cycle};
pub use resolve::{ReferenceOccurrence, ReferenceResolver};
pub use scanner::{DuplicateLabel, Label, ScanMode, ScanResult, scan};
pub use scheduler::{ChangeScheduler, Debouncer};
pub use session::{DocumentSession, EquationSession};
pub use settings::{JsonFileSettingsStore, MemorySettingsStore, Settings, SettingsStore};
pub use sync::{Edit, apply_edits, plan_edits};

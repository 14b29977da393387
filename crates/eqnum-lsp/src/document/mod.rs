//! Document management module.
//!
//! - `state`: per-document and server state
//! - `lifecycle`: open/change/close handling and the synchronization job

mod lifecycle;
mod state;

pub use lifecycle::{
    SyncContext, apply_tag_edits, handle_document_change, handle_document_close,
    handle_document_open, synchronize_document, to_text_edits,
};
pub use state::{DocumentState, ServerState};

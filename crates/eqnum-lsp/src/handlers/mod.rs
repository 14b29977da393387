//! LSP protocol handlers.
//!
//! - [`inlay_hints`]: `{prefix}{n}` hints after resolved references
//! - [`decorations`]: the `eqnum/publishDecorations` notification
//! - [`diagnostics`]: duplicate label warnings in strict mode
//! - [`view`]: visible range, selection and focus notifications from the client
//!
//! Handlers gracefully degrade on errors (never panic): an unknown document
//! yields no hints and no decorations.

pub mod decorations;
pub mod diagnostics;
pub mod inlay_hints;
pub mod view;

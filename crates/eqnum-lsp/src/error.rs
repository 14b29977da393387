use thiserror::Error;

/// Error types for the eqnum-lsp server.
///
/// None of these reach the client as protocol errors; handlers log them and
/// degrade to showing the raw document.
///
/// # Examples
///
/// ```
/// use eqnum_lsp::error::{LspError, Result};
///
/// fn lookup(uri: &str) -> Result<()> {
///     Err(LspError::DocumentNotFound(uri.into()))
/// }
///
/// assert!(lookup("file:///a.tex").is_err());
/// ```
#[derive(Error, Debug)]
pub enum LspError {
    #[error("document not open: {0}")]
    DocumentNotFound(String),

    #[error("client rejected edit for {uri}: {reason}")]
    EditRejected { uri: String, reason: String },

    #[error("client request failed: {0}")]
    Client(#[from] tower_lsp_server::jsonrpc::Error),

    #[error(transparent)]
    Core(#[from] eqnum_core::EqnumError),
}

/// Convenience type alias for `Result<T, LspError>`.
pub type Result<T> = std::result::Result<T, LspError>;

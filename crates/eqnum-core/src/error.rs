use std::path::PathBuf;
use thiserror::Error;

/// Core error types for eqnum.
///
/// None of these are fatal to an editing session: callers log them and fall
/// back to showing literal source text. Malformed `\label`/`\tag` syntax and
/// unresolved references are not errors at all and never show up here.
///
/// # Examples
///
/// ```
/// use eqnum_core::error::{EqnumError, Result};
///
/// fn check_key(key: &str) -> Result<()> {
///     if key.is_empty() {
///         return Err(EqnumError::InvalidEdit("empty key".into()));
///     }
///     Ok(())
/// }
///
/// assert!(check_key("").is_err());
/// ```
#[derive(Error, Debug)]
pub enum EqnumError {
    #[error("failed to load settings from {path}: {source}")]
    Settings {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("invalid edit transaction: {0}")]
    InvalidEdit(String),

    #[error("duplicate label '{key}' on line {line} (first declared on line {first_line})")]
    DuplicateLabel {
        key: String,
        first_line: usize,
        line: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for `Result<T, EqnumError>`.
pub type Result<T> = std::result::Result<T, EqnumError>;

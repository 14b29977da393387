use eqnum_core::settings::{DEFAULT_PREFIX, deserialize_prefix};
use serde::Deserialize;
use std::path::PathBuf;
use tower_lsp_server::ls_types::DiagnosticSeverity;

/// Root configuration for the eqnum-lsp server.
///
/// Provided by the client through initialization options and
/// `workspace/didChangeConfiguration`. Every field has a default.
///
/// # Examples
///
/// ```
/// use eqnum_lsp::config::EqnumConfig;
///
/// let json = r#"{
///     "prefix": "Eq. ",
///     "sync": { "debounce_ms": 250 }
/// }"#;
///
/// let config: EqnumConfig = serde_json::from_str(json).unwrap();
/// assert_eq!(config.prefix, "Eq. ");
/// assert_eq!(config.sync.debounce_ms, 250);
/// assert!(!config.sync.strict_duplicates);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct EqnumConfig {
    /// Text shown before a reference's ordinal.
    /// Maximum length: 100 characters (truncated with warning if exceeded)
    #[serde(default = "default_prefix", deserialize_with = "deserialize_prefix")]
    pub prefix: String,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub inlay_hints: InlayHintsConfig,
    #[serde(default)]
    pub decorations: DecorationsConfig,
    /// JSON file the prefix is loaded from at startup and saved to at shutdown.
    #[serde(default)]
    pub settings_file: Option<PathBuf>,
}

impl Default for EqnumConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            sync: SyncConfig::default(),
            inlay_hints: InlayHintsConfig::default(),
            decorations: DecorationsConfig::default(),
            settings_file: None,
        }
    }
}

/// Configuration for tag synchronization.
///
/// # Defaults
///
/// - `debounce_ms`: `500`
/// - `strict_duplicates`: `false`
/// - `duplicate_severity`: `WARNING`
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Quiescence window after which a burst of edits is synchronized again.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Report labels whose key was already declared.
    #[serde(default)]
    pub strict_duplicates: bool,
    #[serde(default = "default_duplicate_severity")]
    pub duplicate_severity: DiagnosticSeverity,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            strict_duplicates: false,
            duplicate_severity: default_duplicate_severity(),
        }
    }
}

/// Configuration for inlay hints after `\ref{..}`.
#[derive(Debug, Clone, Deserialize)]
pub struct InlayHintsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for InlayHintsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Configuration for the `eqnum/publishDecorations` notification.
#[derive(Debug, Clone, Deserialize)]
pub struct DecorationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for DecorationsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

// Default value functions
const fn default_true() -> bool {
    true
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

const fn default_debounce_ms() -> u64 {
    500
}

const fn default_duplicate_severity() -> DiagnosticSeverity {
    DiagnosticSeverity::WARNING
}

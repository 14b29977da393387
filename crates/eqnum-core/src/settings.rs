//! Persisted settings.
//!
//! There is one user setting: the text shown in front of a reference's
//! ordinal. Loading never fails from the caller's point of view;
//! [`load_or_default`] logs the problem and returns the defaults.

use crate::error::{EqnumError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::RwLock;

pub const DEFAULT_PREFIX: &str = "Equation ";

/// Maximum length for the reference prefix
const MAX_PREFIX_LENGTH: usize = 100;

/// User settings.
///
/// # Examples
///
/// ```
/// use eqnum_core::settings::Settings;
///
/// let settings: Settings = serde_json::from_str(r#"{"prefix": "Eq. "}"#).unwrap();
/// assert_eq!(settings.prefix, "Eq. ");
///
/// let defaults: Settings = serde_json::from_str("{}").unwrap();
/// assert_eq!(defaults.prefix, "Equation ");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_prefix", deserialize_with = "deserialize_prefix")]
    pub prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

/// Truncates overly long prefixes with a warning.
pub fn validate_prefix(prefix: String) -> String {
    if prefix.chars().count() > MAX_PREFIX_LENGTH {
        tracing::warn!(
            "prefix exceeded max length of {} chars, truncating",
            MAX_PREFIX_LENGTH
        );
        prefix.chars().take(MAX_PREFIX_LENGTH).collect()
    } else {
        prefix
    }
}

/// Custom deserializer for prefix that validates length
pub fn deserialize_prefix<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let prefix = String::deserialize(deserializer)?;
    Ok(validate_prefix(prefix))
}

/// Where settings live between sessions.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self) -> Result<Settings>;
    async fn save(&self, settings: &Settings) -> Result<()>;
}

/// Loads settings, falling back to `fallback` on any failure.
pub async fn load_or(store: &dyn SettingsStore, fallback: Settings) -> Settings {
    match store.load().await {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("failed to load settings, using fallback: {}", e);
            fallback
        }
    }
}

pub async fn load_or_default(store: &dyn SettingsStore) -> Settings {
    load_or(store, Settings::default()).await
}

/// Settings stored as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileSettingsStore {
    path: PathBuf,
}

impl JsonFileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SettingsStore for JsonFileSettingsStore {
    async fn load(&self) -> Result<Settings> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| EqnumError::Settings {
                path: self.path.clone(),
                source: Box::new(e),
            })?;
        serde_json::from_slice(&bytes).map_err(|e| EqnumError::Settings {
            path: self.path.clone(),
            source: Box::new(e),
        })
    }

    async fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(settings)?;
        tokio::fs::write(&self.path, json).await?;
        tracing::debug!("saved settings to {}", self.path.display());
        Ok(())
    }
}

/// Settings held in memory. Starts empty, so the first load fails.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    stored: RwLock<Option<Settings>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            stored: RwLock::new(Some(settings)),
        }
    }

    pub async fn stored(&self) -> Option<Settings> {
        self.stored.read().await.clone()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> Result<Settings> {
        self.stored
            .read()
            .await
            .clone()
            .ok_or_else(|| EqnumError::Settings {
                path: PathBuf::from("<memory>"),
                source: "no settings stored".into(),
            })
    }

    async fn save(&self, settings: &Settings) -> Result<()> {
        *self.stored.write().await = Some(settings.clone());
        Ok(())
    }
}

//! TOML-based configuration for relcat.
//!
//! Supports a config file (relcat.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! target_path = "target"
//! log_level = "info"
//! compile = false
//!
//! [adapter]
//! kind = "sqlite"
//! path = "${WAREHOUSE_DB}"
//! database = "warehouse"
//!
//! [manifest]
//! path = "target/manifest.json"
//!
//! [docs]
//! index_path = "docs/index.html"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Directory the catalog and manifest are written to.
    pub target_path: String,

    /// Default log filter when `RELCAT_LOG` is unset.
    pub log_level: String,

    /// Whether a compile phase runs before generation.
    pub compile: bool,

    pub adapter: AdapterSettings,

    pub manifest: ManifestSettings,

    pub docs: DocsSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_path: "target".to_string(),
            log_level: "info".to_string(),
            compile: false,
            adapter: AdapterSettings::default(),
            manifest: ManifestSettings::default(),
            docs: DocsSettings::default(),
        }
    }
}

/// Kind of catalog adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterKind {
    /// Introspect a SQLite database file.
    Sqlite,
    /// Replay rows captured as JSON.
    Json,
}

/// Adapter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdapterSettings {
    pub kind: AdapterKind,

    /// Database file or rows file (supports ${ENV_VAR} expansion).
    pub path: Option<String>,

    /// Database name reported for SQLite relations.
    pub database: String,
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self {
            kind: AdapterKind::Sqlite,
            path: None,
            database: "main".to_string(),
        }
    }
}

impl AdapterSettings {
    /// Get the adapter path with environment variables expanded.
    pub fn resolved_path(&self) -> Result<PathBuf, SettingsError> {
        let path = self
            .path
            .as_deref()
            .ok_or_else(|| SettingsError::InvalidConfig("adapter.path is not set".to_string()))?;
        Ok(PathBuf::from(expand_env_vars(path)?))
    }
}

/// Manifest location.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ManifestSettings {
    pub path: Option<String>,
}

/// Documentation site settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DocsSettings {
    /// Static docs index copied to `<target>/index.html`.
    pub index_path: Option<String>,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `RELCAT_CONFIG`
    /// 2. `./relcat.toml`
    /// 3. `~/.config/relcat/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("RELCAT_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("relcat.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("relcat").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Target directory with environment variables expanded.
    pub fn target_dir(&self) -> Result<PathBuf, SettingsError> {
        Ok(PathBuf::from(expand_env_vars(&self.target_path)?))
    }

    /// Manifest path, if configured.
    pub fn manifest_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        expand_optional(self.manifest.path.as_deref())
    }

    /// Docs index path, if configured.
    pub fn docs_index_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        expand_optional(self.docs.index_path.as_deref())
    }
}

fn expand_optional(path: Option<&str>) -> Result<Option<PathBuf>, SettingsError> {
    path.map(|p| expand_env_vars(p).map(PathBuf::from))
        .transpose()
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax. A lone `$` is kept as is.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut var_name = String::new();
        if chars.next_if_eq(&'{').is_some() {
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                var_name.push(ch);
            }
            if !closed {
                return Err(SettingsError::InvalidConfig(format!(
                    "unterminated variable reference in '{}'",
                    s
                )));
            }
        } else {
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                var_name.push(ch);
            }
            if var_name.is_empty() {
                result.push('$');
                continue;
            }
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}

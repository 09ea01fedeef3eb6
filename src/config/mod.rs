//! Configuration module for relcat.
//!
//! Handles the config file, environment variable expansion, and adapter
//! selection.

mod settings;

pub use settings::{
    expand_env_vars, AdapterKind, AdapterSettings, DocsSettings, ManifestSettings, Settings,
    SettingsError,
};

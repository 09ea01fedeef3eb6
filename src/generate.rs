//! End-to-end catalog generation.
//!
//! ```text
//! compile gate → adapter rows → decimals → Catalog → resolve(manifest) → catalog.json
//! ```
//!
//! # Example
//!
//! ```ignore
//! use relcat::adapter::SqliteAdapter;
//! use relcat::config::Settings;
//! use relcat::generate::GenerateTask;
//! use relcat::manifest::Manifest;
//!
//! let settings = Settings::load()?;
//! let adapter = SqliteAdapter::open("warehouse.db", "warehouse")?;
//! let manifest = Manifest::from_file("target/manifest.json")?;
//!
//! let results = GenerateTask::new(settings).run(&adapter, &manifest, None)?;
//! println!("{} nodes", results.nodes.len());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::adapter::{AdapterError, CatalogAdapter};
use crate::catalog::{resolve, Catalog, CatalogError, CatalogTable, ResolvedCatalog, Row};
use crate::config::{Settings, SettingsError};
use crate::manifest::{Manifest, ManifestError, MANIFEST_FILENAME};

/// File name of the generated catalog artifact.
pub const CATALOG_FILENAME: &str = "catalog.json";

/// File name the docs index is copied to.
pub const INDEX_FILENAME: &str = "index.html";

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during generation.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),

    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize catalog: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("compile is enabled but no compile results were supplied")]
    MissingCompileResults,
}

pub type GenerateResult<T> = Result<T, GenerateError>;

// ============================================================================
// Result Types
// ============================================================================

/// Outcome of compiling one project node, as reported by the compile phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeResult {
    pub unique_id: String,
    #[serde(default)]
    pub error: Option<String>,
}

impl NodeResult {
    pub fn ok(unique_id: impl Into<String>) -> Self {
        Self {
            unique_id: unique_id.into(),
            error: None,
        }
    }

    pub fn failed(unique_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            unique_id: unique_id.into(),
            error: Some(error.into()),
        }
    }
}

/// The generated catalog.
///
/// Only `nodes` and `generated_at` are persisted; compile results and
/// unmatched tables are kept for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogResults {
    pub nodes: BTreeMap<String, CatalogTable>,
    pub generated_at: DateTime<Utc>,
    #[serde(skip)]
    pub compile_results: Option<Vec<NodeResult>>,
    #[serde(skip)]
    pub unmatched: Vec<CatalogTable>,
}

impl CatalogResults {
    pub fn new(resolved: ResolvedCatalog, generated_at: DateTime<Utc>) -> Self {
        let (nodes, unmatched) = resolved.into_parts();
        Self {
            nodes,
            generated_at,
            compile_results: None,
            unmatched,
        }
    }

    /// Empty results, used when generation is skipped.
    pub fn empty(generated_at: DateTime<Utc>) -> Self {
        Self::new(ResolvedCatalog::default(), generated_at)
    }

    pub fn with_compile_results(mut self, compile_results: Option<Vec<NodeResult>>) -> Self {
        self.compile_results = compile_results;
        self
    }

    /// Write the catalog as pretty JSON.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> GenerateResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| GenerateError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Whether a run should be reported as successful.
///
/// A run without a compile phase always succeeds; otherwise every compiled
/// node must be error-free.
pub fn interpret_results(results: &CatalogResults) -> bool {
    match &results.compile_results {
        None => true,
        Some(compiled) => compiled.iter().all(|r| r.error.is_none()),
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Build a catalog from rows and resolve it against the manifest.
///
/// This is the pure core of generation: no I/O, no clock.
pub fn build_and_resolve<I>(rows: I, manifest: &Manifest) -> GenerateResult<ResolvedCatalog>
where
    I: IntoIterator<Item = Row>,
{
    let catalog = Catalog::build(rows)?;
    Ok(resolve(&catalog, manifest)?)
}

/// Runs catalog generation with a fixed set of settings.
pub struct GenerateTask {
    settings: Settings,
}

impl GenerateTask {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Generate, persist and return the catalog.
    ///
    /// With `compile` enabled the compile results are required, and a single
    /// failure means nothing is written and empty results are returned. With
    /// `compile` disabled any supplied results are ignored.
    pub fn run(
        &self,
        adapter: &dyn CatalogAdapter,
        manifest: &Manifest,
        compile_results: Option<Vec<NodeResult>>,
    ) -> GenerateResult<CatalogResults> {
        let compile_results = if self.settings.compile {
            let compiled = compile_results.ok_or(GenerateError::MissingCompileResults)?;
            if compiled.iter().any(|r| r.error.is_some()) {
                warn!("compile failed, cannot generate docs");
                return Ok(CatalogResults::empty(Utc::now()).with_compile_results(Some(compiled)));
            }
            Some(compiled)
        } else {
            if compile_results.is_some() {
                debug!("compile disabled, ignoring compile results");
            }
            None
        };

        let target = self.settings.target_dir()?;
        fs::create_dir_all(&target).map_err(|source| GenerateError::Write {
            path: target.clone(),
            source,
        })?;

        if let Some(index) = self.settings.docs_index_path()? {
            let dest = target.join(INDEX_FILENAME);
            fs::copy(&index, &dest).map_err(|source| GenerateError::Write { path: dest, source })?;
        }

        info!(adapter = adapter.name(), "Building catalog");
        let rows = adapter.get_catalog(manifest)?.into_rows()?;
        let row_count = rows.len();
        let resolved = build_and_resolve(rows, manifest)?;
        info!(
            rows = row_count,
            nodes = resolved.nodes().len(),
            unmatched = resolved.unmatched().len(),
            "Catalog resolved"
        );

        let results =
            CatalogResults::new(resolved, Utc::now()).with_compile_results(compile_results);

        let path = target.join(CATALOG_FILENAME);
        results.write(&path)?;
        manifest.write(target.join(MANIFEST_FILENAME))?;

        let shown = fs::canonicalize(&path).unwrap_or(path);
        info!("Catalog written to {}", shown.display());
        Ok(results)
    }
}

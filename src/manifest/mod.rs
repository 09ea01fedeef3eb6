//! Project manifest: logical nodes bound to physical relations.
//!
//! The manifest is produced by the project compiler and read here as a
//! snapshot. Two JSON layouts are accepted:
//!
//! ```json
//! { "nodes": [ { "unique_id": "model.shop.orders", "resource_type": "model",
//!                "database": "analytics", "schema": "public", "identifier": "orders" } ] }
//! ```
//!
//! and the keyed layout written by the compiler, where `nodes` and `sources`
//! are objects keyed by unique id and the relation name comes from
//! `identifier`, then `alias`, then `name`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::catalog::CatalogKey;

/// File name the manifest is written under in the target directory.
pub const MANIFEST_FILENAME: &str = "manifest.json";

/// Errors that can occur while loading or writing a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Failed to read manifest {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write manifest: {0}")]
    Write(#[from] std::io::Error),

    #[error("Failed to parse manifest: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type ManifestResult<T> = Result<T, ManifestError>;

/// Kind of project node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Model,
    Seed,
    Snapshot,
    Source,
    Analysis,
    Test,
    #[serde(other)]
    Other,
}

impl ResourceType {
    /// Guess the resource type from a `<type>.<project>.<name>` unique id.
    pub fn from_unique_id(unique_id: &str) -> Self {
        match unique_id.split('.').next().unwrap_or_default() {
            "model" => Self::Model,
            "seed" => Self::Seed,
            "snapshot" => Self::Snapshot,
            "source" => Self::Source,
            "analysis" => Self::Analysis,
            "test" => Self::Test,
            _ => Self::Other,
        }
    }
}

/// A logical node and the relation it is materialized as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestNode {
    pub unique_id: String,
    pub resource_type: ResourceType,
    pub database: String,
    pub schema: String,
    pub identifier: String,
}

impl ManifestNode {
    pub fn new(
        unique_id: impl Into<String>,
        resource_type: ResourceType,
        database: impl Into<String>,
        schema: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Self {
        Self {
            unique_id: unique_id.into(),
            resource_type,
            database: database.into(),
            schema: schema.into(),
            identifier: identifier.into(),
        }
    }

    pub fn model(
        unique_id: impl Into<String>,
        database: impl Into<String>,
        schema: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Self {
        Self::new(unique_id, ResourceType::Model, database, schema, identifier)
    }

    pub fn source(
        unique_id: impl Into<String>,
        database: impl Into<String>,
        schema: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Self {
        Self::new(unique_id, ResourceType::Source, database, schema, identifier)
    }

    /// Lower-cased key of the relation this node points at.
    pub fn relation_key(&self) -> CatalogKey {
        CatalogKey::new(&self.database, &self.schema, &self.identifier).normalized()
    }
}

/// A snapshot of the project's nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Manifest {
    nodes: Vec<ManifestNode>,
}

impl Manifest {
    pub fn from_nodes(nodes: Vec<ManifestNode>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[ManifestNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Distinct lower-cased `(database, schema)` pairs referenced by nodes.
    pub fn schemas(&self) -> Vec<(String, String)> {
        let mut schemas: Vec<_> = self
            .nodes
            .iter()
            .map(|n| (n.database.to_lowercase(), n.schema.to_lowercase()))
            .collect();
        schemas.sort();
        schemas.dedup();
        schemas
    }

    /// Parse a manifest from JSON text.
    ///
    /// A `nodes` array selects the listed layout, anything else the keyed
    /// one; parse errors name the field of the selected layout.
    pub fn from_json_str(json: &str) -> ManifestResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        if value.get("nodes").is_some_and(Value::is_array) {
            let listed: ListedManifest = serde_json::from_value(value)?;
            Ok(listed.into())
        } else {
            let keyed: KeyedManifest = serde_json::from_value(value)?;
            Ok(keyed.into())
        }
    }

    /// Load a manifest from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ManifestResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Write the manifest as pretty JSON in the listed layout.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> ManifestResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct ListedManifest {
    nodes: Vec<ListedNode>,
}

#[derive(Deserialize)]
struct KeyedManifest {
    #[serde(default)]
    nodes: BTreeMap<String, KeyedNode>,
    #[serde(default)]
    sources: BTreeMap<String, KeyedNode>,
}

#[derive(Deserialize)]
struct ListedNode {
    unique_id: String,
    resource_type: Option<ResourceType>,
    database: String,
    schema: String,
    identifier: String,
}

#[derive(Deserialize)]
struct KeyedNode {
    resource_type: Option<ResourceType>,
    database: String,
    schema: String,
    identifier: Option<String>,
    alias: Option<String>,
    name: String,
}

impl KeyedNode {
    fn into_node(self, unique_id: String) -> ManifestNode {
        let resource_type = self
            .resource_type
            .unwrap_or_else(|| ResourceType::from_unique_id(&unique_id));
        let identifier = self.identifier.or(self.alias).unwrap_or(self.name);
        ManifestNode::new(unique_id, resource_type, self.database, self.schema, identifier)
    }
}

impl From<ListedManifest> for Manifest {
    fn from(file: ListedManifest) -> Self {
        let nodes = file
            .nodes
            .into_iter()
            .map(|n| {
                let resource_type = n
                    .resource_type
                    .unwrap_or_else(|| ResourceType::from_unique_id(&n.unique_id));
                ManifestNode::new(n.unique_id, resource_type, n.database, n.schema, n.identifier)
            })
            .collect();
        Manifest { nodes }
    }
}

impl From<KeyedManifest> for Manifest {
    fn from(file: KeyedManifest) -> Self {
        let nodes = file
            .nodes
            .into_iter()
            .chain(file.sources)
            .map(|(unique_id, node)| node.into_node(unique_id))
            .collect();
        Manifest { nodes }
    }
}

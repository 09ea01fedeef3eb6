//! Matching catalog tables to manifest nodes.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use super::error::{CatalogError, CatalogResult};
use super::types::{CatalogKey, CatalogTable};
use super::Catalog;
use crate::manifest::Manifest;

/// Map each lower-cased relation key to the unique ids that point at it.
///
/// One relation may carry several ids, for example when a source and a model
/// both resolve to the same table. Ids are listed once per key in manifest
/// order.
pub fn unique_id_mapping(manifest: &Manifest) -> HashMap<CatalogKey, Vec<String>> {
    let mut mapping: HashMap<CatalogKey, Vec<String>> = HashMap::new();
    for node in manifest.nodes() {
        let ids = mapping.entry(node.relation_key()).or_default();
        if !ids.contains(&node.unique_id) {
            ids.push(node.unique_id.clone());
        }
    }
    mapping
}

/// A catalog after matching against a manifest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedCatalog {
    nodes: BTreeMap<String, CatalogTable>,
    unmatched: Vec<CatalogTable>,
}

impl ResolvedCatalog {
    /// Tables keyed by unique id, each annotated with that id.
    pub fn nodes(&self) -> &BTreeMap<String, CatalogTable> {
        &self.nodes
    }

    /// Tables no manifest node points at.
    pub fn unmatched(&self) -> &[CatalogTable] {
        &self.unmatched
    }

    pub fn into_parts(self) -> (BTreeMap<String, CatalogTable>, Vec<CatalogTable>) {
        (self.nodes, self.unmatched)
    }
}

/// Attach unique ids from `manifest` to the tables of `catalog`.
///
/// Fails with [`CatalogError::AmbiguousMatch`] when one unique id would be
/// claimed by two different tables.
pub fn resolve(catalog: &Catalog, manifest: &Manifest) -> CatalogResult<ResolvedCatalog> {
    let mapping = unique_id_mapping(manifest);
    let mut resolved = ResolvedCatalog::default();

    for table in catalog.tables() {
        let Some(unique_ids) = mapping.get(&table.key()) else {
            debug!(table = %table.key(), "no manifest node for table");
            resolved.unmatched.push(table.clone());
            continue;
        };

        for unique_id in unique_ids {
            match resolved.nodes.entry(unique_id.clone()) {
                Entry::Occupied(existing) => {
                    return Err(CatalogError::AmbiguousMatch {
                        unique_id: unique_id.clone(),
                        existing: Box::new(existing.get().clone()),
                        conflicting: Box::new(table.clone()),
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(table.with_unique_id(unique_id));
                }
            }
        }
    }

    Ok(resolved)
}

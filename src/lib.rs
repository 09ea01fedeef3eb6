//! # relcat
//!
//! Builds a documentation catalog of a warehouse and binds it to project
//! nodes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │           CatalogAdapter (sqlite / json rows)            │
//! │      one row per column: table_*, column_*, stats:*      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [Catalog::build]
//! ┌─────────────────────────────────────────────────────────┐
//! │             Catalog (physical key → table)               │
//! │          metadata + stats + columns per table            │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [resolve, with Manifest]
//! ┌─────────────────────────────────────────────────────────┐
//! │        ResolvedCatalog (unique id → table)               │
//! │        + unmatched tables                                │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [GenerateTask]
//! ┌─────────────────────────────────────────────────────────┐
//! │                    catalog.json                          │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod adapter;
pub mod catalog;
pub mod config;
pub mod generate;
pub mod manifest;

pub use catalog::{resolve, Catalog, CatalogError, CatalogKey, CatalogTable, Primitive, Row};
pub use generate::{CatalogResults, GenerateTask};
pub use manifest::{Manifest, ManifestNode};

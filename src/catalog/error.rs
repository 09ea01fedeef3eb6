//! Catalog build and resolution errors.

use super::types::{CatalogTable, Row};

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that abort building or resolving a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// A row lacks one of `table_database`, `table_schema`, `table_name`.
    #[error("Catalog information missing required key {field} (got {row:?})")]
    MissingIdentityField { field: &'static str, row: Box<Row> },

    /// A row's `column_*` fields cannot form a column.
    #[error("Invalid column in table {table}: {reason}")]
    InvalidColumn { table: String, reason: String },

    /// Two physical tables claim the same logical identifier.
    #[error(
        "Unique id {unique_id} matched more than one catalog table: {} and {}",
        .existing.key(),
        .conflicting.key()
    )]
    AmbiguousMatch {
        unique_id: String,
        existing: Box<CatalogTable>,
        conflicting: Box<CatalogTable>,
    },
}

impl CatalogError {
    pub(crate) fn invalid_column(table: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidColumn {
            table: table.to_string(),
            reason: reason.into(),
        }
    }

    /// Both conflicting tables of an ambiguous match, as JSON, for diagnostics.
    pub fn ambiguous_tables_json(&self) -> Option<(serde_json::Value, serde_json::Value)> {
        match self {
            Self::AmbiguousMatch {
                existing,
                conflicting,
                ..
            } => Some((
                serde_json::to_value(existing.as_ref()).ok()?,
                serde_json::to_value(conflicting.as_ref()).ok()?,
            )),
            _ => None,
        }
    }
}

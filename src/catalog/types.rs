//! Catalog data types.
//!
//! These are the shapes persisted to `catalog.json`. Field names are part of
//! the artifact format and are renamed where Rust keywords get in the way
//! (`type` becomes `table_type` / `column_type`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A scalar value as it appears in an introspection row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Primitive {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl Primitive {
    pub fn is_null(&self) -> bool {
        matches!(self, Primitive::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Primitive::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Primitive::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Stringify a non-null value. Returns `None` for `Null`.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Primitive::Null => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Null => write!(f, "null"),
            Primitive::Bool(b) => write!(f, "{}", b),
            Primitive::Integer(i) => write!(f, "{}", i),
            Primitive::Float(v) => write!(f, "{}", v),
            Primitive::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Primitive {
    fn from(s: &str) -> Self {
        Primitive::String(s.to_string())
    }
}

impl From<String> for Primitive {
    fn from(s: String) -> Self {
        Primitive::String(s)
    }
}

impl From<bool> for Primitive {
    fn from(b: bool) -> Self {
        Primitive::Bool(b)
    }
}

impl From<i64> for Primitive {
    fn from(i: i64) -> Self {
        Primitive::Integer(i)
    }
}

impl From<f64> for Primitive {
    fn from(v: f64) -> Self {
        Primitive::Float(v)
    }
}

/// One flat introspection row: column name to value.
pub type Row = BTreeMap<String, Primitive>;

/// Statistics for a table, keyed by stat id.
pub type StatsDict = BTreeMap<String, StatItem>;

/// Columns of a table, keyed by column name.
pub type ColumnMap = BTreeMap<String, ColumnMetadata>;

/// Identity of a physical relation.
///
/// Constructed from the stringified `table_database`, `table_schema` and
/// `table_name` of a row. [`CatalogKey::normalized`] gives the lower-cased
/// form used for grouping and manifest matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CatalogKey {
    pub database: String,
    pub schema: String,
    pub name: String,
}

impl CatalogKey {
    pub fn new(
        database: impl Into<String>,
        schema: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            database: database.into(),
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Lower-cased copy of this key.
    pub fn normalized(&self) -> Self {
        Self {
            database: self.database.to_lowercase(),
            schema: self.schema.to_lowercase(),
            name: self.name.to_lowercase(),
        }
    }
}

impl fmt::Display for CatalogKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.database, self.schema, self.name)
    }
}

/// Table-level metadata taken from the `table_*` fields of a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    #[serde(rename = "type")]
    pub table_type: Option<String>,
    pub database: String,
    pub schema: String,
    pub name: String,
    pub comment: Option<String>,
    pub owner: Option<String>,
    /// Any other `table_*` fields the adapter reported (row counts, sizes, ...).
    #[serde(flatten)]
    pub extra: BTreeMap<String, Primitive>,
}

impl TableMetadata {
    /// Build metadata from prefix-stripped table fields.
    ///
    /// `database`, `schema` and `name` come from the catalog key so they are
    /// always present even if the stripped fields are odd.
    pub fn from_fields(key: &CatalogKey, mut fields: Row) -> Self {
        for known in ["database", "schema", "name"] {
            fields.remove(known);
        }
        let table_type = take_text(&mut fields, "type");
        let comment = take_text(&mut fields, "comment");
        let owner = take_text(&mut fields, "owner");

        Self {
            table_type,
            database: key.database.clone(),
            schema: key.schema.clone(),
            name: key.name.clone(),
            comment,
            owner,
            extra: fields,
        }
    }
}

fn take_text(fields: &mut Row, key: &str) -> Option<String> {
    fields.remove(key).and_then(|v| v.to_text())
}

/// A column of a catalog table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    #[serde(rename = "type")]
    pub column_type: String,
    /// 0-based position within the table.
    pub index: u64,
    pub name: String,
    pub comment: Option<String>,
}

/// A single named statistic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatItem {
    pub id: String,
    pub label: String,
    pub value: Primitive,
    pub description: String,
    /// Whether the stat is surfaced to readers of the catalog.
    pub include: bool,
}

/// A physical table in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogTable {
    pub metadata: TableMetadata,
    pub columns: ColumnMap,
    pub stats: StatsDict,
    /// Logical identifier, set once the table is matched to a manifest node.
    #[serde(default)]
    pub unique_id: Option<String>,
}

impl CatalogTable {
    /// The table's physical key, lower-cased for matching.
    pub fn key(&self) -> CatalogKey {
        CatalogKey::new(
            &self.metadata.database,
            &self.metadata.schema,
            &self.metadata.name,
        )
        .normalized()
    }

    /// Copy of this table annotated with a logical identifier.
    pub fn with_unique_id(&self, unique_id: impl Into<String>) -> Self {
        Self {
            unique_id: Some(unique_id.into()),
            ..self.clone()
        }
    }
}

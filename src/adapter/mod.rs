//! Catalog adapters: sources of raw introspection rows.
//!
//! An adapter queries a database (or reads a captured result) and returns a
//! [`RowTable`]: column names plus one row of values per table column, using
//! the `table_*`, `column_*` and `stats:<id>:<field>` key families that
//! [`crate::catalog::Catalog`] consumes.
//!
//! ```text
//! ┌──────────────────┐   RowTable    ┌────────────┐   Vec<Row>   ┌─────────┐
//! │  CatalogAdapter  │ ────────────▶ │ into_rows  │ ───────────▶ │ Catalog │
//! │ (sqlite / json)  │   RawValue    │ (decimals  │  Primitive   │         │
//! └──────────────────┘               │ → floats)  │              └─────────┘
//!                                    └────────────┘
//! ```

mod json;
mod sqlite;

pub use json::JsonRowsAdapter;
pub use sqlite::SqliteAdapter;

use tracing::warn;

use crate::catalog::{Primitive, Row};
use crate::config::{AdapterKind, AdapterSettings, SettingsError};
use crate::manifest::Manifest;

/// Errors raised by adapters.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to read rows: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse rows: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported value in column {column}: {value}")]
    UnsupportedValue { column: String, value: String },

    #[error("Row {row} has {found} values but the table has {expected} columns")]
    RowShape {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Adapter configuration error: {0}")]
    Config(#[from] SettingsError),
}

pub type AdapterResult<T> = Result<T, AdapterError>;

/// A value as returned by a database driver.
///
/// Fixed-point numbers keep their exact text until [`RawValue::into_primitive`]
/// turns them into floats.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Decimal(String),
}

impl RawValue {
    /// Convert to a catalog primitive, normalizing decimals to floats.
    pub fn into_primitive(self) -> Primitive {
        match self {
            RawValue::Null => Primitive::Null,
            RawValue::Bool(b) => Primitive::Bool(b),
            RawValue::Integer(i) => Primitive::Integer(i),
            RawValue::Float(f) => Primitive::Float(f),
            RawValue::Text(s) => Primitive::String(s),
            RawValue::Decimal(text) => coerce_decimal(text),
        }
    }
}

fn coerce_decimal(text: String) -> Primitive {
    match text.trim().parse::<f64>() {
        Ok(value) => Primitive::Float(value),
        Err(_) => {
            warn!(value = %text, "decimal value is not numeric, keeping it as text");
            Primitive::String(text)
        }
    }
}

impl From<Primitive> for RawValue {
    fn from(p: Primitive) -> Self {
        match p {
            Primitive::Null => RawValue::Null,
            Primitive::Bool(b) => RawValue::Bool(b),
            Primitive::Integer(i) => RawValue::Integer(i),
            Primitive::Float(f) => RawValue::Float(f),
            Primitive::String(s) => RawValue::Text(s),
        }
    }
}

/// Tabular result of a catalog query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowTable {
    pub column_names: Vec<String>,
    pub rows: Vec<Vec<RawValue>>,
}

impl RowTable {
    pub fn new(column_names: Vec<String>) -> Self {
        Self {
            column_names,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<RawValue>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Zip each row with the column names, coercing decimals to floats.
    pub fn into_rows(self) -> AdapterResult<Vec<Row>> {
        let expected = self.column_names.len();
        self.rows
            .into_iter()
            .enumerate()
            .map(|(idx, values)| {
                if values.len() != expected {
                    return Err(AdapterError::RowShape {
                        row: idx,
                        expected,
                        found: values.len(),
                    });
                }
                Ok(self
                    .column_names
                    .iter()
                    .cloned()
                    .zip(values.into_iter().map(RawValue::into_primitive))
                    .collect())
            })
            .collect()
    }
}

/// A source of catalog rows.
///
/// The manifest is passed so adapters can limit introspection to the schemas
/// the project actually uses.
pub trait CatalogAdapter {
    /// Short adapter name for logs.
    fn name(&self) -> &str;

    /// Fetch one row per column of every relation the adapter can see.
    fn get_catalog(&self, manifest: &Manifest) -> AdapterResult<RowTable>;
}

/// Build the adapter described by the settings.
pub fn from_settings(settings: &AdapterSettings) -> AdapterResult<Box<dyn CatalogAdapter>> {
    let path = settings.resolved_path()?;
    match settings.kind {
        AdapterKind::Sqlite => Ok(Box::new(SqliteAdapter::open(
            &path,
            settings.database.clone(),
        )?)),
        AdapterKind::Json => Ok(Box::new(JsonRowsAdapter::new(path))),
    }
}

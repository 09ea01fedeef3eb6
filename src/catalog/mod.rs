//! Catalog construction from introspection rows.
//!
//! Adapters report one row per column. Each row carries three families of
//! keys:
//!
//! ```text
//! table_database, table_schema, table_name, table_type, ...   table fields
//! column_name, column_index, column_type, column_comment      column fields
//! stats:<id>:label, stats:<id>:value, ...                     table stats
//! ```
//!
//! [`Catalog`] groups rows by their lower-cased physical key. Table fields and
//! stats are captured from the first row seen for a key; every row adds (or
//! overwrites) one column.
//!
//! # Example
//!
//! ```ignore
//! use relcat::catalog::{resolve, Catalog};
//!
//! let catalog = Catalog::build(rows)?;
//! let resolved = resolve(&catalog, &manifest)?;
//! for (unique_id, table) in resolved.nodes() {
//!     println!("{} -> {}", unique_id, table.key());
//! }
//! ```

mod error;
pub mod prefix;
mod resolve;
pub mod stats;
mod types;

pub use error::{CatalogError, CatalogResult};
pub use prefix::stripped_prefix;
pub use resolve::{resolve, unique_id_mapping, ResolvedCatalog};
pub use stats::{parse_stat_item, parse_stats, MalformedStat, HAS_STATS_ID};
pub use types::*;

use std::collections::btree_map::{self, Entry};
use std::collections::BTreeMap;

/// Largest column index that survives a round trip through a JSON double.
const MAX_SAFE_INDEX: f64 = 9_007_199_254_740_992.0;

/// Physical tables keyed by their lower-cased [`CatalogKey`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    tables: BTreeMap<CatalogKey, CatalogTable>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a batch of rows.
    pub fn build<I>(rows: I) -> CatalogResult<Self>
    where
        I: IntoIterator<Item = Row>,
    {
        let mut catalog = Self::new();
        for row in rows {
            catalog.add_row(&row)?;
        }
        Ok(catalog)
    }

    /// Fold one introspection row into the catalog.
    pub fn add_row(&mut self, row: &Row) -> CatalogResult<()> {
        let key = row_key(row)?;
        let table = self.table_for(key, row);
        let column = column_from_fields(&table.metadata, stripped_prefix(row, "column_"))?;
        table.columns.insert(column.name.clone(), column);
        Ok(())
    }

    fn table_for(&mut self, key: CatalogKey, row: &Row) -> &mut CatalogTable {
        match self.tables.entry(key.normalized()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(new_table(&key, row)),
        }
    }

    /// Look up a table by physical key, ignoring case.
    pub fn get(&self, key: &CatalogKey) -> Option<&CatalogTable> {
        self.tables.get(&key.normalized())
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Iterate over `(normalized key, table)` pairs in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, CatalogKey, CatalogTable> {
        self.tables.iter()
    }

    pub fn tables(&self) -> btree_map::Values<'_, CatalogKey, CatalogTable> {
        self.tables.values()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = (&'a CatalogKey, &'a CatalogTable);
    type IntoIter = btree_map::Iter<'a, CatalogKey, CatalogTable>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Read the display-case physical key of a row.
fn row_key(row: &Row) -> CatalogResult<CatalogKey> {
    let field = |name: &'static str| {
        row.get(name)
            .and_then(identity_text)
            .ok_or_else(|| CatalogError::MissingIdentityField {
                field: name,
                row: Box::new(row.clone()),
            })
    };

    Ok(CatalogKey::new(
        field("table_database")?,
        field("table_schema")?,
        field("table_name")?,
    ))
}

/// Text of an identity value. Integral floats keep a trailing `.0`, so `1.0`
/// and `1` name different relations, as the warehouse reports them.
fn identity_text(value: &Primitive) -> Option<String> {
    match value {
        Primitive::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(format!("{:.1}", f)),
        other => other.to_text(),
    }
}

fn new_table(key: &CatalogKey, row: &Row) -> CatalogTable {
    CatalogTable {
        metadata: TableMetadata::from_fields(key, stripped_prefix(row, "table_")),
        columns: ColumnMap::new(),
        stats: parse_stats(&stripped_prefix(row, "stats:")),
        unique_id: None,
    }
}

fn column_from_fields(table: &TableMetadata, mut fields: Row) -> CatalogResult<ColumnMetadata> {
    let table_name = || format!("{}.{}.{}", table.database, table.schema, table.name);

    let name = fields
        .remove("name")
        .and_then(|v| v.to_text())
        .ok_or_else(|| CatalogError::invalid_column(table_name(), "missing column_name"))?;
    let column_type = fields
        .remove("type")
        .and_then(|v| v.to_text())
        .ok_or_else(|| {
            CatalogError::invalid_column(table_name(), format!("column {} has no column_type", name))
        })?;
    let index = column_index(fields.get("index"))
        .map_err(|reason| CatalogError::invalid_column(table_name(), format!("column {}: {}", name, reason)))?;
    let comment = fields.remove("comment").and_then(|v| v.to_text());

    Ok(ColumnMetadata {
        column_type,
        index,
        name,
        comment,
    })
}

/// Coerce a reported column index to an integer.
///
/// Indexes may arrive as floats; they are truncated. Values must stay within
/// the range a JSON double represents exactly.
fn column_index(value: Option<&Primitive>) -> Result<u64, String> {
    let as_float = match value {
        None | Some(Primitive::Null) => return Err("missing column_index".to_string()),
        Some(Primitive::Integer(i)) => *i as f64,
        Some(Primitive::Float(f)) => *f,
        Some(Primitive::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("column_index {:?} is not an integer", s))?
            as f64,
        Some(other @ Primitive::Bool(_)) => {
            return Err(format!("column_index {} is not numeric", other))
        }
    };

    if !as_float.is_finite() || as_float < 0.0 || as_float > MAX_SAFE_INDEX {
        return Err(format!("column_index {} is out of range", as_float));
    }
    Ok(as_float.trunc() as u64)
}

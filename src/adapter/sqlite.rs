//! SQLite catalog adapter.
//!
//! Introspects every attached schema (`main` plus any `ATTACH`ed database)
//! through `sqlite_master` and `pragma_table_info`, and reports a row count
//! stat for base tables.

use std::path::Path;

use rusqlite::{params, Connection, OpenFlags};
use tracing::debug;

use super::{AdapterResult, CatalogAdapter, RawValue, RowTable};
use crate::manifest::Manifest;

const COLUMN_NAMES: [&str; 14] = [
    "table_database",
    "table_schema",
    "table_name",
    "table_type",
    "table_comment",
    "table_owner",
    "column_name",
    "column_index",
    "column_type",
    "column_comment",
    "stats:row_count:label",
    "stats:row_count:value",
    "stats:row_count:description",
    "stats:row_count:include",
];

/// Catalog adapter backed by a SQLite database file.
pub struct SqliteAdapter {
    conn: Connection,
    /// Name reported as `table_database`; SQLite itself has no database name.
    database: String,
}

struct Relation {
    name: String,
    kind: String,
}

struct Column {
    index: i64,
    name: String,
    data_type: String,
}

impl SqliteAdapter {
    /// Open a database file read-only.
    pub fn open<P: AsRef<Path>>(path: P, database: impl Into<String>) -> AdapterResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self::from_connection(conn, database))
    }

    /// Wrap an existing connection (used for in-memory databases in tests).
    pub fn from_connection(conn: Connection, database: impl Into<String>) -> Self {
        Self {
            conn,
            database: database.into(),
        }
    }

    fn schemas(&self) -> AdapterResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM pragma_database_list WHERE name <> 'temp' ORDER BY seq")?;
        let schemas = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(schemas)
    }

    fn relations(&self, schema: &str) -> AdapterResult<Vec<Relation>> {
        let sql = format!(
            "SELECT name, type FROM {}.sqlite_master
             WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite_%'
             ORDER BY name",
            quote_ident(schema)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let relations = stmt
            .query_map([], |row| {
                Ok(Relation {
                    name: row.get(0)?,
                    kind: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(relations)
    }

    fn columns(&self, schema: &str, table: &str) -> AdapterResult<Vec<Column>> {
        let mut stmt = self
            .conn
            .prepare("SELECT cid, name, type FROM pragma_table_info(?1, ?2) ORDER BY cid")?;
        let columns = stmt
            .query_map(params![table, schema], |row| {
                Ok(Column {
                    index: row.get(0)?,
                    name: row.get(1)?,
                    data_type: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }

    fn row_count(&self, schema: &str, table: &str) -> AdapterResult<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM {}.{}",
            quote_ident(schema),
            quote_ident(table)
        );
        Ok(self.conn.query_row(&sql, [], |row| row.get(0))?)
    }

    /// Schemas to introspect: all of them, or only those the manifest uses.
    fn wanted_schemas(&self, manifest: &Manifest) -> AdapterResult<Vec<String>> {
        let schemas = self.schemas()?;
        if manifest.is_empty() {
            return Ok(schemas);
        }

        let database = self.database.to_lowercase();
        let used = manifest.schemas();
        Ok(schemas
            .into_iter()
            .filter(|schema| used.contains(&(database.clone(), schema.to_lowercase())))
            .collect())
    }
}

impl CatalogAdapter for SqliteAdapter {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn get_catalog(&self, manifest: &Manifest) -> AdapterResult<RowTable> {
        let mut table = RowTable::new(COLUMN_NAMES.iter().map(|c| c.to_string()).collect());

        for schema in self.wanted_schemas(manifest)? {
            for relation in self.relations(&schema)? {
                let is_table = relation.kind == "table";
                let row_count = if is_table {
                    Some(self.row_count(&schema, &relation.name)?)
                } else {
                    None
                };
                debug!(schema = %schema, relation = %relation.name, "introspecting");

                for column in self.columns(&schema, &relation.name)? {
                    let stats = match row_count {
                        Some(count) => [
                            RawValue::Text("Row Count".to_string()),
                            RawValue::Integer(count),
                            RawValue::Text("Number of rows in the table".to_string()),
                            RawValue::Bool(true),
                        ],
                        None => [RawValue::Null, RawValue::Null, RawValue::Null, RawValue::Null],
                    };

                    let mut values = vec![
                        RawValue::Text(self.database.clone()),
                        RawValue::Text(schema.clone()),
                        RawValue::Text(relation.name.clone()),
                        RawValue::Text(if is_table { "BASE TABLE" } else { "VIEW" }.to_string()),
                        RawValue::Null,
                        RawValue::Null,
                        RawValue::Text(column.name),
                        RawValue::Integer(column.index),
                        RawValue::Text(column.data_type),
                        RawValue::Null,
                    ];
                    values.extend(stats);
                    table.push(values);
                }
            }
        }

        Ok(table)
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

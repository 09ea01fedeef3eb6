//! Adapter that replays catalog rows captured as JSON.
//!
//! Two layouts are accepted:
//!
//! ```json
//! { "column_names": ["table_database", "table_schema", ...],
//!   "rows": [["analytics", "public", ...]] }
//! ```
//!
//! or an array of row objects. Fixed-point values are written as
//! `{"$decimal": "12.50"}`.

use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use super::{AdapterError, AdapterResult, CatalogAdapter, RawValue, RowTable};
use crate::manifest::Manifest;

const DECIMAL_TAG: &str = "$decimal";

/// Reads a [`RowTable`] from a JSON file.
pub struct JsonRowsAdapter {
    path: PathBuf,
}

impl JsonRowsAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogAdapter for JsonRowsAdapter {
    fn name(&self) -> &str {
        "json"
    }

    fn get_catalog(&self, _manifest: &Manifest) -> AdapterResult<RowTable> {
        let content = fs::read_to_string(&self.path)?;
        parse_row_table(&content)
    }
}

/// Parse either supported JSON layout into a [`RowTable`].
pub fn parse_row_table(json: &str) -> AdapterResult<RowTable> {
    match serde_json::from_str::<Value>(json)? {
        Value::Object(mut obj) => {
            let column_names: Vec<String> =
                serde_json::from_value(obj.remove("column_names").unwrap_or(Value::Null))?;
            let raw_rows: Vec<Vec<Value>> =
                serde_json::from_value(obj.remove("rows").unwrap_or(Value::Array(Vec::new())))?;

            let mut table = RowTable::new(column_names);
            for raw in raw_rows {
                let values = raw
                    .into_iter()
                    .enumerate()
                    .map(|(idx, value)| {
                        let column = table.column_names.get(idx).map_or("?", String::as_str);
                        raw_value(column, value)
                    })
                    .collect::<AdapterResult<Vec<_>>>()?;
                table.push(values);
            }
            Ok(table)
        }
        Value::Array(objects) => {
            let objects = objects
                .into_iter()
                .map(|v| match v {
                    Value::Object(obj) => Ok(obj),
                    other => Err(AdapterError::UnsupportedValue {
                        column: "<row>".to_string(),
                        value: other.to_string(),
                    }),
                })
                .collect::<AdapterResult<Vec<_>>>()?;

            let column_names: BTreeSet<String> =
                objects.iter().flat_map(|o| o.keys().cloned()).collect();
            let mut table = RowTable::new(column_names.into_iter().collect());
            for mut obj in objects {
                let values = table
                    .column_names
                    .iter()
                    .map(|column| raw_value(column, obj.remove(column).unwrap_or(Value::Null)))
                    .collect::<AdapterResult<Vec<_>>>()?;
                table.push(values);
            }
            Ok(table)
        }
        other => Err(AdapterError::UnsupportedValue {
            column: "<root>".to_string(),
            value: other.to_string(),
        }),
    }
}

fn raw_value(column: &str, value: Value) -> AdapterResult<RawValue> {
    let unsupported = |value: &Value| AdapterError::UnsupportedValue {
        column: column.to_string(),
        value: value.to_string(),
    };

    Ok(match value {
        Value::Null => RawValue::Null,
        Value::Bool(b) => RawValue::Bool(b),
        Value::Number(ref n) => {
            if let Some(i) = n.as_i64() {
                RawValue::Integer(i)
            } else {
                RawValue::Float(n.as_f64().ok_or_else(|| unsupported(&value))?)
            }
        }
        Value::String(s) => RawValue::Text(s),
        Value::Object(ref obj) => match (obj.len(), obj.get(DECIMAL_TAG)) {
            (1, Some(Value::String(text))) => RawValue::Decimal(text.clone()),
            _ => return Err(unsupported(&value)),
        },
        Value::Array(_) => return Err(unsupported(&value)),
    })
}

//! Prefix extraction for flat introspection rows.

use super::types::Row;

/// Return every entry of `row` whose key starts with `prefix`, with the prefix
/// removed from the returned keys.
pub fn stripped_prefix(row: &Row, prefix: &str) -> Row {
    row.iter()
        .filter_map(|(key, value)| {
            key.strip_prefix(prefix)
                .map(|rest| (rest.to_string(), value.clone()))
        })
        .collect()
}

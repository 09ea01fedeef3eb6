//! Parsing of `stats:<id>:<field>` sub-records.
//!
//! Adapters report table statistics as flat keys:
//!
//! ```text
//! encoded:label        -> "Encoded"
//! encoded:value        -> "Yes"
//! encoded:description  -> "Indicates if the column is encoded"
//! encoded:include      -> true
//! ```
//!
//! [`parse_stats`] turns these into a [`StatsDict`] keyed by stat id. A stat
//! block that is incomplete or badly typed is dropped without failing the
//! table; [`parse_stat_item`] exposes the per-id outcome.

use std::collections::BTreeSet;

use tracing::debug;

use super::types::{Primitive, Row, StatItem, StatsDict};

/// Id of the synthetic stat that every table carries.
pub const HAS_STATS_ID: &str = "has_stats";

const STAT_FIELDS: [&str; 4] = ["label", "value", "description", "include"];

/// Why a stat block was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MalformedStat {
    #[error("stat '{id}' is missing field '{field}'")]
    MissingField { id: String, field: &'static str },

    #[error("stat '{id}' field '{field}' has the wrong type (got {value})")]
    WrongType {
        id: String,
        field: &'static str,
        value: Primitive,
    },
}

/// Assemble a single stat from the flat fields.
pub fn parse_stat_item(id: &str, stats: &Row) -> Result<StatItem, MalformedStat> {
    let field = |name: &'static str| {
        stats
            .get(&format!("{}:{}", id, name))
            .ok_or_else(|| MalformedStat::MissingField {
                id: id.to_string(),
                field: name,
            })
    };
    let wrong_type = |name: &'static str, value: &Primitive| MalformedStat::WrongType {
        id: id.to_string(),
        field: name,
        value: value.clone(),
    };

    let label = field("label")?;
    let value = field("value")?;
    let description = field("description")?;
    let include = field("include")?;

    let label = label.as_str().ok_or_else(|| wrong_type("label", label))?;
    let description = description
        .as_str()
        .ok_or_else(|| wrong_type("description", description))?;
    let include = include
        .as_bool()
        .ok_or_else(|| wrong_type("include", include))?;
    if value.is_null() {
        return Err(wrong_type("value", value));
    }

    Ok(StatItem {
        id: id.to_string(),
        label: label.to_string(),
        value: value.clone(),
        description: description.to_string(),
        include,
    })
}

/// Distinct stat ids present in the flat fields.
///
/// The id is everything before the first `:` of a key.
pub fn stat_ids(stats: &Row) -> BTreeSet<&str> {
    stats
        .keys()
        .map(|key| key.split_once(':').map_or(key.as_str(), |(id, _)| id))
        .collect()
}

/// Parse prefix-stripped stat fields into a [`StatsDict`].
///
/// Only stats with `include = true` are kept. The result always holds a
/// `has_stats` entry (never included) whose value says whether any stat
/// survived.
pub fn parse_stats(stats: &Row) -> StatsDict {
    let mut collected = StatsDict::new();

    for id in stat_ids(stats) {
        match parse_stat_item(id, stats) {
            Ok(item) if item.include => {
                collected.insert(id.to_string(), item);
            }
            Ok(_) => {}
            Err(err) => debug!(%err, "dropping malformed stat"),
        }
    }

    // Counted before a reported `has_stats` is replaced by the synthetic one.
    let has_any = !collected.is_empty();
    collected.insert(HAS_STATS_ID.to_string(), has_stats_item(has_any));
    collected
}

fn has_stats_item(value: bool) -> StatItem {
    StatItem {
        id: HAS_STATS_ID.to_string(),
        label: "Has Stats?".to_string(),
        value: Primitive::Bool(value),
        description: "Indicates whether there are statistics for this table".to_string(),
        include: false,
    }
}

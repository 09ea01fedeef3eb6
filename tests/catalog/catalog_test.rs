#[cfg(test)]
mod tests {
    use relcat::catalog::{Catalog, CatalogKey, Primitive, Row, HAS_STATS_ID};

    fn row(pairs: &[(&str, Primitive)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn orders_row(column: &str, index: f64, extra: &[(&str, Primitive)]) -> Row {
        let mut r = row(&[
            ("table_database", "Analytics".into()),
            ("table_schema", "public".into()),
            ("table_name", "orders".into()),
            ("table_type", "BASE TABLE".into()),
            ("column_name", column.into()),
            ("column_index", index.into()),
            ("column_type", "integer".into()),
            ("column_comment", Primitive::Null),
        ]);
        r.extend(row(extra));
        r
    }

    fn orders_key() -> CatalogKey {
        CatalogKey::new("analytics", "public", "orders")
    }

    #[test]
    fn test_two_rows_one_table() {
        let catalog = Catalog::build(vec![
            orders_row("id", 0.0, &[]),
            orders_row("amount", 1.0, &[]),
        ])
        .unwrap();

        assert_eq!(catalog.len(), 1);
        let table = catalog.get(&orders_key()).unwrap();
        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.columns["id"].index, 0);
        assert_eq!(table.columns["amount"].index, 1);
        assert_eq!(table.metadata.database, "Analytics");
        assert_eq!(table.columns["id"].comment, None);
    }

    #[test]
    fn test_duplicate_rows_idempotent() {
        let rows = vec![orders_row("id", 0.0, &[]), orders_row("amount", 1.0, &[])];
        let once = Catalog::build(rows.clone()).unwrap();

        let mut doubled = rows.clone();
        doubled.extend(rows);
        let twice = Catalog::build(doubled).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_first_row_wins_for_metadata_and_stats() {
        let first = orders_row(
            "id",
            0.0,
            &[
                ("table_comment", "first".into()),
                ("stats:rows:label", "Rows".into()),
                ("stats:rows:value", 10i64.into()),
                ("stats:rows:description", "Row count".into()),
                ("stats:rows:include", true.into()),
            ],
        );
        let second = orders_row(
            "amount",
            1.0,
            &[
                ("table_comment", "second".into()),
                ("table_type", "VIEW".into()),
                ("stats:rows:label", "Rows".into()),
                ("stats:rows:value", 99i64.into()),
                ("stats:rows:description", "Row count".into()),
                ("stats:rows:include", true.into()),
            ],
        );

        let catalog = Catalog::build(vec![first, second]).unwrap();
        let table = catalog.get(&orders_key()).unwrap();

        assert_eq!(table.metadata.comment.as_deref(), Some("first"));
        assert_eq!(table.metadata.table_type.as_deref(), Some("BASE TABLE"));
        assert_eq!(table.stats["rows"].value, Primitive::Integer(10));
        assert_eq!(table.stats[HAS_STATS_ID].value, Primitive::Bool(true));
        assert_eq!(table.columns.len(), 2);
    }

    #[test]
    fn test_last_column_write_wins() {
        let mut retyped = orders_row("id", 0.0, &[]);
        retyped.insert("column_type".into(), "bigint".into());

        let catalog = Catalog::build(vec![orders_row("id", 0.0, &[]), retyped]).unwrap();
        let table = catalog.get(&orders_key()).unwrap();
        assert_eq!(table.columns.len(), 1);
        assert_eq!(table.columns["id"].column_type, "bigint");
    }

    #[test]
    fn test_malformed_stat_does_not_fail_table() {
        let catalog = Catalog::build(vec![orders_row(
            "id",
            0.0,
            &[
                ("stats:bytes:label", "Bytes".into()),
                ("stats:bytes:value", 512i64.into()),
                ("stats:bytes:include", true.into()),
            ],
        )])
        .unwrap();

        let table = catalog.get(&orders_key()).unwrap();
        assert_eq!(table.stats.len(), 1);
        assert_eq!(table.stats[HAS_STATS_ID].value, Primitive::Bool(false));
    }

    #[test]
    fn test_extra_table_fields_kept() {
        let catalog = Catalog::build(vec![orders_row(
            "id",
            0.0,
            &[("table_size_mb", 12.5.into())],
        )])
        .unwrap();

        let table = catalog.get(&orders_key()).unwrap();
        assert_eq!(table.metadata.extra["size_mb"], Primitive::Float(12.5));
    }

    #[test]
    fn test_separate_tables_separate_entries() {
        let mut other = orders_row("id", 0.0, &[]);
        other.insert("table_name".into(), "customers".into());

        let catalog = Catalog::build(vec![orders_row("id", 0.0, &[]), other]).unwrap();
        assert_eq!(catalog.len(), 2);
        let names: Vec<_> = catalog
            .tables()
            .map(|t| t.metadata.name.as_str())
            .collect();
        assert_eq!(names, vec!["customers", "orders"]);
    }
}

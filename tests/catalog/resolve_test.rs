#[cfg(test)]
mod tests {
    use relcat::catalog::{resolve, Catalog, CatalogError, Primitive, Row, HAS_STATS_ID};
    use relcat::manifest::{Manifest, ManifestNode};

    fn column_row(database: &str, schema: &str, table: &str, column: &str, index: f64) -> Row {
        let mut row = Row::new();
        row.insert("table_database".into(), database.into());
        row.insert("table_schema".into(), schema.into());
        row.insert("table_name".into(), table.into());
        row.insert("column_name".into(), column.into());
        row.insert("column_index".into(), index.into());
        row.insert("column_type".into(), "int".into());
        row
    }

    #[test]
    fn test_single_row_end_to_end() {
        let catalog = Catalog::build(vec![column_row("D", "S", "T", "id", 0.0)]).unwrap();
        let manifest = Manifest::from_nodes(vec![ManifestNode::model("model.a", "D", "S", "T")]);

        let resolved = resolve(&catalog, &manifest).unwrap();
        assert_eq!(resolved.nodes().len(), 1);

        let table = &resolved.nodes()["model.a"];
        assert_eq!(table.unique_id.as_deref(), Some("model.a"));
        assert_eq!(table.columns.len(), 1);
        assert_eq!(table.columns["id"].column_type, "int");
        assert_eq!(table.columns["id"].index, 0);
        assert_eq!(table.stats.len(), 1);
        assert_eq!(table.stats[HAS_STATS_ID].value, Primitive::Bool(false));
        assert!(resolved.unmatched().is_empty());
    }

    #[test]
    fn test_matching_ignores_case() {
        let catalog = Catalog::build(vec![column_row("ANALYTICS", "Public", "Orders", "id", 0.0)])
            .unwrap();
        let manifest = Manifest::from_nodes(vec![ManifestNode::model(
            "model.shop.orders",
            "analytics",
            "PUBLIC",
            "orders",
        )]);

        let resolved = resolve(&catalog, &manifest).unwrap();
        let table = &resolved.nodes()["model.shop.orders"];
        assert_eq!(table.metadata.database, "ANALYTICS");
        assert_eq!(table.metadata.name, "Orders");
    }

    #[test]
    fn test_source_and_model_on_same_relation() {
        let catalog = Catalog::build(vec![
            column_row("D", "S", "T", "id", 0.0),
            column_row("D", "S", "T", "name", 1.0),
        ])
        .unwrap();
        let manifest = Manifest::from_nodes(vec![
            ManifestNode::model("model.p.t", "D", "S", "T"),
            ManifestNode::source("source.p.raw.t", "D", "S", "T"),
        ]);

        let resolved = resolve(&catalog, &manifest).unwrap();
        assert_eq!(resolved.nodes().len(), 2);

        let model = &resolved.nodes()["model.p.t"];
        let source = &resolved.nodes()["source.p.raw.t"];
        assert_eq!(model.metadata, source.metadata);
        assert_eq!(model.columns, source.columns);
        assert_eq!(model.stats, source.stats);
        assert_eq!(source.unique_id.as_deref(), Some("source.p.raw.t"));
    }

    #[test]
    fn test_identifier_collision_is_ambiguous() {
        let catalog = Catalog::build(vec![
            column_row("D", "S", "A", "id", 0.0),
            column_row("D", "S", "B", "id", 0.0),
        ])
        .unwrap();
        let manifest = Manifest::from_nodes(vec![
            ManifestNode::model("model.x", "D", "S", "A"),
            ManifestNode::model("model.x", "D", "S", "B"),
        ]);

        let err = resolve(&catalog, &manifest).unwrap_err();
        assert!(matches!(err, CatalogError::AmbiguousMatch { ref unique_id, .. } if unique_id == "model.x"));
        assert!(err.to_string().contains("d.s.a"));
        assert!(err.to_string().contains("d.s.b"));
    }

    #[test]
    fn test_resolution_is_bijective_without_collisions() {
        let catalog = Catalog::build(vec![
            column_row("D", "S", "A", "id", 0.0),
            column_row("D", "S", "B", "id", 0.0),
            column_row("D", "S", "C", "id", 0.0),
        ])
        .unwrap();
        let manifest = Manifest::from_nodes(vec![
            ManifestNode::model("model.a", "D", "S", "A"),
            ManifestNode::model("model.b", "D", "S", "B"),
            ManifestNode::model("model.missing", "D", "S", "Z"),
        ]);

        let resolved = resolve(&catalog, &manifest).unwrap();
        let ids: Vec<_> = resolved.nodes().keys().cloned().collect();
        assert_eq!(ids, vec!["model.a", "model.b"]);
        assert_eq!(resolved.unmatched().len(), 1);
        assert_eq!(resolved.unmatched()[0].metadata.name, "C");
    }

    #[test]
    fn test_empty_manifest_leaves_everything_unmatched() {
        let catalog = Catalog::build(vec![column_row("D", "S", "A", "id", 0.0)]).unwrap();

        let resolved = resolve(&catalog, &Manifest::default()).unwrap();
        assert!(resolved.nodes().is_empty());
        assert_eq!(resolved.unmatched().len(), 1);
    }
}

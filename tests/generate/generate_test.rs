#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use relcat::adapter::{AdapterResult, CatalogAdapter, JsonRowsAdapter, RawValue, RowTable};
    use relcat::config::Settings;
    use relcat::generate::{
        build_and_resolve, interpret_results, GenerateError, GenerateTask, NodeResult,
        CATALOG_FILENAME,
    };
    use relcat::manifest::{Manifest, ManifestNode, MANIFEST_FILENAME};
    use std::fs;
    use std::path::{Path, PathBuf};

    /// Adapter returning a fixed row table.
    struct FixedRows(RowTable);

    impl CatalogAdapter for FixedRows {
        fn name(&self) -> &str {
            "fixed"
        }

        fn get_catalog(&self, _manifest: &Manifest) -> AdapterResult<RowTable> {
            Ok(self.0.clone())
        }
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("relcat-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn settings_for(target: &Path) -> Settings {
        Settings {
            target_path: target.display().to_string(),
            ..Settings::default()
        }
    }

    fn compiling_settings_for(target: &Path) -> Settings {
        Settings {
            compile: true,
            ..settings_for(target)
        }
    }

    fn single_column_table() -> RowTable {
        let mut table = RowTable::new(
            [
                "table_database",
                "table_schema",
                "table_name",
                "column_name",
                "column_index",
                "column_type",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        );
        table.push(vec![
            RawValue::Text("D".into()),
            RawValue::Text("S".into()),
            RawValue::Text("T".into()),
            RawValue::Text("id".into()),
            RawValue::Decimal("0.0".into()),
            RawValue::Text("int".into()),
        ]);
        table
    }

    fn manifest() -> Manifest {
        Manifest::from_nodes(vec![ManifestNode::model("model.a", "D", "S", "T")])
    }

    #[test]
    fn test_serialized_node_shape() {
        let rows = single_column_table().into_rows().unwrap();
        let resolved = build_and_resolve(rows, &manifest()).unwrap();

        let json = serde_json::to_string_pretty(resolved.nodes()).unwrap();
        assert_snapshot!(json, @r###"
        {
          "model.a": {
            "metadata": {
              "type": null,
              "database": "D",
              "schema": "S",
              "name": "T",
              "comment": null,
              "owner": null
            },
            "columns": {
              "id": {
                "type": "int",
                "index": 0,
                "name": "id",
                "comment": null
              }
            },
            "stats": {
              "has_stats": {
                "id": "has_stats",
                "label": "Has Stats?",
                "value": false,
                "description": "Indicates whether there are statistics for this table",
                "include": false
              }
            },
            "unique_id": "model.a"
          }
        }
        "###);
    }

    #[test]
    fn test_run_writes_catalog_and_manifest() {
        let target = scratch_dir("run");
        let task = GenerateTask::new(settings_for(&target));

        let results = task
            .run(&FixedRows(single_column_table()), &manifest(), None)
            .unwrap();
        assert_eq!(results.nodes.len(), 1);
        assert!(interpret_results(&results));

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(target.join(CATALOG_FILENAME)).unwrap())
                .unwrap();
        assert_eq!(written["nodes"]["model.a"]["columns"]["id"]["index"], 0);
        assert!(written["generated_at"].as_str().unwrap().ends_with('Z'));
        assert!(written.get("compile_results").is_none());

        let reloaded = Manifest::from_file(target.join(MANIFEST_FILENAME)).unwrap();
        assert_eq!(reloaded, manifest());

        fs::remove_dir_all(&target).unwrap();
    }

    #[test]
    fn test_failed_compile_skips_generation() {
        let target = scratch_dir("compile-failed");
        let task = GenerateTask::new(compiling_settings_for(&target));

        let results = task
            .run(
                &FixedRows(single_column_table()),
                &manifest(),
                Some(vec![NodeResult::failed("model.a", "boom")]),
            )
            .unwrap();

        assert!(results.nodes.is_empty());
        assert!(!interpret_results(&results));
        assert!(!target.join(CATALOG_FILENAME).exists());
    }

    #[test]
    fn test_compile_disabled_ignores_results() {
        let target = scratch_dir("compile-disabled");
        let task = GenerateTask::new(settings_for(&target));

        let results = task
            .run(
                &FixedRows(single_column_table()),
                &manifest(),
                Some(vec![NodeResult::failed("model.a", "boom")]),
            )
            .unwrap();

        assert_eq!(results.nodes.len(), 1);
        assert!(results.compile_results.is_none());
        assert!(interpret_results(&results));
        assert!(target.join(CATALOG_FILENAME).exists());

        fs::remove_dir_all(&target).unwrap();
    }

    #[test]
    fn test_compile_enabled_requires_results() {
        let target = scratch_dir("compile-missing");
        let task = GenerateTask::new(compiling_settings_for(&target));

        let err = task
            .run(&FixedRows(single_column_table()), &manifest(), None)
            .unwrap_err();
        assert!(matches!(err, GenerateError::MissingCompileResults));
        assert!(!target.join(CATALOG_FILENAME).exists());
    }

    #[test]
    fn test_compile_enabled_and_clean_generates() {
        let target = scratch_dir("compile-clean");
        let task = GenerateTask::new(compiling_settings_for(&target));

        let results = task
            .run(
                &FixedRows(single_column_table()),
                &manifest(),
                Some(vec![NodeResult::ok("model.a")]),
            )
            .unwrap();

        assert_eq!(results.nodes.len(), 1);
        assert_eq!(results.compile_results.as_ref().map(Vec::len), Some(1));
        assert!(interpret_results(&results));
        assert!(target.join(CATALOG_FILENAME).exists());

        fs::remove_dir_all(&target).unwrap();
    }

    #[test]
    fn test_missing_identity_aborts_without_writing() {
        let target = scratch_dir("missing-identity");
        let task = GenerateTask::new(settings_for(&target));

        let mut table = RowTable::new(vec!["table_database".into(), "column_name".into()]);
        table.push(vec![RawValue::Text("D".into()), RawValue::Text("id".into())]);

        let err = task.run(&FixedRows(table), &manifest(), None).unwrap_err();
        assert!(matches!(err, GenerateError::Catalog(_)));
        assert!(!target.join(CATALOG_FILENAME).exists());

        let _ = fs::remove_dir_all(&target);
    }

    #[test]
    fn test_json_rows_adapter_end_to_end() {
        let target = scratch_dir("json-rows");
        fs::create_dir_all(&target).unwrap();
        let rows_path = target.join("rows.json");
        fs::write(
            &rows_path,
            r#"[
                {"table_database": "D", "table_schema": "S", "table_name": "T",
                 "column_name": "id", "column_index": 0, "column_type": "int",
                 "stats:bytes:label": "Bytes", "stats:bytes:value": {"$decimal": "2048.00"},
                 "stats:bytes:description": "Size on disk", "stats:bytes:include": true},
                {"table_database": "D", "table_schema": "S", "table_name": "U",
                 "column_name": "id", "column_index": 0, "column_type": "int",
                 "stats:bytes:label": null, "stats:bytes:value": null,
                 "stats:bytes:description": null, "stats:bytes:include": null}
            ]"#,
        )
        .unwrap();

        let out = target.join("out");
        let task = GenerateTask::new(settings_for(&out));
        let results = task
            .run(&JsonRowsAdapter::new(&rows_path), &manifest(), None)
            .unwrap();

        let table = &results.nodes["model.a"];
        assert_eq!(
            table.stats["bytes"].value,
            relcat::catalog::Primitive::Float(2048.0)
        );
        assert_eq!(results.unmatched.len(), 1);
        assert_eq!(results.unmatched[0].metadata.name, "U");

        fs::remove_dir_all(&target).unwrap();
    }
}

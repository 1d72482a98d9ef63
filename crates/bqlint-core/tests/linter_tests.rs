// Integration tests for the linter against the bundled BigQuery engine
use bqlint_core::{BigQueryEngine, Catalog, Level, Linter, Schema};

fn setup_catalog() -> Catalog {
    let schema: Schema = serde_json::from_str(
        r#"{
            "tables": [
                {
                    "name": "my_table",
                    "columns": [
                        {"name": "id", "type": "INT64"},
                        {"name": "name", "type": "STRING"}
                    ]
                },
                {
                    "name": "proj.ds.orders",
                    "columns": [
                        {"name": "order_id", "type": "INT64"},
                        {"name": "user_id", "type": "INT64"},
                        {"name": "amount", "type": "NUMERIC"}
                    ]
                }
            ]
        }"#,
    )
    .unwrap();
    Catalog::from_schema(&schema).unwrap()
}

fn linter() -> Linter<BigQueryEngine> {
    Linter::new(BigQueryEngine::new())
}

#[test]
fn clean_script_yields_no_diagnostics() {
    let catalog = setup_catalog();
    let diagnostics = linter().lint_sql("SELECT id, name FROM my_table", Some(&catalog));
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
}

#[test]
fn syntax_error_yields_single_diagnostic_at_origin() {
    let catalog = setup_catalog();
    // The second statement would also fail schema analysis; the syntax
    // error must win and be the only finding.
    let diagnostics = linter().lint_sql(
        "SELECT nope FROM my_table;\nSELECT * FORM my_table",
        Some(&catalog),
    );
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].line, 1);
    assert_eq!(diagnostics[0].column, 1);
    assert_eq!(diagnostics[0].level, Level::Error);
    assert!(diagnostics[0].file.is_empty());
}

#[test]
fn unknown_column_and_table_each_yield_one_diagnostic() {
    let catalog = setup_catalog();

    let diagnostics = linter().lint_sql("SELECT nonexistent FROM my_table", Some(&catalog));
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].message.contains("nonexistent"));

    let diagnostics = linter().lint_sql("SELECT 1 FROM no_such_table", Some(&catalog));
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].message.contains("no_such_table"));
}

#[test]
fn schema_errors_are_independent_per_statement() {
    let catalog = setup_catalog();
    let diagnostics = linter().lint_sql(
        "SELECT id FROM my_table;\nSELECT wat FROM my_table;\nSELECT name FROM my_table;\nSELECT 1 FROM no_such_table",
        Some(&catalog),
    );
    assert_eq!(diagnostics.len(), 2, "{diagnostics:?}");
    assert!(diagnostics[0].message.contains("wat"));
    assert!(diagnostics[1].message.contains("no_such_table"));
    assert!(diagnostics[0].line < diagnostics[1].line);
}

#[test]
fn diagnostics_carry_statement_start_lines() {
    let catalog = setup_catalog();
    let diagnostics = linter().lint_sql(
        "SELECT id FROM my_table;\n\nSELECT wat\nFROM my_table",
        Some(&catalog),
    );
    assert_eq!(diagnostics.len(), 1);
    // The bad statement's span starts where the separator left off: line 1.
    assert_eq!(diagnostics[0].line, 1);
    assert_eq!(diagnostics[0].column, 1);
}

#[test]
fn scripting_statements_never_produce_schema_diagnostics() {
    let catalog = setup_catalog();
    let diagnostics = linter().lint_sql(
        "DECLARE threshold INT64 DEFAULT 10;\nSELECT wat FROM my_table;\nSET threshold = 20;",
        Some(&catalog),
    );
    assert_eq!(diagnostics.len(), 1, "{diagnostics:?}");
    assert!(diagnostics[0].message.contains("wat"));
}

#[test]
fn no_catalog_mode_is_syntax_only() {
    let diagnostics = linter().lint_sql("SELECT anything FROM undefined_table", None);
    assert!(diagnostics.is_empty());

    let diagnostics = linter().lint_sql("SELECT * FORM undefined_table", None);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!((diagnostics[0].line, diagnostics[0].column), (1, 1));
}

#[test]
fn semicolons_inside_strings_do_not_split_analysis() {
    let catalog = setup_catalog();
    let diagnostics = linter().lint_sql("SELECT 'a;b' FROM my_table", Some(&catalog));
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
}

#[test]
fn qualified_tables_resolve_flat() {
    let catalog = setup_catalog();
    let diagnostics = linter().lint_sql(
        "SELECT order_id, amount FROM proj.ds.orders",
        Some(&catalog),
    );
    assert!(diagnostics.is_empty(), "{diagnostics:?}");

    // The bare trailing name is not registered on its own.
    let diagnostics = linter().lint_sql("SELECT order_id FROM orders", Some(&catalog));
    assert_eq!(diagnostics.len(), 1);
}

#[test]
fn lint_file_stamps_every_diagnostic() {
    let catalog = setup_catalog();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.sql");
    std::fs::write(
        &path,
        "SELECT wat FROM my_table;\nSELECT 1 FROM no_such_table;\n",
    )
    .unwrap();

    let diagnostics = linter().lint_file(&path, Some(&catalog)).unwrap();
    assert_eq!(diagnostics.len(), 2);
    for diagnostic in &diagnostics {
        assert_eq!(diagnostic.file, path.display().to_string());
        let rendered = diagnostic.to_string();
        assert!(
            rendered.starts_with(&format!("{}:", path.display())),
            "{rendered}"
        );
    }
}

#[test]
fn lint_file_read_failure_is_an_error_not_a_diagnostic() {
    let catalog = setup_catalog();
    assert!(linter()
        .lint_file("/definitely/not/here.sql", Some(&catalog))
        .is_err());
}

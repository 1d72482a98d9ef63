//! Schema catalog - the table definitions statements are analyzed against
//!
//! Tables are keyed by their fully qualified dotted name
//! (`project.dataset.table`), compared ASCII-case-insensitively. There is no
//! nested namespace lookup: a table registered under a qualified name is
//! found only by that name, an unqualified one only by its bare name.

use std::fmt;

use indexmap::IndexMap;

use crate::error::ConfigError;
use crate::schema::Schema;
use crate::types::BqType;

/// Qualified table name: one or more dot-separated parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    parts: Vec<String>,
}

impl QualifiedName {
    pub fn new(parts: Vec<String>) -> Self {
        Self { parts }
    }

    /// Parse a dotted name like "project.dataset.table" or just "table".
    pub fn parse(s: &str) -> Self {
        Self {
            parts: s.split('.').map(str::to_string).collect(),
        }
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// The trailing component, the table's bare name.
    pub fn base(&self) -> &str {
        self.parts.last().map(String::as_str).unwrap_or_default()
    }

    /// Case-folded lookup key for flat catalog storage.
    pub(crate) fn key(&self) -> String {
        self.parts.join(".").to_ascii_lowercase()
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.parts.join("."))
    }
}

/// Column definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub ty: BqType,
}

/// Table definition
#[derive(Debug, Clone)]
pub struct TableDef {
    pub name: QualifiedName,
    /// Case-folded column name -> definition, in declaration order.
    columns: IndexMap<String, ColumnDef>,
}

impl TableDef {
    pub fn new(name: QualifiedName) -> Self {
        Self {
            name,
            columns: IndexMap::new(),
        }
    }

    pub fn add_column(&mut self, column: ColumnDef) -> Result<(), ConfigError> {
        let key = column.name.to_ascii_lowercase();
        if self.columns.contains_key(&key) {
            return Err(ConfigError::DuplicateColumn {
                table: self.name.to_string(),
                column: column.name,
            });
        }
        self.columns.insert(key, column);
        Ok(())
    }

    /// Case-insensitive column lookup.
    pub fn get_column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.get(&name.to_ascii_lowercase())
    }

    pub fn column_exists(&self, name: &str) -> bool {
        self.get_column(name).is_some()
    }

    pub fn columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.values()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.values().map(|c| c.name.as_str()).collect()
    }
}

/// Schema snapshot the linter borrows for the duration of one lint call.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: IndexMap<String, TableDef>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from loaded schema definitions.
    pub fn from_schema(schema: &Schema) -> Result<Self, ConfigError> {
        let mut catalog = Self::new();
        for table in &schema.tables {
            let mut def = TableDef::new(QualifiedName::parse(&table.name));
            for column in &table.columns {
                let ty = BqType::parse(&column.type_name).map_err(|source| {
                    ConfigError::InvalidType {
                        table: table.name.clone(),
                        column: column.name.clone(),
                        source,
                    }
                })?;
                def.add_column(ColumnDef {
                    name: column.name.clone(),
                    ty,
                })?;
            }
            catalog.add_table(def)?;
        }
        tracing::debug!(tables = catalog.tables.len(), "built catalog");
        Ok(catalog)
    }

    pub fn add_table(&mut self, table: TableDef) -> Result<(), ConfigError> {
        let key = table.name.key();
        if self.tables.contains_key(&key) {
            return Err(ConfigError::DuplicateTable(table.name.to_string()));
        }
        self.tables.insert(key, table);
        Ok(())
    }

    pub fn get_table(&self, name: &QualifiedName) -> Option<&TableDef> {
        self.tables.get(&name.key())
    }

    pub fn table_exists(&self, name: &QualifiedName) -> bool {
        self.get_table(name).is_some()
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableDef> {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str, columns: &[(&str, &str)]) -> TableDef {
        let mut def = TableDef::new(QualifiedName::parse(name));
        for (col, ty) in columns {
            def.add_column(ColumnDef {
                name: (*col).to_string(),
                ty: BqType::parse(ty).unwrap(),
            })
            .unwrap();
        }
        def
    }

    #[test]
    fn qualified_name_parse_and_display() {
        let name = QualifiedName::parse("proj.dataset.events");
        assert_eq!(name.parts().len(), 3);
        assert_eq!(name.base(), "events");
        assert_eq!(name.to_string(), "proj.dataset.events");

        let bare = QualifiedName::parse("events");
        assert_eq!(bare.parts().len(), 1);
        assert_eq!(bare.base(), "events");
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut catalog = Catalog::new();
        catalog
            .add_table(table("Proj.DS.Events", &[("id", "INT64")]))
            .unwrap();

        assert!(catalog.table_exists(&QualifiedName::parse("proj.ds.events")));
        assert!(!catalog.table_exists(&QualifiedName::parse("events")));

        let def = catalog
            .get_table(&QualifiedName::parse("PROJ.DS.EVENTS"))
            .unwrap();
        assert!(def.column_exists("ID"));
        assert_eq!(def.get_column("Id").unwrap().name, "id");
    }

    #[test]
    fn duplicate_table_is_rejected() {
        let mut catalog = Catalog::new();
        catalog.add_table(table("t", &[])).unwrap();
        let err = catalog.add_table(table("T", &[])).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateTable(_)));
    }

    #[test]
    fn duplicate_column_is_rejected() {
        let mut def = TableDef::new(QualifiedName::parse("t"));
        def.add_column(ColumnDef {
            name: "id".to_string(),
            ty: BqType::Int64,
        })
        .unwrap();
        let err = def
            .add_column(ColumnDef {
                name: "ID".to_string(),
                ty: BqType::String,
            })
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateColumn { .. }));
    }

    #[test]
    fn from_schema_builds_tables() {
        let schema: Schema = serde_json::from_str(
            r#"{
                "tables": [
                    {
                        "name": "proj.ds.users",
                        "columns": [
                            {"name": "id", "type": "INT64"},
                            {"name": "tags", "type": "ARRAY<STRING>"}
                        ]
                    }
                ]
            }"#,
        )
        .unwrap();

        let catalog = Catalog::from_schema(&schema).unwrap();
        assert_eq!(catalog.len(), 1);
        let def = catalog
            .get_table(&QualifiedName::parse("proj.ds.users"))
            .unwrap();
        assert_eq!(def.column_names(), vec!["id", "tags"]);
    }

    #[test]
    fn from_schema_rejects_bad_type() {
        let schema: Schema = serde_json::from_str(
            r#"{"tables": [{"name": "t", "columns": [{"name": "x", "type": "WAT"}]}]}"#,
        )
        .unwrap();
        let err = Catalog::from_schema(&schema).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidType { .. }));
    }
}

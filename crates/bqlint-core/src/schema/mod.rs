//! Schema definitions loaded from JSON files
//!
//! ```json
//! {
//!   "tables": [
//!     {
//!       "name": "project.dataset.table",
//!       "columns": [{"name": "id", "type": "INT64"}]
//!     }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A collection of table definitions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub tables: Vec<TableSchema>,
}

/// A table definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSchema {
    /// Fully qualified: project.dataset.table
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnSchema>,
}

/// A column definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    /// BigQuery type: INT64, STRING, ARRAY<STRING>, etc.
    #[serde(rename = "type")]
    pub type_name: String,
}

impl Schema {
    /// Load a schema from a JSON file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load and merge all `.json` schema files directly under `dir`.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|source| ConfigError::Read {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| ConfigError::Read {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        // read_dir yields entries in no particular order.
        paths.sort();

        let mut merged = Schema::default();
        for path in paths {
            merged.tables.extend(Self::load_file(&path)?.tables);
        }
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_schema_json() {
        let schema: Schema = serde_json::from_str(
            r#"{
                "tables": [
                    {
                        "name": "proj.ds.users",
                        "columns": [
                            {"name": "id", "type": "INT64"},
                            {"name": "name", "type": "STRING"}
                        ]
                    },
                    {"name": "bare_table"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(schema.tables.len(), 2);
        assert_eq!(schema.tables[0].name, "proj.ds.users");
        assert_eq!(schema.tables[0].columns[1].type_name, "STRING");
        assert!(schema.tables[1].columns.is_empty());
    }

    #[test]
    fn load_file_missing_path_is_read_error() {
        let err = Schema::load_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}

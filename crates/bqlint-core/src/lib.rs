//! bqlint-core: BigQuery SQL lint library
//!
//! This library validates BigQuery SQL scripts: syntax for the whole script
//! (including scripting constructs like DECLARE and IF blocks), and, when a
//! schema catalog is supplied, per-statement table/column references.

pub mod catalog;
pub mod engine;
pub mod error;
pub mod linter;
pub mod schema;
pub mod script;
pub mod split;
pub mod types;

pub use catalog::{Catalog, ColumnDef, QualifiedName, TableDef};
pub use engine::{BigQueryEngine, SqlEngine};
pub use error::{ConfigError, Diagnostic, Level, LintError, SchemaError, SyntaxError};
pub use linter::Linter;
pub use schema::Schema;
pub use script::ScriptingKeywords;
pub use split::{split_statements, StatementSpan};
pub use types::BqType;

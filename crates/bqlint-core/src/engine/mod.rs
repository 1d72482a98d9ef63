//! SQL dialect engine seam
//!
//! The linter depends on this trait only; how the dialect is actually parsed
//! and analyzed (in-process, subprocess, FFI) is the implementation's
//! business. [`BigQueryEngine`] is the bundled sqlparser-backed one.

mod bigquery;
mod resolver;

use crate::catalog::Catalog;
use crate::error::{SchemaError, SyntaxError};

pub use bigquery::BigQueryEngine;

/// Parsing and analysis capability for one SQL dialect.
pub trait SqlEngine {
    /// Parse a single SQL statement (statement grammar only).
    fn parse_statement(&self, sql: &str) -> Result<(), SyntaxError>;

    /// Parse a full script, including scripting constructs (DECLARE, SET,
    /// IF/ELSEIF/ELSE/END IF, ASSERT, multi-statement sequences). A superset
    /// of `parse_statement`.
    fn parse_script(&self, sql: &str) -> Result<(), SyntaxError>;

    /// Validate a single non-scripting statement's table and column
    /// references against the catalog.
    fn analyze_statement(&self, sql: &str, catalog: &Catalog) -> Result<(), SchemaError>;
}

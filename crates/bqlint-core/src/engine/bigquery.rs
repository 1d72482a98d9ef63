//! sqlparser-backed BigQuery engine

use sqlparser::ast::Statement;
use sqlparser::dialect::BigQueryDialect;
use sqlparser::parser::{Parser, ParserError};

use crate::catalog::Catalog;
use crate::engine::resolver::NameResolver;
use crate::engine::SqlEngine;
use crate::error::{SchemaError, SyntaxError};
use crate::script::ScriptingKeywords;
use crate::split::split_statements;

/// BigQuery dialect engine built on sqlparser.
///
/// sqlparser carries no grammar for BigQuery procedural statements
/// (`IF ... END IF` blocks and friends), so script parsing falls back to
/// statement-by-statement checks that let scripting constructs through on
/// keyword match. Everything else goes through `BigQueryDialect`.
#[derive(Debug, Clone, Default)]
pub struct BigQueryEngine {
    scripting: ScriptingKeywords,
}

impl BigQueryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scripting_keywords(scripting: ScriptingKeywords) -> Self {
        Self { scripting }
    }

    fn parse(sql: &str) -> Result<Vec<Statement>, ParserError> {
        Parser::parse_sql(&BigQueryDialect {}, sql)
    }
}

impl SqlEngine for BigQueryEngine {
    fn parse_statement(&self, sql: &str) -> Result<(), SyntaxError> {
        let statements = Self::parse(sql).map_err(|e| SyntaxError::new(e.to_string()))?;
        if statements.len() > 1 {
            return Err(SyntaxError::new("expected a single statement"));
        }
        Ok(())
    }

    fn parse_script(&self, sql: &str) -> Result<(), SyntaxError> {
        // Fast path: the whole script is a plain statement sequence.
        if Self::parse(sql).is_ok() {
            return Ok(());
        }

        // Procedural scripts land here. Statement splitting cuts control
        // flow blocks at inner semicolons, so every span either opens with a
        // scripting keyword (accepted as-is) or must parse on its own.
        for span in split_statements(sql) {
            let trimmed = span.text.trim();
            if trimmed.is_empty() || trimmed == ";" {
                continue;
            }
            if self.scripting.is_scripting_statement(trimmed) {
                continue;
            }
            if let Err(e) = Self::parse(trimmed) {
                return Err(SyntaxError::at(span.start_line, 1, e.to_string()));
            }
        }
        Ok(())
    }

    fn analyze_statement(&self, sql: &str, catalog: &Catalog) -> Result<(), SchemaError> {
        let statements = Self::parse(sql).map_err(|e| SchemaError::new(e.to_string()))?;
        for stmt in &statements {
            let mut resolver = NameResolver::new(catalog);
            resolver.resolve_statement(stmt);
            if let Some(err) = resolver.into_first_error() {
                return Err(err);
            }
        }
        Ok(())
    }
}

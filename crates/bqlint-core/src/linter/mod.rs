//! Lint orchestration
//!
//! Two phases. First the whole script goes through the engine's script
//! grammar; a syntax error there is the only finding, reported at 1:1.
//! Second, when a catalog is supplied, the script is split into statements
//! and each non-scripting statement is analyzed for schema conformance;
//! those errors are independent per statement and accumulate in statement
//! order. Without a catalog, syntax validity is all that can be established.

use std::fs;
use std::path::Path;

use crate::catalog::Catalog;
use crate::engine::SqlEngine;
use crate::error::{Diagnostic, LintError};
use crate::script::ScriptingKeywords;
use crate::split::split_statements;

/// Validates SQL scripts, optionally against a catalog.
///
/// The catalog is borrowed per call and never retained; concurrent calls
/// against the same catalog are as safe as the engine makes them.
pub struct Linter<E> {
    engine: E,
    scripting: ScriptingKeywords,
}

impl<E: SqlEngine> Linter<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            scripting: ScriptingKeywords::default(),
        }
    }

    pub fn with_scripting_keywords(mut self, scripting: ScriptingKeywords) -> Self {
        self.scripting = scripting;
        self
    }

    /// Lint a SQL string, potentially multi-statement.
    pub fn lint_sql(&self, sql: &str, catalog: Option<&Catalog>) -> Vec<Diagnostic> {
        if let Err(err) = self.engine.parse_script(sql) {
            return vec![Diagnostic::error(err.to_string()).at(1, 1)];
        }

        let Some(catalog) = catalog else {
            return Vec::new();
        };

        let spans = split_statements(sql);
        tracing::debug!(statements = spans.len(), "analyzing script");

        let mut diagnostics = Vec::new();
        for span in spans {
            let trimmed = span.text.trim();
            if trimmed.is_empty() || trimmed == ";" {
                continue;
            }
            // The statement-level analyzer has no scripting grammar; these
            // were already validated by parse_script.
            if self.scripting.is_scripting_statement(trimmed) {
                continue;
            }
            if let Err(err) = self.engine.analyze_statement(trimmed, catalog) {
                diagnostics.push(Diagnostic::error(err.to_string()).at(span.start_line, 1));
            }
        }
        diagnostics
    }

    /// Lint a file, stamping every diagnostic with its path.
    pub fn lint_file(
        &self,
        path: impl AsRef<Path>,
        catalog: Option<&Catalog>,
    ) -> Result<Vec<Diagnostic>, LintError> {
        let path = path.as_ref();
        let sql = fs::read_to_string(path).map_err(|source| LintError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut diagnostics = self.lint_sql(&sql, catalog);
        for diagnostic in &mut diagnostics {
            diagnostic.file = path.display().to_string();
        }
        Ok(diagnostics)
    }
}

//! Error and diagnostic types

use std::fmt;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Error,
    Warning,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => f.write_str("error"),
            Level::Warning => f.write_str("warning"),
        }
    }
}

/// A single lint finding.
///
/// `file` is empty when linting an in-memory string; the caller stamps it
/// after the fact when the source has a path. `line`/`column` are 1-based,
/// 0 when no position is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub level: Level,
    pub message: String,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            file: String::new(),
            line: 0,
            column: 0,
            level: Level::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: Level::Warning,
            ..Self::error(message)
        }
    }

    /// Attach a 1-based source position.
    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = line;
        self.column = column;
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.file.is_empty() && self.line > 0 {
            write!(
                f,
                "{}:{}:{}: {}: {}",
                self.file, self.line, self.column, self.level, self.message
            )
        } else if !self.file.is_empty() {
            write!(f, "{}: {}: {}", self.file, self.level, self.message)
        } else {
            write!(f, "{}: {}", self.level, self.message)
        }
    }
}

/// Syntax error reported by the dialect engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// 1-based (line, column), if known.
    pub position: Option<(u32, u32)>,
    pub message: String,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            position: None,
            message: message.into(),
        }
    }

    pub fn at(line: u32, column: u32, message: impl Into<String>) -> Self {
        Self {
            position: Some((line, column)),
            message: message.into(),
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some((line, column)) => write!(f, "{}:{}: {}", line, column, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for SyntaxError {}

/// Schema conformance error reported by the dialect engine: the statement
/// references a table or column the catalog does not know.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SchemaError {
    pub message: String,
}

impl SchemaError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failure of a file-level lint operation. Distinct from the diagnostics the
/// lint would otherwise produce.
#[derive(Debug, Error)]
pub enum LintError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Malformed schema definition encountered while loading schema files or
/// building a catalog from them.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading schema file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parsing schema file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("duplicate table '{0}' in schema")]
    DuplicateTable(String),

    #[error("duplicate column '{column}' in table '{table}'")]
    DuplicateColumn { table: String, column: String },

    #[error("column '{column}' of table '{table}': {source}")]
    InvalidType {
        table: String,
        column: String,
        #[source]
        source: crate::types::TypeError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_rendering() {
        let diag = Diagnostic::error("unknown table");
        assert_eq!(diag.to_string(), "error: unknown table");

        let mut diag = Diagnostic::error("unknown table").at(3, 1);
        diag.file = "query.sql".to_string();
        assert_eq!(diag.to_string(), "query.sql:3:1: error: unknown table");

        let mut diag = Diagnostic::warning("deprecated syntax");
        diag.file = "query.sql".to_string();
        assert_eq!(diag.to_string(), "query.sql: warning: deprecated syntax");
    }

    #[test]
    fn diagnostic_without_file_ignores_position() {
        let diag = Diagnostic::error("boom").at(2, 5);
        assert_eq!(diag.to_string(), "error: boom");
    }

    #[test]
    fn syntax_error_rendering() {
        assert_eq!(
            SyntaxError::new("unexpected token").to_string(),
            "unexpected token"
        );
        assert_eq!(
            SyntaxError::at(4, 7, "unexpected token").to_string(),
            "4:7: unexpected token"
        );
    }

    #[test]
    fn diagnostic_json_field_names() {
        let diag = Diagnostic::error("boom").at(1, 1);
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "file": "",
                "line": 1,
                "column": 1,
                "level": "error",
                "message": "boom",
            })
        );
    }
}

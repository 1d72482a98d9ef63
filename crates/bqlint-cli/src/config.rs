//! Configuration file handling

use miette::{IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::args::OutputFormat;

/// Configuration for bqlint (bqlint.toml)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Schema definition JSON file
    #[serde(default)]
    pub schema: Option<String>,

    /// Directory of schema JSON files
    pub schema_dir: Option<String>,

    /// SQL file patterns to lint
    #[serde(default)]
    pub files: Vec<String>,

    /// Output format (text, json, github)
    #[serde(default)]
    pub format: Option<String>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).into_diagnostic()?;
        let config: Config = toml::from_str(&contents).into_diagnostic()?;
        Ok(config)
    }

    /// Try to find and load bqlint.toml in the current directory or parents
    pub fn find_and_load() -> Result<Option<Self>> {
        let mut current_dir = std::env::current_dir().into_diagnostic()?;

        loop {
            let config_path = current_dir.join("bqlint.toml");
            if config_path.exists() {
                return Ok(Some(Self::from_file(&config_path)?));
            }

            if !current_dir.pop() {
                break;
            }
        }

        Ok(None)
    }

    /// Merge CLI arguments into configuration; CLI values win.
    pub fn merge_with_args(
        mut self,
        schema: &Option<PathBuf>,
        schema_dir: &Option<PathBuf>,
        files: &[PathBuf],
    ) -> Self {
        if schema.is_some() {
            self.schema = schema.as_ref().map(|p| p.display().to_string());
        }

        if schema_dir.is_some() {
            self.schema_dir = schema_dir.as_ref().map(|p| p.display().to_string());
        }

        if !files.is_empty() {
            self.files = files.iter().map(|p| p.display().to_string()).collect();
        }

        self
    }

    /// The configured output format; unknown names fall back to text.
    pub fn output_format(&self) -> OutputFormat {
        match self.format.as_deref() {
            Some("json") => OutputFormat::Json,
            Some("github") => OutputFormat::Github,
            _ => OutputFormat::Text,
        }
    }
}

//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "bqlint")]
#[command(author, version, about = "BigQuery SQL linter")]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Lint SQL files against an optional schema
    Lint {
        /// SQL files to lint (supports glob patterns)
        files: Vec<PathBuf>,

        /// Schema definition JSON file
        #[arg(short, long, value_name = "FILE")]
        schema: Option<PathBuf>,

        /// Directory of schema JSON files
        #[arg(long = "schema-dir", value_name = "DIR")]
        schema_dir: Option<PathBuf>,

        /// Read SQL from stdin
        #[arg(long)]
        stdin: bool,

        /// Output format (defaults to text)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Configuration file (defaults to the nearest bqlint.toml)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Display catalog information from schema files
    Schema {
        /// Schema definition JSON files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Plain "file:line:col: level: message" lines
    #[default]
    Text,
    /// JSON array of diagnostics
    Json,
    /// GitHub Actions error annotations
    Github,
}

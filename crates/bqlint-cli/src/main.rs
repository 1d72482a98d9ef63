//! bqlint CLI - BigQuery SQL linter

mod args;
mod config;
mod output;

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use bqlint_core::{BigQueryEngine, Catalog, Linter, Schema};
use clap::Parser;
use miette::{IntoDiagnostic, Result};

use crate::args::{Args, Command};
use crate::config::Config;
use crate::output::OutputFormatter;

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing
    let default_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .init();

    match run(args) {
        Ok(has_findings) => {
            if has_findings {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> Result<bool> {
    match args.command {
        Command::Lint {
            files,
            schema,
            schema_dir,
            stdin,
            format,
            config: config_path,
        } => {
            // Load configuration, CLI arguments taking precedence
            let config = if let Some(path) = config_path {
                Config::from_file(&path)?
            } else {
                Config::find_and_load()?.unwrap_or_default()
            };
            let config = config.merge_with_args(&schema, &schema_dir, &files);
            let format = format.unwrap_or_else(|| config.output_format());

            // Build the catalog when a schema is configured; without one,
            // linting is syntax-only.
            let catalog = if let Some(path) = &config.schema {
                let schema = Schema::load_file(path).into_diagnostic()?;
                Some(Catalog::from_schema(&schema).into_diagnostic()?)
            } else if let Some(dir) = &config.schema_dir {
                let schema = Schema::load_dir(dir).into_diagnostic()?;
                Some(Catalog::from_schema(&schema).into_diagnostic()?)
            } else {
                None
            };

            // Collect SQL files, expanding glob patterns
            let mut sql_files: Vec<PathBuf> = Vec::new();
            for pattern in &config.files {
                if pattern.contains('*') {
                    for path in glob::glob(pattern).into_diagnostic()?.flatten() {
                        sql_files.push(path);
                    }
                } else {
                    sql_files.push(PathBuf::from(pattern));
                }
            }

            if sql_files.is_empty() && !stdin {
                miette::bail!("No input files. Use --stdin or pass file paths.");
            }

            let linter = Linter::new(BigQueryEngine::new());
            let mut diagnostics = Vec::new();

            if stdin {
                let mut sql = String::new();
                std::io::stdin()
                    .read_to_string(&mut sql)
                    .into_diagnostic()?;
                let mut results = linter.lint_sql(&sql, catalog.as_ref());
                for diagnostic in &mut results {
                    diagnostic.file = "<stdin>".to_string();
                }
                diagnostics.extend(results);
            }

            for file in &sql_files {
                let results = linter.lint_file(file, catalog.as_ref()).into_diagnostic()?;
                diagnostics.extend(results);
            }

            OutputFormatter::new(format).print(&diagnostics);

            Ok(!diagnostics.is_empty())
        }

        Command::Schema { files } => {
            let mut merged = Schema::default();
            for file in &files {
                merged
                    .tables
                    .extend(Schema::load_file(file).into_diagnostic()?.tables);
            }
            let catalog = Catalog::from_schema(&merged).into_diagnostic()?;

            println!("Catalog ({} tables):", catalog.len());
            for table in catalog.tables() {
                println!("  {}", table.name);
                for column in table.columns() {
                    println!("    - {} {}", column.name, column.ty);
                }
            }

            Ok(false)
        }
    }
}

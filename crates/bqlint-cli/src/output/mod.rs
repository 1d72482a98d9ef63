//! Output formatting

use bqlint_core::Diagnostic;

use crate::args::OutputFormat;

/// Output formatter for diagnostics
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print diagnostics in the configured format
    pub fn print(&self, diagnostics: &[Diagnostic]) {
        match self.format {
            OutputFormat::Text => {
                for diagnostic in diagnostics {
                    println!("{diagnostic}");
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(diagnostics).unwrap());
            }
            OutputFormat::Github => {
                for diagnostic in diagnostics {
                    println!(
                        "::error file={},line={},col={}::{}",
                        diagnostic.file, diagnostic.line, diagnostic.column, diagnostic.message
                    );
                }
            }
        }
    }
}

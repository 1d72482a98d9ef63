//! Scripting statement classification
//!
//! BigQuery scripting statements (variable declarations, control flow) are
//! understood by the script-level parser but not by the statement-level
//! analyzer. The linter skips them during schema analysis; which keywords
//! mark one is configuration, not a global.

/// The keyword set that marks a statement as BigQuery scripting.
///
/// `ELSEIF`, `ELSE`, and `END` are in the default set because statement
/// splitting cuts an `IF ... END IF` block at every inner semicolon, leaving
/// spans that open with those keywords.
#[derive(Debug, Clone)]
pub struct ScriptingKeywords {
    keywords: Vec<String>,
}

impl Default for ScriptingKeywords {
    fn default() -> Self {
        Self::new(["DECLARE", "SET", "ASSERT", "IF", "ELSEIF", "ELSE", "END"])
    }
}

impl ScriptingKeywords {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|kw| kw.as_ref().to_ascii_uppercase())
                .collect(),
        }
    }

    /// Reports whether `trimmed` starts with a scripting keyword.
    ///
    /// The keyword must be the entire statement or be followed by
    /// whitespace, so `IF(x, 1, 2)`, `IFNULL(x, 0)`, and a column named
    /// `SETTINGS` do not match.
    pub fn is_scripting_statement(&self, trimmed: &str) -> bool {
        let upper = trimmed.to_ascii_uppercase();
        self.keywords.iter().any(|kw| {
            upper.strip_prefix(kw.as_str()).is_some_and(|rest| {
                matches!(rest.as_bytes().first(), None | Some(b' ' | b'\t' | b'\n' | b'\r'))
            })
        })
    }
}

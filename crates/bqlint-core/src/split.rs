//! Statement segmentation
//!
//! Splits a multi-statement script on top-level semicolons while tracking
//! string literals, quoted identifiers, comments, and line numbers. The
//! splitter never fails: malformed input (an unterminated quote or comment)
//! simply ends in a non-normal state and the trailing text is still emitted.
//! Judging the SQL itself is the parser's job, not ours.

/// One `;`-delimited unit of a script.
///
/// `text` keeps the span's surrounding whitespace; trimming is the caller's
/// concern. `start_line` is 1-based and counts every newline seen before the
/// span begins, including newlines inside skipped comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementSpan<'a> {
    pub text: &'a str,
    pub start_line: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    SingleQuote,
    DoubleQuote,
    Backtick,
    LineComment,
    BlockComment,
}

/// Split SQL on semicolons, tracking line numbers.
///
/// A semicolon only terminates a statement in the normal state, so
/// semicolons inside quotes and comments are never separators. Empty spans
/// (`;;`) are emitted; a whitespace-only remainder after the last semicolon
/// is not.
pub fn split_statements(sql: &str) -> Vec<StatementSpan<'_>> {
    let bytes = sql.as_bytes();
    let mut spans = Vec::new();
    let mut state = State::Normal;
    let mut line: u32 = 1;
    let mut start = 0;
    let mut start_line: u32 = 1;
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];

        if c == b'\n' {
            line += 1;
            if state == State::LineComment {
                state = State::Normal;
            }
            i += 1;
            continue;
        }

        match state {
            State::LineComment => {}
            State::BlockComment => {
                if c == b'*' && bytes.get(i + 1) == Some(&b'/') {
                    state = State::Normal;
                    i += 1;
                }
            }
            State::SingleQuote => {
                if c == b'\'' {
                    state = State::Normal;
                } else if c == b'\\' {
                    // Escaped character, whatever it is; an escaped quote
                    // must not terminate the literal.
                    i += 1;
                }
            }
            State::DoubleQuote => {
                if c == b'"' {
                    state = State::Normal;
                } else if c == b'\\' {
                    i += 1;
                }
            }
            State::Backtick => {
                // Backtick-quoted identifiers have no backslash escapes.
                if c == b'`' {
                    state = State::Normal;
                }
            }
            State::Normal => match c {
                b'\'' => state = State::SingleQuote,
                b'"' => state = State::DoubleQuote,
                b'`' => state = State::Backtick,
                b'-' if bytes.get(i + 1) == Some(&b'-') => {
                    state = State::LineComment;
                    i += 1;
                }
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    state = State::BlockComment;
                    i += 1;
                }
                b';' => {
                    spans.push(StatementSpan {
                        text: &sql[start..i],
                        start_line,
                    });
                    start = i + 1;
                    start_line = line;
                }
                _ => {}
            },
        }

        i += 1;
    }

    // Remaining text after the last semicolon.
    if start < sql.len() && !sql[start..].trim().is_empty() {
        spans.push(StatementSpan {
            text: &sql[start..],
            start_line,
        });
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn texts<'a>(sql: &'a str) -> Vec<&'a str> {
        split_statements(sql).into_iter().map(|s| s.text).collect()
    }

    #[test]
    fn statement_counts() {
        let cases = [
            ("SELECT 1", 1),
            ("SELECT 1; SELECT 2", 2),
            ("SELECT 1;", 1),
            ("SELECT 1;; SELECT 2", 3),
            ("SELECT 1;;SELECT 2", 3),
            ("-- comment\nSELECT 1;\n/* block */\nSELECT 2", 2),
            ("SELECT 'a;b'", 1),
            ("SELECT `a;b`", 1),
            ("", 0),
            ("   \n  ", 0),
        ];
        for (sql, want) in cases {
            assert_eq!(
                split_statements(sql).len(),
                want,
                "split_statements({sql:?})"
            );
        }
    }

    #[test]
    fn no_phantom_trailing_span() {
        assert_eq!(texts("SELECT 1;"), vec!["SELECT 1"]);
        assert_eq!(texts("SELECT 1; \n "), vec!["SELECT 1"]);
    }

    #[test]
    fn empty_spans_are_preserved() {
        assert_eq!(texts("SELECT 1;;SELECT 2"), vec!["SELECT 1", "", "SELECT 2"]);
    }

    #[test]
    fn semicolons_in_quotes_are_not_separators() {
        assert_eq!(texts("SELECT 'a;b'"), vec!["SELECT 'a;b'"]);
        assert_eq!(texts(r#"SELECT "a;b""#), vec![r#"SELECT "a;b""#]);
        assert_eq!(texts("SELECT `a;b` FROM t"), vec!["SELECT `a;b` FROM t"]);
    }

    #[test]
    fn escaped_quote_does_not_terminate_literal() {
        assert_eq!(
            texts(r"SELECT 'don\'t; stop'; SELECT 2"),
            vec![r"SELECT 'don\'t; stop'", " SELECT 2"]
        );
    }

    #[test]
    fn backtick_has_no_escapes() {
        // The backslash is an ordinary character here, so the second
        // backtick closes the identifier and the semicolon separates.
        assert_eq!(texts(r"SELECT `a\`; SELECT 2").len(), 2);
    }

    #[test]
    fn semicolons_in_comments_are_not_separators() {
        assert_eq!(texts("SELECT 1 -- not a split; really\n"), vec!["SELECT 1 -- not a split; really\n"]);
        assert_eq!(texts("SELECT 1 /* ; */ + 2"), vec!["SELECT 1 /* ; */ + 2"]);
    }

    #[test]
    fn block_comment_close_is_fully_consumed() {
        // The '/' of '*/' must not re-open anything or leak state.
        assert_eq!(texts("/* c */ SELECT 1; SELECT 2").len(), 2);
    }

    #[test]
    fn line_tracking() {
        let spans = split_statements("SELECT 1;\n\nSELECT 2;\nSELECT 3");
        let lines: Vec<u32> = spans.iter().map(|s| s.start_line).collect();
        assert_eq!(lines, vec![1, 1, 3]);
    }

    #[test]
    fn newlines_in_comments_count() {
        let spans = split_statements("/* one\ntwo */ SELECT 1;\nSELECT 2");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].start_line, 1);
        assert_eq!(spans[1].start_line, 2);
    }

    #[test]
    fn unterminated_quote_still_emits_tail() {
        let spans = split_statements("SELECT 1;\nSELECT 'oops; no close");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1].text, "\nSELECT 'oops; no close");
    }

    #[test]
    fn spans_reconstruct_input() {
        let sql = "SELECT 1;\n\nSELECT 2;\nSELECT 3";
        assert_eq!(texts(sql).join(";"), sql);
    }
}

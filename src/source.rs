//! Statement parsing seam.
//!
//! Deciding which lines of a source file are executable statements is the
//! job of a source-parsing collaborator, abstracted behind [`SourceParser`].
//! The summarizer only needs two things from it: the statement first-line
//! set (minus explicitly excluded statements) and a mapping from executed
//! physical lines to the canonical first line of their statement, since a
//! multi-line statement may report several physical line numbers.
//!
//! [`LineScanner`] is the reference implementation: a line-oriented scanner
//! that tracks bracket depth and trailing-backslash continuations to group
//! physical lines into statements. Its tie-breaking for multi-line
//! statements is part of its contract; other parsers can plug in behind the
//! trait with their own.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{CovviewError, Result};

/// Default marker that excludes a statement from coverage accounting.
static DEFAULT_EXCLUDE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)pragma:\s*no\s*cover").unwrap());

/// Parsed statement structure for one source file.
#[derive(Debug, Clone, Default)]
pub struct ParsedSource {
    /// First physical line of every statement.
    pub statements: BTreeSet<u32>,
    /// First lines of statements marked excluded.
    pub excluded: BTreeSet<u32>,
    /// Physical line number -> first line of the statement containing it.
    pub first_line: HashMap<u32, u32>,
}

impl ParsedSource {
    /// Map executed physical lines to statement first lines, deduplicating
    /// along the way. Lines not attributable to any scanned statement map
    /// to themselves.
    #[must_use]
    pub fn first_lines(&self, executed: &[u32]) -> BTreeSet<u32> {
        executed
            .iter()
            .map(|&line| self.first_line.get(&line).copied().unwrap_or(line))
            .collect()
    }
}

/// The source-parsing collaborator.
pub trait SourceParser {
    /// Parse the file at `path` into its statement structure. A file that
    /// no longer exists is `SourceMissing`.
    fn parse_source(&self, path: &Path) -> Result<ParsedSource>;
}

/// Reference line-oriented statement scanner.
///
/// A statement starts on a non-blank, non-comment line at bracket depth
/// zero that is not a continuation of the previous line; it extends across
/// subsequent lines while brackets stay open or lines end with `\`. An
/// exclusion marker anywhere in a statement excludes the whole statement.
#[derive(Debug)]
pub struct LineScanner {
    comment_prefixes: Vec<String>,
    exclude: Regex,
}

impl Default for LineScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl LineScanner {
    pub fn new() -> Self {
        Self {
            comment_prefixes: vec!["#".to_string(), "//".to_string()],
            exclude: DEFAULT_EXCLUDE_RE.clone(),
        }
    }

    /// Scanner with a custom exclusion marker pattern.
    pub fn with_exclude_pattern(pattern: &str) -> Result<Self> {
        Ok(Self {
            exclude: Regex::new(pattern)?,
            ..Self::new()
        })
    }

    fn is_comment(&self, trimmed: &str) -> bool {
        self.comment_prefixes
            .iter()
            .any(|prefix| trimmed.starts_with(prefix.as_str()))
    }

    /// Scan source text into its statement structure.
    #[must_use]
    pub fn scan(&self, text: &str) -> ParsedSource {
        let mut parsed = ParsedSource::default();
        let mut depth: i32 = 0;
        let mut continued = false;
        let mut current_start: Option<u32> = None;

        for (idx, raw) in text.lines().enumerate() {
            let lineno = idx as u32 + 1;
            let trimmed = raw.trim();
            let in_statement = depth > 0 || continued;

            if !in_statement {
                current_start = None;
                if trimmed.is_empty() || self.is_comment(trimmed) {
                    continue;
                }
                current_start = Some(lineno);
                parsed.statements.insert(lineno);
            }

            if let Some(start) = current_start {
                parsed.first_line.insert(lineno, start);
                if self.exclude.is_match(raw) {
                    parsed.excluded.insert(start);
                }
            }

            depth += bracket_delta(raw);
            if depth < 0 {
                depth = 0;
            }
            continued = trimmed.ends_with('\\');
        }

        parsed
    }
}

impl SourceParser for LineScanner {
    fn parse_source(&self, path: &Path) -> Result<ParsedSource> {
        let text = std::fs::read_to_string(path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                CovviewError::SourceMissing(path.to_path_buf())
            } else {
                CovviewError::Io(err)
            }
        })?;
        Ok(self.scan(&text))
    }
}

/// Net change in bracket depth across one line. Brackets inside string
/// literals don't count; a backslash inside a string escapes the next
/// character.
fn bracket_delta(line: &str) -> i32 {
    let mut delta = 0;
    let mut in_string: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match in_string {
            Some(quote) => {
                if c == '\\' {
                    chars.next();
                } else if c == quote {
                    in_string = None;
                }
            }
            None => match c {
                '\'' | '"' => in_string = Some(c),
                '(' | '[' | '{' => delta += 1,
                ')' | ']' | '}' => delta -= 1,
                _ => {}
            },
        }
    }

    delta
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(set: &BTreeSet<u32>) -> Vec<u32> {
        set.iter().copied().collect()
    }

    #[test]
    fn test_scan_skips_blanks_and_comments() {
        let scanner = LineScanner::new();
        let parsed = scanner.scan("a = 1\n\n# comment\nb = 2\n// also comment\nc = 3\n");
        assert_eq!(lines(&parsed.statements), vec![1, 4, 6]);
        assert!(parsed.excluded.is_empty());
    }

    #[test]
    fn test_scan_exclusion_pragma() {
        let scanner = LineScanner::new();
        let parsed = scanner.scan("a = 1\nb = 2  # pragma: no cover\nc = 3\n");
        assert_eq!(lines(&parsed.statements), vec![1, 2, 3]);
        assert_eq!(lines(&parsed.excluded), vec![2]);
    }

    #[test]
    fn test_scan_multiline_bracket_statement() {
        let scanner = LineScanner::new();
        let parsed = scanner.scan("total = sum(\n    values,\n)\nx = 1\n");
        assert_eq!(lines(&parsed.statements), vec![1, 4]);
        assert_eq!(parsed.first_line.get(&2), Some(&1));
        assert_eq!(parsed.first_line.get(&3), Some(&1));
        assert_eq!(parsed.first_lines(&[2, 3]), BTreeSet::from([1]));
    }

    #[test]
    fn test_scan_backslash_continuation() {
        let scanner = LineScanner::new();
        let parsed = scanner.scan("x = 1 + \\\n    2\ny = 3\n");
        assert_eq!(lines(&parsed.statements), vec![1, 3]);
        assert_eq!(parsed.first_line.get(&2), Some(&1));
    }

    #[test]
    fn test_scan_bracket_inside_string_ignored() {
        let scanner = LineScanner::new();
        let parsed = scanner.scan("s = \"(\"\nt = ')'\nu = 1\n");
        assert_eq!(lines(&parsed.statements), vec![1, 2, 3]);
    }

    #[test]
    fn test_scan_pragma_on_continuation_excludes_statement() {
        let scanner = LineScanner::new();
        let parsed = scanner.scan("xs = [\n    1,  # pragma: no cover\n]\n");
        assert_eq!(lines(&parsed.statements), vec![1]);
        assert_eq!(lines(&parsed.excluded), vec![1]);
    }

    #[test]
    fn test_first_lines_unknown_line_maps_to_itself() {
        let parsed = ParsedSource::default();
        assert_eq!(parsed.first_lines(&[7, 7, 9]), BTreeSet::from([7, 9]));
    }

    #[test]
    fn test_custom_exclude_pattern() {
        let scanner = LineScanner::with_exclude_pattern(r"NOCOV").unwrap();
        let parsed = scanner.scan("a = 1  # NOCOV\nb = 2\n");
        assert_eq!(lines(&parsed.excluded), vec![1]);
    }

    #[test]
    fn test_invalid_exclude_pattern() {
        let err = LineScanner::with_exclude_pattern("(unclosed").unwrap_err();
        assert!(matches!(err, CovviewError::Pattern(_)));
    }

    #[test]
    fn test_parse_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = LineScanner::new()
            .parse_source(&dir.path().join("gone.py"))
            .unwrap_err();
        assert!(matches!(err, CovviewError::SourceMissing(_)));
    }

    #[test]
    fn test_bracket_delta() {
        assert_eq!(bracket_delta("foo(["), 2);
        assert_eq!(bracket_delta("])"), -2);
        assert_eq!(bracket_delta("balanced()"), 0);
        assert_eq!(bracket_delta("\"(\" + '['"), 0);
        assert_eq!(bracket_delta("\"\\\"(\""), 0);
    }
}

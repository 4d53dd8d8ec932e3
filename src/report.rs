//! Output formatting for coverage reports: compact missing-line ranges, the
//! per-file status summary line, and the annotated source listing.

use std::collections::BTreeSet;
use std::fmt::Write;

use crate::model::FileReport;

/// Coalesce sorted line numbers into `(start, end)` ranges of consecutive
/// lines. The input must be sorted ascending.
#[must_use]
pub fn coalesce_ranges(lines: &[u32]) -> Vec<(u32, u32)> {
    let mut ranges: Vec<(u32, u32)> = Vec::new();

    for &line in lines {
        match ranges.last_mut() {
            Some((_, end)) if line == *end + 1 => *end = line,
            _ => ranges.push((line, line)),
        }
    }

    ranges
}

/// Format line numbers into compact range notation, e.g. "1, 3-5, 8".
///
/// The input slice must be sorted in ascending order.
#[must_use]
pub fn format_line_ranges(lines: &[u32]) -> String {
    coalesce_ranges(lines)
        .iter()
        .map(|&(start, end)| {
            if start == end {
                start.to_string()
            } else {
                format!("{start}-{end}")
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Status-bar style summary for one file: "3/5 lines executed (2 missing)".
#[must_use]
pub fn summary_line(report: &FileReport) -> String {
    format!(
        "{}/{} lines executed ({} missing)",
        report.n_executed,
        report.n_executed + report.n_missing,
        report.n_missing
    )
}

/// Render source text with per-line coverage markers: `✗` for a missing
/// statement line, `✓` for an executed line, blank otherwise.
///
/// `missing` must be sorted ascending (as produced by the summarizer).
#[must_use]
pub fn annotate_source(text: &str, executed: &[u32], missing: &[u32]) -> String {
    let executed: BTreeSet<u32> = executed.iter().copied().collect();

    let mut out = String::new();
    for (idx, line) in text.lines().enumerate() {
        let lineno = idx as u32 + 1;
        let marker = if missing.binary_search(&lineno).is_ok() {
            '✗'
        } else if executed.contains(&lineno) {
            '✓'
        } else {
            ' '
        };
        writeln!(out, "{lineno:>6} {marker} {line}").unwrap();
    }
    out
}

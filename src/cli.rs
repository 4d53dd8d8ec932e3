//! Command handler functions for the covview CLI.
//!
//! Each `cmd_*` function returns its output as a `String`, making them easy
//! to test without capturing stdout.

use std::fmt::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::ValueEnum;

use crate::model::{percentage, CoverageRecord, FileReport, LoadOutcome, Tier};
use crate::paths::display_path;
use crate::report;

/// Output style for the `files` command.
#[derive(Clone, ValueEnum)]
pub enum Style {
    Text,
    Json,
}

/// Resolve a user-supplied file argument against the outcome: exact match on
/// the record's absolute path, or relative to the base directory.
fn resolve_file<'a>(outcome: &'a LoadOutcome, base: &str, arg: &str) -> Option<&'a FileReport> {
    if let Some(report) = outcome.files.get(arg) {
        return Some(report);
    }
    let joined = Path::new(base).join(arg);
    outcome.files.get(joined.to_string_lossy().as_ref())
}

pub fn cmd_files(
    outcome: &LoadOutcome,
    base: &str,
    sort_by_coverage: bool,
    style: &Style,
) -> Result<String> {
    let mut files: Vec<&FileReport> = outcome.files.values().collect();

    if sort_by_coverage {
        // Files with no measurable statements sort last.
        files.sort_by(|a, b| {
            a.percentage
                .unwrap_or(f64::INFINITY)
                .total_cmp(&b.percentage.unwrap_or(f64::INFINITY))
        });
    }

    if let Style::Json = style {
        let mut out = serde_json::to_string_pretty(&files).context("Failed to encode report")?;
        out.push('\n');
        return Ok(out);
    }

    if files.is_empty() {
        return Ok("No files in coverage data.\n".to_string());
    }

    let mut out = String::new();
    writeln!(
        out,
        "{:<50} {:>8} {:>8} {:>8}  TIER",
        "FILE", "EXEC", "MISS", "COVER"
    )
    .unwrap();
    writeln!(out, "{}", "-".repeat(85)).unwrap();

    for f in &files {
        let cover = match f.percentage {
            Some(pct) => format!("{pct:.1}%"),
            None => "-".to_string(),
        };
        let tier = f.tier.map_or("-", |t| t.as_str());
        writeln!(
            out,
            "{:<50} {:>8} {:>8} {:>8}  {}",
            display_path(base, &f.path),
            f.n_executed,
            f.n_missing,
            cover,
            tier
        )
        .unwrap();
    }

    Ok(out)
}

pub fn cmd_missing(outcome: &LoadOutcome, base: &str, source_file: &str) -> Result<String> {
    let Some(report) = resolve_file(outcome, base, source_file) else {
        return Ok(format!("No coverage data for '{source_file}'\n"));
    };

    let display = display_path(base, &report.path);

    if report.missing.is_empty() {
        return Ok(format!("All statements are executed in '{display}'\n"));
    }

    let mut out = String::new();
    writeln!(out, "Missing lines in '{display}':").unwrap();
    writeln!(out, "  {}", report::format_line_ranges(&report.missing)).unwrap();
    writeln!(out, "  ({} lines)", report.missing.len()).unwrap();
    Ok(out)
}

pub fn cmd_show(
    outcome: &LoadOutcome,
    record: &CoverageRecord,
    base: &str,
    source_file: &str,
) -> Result<String> {
    let Some(report) = resolve_file(outcome, base, source_file) else {
        return Ok(format!("No coverage data for '{source_file}'\n"));
    };

    let text = std::fs::read_to_string(&report.path)
        .with_context(|| format!("Failed to read source file {}", report.path))?;
    let executed = record.executed(&report.path).unwrap_or(&[]);

    let mut out = String::new();
    writeln!(
        out,
        "{}: {}",
        display_path(base, &report.path),
        report::summary_line(report)
    )
    .unwrap();
    out.push('\n');
    out.push_str(&report::annotate_source(&text, executed, &report.missing));
    Ok(out)
}

pub fn cmd_summary(
    outcome: &LoadOutcome,
    base: &str,
    loaded_at: Option<DateTime<Local>>,
) -> Result<String> {
    let total_executed: usize = outcome.files.values().map(|f| f.n_executed).sum();
    let total_missing: usize = outcome.files.values().map(|f| f.n_missing).sum();

    let mut out = String::new();
    writeln!(out, "Files:      {}", outcome.files.len()).unwrap();
    match percentage(total_executed, total_missing) {
        Some(pct) => writeln!(
            out,
            "Statements: {}/{} executed ({:.1}%)",
            total_executed,
            total_executed + total_missing,
            pct
        )
        .unwrap(),
        None => writeln!(out, "Statements: none measured").unwrap(),
    }

    let tiers = [Tier::Bad, Tier::Poor, Tier::Ok, Tier::Good, Tier::Perfect];
    let counts: Vec<String> = tiers
        .iter()
        .filter_map(|&tier| {
            let n = outcome
                .files
                .values()
                .filter(|f| f.tier == Some(tier))
                .count();
            (n > 0).then(|| format!("{tier}={n}"))
        })
        .collect();
    if !counts.is_empty() {
        writeln!(out, "Tiers:      {}", counts.join(" ")).unwrap();
    }

    if !outcome.stale.is_empty() {
        let stale: Vec<String> = outcome
            .stale
            .iter()
            .map(|path| display_path(base, path))
            .collect();
        writeln!(out, "Stale:      {}", stale.join(", ")).unwrap();
    }

    if !outcome.skipped.is_empty() {
        let skipped: Vec<String> = outcome
            .skipped
            .iter()
            .map(|(path, _)| display_path(base, path))
            .collect();
        writeln!(out, "Skipped:    {}", skipped.join(", ")).unwrap();
    }

    if let Some(at) = loaded_at {
        writeln!(out, "Loaded:     {}", at.format("%Y-%m-%d %H:%M:%S")).unwrap();
    }

    Ok(out)
}

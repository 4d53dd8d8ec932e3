//! Uniform in-memory representation of a coverage load: the raw record read
//! from the data file, and the per-file reports the summarizer derives from
//! it. The display layer consumes these values; nothing here touches it.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::error::CovviewError;

/// One loaded coverage record: executed line numbers per absolute file path,
/// exactly as reported by the external measurement tool. Replaced wholesale
/// on every reload, never partially mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageRecord {
    pub lines: BTreeMap<String, Vec<u32>>,
}

impl CoverageRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths covered by this record, in sorted order.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.lines.keys().map(String::as_str)
    }

    /// Executed line numbers for one file, if present.
    #[must_use]
    pub fn executed(&self, path: &str) -> Option<&[u32]> {
        self.lines.get(path).map(Vec::as_slice)
    }
}

/// Compute a coverage percentage rounded to one decimal place, or `None`
/// when the file has no measurable statements (the total is zero).
#[must_use]
pub fn percentage(n_executed: usize, n_missing: usize) -> Option<f64> {
    let total = n_executed + n_missing;
    if total == 0 {
        return None;
    }
    Some((n_executed as f64 / total as f64 * 1000.0).round() / 10.0)
}

/// Discrete quality bucket derived from a coverage percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Bad,
    Poor,
    Ok,
    Good,
    Perfect,
}

/// Ordered classification table: a percentage strictly below the bound gets
/// the paired tier; anything at or above the last bound is `Perfect`.
/// Boundaries are half-open on the lower side, so exactly 70.0 is `Poor`
/// and exactly 99.9 is `Perfect`.
const TIER_TABLE: &[(f64, Tier)] = &[
    (70.0, Tier::Bad),
    (80.0, Tier::Poor),
    (90.0, Tier::Ok),
    (99.9, Tier::Good),
];

impl Tier {
    /// Classify an already-rounded coverage percentage.
    #[must_use]
    pub fn classify(percentage: f64) -> Tier {
        for &(bound, tier) in TIER_TABLE {
            if percentage < bound {
                return tier;
            }
        }
        Tier::Perfect
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Bad => "bad",
            Tier::Poor => "poor",
            Tier::Ok => "ok",
            Tier::Good => "good",
            Tier::Perfect => "perfect",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-file result of a load.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// Absolute path as it appears in the coverage record.
    pub path: String,
    /// Statement first lines that never executed, ascending.
    pub missing: Vec<u32>,
    /// Number of executed statements (counted by first line).
    pub n_executed: usize,
    /// Number of missing statements.
    pub n_missing: usize,
    /// Rounded coverage percentage; `None` for files with no statements.
    pub percentage: Option<f64>,
    /// Tier for the percentage; `None` exactly when `percentage` is.
    pub tier: Option<Tier>,
}

/// Everything one load produces for the display layer.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    /// Fresh per-file reports, keyed by path.
    pub files: BTreeMap<String, FileReport>,
    /// Previously annotated paths with no fresh report; the display should
    /// clear their percentage and tier.
    pub stale: BTreeSet<String>,
    /// Files skipped this load, with the per-file error that caused it.
    pub skipped: Vec<(String, CovviewError)>,
}

//! The coverage summarizer: diff each file's parsed statement lines against
//! its executed lines and classify the result.
//!
//! This is a pure function of the loaded record, the parser's output, and
//! the previous load's annotated file set. It never touches display state;
//! the caller applies the returned [`LoadOutcome`] to whatever front end it
//! drives.

use std::collections::BTreeSet;
use std::path::Path;

use crate::model::{percentage, CoverageRecord, FileReport, LoadOutcome, Tier};
use crate::source::SourceParser;

/// Summarize a freshly loaded record.
///
/// `previous_files` is the set of paths annotated by the prior load. Paths
/// not successfully summarized this time (absent from the record, or skipped
/// because their source vanished) come back in the outcome's stale set so
/// the display can clear them.
///
/// Per-file failures (a source file that no longer exists) skip that file
/// and continue; they never abort the load.
pub fn summarize(
    record: &CoverageRecord,
    parser: &dyn SourceParser,
    previous_files: &BTreeSet<String>,
) -> LoadOutcome {
    let mut outcome = LoadOutcome::default();

    for (path, executed) in &record.lines {
        let parsed = match parser.parse_source(Path::new(path)) {
            Ok(parsed) => parsed,
            Err(err) => {
                outcome.skipped.push((path.clone(), err));
                continue;
            }
        };

        // Excluded statements are neither missing nor counted in totals.
        let considered: BTreeSet<u32> = parsed
            .statements
            .difference(&parsed.excluded)
            .copied()
            .collect();
        let executed_first: BTreeSet<u32> = parsed
            .first_lines(executed)
            .difference(&parsed.excluded)
            .copied()
            .collect();

        // BTreeSet iteration gives the ascending order the display needs.
        let missing: Vec<u32> = considered.difference(&executed_first).copied().collect();

        let n_executed = executed_first.len();
        let n_missing = missing.len();
        let pct = percentage(n_executed, n_missing);

        outcome.files.insert(
            path.clone(),
            FileReport {
                path: path.clone(),
                missing,
                n_executed,
                n_missing,
                percentage: pct,
                tier: pct.map(Tier::classify),
            },
        );
    }

    for path in previous_files {
        if !outcome.files.contains_key(path) {
            outcome.stale.insert(path.clone());
        }
    }

    outcome
}

//! Loading the serialized coverage data file.
//!
//! The file is owned by the external measurement tool; the only shape this
//! crate relies on is a top-level `lines` mapping from absolute file path to
//! the executed line numbers for that file:
//!
//!   {"lines": {"/abs/path/to/file": [1, 2, 5], ...}}
//!
//! Loading either produces a complete [`CoverageRecord`] or fails cleanly:
//! an unreadable file is `DataUnavailable`, a file that reads but does not
//! deserialize to that shape is `DataCorrupt`. Nothing is partially applied.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{CovviewError, Result};
use crate::model::CoverageRecord;

/// Where the measurement tool writes its data, relative to the working
/// directory.
pub const DEFAULT_DATA_PATH: &str = ".coverage";

/// Wire shape of the data file. Unknown top-level keys are ignored; the
/// `lines` mapping is the only part this crate consumes.
#[derive(Deserialize)]
struct RawRecord {
    lines: BTreeMap<String, Vec<u32>>,
}

/// Read and deserialize the coverage data file at `path`.
pub fn load(path: &Path) -> Result<CoverageRecord> {
    let bytes = std::fs::read(path).map_err(|source| CovviewError::DataUnavailable {
        path: path.to_path_buf(),
        source,
    })?;

    let raw: RawRecord =
        serde_json::from_slice(&bytes).map_err(|err| CovviewError::DataCorrupt {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;

    // Line numbers are 1-based; a zero means the producer is broken.
    for (file, executed) in &raw.lines {
        if executed.contains(&0) {
            return Err(CovviewError::DataCorrupt {
                path: path.to_path_buf(),
                reason: format!("line number 0 for {file}"),
            });
        }
    }

    Ok(CoverageRecord { lines: raw.lines })
}

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CovviewError {
    #[error("coverage data file {} is unavailable: {source}", .path.display())]
    DataUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("coverage data file {} is corrupt: {reason}", .path.display())]
    DataCorrupt { path: PathBuf, reason: String },

    #[error("source file no longer exists: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("invalid exclusion pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CovviewError {
    /// Whether this error aborts the whole load (as opposed to skipping a
    /// single file). Load-level failures are the ones offered a retry.
    #[must_use]
    pub fn is_load_fatal(&self) -> bool {
        matches!(
            self,
            CovviewError::DataUnavailable { .. } | CovviewError::DataCorrupt { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CovviewError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_load_fatal_classification() {
        let unavailable = CovviewError::DataUnavailable {
            path: PathBuf::from(".coverage"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        let corrupt = CovviewError::DataCorrupt {
            path: PathBuf::from(".coverage"),
            reason: "bad shape".to_string(),
        };
        let missing = CovviewError::SourceMissing(PathBuf::from("/src/gone.py"));

        assert!(unavailable.is_load_fatal());
        assert!(corrupt.is_load_fatal());
        assert!(!missing.is_load_fatal());
    }

    #[test]
    fn test_error_messages_name_the_path() {
        let missing = CovviewError::SourceMissing(PathBuf::from("/src/gone.py"));
        assert!(missing.to_string().contains("/src/gone.py"));
    }
}

//! Display-path normalization.
//!
//! Coverage records carry absolute paths; the display wants them relative to
//! the working directory when they live under it. Display only: lookups
//! and parsing always use the absolute path from the record.

use std::path::MAIN_SEPARATOR;

/// Return `candidate` relative to `base` when it is a proper descendant
/// (prefix match followed by a separator), otherwise unchanged.
///
/// Idempotent: reapplying to the output is a no-op, since the output either
/// no longer starts with `base` or was already returned unchanged.
#[must_use]
pub fn display_path(base: &str, candidate: &str) -> String {
    candidate
        .strip_prefix(base)
        .and_then(|rest| rest.strip_prefix(MAIN_SEPARATOR))
        .map(str::to_string)
        .unwrap_or_else(|| candidate.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descendant_is_relativized() {
        assert_eq!(display_path("/home/work", "/home/work/src/a.py"), "src/a.py");
    }

    #[test]
    fn test_outside_base_unchanged() {
        assert_eq!(display_path("/home/work", "/opt/lib/b.py"), "/opt/lib/b.py");
    }

    #[test]
    fn test_prefix_without_separator_unchanged() {
        // "/home/workbench" shares the string prefix but is not a descendant.
        assert_eq!(
            display_path("/home/work", "/home/workbench/c.py"),
            "/home/workbench/c.py"
        );
    }

    #[test]
    fn test_base_itself_unchanged() {
        assert_eq!(display_path("/home/work", "/home/work"), "/home/work");
    }

    #[test]
    fn test_idempotent() {
        let once = display_path("/home/work", "/home/work/src/a.py");
        assert_eq!(display_path("/home/work", &once), once);

        let outside = display_path("/home/work", "/opt/lib/b.py");
        assert_eq!(display_path("/home/work", &outside), outside);
    }
}

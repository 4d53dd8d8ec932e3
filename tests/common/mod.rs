use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Create a workspace directory holding source files plus a `.coverage`
/// data file. The caller must hold onto `TempDir` to keep the workspace
/// alive.
pub fn setup_workspace(
    sources: &[(&str, &str)],
    executed: &[(&str, &[u32])],
) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    for (name, text) in sources {
        std::fs::write(dir.path().join(name), text).unwrap();
    }
    let data_path = dir.path().join(".coverage");
    write_coverage(&data_path, dir.path(), executed);
    (dir, data_path)
}

/// Write (or rewrite) a coverage data file mapping workspace-relative file
/// names to executed line numbers.
pub fn write_coverage(data_path: &Path, root: &Path, executed: &[(&str, &[u32])]) {
    let mut lines = serde_json::Map::new();
    for (name, line_numbers) in executed {
        let abs = root.join(name).to_string_lossy().into_owned();
        lines.insert(abs, serde_json::to_value(line_numbers).unwrap());
    }
    let doc = serde_json::json!({ "lines": lines });
    std::fs::write(data_path, serde_json::to_vec(&doc).unwrap()).unwrap();
}

/// Absolute path of a workspace file, as it appears in the coverage record.
pub fn abs(root: &Path, name: &str) -> String {
    root.join(name).to_string_lossy().into_owned()
}

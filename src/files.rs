//! Discovery of `.jack` source files for batch compilation.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively collects every `.jack` file under `root`, which may itself
/// be a single file.
///
/// The returned list is sorted so batch output order is deterministic.
pub fn collect_sources<P: AsRef<Path>>(root: P) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = entry?;

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("jack") {
            continue;
        }

        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_extension_filter_and_order() {
        let dir = std::env::temp_dir().join(format!("jackc-files-{}", std::process::id()));
        let nested = dir.join("nested");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.join("B.jack"), "class B {}").unwrap();
        fs::write(dir.join("notes.txt"), "not a source").unwrap();
        fs::write(nested.join("A.jack"), "class A {}").unwrap();

        let found = collect_sources(&dir).unwrap();
        fs::remove_dir_all(&dir).unwrap();

        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["B.jack", "A.jack"]);
    }

    #[test]
    fn test_single_file_accepted() {
        let path = std::env::temp_dir().join(format!("jackc-single-{}.jack", std::process::id()));
        fs::write(&path, "class Single {}").unwrap();

        let found = collect_sources(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(found, vec![path]);
    }
}

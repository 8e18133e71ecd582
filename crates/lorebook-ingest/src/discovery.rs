//! File discovery and reading.

use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|n| n.starts_with('.'))
            .unwrap_or(false)
}

/// Recursively find files under `root` whose extension is in `extensions`.
///
/// Extensions are given without the dot and compared case-insensitively.
/// Hidden files and directories are skipped. The result is sorted.
pub fn find_files(root: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
                .unwrap_or(false)
        })
        .map(|e| e.into_path())
        .collect();

    files.sort();
    files
}

/// Read a file as text; missing or unreadable files yield `None`.
///
/// Invalid UTF-8 is replaced rather than rejected.
pub fn read_text(path: &Path) -> Option<String> {
    match std::fs::read(path) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            debug!("Cannot read {}: {}", path.display(), e);
            None
        }
    }
}

/// Path of `path` relative to `root`, with forward slashes.
pub fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_find_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("b/nested")).unwrap();
        fs::create_dir_all(root.join(".hidden")).unwrap();

        fs::write(root.join("b/nested/z.recipe"), "{}").unwrap();
        fs::write(root.join("a.RECIPE"), "{}").unwrap();
        fs::write(root.join("notes.txt"), "").unwrap();
        fs::write(root.join(".secret.recipe"), "{}").unwrap();
        fs::write(root.join(".hidden/x.recipe"), "{}").unwrap();

        let files = find_files(root, &["recipe"]);
        let names: Vec<String> = files.iter().map(|p| relative_path(root, p)).collect();

        assert_eq!(names, vec!["a.RECIPE".to_string(), "b/nested/z.recipe".to_string()]);
    }

    #[test]
    fn test_read_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        fs::write(&path, "hello").unwrap();

        assert_eq!(read_text(&path), Some("hello".to_string()));
        assert!(read_text(&dir.path().join("nope.md")).is_none());
    }
}

//! Expands glob patterns into concrete file lists.

use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GlobError {
    #[error("Invalid glob pattern: {0}")]
    InvalidGlob(#[from] globset::Error),
}

/// List files under `root` matching `pattern`, sorted for deterministic
/// processing order. Gitignore rules are not applied: build output is
/// routinely gitignored.
pub fn list_files(root: &Path, pattern: &str) -> Result<Vec<PathBuf>, GlobError> {
    let glob = globset::Glob::new(pattern)?.compile_matcher();

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .follow_links(false)
        .build();

    let mut files = Vec::new();
    for entry in walker.filter_map(Result::ok) {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Ok(rel) = path.strip_prefix(root) else {
            continue;
        };
        if glob.is_match(rel) {
            // keep workspace-relative spellings clean when walking the cwd
            files.push(if root == Path::new(".") {
                rel.to_path_buf()
            } else {
                path.to_path_buf()
            });
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("assethash-test-sources-{name}"));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("sub")).unwrap();
        fs::write(dir.join("a.css"), "a").unwrap();
        fs::write(dir.join("b.txt"), "b").unwrap();
        fs::write(dir.join("sub/c.css"), "c").unwrap();
        dir
    }

    #[test]
    fn test_list_files_matches_recursively() {
        let dir = test_dir("recursive");

        let files = list_files(&dir, "*.css").unwrap();
        assert_eq!(files, [dir.join("a.css"), dir.join("sub/c.css")]);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_list_files_respects_extension() {
        let dir = test_dir("extension");

        let files = list_files(&dir, "*.txt").unwrap();
        assert_eq!(files, [dir.join("b.txt")]);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_list_files_empty_when_nothing_matches() {
        let dir = test_dir("none");

        assert!(list_files(&dir, "*.woff2").unwrap().is_empty());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let dir = test_dir("invalid");

        assert!(matches!(
            list_files(&dir, "{unclosed"),
            Err(GlobError::InvalidGlob(_))
        ));

        let _ = fs::remove_dir_all(&dir);
    }
}

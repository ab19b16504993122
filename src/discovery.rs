//! File Discovery
//!
//! Finds markup files under the configured input paths.

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Version-control metadata directories never descended into
const VCS_DIRS: [&str; 3] = [".git", ".hg", ".svn"];

/// Collect markup files in a deterministic order.
///
/// Directories are walked recursively, sorted by file name; an input that is
/// itself a file is always included regardless of its extension.
pub fn find_markup_files(inputs: &[PathBuf], extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if !input.exists() {
            bail!("Input path does not exist: {}", input.display());
        }
        if input.is_file() {
            files.push(input.clone());
            continue;
        }

        let walker = WalkDir::new(input)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_vcs_dir(e));

        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    if has_extension(entry.path(), extensions) {
                        files.push(entry.into_path());
                    }
                }
                Ok(_) => {}
                Err(e) => log::warn!("Skipping unreadable entry: {}", e),
            }
        }
    }

    log::debug!("Discovered {} markup file(s)", files.len());
    Ok(files)
}

fn is_vcs_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| VCS_DIRS.contains(&name))
}

/// Case-insensitive extension match
fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn html() -> Vec<String> {
        vec!["html".to_string()]
    }

    #[test]
    fn test_has_extension_ignores_case() {
        assert!(has_extension(Path::new("a/Question.HTML"), &html()));
        assert!(has_extension(Path::new("b.Html"), &html()));
        assert!(!has_extension(Path::new("c.htm"), &html()));
        assert!(!has_extension(Path::new("html"), &html()));
    }

    #[test]
    fn test_find_sorted_and_skips_vcs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("b")).unwrap();
        fs::create_dir_all(root.join(".git/info")).unwrap();
        fs::write(root.join("b/question.html"), "<a/>").unwrap();
        fs::write(root.join("a.HTML"), "<a/>").unwrap();
        fs::write(root.join("notes.txt"), "").unwrap();
        fs::write(root.join(".git/info/x.html"), "<a/>").unwrap();

        let files = find_markup_files(&[root.to_path_buf()], &html()).unwrap();

        assert_eq!(files, [root.join("a.HTML"), root.join("b/question.html")]);
    }

    #[test]
    fn test_explicit_file_always_included() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("page.xml");
        fs::write(&file, "<a/>").unwrap();

        let files = find_markup_files(&[file.clone()], &html()).unwrap();
        assert_eq!(files, [file]);
    }

    #[test]
    fn test_missing_input_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_markup_files(&[dir.path().join("nope")], &html()).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}

//! Audio file discovery for directory-walking adapters

use super::SourceError;
use crate::media::is_supported_audio;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Names skipped while walking a media tree
const IGNORE_PATTERNS: &[&str] = &[".DS_Store", "Thumbs.db", ".git", ".svn"];

/// Recursive audio file walker
pub(crate) struct AudioFileWalker<'a> {
    source_id: &'a str,
}

impl<'a> AudioFileWalker<'a> {
    pub(crate) fn new(source_id: &'a str) -> Self {
        Self { source_id }
    }

    /// All files with a supported audio extension under `root`, in file name
    /// order. Unsupported files and unreadable entries are logged and skipped.
    pub(crate) fn walk(&self, root: &Path) -> Result<Vec<PathBuf>, SourceError> {
        if !root.is_dir() {
            return Err(SourceError::MissingMediaDir(root.to_path_buf()));
        }

        let mut symlink_visited = HashSet::new();
        let mut files = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| should_process_entry(e, &mut symlink_visited));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("({}) Error accessing entry: {}", self.source_id, e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            if is_supported_audio(entry.path()) {
                files.push(entry.into_path());
            } else {
                tracing::debug!(
                    "({}) Skipping non-audio file: {}",
                    self.source_id,
                    entry.path().display()
                );
            }
        }

        Ok(files)
    }
}

fn should_process_entry(entry: &DirEntry, symlink_visited: &mut HashSet<PathBuf>) -> bool {
    let file_name = entry.file_name().to_string_lossy();
    if IGNORE_PATTERNS.iter().any(|pattern| file_name == *pattern) {
        return false;
    }

    if entry.file_type().is_symlink() {
        if let Ok(canonical) = entry.path().canonicalize() {
            if !symlink_visited.insert(canonical) {
                tracing::warn!("Symlink loop detected: {}", entry.path().display());
                return false;
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_walk_filters_by_extension() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("b.mp3"), b"").unwrap();
        std::fs::write(dir.path().join("a.txt"), b"").unwrap();
        std::fs::write(dir.path().join("nested/c.ogg"), b"").unwrap();
        std::fs::write(dir.path().join(".DS_Store"), b"").unwrap();

        let files = AudioFileWalker::new("test").walk(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["b.mp3", "c.ogg"]);
    }

    #[test]
    fn test_walk_missing_root() {
        let dir = TempDir::new().unwrap();
        let result = AudioFileWalker::new("test").walk(&dir.path().join("absent"));
        assert!(matches!(result, Err(SourceError::MissingMediaDir(_))));
    }
}

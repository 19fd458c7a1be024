//! Source discovery for directory inserts
//!
//! A directory insert includes every file of the directory whose name matches one of
//! the source patterns. The listing is read when the directive is evaluated, never
//! cached.

use crate::error::FolioError;
use glob::Pattern;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// File name patterns of sources when no configuration says otherwise.
pub const DEFAULT_SOURCE_PATTERNS: &[&str] = &["*.nlp", "*.novella"];

/// Compiled file name patterns.
#[derive(Debug, Clone)]
pub struct SourcePatterns {
    patterns: Vec<Pattern>,
}

impl SourcePatterns {
    pub fn new<I, S>(patterns: I) -> Result<Self, FolioError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                Pattern::new(pattern).map_err(|e| {
                    FolioError::config_error(format!("Invalid glob pattern '{pattern}': {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// True when the file name of `path` matches a pattern.
    pub fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| name.to_string_lossy())
            .is_some_and(|name| self.patterns.iter().any(|p| p.matches(&name)))
    }

    /// Lists matching files under `directory`, descending into subdirectories when
    /// `recurse` is set. Hidden entries are skipped. The order is unspecified.
    pub fn scan(&self, directory: &Path, recurse: bool) -> Result<Vec<PathBuf>, FolioError> {
        if !directory.is_dir() {
            return Err(FolioError::io_error(
                directory,
                std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            ));
        }

        let mut walker = WalkDir::new(directory).min_depth(1);
        if !recurse {
            walker = walker.max_depth(1);
        }

        let mut files = Vec::new();
        let entries = walker
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()));
        for entry in entries {
            match entry {
                Ok(entry) if entry.file_type().is_file() && self.matches(entry.path()) => {
                    files.push(entry.into_path());
                }
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable entry under {}: {e}", directory.display()),
            }
        }
        debug!(directory = %directory.display(), files = ?files, "Scanned sources");
        Ok(files)
    }
}

impl Default for SourcePatterns {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_SOURCE_PATTERNS
                .iter()
                .filter_map(|pattern| Pattern::new(pattern).ok())
                .collect(),
        }
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sorted(mut files: Vec<PathBuf>, root: &Path) -> Vec<String> {
        files.sort();
        files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    fn layout() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::create_dir_all(dir.path().join(".hidden")).unwrap();
        for file in ["a.nlp", "b.novella", "c.txt", "sub/d.nlp", ".hidden/e.nlp", ".f.nlp"] {
            fs::write(dir.path().join(file), "").unwrap();
        }
        dir
    }

    #[test]
    fn test_scan_flat() {
        let dir = layout();
        let files = SourcePatterns::default().scan(dir.path(), false).unwrap();
        assert_eq!(sorted(files, dir.path()), vec!["a.nlp", "b.novella"]);
    }

    #[test]
    fn test_scan_recursive() {
        let dir = layout();
        let files = SourcePatterns::default().scan(dir.path(), true).unwrap();
        assert_eq!(sorted(files, dir.path()), vec!["a.nlp", "b.novella", "sub/d.nlp"]);
    }

    #[test]
    fn test_custom_patterns() {
        let dir = layout();
        let patterns = SourcePatterns::new(["*.txt"]).unwrap();
        let files = patterns.scan(dir.path(), false).unwrap();
        assert_eq!(sorted(files, dir.path()), vec!["c.txt"]);

        assert!(SourcePatterns::new(["[unclosed"]).is_err());
    }

    #[test]
    fn test_scan_missing_directory() {
        let dir = TempDir::new().unwrap();
        let error = SourcePatterns::default()
            .scan(&dir.path().join("missing"), true)
            .unwrap_err();
        assert_eq!(error.kind(), crate::error::ErrorKind::Io);
    }
}

//! Input file discovery for ephemeris batches
//!
//! Lists the eligible input files of a batch once, up front. Only the top
//! level of the input directory is scanned.

use crate::constants::INPUT_EXTENSION;
use crate::error::{EphemerisError, Result};
use glob::Pattern;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// File discovery component for ephemeris batches
#[derive(Debug)]
pub struct FileDiscovery {
    input_dir: PathBuf,
    pattern: Pattern,
}

impl FileDiscovery {
    /// Create a discovery for `input_dir`, matching file names against `pattern`
    pub fn new(input_dir: PathBuf, pattern: &str) -> Result<Self> {
        let pattern = Pattern::new(pattern).map_err(|e| EphemerisError::Configuration {
            message: format!("invalid input pattern '{}': {}", pattern, e),
        })?;
        Ok(Self { input_dir, pattern })
    }

    /// Discover all eligible input files, sorted by path
    ///
    /// ```text
    /// input/
    ///   MEME_44714_STARLINK-1008_..._UNCLASSIFIED.txt   <- converted
    ///   MANIFEST.txt                                    <- attempted, fails on its name
    ///   notes.md                                        <- ignored
    ///   nested/                                         <- not descended into
    /// ```
    pub fn discover_input_files(&self) -> Result<Vec<PathBuf>> {
        if !self.input_dir.is_dir() {
            return Err(EphemerisError::InputNotFound {
                path: self.input_dir.clone(),
            });
        }

        debug!("Searching for input files in: {}", self.input_dir.display());

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.input_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                EphemerisError::Io(
                    e.into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("directory walk failed")),
                )
            })?;

            if entry.file_type().is_file() && self.is_eligible(entry.path()) {
                files.push(entry.into_path());
            }
        }

        debug!("Found {} input files", files.len());
        Ok(files)
    }

    fn is_eligible(&self, path: &Path) -> bool {
        is_input_file(path)
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| self.pattern.matches(name))
    }
}

/// Check if a path carries the input extension
fn is_input_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == INPUT_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_input(temp_dir: &TempDir) -> PathBuf {
        let input = temp_dir.path().join("input");
        fs::create_dir_all(input.join("nested")).unwrap();

        fs::write(input.join("b_file.txt"), "b").unwrap();
        fs::write(input.join("a_file.txt"), "a").unwrap();
        fs::write(input.join("notes.md"), "ignored").unwrap();
        fs::write(input.join("nested").join("deep.txt"), "ignored").unwrap();

        input
    }

    #[test]
    fn test_discover_input_files_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let input = create_test_input(&temp_dir);

        let discovery = FileDiscovery::new(input, "*.txt").unwrap();
        let files = discovery.discover_input_files().unwrap();

        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a_file.txt", "b_file.txt"]);
    }

    #[test]
    fn test_pattern_narrows_selection() {
        let temp_dir = TempDir::new().unwrap();
        let input = create_test_input(&temp_dir);

        let discovery = FileDiscovery::new(input, "b_*").unwrap();
        let files = discovery.discover_input_files().unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let discovery = FileDiscovery::new(temp_dir.path().to_path_buf(), "*.txt").unwrap();
        assert!(discovery.discover_input_files().unwrap().is_empty());
    }

    #[test]
    fn test_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");
        let discovery = FileDiscovery::new(missing.clone(), "*.txt").unwrap();

        match discovery.discover_input_files() {
            Err(EphemerisError::InputNotFound { path }) => assert_eq!(path, missing),
            other => panic!("Expected InputNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_is_input_file() {
        assert!(is_input_file(Path::new("a.txt")));
        assert!(!is_input_file(Path::new("a.TXT"))); // Case sensitive
        assert!(!is_input_file(Path::new("a.parquet")));
        assert!(!is_input_file(Path::new("a")));
    }
}

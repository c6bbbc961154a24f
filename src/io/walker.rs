use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::config::default_excluded_dirs;
use crate::errors::Result;

/// Repository file discovery.
///
/// Honors `.gitignore` inside git checkouts, never descends into excluded
/// directories (dependency caches, build output, VCS metadata) and applies
/// glob ignore patterns against the full path.
#[derive(Debug, Clone)]
pub struct FileWalker {
    root: PathBuf,
    extensions: Vec<String>,
    excluded_dirs: Vec<String>,
    ignore_patterns: Vec<glob::Pattern>,
}

impl FileWalker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: Vec::new(),
            excluded_dirs: default_excluded_dirs(),
            ignore_patterns: Vec::new(),
        }
    }

    /// Restrict results to these extensions (no leading dot). Empty means
    /// every file.
    pub fn with_extensions(mut self, extensions: &[&str]) -> Self {
        self.extensions = extensions.iter().map(|e| e.to_string()).collect();
        self
    }

    pub fn with_excluded_dirs(mut self, dirs: Vec<String>) -> Self {
        self.excluded_dirs = dirs;
        self
    }

    /// Invalid glob patterns are skipped.
    pub fn with_ignore_patterns(mut self, patterns: &[String]) -> Self {
        self.ignore_patterns = patterns
            .iter()
            .filter_map(|p| match glob::Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    tracing::warn!("Ignoring invalid pattern {}: {}", p, e);
                    None
                }
            })
            .collect();
        self
    }

    pub fn walk(&self) -> Result<Vec<PathBuf>> {
        let excluded = self.excluded_dirs.clone();
        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(true)
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                let name = entry.file_name().to_str().unwrap_or("");
                !(is_dir && excluded.iter().any(|d| d == name))
            })
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && self.should_process(path) {
                files.push(path.to_path_buf());
            }
        }
        files.sort();
        Ok(files)
    }

    fn should_process(&self, path: &Path) -> bool {
        if !self.extensions.is_empty() {
            let matches_ext = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| self.extensions.iter().any(|e| e == ext));
            if !matches_ext {
                return false;
            }
        }

        let path_str = path.to_string_lossy();
        !self.ignore_patterns.iter().any(|p| p.matches(&path_str))
    }
}

/// Read a file as text, replacing invalid UTF-8
pub fn read_lossy(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_filters_by_extension_and_excluded_dirs() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/app.py", "x = 1");
        write(dir.path(), "src/app.js", "let x = 1;");
        write(dir.path(), "node_modules/lib/index.js", "module.exports = 1;");
        write(dir.path(), "venv/lib/site.py", "x = 2");

        let files = FileWalker::new(dir.path())
            .with_extensions(&["py", "js"])
            .walk()
            .unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["src/app.js", "src/app.py"]);
    }

    #[test]
    fn test_ignore_patterns_applied() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "keep.py", "a = 1");
        write(dir.path(), "fixtures/skip.py", "b = 2");

        let files = FileWalker::new(dir.path())
            .with_extensions(&["py"])
            .with_ignore_patterns(&["**/fixtures/**".to_string()])
            .walk()
            .unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("keep.py"));
    }

    #[test]
    fn test_hidden_files_included() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".github/workflows/ci.yml", "on: push");
        let files = FileWalker::new(dir.path()).walk().unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_read_lossy_replaces_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bin.py");
        fs::write(&path, [b'a', 0xff, b'b']).unwrap();
        assert_eq!(read_lossy(&path).unwrap(), "a\u{fffd}b");
    }
}

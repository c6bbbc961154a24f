//! Entry-point files: per-file complexity and Halstead figures for the
//! modules a reader opens first.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde_json::Map;
use tracing::debug;

use super::{AnalyzerOutput, RepoAnalyzer, RepoContext};
use crate::complexity::{file_report, FileReport, SourceFile};
use crate::errors::Result;

const ENTRY_POINT_NAMES: &[&str] = &[
    "__main__.py",
    "cli.py",
    "main.py",
    "app.py",
    "server.js",
    "index.js",
    "main.js",
    "app.js",
];

/// Extensions of modules picked up directly under the root or `src/`
const TOP_LEVEL_EXTENSIONS: &[&str] = &["py", "js", "ts"];

fn is_top_level_module(root: &Path, path: &Path) -> bool {
    let parent = path.parent();
    let in_top_dir = parent == Some(root) || parent == Some(root.join("src").as_path());
    in_top_dir
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| TOP_LEVEL_EXTENSIONS.contains(&e))
}

/// Entry points anywhere in the tree plus top-level modules, test files
/// excluded
pub fn find_main_files(ctx: &RepoContext) -> Result<Vec<PathBuf>> {
    let files: BTreeSet<PathBuf> = ctx
        .all_files()?
        .into_iter()
        .filter(|path| {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            !name.starts_with("test")
                && (ENTRY_POINT_NAMES.contains(&name) || is_top_level_module(ctx.root, path))
        })
        .collect();
    Ok(files.into_iter().collect())
}

pub struct MainFilesAnalyzer;

impl RepoAnalyzer for MainFilesAnalyzer {
    fn name(&self) -> &'static str {
        "main_files"
    }

    fn description(&self) -> &'static str {
        "Measuring entry-point files"
    }

    fn analyze(&self, ctx: &RepoContext) -> Result<AnalyzerOutput> {
        let mut reports: Vec<FileReport> = Vec::new();
        for path in find_main_files(ctx)? {
            let Some(text) = ctx.read(&path) else { continue };
            let shown = ctx.display_path(&path);
            match file_report(&SourceFile::new(&path, text), &shown) {
                Ok(report) => reports.push(report),
                Err(e) => debug!("No complexity figures for {}: {}", shown, e),
            }
        }

        let mut values = Map::new();
        values.insert("main_files".into(), serde_json::to_value(reports)?);
        Ok(AnalyzerOutput::top_level(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QualityConfig;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_main_file_selection() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join("pkg").join("deep")).unwrap();
        fs::write(root.join("setup.py"), "").unwrap();
        fs::write(root.join("test_setup.py"), "").unwrap();
        fs::write(root.join("src").join("index.ts"), "").unwrap();
        fs::write(root.join("pkg").join("helpers.py"), "").unwrap();
        fs::write(root.join("pkg").join("deep").join("cli.py"), "").unwrap();
        fs::write(root.join("README.md"), "").unwrap();

        let config = QualityConfig::default();
        let ctx = RepoContext::new(root, &config);
        let names: Vec<String> = find_main_files(&ctx)
            .unwrap()
            .iter()
            .map(|p| ctx.display_path(p))
            .collect();
        assert_eq!(names, vec!["pkg/deep/cli.py", "setup.py", "src/index.ts"]);
    }

    #[test]
    fn test_reports_complexity_per_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("main.py"),
            "def run(x):\n    if x:\n        return 1\n    return 0\n",
        )
        .unwrap();

        let config = QualityConfig::default();
        let output = MainFilesAnalyzer
            .analyze(&RepoContext::new(dir.path(), &config))
            .unwrap();
        let files = output.values["main_files"].as_array().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0]["file"], "main.py");
        assert_eq!(files[0]["functions"], 1);
        assert_eq!(files[0]["max_ccn"], 2);
    }
}

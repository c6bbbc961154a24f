// Shared helpers for repo-quality integration tests
#![allow(dead_code)]

use std::fs;
use std::path::Path;

use repo_quality::config::QualityConfig;
use repo_quality::metrics::MetricsBundle;
use repo_quality::scoring::{compute_scores, ScoreBundle};
use serde_json::Value;
use tempfile::TempDir;

/// Score a JSON literal with the default weight table
pub fn score(metrics: Value) -> ScoreBundle {
    compute_scores(&MetricsBundle::from_value(metrics).expect("metrics must be an object"))
}

pub fn assert_close(actual: Option<f64>, expected: f64) {
    let actual = actual.unwrap_or_else(|| panic!("expected {}, got null", expected));
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {}, got {}",
        expected,
        actual
    );
}

/// Temporary repository populated from `(relative path, contents)` pairs
pub fn repo_with_files(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("create temp dir");
    for (relative, contents) in files {
        write_file(dir.path(), relative, contents);
    }
    dir
}

pub fn write_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    fs::write(path, contents).expect("write fixture");
}

/// Configuration with the external tools switched off, so tests never
/// depend on lizard or semgrep being installed
pub fn offline_config() -> QualityConfig {
    let mut config = QualityConfig::default();
    config.tools.lizard = false;
    config.tools.semgrep = false;
    config
}

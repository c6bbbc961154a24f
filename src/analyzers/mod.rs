//! Repository analyzers
//!
//! Each analyzer inspects a checked-out repository and returns its own
//! key/value mapping. The pipeline folds those mappings into one
//! `MetricsBundle`; an analyzer that errors simply contributes nothing.

pub mod api_quality;
pub mod ci_cd;
pub mod compliance;
pub mod config_files;
pub mod coverage;
pub mod dependencies;
pub mod documentation;
pub mod lizard;
pub mod main_files;
pub mod monitoring;
pub mod semgrep;
pub mod static_findings;
pub mod testing_quality;

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;

use crate::config::QualityConfig;
use crate::errors::Result;
use crate::io::{read_lossy, FileWalker};
use crate::metrics::MetricsBundle;

/// Extensions of every source language the analyzers understand
pub const SOURCE_EXTENSIONS: &[&str] = &["py", "js", "jsx", "ts", "tsx", "mjs", "cjs"];
pub const PYTHON_EXTENSIONS: &[&str] = &["py"];
pub const SCRIPT_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs", "cjs"];

/// What an analyzer sees: the repository root and the active configuration
#[derive(Debug, Clone, Copy)]
pub struct RepoContext<'a> {
    pub root: &'a Path,
    pub config: &'a QualityConfig,
}

impl<'a> RepoContext<'a> {
    pub fn new(root: &'a Path, config: &'a QualityConfig) -> Self {
        Self { root, config }
    }

    pub fn walker(&self) -> FileWalker {
        FileWalker::new(self.root)
            .with_excluded_dirs(self.config.analysis.excluded_dirs.clone())
            .with_ignore_patterns(&self.config.analysis.ignore_patterns)
    }

    pub fn files_with_extensions(&self, extensions: &[&str]) -> Result<Vec<PathBuf>> {
        self.walker().with_extensions(extensions).walk()
    }

    /// Every non-excluded file in the repository
    pub fn all_files(&self) -> Result<Vec<PathBuf>> {
        self.walker().walk()
    }

    /// Read a file, logging and skipping it when unreadable
    pub fn read(&self, path: &Path) -> Option<String> {
        match read_lossy(path) {
            Ok(text) => Some(text),
            Err(e) => {
                debug!("Skipping unreadable {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Slash-separated path relative to the root, for reports
    pub fn display_path(&self, path: &Path) -> String {
        let relative = path.strip_prefix(self.root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.root.join(relative).exists()
    }

    pub fn any_exists(&self, candidates: &[&str]) -> bool {
        candidates.iter().any(|c| self.exists(c))
    }
}

/// Where an analyzer's keys land in the bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    TopLevel,
    /// Nested under the named key
    Section(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerOutput {
    pub placement: Placement,
    pub values: Map<String, Value>,
}

impl AnalyzerOutput {
    pub fn top_level(values: Map<String, Value>) -> Self {
        Self {
            placement: Placement::TopLevel,
            values,
        }
    }

    pub fn section(name: &'static str, values: Map<String, Value>) -> Self {
        Self {
            placement: Placement::Section(name),
            values,
        }
    }

    /// Fold this output into `bundle`; keys already present are kept
    pub fn apply(self, bundle: MetricsBundle) -> MetricsBundle {
        match self.placement {
            Placement::TopLevel => bundle.merge_top_level(self.values),
            Placement::Section(name) => bundle.with_section(name, self.values),
        }
    }
}

pub trait RepoAnalyzer {
    fn name(&self) -> &'static str;

    /// Progress message shown while the analyzer runs
    fn description(&self) -> &'static str {
        self.name()
    }

    fn analyze(&self, ctx: &RepoContext) -> Result<AnalyzerOutput>;
}

/// Analyzers in pipeline order. External tools are left out when disabled.
pub fn default_analyzers(config: &QualityConfig) -> Vec<Box<dyn RepoAnalyzer>> {
    let mut analyzers: Vec<Box<dyn RepoAnalyzer>> = Vec::new();
    if config.tools.lizard {
        analyzers.push(Box::new(lizard::LizardAnalyzer));
    }
    if config.tools.semgrep {
        analyzers.push(Box::new(semgrep::SemgrepAnalyzer));
    }
    analyzers.push(Box::new(static_findings::StaticFindingsAnalyzer));
    analyzers.push(Box::new(config_files::ConfigFilesAnalyzer));
    analyzers.push(Box::new(dependencies::JsDependenciesAnalyzer));
    analyzers.push(Box::new(dependencies::PythonDependenciesAnalyzer));
    analyzers.push(Box::new(coverage::CoverageAnalyzer));
    analyzers.push(Box::new(testing_quality::TestingQualityAnalyzer));
    analyzers.push(Box::new(documentation::DocumentationAnalyzer));
    analyzers.push(Box::new(ci_cd::CiCdAnalyzer));
    analyzers.push(Box::new(compliance::ComplianceAnalyzer));
    analyzers.push(Box::new(api_quality::ApiQualityAnalyzer));
    analyzers.push(Box::new(monitoring::MonitoringAnalyzer));
    analyzers.push(Box::new(main_files::MainFilesAnalyzer));
    analyzers
}

/// Unwrap a `json!` object literal into its map
pub(crate) fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Round to one decimal, the precision analyzers report percentages with
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Four-band label shared by the 0-100 analyzer scores
pub(crate) fn quality_label(score: f64) -> &'static str {
    if score >= 80.0 {
        "Excellent"
    } else if score >= 60.0 {
        "Good"
    } else if score >= 40.0 {
        "Fair"
    } else {
        "Poor"
    }
}

/// Percentage of `part` in `whole`, 0 when `whole` is 0
pub(crate) fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_output_placement() {
        let mut values = Map::new();
        values.insert("x".into(), json!(1));

        let bundle = AnalyzerOutput::top_level(values.clone()).apply(MetricsBundle::new());
        assert_eq!(bundle.get("x"), Some(&json!(1)));

        let bundle = AnalyzerOutput::section("coverage_analysis", values).apply(MetricsBundle::new());
        assert_eq!(bundle.section("coverage_analysis").unwrap().get("x"), Some(&json!(1)));
    }

    #[test]
    fn test_default_analyzers_respect_tool_switches() {
        let mut config = QualityConfig::default();
        let names: Vec<_> = default_analyzers(&config).iter().map(|a| a.name()).collect();
        assert_eq!(names[0], "lizard");
        assert_eq!(names[1], "semgrep");

        config.tools.lizard = false;
        config.tools.semgrep = false;
        let names: Vec<_> = default_analyzers(&config).iter().map(|a| a.name()).collect();
        assert!(!names.contains(&"lizard"));
        assert!(!names.contains(&"semgrep"));
        assert!(names.contains(&"config_files"));
    }

    #[test]
    fn test_display_path_is_relative() {
        let dir = TempDir::new().unwrap();
        let config = QualityConfig::default();
        let ctx = RepoContext::new(dir.path(), &config);
        assert_eq!(ctx.display_path(&dir.path().join("src").join("a.py")), "src/a.py");
    }

    #[test]
    fn test_percent_and_round() {
        assert_eq!(percent(1, 3), 100.0 / 3.0);
        assert_eq!(percent(1, 0), 0.0);
        assert_eq!(round1(33.333), 33.3);
    }

    #[test]
    fn test_quality_label_bands() {
        assert_eq!(quality_label(80.0), "Excellent");
        assert_eq!(quality_label(79.9), "Good");
        assert_eq!(quality_label(40.0), "Fair");
        assert_eq!(quality_label(0.0), "Poor");
    }
}

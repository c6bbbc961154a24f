//! Configuration for repo-quality
//!
//! Settings come from an optional `.repo-quality.toml`. Every field has a
//! default, so an empty or missing file yields the stock behaviour.

pub mod loader;
pub mod weights;

use serde::{Deserialize, Serialize};

pub use loader::{load_config, load_config_from, parse_and_validate_config, CONFIG_FILE_NAME};
pub use weights::WeightTable;

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityConfig {
    #[serde(default)]
    pub weights: WeightTable,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

/// Source discovery and fallback limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Upper bound on files handed to complexity tools
    #[serde(default = "default_max_complexity_files")]
    pub max_complexity_files: usize,

    /// Glob patterns excluded from every walk
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Directory names never descended into
    #[serde(default = "default_excluded_dirs")]
    pub excluded_dirs: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_complexity_files: default_max_complexity_files(),
            ignore_patterns: Vec::new(),
            excluded_dirs: default_excluded_dirs(),
        }
    }
}

/// External tool switches and time budgets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_true")]
    pub lizard: bool,

    #[serde(default = "default_true")]
    pub semgrep: bool,

    /// Per-tool subprocess timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_timeout_secs")]
    pub clone_timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            lizard: true,
            semgrep: true,
            timeout_secs: default_timeout_secs(),
            clone_timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_max_complexity_files() -> usize {
    200
}

pub(crate) fn default_excluded_dirs() -> Vec<String> {
    [
        "node_modules",
        ".git",
        "venv",
        ".venv",
        "env",
        "__pycache__",
        "dist",
        "build",
        "target",
        ".tox",
        "site-packages",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    300
}

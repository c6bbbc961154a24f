//! Lightweight complexity estimation from raw source files
//!
//! Two strategies are available, selected by file extension:
//! - `Strategy::Python` walks a tree-sitter parse tree
//! - `Strategy::Script` counts decision tokens in JavaScript/TypeScript text
//!
//! Both produce the same per-function shape, which `estimate` aggregates into
//! average complexity, the share of functions above the threshold, parameter
//! overflow, line duplication and Halstead figures.

pub mod duplication;
pub mod halstead;
pub mod parser;
pub mod python;
pub mod script;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use duplication::LineUniqueness;
use halstead::{round2, HalsteadCounts, HalsteadMetrics};

/// Functions with cyclomatic complexity above this count as overly complex
pub const COMPLEXITY_THRESHOLD: u32 = 10;

/// Functions declaring more parameters than this count as parameter overflow
pub const PARAMETER_LIMIT: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Python,
    Script,
}

impl Strategy {
    /// Order in which strategies are attempted
    pub const ORDER: [Strategy; 2] = [Strategy::Python, Strategy::Script];

    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Python => &["py"],
            Self::Script => &["js", "jsx", "mjs", "cjs", "ts", "tsx"],
        }
    }

    pub fn for_extension(ext: &str) -> Option<Self> {
        Self::ORDER
            .into_iter()
            .find(|strategy| strategy.extensions().contains(&ext))
    }

    pub fn for_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::for_extension)
    }

    pub fn analyze(self, path: &Path, source: &str) -> Result<FileAnalysis> {
        match self {
            Self::Python => python::analyze(source),
            Self::Script => script::analyze(path, source),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Python => write!(f, "Python"),
            Self::Script => write!(f, "JavaScript/TypeScript"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionComplexity {
    pub name: String,
    pub line: usize,
    pub decisions: u32,
    pub params: usize,
}

impl FunctionComplexity {
    pub fn cyclomatic(&self) -> u32 {
        1 + self.decisions
    }
}

#[derive(Debug, Clone, Default)]
pub struct FileAnalysis {
    pub functions: Vec<FunctionComplexity>,
    pub halstead: HalsteadCounts,
}

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// Aggregate estimate over every file of one strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEstimate {
    pub strategy: Strategy,
    pub files_analyzed: usize,
    pub function_count: usize,
    pub avg_ccn: f64,
    pub max_ccn: u32,
    pub pct_ccn_gt_10: f64,
    pub functions_gt_7_params: usize,
    pub total_lines: usize,
    pub unique_lines: usize,
    pub duplication_pct: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub halstead: Option<HalsteadMetrics>,
}

/// Run `strategy` over `files`. Returns `None` when no function was found,
/// in which case the caller should try the next strategy.
pub fn estimate(strategy: Strategy, files: &[SourceFile]) -> Option<SourceEstimate> {
    let mut lines = LineUniqueness::new();
    let mut halstead = HalsteadCounts::default();
    let mut ccns = Vec::new();
    let mut params_over_limit = 0;
    let mut files_analyzed = 0;

    for file in files {
        lines.add_source(&file.text);
        let analysis = match strategy.analyze(&file.path, &file.text) {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::debug!("Skipping {}: {}", file.path.display(), e);
                continue;
            }
        };
        files_analyzed += 1;
        params_over_limit += analysis
            .functions
            .iter()
            .filter(|f| f.params > PARAMETER_LIMIT)
            .count();
        ccns.extend(analysis.functions.iter().map(FunctionComplexity::cyclomatic));
        halstead.merge(analysis.halstead);
    }

    let stats = ComplexityStats::from_ccns(&ccns)?;
    Some(SourceEstimate {
        strategy,
        files_analyzed,
        function_count: ccns.len(),
        avg_ccn: stats.avg,
        max_ccn: stats.max,
        pct_ccn_gt_10: stats.pct_over_threshold,
        functions_gt_7_params: params_over_limit,
        total_lines: lines.total_lines(),
        unique_lines: lines.unique_lines(),
        duplication_pct: lines.duplication_pct().unwrap_or(0.0),
        halstead: halstead.metrics(),
    })
}

/// Summary statistics over per-function cyclomatic complexities
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComplexityStats {
    pub avg: f64,
    pub max: u32,
    pub pct_over_threshold: f64,
}

impl ComplexityStats {
    pub fn from_ccns(ccns: &[u32]) -> Option<Self> {
        if ccns.is_empty() {
            return None;
        }
        let count = ccns.len() as f64;
        let sum: u32 = ccns.iter().sum();
        let over = ccns.iter().filter(|&&c| c > COMPLEXITY_THRESHOLD).count();
        Some(Self {
            avg: sum as f64 / count,
            max: ccns.iter().copied().max().unwrap_or(0),
            pct_over_threshold: over as f64 / count * 100.0,
        })
    }
}

/// Per-file complexity and Halstead summary, used for entry-point files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileReport {
    pub file: String,
    pub functions: usize,
    pub avg_ccn: Option<f64>,
    pub max_ccn: Option<u32>,
    pub halstead: Option<HalsteadMetrics>,
}

pub fn file_report(file: &SourceFile, display_path: &str) -> Result<FileReport> {
    let strategy = Strategy::for_path(&file.path).unwrap_or(Strategy::Script);
    let analysis = strategy.analyze(&file.path, &file.text)?;
    let ccns: Vec<u32> = analysis
        .functions
        .iter()
        .map(FunctionComplexity::cyclomatic)
        .collect();
    let stats = ComplexityStats::from_ccns(&ccns);

    Ok(FileReport {
        file: display_path.to_string(),
        functions: ccns.len(),
        avg_ccn: stats.map(|s| round2(s.avg)),
        max_ccn: stats.map(|s| s.max),
        halstead: analysis.halstead.metrics(),
    })
}

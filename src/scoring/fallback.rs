//! Fallback complexity/duplication estimate from raw sources.
//!
//! Used only when maintainability cannot be computed from analyzer metrics.
//! Strategies are tried in `Strategy::ORDER`; the first one that finds at
//! least one function supplies the estimate.

use std::path::Path;

use tracing::{debug, info, warn};

use super::core::{complexity_score, duplication_score, maintainability_score};
use crate::complexity::{self, SourceEstimate, SourceFile, Strategy};
use crate::config::{default_excluded_dirs, AnalysisConfig};
use crate::errors::Result;
use crate::io::{read_lossy, FileWalker};

#[derive(Debug, Clone)]
pub struct FallbackOptions {
    pub excluded_dirs: Vec<String>,
    pub ignore_patterns: Vec<String>,
}

impl Default for FallbackOptions {
    fn default() -> Self {
        Self {
            excluded_dirs: default_excluded_dirs(),
            ignore_patterns: Vec::new(),
        }
    }
}

impl From<&AnalysisConfig> for FallbackOptions {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            excluded_dirs: config.excluded_dirs.clone(),
            ignore_patterns: config.ignore_patterns.clone(),
        }
    }
}

/// Scores derived from a fallback estimate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackScores {
    pub ccn: f64,
    pub dup: f64,
    pub maint: f64,
}

impl FallbackScores {
    pub fn from_estimate(estimate: &SourceEstimate) -> Option<Self> {
        let ccn = complexity_score(Some(estimate.avg_ccn), Some(estimate.pct_ccn_gt_10))?;
        let dup = duplication_score(Some(estimate.duplication_pct))?;
        let maint = maintainability_score(Some(ccn), Some(dup))?;
        Some(Self { ccn, dup, maint })
    }
}

/// Walk `root` once per strategy and return the first usable estimate
pub fn estimate_repository(root: &Path, options: &FallbackOptions) -> Option<SourceEstimate> {
    if !root.is_dir() {
        warn!("Fallback root {} is not a directory", root.display());
        return None;
    }

    for strategy in Strategy::ORDER {
        let files = match collect_sources(root, strategy, options) {
            Ok(files) => files,
            Err(e) => {
                warn!("Failed to collect {} sources: {}", strategy, e);
                continue;
            }
        };
        if files.is_empty() {
            continue;
        }

        match complexity::estimate(strategy, &files) {
            Some(estimate) => {
                info!(
                    "Fallback {} pass: {} functions in {} files, avg complexity {:.2}",
                    strategy, estimate.function_count, estimate.files_analyzed, estimate.avg_ccn
                );
                return Some(estimate);
            }
            None => debug!("{} pass found no functions", strategy),
        }
    }
    None
}

fn collect_sources(root: &Path, strategy: Strategy, options: &FallbackOptions) -> Result<Vec<SourceFile>> {
    let paths = FileWalker::new(root)
        .with_extensions(strategy.extensions())
        .with_excluded_dirs(options.excluded_dirs.clone())
        .with_ignore_patterns(&options.ignore_patterns)
        .walk()?;

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        match read_lossy(&path) {
            Ok(text) => files.push(SourceFile { path, text }),
            Err(e) => debug!("Skipping unreadable {}: {}", path.display(), e),
        }
    }
    Ok(files)
}

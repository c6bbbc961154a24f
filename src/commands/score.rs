use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use super::resolve_config;
use crate::metrics::MetricsBundle;
use crate::report::write_report;
use crate::scoring::{compute_scores_with, FallbackOptions, ScoreBundle};

#[derive(Debug, Clone)]
pub struct ScoreConfig {
    pub metrics: PathBuf,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

pub fn load_metrics(path: &std::path::Path) -> Result<MetricsBundle> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))?;
    let bundle = MetricsBundle::from_value(value)?;
    debug!("Loaded {} metrics from {}", bundle.len(), path.display());
    Ok(bundle)
}

pub fn run_score(config: &ScoreConfig) -> Result<ScoreBundle> {
    let quality_config = resolve_config(config.config.as_deref())?;
    let metrics = load_metrics(&config.metrics)?;
    Ok(compute_scores_with(
        &metrics,
        &quality_config.weights,
        &FallbackOptions::from(&quality_config.analysis),
    ))
}

pub fn handle_score(config: ScoreConfig) -> Result<()> {
    let bundle = run_score(&config)?;
    match &config.output {
        Some(path) => {
            write_report(path, &bundle)?;
            println!("Report written to {}", path.display());
        }
        None => println!("{}", bundle.to_json()?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_rejects_non_object_bundle() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metrics.json");
        fs::write(&path, "[1, 2, 3]").unwrap();
        let err = load_metrics(&path).unwrap_err();
        assert!(err.to_string().contains("must be a JSON object"));
    }

    #[test]
    fn test_scores_bundle_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metrics.json");
        fs::write(&path, r#"{"avg_ccn": 4, "pct_ccn_gt_10": 5, "duplication_pct": 10}"#).unwrap();
        let bundle = run_score(&ScoreConfig {
            metrics: path,
            output: None,
            config: None,
        })
        .unwrap();
        assert_eq!(bundle.scores.ccn_score, Some(75.0));
        assert_eq!(bundle.scores.dup_score, Some(90.0));
        assert!((bundle.scores.maint_score.unwrap() - 81.0).abs() < 1e-9);
    }
}

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, info_span, warn};

use super::resolve_config;
use crate::io::{prepare_workspace, write_file};
use crate::pipeline;
use crate::progress::{ProgressConfig, ProgressManager};
use crate::report::{format_number, print_summary, write_report};
use crate::scoring::ScoreBundle;

#[derive(Debug, Clone)]
pub struct AssessConfig {
    pub repo: String,
    pub output: PathBuf,
    pub fail_under: Option<f64>,
    pub config: Option<PathBuf>,
    pub json: Option<PathBuf>,
    pub keep_clone: bool,
    pub quiet: bool,
}

#[derive(Debug)]
pub struct AssessOutcome {
    pub bundle: ScoreBundle,
    /// Location of a kept clone, when `keep_clone` was requested for a URL
    pub kept_clone: Option<PathBuf>,
}

impl AssessOutcome {
    /// A null overall score never passes a threshold
    pub fn meets(&self, fail_under: Option<f64>) -> bool {
        match fail_under {
            None => true,
            Some(threshold) => self.bundle.overall_score.is_some_and(|s| s >= threshold),
        }
    }
}

pub fn run_assess(config: &AssessConfig) -> Result<AssessOutcome> {
    let _span = info_span!("assess", repo = %config.repo).entered();
    let quality_config = resolve_config(config.config.as_deref())?;
    let progress = ProgressManager::new(ProgressConfig::from_env(config.quiet));

    let spinner = progress.create_spinner("Preparing repository");
    let workspace = prepare_workspace(&config.repo, quality_config.tools.clone_timeout_secs)
        .with_context(|| format!("Failed to prepare {}", config.repo))?;
    spinner.finish_and_clear();
    info!("Analyzing {}", workspace.root().display());

    let bundle = pipeline::assess(workspace.root(), &quality_config, &progress);

    let spinner = progress.create_spinner("Writing report");
    write_report(&config.output, &bundle)?;
    if let Some(json_path) = &config.json {
        write_file(json_path, &bundle.to_json()?)
            .with_context(|| format!("Failed to write {}", json_path.display()))?;
    }
    spinner.finish_and_clear();
    if let Err(e) = progress.clear() {
        warn!("Failed to clear progress output: {}", e);
    }

    let kept_clone = if config.keep_clone && workspace.is_clone() {
        Some(workspace.persist())
    } else {
        None
    };

    Ok(AssessOutcome { bundle, kept_clone })
}

/// Run the command and print its results; returns whether the score met
/// `--fail-under`
pub fn handle_assess(config: AssessConfig) -> Result<bool> {
    let outcome = run_assess(&config)?;

    if !config.quiet {
        print_summary(&outcome.bundle);
    }
    println!("Report written to {}", config.output.display());
    if let Some(path) = &outcome.kept_clone {
        println!("Clone kept at {}", path.display());
    }
    println!("Overall Score: {}", format_number(outcome.bundle.overall_score));

    let passed = outcome.meets(config.fail_under);
    if let (false, Some(threshold)) = (passed, config.fail_under) {
        eprintln!(
            "Score {} is below threshold {}",
            format_number(outcome.bundle.overall_score),
            threshold
        );
    }
    Ok(passed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricsBundle;
    use crate::scoring::compute_scores;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn outcome(metrics: serde_json::Value) -> AssessOutcome {
        AssessOutcome {
            bundle: compute_scores(&MetricsBundle::from_value(metrics).unwrap()),
            kept_clone: None,
        }
    }

    #[test]
    fn test_threshold_check() {
        let clean = outcome(json!({}));
        assert!(clean.meets(None));
        assert!(clean.meets(Some(100.0)));

        let risky = outcome(json!({"security_critical": 3}));
        assert_eq!(risky.bundle.overall_score, Some(40.0));
        assert!(!risky.meets(Some(50.0)));
    }

    #[test]
    fn test_assess_local_directory_writes_report_and_json() {
        let repo = TempDir::new().unwrap();
        fs::write(repo.path().join("README.md"), "# Demo\n").unwrap();
        let tools_off = repo.path().join("quality.toml");
        fs::write(&tools_off, "[tools]\nlizard = false\nsemgrep = false\n").unwrap();

        let out = TempDir::new().unwrap();
        let config = AssessConfig {
            repo: repo.path().to_string_lossy().into_owned(),
            output: out.path().join("report.md"),
            fail_under: None,
            config: Some(tools_off),
            json: Some(out.path().join("scores.json")),
            keep_clone: true,
            quiet: true,
        };

        let outcome = run_assess(&config).unwrap();
        assert!(outcome.kept_clone.is_none());
        let report = fs::read_to_string(out.path().join("report.md")).unwrap();
        assert!(report.starts_with("# Code Quality Report"));

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.path().join("scores.json")).unwrap()).unwrap();
        assert_eq!(json["sec_score"], json!(100.0));
        assert!(json["metrics"]["repo_root"].is_string());
    }
}

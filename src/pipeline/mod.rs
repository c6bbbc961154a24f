//! Assessment pipeline.
//!
//! Runs every enabled analyzer against a repository root, folds their
//! outputs into one `MetricsBundle` and hands it to the scoring core. An
//! analyzer that fails is logged and contributes nothing; the run itself
//! never fails once the repository is on disk.

use std::path::Path;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, info, info_span, warn};

use crate::analyzers::{default_analyzers, RepoAnalyzer, RepoContext};
use crate::config::QualityConfig;
use crate::metrics::MetricsBundle;
use crate::progress::ProgressManager;
use crate::scoring::{compute_scores_with, FallbackOptions, ScoreBundle};

/// Run `analyzers` in order and merge their outputs
pub fn collect_metrics(
    root: &Path,
    config: &QualityConfig,
    analyzers: &[Box<dyn RepoAnalyzer>],
    progress: &ProgressManager,
) -> MetricsBundle {
    let ctx = RepoContext::new(root, config);
    let mut bundle = MetricsBundle::new();

    for analyzer in analyzers {
        let _span = info_span!("analyzer", name = analyzer.name()).entered();
        let spinner = progress.create_spinner(analyzer.description());
        let started = Instant::now();

        match analyzer.analyze(&ctx) {
            Ok(output) => {
                debug!(
                    "{} produced {} keys in {:?}",
                    analyzer.name(),
                    output.values.len(),
                    started.elapsed()
                );
                bundle = output.apply(bundle);
                spinner.finish_and_clear();
            }
            Err(e) => {
                warn!("{} analyzer failed: {}", analyzer.name(), e);
                spinner.abandon_with_message(format!("{} skipped", analyzer.description()));
            }
        }
    }

    let repo_root = root
        .canonicalize()
        .unwrap_or_else(|_| root.to_path_buf())
        .to_string_lossy()
        .into_owned();
    bundle.with_top_level("repo_root", Value::String(repo_root))
}

/// Analyze `root` with the default analyzer set and score the result
pub fn assess(root: &Path, config: &QualityConfig, progress: &ProgressManager) -> ScoreBundle {
    let analyzers = default_analyzers(config);
    info!("Running {} analyzers on {}", analyzers.len(), root.display());
    let metrics = collect_metrics(root, config, &analyzers, progress);

    let spinner = progress.create_spinner("Computing scores");
    let scores = compute_scores_with(
        &metrics,
        &config.weights,
        &FallbackOptions::from(&config.analysis),
    );
    spinner.finish_and_clear();
    scores
}

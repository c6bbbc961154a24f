//! Score composition
//!
//! `compute_scores` is the single entry point: it turns a merged
//! `MetricsBundle` into an immutable `ScoreBundle`. It never fails. Missing
//! or unusable metrics become null sub-scores, null sub-scores drop out of
//! the weighted composition, and only a bundle with no usable dimension at
//! all produces a null overall score.
//!
//! Stages:
//! 1. core sub-scores (`core`)
//! 2. analyzer sub-scores (`analyzers`)
//! 3. source fallback when maintainability is null (`fallback`)
//! 4. present-weighted composition and grades (`composer`, `grade`)

pub mod analyzers;
pub mod composer;
pub mod core;
pub mod fallback;
pub mod grade;

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::complexity::SourceEstimate;
use crate::config::WeightTable;
use crate::metrics::MetricsBundle;
pub use composer::{present_weighted_average, OverallInputs};
pub use fallback::{FallbackOptions, FallbackScores};
pub use grade::Grade;

/// Clamp a sub-score into [0, 100]
pub fn clamp_score(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// One quality dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Complexity,
    Duplication,
    Maintainability,
    Security,
    Structure,
    Coverage,
    Testing,
    Documentation,
    CiCd,
    Compliance,
    Api,
    Monitoring,
}

impl Dimension {
    pub const ALL: [Dimension; 12] = [
        Dimension::Complexity,
        Dimension::Duplication,
        Dimension::Maintainability,
        Dimension::Security,
        Dimension::Structure,
        Dimension::Coverage,
        Dimension::Testing,
        Dimension::Documentation,
        Dimension::CiCd,
        Dimension::Compliance,
        Dimension::Api,
        Dimension::Monitoring,
    ];

    /// Key prefix used in `<key>_score` / `<key>_grade`
    pub fn key(self) -> &'static str {
        match self {
            Self::Complexity => "ccn",
            Self::Duplication => "dup",
            Self::Maintainability => "maint",
            Self::Security => "sec",
            Self::Structure => "struct",
            Self::Coverage => "coverage",
            Self::Testing => "testing",
            Self::Documentation => "docs",
            Self::CiCd => "ci_cd",
            Self::Compliance => "compliance",
            Self::Api => "api",
            Self::Monitoring => "monitoring",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Complexity => "Complexity",
            Self::Duplication => "Duplication",
            Self::Maintainability => "Maintainability",
            Self::Security => "Security",
            Self::Structure => "Structure",
            Self::Coverage => "Test Coverage",
            Self::Testing => "Testing Quality",
            Self::Documentation => "Documentation",
            Self::CiCd => "CI/CD",
            Self::Compliance => "Compliance",
            Self::Api => "API Quality",
            Self::Monitoring => "Monitoring & Logging",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SubScores {
    pub ccn_score: Option<f64>,
    pub dup_score: Option<f64>,
    pub maint_score: Option<f64>,
    pub sec_score: Option<f64>,
    pub struct_score: Option<f64>,
    pub coverage_score: Option<f64>,
    pub testing_score: Option<f64>,
    pub docs_score: Option<f64>,
    pub ci_cd_score: Option<f64>,
    pub compliance_score: Option<f64>,
    pub api_score: Option<f64>,
    pub monitoring_score: Option<f64>,
}

impl SubScores {
    pub fn get(&self, dimension: Dimension) -> Option<f64> {
        match dimension {
            Dimension::Complexity => self.ccn_score,
            Dimension::Duplication => self.dup_score,
            Dimension::Maintainability => self.maint_score,
            Dimension::Security => self.sec_score,
            Dimension::Structure => self.struct_score,
            Dimension::Coverage => self.coverage_score,
            Dimension::Testing => self.testing_score,
            Dimension::Documentation => self.docs_score,
            Dimension::CiCd => self.ci_cd_score,
            Dimension::Compliance => self.compliance_score,
            Dimension::Api => self.api_score,
            Dimension::Monitoring => self.monitoring_score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Grades {
    pub ccn_grade: Grade,
    pub dup_grade: Grade,
    pub maint_grade: Grade,
    pub sec_grade: Grade,
    pub struct_grade: Grade,
    pub coverage_grade: Grade,
    pub testing_grade: Grade,
    pub docs_grade: Grade,
    pub ci_cd_grade: Grade,
    pub compliance_grade: Grade,
    pub api_grade: Grade,
    pub monitoring_grade: Grade,
}

impl Grades {
    pub fn from_scores(scores: &SubScores) -> Self {
        let g = |d| Grade::from_score(scores.get(d));
        Self {
            ccn_grade: g(Dimension::Complexity),
            dup_grade: g(Dimension::Duplication),
            maint_grade: g(Dimension::Maintainability),
            sec_grade: g(Dimension::Security),
            struct_grade: g(Dimension::Structure),
            coverage_grade: g(Dimension::Coverage),
            testing_grade: g(Dimension::Testing),
            docs_grade: g(Dimension::Documentation),
            ci_cd_grade: g(Dimension::CiCd),
            compliance_grade: g(Dimension::Compliance),
            api_grade: g(Dimension::Api),
            monitoring_grade: g(Dimension::Monitoring),
        }
    }
}

/// Result of one scoring run, carrying the metrics it was derived from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBundle {
    #[serde(flatten)]
    pub scores: SubScores,
    pub overall_score: Option<f64>,
    #[serde(flatten)]
    pub grades: Grades,
    pub overall_grade: Grade,
    /// Source estimate used when analyzer metrics could not yield
    /// maintainability
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<SourceEstimate>,
    pub metrics: MetricsBundle,
}

impl ScoreBundle {
    pub fn score(&self, dimension: Dimension) -> Option<f64> {
        self.scores.get(dimension)
    }

    pub fn grade(&self, dimension: Dimension) -> Grade {
        Grade::from_score(self.scores.get(dimension))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Score `metrics` with the default weight table
pub fn compute_scores(metrics: &MetricsBundle) -> ScoreBundle {
    compute_scores_with(metrics, &WeightTable::default(), &FallbackOptions::default())
}

pub fn compute_scores_with(
    metrics: &MetricsBundle,
    weights: &WeightTable,
    fallback_options: &FallbackOptions,
) -> ScoreBundle {
    let core = core::compute_core_scores(metrics);
    let analyzer = analyzers::compute_analyzer_scores(metrics);

    let mut ccn = core.ccn;
    let mut dup = core.dup;
    let mut maint = core.maint;
    let mut fallback_estimate = None;

    if maint.is_none() {
        if let Some(root) = metrics.get_str("repo_root") {
            debug!("Maintainability unavailable, estimating from sources under {}", root);
            if let Some(estimate) = fallback::estimate_repository(Path::new(root), fallback_options) {
                if let Some(derived) = FallbackScores::from_estimate(&estimate) {
                    ccn = Some(derived.ccn);
                    dup = Some(derived.dup);
                    maint = Some(derived.maint);
                }
                fallback_estimate = Some(estimate);
            }
        }
    }

    let scores = SubScores {
        ccn_score: ccn,
        dup_score: dup,
        maint_score: maint,
        sec_score: Some(core.sec),
        struct_score: core.structure,
        coverage_score: analyzer.coverage,
        testing_score: analyzer.testing,
        docs_score: analyzer.docs,
        ci_cd_score: analyzer.ci_cd,
        compliance_score: analyzer.compliance,
        api_score: analyzer.api,
        monitoring_score: analyzer.monitoring,
    };

    let core_composite = composer::core_composite(weights, maint, scores.sec_score, core.structure);
    let overall_score = composer::overall_score(
        weights,
        &OverallInputs {
            core: core_composite,
            testing: analyzer.testing,
            coverage: analyzer.coverage,
            docs: analyzer.docs,
            ci_cd: analyzer.ci_cd,
            compliance: analyzer.compliance,
            api: analyzer.api,
            monitoring: analyzer.monitoring,
        },
    );

    ScoreBundle {
        scores,
        overall_score,
        grades: Grades::from_scores(&scores),
        overall_grade: Grade::from_score(overall_score),
        fallback: fallback_estimate,
        metrics: metrics.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dimension_keys_unique() {
        let keys: std::collections::HashSet<_> = Dimension::ALL.iter().map(|d| d.key()).collect();
        assert_eq!(keys.len(), Dimension::ALL.len());
    }

    #[test]
    fn test_serialized_layout() {
        let metrics = MetricsBundle::from_value(json!({"avg_ccn": 2, "pct_ccn_gt_10": 0})).unwrap();
        let bundle = compute_scores(&metrics);
        let value = serde_json::to_value(&bundle).unwrap();

        for d in Dimension::ALL {
            assert!(value.get(format!("{}_score", d.key())).is_some(), "{}", d.key());
            assert!(value.get(format!("{}_grade", d.key())).is_some(), "{}", d.key());
        }
        assert_eq!(value["ccn_score"], json!(90.0));
        assert_eq!(value["dup_score"], json!(null));
        assert_eq!(value["dup_grade"], json!("N/A"));
        assert_eq!(value["metrics"]["avg_ccn"], json!(2));
        assert!(value.get("fallback").is_none());
    }

    #[test]
    fn test_security_only_bundle() {
        let bundle = compute_scores(&MetricsBundle::new());
        assert_eq!(bundle.scores.sec_score, Some(100.0));
        // core = security alone
        assert_eq!(bundle.overall_score, Some(100.0));
        assert_eq!(bundle.overall_grade, Grade::Excellent);
    }
}

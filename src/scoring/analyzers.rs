//! Analyzer-derived sub-scores.
//!
//! Each dimension reads a numeric score through the synonym table, then an
//! explicit "feature absent" signal from the analyzer forces it to null even
//! when a number is present.

use serde_json::Value;

use super::clamp_score;
use super::core::config_present;
use crate::metrics::synonyms;
use crate::metrics::{find_bool, find_metric, find_numeric, numeric, MetricsBundle};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnalyzerScores {
    pub coverage: Option<f64>,
    pub testing: Option<f64>,
    pub docs: Option<f64>,
    pub ci_cd: Option<f64>,
    pub compliance: Option<f64>,
    pub api: Option<f64>,
    pub monitoring: Option<f64>,
}

pub fn compute_analyzer_scores(bundle: &MetricsBundle) -> AnalyzerScores {
    AnalyzerScores {
        coverage: coverage_score(bundle),
        testing: testing_score(bundle),
        docs: docs_score(bundle),
        ci_cd: ci_cd_score(bundle),
        compliance: find_numeric(bundle, synonyms::COMPLIANCE).map(clamp_score),
        api: api_score(bundle),
        monitoring: monitoring_score(bundle),
    }
}

fn coverage_score(bundle: &MetricsBundle) -> Option<f64> {
    if find_bool(bundle, synonyms::COVERAGE_FOUND) == Some(false) {
        return None;
    }
    find_numeric(bundle, synonyms::COVERAGE).map(clamp_score)
}

/// Null unless at least one test file was detected
fn testing_score(bundle: &MetricsBundle) -> Option<f64> {
    let test_files = find_numeric(bundle, synonyms::TOTAL_TEST_FILES).unwrap_or(0.0);
    if test_files == 0.0 {
        return None;
    }
    find_numeric(bundle, synonyms::TESTING).map(clamp_score)
}

fn docs_score(bundle: &MetricsBundle) -> Option<f64> {
    let raw = find_metric(bundle, synonyms::DOCUMENTATION).and_then(numeric);
    let no_readme = find_bool(bundle, synonyms::README_PRESENT) == Some(false);
    let no_doc_coverage = find_metric(bundle, synonyms::DOC_COVERAGE)
        .filter(|v| !v.is_null())
        .is_none();

    if no_readme && no_doc_coverage && raw == Some(0.0) {
        return None;
    }
    raw.map(clamp_score)
}

fn ci_cd_score(bundle: &MetricsBundle) -> Option<f64> {
    let has_pipeline = synonyms::CI_MARKERS
        .iter()
        .any(|marker| config_present(bundle, marker));
    if !has_pipeline {
        return None;
    }
    find_numeric(bundle, synonyms::CI_CD).map(clamp_score)
}

fn api_score(bundle: &MetricsBundle) -> Option<f64> {
    if find_bool(bundle, synonyms::HAS_API) == Some(false) || reports_no_api(bundle) {
        return None;
    }
    find_numeric(bundle, synonyms::API).map(clamp_score)
}

/// The API analyzer's summary string, top level or inside its section
fn reports_no_api(bundle: &MetricsBundle) -> bool {
    let summary = bundle.get_str("api_quality").or_else(|| {
        bundle
            .section("api_quality")
            .and_then(|section| section.get("api_quality"))
            .and_then(Value::as_str)
    });
    summary.is_some_and(|s| s.contains("No API"))
}

fn monitoring_score(bundle: &MetricsBundle) -> Option<f64> {
    let no_logging = find_bool(bundle, synonyms::HAS_LOGGING) == Some(false);
    if no_logging && !has_integrations(bundle) {
        return None;
    }
    find_numeric(bundle, synonyms::MONITORING).map(clamp_score)
}

fn has_integrations(bundle: &MetricsBundle) -> bool {
    match find_metric(bundle, synonyms::MONITORING_INTEGRATIONS) {
        None | Some(Value::Null) => false,
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(items)) => !items.is_empty(),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scores(value: Value) -> AnalyzerScores {
        compute_analyzer_scores(&MetricsBundle::from_value(value).unwrap())
    }

    #[test]
    fn test_empty_bundle_is_all_null() {
        assert_eq!(scores(json!({})), AnalyzerScores::default());
    }

    #[test]
    fn test_coverage_capped_and_absence_override() {
        let s = scores(json!({"coverage_analysis": {"line_coverage_pct": 130, "coverage_found": true}}));
        assert_eq!(s.coverage, Some(100.0));

        let s = scores(json!({"coverage_analysis": {"line_coverage_pct": 55, "coverage_found": false}}));
        assert_eq!(s.coverage, None);
    }

    #[test]
    fn test_testing_null_without_test_files() {
        let s = scores(json!({"testing_quality": {"test_quality_score": 80, "total_test_files": 0}}));
        assert_eq!(s.testing, None);

        let s = scores(json!({"testing_quality": {"test_quality_score": 80}}));
        assert_eq!(s.testing, None);

        let s = scores(json!({"testing_quality": {"test_quality_score": 80, "total_test_files": 4}}));
        assert_eq!(s.testing, Some(80.0));
    }

    #[test]
    fn test_docs_null_only_when_all_three_absence_signals_hold() {
        let s = scores(json!({"documentation_quality": {"overall_docs_score": 0, "readme_present": false}}));
        assert_eq!(s.docs, None);

        let s = scores(json!({"documentation_quality": {
            "overall_docs_score": 0, "readme_present": false, "doc_coverage_percent": 0
        }}));
        assert_eq!(s.docs, Some(0.0));

        let s = scores(json!({"documentation_quality": {"overall_docs_score": 15, "readme_present": false}}));
        assert_eq!(s.docs, Some(15.0));
    }

    #[test]
    fn test_ci_cd_requires_recognized_pipeline() {
        let s = scores(json!({"ci_cd_analysis": {"ci_quality_score": 70}}));
        assert_eq!(s.ci_cd, None);

        let s = scores(json!({
            "config_files": {"GitLab CI": true},
            "ci_cd_analysis": {"ci_quality_score": 70}
        }));
        assert_eq!(s.ci_cd, Some(70.0));
    }

    #[test]
    fn test_compliance_always_trusted() {
        let s = scores(json!({"compliance_analysis": {"compliance_score": 0}}));
        assert_eq!(s.compliance, Some(0.0));
    }

    #[test]
    fn test_api_override_wins_over_numeric_value() {
        let s = scores(json!({"has_api": false, "api_quality_score": 42}));
        assert_eq!(s.api, None);

        let s = scores(json!({"api_quality": {"api_quality": "No API detected", "api_quality_score": 42}}));
        assert_eq!(s.api, None);

        let s = scores(json!({"api_quality": {"has_api": true, "api_quality_score": 42}}));
        assert_eq!(s.api, Some(42.0));
    }

    #[test]
    fn test_monitoring_needs_logging_or_integrations() {
        let s = scores(json!({"monitoring_analysis": {
            "has_logging": false, "monitoring_integrations": [], "logging_quality_score": 30
        }}));
        assert_eq!(s.monitoring, None);

        let s = scores(json!({"monitoring_analysis": {
            "has_logging": false, "monitoring_integrations": ["Sentry"], "logging_quality_score": 30
        }}));
        assert_eq!(s.monitoring, Some(30.0));
    }
}

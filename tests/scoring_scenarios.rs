//! End-to-end scoring scenarios over hand-built metrics bundles.

mod common;

use common::{assert_close, repo_with_files, score};
use indoc::indoc;
use pretty_assertions::assert_eq;
use repo_quality::complexity::Strategy;
use repo_quality::config::WeightTable;
use repo_quality::metrics::MetricsBundle;
use repo_quality::scoring::{compute_scores_with, FallbackOptions, Grade};
use serde_json::json;

#[test]
fn full_core_metrics_compose_into_good_overall() {
    let bundle = score(json!({
        "avg_ccn": 5,
        "pct_ccn_gt_10": 10,
        "duplication_pct": 20,
        "functions_gt_7_params": 0,
        "config_files": {"README.md": true, ".gitignore": true, "LICENSE": true}
    }));

    assert_close(bundle.scores.ccn_score, 65.0);
    assert_close(bundle.scores.dup_score, 80.0);
    assert_close(bundle.scores.maint_score, 71.0);
    assert_close(bundle.scores.struct_score, 100.0);
    assert_close(bundle.scores.sec_score, 100.0);
    assert_close(bundle.overall_score, 85.5);
    assert_eq!(bundle.overall_grade, Grade::Good);
    assert!(bundle.fallback.is_none());
}

#[test]
fn fallback_estimates_maintainability_from_sources() {
    let repo = repo_with_files(&[(
        "app.py",
        indoc! {"
            def first(x):
                if x > 1:
                    return 1
                if x < 0:
                    return 2
                return 0

            def second(y):
                if y:
                    return 'a'
                if not y:
                    return 'b'
                return None

            def third(z):
                if z == 3:
                    print(z)
                if z == 4:
                    print(z + 1)
                return z
        "},
    )]);

    let bundle = score(json!({"repo_root": repo.path().to_string_lossy()}));

    let estimate = bundle.fallback.as_ref().expect("fallback estimate");
    assert_eq!(estimate.strategy, Strategy::Python);
    assert_eq!(estimate.function_count, 3);
    assert_close(Some(estimate.avg_ccn), 3.0);
    assert_close(bundle.scores.ccn_score, 85.0);

    let dup = bundle.scores.dup_score.expect("duplication from line uniqueness");
    assert!((0.0..=100.0).contains(&dup));
    assert!(bundle.scores.maint_score.is_some());
    // parameter overflow is not read from the estimate
    assert_eq!(bundle.scores.struct_score, None);
}

#[test]
fn fallback_tries_script_sources_when_no_python_functions() {
    let repo = repo_with_files(&[
        ("settings.py", "DEBUG = True\n"),
        (
            "src/index.js",
            indoc! {"
                function pick(a, b) {
                  if (a && b) {
                    return a;
                  }
                  return b;
                }
            "},
        ),
    ]);

    let bundle = score(json!({"repo_root": repo.path().to_string_lossy()}));
    let estimate = bundle.fallback.as_ref().expect("fallback estimate");
    assert_eq!(estimate.strategy, Strategy::Script);
    assert_eq!(estimate.function_count, 1);
    assert!(bundle.scores.maint_score.is_some());
}

#[test]
fn fallback_on_all_identical_lines_scores_duplication_near_zero() {
    let source = "def handler(): return 1\n".repeat(1000);
    let repo = repo_with_files(&[("handlers.py", source.as_str())]);

    let bundle = score(json!({"repo_root": repo.path().to_string_lossy()}));
    let estimate = bundle.fallback.as_ref().expect("fallback estimate");
    assert_eq!(estimate.total_lines, 1000);
    assert_eq!(estimate.unique_lines, 1);

    assert_close(bundle.scores.dup_score, 0.1);
    assert_close(bundle.scores.ccn_score, 95.0);
    assert_close(bundle.scores.maint_score, 0.6 * 95.0 + 0.4 * 0.1);
}

#[test]
fn fallback_on_all_unique_lines_scores_full_duplication() {
    let source: String = (0..50)
        .map(|i| format!("def handler_{i}():\n    return {i}\n"))
        .collect();
    let repo = repo_with_files(&[("handlers.py", source.as_str())]);

    let bundle = score(json!({"repo_root": repo.path().to_string_lossy()}));
    let estimate = bundle.fallback.as_ref().expect("fallback estimate");
    assert_eq!(estimate.function_count, 50);
    assert_eq!(estimate.unique_lines, estimate.total_lines);

    assert_close(bundle.scores.dup_score, 100.0);
    assert_close(bundle.scores.maint_score, 0.6 * 95.0 + 0.4 * 100.0);
}

#[test]
fn exhausted_fallback_leaves_maintainability_null() {
    let repo = repo_with_files(&[("README.md", "# nothing to measure\n")]);
    let bundle = score(json!({"repo_root": repo.path().to_string_lossy()}));

    assert_eq!(bundle.scores.maint_score, None);
    assert!(bundle.fallback.is_none());
    // security alone carries the composition
    assert_close(bundle.overall_score, 100.0);
}

#[test]
fn api_absence_outranks_numeric_score() {
    let bundle = score(json!({
        "api_quality": {"has_api": false, "api_quality_score": 42}
    }));
    assert_eq!(bundle.scores.api_score, None);
    assert_eq!(bundle.grades.api_grade, Grade::NotAvailable);
}

#[test]
fn unmeasured_complexity_is_not_zero() {
    let bundle = score(json!({"avg_ccn": "n/a", "pct_ccn_gt_10": 5, "duplication_pct": 30}));
    assert_eq!(bundle.scores.ccn_score, None);
    assert_close(bundle.scores.dup_score, 70.0);
    assert_eq!(bundle.scores.maint_score, None);

    let zero_avg = score(json!({"avg_ccn": 0, "pct_ccn_gt_10": 0, "duplication_pct": 0}));
    assert_eq!(zero_avg.scores.ccn_score, None);
}

#[test]
fn numeric_strings_are_coerced() {
    let bundle = score(json!({"avg_ccn": "4", "pct_ccn_gt_10": "0.0", "duplication_pct": " 10 "}));
    assert_close(bundle.scores.ccn_score, 80.0);
    assert_close(bundle.scores.dup_score, 90.0);
}

#[test]
fn analyzer_dimensions_join_the_overall_score() {
    let bundle = score(json!({
        "testing_quality": {"test_quality_score": 60, "total_test_files": 3},
        "coverage_analysis": {"coverage_found": true, "line_coverage_pct": 150}
    }));

    assert_close(bundle.scores.testing_score, 60.0);
    assert_close(bundle.scores.coverage_score, 100.0);
    // (0.25 * 100 + 0.15 * 60 + 0.10 * 100) / 0.5
    assert_close(bundle.overall_score, 88.0);
    assert_eq!(bundle.overall_grade, Grade::Good);
}

#[test]
fn security_penalties_and_config_bonus() {
    let bundle = score(json!({
        "security_high": 2,
        "security_medium": 3,
        "custom_static_findings": [
            {"type": "Dangerous Function", "file": "a.py", "line": 1, "content": "eval(x)"},
            {"type": "Hardcoded Credential", "file": "b.py", "line": 2, "content": "pw = 'x'"},
            {"type": "Debug Statement", "file": "c.js", "line": 3, "content": "console.log()"}
        ],
        "config_files": {".env.example": true}
    }));

    // 100 - 26 - 10 + 0.1 * 33.33
    assert_close(bundle.scores.sec_score, 64.0 + 100.0 / 30.0);
    assert_eq!(bundle.grades.sec_grade, Grade::Poor);
}

#[test]
fn documentation_null_only_without_any_signal() {
    let absent = score(json!({"documentation_quality": {
        "readme_present": false, "overall_docs_score": 0, "doc_coverage_percent": null
    }}));
    assert_eq!(absent.scores.docs_score, None);

    let readme_only = score(json!({"documentation_quality": {
        "readme_present": true, "overall_docs_score": 0
    }}));
    assert_close(readme_only.scores.docs_score, 0.0);
}

#[test]
fn ci_score_requires_a_pipeline_marker() {
    let metrics = json!({"ci_cd_analysis": {"ci_quality_score": 75}});
    assert_eq!(score(metrics).scores.ci_cd_score, None);

    let with_marker = score(json!({
        "config_files": {"GitLab CI": true},
        "ci_cd_analysis": {"ci_quality_score": 75}
    }));
    assert_close(with_marker.scores.ci_cd_score, 75.0);
}

#[test]
fn monitoring_integrations_keep_score_without_logging() {
    let bundle = score(json!({"monitoring_analysis": {
        "has_logging": false,
        "monitoring_integrations": ["Prometheus"],
        "logging_quality_score": 30
    }}));
    assert_close(bundle.scores.monitoring_score, 30.0);

    let silent = score(json!({"monitoring_analysis": {
        "has_logging": false,
        "monitoring_integrations": [],
        "logging_quality_score": 30
    }}));
    assert_eq!(silent.scores.monitoring_score, None);
}

#[test]
fn custom_weights_shift_the_core_composite() {
    let metrics = MetricsBundle::from_value(json!({
        "avg_ccn": 10,
        "pct_ccn_gt_10": 50,
        "duplication_pct": 0
    }))
    .unwrap();

    let weights = WeightTable {
        maintainability: 1.0,
        security: 0.0,
        structure: 0.0,
        ..WeightTable::default()
    };
    let bundle = compute_scores_with(&metrics, &weights, &FallbackOptions::default());

    // ccn 0, dup 100 => maint 40; security carries no weight
    assert_close(bundle.scores.maint_score, 40.0);
    assert_close(bundle.overall_score, 40.0);
    assert_eq!(bundle.overall_grade, Grade::Poor);
}

#[test]
fn score_bundle_serializes_flat_keys() {
    let bundle = score(json!({"avg_ccn": 2, "pct_ccn_gt_10": 0}));
    let value: serde_json::Value = serde_json::from_str(&bundle.to_json().unwrap()).unwrap();

    assert_eq!(value["ccn_score"], json!(90.0));
    assert_eq!(value["ccn_grade"], json!("Excellent"));
    assert_eq!(value["coverage_score"], json!(null));
    assert_eq!(value["coverage_grade"], json!("N/A"));
    assert_eq!(value["overall_grade"], json!("Excellent"));
    assert_eq!(value["metrics"]["avg_ccn"], json!(2));
}

//! The default analyzer set run against small fixture repositories.

mod common;

use common::{offline_config, repo_with_files};
use indoc::indoc;
use repo_quality::analyzers::default_analyzers;
use repo_quality::metrics::MetricsBundle;
use repo_quality::pipeline::{assess, collect_metrics};
use repo_quality::progress::ProgressManager;
use serde_json::{json, Map, Value};

const README: &str = indoc! {"
    # Pets API

    ## Installation
    pip install -r requirements.txt

    ## Usage
    flask run

    ## Contributing
    Pull requests welcome.

    ## License
    MIT
"};

const APP: &str = indoc! {r#"
    """Pets service."""
    import logging

    from flask import Flask, jsonify, request

    app = Flask(__name__)
    logger = logging.getLogger(__name__)


    @app.route("/api/v1/pets", methods=["GET"])
    def list_pets():
        """List every pet."""
        logger.info("listing pets")
        return jsonify([])


    @app.route("/api/v1/pets/<int:pet_id>", methods=["DELETE"])
    def delete_pet(pet_id):
        try:
            return jsonify({"deleted": pet_id})
        except KeyError as exc:
            logger.error("missing pet %s", exc)
            raise


    @app.route("/health")
    def health():
        return "ok"
"#};

const TESTS: &str = indoc! {"
    import pytest

    from app import app


    def test_list_pets():
        client = app.test_client()
        response = client.get('/api/v1/pets')
        assert response.status_code == 200
        assert response.json == []


    def test_health():
        assert app.test_client().get('/health').data == b'ok'
"};

const WORKFLOW: &str = indoc! {"
    name: ci
    on: [push]
    jobs:
      test:
        runs-on: ubuntu-latest
        steps:
          - uses: actions/checkout@v4
          - run: pip install -r requirements.txt
          - run: flake8 .
          - run: pytest
"};

fn fixture() -> tempfile::TempDir {
    repo_with_files(&[
        ("README.md", README),
        ("LICENSE", "MIT License\n"),
        (".gitignore", "__pycache__/\n"),
        ("requirements.txt", "flask==3.0.0\nrequests-toolbelt\n"),
        ("app.py", APP),
        ("tests/test_app.py", TESTS),
        (".github/workflows/ci.yml", WORKFLOW),
    ])
}

fn section<'a>(metrics: &'a MetricsBundle, name: &str) -> &'a Map<String, Value> {
    metrics
        .section(name)
        .unwrap_or_else(|| panic!("missing section {}", name))
}

#[test]
fn default_analyzers_skip_disabled_tools() {
    let config = offline_config();
    let names: Vec<&str> = default_analyzers(&config).iter().map(|a| a.name()).collect();
    assert!(!names.contains(&"lizard"));
    assert!(!names.contains(&"semgrep"));
    assert!(names.contains(&"ci_cd"));
    assert!(names.contains(&"main_files"));
}

#[test]
fn fixture_repository_produces_every_section() {
    let repo = fixture();
    let config = offline_config();
    let analyzers = default_analyzers(&config);
    let metrics = collect_metrics(repo.path(), &config, &analyzers, &ProgressManager::hidden());

    for name in [
        "coverage_analysis",
        "testing_quality",
        "documentation_quality",
        "ci_cd_analysis",
        "compliance_analysis",
        "api_quality",
        "monitoring_analysis",
    ] {
        section(&metrics, name);
    }

    let config_files = metrics.get("config_files").and_then(Value::as_object).unwrap();
    assert_eq!(config_files["README.md"], json!(true));
    assert_eq!(config_files["GitHub Actions Workflow"], json!(true));
    assert_eq!(config_files["Dockerfile"], json!(false));

    let testing = section(&metrics, "testing_quality");
    assert_eq!(testing["total_test_files"], json!(1));
    assert_eq!(testing["total_test_functions"], json!(2));
    assert_eq!(testing["total_assertions"], json!(3));

    let docs = section(&metrics, "documentation_quality");
    assert_eq!(docs["readme_present"], json!(true));
    assert_eq!(docs["readme_quality"], json!("Comprehensive"));
    assert_eq!(docs["license_present"], json!(true));

    let ci = section(&metrics, "ci_cd_analysis");
    assert_eq!(ci["has_ci"], json!(true));
    assert_eq!(ci["has_testing"], json!(true));
    assert_eq!(ci["has_linting"], json!(true));

    let api = section(&metrics, "api_quality");
    assert_eq!(api["has_api"], json!(true));
    assert_eq!(api["frameworks"], json!(["Flask"]));

    let monitoring = section(&metrics, "monitoring_analysis");
    assert_eq!(monitoring["has_logging"], json!(true));
    assert_eq!(monitoring["health_checks"], json!(true));

    let python = metrics.get("python_dependencies").unwrap();
    assert_eq!(python["has_requirements"], json!(true));
    assert_eq!(python["unused_packages"], json!(["requests-toolbelt"]));

    let main_files: Vec<&str> = metrics
        .get("main_files")
        .and_then(Value::as_array)
        .unwrap()
        .iter()
        .filter_map(|f| f["file"].as_str())
        .collect();
    assert_eq!(main_files, vec!["app.py"]);
}

#[test]
fn fixture_repository_scores_analyzer_dimensions() {
    let repo = fixture();
    let bundle = assess(repo.path(), &offline_config(), &ProgressManager::hidden());

    assert_eq!(bundle.scores.coverage_score, None);
    assert!(bundle.scores.testing_score.is_some());
    assert!(bundle.scores.docs_score.is_some());
    assert!(bundle.scores.ci_cd_score.is_some());
    assert!(bundle.scores.compliance_score.is_some());
    assert!(bundle.scores.api_score.is_some());
    assert!(bundle.scores.monitoring_score.is_some());
    // lizard is off, so maintainability comes from the source estimate
    assert!(bundle.fallback.is_some());
    assert!(bundle.scores.maint_score.is_some());
    assert!(bundle.overall_score.is_some());
}

#[test]
fn empty_repository_degrades_to_security_and_compliance() {
    let repo = repo_with_files(&[]);
    let bundle = assess(repo.path(), &offline_config(), &ProgressManager::hidden());

    assert_eq!(bundle.scores.sec_score, Some(100.0));
    assert_eq!(bundle.scores.maint_score, None);
    assert_eq!(bundle.scores.testing_score, None);
    assert_eq!(bundle.scores.ci_cd_score, None);
    assert_eq!(bundle.scores.api_score, None);
    assert_eq!(bundle.scores.monitoring_score, None);
    assert!(bundle.scores.compliance_score.is_some());
    assert!(bundle.overall_score.is_some());
}

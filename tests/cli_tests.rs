use assert_cmd::Command;
use std::fs;
use tempfile::TempDir;

fn repo_quality(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("repo-quality").unwrap();
    cmd.current_dir(dir.path()).env_remove("RUST_LOG");
    cmd
}

fn offline_config(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("offline.toml");
    fs::write(&path, "[tools]\nlizard = false\nsemgrep = false\n").unwrap();
    path
}

#[test]
fn score_prints_bundle_json() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("metrics.json"),
        r#"{"avg_ccn": 2, "pct_ccn_gt_10": 0, "security_high": 1}"#,
    )
    .unwrap();

    let output = repo_quality(&dir).args(["score", "metrics.json"]).output().unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["ccn_score"], serde_json::json!(90.0));
    assert_eq!(value["sec_score"], serde_json::json!(90.0));
}

#[test]
fn score_writes_markdown_report() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("metrics.json"), "{}").unwrap();

    repo_quality(&dir)
        .args(["score", "metrics.json", "-o", "out/report.md"])
        .assert()
        .success();

    let report = fs::read_to_string(dir.path().join("out").join("report.md")).unwrap();
    assert!(report.starts_with("# Code Quality Report"));
}

#[test]
fn score_rejects_non_object_metrics() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("metrics.json"), "[1, 2]").unwrap();

    let output = repo_quality(&dir).args(["score", "metrics.json"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("Error:"));
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let dir = TempDir::new().unwrap();

    repo_quality(&dir).arg("init").assert().success();
    let config = dir.path().join(".repo-quality.toml");
    assert!(config.is_file());

    let output = repo_quality(&dir).arg("init").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Use --force to overwrite"));

    repo_quality(&dir).args(["init", "--force"]).assert().success();
}

#[test]
fn assess_exit_code_follows_threshold() {
    let dir = TempDir::new().unwrap();
    let repo = dir.path().join("repo");
    fs::create_dir_all(&repo).unwrap();
    fs::write(repo.join("README.md"), "# Demo\n").unwrap();
    let config = offline_config(&dir);

    let base_args = |fail_under: &str| {
        vec![
            "assess".to_string(),
            repo.to_string_lossy().into_owned(),
            "--config".to_string(),
            config.to_string_lossy().into_owned(),
            "--quiet".to_string(),
            "--fail-under".to_string(),
            fail_under.to_string(),
        ]
    };

    repo_quality(&dir).args(base_args("10")).assert().success();
    assert!(dir.path().join("report.md").is_file());

    let output = repo_quality(&dir).args(base_args("101")).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("is below threshold 101"));
}

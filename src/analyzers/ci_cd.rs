//! CI/CD pipeline practices: which provider runs the pipeline and what its
//! jobs actually do.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_yaml::Value as Yaml;
use tracing::debug;

use super::{into_map, quality_label, AnalyzerOutput, RepoAnalyzer, RepoContext};
use crate::errors::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    GithubActions,
    GitlabCi,
    Jenkins,
    CircleCi,
    TravisCi,
    AzurePipelines,
    Bitbucket,
}

impl Provider {
    pub const ALL: [Provider; 7] = [
        Provider::GithubActions,
        Provider::GitlabCi,
        Provider::Jenkins,
        Provider::CircleCi,
        Provider::TravisCi,
        Provider::AzurePipelines,
        Provider::Bitbucket,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Provider::GithubActions => "github_actions",
            Provider::GitlabCi => "gitlab_ci",
            Provider::Jenkins => "jenkins",
            Provider::CircleCi => "circle_ci",
            Provider::TravisCi => "travis_ci",
            Provider::AzurePipelines => "azure_pipelines",
            Provider::Bitbucket => "bitbucket",
        }
    }

    /// Configuration files of this provider present under `root`
    fn config_files(self, root: &Path) -> Vec<PathBuf> {
        match self {
            Provider::GithubActions => yaml_files_in(&root.join(".github").join("workflows")),
            Provider::GitlabCi => existing(root, &[".gitlab-ci.yml"]),
            Provider::Jenkins => existing(root, &["Jenkinsfile"]),
            Provider::CircleCi => existing(root, &[".circleci/config.yml"]),
            Provider::TravisCi => existing(root, &[".travis.yml"]),
            Provider::AzurePipelines => existing(root, &["azure-pipelines.yml"]),
            Provider::Bitbucket => existing(root, &["bitbucket-pipelines.yml"]),
        }
    }
}

fn existing(root: &Path, candidates: &[&str]) -> Vec<PathBuf> {
    candidates
        .iter()
        .map(|c| root.join(c))
        .filter(|p| p.is_file())
        .collect()
}

fn yaml_files_in(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e == "yml" || e == "yaml")
        })
        .collect();
    files.sort();
    files
}

const TEST_KEYWORDS: &[&str] = &["test", "pytest", "jest", "vitest", "mocha"];
const LINT_KEYWORDS: &[&str] = &["lint", "eslint", "flake8", "pylint", "black", "ruff", "prettier"];
const SECURITY_KEYWORDS: &[&str] = &["security", "audit", "scan", "snyk", "safety", "bandit", "codeql", "semgrep"];
const BUILD_KEYWORDS: &[&str] = &["build", "compile", "webpack", "setup.py"];
const DEPLOY_KEYWORDS: &[&str] = &["deploy", "publish", "release", "docker push"];
const CACHE_KEYWORDS: &[&str] = &["actions/cache", "cache:", "cache-dependency-path"];

/// GitLab top-level keys that configure the pipeline rather than define jobs
const GITLAB_RESERVED: &[&str] = &[
    "stages",
    "variables",
    "include",
    "default",
    "workflow",
    "image",
    "services",
    "before_script",
    "after_script",
    "cache",
];

/// Practices observed across every pipeline definition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelinePractices {
    pub testing: bool,
    pub linting: bool,
    pub security_scanning: bool,
    pub build: bool,
    pub deploy: bool,
    pub caching: bool,
    pub jobs: usize,
    pub environments: Vec<String>,
}

impl PipelinePractices {
    fn observe(&mut self, text: &str) {
        let text = text.to_lowercase();
        let has = |keywords: &[&str]| keywords.iter().any(|k| text.contains(k));
        self.testing |= has(TEST_KEYWORDS);
        self.linting |= has(LINT_KEYWORDS);
        self.security_scanning |= has(SECURITY_KEYWORDS);
        self.build |= has(BUILD_KEYWORDS);
        self.deploy |= has(DEPLOY_KEYWORDS);
        self.caching |= has(CACHE_KEYWORDS);
    }

    fn add_environment(&mut self, env: Option<&Yaml>) {
        let name = match env {
            Some(Yaml::String(name)) => Some(name.clone()),
            Some(Yaml::Mapping(map)) => map.get("name").and_then(Yaml::as_str).map(str::to_string),
            _ => None,
        };
        if let Some(name) = name {
            if !self.environments.contains(&name) {
                self.environments.push(name);
            }
        }
    }

    /// `20 + 25 tests + 15 lint + 20 security + 10 build + 10 deploy`, plus
    /// up to 10 each for environments and parallel jobs
    pub fn score(&self) -> f64 {
        let bonus = |present: bool, points: f64| if present { points } else { 0.0 };
        let score = 20.0
            + bonus(self.testing, 25.0)
            + bonus(self.linting, 15.0)
            + bonus(self.security_scanning, 20.0)
            + bonus(self.build, 10.0)
            + bonus(self.deploy, 10.0)
            + (self.environments.len() as f64 * 2.0).min(10.0)
            + (self.jobs as f64 * 2.0).min(10.0);
        score.min(100.0)
    }

    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.testing {
            missing.push("Automated testing");
        }
        if !self.linting {
            missing.push("Code linting");
        }
        if !self.security_scanning {
            missing.push("Security vulnerability scanning");
        }
        if !self.build {
            missing.push("Automated building");
        }
        if self.environments.is_empty() {
            missing.push("Multiple deployment environments");
        }
        missing
    }
}

/// All scalar text in a YAML document, space separated
fn yaml_text(value: &Yaml) -> String {
    fn collect(value: &Yaml, out: &mut Vec<String>) {
        match value {
            Yaml::String(s) => out.push(s.clone()),
            Yaml::Bool(b) => out.push(b.to_string()),
            Yaml::Number(n) => out.push(n.to_string()),
            Yaml::Sequence(items) => items.iter().for_each(|v| collect(v, out)),
            Yaml::Mapping(map) => {
                for (k, v) in map {
                    if let Some(k) = k.as_str() {
                        out.push(format!("{}:", k));
                    }
                    collect(v, out);
                }
            }
            Yaml::Tagged(tagged) => collect(&tagged.value, out),
            Yaml::Null => {}
        }
    }
    let mut out = Vec::new();
    collect(value, &mut out);
    out.join(" ")
}

pub fn analyze_github_workflow(doc: &Yaml, practices: &mut PipelinePractices) {
    let Some(jobs) = doc.get("jobs").and_then(Yaml::as_mapping) else {
        return;
    };
    practices.jobs += jobs.len();
    for job in jobs.values() {
        if let Some(steps) = job.get("steps") {
            practices.observe(&yaml_text(steps));
        }
        practices.add_environment(job.get("environment"));
    }
}

pub fn analyze_gitlab_pipeline(doc: &Yaml, practices: &mut PipelinePractices) {
    let Some(entries) = doc.as_mapping() else {
        return;
    };
    if let Some(cache) = entries.get("cache") {
        if !cache.is_null() {
            practices.caching = true;
        }
    }
    for (name, job) in entries {
        let Some(name) = name.as_str() else { continue };
        if name.starts_with('.') || GITLAB_RESERVED.contains(&name) || !job.is_mapping() {
            continue;
        }
        practices.jobs += 1;
        practices.observe(&yaml_text(job));
        practices.add_environment(job.get("environment"));
    }
}

pub fn analyze_jenkinsfile(content: &str, practices: &mut PipelinePractices) {
    if !content.to_lowercase().contains("pipeline") {
        return;
    }
    practices.jobs += content.matches("stage(").count() + content.matches("stage (").count();
    practices.observe(content);
}

fn analyze_generic(doc: &Yaml, practices: &mut PipelinePractices) {
    practices.jobs += doc
        .get("jobs")
        .and_then(Yaml::as_mapping)
        .map(|jobs| jobs.len())
        .unwrap_or(1);
    practices.observe(&yaml_text(doc));
}

pub struct CiCdAnalyzer;

impl RepoAnalyzer for CiCdAnalyzer {
    fn name(&self) -> &'static str {
        "ci_cd"
    }

    fn description(&self) -> &'static str {
        "Analyzing CI/CD pipelines"
    }

    fn analyze(&self, ctx: &RepoContext) -> Result<AnalyzerOutput> {
        let detected: Vec<(Provider, Vec<PathBuf>)> = Provider::ALL
            .iter()
            .map(|p| (*p, p.config_files(ctx.root)))
            .filter(|(_, files)| !files.is_empty())
            .collect();

        if detected.is_empty() {
            let values = json!({
                "ci_provider": null,
                "ci_providers": [],
                "has_ci": false,
                "has_testing": false,
                "has_linting": false,
                "has_security_scanning": false,
                "has_build": false,
                "has_deploy": false,
                "has_caching": false,
                "parallel_jobs": 0,
                "environments": [],
                "ci_quality_score": 0.0,
                "missing_practices": [],
                "ci_quality": "No CI/CD detected",
                "recommendations": [
                    "Implement CI/CD pipeline",
                    "Add automated testing",
                    "Include security scanning"
                ]
            });
            return Ok(AnalyzerOutput::section("ci_cd_analysis", into_map(values)));
        }

        let mut practices = PipelinePractices::default();
        let mut config_files = Vec::new();
        for (provider, files) in &detected {
            for file in files {
                let Some(text) = ctx.read(file) else { continue };
                config_files.push(ctx.display_path(file));
                if *provider == Provider::Jenkins {
                    analyze_jenkinsfile(&text, &mut practices);
                    continue;
                }
                let doc: Yaml = match serde_yaml::from_str(&text) {
                    Ok(doc) => doc,
                    Err(e) => {
                        debug!("Skipping malformed CI config {}: {}", file.display(), e);
                        continue;
                    }
                };
                match provider {
                    Provider::GithubActions => analyze_github_workflow(&doc, &mut practices),
                    Provider::GitlabCi => analyze_gitlab_pipeline(&doc, &mut practices),
                    _ => analyze_generic(&doc, &mut practices),
                }
            }
        }

        let score = practices.score();
        let missing = practices.missing();
        let recommendations: Vec<String> = missing.iter().map(|m| format!("Add {}", m)).collect();
        let providers: Vec<&str> = detected.iter().map(|(p, _)| p.as_str()).collect();

        let values = json!({
            "ci_provider": providers[0],
            "ci_providers": providers,
            "ci_config_files": config_files,
            "has_ci": true,
            "has_testing": practices.testing,
            "has_linting": practices.linting,
            "has_security_scanning": practices.security_scanning,
            "has_build": practices.build,
            "has_deploy": practices.deploy,
            "has_caching": practices.caching,
            "parallel_jobs": practices.jobs,
            "environments": practices.environments,
            "ci_quality_score": score,
            "missing_practices": missing,
            "ci_quality": quality_label(score),
            "recommendations": recommendations
        });
        Ok(AnalyzerOutput::section("ci_cd_analysis", into_map(values)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QualityConfig;
    use indoc::indoc;
    use serde_json::json;
    use tempfile::TempDir;

    const WORKFLOW: &str = indoc! {"
        name: ci
        on: [push]
        jobs:
          test:
            runs-on: ubuntu-latest
            steps:
              - uses: actions/checkout@v4
              - uses: actions/cache@v4
              - run: npm ci
              - run: npm run lint
              - run: npm test
          deploy:
            runs-on: ubuntu-latest
            environment: production
            steps:
              - run: npm run build
              - run: npm publish
    "};

    #[test]
    fn test_github_workflow_practices() {
        let doc: Yaml = serde_yaml::from_str(WORKFLOW).unwrap();
        let mut practices = PipelinePractices::default();
        analyze_github_workflow(&doc, &mut practices);

        assert!(practices.testing);
        assert!(practices.linting);
        assert!(!practices.security_scanning);
        assert!(practices.build);
        assert!(practices.deploy);
        assert!(practices.caching);
        assert_eq!(practices.jobs, 2);
        assert_eq!(practices.environments, vec!["production"]);
        // 20 + 25 + 15 + 10 + 10 + 2 + 4
        assert_eq!(practices.score(), 86.0);
    }

    #[test]
    fn test_gitlab_skips_reserved_keys() {
        let doc: Yaml = serde_yaml::from_str(indoc! {"
            stages: [test, deploy]
            .template:
              script: [echo hidden]
            unit:
              stage: test
              script:
                - pytest
            ship:
              stage: deploy
              script: [./deploy.sh]
              environment:
                name: staging
        "})
        .unwrap();
        let mut practices = PipelinePractices::default();
        analyze_gitlab_pipeline(&doc, &mut practices);
        assert_eq!(practices.jobs, 2);
        assert!(practices.testing);
        assert!(practices.deploy);
        assert_eq!(practices.environments, vec!["staging"]);
    }

    #[test]
    fn test_jenkinsfile_stages() {
        let mut practices = PipelinePractices::default();
        analyze_jenkinsfile(
            "pipeline { stages { stage('Build') { sh 'make build' } stage('Test') { sh 'make test' } } }",
            &mut practices,
        );
        assert_eq!(practices.jobs, 2);
        assert!(practices.build);
        assert!(practices.testing);
    }

    #[test]
    fn test_score_is_capped() {
        let practices = PipelinePractices {
            testing: true,
            linting: true,
            security_scanning: true,
            build: true,
            deploy: true,
            caching: true,
            jobs: 10,
            environments: vec!["a".into(), "b".into(), "c".into()],
        };
        assert_eq!(practices.score(), 100.0);
    }

    #[test]
    fn test_no_ci_detected() {
        let dir = TempDir::new().unwrap();
        let config = QualityConfig::default();
        let output = CiCdAnalyzer.analyze(&RepoContext::new(dir.path(), &config)).unwrap();
        assert_eq!(output.values["has_ci"], json!(false));
        assert_eq!(output.values["ci_quality_score"], json!(0.0));
        assert_eq!(output.values["ci_quality"], json!("No CI/CD detected"));
    }

    #[test]
    fn test_workflow_directory_detection() {
        let dir = TempDir::new().unwrap();
        let workflows = dir.path().join(".github").join("workflows");
        fs::create_dir_all(&workflows).unwrap();
        fs::write(workflows.join("ci.yml"), WORKFLOW).unwrap();
        fs::write(workflows.join("notes.txt"), "ignored").unwrap();

        let config = QualityConfig::default();
        let output = CiCdAnalyzer.analyze(&RepoContext::new(dir.path(), &config)).unwrap();
        assert_eq!(output.values["ci_provider"], json!("github_actions"));
        assert_eq!(output.values["ci_config_files"], json!([".github/workflows/ci.yml"]));
        assert_eq!(output.values["ci_quality"], json!("Excellent"));
    }
}

//! Standards compliance: configured linters, security standards and
//! code-quality anti-patterns in a sample of sources.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;

use super::{into_map, quality_label, AnalyzerOutput, RepoAnalyzer, RepoContext, PYTHON_EXTENSIONS, SCRIPT_EXTENSIONS};
use crate::errors::Result;

const PYTHON_LINTERS: &[(&str, &[&str])] = &[
    ("flake8", &[".flake8", "setup.cfg", "tox.ini"]),
    ("pylint", &[".pylintrc", "pylint.rc"]),
    ("black", &["pyproject.toml"]),
    ("ruff", &["ruff.toml", ".ruff.toml"]),
    ("isort", &[".isort.cfg"]),
];

const SCRIPT_LINTERS: &[(&str, &[&str])] = &[
    (
        "eslint",
        &[".eslintrc", ".eslintrc.js", ".eslintrc.cjs", ".eslintrc.json", ".eslintrc.yml", "eslint.config.js", "eslint.config.mjs"],
    ),
    ("prettier", &[".prettierrc", ".prettierrc.json", ".prettierrc.js", "prettier.config.js"]),
    ("tslint", &["tslint.json"]),
];

const SECURITY_DOCS: &[&str] = &[".env.example", "security.md", "SECURITY.md", ".github/SECURITY.md", ".snyk"];
const DEPENDENCY_MANIFESTS: &[&str] = &["requirements.txt", "package.json", "Pipfile", "poetry.lock", "pyproject.toml"];
const UPDATE_BOTS: &[&str] = &[".github/dependabot.yml", ".github/dependabot.yaml", "renovate.json", ".renovaterc"];
const CODE_OWNERS: &[&str] = &["CODEOWNERS", ".github/CODEOWNERS", "docs/CODEOWNERS"];
const LICENSES: &[&str] = &["LICENSE", "LICENSE.md", "LICENSE.txt"];

/// Files sampled for the secret check and the anti-pattern scan
const SECRET_SAMPLE: usize = 20;
const QUALITY_SAMPLE: usize = 15;
const LONG_LINE: usize = 100;
const TODO_LIMIT: usize = 5;
const PRINT_LIMIT: usize = 3;

static SECRET_ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:password|secret|api_key|token)\s*[:=]\s*['"][^'"]+['"]"#).unwrap()
});
static TODO_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(?:TODO|FIXME|XXX)\b").unwrap());
static PRINT_CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bprint\s*\(").unwrap());
static SILENT_EXCEPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"except[^:\n]*:\s*pass\b").unwrap());
static WILDCARD_IMPORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*from\s+\S+\s+import\s+\*").unwrap());

/// Linters configured for the languages present, with the file that
/// configures each
pub fn detect_linters(ctx: &RepoContext, has_python: bool, has_scripts: bool) -> Vec<(&'static str, &'static str)> {
    let mut linters = Vec::new();
    let mut scan = |table: &[(&'static str, &'static [&'static str])]| {
        for (linter, configs) in table {
            if let Some(config) = configs.iter().find(|c| ctx.exists(c)) {
                linters.push((*linter, *config));
            }
        }
    };
    if has_python {
        scan(PYTHON_LINTERS);
    }
    if has_scripts {
        scan(SCRIPT_LINTERS);
    }
    linters
}

/// Quality issues found in one file, one entry per kind of issue
pub fn quality_issues(file_name: &str, source: &str, is_python: bool) -> Vec<String> {
    let mut issues = Vec::new();

    let long_lines: Vec<usize> = source
        .lines()
        .enumerate()
        .filter(|(_, l)| l.chars().count() > LONG_LINE)
        .map(|(i, _)| i + 1)
        .take(3)
        .collect();
    if !long_lines.is_empty() {
        issues.push(format!("Long lines in {}: lines {:?}", file_name, long_lines));
    }

    let todos = TODO_MARKER.find_iter(source).count();
    if todos > TODO_LIMIT {
        issues.push(format!("High TODO count in {}: {}", file_name, todos));
    }

    if is_python {
        let prints = PRINT_CALL.find_iter(source).count();
        if prints > PRINT_LIMIT {
            issues.push(format!("Debug print statements in {}: {}", file_name, prints));
        }
        let wildcards = WILDCARD_IMPORT.find_iter(source).count();
        if wildcards > 0 {
            issues.push(format!("Wildcard imports in {}: {}", file_name, wildcards));
        }
    }

    let silent = SILENT_EXCEPT.find_iter(source).count();
    if silent > 0 {
        issues.push(format!("Empty except blocks in {}: {}", file_name, silent));
    }
    issues
}

/// `40 for linting + min(30, 10 per standard) + max(0, 30 - 5 per issue)`
pub fn compliance_score(linting: bool, standards: usize, issues: usize) -> f64 {
    let lint = if linting { 40.0 } else { 0.0 };
    let standards = (standards as f64 * 10.0).min(30.0);
    let quality = (30.0 - issues as f64 * 5.0).max(0.0);
    (lint + standards + quality).min(100.0)
}

pub struct ComplianceAnalyzer;

impl RepoAnalyzer for ComplianceAnalyzer {
    fn name(&self) -> &'static str {
        "compliance"
    }

    fn description(&self) -> &'static str {
        "Checking standards compliance"
    }

    fn analyze(&self, ctx: &RepoContext) -> Result<AnalyzerOutput> {
        let python_files = ctx.files_with_extensions(PYTHON_EXTENSIONS)?;
        let script_files = ctx.files_with_extensions(SCRIPT_EXTENSIONS)?;
        let linters = detect_linters(ctx, !python_files.is_empty(), !script_files.is_empty());

        let mut standards = Vec::new();
        let mut violations: Vec<String> = Vec::new();

        if ctx.any_exists(SECURITY_DOCS) {
            standards.push("Security documentation present".to_string());
        } else {
            violations.push("Missing security documentation".to_string());
        }
        if ctx.any_exists(DEPENDENCY_MANIFESTS) {
            standards.push("Dependency management present".to_string());
        } else {
            violations.push("No dependency files found".to_string());
        }
        if ctx.any_exists(UPDATE_BOTS) {
            standards.push("Automated dependency updates".to_string());
        }
        if ctx.any_exists(CODE_OWNERS) {
            standards.push("Code owners defined".to_string());
        }
        if ctx.any_exists(LICENSES) {
            standards.push("License declared".to_string());
        }

        let secret_candidates = ctx.files_with_extensions(&["py", "js", "ts", "json", "yml", "yaml"])?;
        let secrets: Vec<String> = secret_candidates
            .iter()
            .take(SECRET_SAMPLE)
            .filter(|p| ctx.read(p).is_some_and(|text| SECRET_ASSIGNMENT.is_match(&text)))
            .map(|p| format!("Potential secret in {}", ctx.display_path(p)))
            .collect();
        if secrets.is_empty() {
            standards.push("No hardcoded secrets detected".to_string());
        } else {
            violations.extend(secrets.into_iter().take(3));
        }

        let mut sources: Vec<_> = python_files.iter().chain(script_files.iter()).cloned().collect();
        sources.sort();
        let mut issues = Vec::new();
        for path in sources.iter().take(QUALITY_SAMPLE) {
            let Some(text) = ctx.read(path) else { continue };
            let is_python = path.extension().is_some_and(|e| e == "py");
            issues.extend(quality_issues(&ctx.display_path(path), &text, is_python));
        }

        let linting = !linters.is_empty();
        let score = compliance_score(linting, standards.len(), issues.len());

        let mut recommendations = Vec::new();
        if !linting {
            recommendations.push("Configure linters and formatters for the project languages");
        }
        if standards.len() < 3 {
            recommendations.push("Implement more security standards (OWASP, etc.)");
        }
        if !issues.is_empty() {
            recommendations.push("Address code quality anti-patterns");
        }

        let linter_names: Vec<&str> = linters.iter().map(|(name, _)| *name).collect();
        let values = json!({
            "linting_configured": linting,
            "linters": linter_names,
            "style_standard": linter_names.first(),
            "security_standards": standards,
            "code_quality_issues": issues,
            "violations": violations,
            "compliance_score": score,
            "compliance_level": quality_label(score),
            "recommendations": recommendations
        });
        Ok(AnalyzerOutput::section("compliance_analysis", into_map(values)))
    }
}

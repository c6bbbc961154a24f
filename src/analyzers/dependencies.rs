//! Declared-but-unimported dependencies for JavaScript and Python projects.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};

use super::{percent, AnalyzerOutput, RepoAnalyzer, RepoContext, PYTHON_EXTENSIONS, SCRIPT_EXTENSIONS};
use crate::errors::{Error, Result, ResultExt};
use crate::io::read_lossy;

static JS_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"import\s+[^'"]*?\s+from\s+['"]([^'"]+)['"]|import\s*\(\s*['"]([^'"]+)['"]|require\(\s*['"]([^'"]+)['"]|import\s+['"]([^'"]+)['"]"#)
        .unwrap()
});

static PY_IMPORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*(?:import|from)\s+([A-Za-z_]\w*)").unwrap());

static REQUIREMENT_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Za-z0-9][A-Za-z0-9._-]*)").unwrap());

const REQUIREMENT_FILES: &[&str] = &["requirements.txt", "requirements-dev.txt", "requirements/base.txt"];

/// Packaging tools that are never imported
const BUILD_TOOLS: &[&str] = &["pip", "setuptools", "wheel"];

pub struct JsDependenciesAnalyzer;

impl RepoAnalyzer for JsDependenciesAnalyzer {
    fn name(&self) -> &'static str {
        "js_dependencies"
    }

    fn description(&self) -> &'static str {
        "Analyzing JavaScript dependencies"
    }

    fn analyze(&self, ctx: &RepoContext) -> Result<AnalyzerOutput> {
        let manifest = ctx.root.join("package.json");
        let report = if manifest.is_file() {
            let text = read_lossy(&manifest)?;
            let package: Value = serde_json::from_str(&text)
                .map_err(Error::from)
                .context("Invalid package.json")?;
            let mut imported = BTreeSet::new();
            for path in ctx.files_with_extensions(SCRIPT_EXTENSIONS)? {
                if let Some(source) = ctx.read(&path) {
                    imported.extend(js_imports(&source));
                }
            }
            js_report(&package, &imported)
        } else {
            json!({
                "has_package_json": false,
                "unused_dependencies": [],
                "unused_dev_dependencies": [],
                "total_dependencies": 0,
                "total_dev_dependencies": 0
            })
        };

        let mut values = Map::new();
        values.insert("js_dependencies".into(), report);
        Ok(AnalyzerOutput::top_level(values))
    }
}

/// Package names referenced by import/require statements, reduced to their
/// base name (`lodash/fp` → `lodash`, `@scope/pkg/x` → `@scope/pkg`)
pub fn js_imports(source: &str) -> BTreeSet<String> {
    JS_IMPORT
        .captures_iter(source)
        .filter_map(|c| (1..=4).find_map(|i| c.get(i)).map(|m| m.as_str()))
        .filter(|spec| !spec.starts_with('.') && !spec.starts_with('/'))
        .map(base_package)
        .collect()
}

fn base_package(spec: &str) -> String {
    let mut parts = spec.split('/');
    match (parts.next(), parts.next()) {
        (Some(scope), Some(name)) if scope.starts_with('@') => format!("{}/{}", scope, name),
        (Some(name), _) => name.to_string(),
        _ => spec.to_string(),
    }
}

fn js_report(package: &Value, imported: &BTreeSet<String>) -> Value {
    let names = |key: &str| -> Vec<String> {
        package
            .get(key)
            .and_then(Value::as_object)
            .map(|deps| deps.keys().cloned().collect())
            .unwrap_or_default()
    };
    let dependencies = names("dependencies");
    let dev_dependencies = names("devDependencies");
    let unused = |deps: &[String]| -> Vec<String> {
        deps.iter().filter(|d| !imported.contains(*d)).cloned().collect()
    };
    let unused_deps = unused(&dependencies);
    let unused_dev = unused(&dev_dependencies);

    let usage_rate = if dependencies.is_empty() {
        100.0
    } else {
        percent(dependencies.len() - unused_deps.len(), dependencies.len())
    };

    json!({
        "has_package_json": true,
        "unused_dependencies": unused_deps,
        "unused_dev_dependencies": unused_dev,
        "total_dependencies": dependencies.len(),
        "total_dev_dependencies": dev_dependencies.len(),
        "dependency_usage_rate": usage_rate
    })
}

pub struct PythonDependenciesAnalyzer;

impl RepoAnalyzer for PythonDependenciesAnalyzer {
    fn name(&self) -> &'static str {
        "python_dependencies"
    }

    fn description(&self) -> &'static str {
        "Analyzing Python dependencies"
    }

    fn analyze(&self, ctx: &RepoContext) -> Result<AnalyzerOutput> {
        let requirements = REQUIREMENT_FILES
            .iter()
            .map(|f| ctx.root.join(f))
            .find(|p| p.is_file());

        let report = match requirements {
            Some(path) => {
                let required = parse_requirements(&read_lossy(&path)?);
                let mut imported = BTreeSet::new();
                for path in ctx.files_with_extensions(PYTHON_EXTENSIONS)? {
                    if let Some(source) = ctx.read(&path) {
                        imported.extend(python_imports(&source));
                    }
                }
                python_report(&required, &imported)
            }
            None => json!({
                "has_requirements": false,
                "unused_packages": [],
                "total_packages": 0
            }),
        };

        let mut values = Map::new();
        values.insert("python_dependencies".into(), report);
        Ok(AnalyzerOutput::top_level(values))
    }
}

fn normalize_package(name: &str) -> String {
    name.to_lowercase().replace('_', "-")
}

/// Requirement names with version specifiers, extras and markers removed
pub fn parse_requirements(text: &str) -> BTreeSet<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with('-'))
        .filter_map(|l| REQUIREMENT_NAME.captures(l))
        .map(|c| normalize_package(&c[1]))
        .collect()
}

pub fn python_imports(source: &str) -> BTreeSet<String> {
    PY_IMPORT
        .captures_iter(source)
        .map(|c| normalize_package(&c[1]))
        .collect()
}

fn python_report(required: &BTreeSet<String>, imported: &BTreeSet<String>) -> Value {
    let unused: Vec<&String> = required
        .iter()
        .filter(|p| !imported.contains(*p) && !BUILD_TOOLS.contains(&p.as_str()))
        .collect();
    let usage_rate = if required.is_empty() {
        100.0
    } else {
        percent(required.len() - unused.len(), required.len())
    };

    json!({
        "has_requirements": true,
        "unused_packages": unused,
        "total_packages": required.len(),
        "package_usage_rate": usage_rate
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QualityConfig;
    use indoc::indoc;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_js_imports_reduce_to_base_package() {
        let source = indoc! {r#"
            import React from 'react';
            import { map } from "lodash/fp";
            const x = require('@scope/pkg/sub');
            const y = await import('chalk');
            import './styles.css';
            import local from '../local';
        "#};
        let imports: Vec<_> = js_imports(source).into_iter().collect();
        assert_eq!(imports, vec!["@scope/pkg", "chalk", "lodash", "react"]);
    }

    #[test]
    fn test_requirements_parsing() {
        let text = "# deps\nrequests>=2.0\nPyYAML==6.0\ntyping_extensions\n-r other.txt\nuvicorn[standard]\n";
        let names: Vec<_> = parse_requirements(text).into_iter().collect();
        assert_eq!(names, vec!["pyyaml", "requests", "typing-extensions", "uvicorn"]);
    }

    #[test]
    fn test_js_analyzer_reports_unused() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"dependencies": {"react": "18", "left-pad": "1"}, "devDependencies": {"jest": "29"}}"#,
        )
        .unwrap();
        fs::write(dir.path().join("index.js"), "import React from 'react';\n").unwrap();

        let config = QualityConfig::default();
        let output = JsDependenciesAnalyzer
            .analyze(&RepoContext::new(dir.path(), &config))
            .unwrap();
        let report = &output.values["js_dependencies"];
        assert_eq!(report["unused_dependencies"], json!(["left-pad"]));
        assert_eq!(report["unused_dev_dependencies"], json!(["jest"]));
        assert_eq!(report["dependency_usage_rate"], json!(50.0));
    }

    #[test]
    fn test_js_analyzer_without_manifest() {
        let dir = TempDir::new().unwrap();
        let config = QualityConfig::default();
        let output = JsDependenciesAnalyzer
            .analyze(&RepoContext::new(dir.path(), &config))
            .unwrap();
        assert_eq!(output.values["js_dependencies"]["has_package_json"], json!(false));
    }

    #[test]
    fn test_python_analyzer_reports_unused() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("requirements.txt"), "requests\nflask\nsetuptools\n").unwrap();
        fs::write(dir.path().join("app.py"), "import requests\n").unwrap();

        let config = QualityConfig::default();
        let output = PythonDependenciesAnalyzer
            .analyze(&RepoContext::new(dir.path(), &config))
            .unwrap();
        let report = &output.values["python_dependencies"];
        assert_eq!(report["unused_packages"], json!(["flask"]));
        assert_eq!(report["total_packages"], json!(3));
    }
}

//! Presence of well-known configuration files at the repository root.

use serde_json::{Map, Value};

use super::{AnalyzerOutput, RepoAnalyzer, RepoContext};
use crate::errors::Result;

/// Label reported in `config_files` and the paths that satisfy it
pub const CONFIG_CHECKS: &[(&str, &[&str])] = &[
    ("GitHub Actions Workflow", &[".github/workflows"]),
    ("GitLab CI", &[".gitlab-ci.yml"]),
    ("CircleCI", &[".circleci/config.yml"]),
    ("package.json", &["package.json"]),
    ("tsconfig.json", &["tsconfig.json"]),
    (
        "ESLint Config",
        &[".eslintrc.js", ".eslintrc.json", ".eslintrc.yml", "eslint.config.js"],
    ),
    (
        "Prettier Config",
        &[".prettierrc", ".prettierrc.json", "prettier.config.js"],
    ),
    ("requirements.txt", &["requirements.txt"]),
    ("setup.py", &["setup.py"]),
    ("pyproject.toml", &["pyproject.toml"]),
    ("Pipfile", &["Pipfile"]),
    ("poetry.lock", &["poetry.lock"]),
    ("pylint Config", &[".pylintrc", "pylintrc"]),
    ("pytest Config", &["pytest.ini", "pyproject.toml"]),
    (".env", &[".env"]),
    (".env.example", &[".env.example"]),
    ("Security Policy", &["SECURITY.md"]),
    ("Dockerfile", &["Dockerfile"]),
    ("docker-compose.yml", &["docker-compose.yml"]),
    ("README.md", &["README.md"]),
    ("LICENSE", &["LICENSE", "LICENSE.md", "LICENSE.txt"]),
    ("CONTRIBUTING.md", &["CONTRIBUTING.md"]),
    ("jest.config.js", &["jest.config.js"]),
    ("vitest.config", &["vitest.config.js", "vitest.config.ts"]),
    (".gitignore", &[".gitignore"]),
];

pub struct ConfigFilesAnalyzer;

impl RepoAnalyzer for ConfigFilesAnalyzer {
    fn name(&self) -> &'static str {
        "config_files"
    }

    fn description(&self) -> &'static str {
        "Detecting configuration files"
    }

    fn analyze(&self, ctx: &RepoContext) -> Result<AnalyzerOutput> {
        let mut values = Map::new();
        values.insert("config_files".into(), Value::Object(detect_config_files(ctx)));
        Ok(AnalyzerOutput::top_level(values))
    }
}

pub fn detect_config_files(ctx: &RepoContext) -> Map<String, Value> {
    CONFIG_CHECKS
        .iter()
        .map(|(label, paths)| (label.to_string(), Value::Bool(ctx.any_exists(paths))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QualityConfig;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_detects_present_and_absent_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".github/workflows")).unwrap();
        fs::write(dir.path().join("README.md"), "# x").unwrap();
        fs::write(dir.path().join("LICENSE.txt"), "MIT").unwrap();
        fs::write(dir.path().join("pyproject.toml"), "[project]").unwrap();

        let config = QualityConfig::default();
        let files = detect_config_files(&RepoContext::new(dir.path(), &config));

        assert_eq!(files.len(), CONFIG_CHECKS.len());
        assert_eq!(files["GitHub Actions Workflow"], Value::Bool(true));
        assert_eq!(files["README.md"], Value::Bool(true));
        assert_eq!(files["LICENSE"], Value::Bool(true));
        assert_eq!(files["pytest Config"], Value::Bool(true));
        assert_eq!(files[".gitignore"], Value::Bool(false));
        assert_eq!(files["Security Policy"], Value::Bool(false));
    }
}

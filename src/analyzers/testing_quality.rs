//! Test suite heuristics: test files, test functions, assertion density,
//! test-to-code ratio and common anti-patterns.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};

use super::{into_map, round1, AnalyzerOutput, RepoAnalyzer, RepoContext, SOURCE_EXTENSIONS};
use crate::errors::Result;

static PY_TEST_DEF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*(?:async[ \t]+)?def[ \t]+(test\w*)[ \t]*\(").unwrap());
static PY_BLOCK_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*(?:async[ \t]+)?(?:def |class |@)").unwrap());
static JS_TEST_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\b(?:it|test)(?:\.only|\.skip)?\s*\(\s*['"`]([^'"`]+)['"`]"#).unwrap());
static JS_TEST_FN: Lazy<Regex> = Lazy::new(|| Regex::new(r"function\s+(test\w+)").unwrap());

static PY_ASSERTIONS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"\bassert\s+", r"self\.assert\w*\s*\(", r"pytest\.raises"]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
});
static JS_ASSERTIONS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"\bexpect\s*\(", r"\bassert\s*[.(]", r"\.should\b"]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
});
static ASSERTION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bassert|\bexpect\s*\(|self\.assert|pytest\.raises").unwrap());

static SLEEP_CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"time\.sleep\s*\(|\bsetTimeout\s*\(|\bsleep\s*\(").unwrap());
static EMPTY_PY_TEST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"def\s+test\w*\s*\([^)]*\)\s*(?:->\s*\w+\s*)?:\s*(?:pass|\.\.\.)\s*$").unwrap());
static EMPTY_JS_TEST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\b(?:it|test)\s*\(\s*['"`][^'"`]*['"`]\s*,\s*(?:async\s*)?\(\s*\)\s*=>\s*\{\s*\}"#).unwrap());
static PRINT_DEBUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*(?:print\s*\(|console\.log\s*\()").unwrap());

/// Framework name, files that indicate it, and source markers
const FRAMEWORKS: &[(&str, &[&str], &[&str])] = &[
    ("pytest", &["pytest.ini", "conftest.py"], &["import pytest", "from pytest"]),
    ("unittest", &[], &["import unittest", "from unittest"]),
    ("jest", &["jest.config.js", "jest.config.ts"], &["from '@jest", "jest.fn("]),
    ("vitest", &["vitest.config.js", "vitest.config.ts"], &["from 'vitest'", "from \"vitest\""]),
    ("mocha", &[".mocharc.js", ".mocharc.json", ".mocharc.yml"], &["require('mocha')"]),
    ("cypress", &["cypress.config.js", "cypress.config.ts"], &["cy.visit("]),
    ("playwright", &["playwright.config.ts", "playwright.config.js"], &["@playwright/test"]),
];

/// Whether a path names a test file, by file name or enclosing directory
pub fn is_test_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let in_test_dir = path.components().any(|c| {
        matches!(
            c.as_os_str().to_str(),
            Some("tests") | Some("test") | Some("__tests__")
        )
    });

    if name.ends_with(".py") {
        name.starts_with("test_") || name.ends_with("_test.py") || (in_test_dir && name != "__init__.py")
    } else {
        name.contains(".test.") || name.contains(".spec.") || in_test_dir
    }
}

/// Per-file test statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestFileStats {
    pub test_functions: Vec<String>,
    pub assertions: usize,
    pub anti_patterns: Vec<String>,
    pub missing_assertions: Vec<String>,
}

pub fn analyze_test_source(file_name: &str, source: &str) -> TestFileStats {
    let python = file_name.ends_with(".py");
    let test_functions = if python {
        PY_TEST_DEF.captures_iter(source).map(|c| c[1].to_string()).collect()
    } else {
        let mut names: Vec<String> = JS_TEST_CALL
            .captures_iter(source)
            .chain(JS_TEST_FN.captures_iter(source))
            .map(|c| c[1].to_string())
            .collect();
        names.sort();
        names.dedup();
        names
    };

    let patterns = if python { &*PY_ASSERTIONS } else { &*JS_ASSERTIONS };
    let assertions = patterns.iter().map(|p| p.find_iter(source).count()).sum();

    let mut anti_patterns = Vec::new();
    if SLEEP_CALL.is_match(source) {
        anti_patterns.push(format!("Sleep/delay detected in {}", file_name));
    }
    let empty = if python {
        source.lines().any(|l| EMPTY_PY_TEST.is_match(l)) || has_empty_python_body(source)
    } else {
        EMPTY_JS_TEST.is_match(source)
    };
    if empty {
        anti_patterns.push(format!("Empty test function in {}", file_name));
    }
    if PRINT_DEBUG.is_match(source) {
        anti_patterns.push(format!("Print debugging in {}", file_name));
    }

    let missing_assertions = if python {
        python_test_bodies(source)
            .into_iter()
            .filter(|(_, body)| !ASSERTION_MARKER.is_match(body))
            .map(|(name, _)| format!("{} in {}", name, file_name))
            .collect()
    } else {
        Vec::new()
    };

    TestFileStats {
        test_functions,
        assertions,
        anti_patterns,
        missing_assertions,
    }
}

/// `(name, body)` of each Python test function; a body runs until the next
/// def, class or decorator line
fn python_test_bodies(source: &str) -> Vec<(String, &str)> {
    PY_TEST_DEF
        .captures_iter(source)
        .filter_map(|c| {
            let whole = c.get(0)?;
            let start = whole.end();
            let end = PY_BLOCK_START
                .find_at(source, start)
                .map(|m| m.start())
                .unwrap_or(source.len());
            Some((c[1].to_string(), &source[start..end]))
        })
        .collect()
}

fn has_empty_python_body(source: &str) -> bool {
    python_test_bodies(source).iter().any(|(_, body)| {
        // skip the rest of the signature line
        let statements: Vec<&str> = body
            .lines()
            .skip(1)
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .collect();
        statements == ["pass"] || statements == ["..."]
    })
}

pub fn detect_frameworks(ctx: &RepoContext, test_sources: &[String]) -> Vec<String> {
    let package_json = ctx
        .read(&ctx.root.join("package.json"))
        .unwrap_or_default();

    FRAMEWORKS
        .iter()
        .filter(|(name, files, markers)| {
            ctx.any_exists(files)
                || package_json.contains(&format!("\"{}\"", name))
                || test_sources
                    .iter()
                    .any(|src| markers.iter().any(|m| src.contains(m)))
        })
        .map(|(name, _, _)| name.to_string())
        .collect()
}

/// Score out of 100 from ratio, density, anti-pattern and missing-assertion
/// bands
pub fn quality_score(test_to_code_ratio: f64, assertion_density: f64, anti_patterns: usize, missing: usize) -> u32 {
    let ratio = match test_to_code_ratio {
        r if r >= 100.0 => 30,
        r if r >= 50.0 => 20,
        r if r >= 25.0 => 10,
        _ => 0,
    };
    let density = match assertion_density {
        d if d >= 3.0 => 30,
        d if d >= 2.0 => 20,
        d if d >= 1.0 => 10,
        _ => 0,
    };
    let band = |count: usize| match count {
        0 => 20,
        1..=2 => 10,
        _ => 0,
    };
    (ratio + density + band(anti_patterns) + band(missing)).min(100)
}

fn quality_label(score: u32) -> &'static str {
    match score {
        80.. => "Excellent",
        60..=79 => "Good",
        40..=59 => "Fair",
        _ => "Poor",
    }
}

pub struct TestingQualityAnalyzer;

impl RepoAnalyzer for TestingQualityAnalyzer {
    fn name(&self) -> &'static str {
        "testing_quality"
    }

    fn description(&self) -> &'static str {
        "Analyzing testing quality"
    }

    fn analyze(&self, ctx: &RepoContext) -> Result<AnalyzerOutput> {
        let sources = ctx.files_with_extensions(SOURCE_EXTENSIONS)?;
        let (test_paths, code_paths): (Vec<_>, Vec<_>) = sources
            .into_iter()
            .partition(|p| is_test_file(p.strip_prefix(ctx.root).unwrap_or(p)));

        let mut test_sources = Vec::new();
        let mut totals = TestFileStats::default();
        let mut test_lines = 0usize;
        for path in &test_paths {
            let Some(text) = ctx.read(path) else { continue };
            let display = ctx.display_path(path);
            let stats = analyze_test_source(&display, &text);
            test_lines += text.lines().count();
            totals.test_functions.extend(stats.test_functions);
            totals.assertions += stats.assertions;
            totals.anti_patterns.extend(stats.anti_patterns);
            totals.missing_assertions.extend(stats.missing_assertions);
            test_sources.push(text);
        }

        let frameworks = detect_frameworks(ctx, &test_sources);
        if test_paths.is_empty() {
            return Ok(AnalyzerOutput::section("testing_quality", no_tests(&frameworks)));
        }

        let code_lines: usize = code_paths
            .iter()
            .filter_map(|p| ctx.read(p))
            .map(|t| t.lines().count())
            .sum();

        let ratio = if code_lines > 0 {
            round1(test_lines as f64 / code_lines as f64 * 100.0)
        } else {
            0.0
        };
        let function_count = totals.test_functions.len();
        let density = if function_count > 0 {
            round1(totals.assertions as f64 / function_count as f64)
        } else {
            0.0
        };
        let score = quality_score(
            ratio,
            density,
            totals.anti_patterns.len(),
            totals.missing_assertions.len(),
        );

        let mut recommendations = Vec::new();
        if ratio < 50.0 {
            recommendations.push("Increase test-to-code ratio to at least 50%");
        }
        if density < 2.0 {
            recommendations.push("Add more assertions per test function (aim for 2-3)");
        }
        if !totals.anti_patterns.is_empty() {
            recommendations.push("Fix test anti-patterns for better reliability");
        }
        if !totals.missing_assertions.is_empty() {
            recommendations.push("Add assertions to tests that lack them");
        }

        let values = json!({
            "total_test_files": test_paths.len(),
            "total_test_functions": function_count,
            "total_assertions": totals.assertions,
            "test_to_code_ratio": ratio,
            "assertion_density": density,
            "frameworks": frameworks,
            "anti_patterns": totals.anti_patterns,
            "missing_assertions": totals.missing_assertions,
            "test_quality_score": score,
            "test_quality": quality_label(score),
            "recommendations": recommendations
        });
        Ok(AnalyzerOutput::section("testing_quality", into_map(values)))
    }
}

fn no_tests(frameworks: &[String]) -> Map<String, Value> {
    into_map(json!({
        "total_test_files": 0,
        "total_test_functions": 0,
        "total_assertions": 0,
        "test_to_code_ratio": 0,
        "assertion_density": 0,
        "frameworks": frameworks,
        "anti_patterns": [],
        "missing_assertions": [],
        "test_quality_score": 0,
        "test_quality": "No tests found",
        "recommendations": [
            "Add comprehensive test suite",
            "Implement unit tests for critical functions"
        ]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QualityConfig;
    use indoc::indoc;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_test_file_detection() {
        assert!(is_test_file(Path::new("test_app.py")));
        assert!(is_test_file(Path::new("app_test.py")));
        assert!(is_test_file(Path::new("tests/helpers.py")));
        assert!(!is_test_file(Path::new("tests/__init__.py")));
        assert!(is_test_file(Path::new("src/app.test.ts")));
        assert!(is_test_file(Path::new("src/app.spec.js")));
        assert!(is_test_file(Path::new("src/__tests__/app.js")));
        assert!(!is_test_file(Path::new("src/app.py")));
        assert!(!is_test_file(Path::new("src/latest.js")));
    }

    #[test]
    fn test_python_test_source() {
        let source = indoc! {"
            import pytest

            def test_adds():
                assert add(1, 2) == 3
                assert add(0, 0) == 0

            def test_nothing():
                value = compute()

            def test_empty():
                pass
        "};
        let stats = analyze_test_source("test_math.py", source);
        assert_eq!(stats.test_functions, vec!["test_adds", "test_nothing", "test_empty"]);
        assert_eq!(stats.assertions, 2);
        assert_eq!(
            stats.missing_assertions,
            vec!["test_nothing in test_math.py", "test_empty in test_math.py"]
        );
        assert_eq!(stats.anti_patterns, vec!["Empty test function in test_math.py"]);
    }

    #[test]
    fn test_js_test_source() {
        let source = indoc! {r#"
            describe('math', () => {
              it('adds', () => {
                expect(add(1, 2)).toBe(3);
              });
              test('waits', async () => {
                await new Promise(r => setTimeout(r, 500));
                expect(true).toBe(true);
              });
            });
        "#};
        let stats = analyze_test_source("math.test.js", source);
        assert_eq!(stats.test_functions, vec!["adds", "waits"]);
        assert_eq!(stats.assertions, 2);
        assert_eq!(stats.anti_patterns, vec!["Sleep/delay detected in math.test.js"]);
    }

    #[test]
    fn test_quality_score_bands() {
        assert_eq!(quality_score(120.0, 3.5, 0, 0), 100);
        assert_eq!(quality_score(60.0, 2.0, 1, 3), 20 + 20 + 10);
        assert_eq!(quality_score(10.0, 0.5, 5, 5), 0);
        assert_eq!(quality_label(80), "Excellent");
        assert_eq!(quality_label(45), "Fair");
    }

    #[test]
    fn test_analyzer_on_repository() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("tests")).unwrap();
        fs::write(dir.path().join("app.py"), "def add(a, b):\n    return a + b\n").unwrap();
        fs::write(
            dir.path().join("tests/test_app.py"),
            "import pytest\n\ndef test_add():\n    assert add(1, 2) == 3\n    assert add(2, 2) == 4\n",
        )
        .unwrap();

        let config = QualityConfig::default();
        let output = TestingQualityAnalyzer
            .analyze(&RepoContext::new(dir.path(), &config))
            .unwrap();
        let v = &output.values;
        assert_eq!(v["total_test_files"], json!(1));
        assert_eq!(v["total_test_functions"], json!(1));
        assert_eq!(v["assertion_density"], json!(2.0));
        assert_eq!(v["test_to_code_ratio"], json!(250.0));
        assert_eq!(v["frameworks"], json!(["pytest"]));
        // ratio 30 + density 20 + clean 20 + all asserted 20
        assert_eq!(v["test_quality_score"], json!(90));
    }

    #[test]
    fn test_analyzer_without_tests() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.py"), "x = 1\n").unwrap();
        let config = QualityConfig::default();
        let output = TestingQualityAnalyzer
            .analyze(&RepoContext::new(dir.path(), &config))
            .unwrap();
        assert_eq!(output.values["total_test_files"], json!(0));
        assert_eq!(output.values["test_quality"], json!("No tests found"));
    }
}

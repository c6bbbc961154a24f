//! Documentation completeness: project documents plus docstring/JSDoc and
//! inline comment coverage.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use tree_sitter::Node;

use super::{into_map, quality_label, percent, round1, AnalyzerOutput, RepoAnalyzer, RepoContext, SOURCE_EXTENSIONS};
use crate::complexity::parser::{node_text, parse_source, visit, Grammar};
use crate::errors::Result;

const README_FILES: &[&str] = &["README.md", "README.rst", "README.txt", "readme.md"];
const CHANGELOG_FILES: &[&str] = &["CHANGELOG.md", "CHANGES.md", "HISTORY.md"];
const CONTRIBUTING_FILES: &[&str] = &["CONTRIBUTING.md", "CONTRIBUTING.rst"];
const LICENSE_FILES: &[&str] = &["LICENSE", "LICENSE.md", "LICENSE.txt"];
const API_DOC_FILES: &[&str] = &["swagger.json", "swagger.yaml", "openapi.json", "openapi.yaml"];
const DOCS_DIRS: &[&str] = &["docs", "doc"];
const README_SECTIONS: &[&str] = &["installation", "usage", "contributing", "license"];
const MAX_UNDOCUMENTED_LISTED: usize = 50;

static JS_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:export\s+)?(?:default\s+)?(?:async\s+)?(?:function\s*\*?\s*(\w+)|(?:const|let|var)\s+(\w+)\s*=\s*(?:async\s+)?(?:function\b|\([^)]*\)\s*=>|\w+\s*=>))",
    )
    .unwrap()
});

/// Function documentation counts for one or more files
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocCoverage {
    pub functions: usize,
    pub documented: usize,
    pub undocumented: Vec<String>,
    pub total_lines: usize,
    pub comment_lines: usize,
}

impl DocCoverage {
    fn add(&mut self, other: DocCoverage) {
        self.functions += other.functions;
        self.documented += other.documented;
        self.undocumented.extend(other.undocumented);
        self.total_lines += other.total_lines;
        self.comment_lines += other.comment_lines;
    }

    pub fn docstring_pct(&self) -> Option<f64> {
        (self.functions > 0).then(|| percent(self.documented, self.functions))
    }

    pub fn comment_ratio(&self) -> f64 {
        round1(percent(self.comment_lines, self.total_lines))
    }

    /// Mean of docstring coverage and doubled comment ratio, 0 without
    /// functions
    pub fn quality_score(&self) -> f64 {
        match self.docstring_pct() {
            Some(pct) => round1((pct + (self.comment_ratio() * 2.0).min(100.0)) / 2.0),
            None => 0.0,
        }
    }
}

pub fn python_doc_coverage(file: &str, source: &str) -> DocCoverage {
    let mut coverage = DocCoverage {
        total_lines: source.lines().count(),
        comment_lines: source.lines().filter(|l| l.trim_start().starts_with('#')).count(),
        ..Default::default()
    };

    let Ok(tree) = parse_source(source, Grammar::Python) else {
        return coverage;
    };
    visit(tree.root_node(), &mut |node| {
        if node.kind() != "function_definition" {
            return;
        }
        coverage.functions += 1;
        if has_docstring(node) {
            coverage.documented += 1;
        } else {
            let name = node
                .child_by_field_name("name")
                .map(|n| node_text(&n, source))
                .unwrap_or("<anonymous>");
            coverage.undocumented.push(format!("{}:{}", file, name));
        }
    });
    coverage
}

fn has_docstring(function: Node) -> bool {
    function
        .child_by_field_name("body")
        .and_then(|body| body.named_child(0))
        .filter(|first| first.kind() == "expression_statement")
        .and_then(|stmt| stmt.named_child(0))
        .is_some_and(|expr| expr.kind() == "string")
}

/// JSDoc coverage: a function counts as documented when the closest
/// preceding non-blank line closes a `/** ... */` block
pub fn script_doc_coverage(file: &str, source: &str) -> DocCoverage {
    let mut coverage = DocCoverage {
        total_lines: source.lines().count(),
        ..Default::default()
    };
    let mut in_jsdoc = false;
    let mut in_block = false;
    let mut jsdoc_ready = false;

    for line in source.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if in_block {
            coverage.comment_lines += 1;
            if trimmed.contains("*/") {
                in_block = false;
                jsdoc_ready = in_jsdoc;
                in_jsdoc = false;
            }
            continue;
        }
        if trimmed.starts_with("/*") {
            coverage.comment_lines += 1;
            let is_jsdoc = trimmed.starts_with("/**");
            if trimmed.contains("*/") {
                jsdoc_ready = is_jsdoc;
            } else {
                in_block = true;
                in_jsdoc = is_jsdoc;
            }
            continue;
        }
        if trimmed.starts_with("//") {
            coverage.comment_lines += 1;
            continue;
        }

        if let Some(caps) = JS_FUNCTION.captures(line) {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or("<anonymous>");
            coverage.functions += 1;
            if jsdoc_ready {
                coverage.documented += 1;
            } else {
                coverage.undocumented.push(format!("{}:{}", file, name));
            }
        }
        jsdoc_ready = false;
    }
    coverage
}

fn readme_quality(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    match README_SECTIONS.iter().filter(|s| lower.contains(*s)).count() {
        3.. => "Comprehensive",
        2 => "Good",
        1 => "Basic",
        _ => "Minimal",
    }
}

/// `min(100, docstring quality + 20 readme + 10 license + 10 contributing
/// + 5 changelog)`
pub fn overall_docs_score(docstring_quality: f64, readme: bool, license: bool, contributing: bool, changelog: bool) -> f64 {
    let bonus = |present: bool, points: f64| if present { points } else { 0.0 };
    (docstring_quality
        + bonus(readme, 20.0)
        + bonus(license, 10.0)
        + bonus(contributing, 10.0)
        + bonus(changelog, 5.0))
    .min(100.0)
}

pub struct DocumentationAnalyzer;

impl RepoAnalyzer for DocumentationAnalyzer {
    fn name(&self) -> &'static str {
        "documentation"
    }

    fn description(&self) -> &'static str {
        "Analyzing documentation"
    }

    fn analyze(&self, ctx: &RepoContext) -> Result<AnalyzerOutput> {
        let readme = README_FILES
            .iter()
            .map(|f| ctx.root.join(f))
            .find(|p| p.is_file());
        let readme_present = readme.is_some();
        let readme_quality = readme
            .as_deref()
            .and_then(|p| ctx.read(p))
            .map(|text| readme_quality(&text))
            .unwrap_or("Not found");
        let changelog = ctx.any_exists(CHANGELOG_FILES);
        let contributing = ctx.any_exists(CONTRIBUTING_FILES);
        let license = ctx.any_exists(LICENSE_FILES);
        let api_docs = ctx.any_exists(API_DOC_FILES);
        let docs_dir = DOCS_DIRS.iter().any(|d| ctx.root.join(d).is_dir());

        let mut coverage = DocCoverage::default();
        let mut files = ctx.files_with_extensions(SOURCE_EXTENSIONS)?;
        files.truncate(ctx.config.analysis.max_complexity_files);
        for path in &files {
            let Some(text) = ctx.read(path) else { continue };
            let display = ctx.display_path(path);
            let file_coverage = match path.extension().and_then(|e| e.to_str()) {
                Some("py") => python_doc_coverage(&display, &text),
                _ => script_doc_coverage(&display, &text),
            };
            coverage.add(file_coverage);
        }

        let docstring_quality = coverage.quality_score();
        let comment_ratio = coverage.comment_ratio();
        let score = overall_docs_score(docstring_quality, readme_present, license, contributing, changelog);

        let mut gaps = Vec::new();
        if !readme_present {
            gaps.push("Missing README file");
        }
        if !license {
            gaps.push("Missing LICENSE file");
        }
        if docstring_quality < 50.0 {
            gaps.push("Low docstring coverage (<50%)");
        }
        if comment_ratio < 10.0 {
            gaps.push("Low inline comment ratio (<10%)");
        }

        let mut undocumented = coverage.undocumented.clone();
        undocumented.truncate(MAX_UNDOCUMENTED_LISTED);

        let values = json!({
            "readme_present": readme_present,
            "readme_quality": readme_quality,
            "changelog_present": changelog,
            "contributing_present": contributing,
            "license_present": license,
            "api_docs_present": api_docs,
            "docs_dir_present": docs_dir,
            "inline_comments_ratio": comment_ratio,
            "total_functions": coverage.functions,
            "functions_with_docstrings": coverage.documented,
            "doc_coverage_percent": coverage.docstring_pct().map(round1),
            "docstring_quality_score": docstring_quality,
            "undocumented_functions": undocumented,
            "documentation_gaps": gaps,
            "docs_quality": quality_label(score),
            "overall_docs_score": score
        });
        Ok(AnalyzerOutput::section("documentation_quality", into_map(values)))
    }
}

//! Line, branch and function coverage from existing coverage reports
//! (LCOV and Cobertura XML).

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use super::{into_map, percent, round1, AnalyzerOutput, RepoAnalyzer, RepoContext};
use crate::errors::{Error, Result};
use crate::io::read_lossy;

const REPORT_NAMES: &[&str] = &["lcov.info", "coverage.xml", "cobertura-coverage.xml"];

/// Covered/total pair inside a Cobertura `condition-coverage` value, e.g. `50% (1/2)`
static CONDITION_COUNTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\((\d+)/(\d+)\)").unwrap());

/// Coverage tooling detected from configuration: (tool, files, marker text)
const COVERAGE_TOOLS: &[(&str, &[&str], Option<&str>)] = &[
    ("coverage.py", &[".coveragerc"], None),
    ("pytest-cov", &["requirements.txt", "requirements-dev.txt", "pyproject.toml", "setup.cfg"], Some("pytest-cov")),
    ("coverage.py", &["pyproject.toml", "setup.cfg", "tox.ini"], Some("[tool.coverage")),
    ("nyc", &[".nycrc", ".nycrc.json"], None),
    ("c8", &["package.json"], Some("\"c8\"")),
    ("jest", &["jest.config.js", "jest.config.ts", "package.json"], Some("collectCoverage")),
    ("codecov", &["codecov.yml", ".codecov.yml"], None),
];

/// Hit counters accumulated across every report found
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoverageTotals {
    pub lines_total: usize,
    pub lines_covered: usize,
    pub branches_total: usize,
    pub branches_covered: usize,
    pub functions_total: usize,
    pub functions_covered: usize,
}

impl CoverageTotals {
    fn add(&mut self, other: CoverageTotals) {
        self.lines_total += other.lines_total;
        self.lines_covered += other.lines_covered;
        self.branches_total += other.branches_total;
        self.branches_covered += other.branches_covered;
        self.functions_total += other.functions_total;
        self.functions_covered += other.functions_covered;
    }

    pub fn line_pct(&self) -> f64 {
        percent(self.lines_covered, self.lines_total)
    }
}

pub struct CoverageAnalyzer;

impl RepoAnalyzer for CoverageAnalyzer {
    fn name(&self) -> &'static str {
        "coverage"
    }

    fn description(&self) -> &'static str {
        "Analyzing code coverage"
    }

    fn analyze(&self, ctx: &RepoContext) -> Result<AnalyzerOutput> {
        let reports = find_reports(ctx)?;
        let tools = detect_coverage_tools(ctx);

        if reports.is_empty() {
            return Ok(AnalyzerOutput::section("coverage_analysis", no_reports(&tools)));
        }

        let mut totals = CoverageTotals::default();
        let mut parsed = Vec::new();
        for path in &reports {
            match parse_report(path) {
                Ok(t) => {
                    totals.add(t);
                    parsed.push(ctx.display_path(path));
                }
                Err(e) => warn!("Skipping coverage report {}: {}", path.display(), e),
            }
        }
        if parsed.is_empty() {
            return Ok(AnalyzerOutput::section("coverage_analysis", no_reports(&tools)));
        }

        Ok(AnalyzerOutput::section(
            "coverage_analysis",
            coverage_metrics(&totals, &parsed, &tools),
        ))
    }
}

fn find_reports(ctx: &RepoContext) -> Result<Vec<PathBuf>> {
    // Reports are usually gitignored, so look at the common spots directly
    // before walking.
    let mut reports: Vec<PathBuf> = ["lcov.info", "coverage/lcov.info", "coverage.xml", "coverage/coverage.xml"]
        .iter()
        .map(|p| ctx.root.join(p))
        .filter(|p| p.is_file())
        .collect();

    for path in ctx.all_files()? {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if REPORT_NAMES.contains(&name) && !reports.contains(&path) {
            reports.push(path);
        }
    }
    debug!("Found {} coverage reports", reports.len());
    Ok(reports)
}

pub fn parse_report(path: &Path) -> Result<CoverageTotals> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("xml") => parse_cobertura(path, &read_lossy(path)?),
        _ => parse_lcov(path),
    }
}

pub fn parse_lcov(path: &Path) -> Result<CoverageTotals> {
    use lcov::{Reader, Record};

    let reader = Reader::open_file(path).map_err(|e| Error::parse(path, e.to_string()))?;
    let mut totals = CoverageTotals::default();

    for record in reader {
        match record.map_err(|e| Error::parse(path, e.to_string()))? {
            Record::LineData { count, .. } => {
                totals.lines_total += 1;
                if count > 0 {
                    totals.lines_covered += 1;
                }
            }
            Record::BranchData { taken, .. } => {
                totals.branches_total += 1;
                if taken.is_some_and(|t| t > 0) {
                    totals.branches_covered += 1;
                }
            }
            Record::FunctionData { count, .. } => {
                totals.functions_total += 1;
                if count > 0 {
                    totals.functions_covered += 1;
                }
            }
            _ => {}
        }
    }
    Ok(totals)
}

/// Count the `<line>` entries of every class; fall back to the root
/// `line-rate` when a report carries no per-line data. Method-level line
/// lists repeat the class lines and are not counted again.
pub fn parse_cobertura(path: &Path, xml: &str) -> Result<CoverageTotals> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    let doc = roxmltree::Document::parse_with_options(xml, options)
        .map_err(|e| Error::parse(path, e.to_string()))?;

    let mut totals = CoverageTotals::default();
    let class_lines = doc.descendants().filter(|n| {
        n.has_tag_name("line")
            && n.parent_element()
                .filter(|p| p.has_tag_name("lines"))
                .and_then(|p| p.parent_element())
                .is_some_and(|c| c.has_tag_name("class"))
    });

    for line in class_lines {
        let hits: u64 = line.attribute("hits").and_then(|h| h.parse().ok()).unwrap_or(0);
        totals.lines_total += 1;
        if hits > 0 {
            totals.lines_covered += 1;
        }
        if line.attribute("branch") != Some("true") {
            continue;
        }
        let conditions = line
            .attribute("condition-coverage")
            .and_then(|value| CONDITION_COUNTS.captures(value))
            .and_then(|c| Some((c[1].parse::<usize>().ok()?, c[2].parse::<usize>().ok()?)));
        match conditions {
            Some((covered, total)) => {
                totals.branches_covered += covered;
                totals.branches_total += total;
            }
            None => {
                totals.branches_total += 1;
                if hits > 0 {
                    totals.branches_covered += 1;
                }
            }
        }
    }

    if totals.lines_total == 0 {
        let rate = doc
            .root_element()
            .attribute("line-rate")
            .and_then(|r| r.parse::<f64>().ok());
        if let Some(rate) = rate {
            totals.lines_total = 1000;
            totals.lines_covered = (rate.clamp(0.0, 1.0) * 1000.0).round() as usize;
        }
    }
    Ok(totals)
}

pub fn detect_coverage_tools(ctx: &RepoContext) -> Vec<String> {
    let mut tools: Vec<String> = Vec::new();
    for (tool, files, marker) in COVERAGE_TOOLS {
        let found = files.iter().map(|f| ctx.root.join(f)).any(|path| {
            if !path.is_file() {
                return false;
            }
            match marker {
                None => true,
                Some(marker) => read_lossy(&path).is_ok_and(|text| text.contains(marker)),
            }
        });
        if found && !tools.iter().any(|t| t.as_str() == *tool) {
            tools.push(tool.to_string());
        }
    }
    tools
}

fn quality_label(line_pct: f64) -> &'static str {
    if line_pct >= 80.0 {
        "Excellent"
    } else if line_pct >= 70.0 {
        "Good"
    } else if line_pct >= 60.0 {
        "Fair"
    } else {
        "Poor"
    }
}

fn no_reports(tools: &[String]) -> Map<String, Value> {
    into_map(json!({
        "coverage_found": false,
        "line_coverage_pct": 0,
        "branch_coverage_pct": 0,
        "function_coverage_pct": 0,
        "lines_covered": 0,
        "lines_total": 0,
        "uncovered_lines": 0,
        "coverage_file": null,
        "coverage_tools": tools,
        "coverage_quality": "No coverage reports found",
        "recommendations": ["Add test coverage reporting to CI/CD pipeline"]
    }))
}

fn coverage_metrics(totals: &CoverageTotals, files: &[String], tools: &[String]) -> Map<String, Value> {
    let line_pct = totals.line_pct();
    let branch_pct = percent(totals.branches_covered, totals.branches_total);

    let mut recommendations = Vec::new();
    if line_pct < 80.0 {
        recommendations.push("Increase line coverage to at least 80%");
    }
    if branch_pct < 75.0 {
        recommendations.push("Improve branch coverage for conditional logic");
    }

    into_map(json!({
        "coverage_found": true,
        "line_coverage_pct": round1(line_pct),
        "branch_coverage_pct": round1(branch_pct),
        "function_coverage_pct": round1(percent(totals.functions_covered, totals.functions_total)),
        "lines_covered": totals.lines_covered,
        "lines_total": totals.lines_total,
        "uncovered_lines": totals.lines_total - totals.lines_covered,
        "coverage_file": files.first(),
        "coverage_files": files,
        "coverage_tools": tools,
        "coverage_quality": quality_label(line_pct),
        "recommendations": recommendations
    }))
}

use std::io::Write;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::{format_number, null_reason, value_text};
use crate::metrics::numeric;
use crate::scoring::{Dimension, ScoreBundle};

/// Rows shown per findings table before the remainder is summarized
const FINDINGS_SHOWN: usize = 10;
const CUSTOM_FINDINGS_SHOWN: usize = 20;
const LIST_ITEMS_SHOWN: usize = 10;

/// Dimensions recommended against below this score; coverage uses 80
const RECOMMENDATION_THRESHOLD: f64 = 70.0;
const COVERAGE_THRESHOLD: f64 = 80.0;

const RECOMMENDATIONS: &[(Dimension, &str, &str)] = &[
    (
        Dimension::Maintainability,
        "Maintainability",
        "Refactor complex functions (CCN > 10) and reduce code duplication.",
    ),
    (
        Dimension::Security,
        "Security",
        "Address critical and high-severity vulnerabilities immediately.",
    ),
    (Dimension::Structure, "Structure", "Simplify functions with too many parameters."),
    (Dimension::Coverage, "Coverage", "Improve test coverage to at least 80%."),
    (Dimension::Testing, "Testing", "Enhance test suite quality and coverage."),
    (
        Dimension::Documentation,
        "Documentation",
        "Add comprehensive docstrings and improve README.",
    ),
    (
        Dimension::CiCd,
        "CI/CD",
        "Implement proper CI/CD pipelines with security scanning.",
    ),
    (
        Dimension::Compliance,
        "Compliance",
        "Fix linting issues and adhere to coding standards.",
    ),
    (Dimension::Api, "API Quality", "Improve API design and security practices."),
    (Dimension::Monitoring, "Monitoring", "Implement proper logging and monitoring."),
];

/// How one analyzer section is laid out: scalar fields as a bullet list,
/// then each list-valued key as its own sub-list
struct SectionLayout {
    key: &'static str,
    title: &'static str,
    fields: &'static [(&'static str, &'static str)],
    lists: &'static [(&'static str, &'static str)],
}

const SECTION_LAYOUTS: &[SectionLayout] = &[
    SectionLayout {
        key: "coverage_analysis",
        title: "Code Coverage Analysis",
        fields: &[
            ("Line Coverage %", "line_coverage_pct"),
            ("Branch Coverage %", "branch_coverage_pct"),
            ("Function Coverage %", "function_coverage_pct"),
            ("Lines Covered", "lines_covered"),
            ("Total Lines", "lines_total"),
            ("Coverage Report", "coverage_file"),
            ("Coverage Tools", "coverage_tools"),
            ("Coverage Grade", "coverage_quality"),
        ],
        lists: &[("Recommendations", "recommendations")],
    },
    SectionLayout {
        key: "testing_quality",
        title: "Testing Quality Assessment",
        fields: &[
            ("Test Files", "total_test_files"),
            ("Test Functions", "total_test_functions"),
            ("Assertions", "total_assertions"),
            ("Test-to-Code Ratio", "test_to_code_ratio"),
            ("Assertion Density", "assertion_density"),
            ("Frameworks", "frameworks"),
            ("Test Quality Score", "test_quality_score"),
            ("Testing Grade", "test_quality"),
        ],
        lists: &[
            ("Anti-Patterns Detected", "anti_patterns"),
            ("Tests Without Assertions", "missing_assertions"),
            ("Recommendations", "recommendations"),
        ],
    },
    SectionLayout {
        key: "documentation_quality",
        title: "Documentation Quality Assessment",
        fields: &[
            ("README Quality", "readme_quality"),
            ("Docstring Coverage %", "doc_coverage_percent"),
            ("Documented Functions", "functions_with_docstrings"),
            ("Total Functions", "total_functions"),
            ("Inline Comment Ratio %", "inline_comments_ratio"),
            ("CHANGELOG", "changelog_present"),
            ("CONTRIBUTING", "contributing_present"),
            ("LICENSE", "license_present"),
            ("Documentation Score", "overall_docs_score"),
            ("Documentation Grade", "docs_quality"),
        ],
        lists: &[
            ("Undocumented Functions", "undocumented_functions"),
            ("Documentation Gaps", "documentation_gaps"),
        ],
    },
    SectionLayout {
        key: "ci_cd_analysis",
        title: "CI/CD Pipeline Analysis",
        fields: &[
            ("Providers", "ci_providers"),
            ("Testing", "has_testing"),
            ("Linting", "has_linting"),
            ("Security Scanning", "has_security_scanning"),
            ("Build", "has_build"),
            ("Deploy", "has_deploy"),
            ("Caching", "has_caching"),
            ("Parallel Jobs", "parallel_jobs"),
            ("Environments", "environments"),
            ("CI/CD Score", "ci_quality_score"),
            ("CI/CD Grade", "ci_quality"),
        ],
        lists: &[
            ("Missing Best Practices", "missing_practices"),
            ("Recommendations", "recommendations"),
        ],
    },
    SectionLayout {
        key: "compliance_analysis",
        title: "Compliance & Standards",
        fields: &[
            ("Linting Configured", "linting_configured"),
            ("Linters", "linters"),
            ("Compliance Score", "compliance_score"),
            ("Compliance Level", "compliance_level"),
        ],
        lists: &[
            ("Security Standards", "security_standards"),
            ("Code Quality Issues", "code_quality_issues"),
            ("Violations", "violations"),
            ("Recommendations", "recommendations"),
        ],
    },
    SectionLayout {
        key: "api_quality",
        title: "API Quality Analysis",
        fields: &[
            ("API Detected", "has_api"),
            ("API Type", "api_type"),
            ("Frameworks", "frameworks"),
            ("Specifications", "api_specs"),
            ("Endpoints", "endpoints_count"),
            ("Documented Endpoints", "documented_endpoints"),
            ("Authenticated Endpoints", "authenticated_endpoints"),
            ("RESTful Endpoints", "restful_compliance"),
            ("Versioned", "versioned"),
            ("Security Features", "security_features"),
            ("API Score", "api_quality_score"),
            ("API Grade", "api_quality"),
        ],
        lists: &[("Issues", "issues"), ("Recommendations", "recommendations")],
    },
    SectionLayout {
        key: "monitoring_analysis",
        title: "Monitoring & Logging Analysis",
        fields: &[
            ("Logging", "has_logging"),
            ("Logging Framework", "logging_framework"),
            ("Structured Logging", "structured_logging"),
            ("Error Tracking", "error_tracking"),
            ("Metrics Collection", "metrics_collection"),
            ("Health Checks", "health_checks"),
            ("Integrations", "monitoring_integrations"),
            ("Log Levels Used", "logging_levels_used"),
            ("Monitoring Score", "logging_quality_score"),
            ("Monitoring Grade", "monitoring_quality"),
        ],
        lists: &[("Issues", "issues"), ("Recommendations", "recommendations")],
    },
];

/// Escape a value for a Markdown table cell
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\n', '\r'], " ")
}

fn array<'a>(metrics: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    metrics.get(key).and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
}

fn field(item: &Value, key: &str) -> String {
    cell(&value_text(item.get(key)))
}

/// Summary sentence for the overall score band; a null score reads as 0
pub fn overall_assessment(overall: Option<f64>) -> &'static str {
    let score = overall.unwrap_or(0.0);
    if score >= 80.0 {
        "This codebase is production-ready with strong maintainability, security, and structure."
    } else if score >= 60.0 {
        "This codebase is generally solid but has some areas for improvement, especially in testing, documentation, or CI/CD."
    } else if score >= 40.0 {
        "This codebase has significant quality issues. Focus on improving maintainability, test coverage, and documentation."
    } else {
        "This codebase is in poor health. Major improvements are needed in maintainability, security, testing, and documentation."
    }
}

/// Recommendation lines for every scored dimension below its threshold
pub fn recommendations(bundle: &ScoreBundle) -> Vec<String> {
    RECOMMENDATIONS
        .iter()
        .filter(|(dimension, _, _)| {
            let threshold = if *dimension == Dimension::Coverage {
                COVERAGE_THRESHOLD
            } else {
                RECOMMENDATION_THRESHOLD
            };
            bundle.score(*dimension).is_some_and(|s| s < threshold)
        })
        .map(|(_, area, text)| format!("- **{}**: {}", area, text))
        .collect()
}

pub struct MarkdownWriter<W: Write> {
    writer: W,
    generated_at: DateTime<Utc>,
}

impl<W: Write> MarkdownWriter<W> {
    pub fn new(writer: W) -> Self {
        Self::with_timestamp(writer, Utc::now())
    }

    pub fn with_timestamp(writer: W, generated_at: DateTime<Utc>) -> Self {
        Self { writer, generated_at }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub fn write_report(&mut self, bundle: &ScoreBundle) -> anyhow::Result<()> {
        let writers: Vec<fn(&mut Self, &ScoreBundle) -> anyhow::Result<()>> = vec![
            |w, b| w.write_header(b),
            |w, b| w.write_metrics_summary(b),
            |w, b| w.write_detailed_metrics(b),
            |w, b| w.write_recommendations(b),
            |w, b| w.write_config_files(b.metrics.entries()),
            |w, b| w.write_complexity(b.metrics.entries()),
            |w, b| w.write_semgrep_findings(b.metrics.entries()),
            |w, b| w.write_custom_findings(b.metrics.entries()),
            |w, b| w.write_dependency_analysis(b.metrics.entries()),
            |w, b| w.write_analyzer_sections(b.metrics.entries()),
            |w, b| w.write_final_summary(b),
        ];

        writers.iter().try_for_each(|writer| writer(self, bundle))?;
        self.writer.flush()?;
        Ok(())
    }

    fn write_header(&mut self, bundle: &ScoreBundle) -> anyhow::Result<()> {
        writeln!(self.writer, "# Code Quality Report")?;
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "Generated: {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        if let Some(root) = bundle.metrics.get_str("repo_root") {
            writeln!(self.writer, "Repository: `{}`", root)?;
        }
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "## Overall Score: {} ({})",
            format_number(bundle.overall_score),
            bundle.overall_grade
        )?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_metrics_summary(&mut self, bundle: &ScoreBundle) -> anyhow::Result<()> {
        writeln!(self.writer, "## Metrics Summary")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Dimension | Score | Grade | Note |")?;
        writeln!(self.writer, "|-----------|-------|-------|------|")?;
        for dimension in Dimension::ALL {
            let score = bundle.score(dimension);
            let note = if score.is_none() {
                format!("Reason: {}", null_reason(dimension))
            } else {
                String::new()
            };
            writeln!(
                self.writer,
                "| {} | {} | {} | {} |",
                dimension.label(),
                format_number(score),
                bundle.grade(dimension),
                note
            )?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_detailed_metrics(&mut self, bundle: &ScoreBundle) -> anyhow::Result<()> {
        let metrics = bundle.metrics.entries();
        let num = |key: &str| metrics.get(key).and_then(numeric);
        let count = |key: &str| num(key).unwrap_or(0.0) as u64;
        let pct = |value: Option<f64>| value.map_or_else(|| "N/A".to_string(), |v| format!("{:.1}%", v));

        writeln!(self.writer, "## Detailed Metrics")?;
        writeln!(self.writer)?;

        writeln!(self.writer, "### Complexity")?;
        writeln!(self.writer, "| Metric | Value | Grade |")?;
        writeln!(self.writer, "|--------|-------|-------|")?;
        writeln!(
            self.writer,
            "| Average Cyclomatic Complexity | {} | {} |",
            format_number(num("avg_ccn")),
            bundle.grade(Dimension::Complexity)
        )?;
        writeln!(self.writer, "| Max Cyclomatic Complexity | {} | - |", format_number(num("max_ccn")))?;
        writeln!(self.writer, "| % Functions CCN > 10 | {} | - |", pct(num("pct_ccn_gt_10")))?;
        writeln!(self.writer)?;

        writeln!(self.writer, "### Duplication")?;
        writeln!(self.writer, "| Metric | Value | Grade |")?;
        writeln!(self.writer, "|--------|-------|-------|")?;
        writeln!(
            self.writer,
            "| Code Duplication % | {} | {} |",
            pct(num("duplication_pct")),
            bundle.grade(Dimension::Duplication)
        )?;
        writeln!(self.writer)?;

        writeln!(self.writer, "### Security")?;
        writeln!(self.writer, "| Severity | Count |")?;
        writeln!(self.writer, "|----------|-------|")?;
        for (label, key) in [
            ("Critical", "security_critical"),
            ("High", "security_high"),
            ("Medium", "security_medium"),
            ("Low", "security_low"),
        ] {
            writeln!(self.writer, "| {} | {} |", label, count(key))?;
        }
        writeln!(self.writer)?;

        writeln!(self.writer, "### Structure")?;
        writeln!(self.writer, "| Metric | Value |")?;
        writeln!(self.writer, "|--------|-------|")?;
        writeln!(
            self.writer,
            "| Functions with >7 Parameters | {} |",
            count("functions_gt_7_params")
        )?;
        writeln!(self.writer)?;

        if let Some(estimate) = &bundle.fallback {
            writeln!(self.writer, "### Source Estimate")?;
            writeln!(self.writer)?;
            writeln!(
                self.writer,
                "Complexity and duplication were estimated from {} sources.",
                estimate.strategy
            )?;
            writeln!(self.writer)?;
            writeln!(self.writer, "| Metric | Value |")?;
            writeln!(self.writer, "|--------|-------|")?;
            writeln!(self.writer, "| Files Analyzed | {} |", estimate.files_analyzed)?;
            writeln!(self.writer, "| Functions | {} |", estimate.function_count)?;
            writeln!(self.writer, "| Average CCN | {:.1} |", estimate.avg_ccn)?;
            writeln!(self.writer, "| Max CCN | {} |", estimate.max_ccn)?;
            writeln!(self.writer, "| % Functions CCN > 10 | {:.1}% |", estimate.pct_ccn_gt_10)?;
            writeln!(self.writer, "| Functions with >7 Parameters | {} |", estimate.functions_gt_7_params)?;
            writeln!(
                self.writer,
                "| Unique / Total Lines | {} / {} |",
                estimate.unique_lines, estimate.total_lines
            )?;
            writeln!(self.writer, "| Duplication % | {:.1}% |", estimate.duplication_pct)?;
            if let Some(h) = &estimate.halstead {
                writeln!(self.writer, "| Halstead Vocabulary | {} |", h.vocabulary)?;
                writeln!(self.writer, "| Halstead Length | {} |", h.length)?;
                writeln!(self.writer, "| Halstead Volume | {:.1} |", h.volume)?;
                writeln!(self.writer, "| Halstead Difficulty | {:.1} |", h.difficulty)?;
                writeln!(self.writer, "| Halstead Effort | {:.1} |", h.effort)?;
            }
            writeln!(self.writer)?;
        }
        Ok(())
    }

    fn write_recommendations(&mut self, bundle: &ScoreBundle) -> anyhow::Result<()> {
        writeln!(self.writer, "## Recommendations")?;
        writeln!(self.writer)?;
        let lines = recommendations(bundle);
        if lines.is_empty() {
            writeln!(self.writer, "No major issues detected.")?;
        }
        for line in lines {
            writeln!(self.writer, "{}", line)?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_config_files(&mut self, metrics: &Map<String, Value>) -> anyhow::Result<()> {
        let Some(files) = metrics.get("config_files").and_then(Value::as_object) else {
            return Ok(());
        };
        writeln!(self.writer, "## Configuration & Workflow Files")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| File | Present |")?;
        writeln!(self.writer, "|------|---------|")?;
        for (name, present) in files {
            let mark = if present.as_bool().unwrap_or(false) { "✅" } else { "❌" };
            writeln!(self.writer, "| {} | {} |", cell(name), mark)?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_complexity(&mut self, metrics: &Map<String, Value>) -> anyhow::Result<()> {
        writeln!(self.writer, "## Complexity & Risky Functions")?;
        writeln!(self.writer)?;

        let main_files = array(metrics, "main_files");
        if !main_files.is_empty() {
            writeln!(self.writer, "### Main Files")?;
            writeln!(self.writer)?;
            writeln!(
                self.writer,
                "| File | Functions | Avg CCN | Max CCN | Vocabulary | Length | Volume | Difficulty | Effort |"
            )?;
            writeln!(
                self.writer,
                "|------|-----------|---------|---------|------------|--------|--------|------------|--------|"
            )?;
            for file in main_files {
                let halstead = file.get("halstead").cloned().unwrap_or(Value::Null);
                writeln!(
                    self.writer,
                    "| {} | {} | {} | {} | {} | {} | {} | {} | {} |",
                    field(file, "file"),
                    field(file, "functions"),
                    field(file, "avg_ccn"),
                    field(file, "max_ccn"),
                    field(&halstead, "vocabulary"),
                    field(&halstead, "length"),
                    field(&halstead, "volume"),
                    field(&halstead, "difficulty"),
                    field(&halstead, "effort"),
                )?;
            }
            writeln!(self.writer)?;
        }

        let risky = array(metrics, "risky_functions");
        if risky.is_empty() {
            writeln!(self.writer, "No risky functions detected or complexity analysis failed.")?;
        } else {
            writeln!(self.writer, "| Function | CCN | Params |")?;
            writeln!(self.writer, "|----------|-----|--------|")?;
            for function in risky {
                writeln!(
                    self.writer,
                    "| {} | {} | {} |",
                    field(function, "location"),
                    field(function, "cyclomatic_complexity"),
                    field(function, "parameter_count")
                )?;
            }
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_semgrep_findings(&mut self, metrics: &Map<String, Value>) -> anyhow::Result<()> {
        writeln!(self.writer, "## Security & Static Analysis Findings (Semgrep)")?;
        writeln!(self.writer)?;

        let findings = array(metrics, "semgrep_findings");
        if findings.is_empty() {
            writeln!(self.writer, "No issues detected.")?;
            writeln!(self.writer)?;
            return Ok(());
        }

        writeln!(self.writer, "**Total Security Findings:** {}", findings.len())?;
        writeln!(self.writer)?;
        for severity in ["critical", "high", "medium", "low"] {
            let n = findings
                .iter()
                .filter(|f| f.get("severity").and_then(Value::as_str) == Some(severity))
                .count();
            let mut label = severity.to_string();
            label[..1].make_ascii_uppercase();
            writeln!(self.writer, "- {}: {}", label, n)?;
        }
        writeln!(self.writer)?;

        writeln!(self.writer, "| Severity | File | Line | Rule | Message |")?;
        writeln!(self.writer, "|----------|------|------|------|---------|")?;
        for finding in findings.iter().take(FINDINGS_SHOWN) {
            writeln!(
                self.writer,
                "| {} | {} | {} | {} | {} |",
                field(finding, "severity"),
                field(finding, "path"),
                field(finding, "line"),
                field(finding, "rule_id"),
                field(finding, "message")
            )?;
        }
        if findings.len() > FINDINGS_SHOWN {
            writeln!(self.writer)?;
            writeln!(
                self.writer,
                "*... and {} more findings not shown*",
                findings.len() - FINDINGS_SHOWN
            )?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_custom_findings(&mut self, metrics: &Map<String, Value>) -> anyhow::Result<()> {
        writeln!(self.writer, "## Custom Static Analysis Findings")?;
        writeln!(self.writer)?;

        let findings = array(metrics, "custom_static_findings");
        if findings.is_empty() {
            writeln!(self.writer, "No custom static issues detected.")?;
            writeln!(self.writer)?;
            return Ok(());
        }

        // group by type in order of first appearance
        let mut groups: Vec<(String, Vec<&Value>)> = Vec::new();
        for finding in findings {
            let kind = value_text(finding.get("type"));
            match groups.iter_mut().find(|(k, _)| *k == kind) {
                Some((_, items)) => items.push(finding),
                None => groups.push((kind, vec![finding])),
            }
        }

        for (kind, items) in groups {
            writeln!(self.writer, "### {} ({} instances)", kind, items.len())?;
            writeln!(self.writer)?;
            writeln!(self.writer, "| File | Line | Snippet |")?;
            writeln!(self.writer, "|------|------|---------|")?;
            for finding in items.iter().take(CUSTOM_FINDINGS_SHOWN) {
                writeln!(
                    self.writer,
                    "| {} | {} | `{}` |",
                    field(finding, "file"),
                    field(finding, "line"),
                    field(finding, "content").replace('`', "'")
                )?;
            }
            if items.len() > CUSTOM_FINDINGS_SHOWN {
                writeln!(self.writer)?;
                writeln!(self.writer, "*... and {} more*", items.len() - CUSTOM_FINDINGS_SHOWN)?;
            }
            writeln!(self.writer)?;
        }
        Ok(())
    }

    fn write_dependency_analysis(&mut self, metrics: &Map<String, Value>) -> anyhow::Result<()> {
        let section = |key: &str| metrics.get(key).and_then(Value::as_object);
        let flag = |s: Option<&Map<String, Value>>, key: &str| {
            s.and_then(|m| m.get(key)).and_then(Value::as_bool).unwrap_or(false)
        };
        let js = section("js_dependencies").filter(|_| flag(section("js_dependencies"), "has_package_json"));
        let py = section("python_dependencies").filter(|_| flag(section("python_dependencies"), "has_requirements"));
        if js.is_none() && py.is_none() {
            return Ok(());
        }

        writeln!(self.writer, "## Dependency Analysis")?;
        writeln!(self.writer)?;

        if let Some(js) = js {
            writeln!(self.writer, "### JavaScript/TypeScript Dependencies")?;
            writeln!(self.writer)?;
            writeln!(self.writer, "- **Total Dependencies**: {}", value_text(js.get("total_dependencies")))?;
            writeln!(
                self.writer,
                "- **Total Dev Dependencies**: {}",
                value_text(js.get("total_dev_dependencies"))
            )?;
            writeln!(
                self.writer,
                "- **Dependency Usage Rate**: {:.1}%",
                js.get("dependency_usage_rate").and_then(numeric).unwrap_or(100.0)
            )?;
            writeln!(self.writer)?;
            self.write_list("Unused Dependencies", js.get("unused_dependencies"))?;
            self.write_list("Unused Dev Dependencies", js.get("unused_dev_dependencies"))?;
        }

        if let Some(py) = py {
            writeln!(self.writer, "### Python Dependencies")?;
            writeln!(self.writer)?;
            writeln!(self.writer, "- **Total Packages**: {}", value_text(py.get("total_packages")))?;
            writeln!(
                self.writer,
                "- **Package Usage Rate**: {:.1}%",
                py.get("package_usage_rate").and_then(numeric).unwrap_or(100.0)
            )?;
            writeln!(self.writer)?;
            self.write_list("Unused Packages", py.get("unused_packages"))?;
        }
        Ok(())
    }

    fn write_analyzer_sections(&mut self, metrics: &Map<String, Value>) -> anyhow::Result<()> {
        for layout in SECTION_LAYOUTS {
            let Some(section) = metrics.get(layout.key).and_then(Value::as_object) else {
                continue;
            };
            if section.is_empty() {
                continue;
            }
            writeln!(self.writer, "## {}", layout.title)?;
            writeln!(self.writer)?;
            for (label, key) in layout.fields {
                if section.contains_key(*key) {
                    writeln!(self.writer, "- **{}**: {}", label, value_text(section.get(*key)))?;
                }
            }
            writeln!(self.writer)?;
            for (title, key) in layout.lists {
                self.write_list(title, section.get(*key))?;
            }
        }
        Ok(())
    }

    /// Bulleted list with a count heading; empty or missing lists are skipped
    fn write_list(&mut self, title: &str, items: Option<&Value>) -> anyhow::Result<()> {
        let items = items.and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[]);
        if items.is_empty() {
            return Ok(());
        }
        writeln!(self.writer, "**{} ({})**:", title, items.len())?;
        for item in items.iter().take(LIST_ITEMS_SHOWN) {
            writeln!(self.writer, "- {}", value_text(Some(item)))?;
        }
        if items.len() > LIST_ITEMS_SHOWN {
            writeln!(self.writer, "- *... and {} more*", items.len() - LIST_ITEMS_SHOWN)?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_final_summary(&mut self, bundle: &ScoreBundle) -> anyhow::Result<()> {
        writeln!(self.writer, "## Final Summary")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "{}", overall_assessment(bundle.overall_score))?;

        let scored: Vec<(Dimension, f64)> = Dimension::ALL
            .iter()
            .filter_map(|d| bundle.score(*d).map(|s| (*d, s)))
            .collect();
        let strongest = scored.iter().copied().max_by(|a, b| a.1.total_cmp(&b.1));
        let weakest = scored.iter().copied().min_by(|a, b| a.1.total_cmp(&b.1));
        if let (Some((best, best_score)), Some((worst, worst_score))) = (strongest, weakest) {
            if best != worst {
                writeln!(self.writer)?;
                writeln!(self.writer, "- Strongest area: {} ({:.1})", best.label(), best_score)?;
                writeln!(self.writer, "- Weakest area: {} ({:.1})", worst.label(), worst_score)?;
            }
        }

        let missing: Vec<Dimension> = Dimension::ALL
            .iter()
            .copied()
            .filter(|d| bundle.score(*d).is_none())
            .collect();
        if !missing.is_empty() {
            writeln!(self.writer)?;
            for dimension in missing {
                writeln!(self.writer, "{}: {}", dimension.label(), null_reason(dimension))?;
            }
        }
        Ok(())
    }
}

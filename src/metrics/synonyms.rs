//! Metric synonym table.
//!
//! Each slice lists the keys under which a logical metric may appear, in
//! priority order. Analyzers and external tools have used different names
//! for the same figure over time; add new spellings at the end so existing
//! bundles keep resolving to the same value.

pub const AVG_COMPLEXITY: &[&str] = &["avg_ccn", "average_ccn"];
pub const PCT_OVER_COMPLEXITY_THRESHOLD: &[&str] = &["pct_ccn_gt_10", "pct_ccn_over_10"];
pub const DUPLICATION_PCT: &[&str] = &["duplication_pct", "duplication_percentage"];
pub const FUNCTIONS_OVER_PARAM_LIMIT: &[&str] = &["functions_gt_7_params", "functions_gt_7"];

pub const SECURITY_CRITICAL: &[&str] = &["security_critical"];
pub const SECURITY_HIGH: &[&str] = &["security_high"];
pub const SECURITY_MEDIUM: &[&str] = &["security_medium"];

pub const COVERAGE: &[&str] = &[
    "line_coverage_pct",
    "line_coverage",
    "coverage_percentage",
    "coverage_percent",
];
pub const TESTING: &[&str] = &["test_quality_score", "test_quality"];
pub const DOCUMENTATION: &[&str] = &["overall_docs_score", "doc_coverage_percent"];
pub const CI_CD: &[&str] = &["ci_quality_score", "ci_cd_score", "ci_score"];
pub const COMPLIANCE: &[&str] = &["compliance_score"];
pub const API: &[&str] = &["api_quality_score", "api_score"];
pub const MONITORING: &[&str] = &[
    "logging_quality_score",
    "monitoring_score",
    "observability_score",
];

/// Presence signals reported by analyzers.
pub const COVERAGE_FOUND: &[&str] = &["coverage_found"];
pub const TOTAL_TEST_FILES: &[&str] = &["total_test_files"];
pub const README_PRESENT: &[&str] = &["readme_present"];
pub const DOC_COVERAGE: &[&str] = &["doc_coverage_percent"];
pub const HAS_API: &[&str] = &["has_api"];
pub const HAS_LOGGING: &[&str] = &["has_logging"];
pub const MONITORING_INTEGRATIONS: &[&str] = &["monitoring_integrations"];

/// `config_files` labels that count toward structure completeness.
pub const CRITICAL_CONFIGS: &[&str] = &["README.md", ".gitignore", "LICENSE"];

/// `config_files` labels that count toward security completeness.
pub const SECURITY_CONFIGS: &[&str] = &[".env.example", "Security Policy", "GitHub Actions Workflow"];

/// `config_files` labels that indicate a CI/CD pipeline exists.
pub const CI_MARKERS: &[&str] = &[
    "GitHub Actions Workflow",
    "GitLab CI",
    "CircleCI",
    "jenkinsfile",
    "azure-pipelines.yml",
    ".travis.yml",
    ".circleci/config.yml",
    ".github/workflows",
    ".gitlab-ci.yml",
    "bitbucket-pipelines.yml",
];

/// Custom finding types that penalize the security score.
pub const DANGEROUS_FINDING_TYPES: &[&str] = &[
    "Dangerous Function",
    "SQL Injection Risk",
    "SQL-Injection Risk",
    "Hardcoded Credential",
    "Insecure Import",
];

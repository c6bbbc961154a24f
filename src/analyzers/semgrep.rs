//! Security findings from the external `semgrep` scanner.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use super::{AnalyzerOutput, RepoAnalyzer, RepoContext};
use crate::errors::{Error, Result};
use crate::io::external_tool::{require_tool, run_tool};

const SEMGREP: &str = "semgrep";

#[derive(Debug, Deserialize)]
struct SemgrepReport {
    #[serde(default)]
    results: Vec<SemgrepResult>,
}

#[derive(Debug, Deserialize)]
struct SemgrepResult {
    check_id: String,
    path: String,
    #[serde(default)]
    start: SemgrepPosition,
    #[serde(default)]
    extra: SemgrepExtra,
}

#[derive(Debug, Default, Deserialize)]
struct SemgrepPosition {
    #[serde(default)]
    line: usize,
}

#[derive(Debug, Default, Deserialize)]
struct SemgrepExtra {
    #[serde(default)]
    severity: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    metadata: Value,
}

/// Normalized severity bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    /// ERROR→high, WARNING→medium, anything else→low; a `CRITICAL`
    /// impact or severity in the rule metadata wins
    fn classify(severity: &str, metadata: &Value) -> Self {
        let flagged_critical = ["impact", "severity"].iter().any(|k| {
            metadata
                .get(k)
                .and_then(Value::as_str)
                .is_some_and(|s| s.eq_ignore_ascii_case("critical"))
        });
        if flagged_critical || severity.eq_ignore_ascii_case("critical") {
            return Severity::Critical;
        }
        match severity.to_ascii_uppercase().as_str() {
            "ERROR" => Severity::High,
            "WARNING" => Severity::Medium,
            _ => Severity::Low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemgrepFinding {
    pub rule_id: String,
    pub severity: Severity,
    pub path: String,
    pub line: usize,
    pub message: String,
}

pub struct SemgrepAnalyzer;

impl RepoAnalyzer for SemgrepAnalyzer {
    fn name(&self) -> &'static str {
        "semgrep"
    }

    fn description(&self) -> &'static str {
        "Analyzing security with Semgrep"
    }

    fn analyze(&self, ctx: &RepoContext) -> Result<AnalyzerOutput> {
        require_tool(SEMGREP)?;

        let args: Vec<String> = ["--config", "auto", "--json", "--quiet", "."]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let output = run_tool(SEMGREP, &args, Some(ctx.root), ctx.config.tools.timeout_secs)?;

        // semgrep exits 1 when findings exist; anything else without JSON is a failure
        if output.stdout.trim().is_empty() {
            return Err(Error::tool(
                SEMGREP,
                format!("no output (exit code {:?}): {}", output.exit_code, output.stderr.trim()),
            ));
        }
        let findings = parse_report(&output.stdout)?;
        debug!("semgrep reported {} findings", findings.len());
        if findings.is_empty() && !output.success() {
            warn!("semgrep exited with {:?} and no findings", output.exit_code);
        }

        Ok(AnalyzerOutput::top_level(findings_metrics(&findings)?))
    }
}

pub fn parse_report(json_text: &str) -> Result<Vec<SemgrepFinding>> {
    let report: SemgrepReport = serde_json::from_str(json_text)?;
    Ok(report
        .results
        .into_iter()
        .map(|r| SemgrepFinding {
            severity: Severity::classify(&r.extra.severity, &r.extra.metadata),
            rule_id: r.check_id,
            path: r.path,
            line: r.start.line,
            message: r.extra.message.trim().to_string(),
        })
        .collect())
}

pub fn findings_metrics(findings: &[SemgrepFinding]) -> Result<Map<String, Value>> {
    let count = |severity| findings.iter().filter(|f| f.severity == severity).count();

    let mut values = Map::new();
    values.insert("security_critical".into(), json!(count(Severity::Critical)));
    values.insert("security_high".into(), json!(count(Severity::High)));
    values.insert("security_medium".into(), json!(count(Severity::Medium)));
    values.insert("security_low".into(), json!(count(Severity::Low)));
    values.insert("semgrep_findings".into(), serde_json::to_value(findings)?);
    Ok(values)
}

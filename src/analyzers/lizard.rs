//! Complexity and duplication figures from the external `lizard` tool.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use super::{round1, AnalyzerOutput, RepoAnalyzer, RepoContext};
use crate::complexity::halstead::round2;
use crate::complexity::{COMPLEXITY_THRESHOLD, PARAMETER_LIMIT};
use crate::errors::{Error, Result};
use crate::io::external_tool::{require_tool, run_tool, ToolOutput};

const LIZARD: &str = "lizard";
const LIZARD_EXTENSIONS: &[&str] = &["py", "js", "jsx", "ts", "tsx"];
const DUPLICATE_FILE_LIMIT: usize = 50;
const RISKY_FUNCTION_COUNT: usize = 3;

static DUPLICATE_RATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)total duplicate rate:\s*([0-9]+(?:\.[0-9]+)?)\s*%").unwrap());

/// One row of lizard's function table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LizardFunction {
    pub cyclomatic_complexity: u32,
    pub parameter_count: u32,
    pub location: String,
    pub nloc: u32,
    pub token_count: u32,
}

/// Aggregates over every parsed function
#[derive(Debug, Clone, PartialEq)]
pub struct LizardSummary {
    pub avg_ccn: f64,
    pub max_ccn: u32,
    pub pct_ccn_gt_10: f64,
    pub functions_gt_7_params: usize,
    pub risky_functions: Vec<LizardFunction>,
}

impl LizardSummary {
    pub fn from_functions(functions: &[LizardFunction]) -> Option<Self> {
        if functions.is_empty() {
            return None;
        }
        let count = functions.len() as f64;
        let total: u32 = functions.iter().map(|f| f.cyclomatic_complexity).sum();
        let over = functions
            .iter()
            .filter(|f| f.cyclomatic_complexity > COMPLEXITY_THRESHOLD)
            .count();

        let mut risky = functions.to_vec();
        risky.sort_by(|a, b| {
            (b.cyclomatic_complexity, b.parameter_count).cmp(&(a.cyclomatic_complexity, a.parameter_count))
        });
        risky.truncate(RISKY_FUNCTION_COUNT);

        Some(Self {
            avg_ccn: round2(total as f64 / count),
            max_ccn: functions.iter().map(|f| f.cyclomatic_complexity).max().unwrap_or(0),
            pct_ccn_gt_10: round1(over as f64 / count * 100.0),
            functions_gt_7_params: functions
                .iter()
                .filter(|f| f.parameter_count as usize > PARAMETER_LIMIT)
                .count(),
            risky_functions: risky,
        })
    }
}

pub struct LizardAnalyzer;

impl RepoAnalyzer for LizardAnalyzer {
    fn name(&self) -> &'static str {
        "lizard"
    }

    fn description(&self) -> &'static str {
        "Analyzing complexity with Lizard"
    }

    fn analyze(&self, ctx: &RepoContext) -> Result<AnalyzerOutput> {
        require_tool(LIZARD)?;

        let mut files = ctx.files_with_extensions(LIZARD_EXTENSIONS)?;
        if files.is_empty() {
            debug!("No sources for lizard under {}", ctx.root.display());
            return Ok(AnalyzerOutput::top_level(null_metrics()));
        }
        let limit = ctx.config.analysis.max_complexity_files;
        if files.len() > limit {
            warn!("Limiting lizard to the first {} of {} files", limit, files.len());
            files.truncate(limit);
        }
        let timeout = ctx.config.tools.timeout_secs;
        let args: Vec<String> = files.iter().map(|p| p.to_string_lossy().into_owned()).collect();

        let output = run_tool(LIZARD, &args, Some(ctx.root), timeout)?;
        ensure_completed(&output)?;
        let functions = parse_function_table(output_text(&output));

        let Some(summary) = LizardSummary::from_functions(&functions) else {
            warn!("No functions parsed from lizard output");
            return Ok(AnalyzerOutput::top_level(null_metrics()));
        };

        let mut dup_args = vec!["--duplicate".to_string()];
        dup_args.extend(args.into_iter().take(DUPLICATE_FILE_LIMIT));
        let duplication_pct = match run_tool(LIZARD, &dup_args, Some(ctx.root), timeout) {
            Ok(dup) if ensure_completed(&dup).is_ok() => parse_duplicate_rate(output_text(&dup)),
            Ok(_) => None,
            Err(e) => {
                warn!("Lizard duplication pass failed: {}", e);
                None
            }
        };

        Ok(AnalyzerOutput::top_level(summary_metrics(&summary, duplication_pct)?))
    }
}

/// Lizard exits 1 when it reports warnings; both 0 and 1 carry a full table
fn ensure_completed(output: &ToolOutput) -> Result<()> {
    match output.exit_code {
        Some(0) | Some(1) => Ok(()),
        code => Err(Error::tool(
            LIZARD,
            format!("exit code {:?}: {}", code, output.stderr.trim()),
        )),
    }
}

fn output_text(output: &ToolOutput) -> &str {
    if output.stdout.trim().is_empty() {
        &output.stderr
    } else {
        &output.stdout
    }
}

fn null_metrics() -> Map<String, Value> {
    [
        "avg_ccn",
        "max_ccn",
        "pct_ccn_gt_10",
        "functions_gt_7_params",
        "duplication_pct",
        "risky_functions",
    ]
    .iter()
    .map(|k| (k.to_string(), Value::Null))
    .collect()
}

fn summary_metrics(summary: &LizardSummary, duplication_pct: Option<f64>) -> Result<Map<String, Value>> {
    let mut values = Map::new();
    values.insert("avg_ccn".into(), json!(summary.avg_ccn));
    values.insert("max_ccn".into(), json!(summary.max_ccn));
    values.insert("pct_ccn_gt_10".into(), json!(summary.pct_ccn_gt_10));
    values.insert("functions_gt_7_params".into(), json!(summary.functions_gt_7_params));
    values.insert("duplication_pct".into(), json!(duplication_pct));
    values.insert("risky_functions".into(), serde_json::to_value(&summary.risky_functions)?);
    Ok(values)
}

/// Parse the per-function table that precedes the per-file summary
pub fn parse_function_table(output: &str) -> Vec<LizardFunction> {
    let mut functions = Vec::new();
    let mut in_table = false;

    for line in output.lines() {
        if line.contains("NLOC") && line.contains("CCN") && line.to_lowercase().contains("token") {
            if in_table {
                // second header starts the per-file summary
                break;
            }
            in_table = true;
            continue;
        }
        if !in_table {
            continue;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('-') || trimmed.starts_with('=') {
            continue;
        }
        if trimmed.contains("analyzed") {
            break;
        }
        if let Some(function) = parse_row(trimmed) {
            functions.push(function);
        }
    }
    functions
}

fn parse_row(row: &str) -> Option<LizardFunction> {
    let parts: Vec<&str> = row.split_whitespace().collect();
    if parts.len() < 6 {
        return None;
    }
    let nloc: u32 = parts[0].parse().ok()?;
    let ccn: u32 = parts[1].parse().ok()?;
    let token_count: u32 = parts[2].parse().ok()?;
    let parameter_count: u32 = parts[3].parse().ok()?;
    parts[4].parse::<u32>().ok()?;

    if ccn == 0 || nloc == 0 {
        return None;
    }
    Some(LizardFunction {
        cyclomatic_complexity: ccn,
        parameter_count,
        location: parts[5..].join(" "),
        nloc,
        token_count,
    })
}

pub fn parse_duplicate_rate(output: &str) -> Option<f64> {
    DUPLICATE_RATE
        .captures(output)
        .and_then(|c| c[1].parse::<f64>().ok())
        .map(round1)
}

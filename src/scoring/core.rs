//! Core sub-scores: complexity, duplication, maintainability, security and
//! structure.
//!
//! Complexity, duplication, maintainability and structure are null when
//! their inputs are unmeasured. Security always has a value: missing
//! finding counts mean "no evidence of danger".

use serde_json::Value;

use super::clamp_score;
use crate::metrics::synonyms;
use crate::metrics::{find_numeric, MetricsBundle};

const MAINTAINABILITY_COMPLEXITY_SHARE: f64 = 0.6;
const MAINTAINABILITY_DUPLICATION_SHARE: f64 = 0.4;
const DANGEROUS_FINDING_PENALTY: f64 = 5.0;
const DANGEROUS_FINDING_PENALTY_CAP: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoreScores {
    pub ccn: Option<f64>,
    pub dup: Option<f64>,
    pub maint: Option<f64>,
    pub sec: f64,
    pub structure: Option<f64>,
}

/// Inputs to the security score after lookup and coercion
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SecurityInputs {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
    pub dangerous_findings: usize,
    pub security_config_pct: f64,
}

pub fn compute_core_scores(bundle: &MetricsBundle) -> CoreScores {
    let ccn = complexity_score(
        find_numeric(bundle, synonyms::AVG_COMPLEXITY),
        find_numeric(bundle, synonyms::PCT_OVER_COMPLEXITY_THRESHOLD),
    );
    let dup = duplication_score(find_numeric(bundle, synonyms::DUPLICATION_PCT));

    let security = SecurityInputs {
        critical: find_numeric(bundle, synonyms::SECURITY_CRITICAL).unwrap_or(0.0),
        high: find_numeric(bundle, synonyms::SECURITY_HIGH).unwrap_or(0.0),
        medium: find_numeric(bundle, synonyms::SECURITY_MEDIUM).unwrap_or(0.0),
        dangerous_findings: count_dangerous_findings(bundle),
        security_config_pct: config_completeness(bundle, synonyms::SECURITY_CONFIGS),
    };

    CoreScores {
        ccn,
        dup,
        maint: maintainability_score(ccn, dup),
        sec: security_score(&security),
        structure: structure_score(
            config_completeness(bundle, synonyms::CRITICAL_CONFIGS),
            find_numeric(bundle, synonyms::FUNCTIONS_OVER_PARAM_LIMIT),
        ),
    }
}

/// `100 - (avg * 5 + pct)`, only when both are measured and avg > 0
pub fn complexity_score(avg_complexity: Option<f64>, pct_over_threshold: Option<f64>) -> Option<f64> {
    match (avg_complexity, pct_over_threshold) {
        (Some(avg), Some(pct)) if avg > 0.0 => Some(clamp_score(100.0 - (avg * 5.0 + pct))),
        _ => None,
    }
}

pub fn duplication_score(duplication_pct: Option<f64>) -> Option<f64> {
    duplication_pct.map(|pct| clamp_score(100.0 - pct))
}

pub fn maintainability_score(ccn: Option<f64>, dup: Option<f64>) -> Option<f64> {
    Some(MAINTAINABILITY_COMPLEXITY_SHARE * ccn? + MAINTAINABILITY_DUPLICATION_SHARE * dup?)
}

pub fn security_score(inputs: &SecurityInputs) -> f64 {
    let tool_penalty = inputs.critical * 20.0 + inputs.high * 10.0 + inputs.medium * 2.0;
    let custom_penalty =
        (inputs.dangerous_findings as f64 * DANGEROUS_FINDING_PENALTY).min(DANGEROUS_FINDING_PENALTY_CAP);
    clamp_score(100.0 - tool_penalty - custom_penalty + inputs.security_config_pct * 0.1)
}

/// Only computed when the parameter-overflow count is measured
pub fn structure_score(critical_config_pct: f64, functions_over_param_limit: Option<f64>) -> Option<f64> {
    let overflow = functions_over_param_limit?;
    let param_component = (100.0 - overflow * 10.0).max(0.0);
    Some(clamp_score(critical_config_pct * 0.7 + param_component * 0.3))
}

/// Percentage of `labels` marked present in the `config_files` map
pub fn config_completeness(bundle: &MetricsBundle, labels: &[&str]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let present = labels
        .iter()
        .filter(|label| config_present(bundle, label))
        .count();
    present as f64 / labels.len() as f64 * 100.0
}

pub fn config_present(bundle: &MetricsBundle, label: &str) -> bool {
    bundle
        .get("config_files")
        .and_then(Value::as_object)
        .and_then(|files| files.get(label))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

pub fn count_dangerous_findings(bundle: &MetricsBundle) -> usize {
    bundle
        .get("custom_static_findings")
        .and_then(Value::as_array)
        .map(|findings| {
            findings
                .iter()
                .filter_map(|f| f.get("type").and_then(Value::as_str))
                .filter(|kind| synonyms::DANGEROUS_FINDING_TYPES.contains(kind))
                .count()
        })
        .unwrap_or(0)
}

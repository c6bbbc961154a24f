use serde_json::Value;

use super::MetricsBundle;

/// Analyzer sections searched after the top level, in order.
pub const ANALYZER_SECTIONS: &[&str] = &[
    "coverage_analysis",
    "testing_quality",
    "documentation_quality",
    "ci_cd_analysis",
    "compliance_analysis",
    "api_quality",
    "monitoring_analysis",
];

/// Resolve the first candidate key bound anywhere in the bundle.
///
/// Every candidate is tried at the top level before any section is
/// consulted; within a section, candidates are tried in order. A key bound
/// to JSON `null` counts as found, so callers see the same "not numeric"
/// outcome they would for any other unusable value.
pub fn find_metric<'a>(bundle: &'a MetricsBundle, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| bundle.get(key))
        .or_else(|| {
            ANALYZER_SECTIONS
                .iter()
                .filter_map(|name| bundle.section(name))
                .find_map(|section| keys.iter().find_map(|key| section.get(*key)))
        })
}

/// Interpret a value as a finite real number.
///
/// Accepts JSON numbers and numeric strings (surrounding whitespace
/// ignored). Booleans, null, containers, unparsable strings, NaN and
/// infinities are not numeric.
pub fn numeric(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

/// `find_metric` followed by `numeric`.
pub fn find_numeric(bundle: &MetricsBundle, keys: &[&str]) -> Option<f64> {
    find_metric(bundle, keys).and_then(numeric)
}

/// Explicit boolean signal, looked up like any other metric.
pub fn find_bool(bundle: &MetricsBundle, keys: &[&str]) -> Option<bool> {
    find_metric(bundle, keys).and_then(Value::as_bool)
}

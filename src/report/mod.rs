//! Report rendering
//!
//! `markdown` writes the full assessment report; `summary` renders the
//! compact terminal table printed after a run. Both read only the
//! `ScoreBundle`, so a report can be regenerated from a saved metrics file.

pub mod markdown;
pub mod summary;

use std::path::Path;

use anyhow::Context;
use serde_json::Value;

use crate::io::write_file;
use crate::metrics::numeric;
use crate::scoring::{Dimension, ScoreBundle};

pub use markdown::MarkdownWriter;
pub use summary::{print_summary, render_summary};

/// One decimal, or `null` for a missing score
pub fn format_number(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}", v),
        None => "null".to_string(),
    }
}

/// Human-readable rendering of a loosely-typed metric value
pub fn value_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "N/A".to_string(),
        Some(Value::Bool(true)) => "Yes".to_string(),
        Some(Value::Bool(false)) => "No".to_string(),
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => n.to_string(),
        Some(v @ Value::Number(_)) => format_number(numeric(v)),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) if items.is_empty() => "None".to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| value_text(Some(item)))
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    }
}

/// Why a dimension has no score
pub fn null_reason(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Complexity => "No complexity data from Lizard or the source estimate.",
        Dimension::Duplication => "No duplication data from Lizard or the source estimate.",
        Dimension::Maintainability => "Complexity or duplication data unavailable.",
        Dimension::Security => "No security data.",
        Dimension::Structure => "No parameter-count data.",
        Dimension::Coverage => "No coverage reports found in the repository.",
        Dimension::Testing => "No test files detected in the codebase.",
        Dimension::Documentation => "No README or docstrings found.",
        Dimension::CiCd => "No CI/CD configuration files detected in the repository.",
        Dimension::Compliance => "No compliance data.",
        Dimension::Api => "No API endpoints or specifications detected.",
        Dimension::Monitoring => "No logging or monitoring integrations detected.",
    }
}

/// Render the Markdown report into a string
pub fn render_markdown(bundle: &ScoreBundle) -> anyhow::Result<String> {
    let mut buffer = Vec::new();
    MarkdownWriter::new(&mut buffer).write_report(bundle)?;
    String::from_utf8(buffer).context("Report is not valid UTF-8")
}

pub fn write_report(path: &Path, bundle: &ScoreBundle) -> anyhow::Result<()> {
    let report = render_markdown(bundle)?;
    write_file(path, &report).with_context(|| format!("Failed to write report to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(Some(72.25)), "72.2");
        assert_eq!(format_number(Some(100.0)), "100.0");
        assert_eq!(format_number(None), "null");
    }

    #[test]
    fn test_value_text() {
        assert_eq!(value_text(None), "N/A");
        assert_eq!(value_text(Some(&json!(true))), "Yes");
        assert_eq!(value_text(Some(&json!(3))), "3");
        assert_eq!(value_text(Some(&json!(3.14159))), "3.1");
        assert_eq!(value_text(Some(&json!(["pytest", "jest"]))), "pytest, jest");
        assert_eq!(value_text(Some(&json!([]))), "None");
    }
}

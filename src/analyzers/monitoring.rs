//! Logging and observability practices.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;

use super::{into_map, quality_label, AnalyzerOutput, RepoAnalyzer, RepoContext, SOURCE_EXTENSIONS};
use crate::errors::Result;

const MANIFESTS: &[&str] = &["package.json", "requirements.txt", "pyproject.toml", "Pipfile"];

/// Manifest keyword → logging library, and whether it logs structured records
const LOGGING_LIBRARIES: &[(&str, &str, bool)] = &[
    ("winston", "Winston (Node.js)", true),
    ("bunyan", "Bunyan (Node.js)", true),
    ("pino", "Pino (Node.js)", true),
    ("loguru", "Loguru (Python)", false),
    ("structlog", "Structlog (Python)", true),
    ("python-json-logger", "python-json-logger", true),
];

const ERROR_TRACKERS: &[&str] = &["sentry", "rollbar", "bugsnag", "raygun"];

/// Integration name → manifest keywords
const INTEGRATIONS: &[(&str, &[&str])] = &[
    ("Prometheus", &["prometheus", "prom-client"]),
    ("Grafana", &["grafana"]),
    ("Datadog", &["datadog", "dd-trace", "ddtrace"]),
    ("New Relic", &["newrelic"]),
    ("Sentry", &["sentry"]),
    ("Elastic", &["elasticsearch", "@elastic", "elastic-apm"]),
    ("Splunk", &["splunk"]),
    ("OpenTelemetry", &["opentelemetry"]),
    ("Jaeger", &["jaeger"]),
    ("Zipkin", &["zipkin"]),
];

const INTEGRATION_CONFIGS: &[(&str, &str)] = &[
    ("prometheus.yml", "Prometheus"),
    ("prometheus.yaml", "Prometheus"),
    ("kibana.yml", "ELK Stack"),
    ("logstash.conf", "ELK Stack"),
];

const LEVELS: &[(&str, &str)] = &[
    ("DEBUG", r"\.debug\s*\("),
    ("INFO", r"\.info\s*\("),
    ("WARNING", r"\.warn(?:ing)?\s*\("),
    ("ERROR", r"\.error\s*\("),
    ("CRITICAL", r"\.(?:critical|fatal)\s*\("),
];

static LEVEL_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    LEVELS
        .iter()
        .map(|(level, pattern)| (*level, Regex::new(&format!("(?i){}", pattern)).unwrap()))
        .collect()
});

static LOGGING_USAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"console\.(?:log|error|warn|info)\s*\(|\blogging\.\w+|\blogger\.\w+\s*\(|\blog\.\w+\s*\(").unwrap()
});
static STDLIB_LOGGING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*import\s+logging\b|logging\.getLogger").unwrap());
static LOGGED_EXCEPTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"except[^\n]*:\s*\n\s*(?:logger|logging|log)\.|catch\s*\([^)]*\)\s*\{\s*(?:console\.error|logger\.|log\.)").unwrap()
});
static HEALTH_ENDPOINT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)/health(?:z|check)?\b|/ready\b|/live\b|/status\b").unwrap());
static METRICS_COLLECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"prometheus_client|prom-client|\bstatsd\b|\b(?:Counter|Histogram|Gauge|Summary)\s*\(|/metrics\b|opentelemetry").unwrap()
});

static ANTI_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"\bprint\s*\(", "Using print() instead of proper logging"),
        (r"except[^:\n]*:\s*pass\b", "Silent exception handling without logging"),
        (r"(?i)console\.log\([^)\n]*error", "Using console.log for errors"),
    ]
    .iter()
    .map(|(pattern, issue)| (Regex::new(pattern).unwrap(), *issue))
    .collect()
});

/// Observed logging and monitoring signals
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitoringSignals {
    pub has_logging: bool,
    pub frameworks: BTreeSet<String>,
    pub structured_logging: bool,
    pub error_tracking: bool,
    pub metrics_collection: bool,
    pub health_checks: bool,
    pub integrations: BTreeSet<String>,
    pub levels: BTreeSet<&'static str>,
    pub issues: Vec<String>,
}

impl MonitoringSignals {
    /// Libraries declared in a dependency manifest
    pub fn observe_manifest(&mut self, text: &str) {
        let lower = text.to_lowercase();
        for (keyword, name, structured) in LOGGING_LIBRARIES {
            if lower.contains(keyword) {
                self.has_logging = true;
                self.frameworks.insert(name.to_string());
                self.structured_logging |= structured;
            }
        }
        if ERROR_TRACKERS.iter().any(|t| lower.contains(t)) {
            self.error_tracking = true;
        }
        for (name, keywords) in INTEGRATIONS {
            if keywords.iter().any(|k| lower.contains(k)) {
                self.integrations.insert(name.to_string());
            }
        }
    }

    pub fn observe_source(&mut self, file_name: &str, source: &str) {
        if STDLIB_LOGGING.is_match(source) {
            self.has_logging = true;
            self.frameworks.insert("Python logging".to_string());
        } else if LOGGING_USAGE.is_match(source) {
            self.has_logging = true;
        }

        for (level, pattern) in LEVEL_PATTERNS.iter() {
            if pattern.is_match(source) {
                self.levels.insert(*level);
            }
        }

        let lower = source.to_lowercase();
        if LOGGED_EXCEPTION.is_match(source) || ERROR_TRACKERS.iter().any(|t| lower.contains(t)) {
            self.error_tracking = true;
        }
        self.health_checks |= HEALTH_ENDPOINT.is_match(source);
        self.metrics_collection |= METRICS_COLLECTION.is_match(source);

        for (pattern, issue) in ANTI_PATTERNS.iter() {
            if pattern.is_match(source) {
                self.issues.push(format!("{} in {}", issue, file_name));
            }
        }
    }

    /// `20 logging + 15 each for structured logging, error tracking,
    /// metrics and health checks`, then up to 10 each for integrations (3
    /// apiece) and log levels (2 apiece)
    pub fn score(&self) -> f64 {
        let bonus = |present: bool, points: f64| if present { points } else { 0.0 };
        let score = bonus(self.has_logging, 20.0)
            + bonus(self.structured_logging, 15.0)
            + bonus(self.error_tracking, 15.0)
            + bonus(self.metrics_collection, 15.0)
            + bonus(self.health_checks, 15.0)
            + (self.integrations.len() as f64 * 3.0).min(10.0)
            + (self.levels.len() as f64 * 2.0).min(10.0);
        score.min(100.0)
    }

    pub fn recommendations(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if !self.has_logging {
            out.push("Implement comprehensive logging throughout the application");
        }
        if !self.structured_logging {
            out.push("Use structured logging with consistent formats");
        }
        if !self.error_tracking {
            out.push("Add error tracking and exception monitoring");
        }
        if !self.metrics_collection {
            out.push("Implement application metrics and performance monitoring");
        }
        if !self.health_checks {
            out.push("Add health check endpoints for service monitoring");
        }
        if self.integrations.is_empty() {
            out.push("Integrate with monitoring platforms (Prometheus, ELK, etc.)");
        }
        out
    }
}

pub struct MonitoringAnalyzer;

impl RepoAnalyzer for MonitoringAnalyzer {
    fn name(&self) -> &'static str {
        "monitoring"
    }

    fn description(&self) -> &'static str {
        "Analyzing logging and monitoring"
    }

    fn analyze(&self, ctx: &RepoContext) -> Result<AnalyzerOutput> {
        let mut signals = MonitoringSignals::default();

        for manifest in MANIFESTS {
            if !ctx.exists(manifest) {
                continue;
            }
            if let Some(text) = ctx.read(&ctx.root.join(manifest)) {
                signals.observe_manifest(&text);
            }
        }
        for (file, integration) in INTEGRATION_CONFIGS {
            if ctx.exists(file) {
                signals.integrations.insert(integration.to_string());
            }
        }

        let mut files = ctx.files_with_extensions(SOURCE_EXTENSIONS)?;
        files.truncate(ctx.config.analysis.max_complexity_files);
        for path in &files {
            if let Some(text) = ctx.read(path) {
                signals.observe_source(&ctx.display_path(path), &text);
            }
        }

        let score = signals.score();
        let framework = if signals.frameworks.is_empty() {
            signals.has_logging.then(|| "Basic logging".to_string())
        } else {
            Some(signals.frameworks.iter().cloned().collect::<Vec<_>>().join(", "))
        };

        let values = json!({
            "has_logging": signals.has_logging,
            "logging_framework": framework,
            "structured_logging": signals.structured_logging,
            "error_tracking": signals.error_tracking,
            "metrics_collection": signals.metrics_collection,
            "health_checks": signals.health_checks,
            "monitoring_integrations": signals.integrations,
            "logging_levels_used": signals.levels,
            "logging_quality_score": score,
            "monitoring_quality": quality_label(score),
            "issues": signals.issues,
            "recommendations": signals.recommendations()
        });
        Ok(AnalyzerOutput::section("monitoring_analysis", into_map(values)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QualityConfig;
    use indoc::indoc;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_manifest_libraries() {
        let mut signals = MonitoringSignals::default();
        signals.observe_manifest(r#"{"dependencies": {"pino": "8", "@sentry/node": "7", "prom-client": "15"}}"#);
        assert!(signals.has_logging);
        assert!(signals.structured_logging);
        assert!(signals.error_tracking);
        let integrations: Vec<_> = signals.integrations.iter().cloned().collect();
        assert_eq!(integrations, vec!["Prometheus", "Sentry"]);
    }

    #[test]
    fn test_source_signals() {
        let source = indoc! {r#"
            import logging
            logger = logging.getLogger(__name__)

            @app.get("/healthz")
            def health():
                logger.info("ok")
                return {"ok": True}

            def work():
                try:
                    run()
                except Exception:
                    logger.error("failed")
        "#};
        let mut signals = MonitoringSignals::default();
        signals.observe_source("app.py", source);
        assert!(signals.has_logging);
        assert!(signals.frameworks.contains("Python logging"));
        assert!(signals.health_checks);
        assert!(signals.error_tracking);
        assert!(!signals.metrics_collection);
        let levels: Vec<_> = signals.levels.iter().copied().collect();
        assert_eq!(levels, vec!["ERROR", "INFO"]);
        assert!(signals.issues.is_empty());
    }

    #[test]
    fn test_print_debugging_is_reported() {
        let mut signals = MonitoringSignals::default();
        signals.observe_source("a.py", "print('hi')\n");
        assert_eq!(signals.issues, vec!["Using print() instead of proper logging in a.py"]);
    }

    #[test]
    fn test_score_formula() {
        let signals = MonitoringSignals {
            has_logging: true,
            structured_logging: true,
            health_checks: true,
            integrations: ["Prometheus".to_string()].into_iter().collect(),
            levels: ["INFO", "ERROR"].into_iter().collect(),
            ..Default::default()
        };
        // 20 + 15 + 15 + 3 + 4
        assert_eq!(signals.score(), 57.0);
    }

    #[test]
    fn test_empty_repository() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("lib.js"), "export const x = 1;\n").unwrap();
        let config = QualityConfig::default();
        let output = MonitoringAnalyzer
            .analyze(&RepoContext::new(dir.path(), &config))
            .unwrap();
        assert_eq!(output.values["has_logging"], json!(false));
        assert_eq!(output.values["logging_framework"], json!(null));
        assert_eq!(output.values["logging_quality_score"], json!(0.0));
        assert_eq!(output.values["monitoring_quality"], json!("Poor"));
    }
}

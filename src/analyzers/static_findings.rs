//! Line-oriented regex scan for risky constructs in Python and JS/TS
//! sources. Findings feed the security score and the report.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Map;

use super::{AnalyzerOutput, RepoAnalyzer, RepoContext, SOURCE_EXTENSIONS};
use crate::errors::Result;

pub const DANGEROUS_FUNCTION: &str = "Dangerous Function";
pub const SQL_INJECTION_RISK: &str = "SQL Injection Risk";
pub const HARDCODED_CREDENTIAL: &str = "Hardcoded Credential";
pub const INSECURE_IMPORT: &str = "Insecure Import";
pub const POTENTIAL_SECRET: &str = "Potential Secret";
pub const DEBUG_STATEMENT: &str = "Debug Statement";

const MAX_SNIPPET_CHARS: usize = 120;
const MAX_FINDINGS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Language {
    Python,
    Script,
    Any,
}

struct FindingPattern {
    kind: &'static str,
    language: Language,
    pattern: Regex,
}

impl FindingPattern {
    fn new(kind: &'static str, language: Language, pattern: &str) -> Self {
        Self {
            kind,
            language,
            pattern: Regex::new(pattern).unwrap(),
        }
    }

    fn applies_to(&self, language: Language) -> bool {
        self.language == Language::Any || self.language == language
    }
}

static PATTERNS: Lazy<Vec<FindingPattern>> = Lazy::new(|| {
    use Language::*;
    vec![
        FindingPattern::new(DANGEROUS_FUNCTION, Python, r"\b(eval|exec)\s*\("),
        FindingPattern::new(DANGEROUS_FUNCTION, Python, r"\bos\.system\s*\("),
        FindingPattern::new(DANGEROUS_FUNCTION, Python, r"subprocess\.\w+\([^)]*shell\s*=\s*True"),
        FindingPattern::new(DANGEROUS_FUNCTION, Python, r"\bpickle\.loads?\s*\("),
        FindingPattern::new(DANGEROUS_FUNCTION, Python, r"\byaml\.unsafe_load\s*\(|\byaml\.load\s*\([^,)]*\)"),
        FindingPattern::new(DANGEROUS_FUNCTION, Script, r"\beval\s*\("),
        FindingPattern::new(DANGEROUS_FUNCTION, Script, r"\bnew\s+Function\s*\("),
        FindingPattern::new(DANGEROUS_FUNCTION, Script, r"\.innerHTML\s*="),
        FindingPattern::new(DANGEROUS_FUNCTION, Script, r"dangerouslySetInnerHTML"),
        FindingPattern::new(DANGEROUS_FUNCTION, Script, r"child_process\.exec\s*\("),
        FindingPattern::new(
            SQL_INJECTION_RISK,
            Any,
            r#"(?i)\b(execute|query|raw)\s*\(\s*(f["']|["'][^"']*\b(select|insert|update|delete)\b[^"']*["']\s*(%|\+)|`[^`]*\$\{)"#,
        ),
        FindingPattern::new(
            SQL_INJECTION_RISK,
            Any,
            r#"(?i)["']\s*(select|insert into|update|delete from)\b[^"']*["']\s*\.format\("#,
        ),
        FindingPattern::new(
            HARDCODED_CREDENTIAL,
            Any,
            r#"(?i)\b(password|passwd|pwd|secret|api_?key|auth_?token|access_?token)\b\s*[:=]\s*["'][^"'\s]{4,}["']"#,
        ),
        FindingPattern::new(INSECURE_IMPORT, Python, r"^\s*(import|from)\s+(telnetlib|ftplib|md5|sha)\b"),
        FindingPattern::new(INSECURE_IMPORT, Python, r"^\s*from\s+Crypto\.Cipher\s+import\s+DES\b"),
        FindingPattern::new(INSECURE_IMPORT, Script, r#"require\(\s*["'](md5|sha1)["']\s*\)"#),
        FindingPattern::new(POTENTIAL_SECRET, Any, r"AKIA[0-9A-Z]{16}"),
        FindingPattern::new(POTENTIAL_SECRET, Any, r"ghp_[a-zA-Z0-9]{36}"),
        FindingPattern::new(POTENTIAL_SECRET, Any, r"sk_live_[a-zA-Z0-9]{24,}"),
        FindingPattern::new(POTENTIAL_SECRET, Any, r"xox[baprs]-[0-9]{10,13}-[0-9]{10,13}[a-zA-Z0-9-]*"),
        FindingPattern::new(POTENTIAL_SECRET, Any, r"-----BEGIN (RSA |EC |DSA |OPENSSH )?PRIVATE KEY-----"),
        FindingPattern::new(POTENTIAL_SECRET, Any, r"(?i)(postgres|mysql|mongodb|redis)://[^:\s]+:[^@\s]+@"),
        FindingPattern::new(DEBUG_STATEMENT, Python, r"^\s*(breakpoint\(\)|import\s+pdb|pdb\.set_trace\(\))"),
        FindingPattern::new(DEBUG_STATEMENT, Script, r"^\s*debugger\s*;?\s*$"),
        FindingPattern::new(DEBUG_STATEMENT, Script, r"\bconsole\.(log|debug)\s*\("),
    ]
});

/// One matched line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticFinding {
    #[serde(rename = "type")]
    pub kind: String,
    pub file: String,
    pub line: usize,
    pub content: String,
}

pub struct StaticFindingsAnalyzer;

impl RepoAnalyzer for StaticFindingsAnalyzer {
    fn name(&self) -> &'static str {
        "static_findings"
    }

    fn description(&self) -> &'static str {
        "Scanning sources for risky patterns"
    }

    fn analyze(&self, ctx: &RepoContext) -> Result<AnalyzerOutput> {
        let mut findings = Vec::new();
        for path in ctx.files_with_extensions(SOURCE_EXTENSIONS)? {
            let Some(text) = ctx.read(&path) else { continue };
            let language = match path.extension().and_then(|e| e.to_str()) {
                Some("py") => Language::Python,
                _ => Language::Script,
            };
            findings.extend(scan_source(&ctx.display_path(&path), &text, language));
            if findings.len() >= MAX_FINDINGS {
                tracing::warn!("Static findings capped at {}", MAX_FINDINGS);
                findings.truncate(MAX_FINDINGS);
                break;
            }
        }

        let mut values = Map::new();
        values.insert("custom_static_findings".into(), serde_json::to_value(&findings)?);
        Ok(AnalyzerOutput::top_level(values))
    }
}

/// Scan one file. A line yields at most one finding per type.
fn scan_source(file: &str, text: &str, language: Language) -> Vec<StaticFinding> {
    if text.contains('\0') {
        return Vec::new();
    }

    let mut findings = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let mut matched: Vec<&str> = Vec::new();
        for pattern in PATTERNS.iter().filter(|p| p.applies_to(language)) {
            if matched.contains(&pattern.kind) || !pattern.pattern.is_match(line) {
                continue;
            }
            matched.push(pattern.kind);
            findings.push(StaticFinding {
                kind: pattern.kind.to_string(),
                file: file.to_string(),
                line: index + 1,
                content: snippet(line),
            });
        }
    }
    findings
}

fn snippet(line: &str) -> String {
    let trimmed = line.trim();
    if trimmed.chars().count() <= MAX_SNIPPET_CHARS {
        trimmed.to_string()
    } else {
        let mut cut: String = trimmed.chars().take(MAX_SNIPPET_CHARS).collect();
        cut.push_str("...");
        cut
    }
}

/// Scan a single source for tests and ad-hoc use
pub fn scan(file: &str, text: &str) -> Vec<StaticFinding> {
    let language = if file.ends_with(".py") {
        Language::Python
    } else {
        Language::Script
    };
    scan_source(file, text, language)
}

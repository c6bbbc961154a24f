//! Token pass for JavaScript and TypeScript.
//!
//! No parse tree is used for complexity: function headers are located by
//! pattern and the text between consecutive headers is attributed to the
//! earlier function. Decision keywords in each segment give its complexity.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::debug;

use super::halstead::{script_counts, HalsteadCounts};
use super::parser::{parse_source, Grammar};
use super::{FileAnalysis, FunctionComplexity};
use crate::errors::Result;

static FUNCTION_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"function\s*\*?\s*(?P<name>[A-Za-z_$][\w$]*)?\s*\((?P<params>[^)]*)\)|(?:(?P<binding>[A-Za-z_$][\w$]*)\s*[=:]\s*(?:async\s*)?)?\((?P<arrow_params>[^)]*)\)\s*(?::\s*[^=;{()]+?)?\s*=>",
    )
    .unwrap()
});

static DECISION_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:if|for|while|case|catch)\b|&&|\|\|").unwrap());

static BLOCK_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());

static LINE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)(^|[^:\\])//.*$").unwrap());

pub fn analyze(path: &Path, source: &str) -> Result<FileAnalysis> {
    let stripped = strip_comments(source);

    Ok(FileAnalysis {
        functions: segment_functions(&stripped),
        halstead: halstead_for(path, source),
    })
}

fn halstead_for(path: &Path, source: &str) -> HalsteadCounts {
    let grammar = Grammar::from_path(path).unwrap_or(Grammar::JavaScript);
    match parse_source(source, grammar) {
        Ok(tree) => script_counts(tree.root_node(), source),
        Err(e) => {
            debug!("Skipping token counts for {}: {}", path.display(), e);
            HalsteadCounts::default()
        }
    }
}

/// Blank out comments, keeping newlines so line numbers survive.
fn strip_comments(source: &str) -> String {
    let without_blocks = BLOCK_COMMENT.replace_all(source, |caps: &regex::Captures| {
        caps[0]
            .chars()
            .map(|c| if c == '\n' { '\n' } else { ' ' })
            .collect::<String>()
    });
    LINE_COMMENT
        .replace_all(&without_blocks, "${1}")
        .into_owned()
}

struct Header {
    offset: usize,
    name: String,
    params: usize,
}

fn find_headers(text: &str) -> Vec<Header> {
    FUNCTION_HEADER
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps
                .name("name")
                .or_else(|| caps.name("binding"))
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| "<anonymous>".to_string());
            let params = caps
                .name("params")
                .or_else(|| caps.name("arrow_params"))
                .map(|m| count_params(m.as_str()))
                .unwrap_or(0);
            Some(Header {
                offset: whole.start(),
                name,
                params,
            })
        })
        .collect()
}

fn count_params(params: &str) -> usize {
    params.split(',').filter(|p| !p.trim().is_empty()).count()
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}

fn count_decisions(segment: &str) -> u32 {
    DECISION_TOKEN.find_iter(segment).count() as u32
}

fn segment_functions(text: &str) -> Vec<FunctionComplexity> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let headers = find_headers(text);
    if headers.is_empty() {
        return vec![FunctionComplexity {
            name: "<module>".to_string(),
            line: 1,
            decisions: count_decisions(text),
            params: 0,
        }];
    }

    headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let start = if i == 0 { 0 } else { header.offset };
            let end = headers.get(i + 1).map_or(text.len(), |next| next.offset);
            FunctionComplexity {
                name: header.name.clone(),
                line: line_of(text, header.offset),
                decisions: count_decisions(&text[start..end]),
                params: header.params,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use std::path::PathBuf;

    fn js(source: &str) -> FileAnalysis {
        analyze(&PathBuf::from("app.js"), source).unwrap()
    }

    #[test]
    fn test_named_and_arrow_functions_found() {
        let analysis = js(indoc! {r#"
            function load(path) {
              if (!path) { return null; }
              return read(path);
            }
            const save = async (path, data) => {
              for (const chunk of data) { write(path, chunk); }
            };
        "#});
        let names: Vec<_> = analysis.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["load", "save"]);
        assert_eq!(analysis.functions[0].decisions, 1);
        assert_eq!(analysis.functions[1].decisions, 1);
        assert_eq!(analysis.functions[1].params, 2);
        assert_eq!(analysis.functions[1].line, 5);
    }

    #[test]
    fn test_file_without_functions_is_one_unit() {
        let analysis = js("if (a || b) { run(); }\nwhile (x) { x--; }\n");
        assert_eq!(analysis.functions.len(), 1);
        assert_eq!(analysis.functions[0].name, "<module>");
        // if, ||, while
        assert_eq!(analysis.functions[0].decisions, 3);
    }

    #[test]
    fn test_comments_ignored() {
        let analysis = js(indoc! {r#"
            // if this were code it would count
            /* while (true) {
               for (;;) {} } */
            function f() { return 1; }
        "#});
        assert_eq!(analysis.functions.len(), 1);
        assert_eq!(analysis.functions[0].decisions, 0);
        assert_eq!(analysis.functions[0].line, 4);
    }

    #[test]
    fn test_keywords_inside_identifiers_not_counted() {
        let analysis = js("function notify(iffy, format) { return verify(iffy); }\n");
        assert_eq!(analysis.functions[0].decisions, 0);
    }

    #[test]
    fn test_typescript_parameters_counted() {
        let source = "function build(a: A, b: B, c: C, d: D, e: E, f: F, g: G, h: H): R { return a; }\n";
        let analysis = analyze(&PathBuf::from("build.ts"), source).unwrap();
        assert_eq!(analysis.functions[0].params, 8);
        assert!(analysis.halstead.metrics().is_some());
    }

    #[test]
    fn test_empty_file_has_no_functions() {
        assert!(js("   \n\n").functions.is_empty());
    }
}

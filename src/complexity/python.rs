//! Structured Python pass over a tree-sitter parse tree.

use tree_sitter::Node;

use super::halstead::python_counts;
use super::parser::{node_text, parse_source, visit, Grammar};
use super::{FileAnalysis, FunctionComplexity};
use crate::errors::Result;

/// Node kinds that add a decision point. `elif_clause` stands in for the
/// nested `if` Python's own AST produces; `for_in_clause` is one
/// comprehension generator.
const DECISION_KINDS: &[&str] = &[
    "if_statement",
    "elif_clause",
    "for_statement",
    "while_statement",
    "try_statement",
    "except_clause",
    "with_statement",
    "boolean_operator",
    "assert_statement",
    "for_in_clause",
];

/// Declared parameters that count toward the parameter limit. Splats and
/// the bare `*` / `/` separators do not.
const PARAMETER_KINDS: &[&str] = &[
    "identifier",
    "typed_parameter",
    "default_parameter",
    "typed_default_parameter",
];

pub fn analyze(source: &str) -> Result<FileAnalysis> {
    let tree = parse_source(source, Grammar::Python)?;
    let root = tree.root_node();

    let mut functions = Vec::new();
    visit(root, &mut |node| {
        if node.kind() == "function_definition" {
            functions.push(function_complexity(node, source));
        }
    });

    Ok(FileAnalysis {
        functions,
        halstead: python_counts(root, source),
    })
}

fn function_complexity(node: Node, source: &str) -> FunctionComplexity {
    let name = node
        .child_by_field_name("name")
        .map(|n| node_text(&n, source).to_string())
        .unwrap_or_else(|| "<anonymous>".to_string());

    FunctionComplexity {
        name,
        line: node.start_position().row + 1,
        decisions: count_decisions(node),
        params: count_parameters(node),
    }
}

/// Decision points anywhere under the function, nested definitions included.
fn count_decisions(function: Node) -> u32 {
    let mut decisions = 0;
    visit(function, &mut |node| {
        if DECISION_KINDS.contains(&node.kind()) {
            decisions += 1;
        }
    });
    decisions
}

fn count_parameters(function: Node) -> usize {
    let Some(params) = function.child_by_field_name("parameters") else {
        return 0;
    };
    let mut cursor = params.walk();
    params
        .named_children(&mut cursor)
        .filter(|p| PARAMETER_KINDS.contains(&p.kind()))
        .count()
}

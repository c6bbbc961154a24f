//! Halstead lexical metrics
//!
//! Informational only: these figures appear in reports but never feed the
//! score composition.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tree_sitter::Node;

use super::parser::{node_text, visit};

/// Raw operator/operand tallies, mergeable across files
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HalsteadCounts {
    operators: HashSet<String>,
    operands: HashSet<String>,
    total_operators: usize,
    total_operands: usize,
}

impl HalsteadCounts {
    pub fn operator(&mut self, token: &str) {
        self.operators.insert(token.to_string());
        self.total_operators += 1;
    }

    pub fn operand(&mut self, token: &str) {
        self.operands.insert(token.to_string());
        self.total_operands += 1;
    }

    pub fn merge(&mut self, other: HalsteadCounts) {
        self.operators.extend(other.operators);
        self.operands.extend(other.operands);
        self.total_operators += other.total_operators;
        self.total_operands += other.total_operands;
    }

    pub fn distinct_operators(&self) -> usize {
        self.operators.len()
    }

    pub fn distinct_operands(&self) -> usize {
        self.operands.len()
    }

    /// Derived metrics, or `None` when nothing was counted
    pub fn metrics(&self) -> Option<HalsteadMetrics> {
        let n1 = self.operators.len();
        let n2 = self.operands.len();
        let vocabulary = n1 + n2;
        if vocabulary == 0 {
            return None;
        }

        let length = self.total_operators + self.total_operands;
        let volume = length as f64 * (vocabulary as f64).log2();
        let difficulty = if n2 > 0 {
            (n1 as f64 / 2.0) * (self.total_operands as f64 / n2 as f64)
        } else {
            0.0
        };

        Some(HalsteadMetrics {
            vocabulary,
            length,
            volume: round2(volume),
            difficulty: round2(difficulty),
            effort: round2(volume * difficulty),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HalsteadMetrics {
    pub vocabulary: usize,
    pub length: usize,
    pub volume: f64,
    pub difficulty: f64,
    pub effort: f64,
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Count Python operators (arithmetic, unary, boolean, comparison) and
/// operands (call targets and name references).
pub fn python_counts(root: Node, source: &str) -> HalsteadCounts {
    let mut counts = HalsteadCounts::default();
    visit(root, &mut |node| match node.kind() {
        "binary_operator" | "unary_operator" | "boolean_operator" => {
            if let Some(op) = node.child_by_field_name("operator") {
                counts.operator(node_text(&op, source));
            }
        }
        "comparison_operator" => {
            let mut cursor = node.walk();
            let first_op = node.children(&mut cursor).find(|child| !child.is_named());
            if let Some(op) = first_op {
                counts.operator(node_text(&op, source));
            }
        }
        "call" => {
            let target = node
                .child_by_field_name("function")
                .filter(|f| f.kind() == "identifier")
                .map(|f| node_text(&f, source))
                .unwrap_or("call");
            counts.operand(target);
        }
        "identifier" if is_name_reference(node) => {
            counts.operand(node_text(&node, source));
        }
        _ => {}
    });
    counts
}

/// Identifiers used as values, excluding definition names, parameters,
/// attribute fields, keyword labels and import paths.
fn is_name_reference(node: Node) -> bool {
    let Some(parent) = node.parent() else {
        return true;
    };
    let is_field = |field: &str| {
        parent
            .child_by_field_name(field)
            .is_some_and(|child| child.id() == node.id())
    };

    match parent.kind() {
        "function_definition" | "class_definition" => !is_field("name"),
        "attribute" => !is_field("attribute"),
        "keyword_argument" => !is_field("name"),
        "default_parameter" | "typed_default_parameter" => !is_field("name"),
        "parameters" | "lambda_parameters" | "typed_parameter" => false,
        "dotted_name" | "aliased_import" | "import_from_statement" => false,
        _ => true,
    }
}

const SCRIPT_OPERAND_KINDS: &[&str] = &[
    "identifier",
    "property_identifier",
    "shorthand_property_identifier",
    "shorthand_property_identifier_pattern",
    "private_property_identifier",
    "type_identifier",
    "number",
    "string_fragment",
    "regex_pattern",
];

const QUOTE_TOKENS: &[&str] = &["\"", "'", "`"];

/// Count JavaScript/TypeScript tokens: anonymous leaves (keywords and
/// punctuators) are operators; identifiers, strings and numbers are operands.
pub fn script_counts(root: Node, source: &str) -> HalsteadCounts {
    let mut counts = HalsteadCounts::default();
    visit(root, &mut |node| {
        if node.child_count() > 0 {
            return;
        }
        let kind = node.kind();
        if !node.is_named() {
            if !QUOTE_TOKENS.contains(&kind) && !kind.is_empty() {
                counts.operator(kind);
            }
        } else if SCRIPT_OPERAND_KINDS.contains(&kind) {
            counts.operand(node_text(&node, source));
        }
    });
    counts
}

//! Tree-sitter parser integration for Python and JavaScript/TypeScript

use std::path::Path;

use tree_sitter::{Language as TsLanguage, Node, Parser, Tree};

use crate::errors::{Error, Result};

/// Grammar selection for tree-sitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    Python,
    JavaScript,
    TypeScript,
    Tsx,
}

impl Grammar {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(|ext| ext.to_str())?;
        match ext {
            "py" => Some(Self::Python),
            "js" | "jsx" | "mjs" | "cjs" => Some(Self::JavaScript),
            "ts" | "mts" | "cts" => Some(Self::TypeScript),
            "tsx" => Some(Self::Tsx),
            _ => None,
        }
    }

    fn language(self) -> TsLanguage {
        match self {
            Self::Python => tree_sitter_python::LANGUAGE.into(),
            Self::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

/// Parse source text into a tree-sitter tree
pub fn parse_source(content: &str, grammar: Grammar) -> Result<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&grammar.language())
        .map_err(|e| Error::Analysis(format!("Failed to set tree-sitter language: {}", e)))?;

    parser
        .parse(content, None)
        .ok_or_else(|| Error::Analysis(format!("Failed to parse {:?} source", grammar)))
}

/// Get text for a tree-sitter node
pub fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// Pre-order traversal over `node` and all of its descendants. Walks with a
/// single cursor so nesting depth never grows the call stack.
pub fn visit<'t>(node: Node<'t>, f: &mut impl FnMut(Node<'t>)) {
    let mut cursor = node.walk();
    loop {
        f(cursor.node());
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

//! Whitespace pass for synthesized statements.
//!
//! Only nodes carrying [`Annotation::Reformat`] are touched: their first
//! line is re-indented to the recorded indentation and the annotation is
//! dropped. Everything else keeps its trivia byte for byte.

use crate::syntax::{Annotation, GreenElement, GreenNode, SyntaxTree};
use std::sync::Arc;

/// Format every annotated node of `tree`.
pub fn format_annotated(tree: &SyntaxTree) -> SyntaxTree {
    match format_node(tree.green()) {
        Some(root) => tree.with_root(Arc::new(root)),
        None => tree.clone(),
    }
}

/// Formatted copy of `node`, or `None` when nothing in it is annotated.
fn format_node(node: &GreenNode) -> Option<GreenNode> {
    if let Some(Annotation::Reformat { indent }) = node.annotation() {
        let node = match indent {
            Some(indent) => node.with_leading_trivia(&reindent(node.leading_trivia(), indent)),
            None => node.clone(),
        };
        return Some(node.without_annotation());
    }

    let mut formatted: Option<GreenNode> = None;
    for (index, child) in node.children().iter().enumerate() {
        let GreenElement::Node(inner) = child else {
            continue;
        };
        if let Some(inner) = format_node(inner) {
            let base = formatted.as_ref().unwrap_or(node);
            formatted = Some(base.replace_child(index, GreenElement::Node(Arc::new(inner))));
        }
    }
    formatted
}

/// Keep line breaks and comments, replace the indentation of the last line.
fn reindent(leading: &str, indent: &str) -> String {
    match leading.rfind('\n') {
        Some(newline) => format!("{}{indent}", &leading[..=newline]),
        None => indent.to_string(),
    }
}

//! Immutable, position-independent tree storage.
//!
//! Green elements know their kind, their children and their width, but not
//! where they live. They are shared through `Arc`, so replacing one node only
//! allocates the spine from that node up to the root; every untouched subtree
//! is reused by the new tree.

use crate::syntax::kind::SyntaxKind;
use std::sync::Arc;

/// Marker attached to synthesized nodes for a downstream formatting pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// Re-indent the node's first line to `indent`. `None` means the
    /// replaced construct did not start a line and the trivia stays as is.
    Reformat { indent: Option<String> },
}

/// A leaf with its own text and its own trivia.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GreenToken {
    kind: SyntaxKind,
    text: String,
    leading: String,
    trailing: String,
    missing: bool,
}

impl GreenToken {
    pub fn new(kind: SyntaxKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            leading: String::new(),
            trailing: String::new(),
            missing: false,
        }
    }

    /// A zero-width token the parser inserted to recover from an error.
    pub fn missing(kind: SyntaxKind) -> Self {
        Self {
            missing: true,
            ..Self::new(kind, "")
        }
    }

    pub fn with_leading(mut self, leading: impl Into<String>) -> Self {
        self.leading = leading.into();
        self
    }

    pub fn with_trailing(mut self, trailing: impl Into<String>) -> Self {
        self.trailing = trailing.into();
        self
    }

    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn leading(&self) -> &str {
        &self.leading
    }

    pub fn trailing(&self) -> &str {
        &self.trailing
    }

    pub fn is_missing(&self) -> bool {
        self.missing
    }

    /// Width including trivia.
    pub fn full_width(&self) -> usize {
        self.leading.len() + self.text.len() + self.trailing.len()
    }

    fn write_to(&self, out: &mut String) {
        out.push_str(&self.leading);
        out.push_str(&self.text);
        out.push_str(&self.trailing);
    }
}

/// An interior node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GreenNode {
    kind: SyntaxKind,
    children: Vec<GreenElement>,
    width: usize,
    has_error: bool,
    annotation: Option<Annotation>,
}

impl GreenNode {
    pub fn new(kind: SyntaxKind, children: Vec<GreenElement>) -> Self {
        let width = children.iter().map(GreenElement::full_width).sum();
        let has_error =
            kind == SyntaxKind::Error || children.iter().any(GreenElement::has_error);
        Self {
            kind,
            children,
            width,
            has_error,
            annotation: None,
        }
    }

    /// Flag this node as malformed regardless of its children.
    pub fn with_error(mut self) -> Self {
        self.has_error = true;
        self
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotation = Some(annotation);
        self
    }

    pub fn without_annotation(mut self) -> Self {
        self.annotation = None;
        self
    }

    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    pub fn children(&self) -> &[GreenElement] {
        &self.children
    }

    pub fn annotation(&self) -> Option<&Annotation> {
        self.annotation.as_ref()
    }

    /// Width including the trivia of every token below this node.
    pub fn full_width(&self) -> usize {
        self.width
    }

    /// True when this node or a descendant is an error or a missing token.
    pub fn has_error(&self) -> bool {
        self.has_error
    }

    /// Copy of this node with child `index` swapped for `child`.
    ///
    /// Siblings are shared with `self`, and the annotation is kept.
    pub fn replace_child(&self, index: usize, child: GreenElement) -> GreenNode {
        let mut children = self.children.clone();
        let replaced = std::mem::replace(&mut children[index], child);
        let mut node = GreenNode::new(self.kind, children);
        node.annotation = self.annotation.clone();
        // An error flag set on this node itself survives the swap.
        if self.has_error && !replaced.has_error() {
            node.has_error = true;
        }
        node
    }

    pub fn leading_trivia(&self) -> &str {
        self.children
            .iter()
            .find(|child| child.has_tokens())
            .map_or("", GreenElement::leading_trivia)
    }

    pub fn trailing_trivia(&self) -> &str {
        self.children
            .iter()
            .rev()
            .find(|child| child.has_tokens())
            .map_or("", GreenElement::trailing_trivia)
    }

    /// Copy of this node whose first token carries `trivia` as leading trivia.
    pub fn with_leading_trivia(&self, trivia: &str) -> GreenNode {
        match self.children.iter().position(GreenElement::has_tokens) {
            Some(index) => {
                self.replace_child(index, self.children[index].with_leading_trivia(trivia))
            }
            None => self.clone(),
        }
    }

    /// Copy of this node whose last token carries `trivia` as trailing trivia.
    pub fn with_trailing_trivia(&self, trivia: &str) -> GreenNode {
        match self.children.iter().rposition(GreenElement::has_tokens) {
            Some(index) => {
                self.replace_child(index, self.children[index].with_trailing_trivia(trivia))
            }
            None => self.clone(),
        }
    }

    /// Serialize the subtree, trivia included.
    pub fn to_full_string(&self) -> String {
        let mut out = String::with_capacity(self.width);
        self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut String) {
        for child in &self.children {
            child.write_to(out);
        }
    }

    fn has_tokens(&self) -> bool {
        self.children.iter().any(GreenElement::has_tokens)
    }
}

/// Either a node or a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GreenElement {
    Node(Arc<GreenNode>),
    Token(Arc<GreenToken>),
}

impl GreenElement {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            GreenElement::Node(node) => node.kind(),
            GreenElement::Token(token) => token.kind(),
        }
    }

    pub fn full_width(&self) -> usize {
        match self {
            GreenElement::Node(node) => node.full_width(),
            GreenElement::Token(token) => token.full_width(),
        }
    }

    pub fn has_error(&self) -> bool {
        match self {
            GreenElement::Node(node) => node.has_error(),
            GreenElement::Token(token) => token.is_missing(),
        }
    }

    pub fn leading_trivia(&self) -> &str {
        match self {
            GreenElement::Node(node) => node.leading_trivia(),
            GreenElement::Token(token) => token.leading(),
        }
    }

    pub fn trailing_trivia(&self) -> &str {
        match self {
            GreenElement::Node(node) => node.trailing_trivia(),
            GreenElement::Token(token) => token.trailing(),
        }
    }

    pub fn with_leading_trivia(&self, trivia: &str) -> GreenElement {
        match self {
            GreenElement::Node(node) => {
                GreenElement::Node(Arc::new(node.with_leading_trivia(trivia)))
            }
            GreenElement::Token(token) => GreenElement::Token(Arc::new(
                GreenToken::clone(token).with_leading(trivia),
            )),
        }
    }

    pub fn with_trailing_trivia(&self, trivia: &str) -> GreenElement {
        match self {
            GreenElement::Node(node) => {
                GreenElement::Node(Arc::new(node.with_trailing_trivia(trivia)))
            }
            GreenElement::Token(token) => GreenElement::Token(Arc::new(
                GreenToken::clone(token).with_trailing(trivia),
            )),
        }
    }

    pub fn to_full_string(&self) -> String {
        let mut out = String::with_capacity(self.full_width());
        self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut String) {
        match self {
            GreenElement::Node(node) => node.write_to(out),
            GreenElement::Token(token) => token.write_to(out),
        }
    }

    fn has_tokens(&self) -> bool {
        match self {
            GreenElement::Node(node) => node.has_tokens(),
            GreenElement::Token(_) => true,
        }
    }
}

impl From<GreenNode> for GreenElement {
    fn from(node: GreenNode) -> Self {
        GreenElement::Node(Arc::new(node))
    }
}

impl From<GreenToken> for GreenElement {
    fn from(token: GreenToken) -> Self {
        GreenElement::Token(Arc::new(token))
    }
}

//! Positioned cursors over green trees.
//!
//! A [`SyntaxNode`] pairs a green node with its parent cursor and absolute
//! offset, so ancestors and source ranges are available without storing
//! positions in the shared green data.

use crate::syntax::green::{GreenElement, GreenNode, GreenToken};
use crate::syntax::kind::SyntaxKind;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

#[derive(Clone)]
pub struct SyntaxNode(Arc<NodeData>);

struct NodeData {
    green: Arc<GreenNode>,
    parent: Option<SyntaxNode>,
    index: usize,
    offset: usize,
}

#[derive(Clone)]
pub struct SyntaxToken {
    green: Arc<GreenToken>,
    parent: SyntaxNode,
    index: usize,
    offset: usize,
}

#[derive(Clone, PartialEq, Eq)]
pub enum SyntaxElement {
    Node(SyntaxNode),
    Token(SyntaxToken),
}

impl SyntaxNode {
    pub fn new_root(green: Arc<GreenNode>) -> Self {
        SyntaxNode(Arc::new(NodeData {
            green,
            parent: None,
            index: 0,
            offset: 0,
        }))
    }

    fn new_child(green: Arc<GreenNode>, parent: SyntaxNode, index: usize, offset: usize) -> Self {
        SyntaxNode(Arc::new(NodeData {
            green,
            parent: Some(parent),
            index,
            offset,
        }))
    }

    pub fn kind(&self) -> SyntaxKind {
        self.0.green.kind()
    }

    pub fn green(&self) -> &Arc<GreenNode> {
        &self.0.green
    }

    pub fn parent(&self) -> Option<SyntaxNode> {
        self.0.parent.clone()
    }

    /// Position of this node among its parent's children.
    pub fn index(&self) -> usize {
        self.0.index
    }

    /// Start offset including leading trivia.
    pub fn offset(&self) -> usize {
        self.0.offset
    }

    pub fn full_range(&self) -> Range<usize> {
        self.offset()..self.offset() + self.green().full_width()
    }

    /// Source range without the outer leading and trailing trivia.
    pub fn range(&self) -> Range<usize> {
        let full = self.full_range();
        let start = full.start + self.leading_trivia().len();
        let end = (full.end - self.trailing_trivia().len()).max(start);
        start..end
    }

    pub fn leading_trivia(&self) -> &str {
        self.0.green.leading_trivia()
    }

    pub fn trailing_trivia(&self) -> &str {
        self.0.green.trailing_trivia()
    }

    /// Source text without the outer trivia.
    pub fn text(&self) -> String {
        let full = self.0.green.to_full_string();
        let start = self.leading_trivia().len();
        let end = (full.len() - self.trailing_trivia().len()).max(start);
        full[start..end].to_string()
    }

    pub fn has_error(&self) -> bool {
        self.0.green.has_error()
    }

    pub fn root(&self) -> SyntaxNode {
        self.ancestors().last().unwrap_or_else(|| self.clone())
    }

    /// Child `index` as a positioned element.
    pub fn child_at(&self, index: usize) -> Option<SyntaxElement> {
        let children = self.0.green.children();
        let green = children.get(index)?;
        let offset = self.offset()
            + children[..index]
                .iter()
                .map(GreenElement::full_width)
                .sum::<usize>();
        Some(self.element(green, index, offset))
    }

    fn element(&self, green: &GreenElement, index: usize, offset: usize) -> SyntaxElement {
        match green {
            GreenElement::Node(node) => SyntaxElement::Node(SyntaxNode::new_child(
                Arc::clone(node),
                self.clone(),
                index,
                offset,
            )),
            GreenElement::Token(token) => SyntaxElement::Token(SyntaxToken {
                green: Arc::clone(token),
                parent: self.clone(),
                index,
                offset,
            }),
        }
    }

    pub fn children_with_tokens(&self) -> ChildElements {
        ChildElements {
            parent: self.clone(),
            index: 0,
            offset: self.offset(),
        }
    }

    pub fn children(&self) -> impl Iterator<Item = SyntaxNode> {
        self.children_with_tokens()
            .filter_map(SyntaxElement::into_node)
    }

    /// This node followed by its parents up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = SyntaxNode> {
        std::iter::successors(Some(self.clone()), SyntaxNode::parent)
    }

    /// Pre-order traversal of this node and every node below it.
    pub fn descendants(&self) -> Descendants {
        Descendants {
            stack: vec![self.clone()],
        }
    }

    pub fn first_token(&self) -> Option<SyntaxToken> {
        self.children_with_tokens()
            .find_map(|child| child.first_token())
    }

    pub fn last_token(&self) -> Option<SyntaxToken> {
        let count = self.0.green.children().len();
        (0..count)
            .rev()
            .filter_map(|index| self.child_at(index))
            .find_map(|child| child.last_token())
    }

    /// The token whose full range (trivia included) contains `offset`.
    pub fn token_at_offset(&self, offset: usize) -> Option<SyntaxToken> {
        let full = self.full_range();
        if offset == full.end {
            return self.last_token();
        }
        if !full.contains(&offset) {
            return None;
        }

        let mut node = self.clone();
        loop {
            let child = node
                .children_with_tokens()
                .find(|child| child.full_range().contains(&offset))?;
            match child {
                SyntaxElement::Node(inner) => node = inner,
                SyntaxElement::Token(token) => return Some(token),
            }
        }
    }

    /// Child indices leading from the root to this node.
    pub fn path(&self) -> Vec<usize> {
        let mut path: Vec<usize> = self
            .ancestors()
            .filter(|node| node.parent().is_some())
            .map(|node| node.index())
            .collect();
        path.reverse();
        path
    }
}

impl PartialEq for SyntaxNode {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0.green, &other.0.green) && self.offset() == other.offset()
    }
}

impl Eq for SyntaxNode {}

impl fmt::Debug for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:?}", self.kind().as_str(), self.range())
    }
}

impl SyntaxToken {
    pub fn kind(&self) -> SyntaxKind {
        self.green.kind()
    }

    pub fn green(&self) -> &Arc<GreenToken> {
        &self.green
    }

    pub fn text(&self) -> &str {
        self.green.text()
    }

    pub fn leading_trivia(&self) -> &str {
        self.green.leading()
    }

    pub fn trailing_trivia(&self) -> &str {
        self.green.trailing()
    }

    pub fn parent(&self) -> SyntaxNode {
        self.parent.clone()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn full_range(&self) -> Range<usize> {
        self.offset..self.offset + self.green.full_width()
    }

    pub fn range(&self) -> Range<usize> {
        let start = self.offset + self.green.leading().len();
        start..start + self.green.text().len()
    }

    /// The token immediately before this one in source order.
    pub fn prev_token(&self) -> Option<SyntaxToken> {
        let mut node = self.parent.clone();
        let mut index = self.index;
        loop {
            let found = (0..index)
                .rev()
                .filter_map(|i| node.child_at(i))
                .find_map(|sibling| sibling.last_token());
            if found.is_some() {
                return found;
            }
            index = node.index();
            node = node.parent()?;
        }
    }
}

impl PartialEq for SyntaxToken {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.green, &other.green) && self.offset == other.offset
    }
}

impl Eq for SyntaxToken {}

impl fmt::Debug for SyntaxToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:?} {:?}", self.kind().as_str(), self.range(), self.text())
    }
}

impl SyntaxElement {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            SyntaxElement::Node(node) => node.kind(),
            SyntaxElement::Token(token) => token.kind(),
        }
    }

    pub fn text(&self) -> String {
        match self {
            SyntaxElement::Node(node) => node.text(),
            SyntaxElement::Token(token) => token.text().to_string(),
        }
    }

    pub fn range(&self) -> Range<usize> {
        match self {
            SyntaxElement::Node(node) => node.range(),
            SyntaxElement::Token(token) => token.range(),
        }
    }

    pub fn full_range(&self) -> Range<usize> {
        match self {
            SyntaxElement::Node(node) => node.full_range(),
            SyntaxElement::Token(token) => token.full_range(),
        }
    }

    pub fn parent(&self) -> Option<SyntaxNode> {
        match self {
            SyntaxElement::Node(node) => node.parent(),
            SyntaxElement::Token(token) => Some(token.parent()),
        }
    }

    /// Shared green storage of this element.
    pub fn green(&self) -> GreenElement {
        match self {
            SyntaxElement::Node(node) => GreenElement::Node(Arc::clone(node.green())),
            SyntaxElement::Token(token) => GreenElement::Token(Arc::clone(token.green())),
        }
    }

    pub fn has_error(&self) -> bool {
        match self {
            SyntaxElement::Node(node) => node.has_error(),
            SyntaxElement::Token(token) => token.green().is_missing(),
        }
    }

    pub fn first_token(&self) -> Option<SyntaxToken> {
        match self {
            SyntaxElement::Node(node) => node.first_token(),
            SyntaxElement::Token(token) => Some(token.clone()),
        }
    }

    pub fn last_token(&self) -> Option<SyntaxToken> {
        match self {
            SyntaxElement::Node(node) => node.last_token(),
            SyntaxElement::Token(token) => Some(token.clone()),
        }
    }

    pub fn as_node(&self) -> Option<&SyntaxNode> {
        match self {
            SyntaxElement::Node(node) => Some(node),
            SyntaxElement::Token(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<&SyntaxToken> {
        match self {
            SyntaxElement::Node(_) => None,
            SyntaxElement::Token(token) => Some(token),
        }
    }

    pub fn into_node(self) -> Option<SyntaxNode> {
        match self {
            SyntaxElement::Node(node) => Some(node),
            SyntaxElement::Token(_) => None,
        }
    }

    /// Enclosing nodes, innermost first. A node is its own first ancestor.
    pub fn ancestors(&self) -> impl Iterator<Item = SyntaxNode> {
        let start = match self {
            SyntaxElement::Node(node) => Some(node.clone()),
            SyntaxElement::Token(token) => Some(token.parent()),
        };
        std::iter::successors(start, SyntaxNode::parent)
    }
}

impl fmt::Debug for SyntaxElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxElement::Node(node) => node.fmt(f),
            SyntaxElement::Token(token) => token.fmt(f),
        }
    }
}

/// Iterator over the direct children of a node, tokens included.
pub struct ChildElements {
    parent: SyntaxNode,
    index: usize,
    offset: usize,
}

impl Iterator for ChildElements {
    type Item = SyntaxElement;

    fn next(&mut self) -> Option<Self::Item> {
        let parent = self.parent.clone();
        let green = parent.green().children().get(self.index)?;
        let element = parent.element(green, self.index, self.offset);
        self.index += 1;
        self.offset += green.full_width();
        Some(element)
    }
}

/// Lazy pre-order node traversal.
pub struct Descendants {
    stack: Vec<SyntaxNode>,
}

impl Iterator for Descendants {
    type Item = SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let children: Vec<SyntaxNode> = node.children().collect();
        self.stack.extend(children.into_iter().rev());
        Some(node)
    }
}

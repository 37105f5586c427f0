//! Replaces a cancellation check with `receiver.ThrowIfCancellationRequested();`.
//!
//! Rewrites never touch the input tree. A [`Fix`] describes one replacement
//! as a child-index path plus the new green node, which is enough to apply
//! it to the tree it was planned against, to merge it with other fixes, or
//! to turn it into a byte-span [`Edit`].

use crate::edit::Edit;
use crate::pattern::{CancellationCheck, ShapeMismatch};
use crate::rule::{FIX_TITLE, THROW_IF_CANCELLATION_REQUESTED, USE_THROW_IF_CANCELLATION_REQUESTED};
use crate::syntax::{make, Annotation, GreenElement, GreenNode, SyntaxKind, SyntaxNode, SyntaxTree};
use std::ops::Range;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RewriteError {
    #[error("no if statement encloses offset {offset}")]
    Locate { offset: usize },

    #[error("if statement cannot be rewritten: {mismatch}")]
    Shape { mismatch: ShapeMismatch },

    #[error("node does not belong to the tree being rewritten")]
    ForeignNode,
}

impl From<ShapeMismatch> for RewriteError {
    fn from(mismatch: ShapeMismatch) -> Self {
        RewriteError::Shape { mismatch }
    }
}

/// The innermost `if` statement around the token at `offset`.
pub fn locate_if_statement(tree: &SyntaxTree, offset: usize) -> Result<SyntaxNode, RewriteError> {
    tree.root()
        .token_at_offset(offset)
        .and_then(|token| {
            token
                .parent()
                .ancestors()
                .find(|node| node.kind() == SyntaxKind::IfStatement)
        })
        .ok_or(RewriteError::Locate { offset })
}

/// Rewrite the `if` statement `target`, which must come from `tree`.
pub fn rewrite(tree: &SyntaxTree, target: &SyntaxNode) -> Result<SyntaxTree, RewriteError> {
    plan_fix(tree, target)?.apply(tree)
}

/// Rewrite the `if` statement enclosing `offset`.
pub fn rewrite_at(tree: &SyntaxTree, offset: usize) -> Result<SyntaxTree, RewriteError> {
    let target = locate_if_statement(tree, offset)?;
    rewrite(tree, &target)
}

/// A planned replacement of one `if` statement.
#[derive(Debug, Clone)]
pub struct Fix {
    title: &'static str,
    equivalence_key: &'static str,
    path: Vec<usize>,
    range: Range<usize>,
    full_range: Range<usize>,
    target: Arc<GreenNode>,
    replacement: Arc<GreenNode>,
}

/// Plan the rewrite of `target` without building the new tree.
pub fn plan_fix(tree: &SyntaxTree, target: &SyntaxNode) -> Result<Fix, RewriteError> {
    if !tree.contains(target) {
        return Err(RewriteError::ForeignNode);
    }
    let check = CancellationCheck::match_shape(target)?;
    let body = check.body().syntax();

    let call = make::invocation(make::member_access(
        check.receiver().green(),
        THROW_IF_CANCELLATION_REQUESTED,
    ));
    let mut statement = make::expression_statement(call);
    if statement.leading_trivia() != body.leading_trivia() {
        statement = statement.with_leading_trivia(body.leading_trivia());
    }
    let statement = statement
        .with_trailing_trivia(body.trailing_trivia())
        .with_annotation(Annotation::Reformat {
            indent: line_indent(target),
        });

    debug!(
        offset = target.range().start,
        receiver = %check.receiver().text(),
        "planned rewrite"
    );

    Ok(Fix {
        title: FIX_TITLE,
        equivalence_key: USE_THROW_IF_CANCELLATION_REQUESTED.id,
        path: target.path(),
        range: target.range(),
        full_range: target.full_range(),
        target: Arc::clone(target.green()),
        replacement: Arc::new(statement),
    })
}

impl Fix {
    pub fn title(&self) -> &'static str {
        self.title
    }

    /// Fixes with equal keys can be applied together.
    pub fn equivalence_key(&self) -> &'static str {
        self.equivalence_key
    }

    /// Child indices from the root to the replaced statement.
    pub fn path(&self) -> &[usize] {
        &self.path
    }

    /// Byte range of the replaced statement, trivia excluded.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Byte range of the replaced statement, trivia included.
    pub fn full_range(&self) -> Range<usize> {
        self.full_range.clone()
    }

    pub fn original_text(&self) -> String {
        self.target.to_full_string()
    }

    pub fn replacement(&self) -> &Arc<GreenNode> {
        &self.replacement
    }

    pub fn replacement_text(&self) -> String {
        self.replacement.to_full_string()
    }

    /// Whether `other` replaces this fix's statement or something inside it.
    pub fn encloses(&self, other: &Fix) -> bool {
        other.path.starts_with(&self.path)
    }

    /// Apply to `tree`, which must still hold the original statement at
    /// this fix's path.
    pub fn apply(&self, tree: &SyntaxTree) -> Result<SyntaxTree, RewriteError> {
        match tree.element_at_path(&self.path) {
            Some(GreenElement::Node(node)) if Arc::ptr_eq(&node, &self.target) => {}
            _ => return Err(RewriteError::ForeignNode),
        }
        tree.replace_at_path(&self.path, GreenElement::Node(Arc::clone(&self.replacement)))
            .ok_or(RewriteError::ForeignNode)
    }

    /// The replacement as a verified byte-span edit of `file`.
    pub fn to_edit(&self, file: impl Into<PathBuf>) -> Edit {
        Edit::new(
            file,
            self.full_range.start,
            self.full_range.end,
            self.replacement_text(),
            self.original_text(),
        )
    }
}

/// Indentation of the line `node` starts, or `None` when other code
/// precedes it on that line.
fn line_indent(node: &SyntaxNode) -> Option<String> {
    let first = node.first_token()?;
    let leading = first.leading_trivia();
    let (starts_line, indent) = match leading.rfind('\n') {
        Some(newline) => (true, &leading[newline + 1..]),
        None => (
            first
                .prev_token()
                .map_or(true, |prev| prev.trailing_trivia().ends_with('\n')),
            leading,
        ),
    };
    (starts_line && indent.chars().all(|c| c == ' ' || c == '\t')).then(|| indent.to_string())
}

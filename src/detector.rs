//! Finds `if` statements that only throw when a token is cancelled.

use crate::diagnostic::{Diagnostic, Location};
use crate::pattern::CancellationCheck;
use crate::rule::{Severity, CANCELLATION_TOKEN_TYPE, USE_THROW_IF_CANCELLATION_REQUESTED};
use crate::semantic::TypeOracle;
use crate::syntax::{LineIndex, SyntaxKind, SyntaxNode, SyntaxTree};
use std::cell::OnceCell;
use tracing::{debug, trace};

/// Detect every cancellation check in `tree`, reported at the default severity.
///
/// The sequence is lazy and finite; calling again restarts the walk.
pub fn detect<'a, O>(tree: &'a SyntaxTree, oracle: &'a O) -> impl Iterator<Item = Diagnostic> + 'a
where
    O: TypeOracle + ?Sized,
{
    Detector::default().detect(tree, oracle)
}

/// Detection settings.
#[derive(Debug, Clone, Copy)]
pub struct Detector {
    severity: Severity,
}

impl Default for Detector {
    fn default() -> Self {
        Self {
            severity: USE_THROW_IF_CANCELLATION_REQUESTED.default_severity,
        }
    }
}

impl Detector {
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn detect<'a, O>(
        &self,
        tree: &'a SyntaxTree,
        oracle: &'a O,
    ) -> impl Iterator<Item = Diagnostic> + 'a
    where
        O: TypeOracle + ?Sized,
    {
        let severity = self.severity;
        let lines = OnceCell::new();
        tree.root().descendants().filter_map(move |node| {
            let check = match_check(&node, oracle)?;
            let lines = lines.get_or_init(|| LineIndex::new(tree.to_source()));
            Some(Diagnostic::new(
                &USE_THROW_IF_CANCELLATION_REQUESTED,
                severity,
                location(tree, lines, check.syntax()),
            ))
        })
    }
}

/// Match one node, including the receiver type check.
///
/// Anything other than a full match is `None`; the reason is only traced.
pub fn match_check<O>(node: &SyntaxNode, oracle: &O) -> Option<CancellationCheck>
where
    O: TypeOracle + ?Sized,
{
    if node.kind() != SyntaxKind::IfStatement {
        return None;
    }
    let offset = node.range().start;

    let check = match CancellationCheck::match_shape(node) {
        Ok(check) => check,
        Err(mismatch) => {
            trace!(offset, %mismatch, "if statement skipped");
            return None;
        }
    };

    match oracle.resolve_type(check.receiver()) {
        Some(ty) if ty.name() == CANCELLATION_TOKEN_TYPE => {
            debug!(offset, receiver = %check.receiver().text(), "cancellation check found");
            Some(check)
        }
        Some(ty) => {
            trace!(offset, receiver_type = ty.qualified_name(), "receiver is not a cancellation token");
            None
        }
        None => {
            trace!(offset, "receiver type unknown");
            None
        }
    }
}

fn location(tree: &SyntaxTree, lines: &LineIndex, node: &SyntaxNode) -> Location {
    let range = node.range();
    Location {
        file: tree.path().to_path_buf(),
        byte_start: range.start,
        byte_end: range.end,
        start: lines.line_col(range.start),
        end: lines.line_col(range.end),
    }
}

//! Batch application of every fix in one document.

use crate::diagnostic::Diagnostic;
use crate::rewriter::{locate_if_statement, plan_fix, Fix, RewriteError};
use crate::syntax::SyntaxTree;
use tracing::{debug, warn};

/// Result of fixing a whole document.
#[derive(Debug, Clone)]
pub struct FixAllOutcome {
    pub tree: SyntaxTree,
    /// Fixes merged into `tree`, in document order.
    pub applied: Vec<Fix>,
    /// Fixes dropped because an enclosing statement was rewritten.
    pub conflicts: Vec<Fix>,
}

impl FixAllOutcome {
    pub fn fixed(&self) -> usize {
        self.applied.len()
    }
}

/// Plan a fix for every diagnostic against `tree` and merge them.
///
/// Each fix replaces one node by one node, so child-index paths planned on
/// the original tree stay valid while siblings are rewritten. When one fix
/// lies inside another, the outer one wins. Diagnostic order does not affect
/// the result.
pub fn fix_all(tree: &SyntaxTree, diagnostics: &[Diagnostic]) -> Result<FixAllOutcome, RewriteError> {
    let mut fixes = diagnostics
        .iter()
        .map(|diagnostic| {
            let target = locate_if_statement(tree, diagnostic.location.byte_start)?;
            plan_fix(tree, &target)
        })
        .collect::<Result<Vec<_>, _>>()?;

    fixes.sort_by(|a, b| a.path().cmp(b.path()));
    fixes.dedup_by(|a, b| a.path() == b.path());

    let mut applied: Vec<Fix> = Vec::with_capacity(fixes.len());
    let mut conflicts = Vec::new();
    for fix in fixes {
        if applied.iter().any(|outer| outer.encloses(&fix)) {
            warn!(path = ?fix.path(), "fix skipped: enclosing statement is also rewritten");
            conflicts.push(fix);
        } else {
            applied.push(fix);
        }
    }

    let mut current = tree.clone();
    for fix in &applied {
        current = fix.apply(&current)?;
    }
    debug!(
        fixed = applied.len(),
        conflicts = conflicts.len(),
        "fix all complete"
    );

    Ok(FixAllOutcome {
        tree: current,
        applied,
        conflicts,
    })
}

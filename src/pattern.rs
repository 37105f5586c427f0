//! Syntactic shape of a cancellation check.
//!
//! The shape is everything the rule requires except the receiver's type:
//!
//! ```text
//! if (<receiver>.IsCancellationRequested) throw ...;
//! if (<receiver>.IsCancellationRequested) { throw ...; }
//! ```
//!
//! Type resolution is left to the caller so that the detector and the
//! rewriter can share the structural part while only the detector consults
//! a [`TypeOracle`](crate::semantic::TypeOracle).

use crate::rule::CANCELLATION_FLAG;
use crate::syntax::ast::{Expression, IfStatement, MemberAccess, Statement, ThrowStatement};
use crate::syntax::{SyntaxElement, SyntaxNode};
use thiserror::Error;

/// Why a node does not have the shape of a cancellation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ShapeMismatch {
    #[error("node is not an if statement")]
    NotIfStatement,

    #[error("if statement has an else branch")]
    HasElse,

    #[error("condition is not a member access")]
    ConditionNotMemberAccess,

    #[error("condition does not read IsCancellationRequested")]
    WrongMemberName,

    #[error("body is not a single throw statement")]
    BodyNotAbort,

    #[error("if statement contains syntax errors")]
    Malformed,
}

/// An `if` statement with the structure of a cancellation check.
#[derive(Debug, Clone)]
pub struct CancellationCheck {
    statement: IfStatement,
    access: MemberAccess,
    receiver: SyntaxElement,
    body: Statement,
    abort: ThrowStatement,
}

impl CancellationCheck {
    /// Match `node` against the shape, reporting the first mismatch.
    pub fn match_shape(node: &SyntaxNode) -> Result<Self, ShapeMismatch> {
        let statement = IfStatement::cast(node.clone()).ok_or(ShapeMismatch::NotIfStatement)?;
        if node.has_error() {
            return Err(ShapeMismatch::Malformed);
        }

        let Some(Expression::MemberAccess(access)) = statement.condition() else {
            return Err(ShapeMismatch::ConditionNotMemberAccess);
        };
        let receiver = access
            .receiver()
            .ok_or(ShapeMismatch::ConditionNotMemberAccess)?;
        if access.name_text().as_deref() != Some(CANCELLATION_FLAG) {
            return Err(ShapeMismatch::WrongMemberName);
        }

        let body = statement.statement().ok_or(ShapeMismatch::BodyNotAbort)?;
        let abort = abort_only(&body).ok_or(ShapeMismatch::BodyNotAbort)?;

        if statement.else_branch().is_some() {
            return Err(ShapeMismatch::HasElse);
        }

        Ok(Self {
            statement,
            access,
            receiver,
            body,
            abort,
        })
    }

    pub fn statement(&self) -> &IfStatement {
        &self.statement
    }

    pub fn syntax(&self) -> &SyntaxNode {
        self.statement.syntax()
    }

    /// The `receiver.IsCancellationRequested` condition.
    pub fn access(&self) -> &MemberAccess {
        &self.access
    }

    /// The expression whose cancellation flag is read.
    pub fn receiver(&self) -> &SyntaxElement {
        &self.receiver
    }

    /// The statement governed by the `if`: the throw itself or its block.
    pub fn body(&self) -> &Statement {
        &self.body
    }

    pub fn abort(&self) -> &ThrowStatement {
        &self.abort
    }
}

/// The throw of a body that does nothing else.
fn abort_only(body: &Statement) -> Option<ThrowStatement> {
    match body {
        Statement::Throw(throw) => Some(throw.clone()),
        Statement::Block(block) => match block.statements().as_slice() {
            [Statement::Throw(throw)] => Some(throw.clone()),
            _ => None,
        },
        Statement::If(_) | Statement::Expression(_) | Statement::Other(_) => None,
    }
}

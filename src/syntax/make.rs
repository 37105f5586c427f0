//! Constructors for synthesized syntax.

use crate::syntax::green::{GreenElement, GreenNode, GreenToken};
use crate::syntax::kind::SyntaxKind;

pub fn token(kind: SyntaxKind, text: &str) -> GreenElement {
    GreenToken::new(kind, text).into()
}

pub fn identifier(name: &str) -> GreenElement {
    token(SyntaxKind::Identifier, name)
}

/// `receiver.name`, with `receiver` reused as is.
pub fn member_access(receiver: GreenElement, name: &str) -> GreenNode {
    GreenNode::new(
        SyntaxKind::MemberAccessExpression,
        vec![receiver, token(SyntaxKind::Dot, "."), identifier(name)],
    )
}

/// `target()`
pub fn invocation(target: GreenNode) -> GreenNode {
    let arguments = GreenNode::new(
        SyntaxKind::ArgumentList,
        vec![
            token(SyntaxKind::OpenParen, "("),
            token(SyntaxKind::CloseParen, ")"),
        ],
    );
    GreenNode::new(
        SyntaxKind::InvocationExpression,
        vec![target.into(), arguments.into()],
    )
}

/// `expression;`
pub fn expression_statement(expression: GreenNode) -> GreenNode {
    GreenNode::new(
        SyntaxKind::ExpressionStatement,
        vec![expression.into(), token(SyntaxKind::Semicolon, ";")],
    )
}

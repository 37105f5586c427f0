//! Typed views over the C# constructs the rule inspects.
//!
//! Accessors follow the surface syntax of the language rather than grammar
//! field names: the condition of an `if` is whatever sits between its
//! parentheses, the receiver of a member access is whatever precedes the dot.

use crate::syntax::kind::SyntaxKind;
use crate::syntax::red::{SyntaxElement, SyntaxNode, SyntaxToken};

/// Statement forms the rule distinguishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    If(IfStatement),
    Block(Block),
    Throw(ThrowStatement),
    Expression(ExpressionStatement),
    Other(SyntaxNode),
}

impl Statement {
    pub fn cast(node: SyntaxNode) -> Self {
        match node.kind() {
            SyntaxKind::IfStatement => Statement::If(IfStatement(node)),
            SyntaxKind::Block => Statement::Block(Block(node)),
            SyntaxKind::ThrowStatement => Statement::Throw(ThrowStatement(node)),
            SyntaxKind::ExpressionStatement => Statement::Expression(ExpressionStatement(node)),
            _ => Statement::Other(node),
        }
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Statement::If(statement) => &statement.0,
            Statement::Block(block) => &block.0,
            Statement::Throw(statement) => &statement.0,
            Statement::Expression(statement) => &statement.0,
            Statement::Other(node) => node,
        }
    }
}

/// Expression forms the rule distinguishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    MemberAccess(MemberAccess),
    Identifier(SyntaxToken),
    This(SyntaxElement),
    Other(SyntaxElement),
}

impl Expression {
    pub fn cast(element: SyntaxElement) -> Self {
        match element.kind() {
            SyntaxKind::MemberAccessExpression => match element {
                SyntaxElement::Node(node) => Expression::MemberAccess(MemberAccess(node)),
                token => Expression::Other(token),
            },
            SyntaxKind::Identifier => match element {
                SyntaxElement::Token(token) => Expression::Identifier(token),
                SyntaxElement::Node(node) => match node.first_token() {
                    Some(token) if node.text() == token.text() => Expression::Identifier(token),
                    _ => Expression::Other(SyntaxElement::Node(node)),
                },
            },
            SyntaxKind::ThisExpression | SyntaxKind::ThisKeyword => Expression::This(element),
            _ => Expression::Other(element),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfStatement(SyntaxNode);

impl IfStatement {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        (node.kind() == SyntaxKind::IfStatement).then_some(Self(node))
    }

    pub fn syntax(&self) -> &SyntaxNode {
        &self.0
    }

    /// The expression between the parentheses.
    pub fn condition(&self) -> Option<Expression> {
        self.0
            .children_with_tokens()
            .skip_while(|child| child.kind() != SyntaxKind::OpenParen)
            .nth(1)
            .filter(|child| child.kind() != SyntaxKind::CloseParen)
            .map(Expression::cast)
    }

    /// The statement executed when the condition holds.
    pub fn statement(&self) -> Option<Statement> {
        self.0
            .children_with_tokens()
            .skip_while(|child| child.kind() != SyntaxKind::CloseParen)
            .nth(1)
            .and_then(SyntaxElement::into_node)
            .map(Statement::cast)
    }

    pub fn else_branch(&self) -> Option<SyntaxElement> {
        self.0.children_with_tokens().find(|child| {
            matches!(
                child.kind(),
                SyntaxKind::ElseKeyword | SyntaxKind::ElseClause
            )
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block(SyntaxNode);

impl Block {
    pub fn syntax(&self) -> &SyntaxNode {
        &self.0
    }

    pub fn statements(&self) -> Vec<Statement> {
        self.0.children().map(Statement::cast).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrowStatement(SyntaxNode);

impl ThrowStatement {
    pub fn syntax(&self) -> &SyntaxNode {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionStatement(SyntaxNode);

impl ExpressionStatement {
    pub fn syntax(&self) -> &SyntaxNode {
        &self.0
    }
}

/// `receiver.Name`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberAccess(SyntaxNode);

impl MemberAccess {
    pub fn syntax(&self) -> &SyntaxNode {
        &self.0
    }

    /// The expression left of the access operator.
    pub fn receiver(&self) -> Option<SyntaxElement> {
        let mut children = self.0.children_with_tokens();
        let receiver = children.next()?;
        // A receiver is always followed by an operator and a name.
        children.next()?;
        Some(receiver)
    }

    /// The accessed member name.
    pub fn name(&self) -> Option<SyntaxElement> {
        let count = self.0.green().children().len();
        if count < 3 {
            return None;
        }
        self.0.child_at(count - 1)
    }

    pub fn name_text(&self) -> Option<String> {
        self.name().map(|name| name.text())
    }
}

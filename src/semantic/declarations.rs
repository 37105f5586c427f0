use crate::semantic::{TypeDescriptor, TypeOracle};
use crate::syntax::ast::Expression;
use crate::syntax::{SyntaxElement, SyntaxKind, SyntaxNode};
use tracing::trace;

/// Keywords that can prefix a declaration without being its type.
const MODIFIER_KEYWORDS: &[&str] = &[
    "abstract", "async", "const", "extern", "file", "in", "internal", "new", "out", "override",
    "params", "partial", "private", "protected", "public", "readonly", "ref", "required",
    "scoped", "sealed", "static", "this", "unsafe", "virtual", "volatile",
];

/// Resolves receiver types from the declarations visible in the same file.
///
/// Handles plain identifiers (locals declared earlier in an enclosing block,
/// parameters of enclosing methods, constructors, local functions, lambdas
/// and primary constructors, then fields and properties of enclosing types)
/// and `this.member`. Anything else, including `var` declarations, resolves
/// to unknown.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeclarationOracle;

/// Outcome of looking a name up in one scope.
enum Lookup {
    /// Declared here; `None` when the declaration names no usable type.
    Declared(Option<TypeDescriptor>),
    NotDeclared,
}

impl TypeOracle for DeclarationOracle {
    fn resolve_type(&self, expression: &SyntaxElement) -> Option<TypeDescriptor> {
        let resolved = match Expression::cast(expression.clone()) {
            Expression::Identifier(token) => resolve_name(token.text(), expression),
            Expression::MemberAccess(access) => {
                let receiver = access.receiver()?;
                match Expression::cast(receiver) {
                    Expression::This(_) => {
                        let name = access.name_text()?;
                        expression
                            .ancestors()
                            .find(|node| node.kind().is_type_declaration())
                            .and_then(|declaration| match members_lookup(&declaration, &name) {
                                Lookup::Declared(found) => found,
                                Lookup::NotDeclared => None,
                            })
                    }
                    _ => None,
                }
            }
            Expression::This(_) | Expression::Other(_) => None,
        };
        trace!(
            expression = %expression.text(),
            resolved = ?resolved.as_ref().map(TypeDescriptor::qualified_name),
            "resolved receiver type"
        );
        resolved
    }
}

fn resolve_name(name: &str, at: &SyntaxElement) -> Option<TypeDescriptor> {
    let use_offset = at.range().start;
    for scope in at.ancestors() {
        let lookup = match scope.kind() {
            SyntaxKind::Block => locals_lookup(&scope, name, use_offset),
            kind if kind.has_parameters() => parameters_lookup(&scope, name),
            kind if kind.is_type_declaration() => match parameters_lookup(&scope, name) {
                Lookup::NotDeclared => members_lookup(&scope, name),
                declared => declared,
            },
            _ => Lookup::NotDeclared,
        };
        if let Lookup::Declared(found) = lookup {
            return found;
        }
    }
    None
}

/// Locals declared before `use_offset` directly in `block`.
fn locals_lookup(block: &SyntaxNode, name: &str, use_offset: usize) -> Lookup {
    block
        .children()
        .filter(|statement| statement.kind() == SyntaxKind::LocalDeclarationStatement)
        .filter(|statement| statement.range().end <= use_offset)
        .filter_map(|statement| {
            statement
                .children()
                .find(|child| child.kind() == SyntaxKind::VariableDeclaration)
        })
        .map(|declaration| variable_lookup(&declaration, name))
        .find(|lookup| matches!(lookup, Lookup::Declared(_)))
        .unwrap_or(Lookup::NotDeclared)
}

/// Parameters of a method-like construct or a primary constructor.
fn parameters_lookup(owner: &SyntaxNode, name: &str) -> Lookup {
    if owner.kind() == SyntaxKind::LambdaExpression {
        let implicit = owner
            .children_with_tokens()
            .take_while(|child| child.text() != "=>")
            .any(|child| {
                matches!(
                    child.kind(),
                    SyntaxKind::Identifier | SyntaxKind::Other("implicit_parameter")
                ) && child.text() == name
            });
        if implicit {
            return Lookup::Declared(None);
        }
    }

    owner
        .children()
        .filter(|child| child.kind() == SyntaxKind::ParameterList)
        .flat_map(|list| list.children().collect::<Vec<_>>())
        .filter(|child| child.kind() == SyntaxKind::Parameter)
        .find_map(|parameter| {
            let parts = declaration_parts(&parameter);
            match parts.as_slice() {
                [.., ty, declared] if declared.text() == name => {
                    Some(Lookup::Declared(TypeDescriptor::from_type_syntax(&ty.text())))
                }
                [declared] if declared.text() == name => Some(Lookup::Declared(None)),
                _ => None,
            }
        })
        .unwrap_or(Lookup::NotDeclared)
}

/// Fields and properties declared in a type declaration's body.
fn members_lookup(declaration: &SyntaxNode, name: &str) -> Lookup {
    declaration
        .children()
        .filter(|child| child.kind() == SyntaxKind::DeclarationList)
        .flat_map(|list| list.children().collect::<Vec<_>>())
        .find_map(|member| match member.kind() {
            SyntaxKind::FieldDeclaration => member
                .children()
                .find(|child| child.kind() == SyntaxKind::VariableDeclaration)
                .map(|variables| variable_lookup(&variables, name))
                .filter(|lookup| matches!(lookup, Lookup::Declared(_))),
            SyntaxKind::PropertyDeclaration => match declaration_parts(&member).as_slice() {
                [ty, declared, ..] if declared.text() == name => {
                    Some(Lookup::Declared(TypeDescriptor::from_type_syntax(&ty.text())))
                }
                _ => None,
            },
            _ => None,
        })
        .unwrap_or(Lookup::NotDeclared)
}

/// `Type a = 1, b;` as found in locals and fields.
fn variable_lookup(declaration: &SyntaxNode, name: &str) -> Lookup {
    let Some(ty) = declaration.children_with_tokens().next() else {
        return Lookup::NotDeclared;
    };
    let declares_name = declaration
        .children()
        .filter(|child| child.kind() == SyntaxKind::VariableDeclarator)
        .any(|declarator| {
            declarator
                .children_with_tokens()
                .find(|part| part.kind() == SyntaxKind::Identifier)
                .is_some_and(|identifier| identifier.text() == name)
        });
    if declares_name {
        Lookup::Declared(TypeDescriptor::from_type_syntax(&ty.text()))
    } else {
        Lookup::NotDeclared
    }
}

/// Children of a declaration with attributes, modifiers and default values
/// stripped, leaving the type and the declared name in source order.
fn declaration_parts(declaration: &SyntaxNode) -> Vec<SyntaxElement> {
    declaration
        .children_with_tokens()
        .take_while(|child| {
            !matches!(
                child.kind(),
                SyntaxKind::Equals | SyntaxKind::EqualsValueClause
            )
        })
        .filter(|child| {
            !matches!(child.kind(), SyntaxKind::AttributeList | SyntaxKind::Modifier)
                && !(child.as_token().is_some()
                    && MODIFIER_KEYWORDS.contains(&child.text().as_str()))
        })
        .filter(|child| child.as_node().is_some() || child.text().chars().any(char::is_alphanumeric))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::ast::{Expression, IfStatement};
    use crate::syntax::SyntaxTree;

    /// Resolve the receiver of the first `if (x.Member)` in `source`.
    fn receiver_type(source: &str) -> Option<String> {
        let tree = SyntaxTree::parse(source).unwrap();
        let statement = tree
            .root()
            .descendants()
            .find_map(IfStatement::cast)
            .unwrap();
        let Some(Expression::MemberAccess(access)) = statement.condition() else {
            panic!("condition should be a member access");
        };
        DeclarationOracle
            .resolve_type(&access.receiver().unwrap())
            .map(|ty| ty.name().to_string())
    }

    #[test]
    fn resolves_parameters() {
        let source = r#"
class A {
    void M(System.Threading.CancellationToken token) {
        if (token.IsCancellationRequested) throw null;
    }
}"#;
        assert_eq!(receiver_type(source).as_deref(), Some("CancellationToken"));
    }

    #[test]
    fn resolves_earlier_locals() {
        let source = r#"
class A {
    void M(CancellationTokenSource source) {
        CancellationToken token = source.Token;
        if (token.IsCancellationRequested) throw null;
    }
}"#;
        assert_eq!(receiver_type(source).as_deref(), Some("CancellationToken"));
    }

    #[test]
    fn var_locals_are_unknown() {
        let source = r#"
class A {
    void M(CancellationTokenSource source) {
        var token = source.Token;
        if (token.IsCancellationRequested) throw null;
    }
}"#;
        assert_eq!(receiver_type(source), None);
    }

    #[test]
    fn resolves_fields_and_this_access() {
        let source = r#"
class A {
    private readonly CancellationToken _token;
    void M() {
        if (this._token.IsCancellationRequested) throw null;
    }
}"#;
        assert_eq!(receiver_type(source).as_deref(), Some("CancellationToken"));

        let source = r#"
class A {
    private readonly CancellationToken _token;
    void M() {
        if (_token.IsCancellationRequested) throw null;
    }
}"#;
        assert_eq!(receiver_type(source).as_deref(), Some("CancellationToken"));
    }

    #[test]
    fn resolves_properties() {
        let source = r#"
class A {
    public CancellationToken Token { get; set; }
    void M() {
        if (Token.IsCancellationRequested) throw null;
    }
}"#;
        assert_eq!(receiver_type(source).as_deref(), Some("CancellationToken"));
    }

    #[test]
    fn other_types_keep_their_name() {
        let source = r#"
class A {
    void M(CancellationTokenSource source) {
        if (source.IsCancellationRequested) throw null;
    }
}"#;
        assert_eq!(receiver_type(source).as_deref(), Some("CancellationTokenSource"));
    }

    #[test]
    fn undeclared_names_are_unknown() {
        let source = r#"
class A {
    void M() {
        if (token.IsCancellationRequested) throw null;
    }
}"#;
        assert_eq!(receiver_type(source), None);
    }
}
